//! Kubernetes client module
//!
//! Handles connection to the Kubernetes API server and provides a
//! configured client for use throughout the application.

pub mod fetch;

pub use fetch::{fetch_snapshot, ClusterSnapshot};

use anyhow::Result;
use kube::{Client, Config};

/// Initialize and return a Kubernetes client
///
/// Uses the default kubeconfig loading strategy:
/// 1. In-cluster config (if running in a pod)
/// 2. KUBECONFIG environment variable
/// 3. ~/.kube/config
pub async fn create_client() -> Result<Client> {
    let config = Config::infer().await?;
    tracing::debug!(cluster_url = %config.cluster_url, "connecting to cluster");
    let client = Client::try_from(config)?;
    Ok(client)
}
