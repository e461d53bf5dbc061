//! Cluster snapshot fetching
//!
//! Lists every resource kind the diagram covers. The per-kind list calls
//! run concurrently, but the snapshot is only handed to the parser once
//! all of them have completed: the core assumes a fully materialized,
//! immutable view of each collection. A failed list aborts the run before
//! association begins.

use anyhow::{Context, Result};
use k8s_openapi::api::apps::v1::{Deployment, ReplicaSet, StatefulSet};
use k8s_openapi::api::batch::v1::{CronJob, Job};
use k8s_openapi::api::core::v1::{Namespace, Pod, Service};
use kube::api::ListParams;
use kube::{Api, Client};

/// Raw per-kind listings, in API listing order
#[derive(Debug, Default)]
pub struct ClusterSnapshot {
    pub namespaces: Vec<Namespace>,
    pub services: Vec<Service>,
    pub pods: Vec<Pod>,
    pub deployments: Vec<Deployment>,
    pub replica_sets: Vec<ReplicaSet>,
    pub stateful_sets: Vec<StatefulSet>,
    pub jobs: Vec<Job>,
    pub cron_jobs: Vec<CronJob>,
}

/// List all items of one cluster-wide resource kind
async fn list_all<K>(client: &Client) -> Result<Vec<K>>
where
    K: kube::Resource<DynamicType = ()>
        + Clone
        + serde::de::DeserializeOwned
        + std::fmt::Debug,
{
    let api: Api<K> = Api::all(client.clone());
    let list = api
        .list(&ListParams::default())
        .await
        .with_context(|| format!("Failed to list {}", K::kind(&())))?;
    Ok(list.items)
}

/// Fetch one snapshot of every kind the diagram covers
pub async fn fetch_snapshot(client: &Client) -> Result<ClusterSnapshot> {
    let (namespaces, services, pods, deployments, replica_sets, stateful_sets, jobs, cron_jobs) =
        futures::try_join!(
            list_all::<Namespace>(client),
            list_all::<Service>(client),
            list_all::<Pod>(client),
            list_all::<Deployment>(client),
            list_all::<ReplicaSet>(client),
            list_all::<StatefulSet>(client),
            list_all::<Job>(client),
            list_all::<CronJob>(client),
        )?;

    tracing::debug!(
        namespaces = namespaces.len(),
        services = services.len(),
        pods = pods.len(),
        deployments = deployments.len(),
        replica_sets = replica_sets.len(),
        stateful_sets = stateful_sets.len(),
        jobs = jobs.len(),
        cron_jobs = cron_jobs.len(),
        "cluster snapshot fetched"
    );

    Ok(ClusterSnapshot {
        namespaces,
        services,
        pods,
        deployments,
        replica_sets,
        stateful_sets,
        jobs,
        cron_jobs,
    })
}
