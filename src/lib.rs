//! k8s-diagram library
//!
//! Reconstructs a hierarchical dependency graph from a Kubernetes
//! cluster's control-plane objects and serializes it as a Mermaid
//! flowchart. The binary wires this to a live cluster; the library can be
//! driven from any source of `k8s-openapi` objects.

pub mod cli;
pub mod config;
pub mod error;
pub mod graph;
pub mod kube;
pub mod models;
pub mod parser;

// Re-export the types most callers need
pub use error::{GraphError, GraphResult};
pub use graph::mermaid::to_mermaid;
pub use graph::{Container, ContainerKind, Graph, Member, NamespaceFilter, Resource};
pub use kube::ClusterSnapshot;
pub use parser::parse_snapshot;
