//! Typed failures raised while turning cluster objects into a graph
//!
//! Fatal conditions abort the whole parse run; the caller gets one error
//! with enough context (kind, name, namespace) to find the offending
//! object. Zero-match lookups are not errors and never appear here.

use crate::models::ResourceKind;

/// Errors produced by ingestion and association
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// A raw API object is missing metadata the graph cannot do without
    #[error("{kind} object is missing required metadata field '{field}'")]
    MalformedResource {
        kind: ResourceKind,
        field: &'static str,
    },

    /// A resource names a namespace that was not in the namespace listing
    #[error("{kind} '{name}' belongs to unknown namespace '{namespace}'")]
    DanglingReference {
        kind: ResourceKind,
        name: String,
        namespace: String,
    },

    /// More than one owner reference of a kind that must be singular
    #[error(
        "{kind} {namespace}/{name} has {count} {owner_kind} owner references, expected at most one"
    )]
    AmbiguousOwnership {
        kind: ResourceKind,
        name: String,
        namespace: String,
        owner_kind: &'static str,
        count: usize,
    },
}

/// Result type for graph construction
pub type GraphResult<T> = Result<T, GraphError>;
