//! Resource model layer
//!
//! Provides the typed records built from raw Kubernetes API objects before
//! they enter the graph. Each record carries a [`NodeMeta`] (diagram
//! identity) plus whatever relationship fields its kind needs.
//!
//! Structure:
//! - `mod.rs` - kind enumeration, node identity, label resolution
//! - `resources.rs` - per-kind records and their `from_object` constructors

pub mod resources;

pub use resources::{
    CronJobRecord, DeploymentRecord, JobRecord, NamespaceRecord, PodRecord, ReplicaSetRecord,
    ServiceRecord, StatefulSetRecord,
};

use std::collections::BTreeMap;
use std::fmt;

/// Well-known label keys used to derive grouping membership
const APP_NAME_LABEL: &str = "app.kubernetes.io/name";
const APP_SHORT_LABEL: &str = "app";
const PART_OF_LABEL: &str = "app.kubernetes.io/part-of";

/// Enumeration of the resource kinds that can appear in a diagram
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Namespace,
    Service,
    Pod,
    Deployment,
    ReplicaSet,
    StatefulSet,
    Job,
    CronJob,
}

impl ResourceKind {
    /// Get the display name as used in subgraph headers and error messages
    pub fn label(&self) -> &'static str {
        match self {
            ResourceKind::Namespace => "Namespace",
            ResourceKind::Service => "Service",
            ResourceKind::Pod => "Pod",
            ResourceKind::Deployment => "Deployment",
            ResourceKind::ReplicaSet => "ReplicaSet",
            ResourceKind::StatefulSet => "StatefulSet",
            ResourceKind::Job => "Job",
            ResourceKind::CronJob => "CronJob",
        }
    }

    /// Short tag prepended to the per-kind uid to form a node id
    pub fn id_prefix(&self) -> &'static str {
        match self {
            ResourceKind::Namespace => "ns_",
            ResourceKind::Service => "svc_",
            ResourceKind::Pod => "pod_",
            ResourceKind::Deployment => "dep_",
            ResourceKind::ReplicaSet => "rset_",
            ResourceKind::StatefulSet => "sset_",
            ResourceKind::Job => "job_",
            ResourceKind::CronJob => "cjob_",
        }
    }

    /// Mermaid style class attached to node declarations of this kind
    ///
    /// Namespaces are containers and cron jobs have no dedicated class, so
    /// both render unstyled.
    pub fn style_class(&self) -> Option<&'static str> {
        match self {
            ResourceKind::Service => Some("svc"),
            ResourceKind::Pod => Some("pod"),
            ResourceKind::Deployment => Some("dep"),
            ResourceKind::ReplicaSet => Some("rset"),
            ResourceKind::StatefulSet => Some("sset"),
            ResourceKind::Job => Some("job"),
            ResourceKind::Namespace | ResourceKind::CronJob => None,
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Per-kind sequential uid generator
///
/// Ids only have to be unique within one parse run, so a short counter in
/// listing order keeps diagram ids readable. One sequence is created per
/// kind at the start of ingestion; there is no shared global state.
#[derive(Debug, Default)]
pub struct UidSequence(u32);

impl UidSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next uid, starting at 1
    pub fn next_uid(&mut self) -> u32 {
        self.0 += 1;
        self.0
    }
}

/// Diagram identity shared by every node
///
/// `id` is computed once here and never recomputed; everything downstream
/// (relations, grouping, serialization) refers to nodes by this id.
#[derive(Debug, Clone)]
pub struct NodeMeta {
    pub id: String,
    pub kind: ResourceKind,
    pub name: String,
    pub namespace: String,
    /// Derived from `app.kubernetes.io/name`, falling back to `app`
    pub app: Option<String>,
    /// Derived from `app.kubernetes.io/part-of`
    pub system: Option<String>,
    /// Related node ids in the order association discovered them
    pub related: Vec<String>,
}

impl NodeMeta {
    pub fn new(kind: ResourceKind, uid: u32, name: String, namespace: String) -> Self {
        Self {
            id: format!("{}{}", kind.id_prefix(), uid),
            kind,
            name,
            namespace,
            app: None,
            system: None,
            related: Vec::new(),
        }
    }

    /// Populate `app` and `system` from a label mapping
    pub fn with_grouping_labels(mut self, labels: &BTreeMap<String, String>) -> Self {
        self.app = resolve_app(labels);
        self.system = resolve_system(labels);
        self
    }

    /// Mermaid style class for this node's kind
    pub fn style_class(&self) -> Option<&'static str> {
        self.kind.style_class()
    }
}

/// Resolve the app grouping key: `app.kubernetes.io/name` wins over `app`
pub fn resolve_app(labels: &BTreeMap<String, String>) -> Option<String> {
    labels
        .get(APP_NAME_LABEL)
        .or_else(|| labels.get(APP_SHORT_LABEL))
        .cloned()
}

/// Resolve the system grouping key from `app.kubernetes.io/part-of`
pub fn resolve_system(labels: &BTreeMap<String, String>) -> Option<String> {
    labels.get(PART_OF_LABEL).cloned()
}
