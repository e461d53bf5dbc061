//! Graph data structures for visualizing resource relationships
//!
//! The graph is a tree of containers: namespaces at the root, with optional
//! System and App sub-containers produced by grouping. Leaves are the typed
//! resource records. Everything is built once per parse run, mutated only by
//! the association and grouping engines, and read-only once serialization
//! starts.

pub mod associate;
pub mod group;
pub mod mermaid;

use std::collections::BTreeSet;

use crate::models::{
    CronJobRecord, DeploymentRecord, JobRecord, NamespaceRecord, NodeMeta, PodRecord,
    ReplicaSetRecord, ResourceKind, ServiceRecord, StatefulSetRecord,
};

/// A leaf node: one concrete cluster resource
#[derive(Debug, Clone)]
pub enum Resource {
    Service(ServiceRecord),
    Pod(PodRecord),
    Deployment(DeploymentRecord),
    ReplicaSet(ReplicaSetRecord),
    StatefulSet(StatefulSetRecord),
    Job(JobRecord),
    CronJob(CronJobRecord),
}

impl Resource {
    /// Shared diagram identity
    pub fn meta(&self) -> &NodeMeta {
        match self {
            Resource::Service(r) => &r.meta,
            Resource::Pod(r) => &r.meta,
            Resource::Deployment(r) => &r.meta,
            Resource::ReplicaSet(r) => &r.meta,
            Resource::StatefulSet(r) => &r.meta,
            Resource::Job(r) => &r.meta,
            Resource::CronJob(r) => &r.meta,
        }
    }

    pub fn id(&self) -> &str {
        &self.meta().id
    }

    pub fn kind(&self) -> ResourceKind {
        self.meta().kind
    }
}

/// The three container variants of the hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    Namespace,
    System,
    App,
}

impl ContainerKind {
    /// Display label used in subgraph headers
    pub fn label(&self) -> &'static str {
        match self {
            ContainerKind::Namespace => "Namespace",
            ContainerKind::System => "System",
            ContainerKind::App => "App",
        }
    }
}

/// One entry in a container's ordered member list
#[derive(Debug, Clone)]
pub enum Member {
    Leaf(Resource),
    Group(Container),
}

impl Member {
    fn id(&self) -> &str {
        match self {
            Member::Leaf(r) => r.id(),
            Member::Group(c) => &c.id,
        }
    }
}

/// A graph node that also holds child nodes (Namespace, System, App)
///
/// Members are kept in insertion order; a node is never a member of two
/// containers at once, so membership changes go through remove + insert.
#[derive(Debug, Clone)]
pub struct Container {
    pub id: String,
    pub kind: ContainerKind,
    pub name: String,
    /// Reported phase, namespaces only
    pub status_phase: Option<String>,
    members: Vec<Member>,
    /// Sequence for ids of System/App children, scoped to this container
    group_seq: u32,
}

impl Container {
    /// Build the top-level container for a namespace record
    pub fn from_namespace(record: NamespaceRecord) -> Self {
        Self {
            id: record.meta.id,
            kind: ContainerKind::Namespace,
            name: record.meta.name,
            status_phase: Some(record.status_phase),
            members: Vec::new(),
            group_seq: 0,
        }
    }

    /// Create a System/App child container with an id scoped to this parent
    ///
    /// Child group ids are `{parent_id}_{n}`; they only have to be unique
    /// within the parent, not globally.
    pub fn new_child_group(&mut self, kind: ContainerKind, name: String) -> Container {
        self.group_seq += 1;
        Container {
            id: format!("{}_{}", self.id, self.group_seq),
            kind,
            name,
            status_phase: None,
            members: Vec::new(),
            group_seq: 0,
        }
    }

    pub fn insert(&mut self, member: Member) {
        self.members.push(member);
    }

    /// Remove a direct member by id, preserving the order of the rest
    pub fn remove(&mut self, id: &str) -> Option<Member> {
        let pos = self.members.iter().position(|m| m.id() == id)?;
        Some(self.members.remove(pos))
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Take all members out, leaving the container empty (grouping engine)
    pub(crate) fn take_members(&mut self) -> Vec<Member> {
        std::mem::take(&mut self.members)
    }

    pub(crate) fn members_mut(&mut self) -> &mut Vec<Member> {
        &mut self.members
    }

    /// Depth-first iteration over every leaf under this container
    pub fn leaves(&self) -> Vec<&Resource> {
        let mut out = Vec::new();
        collect_leaves(self, &mut out);
        out
    }
}

fn collect_leaves<'a>(container: &'a Container, out: &mut Vec<&'a Resource>) {
    for member in &container.members {
        match member {
            Member::Leaf(resource) => out.push(resource),
            Member::Group(child) => collect_leaves(child, out),
        }
    }
}

/// Namespace allow/deny filter applied when namespaces enter the graph
///
/// The allow-list and deny-list are mutually exclusive; when both are
/// supplied the allow-list wins.
#[derive(Debug, Clone, Default)]
pub enum NamespaceFilter {
    #[default]
    All,
    Include(BTreeSet<String>),
    Exclude(BTreeSet<String>),
}

impl NamespaceFilter {
    pub fn new(included: &[String], excluded: &[String]) -> Self {
        if !included.is_empty() {
            NamespaceFilter::Include(included.iter().cloned().collect())
        } else if !excluded.is_empty() {
            NamespaceFilter::Exclude(excluded.iter().cloned().collect())
        } else {
            NamespaceFilter::All
        }
    }

    pub fn allows(&self, name: &str) -> bool {
        match self {
            NamespaceFilter::All => true,
            NamespaceFilter::Include(names) => names.contains(name),
            NamespaceFilter::Exclude(names) => !names.contains(name),
        }
    }
}

/// Root aggregate: the set of namespace containers for one parse run
#[derive(Debug, Clone, Default)]
pub struct Graph {
    namespaces: Vec<Container>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_namespace(&mut self, namespace: Container) {
        self.namespaces.push(namespace);
    }

    /// Bulk-insert namespaces, applying the filter and dropping namespaces
    /// with no remaining members (empty subgraphs would only clutter the
    /// diagram)
    pub fn insert_namespaces<I>(&mut self, namespaces: I, filter: &NamespaceFilter)
    where
        I: IntoIterator<Item = Container>,
    {
        for namespace in namespaces {
            if !filter.allows(&namespace.name) {
                tracing::debug!("namespace {} filtered out", namespace.name);
                continue;
            }
            if namespace.is_empty() {
                tracing::debug!("namespace {} has no members, dropping", namespace.name);
                continue;
            }
            self.insert_namespace(namespace);
        }
    }

    pub fn remove_namespace(&mut self, name: &str) -> Option<Container> {
        let pos = self.namespaces.iter().position(|n| n.name == name)?;
        Some(self.namespaces.remove(pos))
    }

    pub fn namespaces(&self) -> &[Container] {
        &self.namespaces
    }

    /// Every leaf node across all namespaces, depth-first
    pub fn flatten(&self) -> Vec<&Resource> {
        self.namespaces.iter().flat_map(|n| n.leaves()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pod(uid: u32, name: &str, namespace: &str) -> Resource {
        Resource::Pod(PodRecord {
            meta: NodeMeta::new(ResourceKind::Pod, uid, name.to_string(), namespace.to_string()),
            labels: Default::default(),
            owner_replica_set: None,
            owner_job: None,
        })
    }

    fn namespace(uid: u32, name: &str) -> Container {
        Container::from_namespace(NamespaceRecord {
            meta: NodeMeta::new(ResourceKind::Namespace, uid, name.to_string(), name.to_string()),
            status_phase: "Active".to_string(),
        })
    }

    #[test]
    fn test_container_remove_preserves_order() {
        let mut ns = namespace(1, "prod");
        ns.insert(Member::Leaf(pod(1, "a", "prod")));
        ns.insert(Member::Leaf(pod(2, "b", "prod")));
        ns.insert(Member::Leaf(pod(3, "c", "prod")));

        let removed = ns.remove("pod_2").unwrap();
        assert_eq!(removed.id(), "pod_2");
        let ids: Vec<_> = ns.members().iter().map(|m| m.id().to_string()).collect();
        assert_eq!(ids, vec!["pod_1", "pod_3"]);
    }

    #[test]
    fn test_child_group_ids_are_parent_scoped() {
        let mut ns = namespace(2, "prod");
        let sys = ns.new_child_group(ContainerKind::System, "shop".to_string());
        let app = ns.new_child_group(ContainerKind::App, "checkout".to_string());
        assert_eq!(sys.id, "ns_2_1");
        assert_eq!(app.id, "ns_2_2");
    }

    #[test]
    fn test_filter_include_takes_precedence() {
        let filter = NamespaceFilter::new(
            &["a".to_string()],
            &["a".to_string(), "b".to_string()],
        );
        assert!(filter.allows("a"));
        assert!(!filter.allows("b"));

        let filter = NamespaceFilter::new(&[], &["b".to_string()]);
        assert!(filter.allows("a"));
        assert!(!filter.allows("b"));

        assert!(NamespaceFilter::new(&[], &[]).allows("anything"));
    }

    #[test]
    fn test_empty_namespace_is_dropped_on_bulk_insert() {
        let mut populated = namespace(1, "a");
        populated.insert(Member::Leaf(pod(1, "p", "a")));
        let empty = namespace(2, "b");

        let mut graph = Graph::new();
        graph.insert_namespaces(vec![populated, empty], &NamespaceFilter::All);
        assert_eq!(graph.namespaces().len(), 1);
        assert_eq!(graph.namespaces()[0].name, "a");
    }

    #[test]
    fn test_remove_namespace_by_name() {
        let mut graph = Graph::new();
        graph.insert_namespace(namespace(1, "a"));
        graph.insert_namespace(namespace(2, "b"));

        let removed = graph.remove_namespace("a").unwrap();
        assert_eq!(removed.name, "a");
        assert_eq!(graph.namespaces().len(), 1);
        assert!(graph.remove_namespace("a").is_none());
    }

    #[test]
    fn test_flatten_reaches_nested_leaves() {
        let mut ns = namespace(1, "prod");
        ns.insert(Member::Leaf(pod(1, "direct", "prod")));
        let mut sys = ns.new_child_group(ContainerKind::System, "shop".to_string());
        sys.insert(Member::Leaf(pod(2, "nested", "prod")));
        ns.insert(Member::Group(sys));

        let mut graph = Graph::new();
        graph.insert_namespace(ns);
        let ids: Vec<_> = graph.flatten().iter().map(|r| r.id().to_string()).collect();
        assert_eq!(ids, vec!["pod_1", "pod_2"]);
    }
}
