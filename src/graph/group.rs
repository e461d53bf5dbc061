//! Grouping engine
//!
//! Re-partitions each namespace's direct members into System and App
//! sub-containers derived from the well-known grouping labels. Apps may
//! nest directly under a namespace or under a system, never under another
//! app.
//!
//! The distinct key values are snapshotted against the member list before
//! any move, so the partition does not depend on mutation order: every
//! member ends up in exactly one place, no duplication, no loss.

use crate::graph::{Container, ContainerKind, Member, Resource};

/// The two grouping levels, in precedence order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GroupKey {
    System,
    App,
}

impl GroupKey {
    fn of<'a>(&self, resource: &'a Resource) -> Option<&'a str> {
        match self {
            GroupKey::System => resource.meta().system.as_deref(),
            GroupKey::App => resource.meta().app.as_deref(),
        }
    }

    fn container_kind(&self) -> ContainerKind {
        match self {
            GroupKey::System => ContainerKind::System,
            GroupKey::App => ContainerKind::App,
        }
    }
}

/// Group every namespace by system, then by app (namespace level and
/// inside each freshly-created system)
pub fn group_namespaces(namespaces: &mut [Container]) {
    for namespace in namespaces {
        group_by(namespace, GroupKey::System);
        group_by(namespace, GroupKey::App);
        for member in namespace.members_mut() {
            if let Member::Group(child) = member {
                if child.kind == ContainerKind::System {
                    group_by(child, GroupKey::App);
                }
            }
        }
    }
}

/// Partition a container's direct leaves by one grouping key
///
/// Leaves without the key keep their relative order; one child container
/// per distinct value is appended afterwards, in first-seen value order,
/// holding its leaves in their original order.
fn group_by(container: &mut Container, key: GroupKey) {
    // Stable snapshot of the distinct values before any mutation
    let mut values: Vec<String> = Vec::new();
    for member in container.members() {
        if let Member::Leaf(resource) = member {
            if let Some(value) = key.of(resource) {
                if !values.iter().any(|v| v == value) {
                    values.push(value.to_string());
                }
            }
        }
    }
    if values.is_empty() {
        return;
    }

    let mut buckets: Vec<Vec<Member>> = values.iter().map(|_| Vec::new()).collect();
    for member in container.take_members() {
        let bucket = match &member {
            Member::Leaf(resource) => key
                .of(resource)
                .and_then(|value| values.iter().position(|v| v == value)),
            Member::Group(_) => None,
        };
        match bucket {
            Some(i) => buckets[i].push(member),
            None => container.insert(member),
        }
    }

    for (value, bucket) in values.into_iter().zip(buckets) {
        tracing::debug!(
            container = %container.name,
            group = %value,
            members = bucket.len(),
            "grouping"
        );
        let mut child = container.new_child_group(key.container_kind(), value);
        for member in bucket {
            child.insert(member);
        }
        container.insert(Member::Group(child));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NamespaceRecord, NodeMeta, PodRecord, ResourceKind};

    fn namespace(uid: u32, name: &str) -> Container {
        Container::from_namespace(NamespaceRecord {
            meta: NodeMeta::new(ResourceKind::Namespace, uid, name.to_string(), name.to_string()),
            status_phase: "Active".to_string(),
        })
    }

    fn pod(uid: u32, name: &str, app: Option<&str>, system: Option<&str>) -> Resource {
        let mut meta = NodeMeta::new(ResourceKind::Pod, uid, name.to_string(), "ns".to_string());
        meta.app = app.map(str::to_string);
        meta.system = system.map(str::to_string);
        Resource::Pod(PodRecord {
            meta,
            labels: Default::default(),
            owner_replica_set: None,
            owner_job: None,
        })
    }

    fn member_ids(container: &Container) -> Vec<String> {
        container
            .members()
            .iter()
            .map(|m| match m {
                Member::Leaf(r) => r.id().to_string(),
                Member::Group(c) => c.id.clone(),
            })
            .collect()
    }

    #[test]
    fn test_ungrouped_members_keep_order_groups_append() {
        let mut ns = namespace(1, "prod");
        ns.insert(Member::Leaf(pod(1, "plain", None, None)));
        ns.insert(Member::Leaf(pod(2, "billing-a", None, Some("billing"))));
        ns.insert(Member::Leaf(pod(3, "plain2", None, None)));
        ns.insert(Member::Leaf(pod(4, "billing-b", None, Some("billing"))));

        let mut namespaces = vec![ns];
        group_namespaces(&mut namespaces);
        let ns = &namespaces[0];

        assert_eq!(member_ids(ns), vec!["pod_1", "pod_3", "ns_1_1"]);
        let Member::Group(system) = &ns.members()[2] else {
            panic!("expected a system container");
        };
        assert_eq!(system.kind, ContainerKind::System);
        assert_eq!(system.name, "billing");
        assert_eq!(member_ids(system), vec!["pod_2", "pod_4"]);
    }

    #[test]
    fn test_apps_nest_under_namespace_and_system_but_not_apps() {
        let mut ns = namespace(1, "prod");
        // App inside a system
        ns.insert(Member::Leaf(pod(1, "a", Some("checkout"), Some("shop"))));
        // App directly under the namespace
        ns.insert(Member::Leaf(pod(2, "b", Some("web"), None)));

        let mut namespaces = vec![ns];
        group_namespaces(&mut namespaces);
        let ns = &namespaces[0];

        // Direct members: system group then namespace-level app group
        assert_eq!(ns.len(), 2);
        let Member::Group(system) = &ns.members()[0] else {
            panic!("expected system first");
        };
        assert_eq!(system.name, "shop");
        let Member::Group(app_in_system) = &system.members()[0] else {
            panic!("expected app inside system");
        };
        assert_eq!(app_in_system.kind, ContainerKind::App);
        assert_eq!(app_in_system.name, "checkout");
        assert_eq!(app_in_system.id, "ns_1_1_1");
        assert_eq!(member_ids(app_in_system), vec!["pod_1"]);
        // App containers are never grouped again
        assert!(app_in_system
            .members()
            .iter()
            .all(|m| matches!(m, Member::Leaf(_))));

        let Member::Group(app) = &ns.members()[1] else {
            panic!("expected namespace-level app");
        };
        assert_eq!(app.kind, ContainerKind::App);
        assert_eq!(app.name, "web");
        assert_eq!(member_ids(app), vec!["pod_2"]);
    }

    #[test]
    fn test_grouping_is_a_partition() {
        let mut ns = namespace(1, "prod");
        for i in 1..=6 {
            let app = if i % 2 == 0 { Some("even") } else { None };
            let system = if i > 4 { Some("tail") } else { None };
            ns.insert(Member::Leaf(pod(i, &format!("p{i}"), app, system)));
        }
        let before = ns.leaves().len();

        let mut namespaces = vec![ns];
        group_namespaces(&mut namespaces);
        let after: Vec<_> = namespaces[0].leaves();

        assert_eq!(after.len(), before);
        let unique: std::collections::BTreeSet<_> = after.iter().map(|r| r.id()).collect();
        assert_eq!(unique.len(), before);
    }

    #[test]
    fn test_no_grouping_keys_leaves_container_untouched() {
        let mut ns = namespace(1, "prod");
        ns.insert(Member::Leaf(pod(1, "a", None, None)));
        ns.insert(Member::Leaf(pod(2, "b", None, None)));

        let mut namespaces = vec![ns];
        group_namespaces(&mut namespaces);
        assert_eq!(member_ids(&namespaces[0]), vec!["pod_1", "pod_2"]);
    }
}
