//! Per-kind resource records
//!
//! Each `from_object` constructor turns one raw API object into a record,
//! assigning the caller-provided uid and deriving app/system membership
//! from the object's labels. Owner references are captured by their
//! declared name, exactly as written on the object; name-suffix heuristics
//! are deliberately avoided because generated-name trimming misattributes
//! ownership whenever a name itself contains dashes.

use std::collections::BTreeMap;

use k8s_openapi::api::apps::v1 as appsv1;
use k8s_openapi::api::batch::v1 as batchv1;
use k8s_openapi::api::core::v1 as corev1;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, OwnerReference};

use crate::error::{GraphError, GraphResult};
use crate::models::{NodeMeta, ResourceKind};

/// Extract the mandatory object name
fn required_name(metadata: &ObjectMeta, kind: ResourceKind) -> GraphResult<String> {
    metadata
        .name
        .clone()
        .ok_or(GraphError::MalformedResource {
            kind,
            field: "metadata.name",
        })
}

/// Extract the mandatory namespace of a namespaced object
fn required_namespace(metadata: &ObjectMeta, kind: ResourceKind) -> GraphResult<String> {
    metadata
        .namespace
        .clone()
        .ok_or(GraphError::MalformedResource {
            kind,
            field: "metadata.namespace",
        })
}

/// Labels as an owned map, empty when the object carries none
fn labels_of(metadata: &ObjectMeta) -> BTreeMap<String, String> {
    metadata.labels.clone().unwrap_or_default()
}

/// Find the owner reference of `owner_kind`, which must be singular
///
/// Zero references of that kind is a normal outcome (the owner may be
/// excluded from the listing or already deleted); more than one is a
/// data-integrity failure, rejected instead of silently picking one.
fn singular_owner(
    metadata: &ObjectMeta,
    kind: ResourceKind,
    owner_kind: &'static str,
    name: &str,
    namespace: &str,
) -> GraphResult<Option<String>> {
    let refs: Vec<&OwnerReference> = metadata
        .owner_references
        .as_deref()
        .unwrap_or_default()
        .iter()
        .filter(|r| r.kind == owner_kind)
        .collect();

    match refs.len() {
        0 => Ok(None),
        1 => Ok(Some(refs[0].name.clone())),
        count => Err(GraphError::AmbiguousOwnership {
            kind,
            name: name.to_string(),
            namespace: namespace.to_string(),
            owner_kind,
            count,
        }),
    }
}

/// A namespace, the top-level diagram container
#[derive(Debug, Clone)]
pub struct NamespaceRecord {
    pub meta: NodeMeta,
    pub status_phase: String,
}

impl NamespaceRecord {
    pub fn from_object(namespace: &corev1::Namespace, uid: u32) -> GraphResult<Self> {
        let name = required_name(&namespace.metadata, ResourceKind::Namespace)?;
        let status_phase = namespace
            .status
            .as_ref()
            .and_then(|s| s.phase.clone())
            .unwrap_or_else(|| "Unknown".to_string());

        Ok(Self {
            meta: NodeMeta::new(ResourceKind::Namespace, uid, name.clone(), name),
            status_phase,
        })
    }
}

/// A service with its label selectors
#[derive(Debug, Clone)]
pub struct ServiceRecord {
    pub meta: NodeMeta,
    pub selectors: BTreeMap<String, String>,
}

impl ServiceRecord {
    pub fn from_object(service: &corev1::Service, uid: u32) -> GraphResult<Self> {
        let name = required_name(&service.metadata, ResourceKind::Service)?;
        let namespace = required_namespace(&service.metadata, ResourceKind::Service)?;
        let selectors = service
            .spec
            .as_ref()
            .and_then(|s| s.selector.clone())
            .unwrap_or_default();

        Ok(Self {
            meta: NodeMeta::new(ResourceKind::Service, uid, name, namespace)
                .with_grouping_labels(&labels_of(&service.metadata)),
            selectors,
        })
    }
}

/// A pod with its labels and optional owner keys
#[derive(Debug, Clone)]
pub struct PodRecord {
    pub meta: NodeMeta,
    pub labels: BTreeMap<String, String>,
    pub owner_replica_set: Option<String>,
    pub owner_job: Option<String>,
}

impl PodRecord {
    pub fn from_object(pod: &corev1::Pod, uid: u32) -> GraphResult<Self> {
        let name = required_name(&pod.metadata, ResourceKind::Pod)?;
        let namespace = required_namespace(&pod.metadata, ResourceKind::Pod)?;
        let labels = labels_of(&pod.metadata);
        let owner_replica_set = singular_owner(
            &pod.metadata,
            ResourceKind::Pod,
            "ReplicaSet",
            &name,
            &namespace,
        )?;
        let owner_job =
            singular_owner(&pod.metadata, ResourceKind::Pod, "Job", &name, &namespace)?;

        Ok(Self {
            meta: NodeMeta::new(ResourceKind::Pod, uid, name, namespace)
                .with_grouping_labels(&labels),
            labels,
            owner_replica_set,
            owner_job,
        })
    }
}

/// A deployment; relationships come from replica sets pointing back at it
#[derive(Debug, Clone)]
pub struct DeploymentRecord {
    pub meta: NodeMeta,
}

impl DeploymentRecord {
    pub fn from_object(deployment: &appsv1::Deployment, uid: u32) -> GraphResult<Self> {
        let name = required_name(&deployment.metadata, ResourceKind::Deployment)?;
        let namespace = required_namespace(&deployment.metadata, ResourceKind::Deployment)?;

        Ok(Self {
            meta: NodeMeta::new(ResourceKind::Deployment, uid, name, namespace)
                .with_grouping_labels(&labels_of(&deployment.metadata)),
        })
    }
}

/// A replica set with its owning deployment, when one exists
#[derive(Debug, Clone)]
pub struct ReplicaSetRecord {
    pub meta: NodeMeta,
    pub owner_deployment: Option<String>,
}

impl ReplicaSetRecord {
    pub fn from_object(replica_set: &appsv1::ReplicaSet, uid: u32) -> GraphResult<Self> {
        let name = required_name(&replica_set.metadata, ResourceKind::ReplicaSet)?;
        let namespace = required_namespace(&replica_set.metadata, ResourceKind::ReplicaSet)?;
        let owner_deployment = singular_owner(
            &replica_set.metadata,
            ResourceKind::ReplicaSet,
            "Deployment",
            &name,
            &namespace,
        )?;

        Ok(Self {
            meta: NodeMeta::new(ResourceKind::ReplicaSet, uid, name, namespace)
                .with_grouping_labels(&labels_of(&replica_set.metadata)),
            owner_deployment,
        })
    }
}

/// A stateful set with its label selectors
#[derive(Debug, Clone)]
pub struct StatefulSetRecord {
    pub meta: NodeMeta,
    pub selectors: BTreeMap<String, String>,
}

impl StatefulSetRecord {
    pub fn from_object(stateful_set: &appsv1::StatefulSet, uid: u32) -> GraphResult<Self> {
        let name = required_name(&stateful_set.metadata, ResourceKind::StatefulSet)?;
        let namespace = required_namespace(&stateful_set.metadata, ResourceKind::StatefulSet)?;
        let selectors = stateful_set
            .spec
            .as_ref()
            .and_then(|s| s.selector.match_labels.clone())
            .unwrap_or_default();

        Ok(Self {
            meta: NodeMeta::new(ResourceKind::StatefulSet, uid, name, namespace)
                .with_grouping_labels(&labels_of(&stateful_set.metadata)),
            selectors,
        })
    }
}

/// A job with its owning cron job, when one exists
#[derive(Debug, Clone)]
pub struct JobRecord {
    pub meta: NodeMeta,
    pub owner_cron_job: Option<String>,
}

impl JobRecord {
    pub fn from_object(job: &batchv1::Job, uid: u32) -> GraphResult<Self> {
        let name = required_name(&job.metadata, ResourceKind::Job)?;
        let namespace = required_namespace(&job.metadata, ResourceKind::Job)?;
        let owner_cron_job = singular_owner(
            &job.metadata,
            ResourceKind::Job,
            "CronJob",
            &name,
            &namespace,
        )?;

        Ok(Self {
            meta: NodeMeta::new(ResourceKind::Job, uid, name, namespace)
                .with_grouping_labels(&labels_of(&job.metadata)),
            owner_cron_job,
        })
    }
}

/// A cron job; relationships come from jobs pointing back at it
#[derive(Debug, Clone)]
pub struct CronJobRecord {
    pub meta: NodeMeta,
}

impl CronJobRecord {
    pub fn from_object(cron_job: &batchv1::CronJob, uid: u32) -> GraphResult<Self> {
        let name = required_name(&cron_job.metadata, ResourceKind::CronJob)?;
        let namespace = required_namespace(&cron_job.metadata, ResourceKind::CronJob)?;

        Ok(Self {
            meta: NodeMeta::new(ResourceKind::CronJob, uid, name, namespace)
                .with_grouping_labels(&labels_of(&cron_job.metadata)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;

    fn meta(name: &str, namespace: &str) -> ObjectMeta {
        ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        }
    }

    fn owner_ref(kind: &str, name: &str) -> OwnerReference {
        OwnerReference {
            api_version: "apps/v1".to_string(),
            kind: kind.to_string(),
            name: name.to_string(),
            uid: "00000000-0000-0000-0000-000000000000".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_pod_from_object_captures_owner_names_exactly() {
        let mut metadata = meta("web-7c5d-x2k", "prod");
        metadata.owner_references = Some(vec![owner_ref("ReplicaSet", "web-7c5d")]);
        metadata.labels = Some(
            [("app".to_string(), "web".to_string())]
                .into_iter()
                .collect(),
        );
        let pod = corev1::Pod {
            metadata,
            ..Default::default()
        };

        let record = PodRecord::from_object(&pod, 1).unwrap();
        assert_eq!(record.meta.id, "pod_1");
        assert_eq!(record.meta.name, "web-7c5d-x2k");
        // Declared owner name, not a trimmed suffix
        assert_eq!(record.owner_replica_set, Some("web-7c5d".to_string()));
        assert_eq!(record.owner_job, None);
        assert_eq!(record.meta.app, Some("web".to_string()));
    }

    #[test]
    fn test_pod_missing_name_is_malformed() {
        let pod = corev1::Pod {
            metadata: ObjectMeta {
                namespace: Some("prod".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };

        let err = PodRecord::from_object(&pod, 1).unwrap_err();
        assert!(matches!(
            err,
            GraphError::MalformedResource {
                kind: ResourceKind::Pod,
                field: "metadata.name"
            }
        ));
    }

    #[test]
    fn test_replica_set_without_deployment_owner_has_no_key() {
        let rs = appsv1::ReplicaSet {
            metadata: meta("orphan-rs", "prod"),
            ..Default::default()
        };

        let record = ReplicaSetRecord::from_object(&rs, 1).unwrap();
        assert_eq!(record.owner_deployment, None);
    }

    #[test]
    fn test_replica_set_with_two_deployment_owners_is_ambiguous() {
        let mut metadata = meta("web-7c5d", "prod");
        metadata.owner_references = Some(vec![
            owner_ref("Deployment", "web"),
            owner_ref("Deployment", "web-canary"),
        ]);
        let rs = appsv1::ReplicaSet {
            metadata,
            ..Default::default()
        };

        let err = ReplicaSetRecord::from_object(&rs, 1).unwrap_err();
        match err {
            GraphError::AmbiguousOwnership {
                owner_kind, count, ..
            } => {
                assert_eq!(owner_kind, "Deployment");
                assert_eq!(count, 2);
            }
            other => panic!("expected AmbiguousOwnership, got {other:?}"),
        }
    }

    #[test]
    fn test_service_without_spec_has_empty_selectors() {
        let svc = corev1::Service {
            metadata: meta("headless", "prod"),
            ..Default::default()
        };

        let record = ServiceRecord::from_object(&svc, 3).unwrap();
        assert_eq!(record.meta.id, "svc_3");
        assert!(record.selectors.is_empty());
    }

    #[test]
    fn test_stateful_set_selectors_from_match_labels() {
        let sts = appsv1::StatefulSet {
            metadata: meta("db", "prod"),
            spec: Some(appsv1::StatefulSetSpec {
                selector: LabelSelector {
                    match_labels: Some(
                        [("app".to_string(), "db".to_string())].into_iter().collect(),
                    ),
                    ..Default::default()
                },
                ..Default::default()
            }),
            ..Default::default()
        };

        let record = StatefulSetRecord::from_object(&sts, 1).unwrap();
        assert_eq!(record.selectors.get("app"), Some(&"db".to_string()));
    }

    #[test]
    fn test_namespace_status_phase_defaults_to_unknown() {
        let ns = corev1::Namespace {
            metadata: ObjectMeta {
                name: Some("prod".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };

        let record = NamespaceRecord::from_object(&ns, 1).unwrap();
        assert_eq!(record.meta.id, "ns_1");
        assert_eq!(record.status_phase, "Unknown");
        // A namespace is its own namespace for containment purposes
        assert_eq!(record.meta.namespace, "prod");
    }

    #[test]
    fn test_job_owned_by_cron_job() {
        let mut metadata = meta("nightly-29041", "batch");
        metadata.owner_references = Some(vec![owner_ref("CronJob", "nightly")]);
        let job = batchv1::Job {
            metadata,
            ..Default::default()
        };

        let record = JobRecord::from_object(&job, 2).unwrap();
        assert_eq!(record.owner_cron_job, Some("nightly".to_string()));
    }
}
