//! Parse pipeline
//!
//! Turns one cluster snapshot into a finished graph: ingestion (typed
//! records with per-kind uids) -> association -> grouping -> aggregate
//! assembly with namespace filtering. Single threaded and synchronous; all
//! fatal conditions abort the run with no partial graph.

use crate::error::GraphResult;
use crate::graph::associate::{associate, ClusterResources};
use crate::graph::group::group_namespaces;
use crate::graph::{Graph, NamespaceFilter};
use crate::kube::ClusterSnapshot;
use crate::models::{
    CronJobRecord, DeploymentRecord, JobRecord, NamespaceRecord, PodRecord, ReplicaSetRecord,
    ServiceRecord, StatefulSetRecord, UidSequence,
};

/// Build typed records from the raw snapshot, assigning per-kind uids in
/// listing order
pub fn ingest(snapshot: &ClusterSnapshot) -> GraphResult<ClusterResources> {
    fn ingest_kind<O, R>(
        objects: &[O],
        from_object: impl Fn(&O, u32) -> GraphResult<R>,
    ) -> GraphResult<Vec<R>> {
        let mut seq = UidSequence::new();
        objects
            .iter()
            .map(|object| from_object(object, seq.next_uid()))
            .collect()
    }

    let resources = ClusterResources {
        namespaces: ingest_kind(&snapshot.namespaces, NamespaceRecord::from_object)?,
        services: ingest_kind(&snapshot.services, ServiceRecord::from_object)?,
        pods: ingest_kind(&snapshot.pods, PodRecord::from_object)?,
        deployments: ingest_kind(&snapshot.deployments, DeploymentRecord::from_object)?,
        replica_sets: ingest_kind(&snapshot.replica_sets, ReplicaSetRecord::from_object)?,
        stateful_sets: ingest_kind(&snapshot.stateful_sets, StatefulSetRecord::from_object)?,
        jobs: ingest_kind(&snapshot.jobs, JobRecord::from_object)?,
        cron_jobs: ingest_kind(&snapshot.cron_jobs, CronJobRecord::from_object)?,
    };

    for namespace in &resources.namespaces {
        tracing::debug!(
            namespace = %namespace.meta.name,
            phase = %namespace.status_phase,
            "ingested namespace"
        );
    }

    Ok(resources)
}

/// Run the full pipeline over a materialized snapshot
pub fn parse_snapshot(snapshot: &ClusterSnapshot, filter: &NamespaceFilter) -> GraphResult<Graph> {
    let resources = ingest(snapshot)?;
    let mut namespaces = associate(resources)?;
    group_namespaces(&mut namespaces);

    let mut graph = Graph::new();
    graph.insert_namespaces(namespaces, filter);
    Ok(graph)
}
