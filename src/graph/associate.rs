//! Association engine
//!
//! Computes every cross-kind relationship over fully-populated per-kind
//! collections, then moves the resources into their namespace containers.
//! The collections are immutable-during-processing snapshots; association
//! is single threaded and runs to completion before grouping starts.
//!
//! Matching rules, in dependency order:
//! 1. containment - every resource must belong to a listed namespace
//! 2. selector match - Service/StatefulSet selectors vs pod labels
//! 3. ownership match - exact owner-reference name, scoped by namespace

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::error::{GraphError, GraphResult};
use crate::graph::{Container, Member, Resource};
use crate::models::{
    CronJobRecord, DeploymentRecord, JobRecord, NamespaceRecord, PodRecord, ReplicaSetRecord,
    ServiceRecord, StatefulSetRecord,
};

/// Per-kind collections handed over by ingestion, in listing order
#[derive(Debug, Default)]
pub struct ClusterResources {
    pub namespaces: Vec<NamespaceRecord>,
    pub services: Vec<ServiceRecord>,
    pub pods: Vec<PodRecord>,
    pub deployments: Vec<DeploymentRecord>,
    pub replica_sets: Vec<ReplicaSetRecord>,
    pub stateful_sets: Vec<StatefulSetRecord>,
    pub jobs: Vec<JobRecord>,
    pub cron_jobs: Vec<CronJobRecord>,
}

/// Run all association steps and return the populated namespace containers
///
/// Fails fast on a dangling namespace reference; missing owners and
/// zero-match selectors are normal, zero-relationship outcomes.
pub fn associate(mut resources: ClusterResources) -> GraphResult<Vec<Container>> {
    check_containment(&resources)?;
    match_selectors(&mut resources);
    match_ownership(&mut resources);
    Ok(into_namespace_containers(resources))
}

/// Step 1: every resource's namespace must be in the namespace collection
fn check_containment(resources: &ClusterResources) -> GraphResult<()> {
    let known: BTreeSet<&str> = resources
        .namespaces
        .iter()
        .map(|n| n.meta.name.as_str())
        .collect();

    let check = |meta: &crate::models::NodeMeta| -> GraphResult<()> {
        if known.contains(meta.namespace.as_str()) {
            Ok(())
        } else {
            Err(GraphError::DanglingReference {
                kind: meta.kind,
                name: meta.name.clone(),
                namespace: meta.namespace.clone(),
            })
        }
    };

    for r in &resources.services {
        check(&r.meta)?;
    }
    for r in &resources.pods {
        check(&r.meta)?;
    }
    for r in &resources.deployments {
        check(&r.meta)?;
    }
    for r in &resources.replica_sets {
        check(&r.meta)?;
    }
    for r in &resources.stateful_sets {
        check(&r.meta)?;
    }
    for r in &resources.jobs {
        check(&r.meta)?;
    }
    for r in &resources.cron_jobs {
        check(&r.meta)?;
    }
    Ok(())
}

/// A pod matches when every selector pair is present in its labels
///
/// An empty selector set matches nothing: selector-less services (headless,
/// ExternalName) have no managed pods, they do not manage all of them.
fn selector_matches(selectors: &BTreeMap<String, String>, labels: &BTreeMap<String, String>) -> bool {
    if selectors.is_empty() {
        return false;
    }
    selectors
        .iter()
        .all(|(key, value)| labels.get(key) == Some(value))
}

/// Step 2: Service -> Pod and StatefulSet -> Pod selector matching
fn match_selectors(resources: &mut ClusterResources) {
    for service in &mut resources.services {
        for pod in &resources.pods {
            if selector_matches(&service.selectors, &pod.labels) {
                service.meta.related.push(pod.meta.id.clone());
            }
        }
        tracing::debug!(
            service = %service.meta.name,
            pods = service.meta.related.len(),
            "selector match"
        );
    }

    for stateful_set in &mut resources.stateful_sets {
        for pod in &resources.pods {
            if selector_matches(&stateful_set.selectors, &pod.labels) {
                stateful_set.meta.related.push(pod.meta.id.clone());
            }
        }
    }
}

/// Step 3: ownership lookups by declared owner name, scoped by namespace
///
/// A key with no matching owner record is dropped without error: the owner
/// may be excluded from the listing or already deleted, and the resource
/// then simply has no incoming ownership edge.
fn match_ownership(resources: &mut ClusterResources) {
    fn index_by_name<'a, T, F>(items: &'a [T], key: F) -> HashMap<(&'a str, &'a str), usize>
    where
        F: Fn(&'a T) -> (&'a str, &'a str),
    {
        items.iter().enumerate().map(|(i, r)| (key(r), i)).collect()
    }

    // The lookup maps borrow the owner vectors, so edges are collected as
    // (owner index, child id) pairs first and applied once the map is gone

    // Deployment -> ReplicaSet
    let deployments_by_name = index_by_name(&resources.deployments, |d: &DeploymentRecord| {
        (d.meta.namespace.as_str(), d.meta.name.as_str())
    });
    let mut deployment_edges: Vec<(usize, String)> = Vec::new();
    for rs in &resources.replica_sets {
        let Some(owner) = &rs.owner_deployment else {
            continue;
        };
        match deployments_by_name.get(&(rs.meta.namespace.as_str(), owner.as_str())) {
            Some(&i) => deployment_edges.push((i, rs.meta.id.clone())),
            None => tracing::debug!(
                replica_set = %rs.meta.name,
                owner = %owner,
                "owning deployment not in listing, skipping edge"
            ),
        }
    }
    drop(deployments_by_name);
    for (i, id) in deployment_edges {
        resources.deployments[i].meta.related.push(id);
    }

    // ReplicaSet -> Pod and Job -> Pod
    let replica_sets_by_name = index_by_name(&resources.replica_sets, |r: &ReplicaSetRecord| {
        (r.meta.namespace.as_str(), r.meta.name.as_str())
    });
    let jobs_by_name = index_by_name(&resources.jobs, |j: &JobRecord| {
        (j.meta.namespace.as_str(), j.meta.name.as_str())
    });
    let mut replica_set_edges: Vec<(usize, String)> = Vec::new();
    let mut job_edges: Vec<(usize, String)> = Vec::new();
    for pod in &resources.pods {
        if let Some(owner) = &pod.owner_replica_set {
            match replica_sets_by_name.get(&(pod.meta.namespace.as_str(), owner.as_str())) {
                Some(&i) => replica_set_edges.push((i, pod.meta.id.clone())),
                None => tracing::debug!(
                    pod = %pod.meta.name,
                    owner = %owner,
                    "owning replica set not in listing, skipping edge"
                ),
            }
        }
        if let Some(owner) = &pod.owner_job {
            match jobs_by_name.get(&(pod.meta.namespace.as_str(), owner.as_str())) {
                Some(&i) => job_edges.push((i, pod.meta.id.clone())),
                None => tracing::debug!(
                    pod = %pod.meta.name,
                    owner = %owner,
                    "owning job not in listing, skipping edge"
                ),
            }
        }
    }
    drop(replica_sets_by_name);
    drop(jobs_by_name);
    for (i, id) in replica_set_edges {
        resources.replica_sets[i].meta.related.push(id);
    }
    for (i, id) in job_edges {
        resources.jobs[i].meta.related.push(id);
    }

    // CronJob -> Job
    let cron_jobs_by_name = index_by_name(&resources.cron_jobs, |c: &CronJobRecord| {
        (c.meta.namespace.as_str(), c.meta.name.as_str())
    });
    let mut cron_job_edges: Vec<(usize, String)> = Vec::new();
    for job in &resources.jobs {
        let Some(owner) = &job.owner_cron_job else {
            continue;
        };
        match cron_jobs_by_name.get(&(job.meta.namespace.as_str(), owner.as_str())) {
            Some(&i) => cron_job_edges.push((i, job.meta.id.clone())),
            None => tracing::debug!(
                job = %job.meta.name,
                owner = %owner,
                "owning cron job not in listing, skipping edge"
            ),
        }
    }
    drop(cron_jobs_by_name);
    for (i, id) in cron_job_edges {
        resources.cron_jobs[i].meta.related.push(id);
    }
}

/// Move every resource into its namespace container, kind by kind
fn into_namespace_containers(resources: ClusterResources) -> Vec<Container> {
    let mut containers: Vec<Container> = resources
        .namespaces
        .into_iter()
        .map(Container::from_namespace)
        .collect();
    let by_name: HashMap<String, usize> = containers
        .iter()
        .enumerate()
        .map(|(i, c)| (c.name.clone(), i))
        .collect();

    let mut place = |resource: Resource| {
        // Containment was validated up front, so the lookup cannot miss
        if let Some(&i) = by_name.get(resource.meta().namespace.as_str()) {
            containers[i].insert(Member::Leaf(resource));
        }
    };

    for r in resources.services {
        place(Resource::Service(r));
    }
    for r in resources.pods {
        place(Resource::Pod(r));
    }
    for r in resources.deployments {
        place(Resource::Deployment(r));
    }
    for r in resources.replica_sets {
        place(Resource::ReplicaSet(r));
    }
    for r in resources.stateful_sets {
        place(Resource::StatefulSet(r));
    }
    for r in resources.jobs {
        place(Resource::Job(r));
    }
    for r in resources.cron_jobs {
        place(Resource::CronJob(r));
    }

    containers
}
