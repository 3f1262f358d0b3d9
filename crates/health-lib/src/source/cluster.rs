//! Kubernetes-backed resource source
//!
//! Lists pods and deployments through the cluster API and converts the
//! returned objects into snapshots.

use super::{async_trait, ResourceSource};
use crate::error::{HealthError, Result};
use crate::models::{ContainerSnapshot, DeploymentSnapshot, PodPhase, PodSnapshot, ResourceKind};
use anyhow::Context;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{ContainerStatus, Pod};
use kube::api::ListParams;
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Api, Client, Config, ResourceExt};
use std::path::PathBuf;
use tracing::{debug, info};

/// How to reach the cluster control plane
#[derive(Debug, Clone, Default)]
pub struct ClusterConnection {
    /// Explicit kubeconfig file. When unset the usual discovery applies:
    /// `KUBECONFIG`, then `~/.kube/config`, then the in-cluster service account.
    pub kubeconfig: Option<PathBuf>,
}

impl ClusterConnection {
    /// Build a client for the configured cluster
    pub async fn connect(&self) -> anyhow::Result<Client> {
        match &self.kubeconfig {
            Some(path) => {
                info!(kubeconfig = %path.display(), "Loading kubeconfig");
                let kubeconfig = Kubeconfig::read_from(path)
                    .with_context(|| format!("Failed to read kubeconfig {}", path.display()))?;
                let config =
                    Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
                        .await
                        .context("Failed to build client config from kubeconfig")?;
                Client::try_from(config).context("Failed to create Kubernetes client")
            }
            None => Client::try_default()
                .await
                .context("Failed to infer Kubernetes client configuration"),
        }
    }
}

/// Resource source backed by a `kube` client. Cloning is cheap and clones
/// share the underlying connection pool.
#[derive(Clone)]
pub struct KubeSource {
    client: Client,
}

impl KubeSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn api<K>(&self, namespace: Option<&str>) -> Api<K>
    where
        K: kube::Resource<Scope = k8s_openapi::NamespaceResourceScope>,
        <K as kube::Resource>::DynamicType: Default,
    {
        match namespace {
            Some(ns) => Api::namespaced(self.client.clone(), ns),
            None => Api::all(self.client.clone()),
        }
    }
}

#[async_trait]
impl ResourceSource for KubeSource {
    async fn list_pods(&self, namespace: Option<&str>) -> Result<Vec<PodSnapshot>> {
        let pods = self
            .api::<Pod>(namespace)
            .list(&ListParams::default())
            .await
            .map_err(|e| HealthError::source_unavailable(ResourceKind::Pods, e))?;

        debug!(count = pods.items.len(), "Listed pods");
        Ok(pods.items.iter().map(pod_snapshot).collect())
    }

    async fn list_deployments(&self, namespace: Option<&str>) -> Result<Vec<DeploymentSnapshot>> {
        let deployments = self
            .api::<Deployment>(namespace)
            .list(&ListParams::default())
            .await
            .map_err(|e| HealthError::source_unavailable(ResourceKind::Deployments, e))?;

        debug!(count = deployments.items.len(), "Listed deployments");
        deployments.items.iter().map(deployment_snapshot).collect()
    }
}

/// Capture the health-relevant status fields of a pod
pub fn pod_snapshot(pod: &Pod) -> PodSnapshot {
    let status = pod.status.as_ref();

    let ready_condition = status
        .and_then(|s| s.conditions.as_ref())
        .and_then(|conditions| conditions.iter().find(|c| c.type_ == "Ready"))
        .map(|c| c.status == "True");

    let container_statuses = status
        .and_then(|s| s.container_statuses.as_ref())
        .map(|statuses| statuses.iter().map(container_snapshot).collect())
        .unwrap_or_default();

    PodSnapshot {
        name: pod.name_any(),
        namespace: pod.namespace().unwrap_or_default(),
        phase: PodPhase::parse(status.and_then(|s| s.phase.as_deref())),
        ready_condition,
        container_statuses,
        failure_reason: status.and_then(|s| s.reason.clone()),
        failure_message: status.and_then(|s| s.message.clone()),
    }
}

fn container_snapshot(status: &ContainerStatus) -> ContainerSnapshot {
    let waiting = status.state.as_ref().and_then(|s| s.waiting.as_ref());

    ContainerSnapshot {
        name: status.name.clone(),
        ready: status.ready,
        waiting_reason: waiting.and_then(|w| w.reason.clone()),
        waiting_message: waiting.and_then(|w| w.message.clone()),
    }
}

/// Capture the replica counts of a deployment.
///
/// `spec.replicas` is required: a missing or negative value is reported as
/// malformed rather than read as zero. A missing `status.readyReplicas` is
/// zero, since the API server omits zero counts.
pub fn deployment_snapshot(deployment: &Deployment) -> Result<DeploymentSnapshot> {
    let name = deployment.name_any();
    let namespace = deployment.namespace().unwrap_or_default();

    let malformed = |field: &'static str| HealthError::MalformedSnapshot {
        kind: ResourceKind::Deployments,
        namespace: namespace.clone(),
        name: name.clone(),
        field,
    };

    let desired_replicas = deployment
        .spec
        .as_ref()
        .and_then(|spec| spec.replicas)
        .and_then(|replicas| u32::try_from(replicas).ok())
        .ok_or_else(|| malformed("spec.replicas"))?;

    let ready_replicas = deployment
        .status
        .as_ref()
        .and_then(|status| status.ready_replicas)
        .map(u32::try_from)
        .transpose()
        .map_err(|_| malformed("status.readyReplicas"))?
        .unwrap_or(0);

    Ok(DeploymentSnapshot {
        name,
        namespace,
        desired_replicas,
        ready_replicas,
    })
}
