//! Resource sources
//!
//! A [`ResourceSource`] returns the full current list of pods or deployments
//! as snapshots, or fails for the whole list. It is shared between the
//! background scheduler and request handlers, so implementations must be
//! safe for concurrent use.

mod cluster;

pub use cluster::{deployment_snapshot, pod_snapshot, ClusterConnection, KubeSource};

use crate::error::Result;
use crate::models::{DeploymentSnapshot, PodSnapshot};

pub use async_trait::async_trait;

/// Lists resources from the cluster. `None` means all namespaces.
#[async_trait]
pub trait ResourceSource: Send + Sync {
    /// List every pod, in the order the cluster returned them
    async fn list_pods(&self, namespace: Option<&str>) -> Result<Vec<PodSnapshot>>;

    /// List every deployment, in the order the cluster returned them
    async fn list_deployments(&self, namespace: Option<&str>) -> Result<Vec<DeploymentSnapshot>>;
}
