//! Deployment replica aggregation

use crate::models::{DeploymentSnapshot, ReplicaVerdict};

/// Copy a deployment's replica counts into a verdict.
///
/// A missing desired count never reaches this point: snapshot construction
/// rejects it as malformed instead of reading it as zero.
pub fn aggregate(snapshot: &DeploymentSnapshot) -> ReplicaVerdict {
    ReplicaVerdict {
        name: snapshot.name.clone(),
        namespace: snapshot.namespace.clone(),
        desired_replicas: snapshot.desired_replicas,
        ready_replicas: snapshot.ready_replicas,
    }
}
