//! Core data models for pod and deployment health
//!
//! Snapshots are immutable point-in-time copies of what the cluster reported
//! for one resource. Verdicts are what the classifier and aggregator derive
//! from them. Both are built fresh for every scan pass and never cached.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of resource a scan pass covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Pods,
    Deployments,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Pods => "pods",
            ResourceKind::Deployments => "deployments",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse pod lifecycle phase as reported by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PodPhase {
    Pending,
    Running,
    Succeeded,
    Failed,
    Unknown,
}

impl PodPhase {
    /// Parse a platform phase string. Anything unrecognised, including an
    /// absent phase, is `Unknown`.
    pub fn parse(phase: Option<&str>) -> Self {
        match phase {
            Some("Pending") => PodPhase::Pending,
            Some("Running") => PodPhase::Running,
            Some("Succeeded") => PodPhase::Succeeded,
            Some("Failed") => PodPhase::Failed,
            _ => PodPhase::Unknown,
        }
    }
}

/// Observed status of a single container within a pod
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerSnapshot {
    pub name: String,
    pub ready: bool,
    pub waiting_reason: Option<String>,
    pub waiting_message: Option<String>,
}

impl ContainerSnapshot {
    pub fn new(name: impl Into<String>, ready: bool) -> Self {
        Self {
            name: name.into(),
            ready,
            waiting_reason: None,
            waiting_message: None,
        }
    }

    /// Attach the reason and message of a waiting state
    pub fn waiting(mut self, reason: impl Into<String>, message: impl Into<String>) -> Self {
        self.waiting_reason = Some(reason.into());
        self.waiting_message = Some(message.into());
        self
    }
}

/// Observed status of one pod at fetch time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PodSnapshot {
    pub name: String,
    pub namespace: String,
    pub phase: PodPhase,
    /// `Some(true)` when a `Ready` condition is present and true
    pub ready_condition: Option<bool>,
    /// In the order the platform reported them
    pub container_statuses: Vec<ContainerSnapshot>,
    pub failure_reason: Option<String>,
    pub failure_message: Option<String>,
}

impl PodSnapshot {
    pub fn new(name: impl Into<String>, namespace: impl Into<String>, phase: PodPhase) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            phase,
            ready_condition: None,
            container_statuses: Vec::new(),
            failure_reason: None,
            failure_message: None,
        }
    }

    pub fn with_ready_condition(mut self, ready: bool) -> Self {
        self.ready_condition = Some(ready);
        self
    }

    pub fn with_container(mut self, container: ContainerSnapshot) -> Self {
        self.container_statuses.push(container);
        self
    }

    pub fn with_failure(mut self, reason: impl Into<String>, message: impl Into<String>) -> Self {
        self.failure_reason = Some(reason.into());
        self.failure_message = Some(message.into());
        self
    }
}

/// Derived health status of a pod
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PodStatus {
    Ready,
    NotReady,
    Pending,
    Running,
    Succeeded,
    Failed,
    Unknown,
}

impl PodStatus {
    pub const ALL: [PodStatus; 7] = [
        PodStatus::Ready,
        PodStatus::NotReady,
        PodStatus::Pending,
        PodStatus::Running,
        PodStatus::Succeeded,
        PodStatus::Failed,
        PodStatus::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PodStatus::Ready => "Ready",
            PodStatus::NotReady => "NotReady",
            PodStatus::Pending => "Pending",
            PodStatus::Running => "Running",
            PodStatus::Succeeded => "Succeeded",
            PodStatus::Failed => "Failed",
            PodStatus::Unknown => "Unknown",
        }
    }
}

impl From<PodPhase> for PodStatus {
    fn from(phase: PodPhase) -> Self {
        match phase {
            PodPhase::Pending => PodStatus::Pending,
            PodPhase::Running => PodStatus::Running,
            PodPhase::Succeeded => PodStatus::Succeeded,
            PodPhase::Failed => PodStatus::Failed,
            PodPhase::Unknown => PodStatus::Unknown,
        }
    }
}

impl fmt::Display for PodStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Readiness of one container as surfaced in a verdict
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerReadiness {
    pub name: String,
    pub ready: bool,
}

/// Health verdict for one pod
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodVerdict {
    pub name: String,
    pub namespace: String,
    pub status: PodStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub containers: Vec<ContainerReadiness>,
}

/// Observed replica counts of one deployment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentSnapshot {
    pub name: String,
    pub namespace: String,
    pub desired_replicas: u32,
    pub ready_replicas: u32,
}

/// Replica-count verdict for one deployment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplicaVerdict {
    pub name: String,
    pub namespace: String,
    pub desired_replicas: u32,
    pub ready_replicas: u32,
}
