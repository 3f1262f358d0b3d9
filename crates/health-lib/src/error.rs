//! Error types for scan passes

use crate::models::ResourceKind;
use thiserror::Error;

pub type Result<T, E = HealthError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum HealthError {
    /// The resource source could not produce a complete list for this pass
    #[error("failed to list {kind}: {source}")]
    SourceUnavailable {
        kind: ResourceKind,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A field required by the snapshot model was absent or out of range
    #[error("{kind} {namespace}/{name} is missing required field `{field}`")]
    MalformedSnapshot {
        kind: ResourceKind,
        namespace: String,
        name: String,
        field: &'static str,
    },
}

impl HealthError {
    pub fn source_unavailable(
        kind: ResourceKind,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        HealthError::SourceUnavailable {
            kind,
            source: source.into(),
        }
    }

    /// Label used for metrics and log fields
    pub fn kind_label(&self) -> &'static str {
        match self {
            HealthError::SourceUnavailable { .. } => "source_unavailable",
            HealthError::MalformedSnapshot { .. } => "malformed_snapshot",
        }
    }
}
