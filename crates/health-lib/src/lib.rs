//! Pod and deployment health classification
//!
//! This crate provides the core functionality for:
//! - Capturing pod and deployment status as immutable snapshots
//! - Classifying pod health and aggregating deployment replica counts
//! - Scan passes over a shared resource source, on demand or on a schedule
//! - Reporting sinks, agent self-health and observability

pub mod aggregator;
pub mod classifier;
pub mod error;
pub mod health;
pub mod models;
pub mod observability;
pub mod report;
pub mod scan;
pub mod scheduler;
pub mod source;

#[cfg(test)]
mod testing;

pub use aggregator::aggregate;
pub use classifier::classify;
pub use error::{HealthError, Result};
pub use health::{
    ComponentHealth, ComponentStatus, HealthRegistry, HealthResponse, ReadinessResponse,
};
pub use models::*;
pub use observability::{AgentMetrics, StructuredLogger};
pub use report::{LogSink, ReportSink};
pub use scan::{ScanPass, Scanner, Verdicts};
pub use scheduler::{OverlapPolicy, ScanScheduler, SchedulerConfig};
pub use source::{ClusterConnection, KubeSource, ResourceSource};
