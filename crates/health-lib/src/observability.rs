//! Observability infrastructure for the health agent
//!
//! Provides:
//! - Prometheus metrics (scan pass latency, failures, resources scanned, pods by status)
//! - Structured JSON logging with tracing

use crate::models::{PodStatus, PodVerdict, ResourceKind};
use chrono::{DateTime, Utc};
use prometheus::{
    register_histogram_vec, register_int_counter, register_int_counter_vec,
    register_int_gauge_vec, HistogramVec, IntCounter, IntCounterVec, IntGaugeVec,
};
use std::collections::HashMap;
use std::sync::OnceLock;
use tracing::{info, warn};

/// Histogram buckets for scan pass latency (in seconds). A pass is one list
/// call against the control plane, so these span milliseconds to tens of seconds.
const SCAN_LATENCY_BUCKETS: &[f64] = &[
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0,
];

/// Timestamp layout of the pass header line
pub const PASS_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<AgentMetricsInner> = OnceLock::new();

struct AgentMetricsInner {
    scan_latency_seconds: HistogramVec,
    scan_failures: IntCounterVec,
    resources_scanned: IntGaugeVec,
    pods_by_status: IntGaugeVec,
    scheduled_passes_skipped: IntCounter,
}

impl AgentMetricsInner {
    fn new() -> Self {
        Self {
            scan_latency_seconds: register_histogram_vec!(
                "health_agent_scan_latency_seconds",
                "Time spent on one complete scan pass",
                &["kind"],
                SCAN_LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register scan_latency_seconds"),

            scan_failures: register_int_counter_vec!(
                "health_agent_scan_failures_total",
                "Scan passes that failed, by resource kind and error",
                &["kind", "error"]
            )
            .expect("Failed to register scan_failures_total"),

            resources_scanned: register_int_gauge_vec!(
                "health_agent_resources_scanned",
                "Number of resources evaluated by the latest successful pass",
                &["kind"]
            )
            .expect("Failed to register resources_scanned"),

            pods_by_status: register_int_gauge_vec!(
                "health_agent_pods_by_status",
                "Pods per health status as of the latest scheduled pass",
                &["status"]
            )
            .expect("Failed to register pods_by_status"),

            scheduled_passes_skipped: register_int_counter!(
                "health_agent_scheduled_passes_skipped_total",
                "Scheduled ticks dropped because the previous pass was still running"
            )
            .expect("Failed to register scheduled_passes_skipped_total"),
        }
    }
}

/// Agent metrics for Prometheus exposition
///
/// This is a lightweight handle to the global metrics instance.
/// Multiple clones share the same underlying metrics.
#[derive(Clone)]
pub struct AgentMetrics {
    _private: (),
}

impl Default for AgentMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentMetrics {
    /// Create a new metrics handle (initializes global metrics if needed)
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(AgentMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &AgentMetricsInner {
        GLOBAL_METRICS.get().expect("Metrics not initialized")
    }

    /// Record a successful pass
    pub fn observe_scan(&self, kind: ResourceKind, duration_secs: f64, count: usize) {
        let inner = self.inner();
        inner
            .scan_latency_seconds
            .with_label_values(&[kind.as_str()])
            .observe(duration_secs);
        inner
            .resources_scanned
            .with_label_values(&[kind.as_str()])
            .set(count as i64);
    }

    /// Record a failed pass
    pub fn inc_scan_failures(&self, kind: ResourceKind, error: &str) {
        self.inner()
            .scan_failures
            .with_label_values(&[kind.as_str(), error])
            .inc();
    }

    /// Replace the per-status pod counts with those of `verdicts`
    pub fn set_pod_statuses(&self, verdicts: &[PodVerdict]) {
        let mut counts: HashMap<PodStatus, i64> = HashMap::new();
        for verdict in verdicts {
            *counts.entry(verdict.status).or_default() += 1;
        }

        for status in PodStatus::ALL {
            self.inner()
                .pods_by_status
                .with_label_values(&[status.as_str()])
                .set(counts.get(&status).copied().unwrap_or(0));
        }
    }

    pub fn inc_scheduled_passes_skipped(&self) {
        self.inner().scheduled_passes_skipped.inc();
    }
}

/// Structured logger for agent events
///
/// Provides consistent JSON-formatted logging for scan passes, verdicts
/// and lifecycle events.
#[derive(Clone)]
pub struct StructuredLogger {
    instance: String,
}

impl StructuredLogger {
    pub fn new(instance: impl Into<String>) -> Self {
        Self {
            instance: instance.into(),
        }
    }

    /// Log the header line of a pass
    pub fn log_pass_header(&self, scanned_at: DateTime<Utc>, count: usize) {
        info!(
            event = "scan_pass",
            instance = %self.instance,
            scanned_at = %scanned_at.format(PASS_TIMESTAMP_FORMAT),
            pods = count,
            "Scanning at {}...",
            scanned_at.format(PASS_TIMESTAMP_FORMAT)
        );
    }

    /// Log one pod verdict
    pub fn log_pod_verdict(&self, verdict: &PodVerdict) {
        info!(
            event = "pod_verdict",
            instance = %self.instance,
            pod_name = %verdict.name,
            namespace = %verdict.namespace,
            status = %verdict.status,
            reason = verdict.reason.as_deref(),
            "Pod Name: {}, Namespace: {}, Status: {}",
            verdict.name,
            verdict.namespace,
            verdict.status
        );
    }

    /// Log a pass that could not complete
    pub fn log_pass_failed(&self, kind: ResourceKind, error: &dyn std::error::Error) {
        warn!(
            event = "scan_failed",
            instance = %self.instance,
            kind = %kind,
            error = %error,
            "Scan pass failed, waiting for next tick"
        );
    }

    /// Log agent startup
    pub fn log_startup(&self, version: &str, scan_interval_secs: u64) {
        info!(
            event = "agent_started",
            instance = %self.instance,
            agent_version = %version,
            scan_interval_secs = scan_interval_secs,
            "Health agent started"
        );
    }

    /// Log agent shutdown
    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "agent_shutdown",
            instance = %self.instance,
            reason = %reason,
            "Health agent shutting down"
        );
    }
}
