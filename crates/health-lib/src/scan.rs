//! Scan passes
//!
//! A pass fetches the complete current list of one resource kind and
//! classifies every entry in the order received. Passes are independent:
//! nothing is carried over between them and nothing is retried.

use crate::aggregator::aggregate;
use crate::classifier::classify;
use crate::error::Result;
use crate::models::{PodVerdict, ReplicaVerdict, ResourceKind};
use crate::observability::AgentMetrics;
use crate::source::ResourceSource;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Verdicts produced by one complete pass
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanPass<V> {
    pub scanned_at: DateTime<Utc>,
    pub verdicts: Vec<V>,
}

impl<V> ScanPass<V> {
    pub fn len(&self) -> usize {
        self.verdicts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.verdicts.is_empty()
    }
}

/// Result of a pass over either kind
#[derive(Debug, Clone)]
pub enum Verdicts {
    Pods(ScanPass<PodVerdict>),
    Deployments(ScanPass<ReplicaVerdict>),
}

impl Verdicts {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Verdicts::Pods(_) => ResourceKind::Pods,
            Verdicts::Deployments(_) => ResourceKind::Deployments,
        }
    }
}

/// Runs scan passes against a shared resource source
#[derive(Clone)]
pub struct Scanner {
    source: Arc<dyn ResourceSource>,
    namespace: Option<String>,
    metrics: AgentMetrics,
}

impl Scanner {
    /// Scan all namespaces through `source`
    pub fn new(source: Arc<dyn ResourceSource>) -> Self {
        Self {
            source,
            namespace: None,
            metrics: AgentMetrics::new(),
        }
    }

    /// Restrict passes to a single namespace
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Run one pass over `kind`
    pub async fn scan(&self, kind: ResourceKind) -> Result<Verdicts> {
        match kind {
            ResourceKind::Pods => self.scan_pods().await.map(Verdicts::Pods),
            ResourceKind::Deployments => self.scan_deployments().await.map(Verdicts::Deployments),
        }
    }

    /// Fetch and classify every pod. The pass is stamped when the list arrives.
    pub async fn scan_pods(&self) -> Result<ScanPass<PodVerdict>> {
        let start = Instant::now();
        let result = self.source.list_pods(self.namespace()).await;
        let scanned_at = Utc::now();
        let pass = self.finish(ResourceKind::Pods, start, result, |snapshots| {
            snapshots.iter().map(classify).collect()
        })?;

        Ok(ScanPass {
            scanned_at,
            verdicts: pass,
        })
    }

    /// Fetch and aggregate every deployment
    pub async fn scan_deployments(&self) -> Result<ScanPass<ReplicaVerdict>> {
        let start = Instant::now();
        let result = self.source.list_deployments(self.namespace()).await;
        let scanned_at = Utc::now();
        let pass = self.finish(ResourceKind::Deployments, start, result, |snapshots| {
            snapshots.iter().map(aggregate).collect()
        })?;

        Ok(ScanPass {
            scanned_at,
            verdicts: pass,
        })
    }

    fn finish<S, V>(
        &self,
        kind: ResourceKind,
        start: Instant,
        result: Result<Vec<S>>,
        evaluate: impl FnOnce(&[S]) -> Vec<V>,
    ) -> Result<Vec<V>> {
        let elapsed = start.elapsed();

        match result {
            Ok(snapshots) => {
                let verdicts = evaluate(&snapshots);
                self.metrics.observe_scan(kind, elapsed.as_secs_f64(), verdicts.len());
                debug!(
                    kind = %kind,
                    count = verdicts.len(),
                    elapsed_ms = elapsed.as_millis(),
                    "Scan pass complete"
                );
                Ok(verdicts)
            }
            Err(e) => {
                self.metrics.inc_scan_failures(kind, e.kind_label());
                warn!(kind = %kind, error = %e, "Scan pass failed");
                Err(e)
            }
        }
    }
}
