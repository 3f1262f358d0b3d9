//! Background scan scheduling
//!
//! Runs a pod scan pass on a fixed wall-clock schedule and publishes each
//! successful pass to a [`ReportSink`]. Ticks fire regardless of how long
//! earlier passes take, so passes may overlap unless [`OverlapPolicy::Skip`]
//! is selected. A failed pass is logged and the next tick proceeds as usual.

use crate::health::{components, HealthRegistry};
use crate::models::ResourceKind;
use crate::observability::{AgentMetrics, StructuredLogger};
use crate::report::ReportSink;
use crate::scan::Scanner;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinSet;
use tokio::time::{interval_at, Instant};
use tracing::{debug, info};

/// What to do with a tick that fires while the previous pass still runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlapPolicy {
    /// Start another pass alongside the running one
    #[default]
    Allow,
    /// Drop the tick
    Skip,
}

/// Configuration for the scan scheduler
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Time between ticks (default: 10 seconds)
    pub interval: Duration,
    pub overlap: OverlapPolicy,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            overlap: OverlapPolicy::Allow,
        }
    }
}

/// Everything a single scheduled pass needs, shared by all in-flight passes
struct PassRunner {
    scanner: Scanner,
    sink: Arc<dyn ReportSink>,
    health: HealthRegistry,
    logger: StructuredLogger,
    metrics: AgentMetrics,
    busy: Arc<AtomicBool>,
}

impl PassRunner {
    async fn run_pass(&self) {
        match self.scanner.scan_pods().await {
            Ok(pass) => {
                self.metrics.set_pod_statuses(&pass.verdicts);
                self.sink.publish_pods(&pass);
                self.health.record_success(components::RESOURCE_SOURCE).await;
            }
            Err(e) => {
                self.logger.log_pass_failed(ResourceKind::Pods, &e);
                self.health
                    .record_failure(components::RESOURCE_SOURCE, e.to_string())
                    .await;
            }
        }
    }
}

/// Clears the busy flag when a pass ends, including when it is aborted
struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Periodic scan driver
pub struct ScanScheduler {
    runner: Arc<PassRunner>,
    config: SchedulerConfig,
}

impl ScanScheduler {
    pub fn new(
        scanner: Scanner,
        sink: Arc<dyn ReportSink>,
        health: HealthRegistry,
        logger: StructuredLogger,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            runner: Arc::new(PassRunner {
                scanner,
                sink,
                health,
                logger,
                metrics: AgentMetrics::new(),
                busy: Arc::new(AtomicBool::new(false)),
            }),
            config,
        }
    }

    /// Run until `shutdown` fires. The first pass starts one interval after
    /// this is called. Passes still in flight at shutdown are abandoned and
    /// publish nothing.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        info!(
            interval_secs = self.config.interval.as_secs(),
            overlap = ?self.config.overlap,
            "Starting scan scheduler"
        );
        self.runner.health.register(components::SCHEDULER).await;

        let period = self.config.interval;
        let mut ticker = interval_at(Instant::now() + period, period);
        let mut in_flight = JoinSet::new();

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let guard = match self.try_start() {
                        Some(guard) => guard,
                        None => {
                            debug!("Previous scan pass still running, skipping tick");
                            self.runner.metrics.inc_scheduled_passes_skipped();
                            continue;
                        }
                    };

                    let runner = self.runner.clone();
                    in_flight.spawn(async move {
                        let _guard = guard;
                        runner.run_pass().await;
                    });
                }
                Some(_) = in_flight.join_next(), if !in_flight.is_empty() => {}
                _ = shutdown.recv() => {
                    info!(in_flight = in_flight.len(), "Shutting down scan scheduler");
                    in_flight.abort_all();
                    break;
                }
            }
        }
    }

    /// `None` drops the tick. Otherwise the pass may start, holding the
    /// returned guard for its duration when overlap is not allowed.
    fn try_start(&self) -> Option<Option<BusyGuard>> {
        match self.config.overlap {
            OverlapPolicy::Allow => Some(None),
            OverlapPolicy::Skip => {
                let busy = &self.runner.busy;
                if busy.swap(true, Ordering::AcqRel) {
                    None
                } else {
                    Some(Some(BusyGuard(busy.clone())))
                }
            }
        }
    }
}
