//! Reporting sinks
//!
//! A sink receives the complete, ordered verdicts of a pass. It never sees
//! a partial pass: failed passes are not published at all.

use crate::models::PodVerdict;
use crate::observability::StructuredLogger;
use crate::scan::ScanPass;

/// Consumer of pod verdicts from scheduled passes
pub trait ReportSink: Send + Sync {
    fn publish_pods(&self, pass: &ScanPass<PodVerdict>);
}

/// Writes a header line with the pass timestamp, then one line per verdict
#[derive(Clone)]
pub struct LogSink {
    logger: StructuredLogger,
}

impl LogSink {
    pub fn new(logger: StructuredLogger) -> Self {
        Self { logger }
    }
}

impl ReportSink for LogSink {
    fn publish_pods(&self, pass: &ScanPass<PodVerdict>) {
        self.logger.log_pass_header(pass.scanned_at, pass.len());
        for verdict in &pass.verdicts {
            self.logger.log_pod_verdict(verdict);
        }
    }
}
