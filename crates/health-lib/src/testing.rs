//! Log capture for tests

use std::io;
use std::sync::{Arc, Mutex};
use tracing::Subscriber;

/// In-memory sink for JSON log lines
#[derive(Clone, Default)]
pub(crate) struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    /// JSON subscriber writing into this buffer, same layout as the agent's
    pub fn subscriber(&self) -> impl Subscriber + Send + Sync {
        let logs = self.clone();
        tracing_subscriber::fmt()
            .json()
            .with_writer(move || logs.clone())
            .finish()
    }

    /// Rendered message of every captured event, in emission order
    pub fn messages(&self) -> Vec<String> {
        let bytes = self.0.lock().unwrap().clone();
        String::from_utf8(bytes)
            .unwrap()
            .lines()
            .map(|line| {
                let event: serde_json::Value = serde_json::from_str(line).unwrap();
                event["fields"]["message"]
                    .as_str()
                    .unwrap_or_default()
                    .to_string()
            })
            .collect()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
