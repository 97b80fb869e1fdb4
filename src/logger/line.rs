//! Line logger: every lifecycle event is one tagged, human-readable record.
//!
//! The run narrates itself to an external append-only collector; there is no
//! structured output format. Records fan out to every configured sink and
//! sink failures are absorbed — the sweep must never fail because logging
//! did. Fallback chain:
//! 1. stdout (captured by the external scheduler)
//! 2. the system line logger, addressed by service tag
//! 3. silent discard

#![allow(missing_docs)]

use std::process::{Command, Stdio};
use std::sync::Arc;

use parking_lot::Mutex;

/// Service tag under which records reach the system log collector.
pub const SERVICE_TAG: &str = "dsw";

/// One destination for log records.
pub trait LogSink: Send + Sync {
    fn emit(&self, record: &str);
}

/// Writes records to stdout for the scheduler to capture.
#[derive(Debug, Default)]
pub struct StdoutSink;

impl LogSink for StdoutSink {
    fn emit(&self, record: &str) {
        println!("[{SERVICE_TAG}] {record}");
    }
}

/// Forwards each record to the system line logger (`logger -t dsw`).
///
/// Fire-and-forget: a missing or failing logger binary is ignored.
#[derive(Debug)]
pub struct SyslogSink {
    tag: String,
}

impl SyslogSink {
    #[must_use]
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
        }
    }
}

impl Default for SyslogSink {
    fn default() -> Self {
        Self::new(SERVICE_TAG)
    }
}

impl LogSink for SyslogSink {
    fn emit(&self, record: &str) {
        let _ = Command::new("logger")
            .arg("-t")
            .arg(&self.tag)
            .arg("--")
            .arg(record)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();
    }
}

/// In-memory sink for tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<String>>,
}

impl MemorySink {
    #[must_use]
    pub fn records(&self) -> Vec<String> {
        self.records.lock().clone()
    }

    #[must_use]
    pub fn contains(&self, needle: &str) -> bool {
        self.records.lock().iter().any(|r| r.contains(needle))
    }
}

impl LogSink for MemorySink {
    fn emit(&self, record: &str) {
        self.records.lock().push(record.to_string());
    }
}

/// Fans one record out to every sink.
#[derive(Clone)]
pub struct RunLogger {
    sinks: Vec<Arc<dyn LogSink>>,
}

impl RunLogger {
    #[must_use]
    pub fn new(sinks: Vec<Arc<dyn LogSink>>) -> Self {
        Self { sinks }
    }

    /// Production logger: stdout for the scheduler plus the system collector.
    #[must_use]
    pub fn system() -> Self {
        Self::new(vec![
            Arc::new(StdoutSink),
            Arc::new(SyslogSink::default()),
        ])
    }

    /// Test logger capturing every record in memory.
    #[must_use]
    pub fn memory() -> (Self, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::default());
        let logger = Self::new(vec![sink.clone()]);
        (logger, sink)
    }

    /// Emit one record.
    pub fn line(&self, record: &str) {
        for sink in &self.sinks {
            sink.emit(record);
        }
    }

    /// Emit one warning record.
    pub fn warn(&self, record: &str) {
        self.line(&format!("WARNING: {record}"));
    }
}
