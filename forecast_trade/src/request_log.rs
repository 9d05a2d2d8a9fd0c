//! Record of pipeline requests
//!
//! The pipeline reports every request through the [`RequestLog`] port. The
//! file adapter appends `|`-delimited lines:
//!
//! ```text
//! 2024-05-01T12:00:00+00:00|alice|AAPL|1000|ARIMA|1.2345|200.00
//! 2024-05-01T12:01:00+00:00|alice|ERROR|No data for ticker ZZZZ
//! ```

use crate::error::Result;
use chrono::{DateTime, Utc};
use std::fs::{File, OpenOptions};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// A completed request
#[derive(Debug, Clone, PartialEq)]
pub struct RequestEntry {
    pub timestamp: DateTime<Utc>,
    pub requester: String,
    pub ticker: String,
    pub amount: f64,
    pub model: String,
    pub rmse: f64,
    pub potential_profit: f64,
}

/// A request that ended in an error
#[derive(Debug, Clone, PartialEq)]
pub struct FailureEntry {
    pub timestamp: DateTime<Utc>,
    pub requester: String,
    pub message: String,
}

/// Where request outcomes are recorded
pub trait RequestLog: Send + Sync {
    fn record_request(&self, entry: &RequestEntry) -> Result<()>;

    fn record_failure(&self, entry: &FailureEntry) -> Result<()>;
}

/// Discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRequestLog;

impl RequestLog for NullRequestLog {
    fn record_request(&self, _entry: &RequestEntry) -> Result<()> {
        Ok(())
    }

    fn record_failure(&self, _entry: &FailureEntry) -> Result<()> {
        Ok(())
    }
}

/// Keeps entries in memory
#[derive(Debug, Default)]
pub struct MemoryRequestLog {
    requests: Mutex<Vec<RequestEntry>>,
    failures: Mutex<Vec<FailureEntry>>,
}

impl MemoryRequestLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requests(&self) -> Vec<RequestEntry> {
        self.requests
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    pub fn failures(&self) -> Vec<FailureEntry> {
        self.failures
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }
}

impl RequestLog for MemoryRequestLog {
    fn record_request(&self, entry: &RequestEntry) -> Result<()> {
        if let Ok(mut entries) = self.requests.lock() {
            entries.push(entry.clone());
        }
        Ok(())
    }

    fn record_failure(&self, entry: &FailureEntry) -> Result<()> {
        if let Ok(mut entries) = self.failures.lock() {
            entries.push(entry.clone());
        }
        Ok(())
    }
}

/// Appends `|`-delimited lines to a file, creating it on first write
#[derive(Debug)]
pub struct CsvRequestLog {
    path: PathBuf,
    lock: Mutex<()>,
}

impl CsvRequestLog {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, record: &[String]) -> Result<()> {
        // a poisoned lock only means another writer panicked mid-line
        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let file: File = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut writer = csv::WriterBuilder::new()
            .delimiter(b'|')
            .has_headers(false)
            .flexible(true)
            .from_writer(BufWriter::new(file));
        writer.write_record(record)?;
        writer.flush()?;
        Ok(())
    }
}

impl RequestLog for CsvRequestLog {
    fn record_request(&self, entry: &RequestEntry) -> Result<()> {
        self.append(&[
            entry.timestamp.to_rfc3339(),
            entry.requester.clone(),
            entry.ticker.clone(),
            entry.amount.to_string(),
            entry.model.clone(),
            format!("{:.4}", entry.rmse),
            format!("{:.2}", entry.potential_profit),
        ])
    }

    fn record_failure(&self, entry: &FailureEntry) -> Result<()> {
        self.append(&[
            entry.timestamp.to_rfc3339(),
            entry.requester.clone(),
            "ERROR".to_string(),
            entry.message.clone(),
        ])
    }
}

/// Read back `|`-delimited entries, one field list per line
pub fn read_log_lines<P: AsRef<Path>>(path: P) -> Result<Vec<Vec<String>>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'|')
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let mut lines = Vec::new();
    for record in reader.records() {
        let record = record?;
        lines.push(record.iter().map(str::to_string).collect());
    }
    Ok(lines)
}
