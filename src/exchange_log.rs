//! Append-only exchange and error logs
//!
//! Both logs are plain text meant for people to read. Neither is rotated or
//! truncated. Writes never fail the caller: a log that cannot be written is
//! reported through `tracing` and otherwise ignored.
//!
//! Exchange records are four lines:
//!
//! ```text
//! From: https://a.example/llm
//! To:
//! Text: Hello, world!
//!
//! ```
//!
//! Error records are one line, prefixed with an RFC 3339 timestamp.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};

/// Format one exchange record
pub fn format_exchange(from: &str, to: &str, text: &str) -> String {
    format!("From: {}\nTo: {}\nText: {}\n\n", from, to, text)
}

fn append(path: &Path, record: &str) -> std::io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(record.as_bytes())?;
    file.flush()
}

/// Log of from/to/text exchanges
#[derive(Debug, Clone)]
pub struct ExchangeLog {
    path: PathBuf,
}

impl ExchangeLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one exchange record
    pub fn log(&self, from: &str, to: &str, text: &str) {
        if let Err(e) = append(&self.path, &format_exchange(from, to, text)) {
            tracing::warn!("Failed to write exchange log {}: {}", self.path.display(), e);
        }
    }
}

/// One-line-per-record error log
#[derive(Debug, Clone)]
pub struct ErrorLog {
    path: PathBuf,
}

impl ErrorLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one error line. Newlines inside `message` are flattened so each
    /// record stays on a single line.
    pub fn record(&self, message: impl AsRef<str>) {
        let message = message.as_ref().replace(|c: char| c == '\r' || c == '\n', " ");
        let line = format!(
            "[{}] {}\n",
            Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            message
        );
        if let Err(e) = append(&self.path, &line) {
            tracing::warn!("Failed to write error log {}: {}", self.path.display(), e);
        }
    }
}
