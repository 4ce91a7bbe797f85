//! Human-readable audit trail.
//!
//! Lines look like `INFO  20250129:120000\tSaved annotation a0001 PUT(...)`. The
//! file is never read back by the annotator.

use std::path::{Path, PathBuf};

use chrono::Local;

use crate::StoreError;
use crate::event_log::append_lines;

const TIMESTAMP_FORMAT: &str = "%Y%m%d:%H%M%S";

/// Append-only audit log.
#[derive(Debug, Clone)]
pub struct AuditLog {
    path: PathBuf,
    debug: bool,
}

impl AuditLog {
    /// `debug` enables [`AuditLog::debug`] lines.
    pub fn new(path: impl Into<PathBuf>, debug: bool) -> Self {
        Self {
            path: path.into(),
            debug,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn info(&self, message: &str) -> Result<(), StoreError> {
        tracing::debug!(target: "audit", "{message}");
        append_lines(&self.path, &[format_line("INFO ", message)])
    }

    /// Writes a header line followed by every line of `body`.
    /// Does nothing unless debugging is enabled.
    pub fn debug(&self, header: &str, body: &str) -> Result<(), StoreError> {
        if !self.debug {
            return Ok(());
        }
        let mut lines = vec![format_line("DEBUG", header)];
        lines.extend(body.lines().map(|line| format!("DEBUG {line}")));
        append_lines(&self.path, &lines)
    }
}

fn format_line(level: &str, message: &str) -> String {
    format!("{level} {}\t{message}", Local::now().format(TIMESTAMP_FORMAT))
}
