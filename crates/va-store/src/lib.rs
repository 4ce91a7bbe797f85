//! Storage layer for the video interval annotator.
//!
//! Everything durable lives in three append-only files next to each other:
//!
//! - the event log (`<video>.json`): one JSON record per line, the only source of
//!   truth; replaying it from the start rebuilds the live annotations and the
//!   object pool
//! - the ELAN export (`<video>.tab`): one tab-separated line per saved annotation
//! - the audit log (`<video>.log`): timestamped lines for humans, never read back
//!
//! # Concurrency
//!
//! A log is meant to have exactly one writer. Nothing here locks the files; two
//! processes appending to the same log will hand out duplicate identifiers.

mod audit;
mod event_log;
mod export;
mod record;
mod session;

use std::path::PathBuf;

use thiserror::Error;
use va_core::{ConfigError, ValidationError};

pub use audit::AuditLog;
pub use event_log::{EventLog, Replay, replay_records};
pub use export::ExportFile;
pub use record::LogRecord;
pub use session::{SaveOutcome, Session, SessionPaths};

/// Storage errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or appending to a file failed.
    #[error("failed to access {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A line of the event log is not a valid record.
    #[error("invalid record on line {line} of {}", .path.display())]
    InvalidRecord {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    /// A record could not be encoded.
    #[error("failed to encode record")]
    Encode(#[source] serde_json::Error),
    /// The annotation does not fit the task configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// No identifier could be assigned.
    #[error(transparent)]
    Identifier(#[from] ValidationError),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
