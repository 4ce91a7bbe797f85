//! ELAN tab-separated export.

use std::path::{Path, PathBuf};

use va_core::Annotation;

use crate::StoreError;
use crate::event_log::append_lines;

/// Append-only export of saved annotations, one line each:
/// `<tier>\t<start_seconds>\t<end_seconds>\t<name>: <formula>`.
#[derive(Debug, Clone)]
pub struct ExportFile {
    path: PathBuf,
}

impl ExportFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, annotation: &Annotation) -> Result<(), StoreError> {
        append_lines(&self.path, &[annotation.as_elan()])
    }
}
