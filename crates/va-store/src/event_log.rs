//! The append-only event log and its replay.
//!
//! # Replay
//!
//! Replay reads the whole file before deciding which annotations are live:
//!
//! 1. pool records are applied to the object pool immediately, in file order
//! 2. annotation records are collected
//! 3. tombstones are collected
//! 4. after the last line, collected annotations whose identifier has a
//!    tombstone anywhere in the file are dropped

use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use va_core::{Annotation, AnnotationId, IdentifierCounter, ObjectPool};

use crate::StoreError;
use crate::record::LogRecord;

/// Handle on an event-log file.
#[derive(Debug, Clone)]
pub struct EventLog {
    path: PathBuf,
}

/// State rebuilt from an event log.
#[derive(Debug, Default)]
pub struct Replay {
    /// Live annotations in file order.
    pub annotations: Vec<Annotation>,
    /// Identifiers that have a tombstone.
    pub removed: HashSet<AnnotationId>,
    /// High-water mark over every saved identifier, tombstoned ones included.
    pub identifiers: IdentifierCounter,
    /// Number of records read.
    pub records: usize,
    /// Pool transitions that had to be forced.
    pub forced_transitions: usize,
}

impl EventLog {
    /// Opens a log, creating an empty file if there is none yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        open_append(&path)?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one record and closes the file again.
    pub fn append(&self, record: &LogRecord) -> Result<(), StoreError> {
        self.append_all(std::slice::from_ref(record))
    }

    /// Appends several records with a single open.
    pub fn append_all(&self, records: &[LogRecord]) -> Result<(), StoreError> {
        let lines = records
            .iter()
            .map(|record| serde_json::to_string(record).map_err(StoreError::Encode))
            .collect::<Result<Vec<_>, _>>()?;
        append_lines(&self.path, &lines)
    }

    /// Reads every record in file order. Blank lines are skipped.
    pub fn read_records(&self) -> Result<Vec<LogRecord>, StoreError> {
        let file = File::open(&self.path).map_err(|e| StoreError::io(&self.path, e))?;
        let reader = BufReader::new(file);
        let mut records = Vec::new();

        for (idx, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| StoreError::io(&self.path, e))?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let record = serde_json::from_str(trimmed).map_err(|source| {
                StoreError::InvalidRecord {
                    path: self.path.clone(),
                    line: idx + 1,
                    source,
                }
            })?;
            records.push(record);
        }

        Ok(records)
    }

    /// Replays the log into `pool` and returns the live annotations.
    pub fn replay(&self, pool: &mut ObjectPool) -> Result<Replay, StoreError> {
        let records = self.read_records()?;
        let replay = replay_records(records, pool);
        tracing::info!(
            path = %self.path.display(),
            records = replay.records,
            annotations = replay.annotations.len(),
            removed = replay.removed.len(),
            "replayed event log"
        );
        Ok(replay)
    }
}

/// Applies records in order; see the [module documentation](self).
pub fn replay_records(
    records: impl IntoIterator<Item = LogRecord>,
    pool: &mut ObjectPool,
) -> Replay {
    let mut replay = Replay::default();
    let mut staged = Vec::new();

    for record in records {
        replay.records += 1;
        match record {
            LogRecord::AddObject {
                add_object: (object_type, object),
            } => {
                if pool.put_in_play(&object_type, &object).was_forced() {
                    replay.forced_transitions += 1;
                }
            }
            LogRecord::RemoveObject {
                remove_object: (object_type, object),
            } => {
                if pool.remove_from_play(&object_type, &object).was_forced() {
                    replay.forced_transitions += 1;
                }
            }
            LogRecord::RemoveAnnotation { remove_annotation } => {
                replay.removed.insert(remove_annotation);
            }
            LogRecord::Annotation(record) => {
                let annotation = Annotation::from_record(record);
                if let Some(id) = &annotation.identifier {
                    replay.identifiers.observe(id);
                }
                staged.push(annotation);
            }
        }
    }

    replay.annotations = staged
        .into_iter()
        .filter(|annotation| {
            annotation
                .identifier
                .as_ref()
                .is_none_or(|id| !replay.removed.contains(id))
        })
        .collect();
    replay
}

fn open_append(path: &Path) -> Result<File, StoreError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| StoreError::io(path, e))
}

/// Appends newline-terminated lines and flushes before returning.
pub(crate) fn append_lines(path: &Path, lines: &[String]) -> Result<(), StoreError> {
    let mut file = open_append(path)?;
    for line in lines {
        writeln!(file, "{line}").map_err(|e| StoreError::io(path, e))?;
    }
    file.flush().map_err(|e| StoreError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use va_core::{TimeFrame, Transition};

    fn saved(id: &str, start: i64, end: i64) -> LogRecord {
        let mut annotation = Annotation::new("DPIP-Actions");
        annotation.identifier = Some(AnnotationId::new(id).unwrap());
        annotation.tier = Some("ACTION1".into());
        annotation.timeframe = Some(TimeFrame::from_millis(start, end));
        annotation.predicate = Some("TURN".into());
        annotation.arguments.insert("Object", Some("Block1".into()));
        LogRecord::annotation(&annotation)
    }

    fn tombstone(id: &str) -> LogRecord {
        LogRecord::remove_annotation(AnnotationId::new(id).unwrap())
    }

    fn live_ids(replay: &Replay) -> Vec<&str> {
        replay
            .annotations
            .iter()
            .filter_map(|a| a.identifier.as_ref().map(AnnotationId::as_str))
            .collect()
    }

    #[test]
    fn tombstone_removes_earlier_annotation() {
        let mut pool = ObjectPool::new();
        let replay = replay_records(
            [saved("a0001", 0, 1000), saved("a0002", 2000, 3000), tombstone("a0001")],
            &mut pool,
        );
        assert_eq!(live_ids(&replay), ["a0002"]);
        assert_eq!(replay.records, 3);
    }

    #[test]
    fn tombstone_position_does_not_matter() {
        let mut pool = ObjectPool::new();
        let replay = replay_records(
            [tombstone("a0001"), saved("a0001", 0, 1000), saved("a0002", 2000, 3000)],
            &mut pool,
        );
        assert_eq!(live_ids(&replay), ["a0002"]);
    }

    #[test]
    fn counter_remembers_tombstoned_identifiers() {
        let mut pool = ObjectPool::new();
        let mut replay = replay_records(
            [saved("a0001", 0, 1000), saved("a0002", 2000, 3000), tombstone("a0002")],
            &mut pool,
        );
        assert_eq!(replay.identifiers.next_id().unwrap().as_str(), "a0003");
    }

    #[test]
    fn pool_records_apply_in_order() {
        let mut pool = ObjectPool::new();
        pool.add_objects("blocks", ["A", "B"].map(String::from));
        let replay = replay_records(
            [
                LogRecord::add_object("blocks", "A"),
                LogRecord::add_object("blocks", "B"),
                LogRecord::remove_object("blocks", "A"),
                LogRecord::add_object("blocks", "B"),
            ],
            &mut pool,
        );
        assert!(pool.get_available("blocks").unwrap().contains("A"));
        assert!(pool.get_in_play("blocks").unwrap().contains("B"));
        assert_eq!(replay.forced_transitions, 1);
        assert_eq!(pool.put_in_play("blocks", "A"), Transition::Moved);
    }

    #[test]
    fn file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let log = EventLog::open(dir.path().join("video.json")).unwrap();
        assert!(log.read_records().unwrap().is_empty());

        log.append(&saved("a0001", 0, 1000)).unwrap();
        log.append_all(&[LogRecord::add_object("people", "sue"), tombstone("a0001")])
            .unwrap();

        let records = log.read_records().unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[1], LogRecord::add_object("people", "sue"));

        let mut pool = ObjectPool::new();
        let replay = log.replay(&mut pool).unwrap();
        assert!(replay.annotations.is_empty());
        assert!(pool.get_in_play("people").unwrap().contains("sue"));
    }

    #[test]
    fn open_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("video.json");
        EventLog::open(&path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn malformed_line_reports_line_number() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("video.json");
        std::fs::write(&path, "{\"remove-annotation\":\"a0001\"}\n\nnot json\n").unwrap();
        let log = EventLog::open(&path).unwrap();
        let err = log.read_records().unwrap_err();
        assert!(matches!(err, StoreError::InvalidRecord { line: 3, .. }), "{err}");
        assert!(err.to_string().contains("line 3"));
    }
}
