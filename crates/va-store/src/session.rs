//! Per-video annotation session.
//!
//! A [`Session`] owns everything one annotator works with: the task
//! configuration, the object pool, the live annotations, the current draft and the
//! files they are persisted to. It is built once by replaying the event log and
//! then kept up to date by every operation, which writes to the log before it
//! touches the in-memory state.

use std::path::{Path, PathBuf};

use va_core::{
    Annotation, AnnotationId, IdentifierCounter, ObjectPool, TaskConfig, Transition,
};

use crate::StoreError;
use crate::audit::AuditLog;
use crate::event_log::EventLog;
use crate::export::ExportFile;
use crate::record::LogRecord;

/// Locations of the three files belonging to one video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionPaths {
    pub event_log: PathBuf,
    pub export: PathBuf,
    pub audit: PathBuf,
}

impl SessionPaths {
    /// `<data_dir>/<stem>.json`, `.tab` and `.log` for a video file.
    pub fn for_video(data_dir: &Path, video: &Path) -> Self {
        let stem = video
            .file_stem()
            .map_or_else(|| "annotations".into(), |s| s.to_string_lossy());
        Self {
            event_log: data_dir.join(format!("{stem}.json")),
            export: data_dir.join(format!("{stem}.tab")),
            audit: data_dir.join(format!("{stem}.log")),
        }
    }
}

/// Result of trying to save an annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The annotation was persisted under this identifier.
    Saved(AnnotationId),
    /// Validation failed; nothing was written.
    Rejected(Vec<String>),
}

/// State of one annotation session.
#[derive(Debug)]
pub struct Session {
    task: TaskConfig,
    pool: ObjectPool,
    annotations: Vec<Annotation>,
    identifiers: IdentifierCounter,
    current: Annotation,
    event_log: EventLog,
    export: ExportFile,
    audit: AuditLog,
    warnings: Vec<String>,
    messages: Vec<String>,
}

impl Session {
    /// Opens a session, creating the event log if needed and replaying it.
    pub fn open(task: TaskConfig, paths: &SessionPaths, debug: bool) -> Result<Self, StoreError> {
        let mut pool = ObjectPool::from_inventory(&task.object_pool);
        let event_log = EventLog::open(&paths.event_log)?;
        let audit = AuditLog::new(&paths.audit, debug);

        let replay = event_log.replay(&mut pool)?;
        if replay.forced_transitions > 0 {
            audit.debug(
                "Forced pool transitions while loading",
                &replay.forced_transitions.to_string(),
            )?;
        }
        audit.info(&format!(
            "Loaded annotations from {}",
            event_log.path().display()
        ))?;

        let current = Annotation::draft(&task);
        Ok(Self {
            task,
            pool,
            annotations: replay.annotations,
            identifiers: replay.identifiers,
            current,
            event_log,
            export: ExportFile::new(&paths.export),
            audit,
            warnings: Vec::new(),
            messages: Vec::new(),
        })
    }

    pub const fn task(&self) -> &TaskConfig {
        &self.task
    }

    pub const fn pool(&self) -> &ObjectPool {
        &self.pool
    }

    /// Live annotations in the order they were saved.
    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn annotation(&self, id: &AnnotationId) -> Option<&Annotation> {
        self.annotations
            .iter()
            .find(|a| a.identifier.as_ref() == Some(id))
    }

    /// Live annotations of this session's task.
    pub fn annotations_for_task(&self) -> impl Iterator<Item = &Annotation> {
        self.annotations
            .iter()
            .filter(|a| a.task.as_deref() == Some(self.task.name.as_str()))
    }

    /// Live annotations matching a search term, sorted by start.
    pub fn search(&self, term: &str) -> Vec<&Annotation> {
        let mut found: Vec<_> = self.annotations.iter().filter(|a| a.matches(term)).collect();
        found.sort_by_key(|a| a.start());
        found
    }

    /// The draft being edited.
    pub const fn current(&self) -> &Annotation {
        &self.current
    }

    pub const fn current_mut(&mut self) -> &mut Annotation {
        &mut self.current
    }

    /// Sets the draft's tier from its time frame. Drafts without a time frame
    /// are left alone.
    pub fn assign_tier(&mut self, selected_tier: Option<&str>) {
        let Some(frame) = self.current.timeframe else {
            return;
        };
        self.current
            .calculate_tier(&frame, selected_tier, &self.task.tiers, &self.annotations);
    }

    /// Validates and saves the draft.
    ///
    /// On success the draft is replaced by a fresh one. On rejection the draft is
    /// kept so it can be corrected, and its warnings are available from
    /// [`Session::take_warnings`].
    pub fn save_current(&mut self) -> Result<SaveOutcome, StoreError> {
        if !self.current.is_valid(&self.task.schema)? {
            let warnings = self.current.take_warnings();
            for warning in &warnings {
                self.audit.info(warning)?;
            }
            self.warnings.clone_from(&warnings);
            return Ok(SaveOutcome::Rejected(warnings));
        }

        let mut annotation = self.current.clone();
        let id = annotation.assign_identifier(&mut self.identifiers)?.clone();

        // Memory follows the log once the record is written.
        self.event_log.append(&LogRecord::annotation(&annotation))?;
        self.current = Annotation::draft(&self.task);
        self.annotations.push(annotation.clone());
        tracing::info!(identifier = %id, "saved annotation");

        self.export.append(&annotation)?;
        let message = format!("Saved annotation {id} {}", annotation.as_formula());
        self.audit.info(&message)?;
        self.messages.push(message);
        Ok(SaveOutcome::Saved(id))
    }

    /// Writes a tombstone for a live annotation and drops it.
    ///
    /// Returns `false`, writing nothing, if no live annotation has that
    /// identifier.
    pub fn remove_annotation(&mut self, id: &AnnotationId) -> Result<bool, StoreError> {
        if self.annotation(id).is_none() {
            tracing::warn!(identifier = %id, "no live annotation to remove");
            return Ok(false);
        }
        self.event_log
            .append(&LogRecord::remove_annotation(id.clone()))?;
        self.annotations
            .retain(|a| a.identifier.as_ref() != Some(id));

        let message = format!("Removed annotation {id}");
        self.audit.info(&message)?;
        self.messages.push(message);
        Ok(true)
    }

    /// Puts objects in play, logging one record per object.
    pub fn put_objects_in_play(
        &mut self,
        object_type: &str,
        objects: &[String],
    ) -> Result<Vec<Transition>, StoreError> {
        let records: Vec<_> = objects
            .iter()
            .map(|object| LogRecord::add_object(object_type, object.as_str()))
            .collect();
        self.event_log.append_all(&records)?;

        let transitions = self
            .pool
            .put_objects_in_play(object_type, objects.iter().map(String::as_str));
        for (object, transition) in objects.iter().zip(&transitions) {
            if transition.was_forced() {
                self.audit.info(&format!("{object} was already put in play"))?;
            }
            let message = format!("Added {object} and removed it from the pool");
            self.audit.info(&message)?;
            self.messages.push(message);
        }
        Ok(transitions)
    }

    /// Takes objects out of play, logging one record per object.
    pub fn remove_objects_from_play(
        &mut self,
        object_type: &str,
        objects: &[String],
    ) -> Result<Vec<Transition>, StoreError> {
        let records: Vec<_> = objects
            .iter()
            .map(|object| LogRecord::remove_object(object_type, object.as_str()))
            .collect();
        self.event_log.append_all(&records)?;

        let transitions = self
            .pool
            .remove_objects_from_play(object_type, objects.iter().map(String::as_str));
        for (object, transition) in objects.iter().zip(&transitions) {
            if transition.was_forced() {
                self.audit
                    .info(&format!("{object} was already removed from play"))?;
            }
            let message = format!("Removed {object} and returned it to the pool");
            self.audit.info(&message)?;
            self.messages.push(message);
        }
        Ok(transitions)
    }

    /// Writes a debug line to the audit log when debugging is enabled.
    pub fn debug(&self, header: &str, body: &str) -> Result<(), StoreError> {
        self.audit.debug(header, body)
    }

    /// Drains the warnings of the last rejected save.
    pub fn take_warnings(&mut self) -> Vec<String> {
        std::mem::take(&mut self.warnings)
    }

    /// Drains the messages collected since the last call.
    pub fn take_messages(&mut self) -> Vec<String> {
        std::mem::take(&mut self.messages)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use va_core::{FieldSpec, Schema, TierPolicy, TimeFrame};

    fn task() -> TaskConfig {
        TaskConfig {
            name: "DPIP-Actions".into(),
            tiers: TierPolicy::Overlap {
                primary: "ACTION1".into(),
                secondary: "ACTION2".into(),
            },
            schema: Schema {
                predicates: BTreeMap::from([(
                    "PUT".to_string(),
                    vec![FieldSpec::required("Object"), FieldSpec::required("Location")],
                )]),
                properties: vec![FieldSpec::required("Participant")],
            },
            object_pool: BTreeMap::from([(
                "blocks".to_string(),
                vec!["A".to_string(), "B".to_string(), "C".to_string()],
            )]),
            defaults: BTreeMap::from([("Participant".to_string(), "Builder".to_string())]),
        }
    }

    fn paths(dir: &Path) -> SessionPaths {
        SessionPaths::for_video(dir, Path::new("/videos/run-01.mp4"))
    }

    fn fill_draft(session: &mut Session, start: i64, end: i64, object: &str) {
        let draft = session.current_mut();
        draft.timeframe = Some(TimeFrame::from_millis(start, end));
        draft.predicate = Some("PUT".into());
        draft.arguments.insert("Object", Some(object.into()));
        draft.arguments.insert("Location", Some("on(Base)".into()));
        session.assign_tier(None);
    }

    fn save(session: &mut Session, start: i64, end: i64, object: &str) -> AnnotationId {
        fill_draft(session, start, end, object);
        match session.save_current().unwrap() {
            SaveOutcome::Saved(id) => id,
            SaveOutcome::Rejected(warnings) => panic!("rejected: {warnings:?}"),
        }
    }

    #[test]
    fn paths_follow_video_stem() {
        let paths = paths(Path::new("/data"));
        assert_eq!(paths.event_log, Path::new("/data/run-01.json"));
        assert_eq!(paths.export, Path::new("/data/run-01.tab"));
        assert_eq!(paths.audit, Path::new("/data/run-01.log"));
    }

    #[test]
    fn save_assigns_identifiers_and_tiers() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session::open(task(), &paths(dir.path()), false).unwrap();

        assert_eq!(save(&mut session, 0, 5000, "A").as_str(), "a0001");
        assert_eq!(save(&mut session, 3000, 6000, "B").as_str(), "a0002");
        assert_eq!(save(&mut session, 7000, 8000, "C").as_str(), "a0003");

        let tiers: Vec<_> = session
            .annotations()
            .iter()
            .map(|a| a.tier.as_deref().unwrap())
            .collect();
        assert_eq!(tiers, ["ACTION1", "ACTION2", "ACTION1"]);
        assert!(session.current().identifier.is_none());
        assert_eq!(session.current().properties.get("Participant"), Some("Builder"));

        let export = std::fs::read_to_string(dir.path().join("run-01.tab")).unwrap();
        assert_eq!(export.lines().count(), 3);
        assert_eq!(session.take_messages().len(), 3);
    }

    #[test]
    fn rejected_save_keeps_draft_and_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session::open(task(), &paths(dir.path()), false).unwrap();
        fill_draft(&mut session, 0, 1000, "A");
        session.current_mut().arguments.insert("Location", None);

        let outcome = session.save_current().unwrap();
        assert_eq!(
            outcome,
            SaveOutcome::Rejected(vec![
                "WARNING: required argument \"Location\" is not specified".to_string()
            ])
        );
        assert!(session.annotations().is_empty());
        assert_eq!(session.current().predicate.as_deref(), Some("PUT"));
        assert_eq!(session.take_warnings().len(), 1);
        assert!(session.take_warnings().is_empty());

        let log = std::fs::read_to_string(dir.path().join("run-01.json")).unwrap();
        assert!(log.is_empty());
    }

    #[test]
    fn undeclared_argument_aborts_save() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session::open(task(), &paths(dir.path()), false).unwrap();
        fill_draft(&mut session, 0, 1000, "A");
        session.current_mut().arguments.insert("Colour", Some("red".into()));

        let err = session.save_current().unwrap_err();
        assert!(matches!(err, StoreError::Config(_)));
        assert!(session.annotations().is_empty());
    }

    #[test]
    fn reopening_replays_annotations_tombstones_and_pool() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut session = Session::open(task(), &paths(dir.path()), false).unwrap();
            let first = save(&mut session, 0, 1000, "A");
            save(&mut session, 2000, 3000, "B");
            assert!(session.remove_annotation(&first).unwrap());
            session
                .put_objects_in_play("blocks", &["A".to_string(), "B".to_string()])
                .unwrap();
            session
                .remove_objects_from_play("blocks", &["A".to_string()])
                .unwrap();
        }

        let mut session = Session::open(task(), &paths(dir.path()), false).unwrap();
        let ids: Vec<_> = session
            .annotations()
            .iter()
            .map(|a| a.identifier.as_ref().unwrap().as_str())
            .collect();
        assert_eq!(ids, ["a0002"]);
        assert!(session.pool().get_in_play("blocks").unwrap().contains("B"));
        assert!(session.pool().get_available("blocks").unwrap().contains("A"));

        assert_eq!(save(&mut session, 4000, 5000, "C").as_str(), "a0003");
    }

    #[test]
    fn removing_highest_identifier_does_not_reuse_it() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session::open(task(), &paths(dir.path()), false).unwrap();
        save(&mut session, 0, 1000, "A");
        let second = save(&mut session, 2000, 3000, "B");
        session.remove_annotation(&second).unwrap();
        assert_eq!(save(&mut session, 4000, 5000, "C").as_str(), "a0003");
    }

    #[test]
    fn exhausted_identifiers_fail_the_save_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        let paths = paths(dir.path());
        let mut last = Annotation::new("DPIP-Actions");
        last.identifier = Some(AnnotationId::from_sequence(u32::MAX));
        last.timeframe = Some(TimeFrame::from_millis(0, 1000));
        EventLog::open(&paths.event_log)
            .unwrap()
            .append(&LogRecord::annotation(&last))
            .unwrap();

        let mut session = Session::open(task(), &paths, false).unwrap();
        fill_draft(&mut session, 2000, 3000, "A");
        let err = session.save_current().unwrap_err();
        assert!(matches!(err, StoreError::Identifier(_)), "{err}");
        assert_eq!(session.annotations().len(), 1);
        assert_eq!(session.current().predicate.as_deref(), Some("PUT"));

        let log = std::fs::read_to_string(&paths.event_log).unwrap();
        assert_eq!(log.lines().count(), 1);
    }

    #[test]
    fn removing_unknown_annotation_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session::open(task(), &paths(dir.path()), false).unwrap();
        let missing = AnnotationId::new("a0042").unwrap();
        assert!(!session.remove_annotation(&missing).unwrap());
        let log = std::fs::read_to_string(dir.path().join("run-01.json")).unwrap();
        assert!(log.is_empty());
    }

    #[test]
    fn forced_transitions_are_audited() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session::open(task(), &paths(dir.path()), false).unwrap();
        let objects = ["A".to_string()];
        session.put_objects_in_play("blocks", &objects).unwrap();
        let transitions = session.put_objects_in_play("blocks", &objects).unwrap();
        assert_eq!(transitions, [Transition::Forced]);

        let audit = std::fs::read_to_string(dir.path().join("run-01.log")).unwrap();
        assert!(audit.contains("A was already put in play"));
        assert_eq!(
            session.take_messages(),
            [
                "Added A and removed it from the pool",
                "Added A and removed it from the pool"
            ]
        );
    }

    #[test]
    fn search_filters_and_sorts_by_start() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session::open(task(), &paths(dir.path()), false).unwrap();
        save(&mut session, 9000, 9500, "LargeRedBlock1");
        save(&mut session, 1000, 2000, "SmallBlueBlock2");
        save(&mut session, 4000, 5000, "LargeGreenBlock3");

        let large: Vec<_> = session
            .search("large")
            .iter()
            .map(|a| a.start().unwrap())
            .collect();
        assert_eq!(large, [4000, 9000]);
        assert_eq!(session.search("").len(), 3);
        assert_eq!(session.annotations_for_task().count(), 3);
    }
}
