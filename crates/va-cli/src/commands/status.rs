//! Status command for showing the session files and their contents.

use std::io::Write;

use anyhow::Result;
use va_core::FieldSpec;
use va_store::{Session, SessionPaths};

pub fn run<W: Write>(writer: &mut W, session: &Session, paths: &SessionPaths) -> Result<()> {
    let task = session.task();
    writeln!(writer, "Video annotator status")?;
    writeln!(writer, "Task: {}", task.name)?;
    writeln!(writer, "Tiers: {}", task.tiers.tier_names().join(", "))?;
    writeln!(writer, "Event log: {}", paths.event_log.display())?;
    writeln!(writer, "Export: {}", paths.export.display())?;
    writeln!(writer, "Audit log: {}", paths.audit.display())?;
    writeln!(
        writer,
        "Annotations: {} ({} in this task)",
        session.annotations().len(),
        session.annotations_for_task().count()
    )?;
    writeln!(writer, "Objects: {}", session.pool())?;

    let predicates: Vec<_> = task
        .schema
        .predicate_names()
        .map(|name| {
            let args = task
                .schema
                .predicate_arguments(name)
                .unwrap_or_default()
                .iter()
                .map(FieldSpec::signature)
                .collect::<Vec<_>>()
                .join(", ");
            format!("{name}({args})")
        })
        .collect();
    if !predicates.is_empty() {
        writeln!(writer, "Predicates:")?;
        for predicate in predicates {
            writeln!(writer, "- {predicate}")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::path::Path;

    use va_core::{Schema, TaskConfig, TierPolicy};

    use super::*;

    use insta::assert_snapshot;

    #[test]
    fn status_command_outputs_task_and_files() {
        let temp = tempfile::tempdir().unwrap();
        let task = TaskConfig {
            name: "DPIP-Actions".into(),
            tiers: TierPolicy::Overlap {
                primary: "ACTION1".into(),
                secondary: "ACTION2".into(),
            },
            schema: Schema {
                predicates: BTreeMap::from([(
                    "MOVE".to_string(),
                    vec![
                        FieldSpec::required("Object"),
                        FieldSpec::optional("Source"),
                        FieldSpec::required("Destination"),
                    ],
                )]),
                properties: Vec::new(),
            },
            object_pool: BTreeMap::from([("blocks".to_string(), vec!["A".to_string()])]),
            defaults: BTreeMap::new(),
        };
        let paths = SessionPaths::for_video(temp.path(), Path::new("run-01.mp4"));
        let session = Session::open(task, &paths, false).unwrap();

        let mut output = Vec::new();
        run(&mut output, &session, &paths).unwrap();

        let output = String::from_utf8(output).unwrap();
        let output = output.replace(&temp.path().display().to_string(), "[TEMP]");
        assert_snapshot!(output, @r"
        Video annotator status
        Task: DPIP-Actions
        Tiers: ACTION1, ACTION2
        Event log: [TEMP]/run-01.json
        Export: [TEMP]/run-01.tab
        Audit log: [TEMP]/run-01.log
        Annotations: 0 (0 in this task)
        Objects: <ObjectPool blocks=1>
        Predicates:
        - MOVE(Object, Source?, Destination)
        ");
    }
}
