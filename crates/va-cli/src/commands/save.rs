//! Save command: fills the session draft from the command line and saves it.

use std::io::Write;

use anyhow::{Context, Result};
use va_core::TimeFrame;
use va_store::{SaveOutcome, Session};

use super::util::{parse_offset, parse_pair};

/// An annotation as given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftInput {
    pub timeframe: TimeFrame,
    pub predicate: String,
    pub arguments: Vec<(String, Option<String>)>,
    pub properties: Vec<(String, Option<String>)>,
    pub tier: Option<String>,
}

impl DraftInput {
    pub fn parse(
        start: &str,
        end: &str,
        predicate: &str,
        arguments: &[String],
        properties: &[String],
        tier: Option<&str>,
    ) -> Result<Self> {
        let start = parse_offset(start).context("invalid --start")?;
        let end = parse_offset(end).context("invalid --end")?;
        Ok(Self {
            timeframe: TimeFrame::new(start, end),
            predicate: predicate.to_string(),
            arguments: arguments
                .iter()
                .map(|a| parse_pair(a))
                .collect::<Result<_>>()
                .context("invalid --arg")?,
            properties: properties
                .iter()
                .map(|p| parse_pair(p))
                .collect::<Result<_>>()
                .context("invalid --prop")?,
            tier: tier.map(str::to_string),
        })
    }
}

pub fn run<W: Write>(writer: &mut W, session: &mut Session, input: DraftInput) -> Result<()> {
    let schema = session.task().schema.clone();
    let draft = session.current_mut();
    draft.timeframe = Some(input.timeframe);
    draft.select_predicate(input.predicate, &schema);
    for (name, value) in input.arguments {
        draft.arguments.insert(name, value);
    }
    for (name, value) in input.properties {
        draft.properties.insert(name, value);
    }
    session.assign_tier(input.tier.as_deref());

    let outcome = session.save_current().context("failed to save annotation")?;
    match outcome {
        SaveOutcome::Saved(id) => {
            for message in session.take_messages() {
                writeln!(writer, "{message}")?;
            }
            tracing::debug!(identifier = %id, "save command done");
            Ok(())
        }
        SaveOutcome::Rejected(warnings) => {
            for warning in &warnings {
                writeln!(writer, "{warning}")?;
            }
            anyhow::bail!("annotation not saved: {} warning(s)", warnings.len())
        }
    }
}
