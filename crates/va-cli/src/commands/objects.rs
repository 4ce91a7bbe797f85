//! Objects command for moving domain objects in and out of play.

use std::io::Write;

use anyhow::{Context, Result};
use va_store::Session;

pub fn add<W: Write>(
    writer: &mut W,
    session: &mut Session,
    object_type: &str,
    ids: &[String],
) -> Result<()> {
    session
        .put_objects_in_play(object_type, ids)
        .context("failed to put objects in play")?;
    print_messages(writer, session)
}

pub fn remove<W: Write>(
    writer: &mut W,
    session: &mut Session,
    object_type: &str,
    ids: &[String],
) -> Result<()> {
    session
        .remove_objects_from_play(object_type, ids)
        .context("failed to remove objects from play")?;
    print_messages(writer, session)
}

/// Prints both bins of one object type, or of every type.
pub fn list<W: Write>(writer: &mut W, session: &Session, object_type: Option<&str>) -> Result<()> {
    let pool = session.pool();
    let types: Vec<&str> = match object_type {
        Some(t) => vec![t],
        None => pool.object_types().collect(),
    };
    if types.is_empty() {
        writeln!(writer, "No objects configured.")?;
        return Ok(());
    }

    for object_type in types {
        let (Some(available), Some(in_play)) =
            (pool.get_available(object_type), pool.get_in_play(object_type))
        else {
            anyhow::bail!("unknown object type: {object_type}");
        };
        writeln!(writer, "{object_type}:")?;
        writeln!(writer, "  available: {}", join(available))?;
        writeln!(writer, "  in play:   {}", join(in_play))?;
    }
    Ok(())
}

fn join<'a>(objects: impl IntoIterator<Item = &'a String>) -> String {
    let joined = objects
        .into_iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    if joined.is_empty() {
        "-".to_string()
    } else {
        joined
    }
}

fn print_messages<W: Write>(writer: &mut W, session: &mut Session) -> Result<()> {
    for message in session.take_messages() {
        writeln!(writer, "{message}")?;
    }
    Ok(())
}
