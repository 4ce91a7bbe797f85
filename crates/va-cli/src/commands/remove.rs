//! Remove command: tombstones a saved annotation.

use std::io::Write;

use anyhow::{Context, Result};
use va_core::AnnotationId;
use va_store::Session;

pub fn run<W: Write>(writer: &mut W, session: &mut Session, id: &str) -> Result<()> {
    let id = AnnotationId::new(id).context("invalid annotation identifier")?;
    if !session
        .remove_annotation(&id)
        .with_context(|| format!("failed to remove {id}"))?
    {
        anyhow::bail!("no saved annotation with identifier {id}");
    }
    for message in session.take_messages() {
        writeln!(writer, "{message}")?;
    }
    Ok(())
}
