//! List command for showing saved annotations.

use std::io::Write;

use anyhow::Result;
use va_core::Annotation;
use va_store::Session;

pub fn run<W: Write>(
    writer: &mut W,
    session: &Session,
    search: Option<&str>,
    json: bool,
) -> Result<()> {
    let found = session.search(search.unwrap_or_default());

    if json {
        for annotation in found {
            writeln!(writer, "{}", serde_json::to_string(&annotation.as_json())?)?;
        }
        return Ok(());
    }

    if found.is_empty() {
        writeln!(writer, "No annotations.")?;
        return Ok(());
    }

    writeln!(writer, "{}", Annotation::COLUMNS.join("\t"))?;
    for annotation in found {
        writeln!(writer, "{}", annotation.as_row().join("\t"))?;
    }
    Ok(())
}
