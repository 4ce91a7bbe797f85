//! Window command: the frames around an offset.
//!
//! Frames are not decoded here. They are read from a directory of pre-extracted
//! images named by millisecond offset, e.g. `61500.jpg`.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Result;
use va_core::{CachedFrameFetcher, FrameFetcher, FrameSource, context_window};
use va_store::Session;

use super::util::parse_offset;

const EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Frame source backed by a directory of `<ms>.<ext>` images.
#[derive(Debug, Clone)]
pub struct FrameDirectory {
    dir: PathBuf,
}

impl FrameDirectory {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl FrameSource for FrameDirectory {
    fn extract(&self, timestamp_ms: i64) -> Option<Vec<u8>> {
        if timestamp_ms < 0 {
            return None;
        }
        EXTENSIONS.iter().find_map(|ext| {
            let path = self.dir.join(format!("{timestamp_ms}.{ext}"));
            std::fs::read(&path).ok()
        })
    }
}

pub fn run<W: Write, F: FrameFetcher>(
    writer: &mut W,
    session: &Session,
    fetcher: &F,
    at: &str,
    size: usize,
    step_ms: i64,
) -> Result<()> {
    let center = parse_offset(at)?.in_milliseconds();
    let offsets = context_window(center, size, step_ms);
    session.debug(
        &format!("Fetching {} frames around {center}", offsets.len()),
        &offsets
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n"),
    )?;

    for frame in fetcher.fetch_frames(&offsets) {
        let marker = if frame.timestamp_ms == center { '*' } else { ' ' };
        let detail = frame
            .image
            .as_ref()
            .map_or_else(|| "missing".to_string(), |image| format!("{} bytes", image.len()));
        writeln!(writer, "{}{marker} {detail}", frame.caption())?;
    }
    Ok(())
}

/// A fetcher for the frames directory of one video.
pub fn directory_fetcher(dir: impl Into<PathBuf>) -> CachedFrameFetcher<FrameDirectory> {
    CachedFrameFetcher::new(FrameDirectory::new(dir))
}
