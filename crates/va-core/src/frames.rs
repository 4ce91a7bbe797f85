//! Frame lookups around a point in the video.
//!
//! Decoding video is somebody else's job: a [`FrameSource`] extracts the image at
//! one offset. [`CachedFrameFetcher`] puts a cache in front of a source and
//! extracts cache misses in parallel, returning one [`FrameResult`] per requested
//! offset, in request order.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use rayon::prelude::*;

use crate::time::TimePoint;

/// Encoded image bytes as produced by a frame source.
pub type Image = Vec<u8>;

/// Extracts single frames from a video.
pub trait FrameSource: Sync {
    /// The frame at `timestamp_ms`, or `None` if extraction failed.
    fn extract(&self, timestamp_ms: i64) -> Option<Image>;
}

/// Fetches a batch of frames.
pub trait FrameFetcher {
    fn fetch_frames(&self, timestamps_ms: &[i64]) -> Vec<FrameResult>;
}

/// The outcome of fetching one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameResult {
    pub timestamp_ms: i64,
    pub image: Option<Image>,
    pub success: bool,
}

impl FrameResult {
    pub fn new(timestamp_ms: i64, image: Option<Image>) -> Self {
        let success = image.is_some();
        Self {
            timestamp_ms,
            image,
            success,
        }
    }

    /// Caption shown under a frame, `MM:SS.mmm`.
    pub fn caption(&self) -> String {
        TimePoint::from_millis(self.timestamp_ms).short_timestamp()
    }
}

/// A frame source with an in-memory cache keyed by millisecond offset.
///
/// Failed extractions are cached too, so a bad offset is only tried once until
/// the cache is reset.
pub struct CachedFrameFetcher<S> {
    source: S,
    cache: Mutex<HashMap<i64, Option<Image>>>,
}

impl<S: FrameSource> CachedFrameFetcher<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Number of cached offsets.
    pub fn cached(&self) -> usize {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Drops every cached frame.
    pub fn reset(&self) {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn lookup(&self, timestamp_ms: i64) -> Option<Option<Image>> {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&timestamp_ms)
            .cloned()
    }
}

impl<S: FrameSource> FrameFetcher for CachedFrameFetcher<S> {
    fn fetch_frames(&self, timestamps_ms: &[i64]) -> Vec<FrameResult> {
        tracing::debug!(count = timestamps_ms.len(), "fetching frames");
        timestamps_ms
            .par_iter()
            .map(|&ts| {
                let image = self.lookup(ts).unwrap_or_else(|| {
                    tracing::debug!(timestamp_ms = ts, "extracting frame");
                    let image = self.source.extract(ts);
                    self.cache
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .insert(ts, image.clone());
                    image
                });
                FrameResult::new(ts, image)
            })
            .collect()
    }
}

/// Largest number of frames shown on each side of a context window.
pub const MAX_CONTEXT_SIZE: usize = 100;

/// Offsets of a context strip around `center_ms`: `size` steps before, the
/// center itself, and `size` steps after.
///
/// `size` is capped at [`MAX_CONTEXT_SIZE`]. Offsets saturate at the ends of
/// the `i64` range.
pub fn context_window(center_ms: i64, size: usize, step_ms: i64) -> Vec<i64> {
    if size > MAX_CONTEXT_SIZE {
        tracing::warn!(size, max = MAX_CONTEXT_SIZE, "context window size capped");
    }
    let size = i64::try_from(size.min(MAX_CONTEXT_SIZE)).unwrap_or_default();
    let offset = |i: i64| i.saturating_mul(step_ms);
    let before = (1..=size)
        .rev()
        .map(|i| center_ms.saturating_sub(offset(i)));
    let after = (1..=size).map(|i| center_ms.saturating_add(offset(i)));
    before.chain(std::iter::once(center_ms)).chain(after).collect()
}
