//! Core domain logic for the video interval annotator.
//!
//! This crate contains the fundamental types and logic for:
//! - Time: offsets into a video and the intervals between them
//! - Annotations: validation against the task schema, tier assignment, export forms
//! - Object pool: domain objects moving in and out of play
//! - Frames: the interface for fetching video frames around an offset

pub mod annotation;
pub mod fields;
pub mod frames;
pub mod pool;
pub mod schema;
pub mod time;
pub mod types;

pub use annotation::{Annotation, AnnotationRecord, ConfigError};
pub use fields::Fields;
pub use frames::{
    CachedFrameFetcher, FrameFetcher, FrameResult, FrameSource, MAX_CONTEXT_SIZE, context_window,
};
pub use pool::{ObjectBins, ObjectPool, Transition};
pub use schema::{ArgSpec, FieldSpec, PropertySpec, Schema, TaskConfig, TierPolicy};
pub use time::{TimeFrame, TimePoint};
pub use types::{AnnotationId, IdentifierCounter, ValidationError};
