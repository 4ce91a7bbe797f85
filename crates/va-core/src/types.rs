//! Annotation identifiers and the counter that hands them out.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },
    /// Every sequence number has been handed out.
    #[error("no annotation identifiers left after a{0:04}")]
    Exhausted(u32),
}

/// A validated annotation identifier.
///
/// Identifiers handed out by a session have the form `a0001`: the letter `a`
/// followed by a zero-padded sequence number. Identifiers read back from a log
/// only need to be non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AnnotationId(String);

impl TryFrom<String> for AnnotationId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AnnotationId> for String {
    fn from(id: AnnotationId) -> Self {
        id.0
    }
}

impl fmt::Display for AnnotationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AnnotationId {
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.is_empty() {
            return Err(ValidationError::Empty {
                field: "annotation ID",
            });
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Builds the identifier for a sequence number, e.g. `7` becomes `a0007`.
    pub fn from_sequence(sequence: u32) -> Self {
        Self(format!("a{sequence:04}"))
    }

    /// The numeric suffix of an `a####` identifier, if it has that form.
    pub fn sequence(&self) -> Option<u32> {
        let digits = self.0.strip_prefix('a')?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok()
    }
}

/// Hands out `max + 1` annotation identifiers.
///
/// The counter only moves forward: observing an identifier raises the high-water
/// mark, and nothing lowers it, so identifiers of tombstoned annotations are never
/// handed out again. Gaps are expected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IdentifierCounter {
    highest: u32,
}

impl IdentifierCounter {
    pub const fn new() -> Self {
        Self { highest: 0 }
    }

    /// Seeds a counter from existing identifiers.
    pub fn from_identifiers<'a>(ids: impl IntoIterator<Item = &'a AnnotationId>) -> Self {
        let mut counter = Self::new();
        for id in ids {
            counter.observe(id);
        }
        counter
    }

    /// Raises the high-water mark if `id` carries a larger sequence number.
    pub fn observe(&mut self, id: &AnnotationId) {
        match id.sequence() {
            Some(seq) => self.highest = self.highest.max(seq),
            None => tracing::debug!(identifier = %id, "identifier has no sequence number"),
        }
    }

    pub const fn highest(&self) -> u32 {
        self.highest
    }

    /// Returns the next identifier and records it as taken.
    pub fn next_id(&mut self) -> Result<AnnotationId, ValidationError> {
        self.highest = self
            .highest
            .checked_add(1)
            .ok_or(ValidationError::Exhausted(self.highest))?;
        Ok(AnnotationId::from_sequence(self.highest))
    }
}
