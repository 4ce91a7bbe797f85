//! Event-log record shapes.
//!
//! Each line of the event log is one of:
//!
//! ```text
//! {"identifier": "a0007", "task": "...", "tier": "...", "start": 1500, ...}
//! {"add-object": ["blocks", "LargeRedBlock1"]}
//! {"remove-object": ["blocks", "LargeRedBlock1"]}
//! {"remove-annotation": "a0007"}
//! ```

use serde::{Deserialize, Serialize};
use va_core::{Annotation, AnnotationId, AnnotationRecord};

/// One line of the event log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LogRecord {
    /// An object was put in play.
    AddObject {
        #[serde(rename = "add-object")]
        add_object: (String, String),
    },
    /// An object was taken out of play.
    RemoveObject {
        #[serde(rename = "remove-object")]
        remove_object: (String, String),
    },
    /// Tombstone for a saved annotation.
    RemoveAnnotation {
        #[serde(rename = "remove-annotation")]
        remove_annotation: AnnotationId,
    },
    /// A saved annotation.
    Annotation(AnnotationRecord),
}

impl LogRecord {
    pub fn add_object(object_type: impl Into<String>, object: impl Into<String>) -> Self {
        Self::AddObject {
            add_object: (object_type.into(), object.into()),
        }
    }

    pub fn remove_object(object_type: impl Into<String>, object: impl Into<String>) -> Self {
        Self::RemoveObject {
            remove_object: (object_type.into(), object.into()),
        }
    }

    pub const fn remove_annotation(identifier: AnnotationId) -> Self {
        Self::RemoveAnnotation {
            remove_annotation: identifier,
        }
    }

    pub fn annotation(annotation: &Annotation) -> Self {
        Self::Annotation(annotation.as_json())
    }
}
