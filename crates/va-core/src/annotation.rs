//! Interval annotations.
//!
//! An annotation starts life as a draft without an identifier. The annotator fills
//! in its fields one at a time; when it is saved it is validated against the task
//! schema, given the next free identifier and frozen into the live collection.
//!
//! # Validation
//!
//! [`Annotation::is_valid`] runs four independent checks and collects
//! human-readable warnings instead of failing:
//!
//! 1. task and tier are set
//! 2. start and end are set and start is not after end
//! 3. the predicate is set and no required argument is empty
//! 4. no required property is empty
//!
//! Properties the schema does not declare are not checked at all. Arguments the
//! schema does not declare for the predicate are a configuration mistake and
//! surface as [`ConfigError`].

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::fields::Fields;
use crate::schema::{Schema, TaskConfig, TierPolicy};
use crate::time::{TimeFrame, TimePoint};
use crate::types::{AnnotationId, IdentifierCounter, ValidationError};

/// Errors caused by configuration that does not match the annotations built
/// against it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The annotation carries an argument its predicate does not declare.
    #[error("argument \"{argument}\" is not declared for predicate \"{predicate}\"")]
    UndeclaredArgument { predicate: String, argument: String },
}

/// A predicate with arguments and free-form properties over a time interval.
#[derive(Debug, Clone, Default)]
pub struct Annotation {
    pub identifier: Option<AnnotationId>,
    pub task: Option<String>,
    pub tier: Option<String>,
    pub timeframe: Option<TimeFrame>,
    pub predicate: Option<String>,
    pub arguments: Fields,
    pub properties: Fields,
    warnings: Vec<String>,
}

impl Annotation {
    /// An empty draft for the given task.
    pub fn new(task: impl Into<String>) -> Self {
        Self {
            task: Some(task.into()),
            ..Self::default()
        }
    }

    /// An empty draft for a task. Every declared property is present, with the
    /// task's defaults filled in.
    pub fn draft(task: &TaskConfig) -> Self {
        let mut annotation = Self::new(task.name.clone());
        for spec in task.schema.property_specs() {
            annotation.properties.insert(spec.name.clone(), None);
        }
        for (name, value) in &task.defaults {
            annotation.properties.insert(name.clone(), Some(value.clone()));
        }
        annotation
    }

    /// Sets the predicate and replaces the arguments with the ones it declares,
    /// all empty.
    pub fn select_predicate(&mut self, predicate: impl Into<String>, schema: &Schema) {
        let predicate = predicate.into();
        self.arguments = schema
            .predicate_arguments(&predicate)
            .unwrap_or_default()
            .iter()
            .map(|spec| (spec.name.clone(), None::<String>))
            .collect();
        self.predicate = Some(predicate);
    }

    /// Start offset in milliseconds.
    pub fn start(&self) -> Option<i64> {
        self.timeframe.map(|tf| tf.start.in_milliseconds())
    }

    /// End offset in milliseconds.
    pub fn end(&self) -> Option<i64> {
        self.timeframe.map(|tf| tf.end.in_milliseconds())
    }

    /// Short label used in listings and the ELAN export.
    pub fn name(&self) -> Option<String> {
        self.elan_identifier()
    }

    /// Warnings collected by the last [`Annotation::is_valid`] call.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Drains the warnings collected by the last validation.
    pub fn take_warnings(&mut self) -> Vec<String> {
        std::mem::take(&mut self.warnings)
    }

    /// Checks the annotation against the schema.
    ///
    /// Returns `Ok(true)` when no warnings were collected. Warnings are kept on
    /// the annotation until the next call.
    pub fn is_valid(&mut self, schema: &Schema) -> Result<bool, ConfigError> {
        self.warnings.clear();
        self.check_task_and_tier();
        self.check_start_and_end();
        self.check_predicate_and_arguments(schema)?;
        self.check_properties(schema);
        Ok(self.warnings.is_empty())
    }

    fn check_task_and_tier(&mut self) {
        if is_blank(self.task.as_deref()) {
            self.warnings
                .push("WARNING: the task is not specified".to_string());
        }
        if is_blank(self.tier.as_deref()) {
            self.warnings
                .push("WARNING: the tier is not specified".to_string());
        }
    }

    fn check_start_and_end(&mut self) {
        match self.timeframe {
            None => {
                self.warnings
                    .push("WARNING: the start position is not specified".to_string());
                self.warnings
                    .push("WARNING: the end position is not specified".to_string());
            }
            Some(tf) if tf.start > tf.end => {
                self.warnings.push(
                    "WARNING: the end of the interval cannot be before the start".to_string(),
                );
            }
            Some(_) => {}
        }
    }

    fn check_predicate_and_arguments(&mut self, schema: &Schema) -> Result<(), ConfigError> {
        let Some(predicate) = self.predicate.as_deref().filter(|p| !p.is_empty()) else {
            self.warnings
                .push("WARNING: the predicate is not specified".to_string());
            return Ok(());
        };
        for (name, value) in self.arguments.iter() {
            let spec = schema.argument_spec(predicate, name).ok_or_else(|| {
                ConfigError::UndeclaredArgument {
                    predicate: predicate.to_string(),
                    argument: name.to_string(),
                }
            })?;
            if is_blank(value) && !spec.optional {
                self.warnings.push(format!(
                    "WARNING: required argument \"{name}\" is not specified"
                ));
            }
        }
        Ok(())
    }

    fn check_properties(&mut self, schema: &Schema) {
        for (name, value) in self.properties.iter() {
            let Some(spec) = schema.property_spec(name) else {
                continue;
            };
            if is_blank(value) && !spec.optional {
                self.warnings
                    .push(format!("WARNING: property \"{name}\" is not specified"));
            }
        }
    }

    /// Gives the annotation the next identifier from `counter`.
    pub fn assign_identifier(
        &mut self,
        counter: &mut IdentifierCounter,
    ) -> Result<&AnnotationId, ValidationError> {
        Ok(self.identifier.insert(counter.next_id()?))
    }

    /// Sets the tier for `frame` according to the task's tier policy.
    ///
    /// `live` is the whole live collection; only annotations of this
    /// annotation's task are considered for overlap.
    pub fn calculate_tier(
        &mut self,
        frame: &TimeFrame,
        selected_tier: Option<&str>,
        policy: &TierPolicy,
        live: &[Self],
    ) {
        let taken = live
            .iter()
            .filter(|other| other.task == self.task)
            .filter_map(|other| other.timeframe.as_ref());
        self.tier = policy.resolve(frame, selected_tier, taken);
    }

    /// A label built from the predicate's first letter and the minutes and
    /// seconds of the start, e.g. `P0312`. Not unique.
    pub fn elan_identifier(&self) -> Option<String> {
        let start = TimePoint::from_millis(self.start()?);
        let prefix = self
            .predicate
            .as_deref()
            .and_then(|p| p.chars().next())
            .unwrap_or('X');
        Some(format!("{prefix}{}{}", start.mm(), start.ss()))
    }

    /// `PUT(Object="Block1", Location="on(Base)")`
    pub fn as_formula(&self) -> String {
        let args = self
            .arguments
            .iter()
            .map(|(name, value)| format!("{name}=\"{}\"", value.unwrap_or("None")))
            .collect::<Vec<_>>()
            .join(", ");
        format!("{}({args})", self.predicate.as_deref().unwrap_or("None"))
    }

    /// The event-log record for this annotation.
    pub fn as_json(&self) -> AnnotationRecord {
        AnnotationRecord {
            identifier: self.identifier.clone(),
            task: self.task.clone(),
            tier: self.tier.clone(),
            name: self.name(),
            start: self.start(),
            end: self.end(),
            predicate: self.predicate.clone(),
            arguments: self.arguments.clone(),
            properties: self.properties.clone(),
        }
    }

    /// Rebuilds an annotation from an event-log record.
    pub fn from_record(record: AnnotationRecord) -> Self {
        let timeframe = match (record.start, record.end) {
            (Some(start), Some(end)) => Some(TimeFrame::from_millis(start, end)),
            _ => None,
        };
        Self {
            identifier: record.identifier,
            task: record.task,
            tier: record.tier,
            timeframe,
            predicate: record.predicate,
            arguments: record.arguments,
            properties: record.properties,
            warnings: Vec::new(),
        }
    }

    /// One line of the ELAN tab-separated export.
    pub fn as_elan(&self) -> String {
        format!(
            "{}\t{}\t{}\t{}: {}",
            self.tier.as_deref().unwrap_or("None"),
            seconds_or_none(self.start()),
            seconds_or_none(self.end()),
            self.elan_identifier().as_deref().unwrap_or("None"),
            self.as_formula()
        )
    }

    /// Columns for tabular listings.
    pub const COLUMNS: [&'static str; 8] = [
        "task",
        "tier",
        "id",
        "name",
        "start",
        "end",
        "predicate",
        "properties",
    ];

    /// Values matching [`Annotation::COLUMNS`].
    pub fn as_row(&self) -> [String; 8] {
        [
            or_none(self.task.as_deref()),
            or_none(self.tier.as_deref()),
            or_none(self.identifier.as_ref().map(AnnotationId::as_str)),
            or_none(self.name().as_deref()),
            short_offset(self.start()),
            short_offset(self.end()),
            self.as_formula(),
            self.properties.to_string(),
        ]
    }

    /// Case-insensitive search over task, tier, identifier, name, formula and
    /// properties. An empty term matches everything.
    pub fn matches(&self, term: &str) -> bool {
        if term.is_empty() {
            return true;
        }
        let term = term.to_lowercase();
        let haystacks = [
            format!(
                "{}{}",
                or_none(self.task.as_deref()),
                or_none(self.tier.as_deref())
            ),
            format!(
                "{}{}",
                or_none(self.name().as_deref()),
                or_none(self.identifier.as_ref().map(AnnotationId::as_str))
            ),
            self.as_formula(),
            self.properties.to_string(),
        ];
        haystacks
            .iter()
            .any(|hay| hay.to_lowercase().contains(&term))
    }
}

/// Annotations order and compare by start offset only.
impl PartialEq for Annotation {
    fn eq(&self, other: &Self) -> bool {
        self.start() == other.start()
    }
}

impl PartialOrd for Annotation {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.start().cmp(&other.start()))
    }
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [task, tier, id, name, start, end, formula, properties] = self.as_row();
        write!(
            f,
            "{task} {tier} {id} {name} {start} {end} {formula} {properties}"
        )
    }
}

/// The shape of a saved annotation in the event log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationRecord {
    pub identifier: Option<AnnotationId>,
    #[serde(default)]
    pub task: Option<String>,
    #[serde(default)]
    pub tier: Option<String>,
    /// Written for readers of the file; ignored when replaying.
    #[serde(default)]
    pub name: Option<String>,
    pub start: Option<i64>,
    pub end: Option<i64>,
    pub predicate: Option<String>,
    pub arguments: Fields,
    pub properties: Fields,
}

fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(str::is_empty)
}

fn or_none(value: Option<&str>) -> String {
    value.unwrap_or("None").to_string()
}

/// `12.345` for 12345 ms.
fn seconds_or_none(ms: Option<i64>) -> String {
    ms.map_or_else(
        || "None".to_string(),
        |ms| {
            let sign = if ms < 0 { "-" } else { "" };
            let ms = ms.unsigned_abs();
            format!("{sign}{}.{:03}", ms / 1000, ms % 1000)
        },
    )
}

fn short_offset(ms: Option<i64>) -> String {
    ms.map_or_else(
        || "None".to_string(),
        |ms| TimePoint::from_millis(ms).short_timestamp(),
    )
}
