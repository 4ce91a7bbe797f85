//! Task configuration: the annotation schema, the tier policy and the initial
//! object inventory.
//!
//! All of this is loaded once at startup and treated as read-only afterwards.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::time::TimeFrame;

/// Declaration of one predicate argument or one annotation property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Field name, written as `type` in configuration files.
    #[serde(rename = "type")]
    pub name: String,
    /// Whether an empty value is acceptable.
    #[serde(default)]
    pub optional: bool,
}

impl FieldSpec {
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            optional: false,
        }
    }

    pub fn optional(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            optional: true,
        }
    }

    /// `Name` or `Name?` for optional fields.
    pub fn signature(&self) -> String {
        if self.optional {
            format!("{}?", self.name)
        } else {
            self.name.clone()
        }
    }
}

pub type ArgSpec = FieldSpec;
pub type PropertySpec = FieldSpec;

/// Which predicates exist, which arguments they take, and which properties every
/// annotation carries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    #[serde(default)]
    pub predicates: BTreeMap<String, Vec<ArgSpec>>,
    #[serde(default)]
    pub properties: Vec<PropertySpec>,
}

impl Schema {
    /// Ordered argument declarations for a predicate.
    pub fn predicate_arguments(&self, predicate: &str) -> Option<&[ArgSpec]> {
        self.predicates.get(predicate).map(Vec::as_slice)
    }

    pub fn argument_spec(&self, predicate: &str, argument: &str) -> Option<&ArgSpec> {
        self.predicate_arguments(predicate)?
            .iter()
            .find(|spec| spec.name == argument)
    }

    pub fn property_specs(&self) -> &[PropertySpec] {
        &self.properties
    }

    pub fn property_spec(&self, property: &str) -> Option<&PropertySpec> {
        self.properties.iter().find(|spec| spec.name == property)
    }

    pub fn predicate_names(&self) -> impl Iterator<Item = &str> {
        self.predicates.keys().map(String::as_str)
    }
}

/// How a saved annotation gets its tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum TierPolicy {
    /// Every annotation goes to the one configured tier.
    Single { tier: String },
    /// The annotator picks the tier; `tiers` lists the choices offered.
    UserDefined {
        #[serde(default)]
        tiers: Vec<String>,
    },
    /// Annotations overlapping an existing one of the same task go to
    /// `secondary`, all others to `primary`.
    ///
    /// Only two lanes exist: a third overlapping annotation also lands in
    /// `secondary`.
    Overlap { primary: String, secondary: String },
}

impl Default for TierPolicy {
    fn default() -> Self {
        Self::Single {
            tier: "Default".to_string(),
        }
    }
}

impl TierPolicy {
    /// Resolves the tier for a candidate frame.
    ///
    /// `selected` is the annotator's choice and only matters for
    /// [`TierPolicy::UserDefined`]; `taken` are the frames of live annotations in
    /// the same task and only matter for [`TierPolicy::Overlap`].
    pub fn resolve<'a>(
        &self,
        frame: &TimeFrame,
        selected: Option<&str>,
        taken: impl IntoIterator<Item = &'a TimeFrame>,
    ) -> Option<String> {
        match self {
            Self::Single { tier } => Some(tier.clone()),
            Self::UserDefined { .. } => selected.map(str::to_string),
            Self::Overlap { primary, secondary } => {
                if taken.into_iter().any(|other| frame.overlaps(other)) {
                    Some(secondary.clone())
                } else {
                    Some(primary.clone())
                }
            }
        }
    }

    /// Every tier name this policy can produce.
    pub fn tier_names(&self) -> Vec<&str> {
        match self {
            Self::Single { tier } => vec![tier.as_str()],
            Self::UserDefined { tiers } => tiers.iter().map(String::as_str).collect(),
            Self::Overlap { primary, secondary } => vec![primary.as_str(), secondary.as_str()],
        }
    }
}

/// Static configuration of one annotation task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskConfig {
    /// Task name recorded on every annotation.
    #[serde(default = "default_task_name")]
    pub name: String,
    #[serde(default)]
    pub tiers: TierPolicy,
    #[serde(default)]
    pub schema: Schema,
    /// Object type to the ids that start out available.
    #[serde(default)]
    pub object_pool: BTreeMap<String, Vec<String>>,
    /// Property values pre-filled on every fresh draft.
    #[serde(default)]
    pub defaults: BTreeMap<String, String>,
}

fn default_task_name() -> String {
    "Main".to_string()
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self {
            name: default_task_name(),
            tiers: TierPolicy::default(),
            schema: Schema::default(),
            object_pool: BTreeMap::new(),
            defaults: BTreeMap::new(),
        }
    }
}
