//! Domain objects that can be brought into and out of play.
//!
//! Each object type has two bins, `available` and `in_play`, and every known id
//! sits in exactly one of them. Transitions are best effort: moving an object that
//! is not where it is expected to be still lands it in the target bin, and the
//! caller learns about it through [`Transition::Forced`].

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;

/// The two bins of one object type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ObjectBins {
    pub available: BTreeSet<String>,
    #[serde(rename = "inplay")]
    pub in_play: BTreeSet<String>,
}

/// What a transition had to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The object was in the source bin and was moved.
    Moved,
    /// The object was not in the source bin (already moved, or never seen) and
    /// was put into the target bin anyway.
    Forced,
}

impl Transition {
    pub const fn was_forced(self) -> bool {
        matches!(self, Self::Forced)
    }
}

/// Objects by type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ObjectPool {
    objects: BTreeMap<String, ObjectBins>,
}

impl ObjectPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a pool where every listed object starts out available.
    pub fn from_inventory<'a, I, O>(inventory: I) -> Self
    where
        I: IntoIterator<Item = (&'a String, O)>,
        O: IntoIterator<Item = &'a String>,
    {
        let mut pool = Self::new();
        for (object_type, objects) in inventory {
            pool.add_objects(object_type, objects.into_iter().cloned());
        }
        pool
    }

    /// Registers an object type with empty bins. Existing bins are kept.
    pub fn add_object_type(&mut self, object_type: impl Into<String>) -> &mut ObjectBins {
        self.objects.entry(object_type.into()).or_default()
    }

    /// Makes an object available, creating its type on first use.
    pub fn add_object(&mut self, object_type: &str, object: impl Into<String>) {
        self.add_object_type(object_type).available.insert(object.into());
    }

    pub fn add_objects<I>(&mut self, object_type: &str, objects: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.add_object_type(object_type).available.extend(objects);
    }

    /// Moves an object from `available` to `in_play`.
    pub fn put_in_play(&mut self, object_type: &str, object: &str) -> Transition {
        let bins = self.add_object_type(object_type);
        let moved = bins.available.remove(object);
        bins.in_play.insert(object.to_string());
        if moved {
            Transition::Moved
        } else {
            tracing::warn!(object_type, object, "object was already put in play");
            Transition::Forced
        }
    }

    /// Moves an object from `in_play` back to `available`.
    pub fn remove_from_play(&mut self, object_type: &str, object: &str) -> Transition {
        let bins = self.add_object_type(object_type);
        let moved = bins.in_play.remove(object);
        bins.available.insert(object.to_string());
        if moved {
            Transition::Moved
        } else {
            tracing::warn!(object_type, object, "object was already removed from play");
            Transition::Forced
        }
    }

    pub fn put_objects_in_play<'a>(
        &mut self,
        object_type: &str,
        objects: impl IntoIterator<Item = &'a str>,
    ) -> Vec<Transition> {
        objects
            .into_iter()
            .map(|object| self.put_in_play(object_type, object))
            .collect()
    }

    pub fn remove_objects_from_play<'a>(
        &mut self,
        object_type: &str,
        objects: impl IntoIterator<Item = &'a str>,
    ) -> Vec<Transition> {
        objects
            .into_iter()
            .map(|object| self.remove_from_play(object_type, object))
            .collect()
    }

    pub fn get_available(&self, object_type: &str) -> Option<&BTreeSet<String>> {
        self.objects.get(object_type).map(|bins| &bins.available)
    }

    pub fn get_in_play(&self, object_type: &str) -> Option<&BTreeSet<String>> {
        self.objects.get(object_type).map(|bins| &bins.in_play)
    }

    pub fn object_types(&self) -> impl Iterator<Item = &str> {
        self.objects.keys().map(String::as_str)
    }

    /// Number of objects of a type across both bins.
    pub fn count(&self, object_type: &str) -> usize {
        self.objects
            .get(object_type)
            .map_or(0, |bins| bins.available.len() + bins.in_play.len())
    }
}

impl fmt::Display for ObjectPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts = self
            .object_types()
            .map(|t| format!("{t}={}", self.count(t)))
            .collect::<Vec<_>>()
            .join(" ");
        write!(f, "<ObjectPool {counts}>")
    }
}
