/*
    relcas - line records <-> stand-off annotated documents

        Licensed under the GNU General Public License v3
*/

//! This module contains the [`LineChanges`] and [`ChangeLog`] structures, which record how the
//! reconstructed lines differ from the lines they were originally assembled from.

use chrono::{DateTime, Local, SecondsFormat};
use sealed::sealed;
use serde::ser::{SerializeMap, SerializeStruct, SerializeTuple, Serializer};
use serde::Serialize;
use serde_json::Value;
use smallvec::SmallVec;
use std::collections::BTreeMap;

use crate::json::ToJson;
use crate::line::{entity_to_value, EntitySpan, Line, HEAD_KEY, RELATION_KEY, TAIL_KEY};
use crate::types::*;

/// A single changed field of a line, with its old and new value
#[derive(Debug, Clone, PartialEq)]
pub struct FieldChange {
    pub field: &'static str,
    pub old: Value,
    pub new: Value,
}

/// The changed fields of a single line. Only `h`, `t` and `relation` can change.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LineChanges(SmallVec<[FieldChange; 3]>);

impl LineChanges {
    /// Compares an original line with its reconstruction. Returns `None` if nothing changed.
    ///
    /// The name of an entity only counts as changed if the original line carried one, as names
    /// are optional in the input but always present in reconstructed lines.
    pub fn between(original: &Line, reconstructed: &Line) -> Option<Self> {
        let mut changes = Self::default();
        for (field, old, new) in [
            (HEAD_KEY, original.head(), reconstructed.head()),
            (TAIL_KEY, original.tail(), reconstructed.tail()),
        ] {
            if entity_changed(old, new) {
                changes.0.push(FieldChange {
                    field,
                    old: original
                        .source_value(field)
                        .cloned()
                        .unwrap_or_else(|| entity_to_value(old)),
                    new: entity_to_value(new),
                });
            }
        }
        if original.relation() != reconstructed.relation() {
            changes.0.push(FieldChange {
                field: RELATION_KEY,
                old: original.relation().into(),
                new: reconstructed.relation().into(),
            });
        }
        if changes.is_empty() {
            None
        } else {
            Some(changes)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldChange> {
        self.0.iter()
    }

    /// Returns the change to a particular field, if it changed
    pub fn get(&self, field: &str) -> Option<&FieldChange> {
        self.0.iter().find(|change| change.field == field)
    }
}

fn entity_changed(old: &EntitySpan, new: &EntitySpan) -> bool {
    old.id != new.id
        || old.pos != new.pos
        || (old.name.is_some() && old.name != new.name)
}

impl Serialize for LineChanges {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_map(Some(self.len()))?;
        for change in self.iter() {
            state.serialize_entry(change.field, &OldNew(&change.old, &change.new))?;
        }
        state.end()
    }
}

/// Serialises as a two-element array `[old, new]`
struct OldNew<'a>(&'a Value, &'a Value);

impl<'a> Serialize for OldNew<'a> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_tuple(2)?;
        state.serialize_element(self.0)?;
        state.serialize_element(self.1)?;
        state.end()
    }
}

/// All changes found in a disassembly run, keyed by the (1-based) physical line number of the
/// line file. Lines without changes are absent.
#[derive(Debug, Clone)]
pub struct ChangeLog {
    generated: DateTime<Local>,
    entries: BTreeMap<usize, LineChanges>,
}

impl Default for ChangeLog {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeLog {
    pub fn new() -> Self {
        Self {
            generated: Local::now(),
            entries: BTreeMap::new(),
        }
    }

    /// Records the changes for a line, replacing any earlier record for that same line
    pub fn insert(&mut self, line_number: usize, changes: LineChanges) {
        if !changes.is_empty() {
            self.entries.insert(line_number, changes);
        }
    }

    /// Returns the changes of a particular line
    pub fn get(&self, line_number: usize) -> Option<&LineChanges> {
        self.entries.get(&line_number)
    }

    /// Iterates over all changed lines, in line order
    pub fn iter(&self) -> impl Iterator<Item = (usize, &LineChanges)> {
        self.entries.iter().map(|(line, changes)| (*line, changes))
    }

    /// Number of changed lines
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The time this change log was created
    pub fn generated(&self) -> &DateTime<Local> {
        &self.generated
    }
}

#[sealed]
impl TypeInfo for ChangeLog {
    fn typeinfo() -> Type {
        Type::ChangeLog
    }
}

impl ToJson for ChangeLog {}

impl Serialize for ChangeLog {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("ChangeLog", 2)?;
        state.serialize_field(
            "generated",
            &self.generated.to_rfc3339_opts(SecondsFormat::Secs, true),
        )?;
        state.serialize_field("changes", &ChangesMap(&self.entries))?;
        state.end()
    }
}

/// Serialises the entries with the line numbers as string keys
struct ChangesMap<'a>(&'a BTreeMap<usize, LineChanges>);

impl<'a> Serialize for ChangesMap<'a> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_map(Some(self.0.len()))?;
        for (line, changes) in self.0.iter() {
            state.serialize_entry(&line.to_string(), changes)?;
        }
        state.end()
    }
}
