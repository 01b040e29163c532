// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Core types for Speckle object representation
//!
//! Objects are kept as insertion-ordered JSON mappings: the flattener walks
//! keys in their source order, so order must survive (de)serialization.

use crate::{fields, ObjectError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One node of a Speckle model graph
///
/// An open-ended mapping from string keys to arbitrary JSON values. Only a
/// handful of conventional keys (`id`, `speckle_type`, `properties`) are
/// interpreted; everything else is carried through untouched.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpeckleObject(Map<String, Value>);

impl SpeckleObject {
    /// Create an empty object
    pub fn new() -> Self {
        Self::default()
    }

    /// Content-derived identifier, if present and a string
    pub fn id(&self) -> Option<&str> {
        self.0.get(fields::ID).and_then(Value::as_str)
    }

    /// Type tag, or the empty string when absent or not a string
    pub fn speckle_type(&self) -> &str {
        self.0
            .get(fields::SPECKLE_TYPE)
            .and_then(Value::as_str)
            .unwrap_or("")
    }

    /// Nested `properties` payload
    pub fn properties(&self) -> Option<&Value> {
        self.0.get(fields::PROPERTIES)
    }

    /// Get a field by key
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Check if a field is present
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Set a field, returning the previous value
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    /// Remove a field, returning its value
    ///
    /// Remaining fields keep their original order.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let mut removed = None;
        self.0 = std::mem::take(&mut self.0)
            .into_iter()
            .filter_map(|(k, v)| {
                if removed.is_none() && k == key {
                    removed = Some(v);
                    None
                } else {
                    Some((k, v))
                }
            })
            .collect();
        removed
    }

    /// Shallow copy with the given top-level fields dropped
    ///
    /// Remaining fields keep their original order.
    pub fn without_fields<S: AsRef<str>>(&self, excluded: &[S]) -> SpeckleObject {
        let map = self
            .0
            .iter()
            .filter(|(key, _)| !excluded.iter().any(|f| f.as_ref() == key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        SpeckleObject(map)
    }

    /// Number of top-level fields
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the object has no fields
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over top-level field names in order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Borrow the underlying mapping
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Consume into the underlying mapping
    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for SpeckleObject {
    fn from(map: Map<String, Value>) -> Self {
        SpeckleObject(map)
    }
}

impl From<SpeckleObject> for Value {
    fn from(object: SpeckleObject) -> Self {
        Value::Object(object.0)
    }
}

impl TryFrom<Value> for SpeckleObject {
    type Error = ObjectError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(SpeckleObject(map)),
            other => Err(ObjectError::InvalidObject(format!(
                "expected a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Single-level key/value map produced by flattening an object's properties
///
/// Keys are unique and ordered by first insertion. Values are scalars,
/// `null` or arrays (arrays are kept verbatim, including arrays of objects).
/// The one sanctioned exception is the `value` of a name/value parameter,
/// which is stored exactly as found.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlattenedRecord(Map<String, Value>);

impl FlattenedRecord {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a field value
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Check if a field is present
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Set a field; an existing key keeps its position and takes the new value
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    /// Set a field only if the key is not yet taken
    ///
    /// Returns `true` when the value was stored.
    pub fn insert_if_absent(&mut self, key: String, value: Value) -> bool {
        if self.0.contains_key(&key) {
            return false;
        }
        self.0.insert(key, value);
        true
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the record has no fields
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over field names in order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Iterate over fields in order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Borrow the underlying mapping
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Consume into the underlying mapping
    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

impl FromIterator<(String, Value)> for FlattenedRecord {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        FlattenedRecord(iter.into_iter().collect())
    }
}

impl IntoIterator for FlattenedRecord {
    type Item = (String, Value);
    type IntoIter = serde_json::map::IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl From<FlattenedRecord> for Value {
    fn from(record: FlattenedRecord) -> Self {
        Value::Object(record.0)
    }
}
