// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Property flattening
//!
//! Collapses an object's nested `properties` payload into one flat record.
//! Name/value parameters (`{ name, value }`, the Revit convention) become a
//! single field keyed by their `name`. Colliding names are disambiguated by
//! appending reversed parent-path segments, e.g. `volume` under
//! `Parameters.Structural` becomes `volume.Structural`, then
//! `volume.Structural.Parameters`.

use log::trace;
use rustc_hash::FxHashSet;
use serde_json::{Map, Value};
use speckle_lite_model::fields::{BARE_VALUE, EXCLUDED_PROPERTY_PATHS, NAME, PROPERTIES, VALUE};
use speckle_lite_model::{FlattenedRecord, SpeckleObject};
use std::collections::HashSet;
use std::hash::BuildHasher;

/// Recursive property flattener
///
/// Each call to [`flatten`](Self::flatten) owns its own set of claimed
/// field names, so one flattener can be shared across threads and objects.
#[derive(Clone, Debug)]
pub struct PropertyFlattener {
    /// Substrings of a dotted property path that exclude the whole subtree
    pub excluded_paths: Vec<String>,
}

impl PropertyFlattener {
    /// Create a flattener with the default excluded paths
    pub fn new() -> Self {
        Self {
            excluded_paths: EXCLUDED_PROPERTY_PATHS
                .iter()
                .map(|p| p.to_string())
                .collect(),
        }
    }

    /// Replace the excluded path list
    pub fn with_excluded_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_paths = paths.into_iter().map(Into::into).collect();
        self
    }

    /// Add one excluded path
    pub fn with_excluded_path(mut self, path: impl Into<String>) -> Self {
        self.excluded_paths.push(path.into());
        self
    }

    /// Flatten an arbitrary JSON value
    ///
    /// A mapping with a `properties` key is flattened through that key.
    /// `null` yields an empty record; any other non-mapping value yields
    /// `{ "Value": <value> }`.
    pub fn flatten(&self, input: &Value) -> FlattenedRecord {
        let mut claimed = FxHashSet::default();
        self.flatten_value(input, None, &mut claimed)
    }

    /// Flatten an object's `properties`, or the object itself when it has none
    pub fn flatten_object(&self, object: &SpeckleObject) -> FlattenedRecord {
        let mut claimed = FxHashSet::default();
        self.flatten_record(object.as_map(), None, &mut claimed)
    }

    /// Check if a dotted path falls under an excluded subtree
    pub fn is_excluded(&self, path: &str) -> bool {
        self.excluded_paths.iter().any(|p| path.contains(p.as_str()))
    }

    fn flatten_value(
        &self,
        input: &Value,
        parent_path: Option<&str>,
        claimed: &mut FxHashSet<String>,
    ) -> FlattenedRecord {
        match input {
            Value::Object(map) => self.flatten_record(map, parent_path, claimed),
            other => bare_record(other, claimed),
        }
    }

    fn flatten_record(
        &self,
        record: &Map<String, Value>,
        parent_path: Option<&str>,
        claimed: &mut FxHashSet<String>,
    ) -> FlattenedRecord {
        match record.get(PROPERTIES) {
            Some(Value::Object(props)) => self.flatten_fields(props, parent_path, claimed),
            Some(other) => bare_record(other, claimed),
            None => self.flatten_fields(record, parent_path, claimed),
        }
    }

    fn flatten_fields(
        &self,
        fields: &Map<String, Value>,
        parent_path: Option<&str>,
        claimed: &mut FxHashSet<String>,
    ) -> FlattenedRecord {
        let mut result = FlattenedRecord::new();

        for (field_name, field_value) in fields {
            let path = match parent_path {
                Some(parent) if !parent.is_empty() => format!("{}.{}", parent, field_name),
                _ => field_name.clone(),
            };

            if self.is_excluded(&path) {
                trace!("Skipping excluded property path {}", path);
                continue;
            }

            match field_value {
                Value::Object(inner) if is_name_value(inner) => {
                    // Parameters without a name carry nothing addressable
                    let Some(name) = parameter_name(inner) else {
                        continue;
                    };
                    let resolved = resolve_field_name(&name, parent_path, claimed);
                    claimed.insert(resolved.clone());
                    let value = inner.get(VALUE).cloned().unwrap_or(Value::Null);
                    result.insert(resolved, value);
                }
                Value::Object(inner) => {
                    if inner.is_empty() {
                        continue;
                    }
                    // Fields already in this record win over the subtree
                    let nested = self.flatten_record(inner, Some(&path), claimed);
                    for (key, value) in nested {
                        result.insert_if_absent(key, value);
                    }
                }
                leaf => {
                    let resolved = resolve_field_name(field_name, parent_path, claimed);
                    claimed.insert(resolved.clone());
                    result.insert(resolved, leaf.clone());
                }
            }
        }

        result
    }
}

impl Default for PropertyFlattener {
    fn default() -> Self {
        Self::new()
    }
}

/// Pick a field name that does not collide with already-claimed names
///
/// Returns `candidate` unchanged when it is free, or when there is no
/// parent path to disambiguate with. Otherwise appends 1, 2, 3, ... reversed
/// parent segments and returns the first free candidate. When every
/// candidate is taken the deepest one is returned anyway.
///
/// # Example
///
/// ```
/// use std::collections::HashSet;
/// use speckle_lite_transform::resolve_field_name;
///
/// let claimed: HashSet<String> = ["volume".to_string()].into_iter().collect();
/// let name = resolve_field_name("volume", Some("Parameters.Structural"), &claimed);
/// assert_eq!(name, "volume.Structural");
/// ```
pub fn resolve_field_name<S: BuildHasher>(
    candidate: &str,
    parent_path: Option<&str>,
    claimed: &HashSet<String, S>,
) -> String {
    if !claimed.contains(candidate) {
        return candidate.to_string();
    }

    let parent = match parent_path {
        Some(parent) if !parent.is_empty() => parent,
        _ => return candidate.to_string(),
    };

    let segments: Vec<&str> = parent.split('.').rev().collect();
    let mut deepest = candidate.to_string();
    for depth in 1..=segments.len() {
        deepest = format!("{}.{}", candidate, segments[..depth].join("."));
        if !claimed.contains(&deepest) {
            return deepest;
        }
    }
    deepest
}

/// A mapping carrying both `name` and `value` is a single parameter
fn is_name_value(map: &Map<String, Value>) -> bool {
    map.contains_key(NAME) && map.contains_key(VALUE)
}

/// Output key of a name/value parameter, `None` when the name is null
fn parameter_name(map: &Map<String, Value>) -> Option<String> {
    match map.get(NAME)? {
        Value::Null => None,
        Value::String(name) => Some(name.clone()),
        other => Some(other.to_string()),
    }
}

fn bare_record(value: &Value, claimed: &mut FxHashSet<String>) -> FlattenedRecord {
    let mut record = FlattenedRecord::new();
    if !value.is_null() {
        claimed.insert(BARE_VALUE.to_string());
        record.insert(BARE_VALUE, value.clone());
    }
    record
}
