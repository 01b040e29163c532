// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Object selection
//!
//! Raw model graphs mix geometry bookkeeping with the DataObjects that carry
//! BIM metadata. When any DataObject is present only DataObjects are kept;
//! otherwise everything except raw encodings and data chunks is kept.

use log::debug;
use speckle_lite_model::fields::{
    DATA_CHUNK_TYPE, DATA_OBJECT_MARKER, FILTER_STRIPPED_FIELDS, RAW_ENCODING_TYPE,
};
use speckle_lite_model::SpeckleObject;

/// Selection rule chosen for a batch of objects
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FilterMode {
    /// At least one DataObject is present; keep DataObjects only
    DataObject,
    /// No DataObjects; keep everything that is not technical
    Fallback,
}

/// Field cleanup and type-based selection
#[derive(Clone, Debug)]
pub struct ObjectFilter {
    /// Top-level fields removed from every object
    pub stripped_fields: Vec<String>,
}

impl ObjectFilter {
    /// Create a filter with the default stripped fields
    pub fn new() -> Self {
        Self {
            stripped_fields: FILTER_STRIPPED_FIELDS
                .iter()
                .map(|f| f.to_string())
                .collect(),
        }
    }

    /// Replace the stripped field list
    pub fn with_stripped_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stripped_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Shallow copy of an object without the stripped fields
    pub fn clean(&self, object: &SpeckleObject) -> SpeckleObject {
        object.without_fields(self.stripped_fields.as_slice())
    }

    /// Decide the selection rule for a batch
    pub fn mode(&self, objects: &[SpeckleObject]) -> FilterMode {
        detect_mode(objects.iter())
    }

    /// Clean and select objects, preserving input order
    pub fn filter(&self, objects: &[SpeckleObject]) -> Vec<SpeckleObject> {
        let cleaned: Vec<SpeckleObject> = objects.iter().map(|o| self.clean(o)).collect();
        let mode = detect_mode(cleaned.iter());

        let selected: Vec<SpeckleObject> = cleaned
            .into_iter()
            .filter(|o| is_selected(o, mode))
            .collect();

        debug!(
            "Object filter ({:?} mode) kept {} of {} objects",
            mode,
            selected.len(),
            objects.len()
        );
        selected
    }
}

impl Default for ObjectFilter {
    fn default() -> Self {
        Self::new()
    }
}

/// Objects with no informational value: data chunks and raw encodings
pub fn is_technical(object: &SpeckleObject) -> bool {
    let speckle_type = object.speckle_type();
    speckle_type == DATA_CHUNK_TYPE || speckle_type.contains(RAW_ENCODING_TYPE)
}

/// Objects carrying user-meaningful BIM metadata
pub fn is_data_object(object: &SpeckleObject) -> bool {
    object.speckle_type().contains(DATA_OBJECT_MARKER)
}

fn detect_mode<'a>(mut objects: impl Iterator<Item = &'a SpeckleObject>) -> FilterMode {
    if objects.any(|o| !is_technical(o) && is_data_object(o)) {
        FilterMode::DataObject
    } else {
        FilterMode::Fallback
    }
}

fn is_selected(object: &SpeckleObject, mode: FilterMode) -> bool {
    if is_technical(object) {
        return false;
    }
    match mode {
        FilterMode::DataObject => is_data_object(object),
        FilterMode::Fallback => true,
    }
}
