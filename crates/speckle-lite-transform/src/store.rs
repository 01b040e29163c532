// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory object store implementing the fetch and stream seams

use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};
use rustc_hash::FxHashMap;
use speckle_lite_model::{
    ObjectError, ObjectFetcher, ObjectSource, ObjectStream, Result, SpeckleObject,
};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Object store backed by a vector, in insertion order
///
/// Streams every object it holds and serves fetches by `id`. Useful for
/// offline processing of an already-downloaded model and for tests.
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    /// Objects in insertion order
    objects: Vec<SpeckleObject>,
    /// Object id -> position in `objects`
    index: FxHashMap<String, usize>,
    /// Number of fetch calls served (hits and misses)
    fetches: AtomicUsize,
}

impl MemoryObjectStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding the given objects
    pub fn from_objects(objects: impl IntoIterator<Item = SpeckleObject>) -> Self {
        let mut store = Self::new();
        for object in objects {
            store.insert(object);
        }
        store
    }

    /// Parse a JSON array of objects into a store
    pub fn from_json(json: &str) -> Result<Self> {
        let objects: Vec<SpeckleObject> = serde_json::from_str(json)?;
        Ok(Self::from_objects(objects))
    }

    /// Add an object; an object with an id already held replaces it
    pub fn insert(&mut self, object: SpeckleObject) {
        let existing = object.id().and_then(|id| self.index.get(id).copied());
        match existing {
            Some(pos) => self.objects[pos] = object,
            None => {
                if let Some(id) = object.id() {
                    self.index.insert(id.to_string(), self.objects.len());
                }
                self.objects.push(object);
            }
        }
    }

    /// Look up an object without counting it as a fetch
    pub fn get(&self, id: &str) -> Option<&SpeckleObject> {
        self.index.get(id).map(|&pos| &self.objects[pos])
    }

    /// Number of objects held
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Number of fetch calls served so far
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl ObjectFetcher for MemoryObjectStore {
    async fn fetch(&self, id: &str) -> Result<SpeckleObject> {
        self.fetches.fetch_add(1, Ordering::Relaxed);
        self.get(id)
            .cloned()
            .ok_or_else(|| ObjectError::not_found(id))
    }
}

impl ObjectSource for MemoryObjectStore {
    fn stream(&self) -> ObjectStream<'_> {
        stream::iter(self.objects.iter().cloned().map(Ok)).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::TryStreamExt;

    const MODEL: &str = r#"[
        {"id": "root", "speckle_type": "Base", "elements": [{"referencedId": "w1"}]},
        {"id": "w1", "speckle_type": "Objects.BuiltElements.Wall"},
        {"speckle_type": "Anonymous"}
    ]"#;

    #[tokio::test]
    async fn test_fetch_hit_and_miss() {
        let store = MemoryObjectStore::from_json(MODEL).unwrap();

        let wall = store.fetch("w1").await.unwrap();
        assert_eq!(wall.speckle_type(), "Objects.BuiltElements.Wall");

        let err = store.fetch("nope").await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(store.fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_stream_yields_insertion_order() {
        let store = MemoryObjectStore::from_json(MODEL).unwrap();
        let streamed: Vec<SpeckleObject> = store.stream().try_collect().await.unwrap();
        assert_eq!(streamed.len(), 3);
        assert_eq!(streamed[0].id(), Some("root"));
        assert_eq!(streamed[2].id(), None);
    }

    #[test]
    fn test_insert_replaces_same_id() {
        let mut store = MemoryObjectStore::from_json(MODEL).unwrap();
        let replacement: SpeckleObject =
            serde_json::from_str(r#"{"id": "w1", "speckle_type": "Objects.BuiltElements.Column"}"#)
                .unwrap();
        store.insert(replacement);
        assert_eq!(store.len(), 3);
        assert_eq!(store.get("w1").unwrap().speckle_type(), "Objects.BuiltElements.Column");
    }

    #[test]
    fn test_from_json_rejects_non_arrays() {
        assert!(MemoryObjectStore::from_json(r#"{"id": "x"}"#).is_err());
    }
}
