// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bulk download into the initial working set

use futures_util::StreamExt;
use log::debug;
use rustc_hash::FxHashSet;
use speckle_lite_model::fields::DOWNLOAD_STRIPPED_FIELDS;
use speckle_lite_model::{ObjectSource, Result, SpeckleObject};

/// Collects an object stream, dropping heavyweight geometry fields
#[derive(Clone, Debug)]
pub struct Downloader {
    /// Top-level fields removed from each object as it arrives
    pub stripped_fields: Vec<String>,
}

impl Downloader {
    /// Create a downloader with the default stripped fields
    pub fn new() -> Self {
        Self {
            stripped_fields: DOWNLOAD_STRIPPED_FIELDS
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

    /// Copy of an object without the stripped fields
    pub fn strip(&self, object: &SpeckleObject) -> SpeckleObject {
        object.without_fields(self.stripped_fields.as_slice())
    }

    /// Drain `source` into a vector, in stream order
    ///
    /// Later objects repeating an already-seen `id` are dropped; objects
    /// without an `id` are always kept. A stream error aborts the download
    /// and is returned as-is.
    pub async fn collect(&self, source: &dyn ObjectSource) -> Result<Vec<SpeckleObject>> {
        let mut stream = source.stream();
        let mut objects = Vec::new();
        let mut seen: FxHashSet<String> = FxHashSet::default();
        let mut duplicates = 0usize;

        while let Some(item) = stream.next().await {
            let object = item?;
            if let Some(id) = object.id() {
                if !seen.insert(id.to_string()) {
                    duplicates += 1;
                    continue;
                }
            }
            objects.push(self.strip(&object));
        }

        debug!(
            "Downloaded {} objects ({} duplicates dropped)",
            objects.len(),
            duplicates
        );
        Ok(objects)
    }
}

impl Default for Downloader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryObjectStore;
    use futures_util::stream;
    use serde_json::{json, Value};
    use speckle_lite_model::{ObjectError, ObjectStream};

    struct BrokenSource;

    impl ObjectSource for BrokenSource {
        fn stream(&self) -> ObjectStream<'_> {
            let first = SpeckleObject::try_from(json!({ "id": "a" }));
            stream::iter(vec![first, Err(ObjectError::stream("socket closed"))]).boxed()
        }
    }

    fn object(value: Value) -> SpeckleObject {
        SpeckleObject::try_from(value).unwrap()
    }

    #[tokio::test]
    async fn test_collect_strips_geometry() {
        let store = MemoryObjectStore::from_objects(vec![
            object(json!({
                "id": "mesh",
                "speckle_type": "Objects.Geometry.Mesh",
                "vertices": [0.0, 0.0, 0.0],
                "faces": [3, 0, 1, 2],
                "colors": [],
                "transform": [1, 0, 0, 1],
                "units": "m"
            })),
            object(json!({
                "id": "obj",
                "speckle_type": "Objects.Data.DataObject",
                "displayValue": [{ "referencedId": "mesh" }],
                "__closure": { "mesh": 1 },
                "properties": { "Height": 3 }
            })),
        ]);

        let objects = Downloader::new().collect(&store).await.unwrap();

        assert_eq!(objects.len(), 2);
        assert_eq!(objects[0].keys().collect::<Vec<_>>(), vec!["id", "speckle_type", "units"]);
        assert_eq!(objects[1].keys().collect::<Vec<_>>(), vec!["id", "speckle_type", "properties"]);
    }

    struct RepeatingSource;

    impl ObjectSource for RepeatingSource {
        fn stream(&self) -> ObjectStream<'_> {
            let items = vec![
                json!({ "id": "a", "speckle_type": "First" }),
                json!({ "speckle_type": "Anonymous" }),
                json!({ "id": "b" }),
                json!({ "id": "a", "speckle_type": "Second" }),
                json!({ "speckle_type": "Anonymous" }),
            ];
            stream::iter(items.into_iter().map(SpeckleObject::try_from)).boxed()
        }
    }

    #[tokio::test]
    async fn test_collect_drops_repeated_ids() {
        let objects = Downloader::new().collect(&RepeatingSource).await.unwrap();

        let types: Vec<_> = objects.iter().map(|o| o.speckle_type()).collect();
        assert_eq!(types, vec!["First", "Anonymous", "", "Anonymous"]);
        assert_eq!(objects.iter().filter(|o| o.id() == Some("a")).count(), 1);
    }

    #[tokio::test]
    async fn test_stream_error_aborts() {
        let err = Downloader::new().collect(&BrokenSource).await.unwrap_err();
        assert!(matches!(err, ObjectError::Stream(_)));
    }

    #[tokio::test]
    async fn test_custom_stripped_fields() {
        let store = MemoryObjectStore::from_objects(vec![object(json!({ "id": "a", "vertices": [], "secret": 1 }))]);
        let objects = Downloader::new()
            .with_stripped_fields(["secret"])
            .collect(&store)
            .await
            .unwrap();
        assert_eq!(objects[0].keys().collect::<Vec<_>>(), vec!["id", "vertices"]);
    }
}
