// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end pipeline: download → resolve → filter → flatten

use crate::download::Downloader;
use crate::filter::ObjectFilter;
use crate::flatten::PropertyFlattener;
use crate::resolver::{ReferenceResolver, DEFAULT_CONCURRENCY};
use log::debug;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use speckle_lite_model::fields::{
    DOWNLOAD_STRIPPED_FIELDS, EXCLUDED_PROPERTY_PATHS, FILTER_STRIPPED_FIELDS,
    MAX_RESOLVE_ITERATIONS,
};
use speckle_lite_model::{
    FlattenedRecord, ObjectFetcher, ObjectSource, ResolutionReport, Result, SpeckleObject,
};

/// Pipeline settings, loadable from JSON by an orchestration layer
///
/// Missing keys take their defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Whether to fetch missing referenced objects at all
    pub resolve_references: bool,
    /// Reference resolution pass cap
    pub max_iterations: usize,
    /// Concurrent fetches per resolution pass
    pub concurrency: usize,
    /// Fields removed from each downloaded or fetched object
    pub download_stripped_fields: Vec<String>,
    /// Fields removed by the object filter
    pub filter_stripped_fields: Vec<String>,
    /// Property path substrings excluded from flattening
    pub excluded_property_paths: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let owned = |list: &[&str]| -> Vec<String> { list.iter().map(|s| s.to_string()).collect() };
        Self {
            resolve_references: true,
            max_iterations: MAX_RESOLVE_ITERATIONS,
            concurrency: DEFAULT_CONCURRENCY,
            download_stripped_fields: owned(DOWNLOAD_STRIPPED_FIELDS),
            filter_stripped_fields: owned(FILTER_STRIPPED_FIELDS),
            excluded_property_paths: owned(EXCLUDED_PROPERTY_PATHS),
        }
    }
}

/// One selected object with its flattened properties
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlattenedObject {
    /// Object id, if the object carried one
    pub id: Option<String>,
    /// Object type tag (empty when absent)
    pub speckle_type: String,
    /// Flattened `properties`
    pub fields: FlattenedRecord,
}

/// Result of a pipeline run
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PipelineOutput {
    /// Selected objects, flattened, in working-set order
    pub objects: Vec<FlattenedObject>,
    /// Reference resolution summary, when resolution ran
    pub resolution: Option<ResolutionReport>,
}

impl PipelineOutput {
    /// Column headers covering every flattened record
    pub fn columns(&self) -> Vec<String> {
        column_names(self.objects.iter().map(|o| &o.fields))
    }
}

/// The three transformation stages chained together
#[derive(Clone, Debug)]
pub struct ModelPipeline {
    /// Bulk download stage
    pub downloader: Downloader,
    /// Reference resolution stage
    pub resolver: ReferenceResolver,
    /// Object selection stage
    pub filter: ObjectFilter,
    /// Per-object property flattening stage
    pub flattener: PropertyFlattener,
    /// Skip reference resolution when false
    pub resolve_references: bool,
}

impl ModelPipeline {
    /// Create a pipeline with default settings
    pub fn new() -> Self {
        Self::from_config(&PipelineConfig::default())
    }

    /// Create a pipeline from settings
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            downloader: Downloader::new()
                .with_stripped_fields(config.download_stripped_fields.iter().cloned()),
            resolver: ReferenceResolver::new()
                .with_max_iterations(config.max_iterations)
                .with_concurrency(config.concurrency),
            filter: ObjectFilter::new()
                .with_stripped_fields(config.filter_stripped_fields.iter().cloned()),
            flattener: PropertyFlattener::new()
                .with_excluded_paths(config.excluded_property_paths.iter().cloned()),
            resolve_references: config.resolve_references,
        }
    }

    /// Set whether reference resolution runs
    pub fn with_reference_resolution(mut self, enabled: bool) -> Self {
        self.resolve_references = enabled;
        self
    }

    /// Download a model from `source`, then process it
    pub async fn run(
        &self,
        source: &dyn ObjectSource,
        fetcher: &dyn ObjectFetcher,
    ) -> Result<PipelineOutput> {
        let objects = self.downloader.collect(source).await?;
        Ok(self.process(objects, fetcher).await)
    }

    /// Resolve, filter and flatten an already-downloaded working set
    pub async fn process(
        &self,
        mut objects: Vec<SpeckleObject>,
        fetcher: &dyn ObjectFetcher,
    ) -> PipelineOutput {
        let resolution = if self.resolve_references {
            let initial = objects.len();
            let report = self.resolver.resolve(&mut objects, fetcher).await;
            // Fetched objects arrive raw
            for object in &mut objects[initial..] {
                *object = self.downloader.strip(object);
            }
            Some(report)
        } else {
            None
        };

        let selected = self.filter.filter(&objects);
        debug!(
            "Pipeline selected {} of {} objects for flattening",
            selected.len(),
            objects.len()
        );

        PipelineOutput {
            objects: self.flatten_all(&selected),
            resolution,
        }
    }

    /// Flatten each object independently
    pub fn flatten_all(&self, objects: &[SpeckleObject]) -> Vec<FlattenedObject> {
        objects
            .iter()
            .map(|object| FlattenedObject {
                id: object.id().map(str::to_string),
                speckle_type: object.speckle_type().to_string(),
                fields: self.flattener.flatten_object(object),
            })
            .collect()
    }
}

impl Default for ModelPipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Union of record keys in first-seen order
///
/// Suitable as a CSV or spreadsheet header row.
pub fn column_names<'a>(records: impl IntoIterator<Item = &'a FlattenedRecord>) -> Vec<String> {
    let mut seen: FxHashSet<&str> = FxHashSet::default();
    let mut columns = Vec::new();
    for record in records {
        for key in record.keys() {
            if seen.insert(key) {
                columns.push(key.to_string());
            }
        }
    }
    columns
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryObjectStore;
    use serde_json::{json, Value};

    fn object(value: Value) -> SpeckleObject {
        SpeckleObject::try_from(value).unwrap()
    }

    fn model() -> MemoryObjectStore {
        MemoryObjectStore::from_objects(vec![
            object(json!({
                "id": "root",
                "speckle_type": "Speckle.Core.Models.Collection",
                "elements": [{ "referencedId": "wall" }, { "referencedId": "door" }]
            })),
            object(json!({
                "id": "wall",
                "speckle_type": "Objects.Data.DataObject",
                "displayValue": [{ "referencedId": "mesh" }],
                "properties": {
                    "Parameters": {
                        "Instance Parameters": {
                            "Dimensions": { "Volume": { "name": "volume", "value": 1.5 } }
                        },
                        "Type Parameters": {
                            "Structure": { "Width": { "name": "Width", "value": 200 } }
                        }
                    },
                    "Material Quantities": { "Concrete": { "volume": 1.5 } }
                }
            })),
            object(json!({
                "id": "mesh",
                "speckle_type": "Objects.Geometry.Mesh",
                "vertices": [0.0, 0.0, 0.0]
            })),
        ])
    }

    #[tokio::test]
    async fn test_run_selects_and_flattens_data_objects() {
        let source = model();
        let fetcher = MemoryObjectStore::from_objects(vec![object(json!({
            "id": "door",
            "speckle_type": "Objects.Data.DataObject",
            "__closure": { "x": 1 },
            "vertices": [1.0],
            "properties": { "Mark": "D1", "Levels": ["L1", "L2"] }
        }))]);

        let output = ModelPipeline::new().run(&source, &fetcher).await.unwrap();

        let resolution = output.resolution.as_ref().unwrap();
        assert!(resolution.is_resolved());
        assert_eq!(resolution.fetched, vec!["door"]);

        let ids: Vec<_> = output.objects.iter().map(|o| o.id.as_deref().unwrap()).collect();
        assert_eq!(ids, vec!["wall", "door"]);
        assert_eq!(output.objects[0].fields.keys().collect::<Vec<_>>(), vec!["volume"]);
        assert_eq!(output.objects[1].fields.get("Levels"), Some(&json!(["L1", "L2"])));
        assert_eq!(output.columns(), vec!["volume", "Mark", "Levels"]);
    }

    #[tokio::test]
    async fn test_resolution_can_be_disabled() {
        let source = model();
        let fetcher = MemoryObjectStore::new();

        let output = ModelPipeline::new()
            .with_reference_resolution(false)
            .run(&source, &fetcher)
            .await
            .unwrap();

        assert!(output.resolution.is_none());
        assert_eq!(fetcher.fetch_count(), 0);
        assert_eq!(output.objects.len(), 1);
    }

    #[tokio::test]
    async fn test_fallback_mode_flattens_everything_non_technical() {
        let fetcher = MemoryObjectStore::new();
        let objects = vec![
            object(json!({ "id": "w", "speckle_type": "Objects.BuiltElements.Wall", "properties": { "h": 3 } })),
            object(json!({ "id": "c", "speckle_type": "Speckle.Core.Models.DataChunk", "data": [1, 2] })),
            object(json!({ "id": "n", "speckle_type": "Objects.Other.Note" })),
        ];

        let output = ModelPipeline::new().process(objects, &fetcher).await;

        let ids: Vec<_> = output.objects.iter().map(|o| o.id.as_deref().unwrap()).collect();
        assert_eq!(ids, vec!["w", "n"]);
        assert_eq!(output.objects[0].fields.keys().collect::<Vec<_>>(), vec!["h"]);
        // Without `properties` the object itself is flattened
        assert_eq!(output.objects[1].fields.get("id"), Some(&json!("n")));
    }

    #[test]
    fn test_config_defaults_and_partial_json() {
        let config: PipelineConfig = serde_json::from_str(r#"{ "max_iterations": 3 }"#).unwrap();
        assert_eq!(config.max_iterations, 3);
        assert!(config.resolve_references);
        assert_eq!(config.concurrency, DEFAULT_CONCURRENCY);
        assert_eq!(config.filter_stripped_fields.len(), FILTER_STRIPPED_FIELDS.len());

        let pipeline = ModelPipeline::from_config(&config);
        assert_eq!(pipeline.resolver.max_iterations, 3);
    }

    #[test]
    fn test_column_names_first_seen_order() {
        let a: FlattenedRecord = [("x".to_string(), json!(1)), ("y".to_string(), json!(2))]
            .into_iter()
            .collect();
        let b: FlattenedRecord = [("z".to_string(), json!(3)), ("x".to_string(), json!(4))]
            .into_iter()
            .collect();
        assert_eq!(column_names([&a, &b]), vec!["x", "y", "z"]);
    }
}
