// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Speckle-Lite Transform - From raw object graphs to tabular records
//!
//! This crate implements the transformation pipeline over the types defined
//! in `speckle-lite-model`:
//!
//! - **Reference resolution** - complete a partially-fetched graph by
//!   fetching referenced-but-missing objects, in capped passes
//! - **Object filtering** - strip bookkeeping fields and keep the objects
//!   that carry user-meaningful data
//! - **Property flattening** - collapse nested `properties` into one
//!   single-level record per object, with deterministic collision handling
//!
//! # Example
//!
//! ```ignore
//! use speckle_lite_transform::{filter_objects, flatten_object, resolve_references};
//!
//! let mut objects = downloaded_objects();
//! let report = resolve_references(&mut objects, &fetcher).await;
//! for object in filter_objects(&objects) {
//!     let record = flatten_object(&object);
//!     println!("{}: {} fields", object.speckle_type(), record.len());
//! }
//! ```

mod download;
mod filter;
mod flatten;
mod pipeline;
mod resolver;
mod store;

pub use download::Downloader;
pub use filter::{is_data_object, is_technical, FilterMode, ObjectFilter};
pub use flatten::{resolve_field_name, PropertyFlattener};
pub use pipeline::{column_names, FlattenedObject, ModelPipeline, PipelineConfig, PipelineOutput};
pub use resolver::{missing_references, referenced_ids, ReferenceResolver, DEFAULT_CONCURRENCY};
pub use store::MemoryObjectStore;

use serde_json::Value;
use speckle_lite_model::{FlattenedRecord, ObjectFetcher, ResolutionReport, SpeckleObject};

/// Resolve references in place with default settings
pub async fn resolve_references(
    objects: &mut Vec<SpeckleObject>,
    fetcher: &dyn ObjectFetcher,
) -> ResolutionReport {
    ReferenceResolver::new().resolve(objects, fetcher).await
}

/// Clean and select objects with default settings
pub fn filter_objects(objects: &[SpeckleObject]) -> Vec<SpeckleObject> {
    ObjectFilter::new().filter(objects)
}

/// Flatten a JSON value's properties with default settings
pub fn flatten_properties(input: &Value) -> FlattenedRecord {
    PropertyFlattener::new().flatten(input)
}

/// Flatten an object's properties with default settings
pub fn flatten_object(object: &SpeckleObject) -> FlattenedRecord {
    PropertyFlattener::new().flatten_object(object)
}
