// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Well-known field names and type tags
//!
//! Speckle objects are open-ended mappings. These are the conventional keys
//! and `speckle_type` tags the transformation pipeline keys off.

/// Stable content-derived identifier of an object
pub const ID: &str = "id";

/// Namespaced type tag (e.g. `Objects.Other.RawEncoding`)
pub const SPECKLE_TYPE: &str = "speckle_type";

/// Forward pointer to another object's `id`, found at any nesting depth
pub const REFERENCED_ID: &str = "referencedId";

/// Nested payload subject to flattening
pub const PROPERTIES: &str = "properties";

/// Key of a name/value parameter's name
pub const NAME: &str = "name";

/// Key of a name/value parameter's value
pub const VALUE: &str = "value";

/// Output key used when a non-mapping value is flattened
pub const BARE_VALUE: &str = "Value";

/// Chunked binary payload type (exact match)
pub const DATA_CHUNK_TYPE: &str = "Speckle.Core.Models.DataChunk";

/// Raw encoding type (substring match)
pub const RAW_ENCODING_TYPE: &str = "Objects.Other.RawEncoding";

/// Marker for user-meaningful BIM entities (substring match)
pub const DATA_OBJECT_MARKER: &str = "DataObject";

/// Fields removed by the object filter's clean step
pub const FILTER_STRIPPED_FIELDS: &[&str] = &["__closure", "totalChildrenCount", "renderMaterialProxies"];

/// Heavyweight fields removed while bulk-downloading a model
pub const DOWNLOAD_STRIPPED_FIELDS: &[&str] = &[
    "vertices",
    "faces",
    "colors",
    "__closure",
    "encodedValue",
    "displayValue",
    "renderMaterialProxies",
    "instanceDefinitionProxies",
    "transform",
    "totalChildrenCount",
];

/// Property paths (substring match) that never contribute flattened fields
pub const EXCLUDED_PROPERTY_PATHS: &[&str] = &[
    "Composite Structure",
    "Material Quantities",
    "Parameters.Type Parameters.Structure",
];

/// Upper bound on reference resolution passes
pub const MAX_RESOLVE_ITERATIONS: usize = 10;
