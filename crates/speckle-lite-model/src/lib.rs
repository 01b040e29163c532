// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Speckle-Lite Model - Shared types and trait seams for Speckle object graphs
//!
//! This crate provides the core abstractions for transforming the loosely-typed
//! object graphs produced by a Speckle object store into flat, tabular data.
//! Implementations of the traits live in `speckle-lite-transform`; transport
//! layers (HTTP, GraphQL, local caches) implement the fetch and stream seams.
//!
//! # Architecture
//!
//! - [`SpeckleObject`] - One node of the model graph (an ordered JSON mapping)
//! - [`FlattenedRecord`] - A single-level key/value map per object
//! - [`ObjectFetcher`] - Fetch one object by id (used for reference resolution)
//! - [`ObjectSource`] - Stream the initial working set (bulk download)
//! - [`ResolutionReport`] - Terminal state of a reference resolution run
//!
//! # Example
//!
//! ```ignore
//! use speckle_lite_model::{ObjectFetcher, SpeckleObject};
//!
//! async fn load_root(fetcher: &dyn ObjectFetcher) -> speckle_lite_model::Result<SpeckleObject> {
//!     let root = fetcher.fetch("a1b2c3").await?;
//!     println!("Root type: {}", root.speckle_type());
//!     Ok(root)
//! }
//! ```

pub mod error;
pub mod fields;
pub mod resolver;
pub mod traits;
pub mod types;

// Re-export all public types
pub use error::*;
pub use resolver::*;
pub use traits::*;
pub use types::*;
