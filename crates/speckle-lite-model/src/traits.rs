// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Capability traits consumed by the transformation pipeline
//!
//! The pipeline never talks to a server itself. Transport layers implement
//! these traits and hand them in.

use crate::{Result, SpeckleObject};
use async_trait::async_trait;
use futures_core::Stream;
use std::pin::Pin;
use std::sync::Arc;

/// Boxed stream of objects as produced by a bulk download
pub type ObjectStream<'a> = Pin<Box<dyn Stream<Item = Result<SpeckleObject>> + Send + 'a>>;

/// Fetch a single object by id
///
/// Used by reference resolution to complete a partially-downloaded graph.
/// Implementations must be safe to call concurrently for different ids.
///
/// # Example
///
/// ```ignore
/// use speckle_lite_model::{ObjectError, ObjectFetcher, Result, SpeckleObject};
///
/// struct HttpFetcher { /* client, project, token */ }
///
/// #[async_trait::async_trait]
/// impl ObjectFetcher for HttpFetcher {
///     async fn fetch(&self, id: &str) -> Result<SpeckleObject> {
///         let body = self.get_object_json(id).await
///             .map_err(|e| ObjectError::fetch(id, e.to_string()))?;
///         Ok(serde_json::from_str(&body)?)
///     }
/// }
/// ```
#[async_trait]
pub trait ObjectFetcher: Send + Sync {
    /// Fetch the object with the given id
    ///
    /// # Returns
    /// The object on success, `ObjectError::NotFound` when the store has no
    /// such object, or another error for transport failures
    async fn fetch(&self, id: &str) -> Result<SpeckleObject>;
}

#[async_trait]
impl<T: ObjectFetcher + ?Sized> ObjectFetcher for Arc<T> {
    async fn fetch(&self, id: &str) -> Result<SpeckleObject> {
        (**self).fetch(id).await
    }
}

/// Stream every object of a model version
///
/// This is the bulk-download path that produces the initial working set
/// before references are resolved.
pub trait ObjectSource: Send + Sync {
    /// Start streaming objects
    fn stream(&self) -> ObjectStream<'_>;
}

impl<T: ObjectSource + ?Sized> ObjectSource for Arc<T> {
    fn stream(&self) -> ObjectStream<'_> {
        (**self).stream()
    }
}
