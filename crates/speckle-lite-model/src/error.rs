// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for object fetching and ingestion

use thiserror::Error;

/// Result type alias for object operations
pub type Result<T> = std::result::Result<T, ObjectError>;

/// Errors that can occur while fetching or ingesting Speckle objects
#[derive(Error, Debug)]
pub enum ObjectError {
    /// Object does not exist in the backing store
    #[error("Object {0} not found")]
    NotFound(String),

    /// Transport or storage failure while fetching an object
    #[error("Failed to fetch object {id}: {message}")]
    Fetch { id: String, message: String },

    /// Bulk object stream failed mid-download
    #[error("Object stream failed: {0}")]
    Stream(String),

    /// A value that is not a JSON mapping was offered as an object
    #[error("Invalid object: {0}")]
    InvalidObject(String),

    /// JSON decoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl ObjectError {
    /// Create a new not-found error
    pub fn not_found(id: impl Into<String>) -> Self {
        ObjectError::NotFound(id.into())
    }

    /// Create a new fetch error
    pub fn fetch(id: impl Into<String>, msg: impl Into<String>) -> Self {
        ObjectError::Fetch {
            id: id.into(),
            message: msg.into(),
        }
    }

    /// Create a new stream error
    pub fn stream(msg: impl Into<String>) -> Self {
        ObjectError::Stream(msg.into())
    }

    /// Create a generic error
    pub fn other(msg: impl Into<String>) -> Self {
        ObjectError::Other(msg.into())
    }

    /// Whether the error means the object is absent rather than unreachable
    pub fn is_not_found(&self) -> bool {
        matches!(self, ObjectError::NotFound(_))
    }
}
