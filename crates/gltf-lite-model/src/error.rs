// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for glTF document and resource operations

use thiserror::Error;

/// Result type alias for document operations
pub type Result<T> = std::result::Result<T, GltfError>;

/// Errors that can occur while building, reading or writing glTF documents
#[derive(Error, Debug)]
pub enum GltfError {
    /// The data violates the format's structural rules
    #[error("Format violation: {0}")]
    Format(String),

    /// An id collides with an existing element in a store
    #[error("Duplicate id '{id}' in {store}")]
    DuplicateId { store: &'static str, id: String },

    /// An element was appended without an id where one is required
    #[error("Empty id appended to {store}")]
    EmptyId { store: &'static str },

    /// A referenced id does not exist in its store
    #[error("Id '{id}' not found in {store}")]
    NotFound { store: &'static str, id: String },

    /// External schema validator rejected the document
    #[error("Schema violation at {pointer}: {keyword}")]
    Schema { pointer: String, keyword: String },

    /// Underlying stream read/write failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Operation invoked outside its valid state
    #[error("Usage error: {0}")]
    Usage(String),
}

impl GltfError {
    /// Create a new format violation error
    pub fn format(msg: impl Into<String>) -> Self {
        GltfError::Format(msg.into())
    }

    /// Create a new usage error
    pub fn usage(msg: impl Into<String>) -> Self {
        GltfError::Usage(msg.into())
    }

    /// Create a new not-found error
    pub fn not_found(store: &'static str, id: impl Into<String>) -> Self {
        GltfError::NotFound {
            store,
            id: id.into(),
        }
    }
}
