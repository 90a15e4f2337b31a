// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! glTF-Lite Model - Document graph and shared types for glTF 2.0 assets
//!
//! This crate holds the in-memory document model: an ordered, uniquely-keyed
//! [`EntityStore`] per entity kind, aggregated by [`Document`], plus the
//! pluggable [`Extension`] capability model and version negotiation. Entities
//! reference each other by id string; resolution is always an explicit store
//! lookup.
//!
//! Everything that touches JSON text or binary payloads lives in the
//! companion `gltf-lite-io` crate.
//!
//! # Example
//!
//! ```
//! use gltf_lite_model::{AppendPolicy, Document, Node, Scene};
//!
//! let mut doc = Document::new();
//! doc.nodes
//!     .append(Node { id: "root".into(), ..Default::default() }, AppendPolicy::ThrowOnEmpty)
//!     .unwrap();
//! doc.set_default_scene(
//!     Scene { node_ids: vec!["root".into()], ..Default::default() },
//!     AppendPolicy::GenerateOnEmpty,
//! )
//! .unwrap();
//! assert_eq!(doc.default_scene().unwrap().node_ids, ["root"]);
//! ```

pub mod document;
pub mod entities;
pub mod error;
pub mod extension;
pub mod store;
pub mod types;
pub mod version;

// Re-export all public types
pub use document::*;
pub use entities::*;
pub use error::*;
pub use extension::*;
pub use store::*;
pub use types::*;
pub use version::*;
