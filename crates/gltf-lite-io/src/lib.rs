// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! glTF-Lite IO - JSON and binary resource codec for glTF 2.0 documents
//!
//! This crate moves documents and their binary payloads between the in-memory
//! model of `gltf-lite-model` and the wire formats: glTF JSON text, external
//! `.bin` resources, `data:` URIs and the GLB container.
//!
//! # Features
//!
//! - **JSON codec** - serialize/deserialize documents, ids mapped to array
//!   indices on the wire
//! - **Resource streams** - cursor-tracked accessor payload reads and writes
//!   over pluggable seekable streams
//! - **GLB container** - chunked binary packaging with alignment padding
//! - **Buffer builder** - incremental buffer/view/accessor construction
//! - **Extension registries** - name- and type-keyed vendor extension codecs
//!
//! # Example
//!
//! ```ignore
//! use gltf_lite_io::{deserialize, serialize};
//!
//! let doc = deserialize(json_text)?;
//! let round_tripped = serialize(&doc)?;
//! ```

pub mod builder;
pub mod cache;
pub mod data_uri;
pub mod deserialize;
pub mod glb;
pub mod registry;
pub mod resource;
pub mod schema;
pub mod serialize;

pub use builder::{AccessorDesc, BufferBuilder};
pub use cache::{StreamCache, StreamCacheLru, StreamResolver};
pub use data_uri::{decode_data_uri, encode_data_uri, is_data_uri};
pub use deserialize::{deserialize, deserialize_with, DeserializeOptions};
pub use glb::{glb_length, write_glb, GlbReader, GLB_BUFFER_ID};
pub use registry::{ExtensionDeserializer, ExtensionSerializer, PropertyKind};
pub use resource::{
    AccessorElement, ReadSeek, ResourceReader, ResourceWriter, WriteSeek,
};
pub use schema::{SchemaFlags, SchemaValidator};
pub use serialize::{serialize, serialize_pretty, serialize_with, SerializeOptions};
