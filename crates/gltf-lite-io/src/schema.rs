// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Schema-validation boundary
//!
//! JSON-schema structural validation is an external collaborator: the
//! deserializer hands it the parsed document JSON and a set of disable flags
//! and only consumes the resulting ok/violation outcome.

use gltf_lite_model::Result;
use serde_json::Value;

/// Per-entity-kind validation disable flags
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct SchemaFlags(u32);

impl SchemaFlags {
    pub const NONE: SchemaFlags = SchemaFlags(0);
    pub const DISABLE_ACCESSORS: SchemaFlags = SchemaFlags(1 << 0);
    pub const DISABLE_ANIMATIONS: SchemaFlags = SchemaFlags(1 << 1);
    pub const DISABLE_BUFFERS: SchemaFlags = SchemaFlags(1 << 2);
    pub const DISABLE_BUFFER_VIEWS: SchemaFlags = SchemaFlags(1 << 3);
    pub const DISABLE_CAMERAS: SchemaFlags = SchemaFlags(1 << 4);
    pub const DISABLE_IMAGES: SchemaFlags = SchemaFlags(1 << 5);
    pub const DISABLE_MATERIALS: SchemaFlags = SchemaFlags(1 << 6);
    pub const DISABLE_MESHES: SchemaFlags = SchemaFlags(1 << 7);
    pub const DISABLE_NODES: SchemaFlags = SchemaFlags(1 << 8);
    pub const DISABLE_SAMPLERS: SchemaFlags = SchemaFlags(1 << 9);
    pub const DISABLE_SCENES: SchemaFlags = SchemaFlags(1 << 10);
    pub const DISABLE_SKINS: SchemaFlags = SchemaFlags(1 << 11);
    pub const DISABLE_TEXTURES: SchemaFlags = SchemaFlags(1 << 12);
    pub const ALL: SchemaFlags = SchemaFlags((1 << 13) - 1);

    pub fn contains(self, other: SchemaFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for SchemaFlags {
    type Output = SchemaFlags;

    fn bitor(self, rhs: SchemaFlags) -> SchemaFlags {
        SchemaFlags(self.0 | rhs.0)
    }
}

/// External schema validation service
///
/// A violation surfaces as [`gltf_lite_model::GltfError::Schema`] carrying
/// the document pointer and the violated keyword.
pub trait SchemaValidator {
    fn validate(&self, document: &Value, disabled: SchemaFlags) -> Result<()>;
}
