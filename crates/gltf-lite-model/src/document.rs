// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The aggregate document root
//!
//! One [`EntityStore`] per entity kind, asset metadata, extension-usage
//! bookkeeping and the default-scene selection. Default-scene resolution is
//! lazy: the id is checked on access, not when it is set.

use std::collections::BTreeSet;

use crate::{
    Accessor, Animation, AppendPolicy, Asset, Buffer, BufferView, Camera, ExtensionSet, Image,
    Material, Mesh, Node, Result, Sampler, Scene, Skin, Texture,
};
use crate::store::{Entity, EntityStore};

/// A complete glTF document graph
#[derive(Clone, PartialEq, Debug)]
pub struct Document {
    pub asset: Asset,

    pub accessors: EntityStore<Accessor>,
    pub animations: EntityStore<Animation>,
    pub buffers: EntityStore<Buffer>,
    pub buffer_views: EntityStore<BufferView>,
    pub cameras: EntityStore<Camera>,
    pub images: EntityStore<Image>,
    pub materials: EntityStore<Material>,
    pub meshes: EntityStore<Mesh>,
    pub nodes: EntityStore<Node>,
    pub samplers: EntityStore<Sampler>,
    pub scenes: EntityStore<Scene>,
    pub skins: EntityStore<Skin>,
    pub textures: EntityStore<Texture>,

    /// Names of extensions present anywhere in the document
    pub extensions_used: BTreeSet<String>,
    /// Names of extensions a loader must understand
    pub extensions_required: BTreeSet<String>,

    default_scene_id: Option<String>,

    pub extensions: ExtensionSet,
    pub extras: Option<String>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document with a "2.0" asset record
    pub fn new() -> Self {
        Self {
            asset: Asset::default(),
            accessors: EntityStore::new("accessors"),
            animations: EntityStore::new("animations"),
            buffers: EntityStore::new("buffers"),
            buffer_views: EntityStore::new("bufferViews"),
            cameras: EntityStore::new("cameras"),
            images: EntityStore::new("images"),
            materials: EntityStore::new("materials"),
            meshes: EntityStore::new("meshes"),
            nodes: EntityStore::new("nodes"),
            samplers: EntityStore::new("samplers"),
            scenes: EntityStore::new("scenes"),
            skins: EntityStore::new("skins"),
            textures: EntityStore::new("textures"),
            extensions_used: BTreeSet::new(),
            extensions_required: BTreeSet::new(),
            default_scene_id: None,
            extensions: ExtensionSet::new(),
            extras: None,
        }
    }

    /// Check whether an extension name is recorded as used
    pub fn is_extension_used(&self, name: &str) -> bool {
        self.extensions_used.contains(name)
    }

    /// Check whether an extension name is recorded as required
    pub fn is_extension_required(&self, name: &str) -> bool {
        self.extensions_required.contains(name)
    }

    /// Id of the default scene, if one has been selected
    pub fn default_scene_id(&self) -> Option<&str> {
        self.default_scene_id.as_deref()
    }

    /// Whether a default scene can be resolved right now
    pub fn has_default_scene(&self) -> bool {
        match &self.default_scene_id {
            Some(id) => self.scenes.has(id),
            None => !self.scenes.is_empty(),
        }
    }

    /// Resolve the default scene
    ///
    /// If an id is set it must resolve in the scenes store; otherwise the
    /// first scene is the default; an empty scenes store is an error.
    pub fn default_scene(&self) -> Result<&Scene> {
        match &self.default_scene_id {
            Some(id) => self.scenes.get(id),
            None => self
                .scenes
                .front()
                .ok_or_else(|| crate::GltfError::not_found("scenes", "<default>")),
        }
    }

    /// Append a scene and record its assigned id as the default
    pub fn set_default_scene(&mut self, scene: Scene, policy: AppendPolicy) -> Result<&Scene> {
        let stored = self.scenes.append(scene, policy)?;
        let id = stored.id().to_string();
        self.default_scene_id = Some(id);
        Ok(stored)
    }

    /// Select an already-appended scene id as the default (checked lazily)
    pub fn set_default_scene_id(&mut self, id: impl Into<String>) {
        self.default_scene_id = Some(id.into());
    }
}
