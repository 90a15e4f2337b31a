// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Extension handler registries
//!
//! Vendor extensions are serialized and deserialized through name-keyed,
//! type-keyed handler maps so the core never needs to know their concrete
//! types. Handlers may be registered against a specific owning property kind
//! or against the [`PropertyKind::All`] wildcard; dispatch tries the exact
//! pair first and falls back to the wildcard. Registration happens once at
//! startup; duplicate registrations are caller errors.

use std::any::TypeId;

use gltf_lite_model::{Extension, GltfError, Result};
use rustc_hash::FxHashMap;
use serde_json::Value;

/// Tag identifying the property type that owns an extension
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum PropertyKind {
    /// Wildcard: the handler applies to any owning property
    All,
    Document,
    Asset,
    Accessor,
    Animation,
    Buffer,
    BufferView,
    Camera,
    Image,
    Material,
    Mesh,
    MeshPrimitive,
    Node,
    Sampler,
    Scene,
    Skin,
    Texture,
}

type SerializeFn = Box<dyn Fn(&dyn Extension) -> Result<Value>>;
type DeserializeFn = Box<dyn Fn(&Value) -> Result<Box<dyn Extension>>>;

/// Registry mapping (extension type, owning property) to a serialize handler
#[derive(Default)]
pub struct ExtensionSerializer {
    handlers: FxHashMap<(TypeId, PropertyKind), SerializeFn>,
    /// Registered extension name per extension type
    names: FxHashMap<TypeId, String>,
    /// Guards against two types claiming one (name, owner) pair
    claimed: FxHashMap<(String, PropertyKind), TypeId>,
}

impl ExtensionSerializer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a serialize handler for extension type `E` owned by `kind`
    ///
    /// Fails if a handler already exists for that (type, owner) pair or if
    /// the (name, owner) pair is claimed by another type.
    pub fn add_handler<E: Extension>(
        &mut self,
        name: impl Into<String>,
        kind: PropertyKind,
        handler: impl Fn(&E) -> Result<Value> + 'static,
    ) -> Result<()> {
        let name = name.into();
        let type_key = (TypeId::of::<E>(), kind);
        if self.handlers.contains_key(&type_key) {
            return Err(GltfError::usage(format!(
                "Serialize handler already registered for extension '{name}' on {kind:?}"
            )));
        }
        let name_key = (name.clone(), kind);
        if self.claimed.contains_key(&name_key) {
            return Err(GltfError::usage(format!(
                "Extension name '{name}' already claimed for {kind:?}"
            )));
        }

        self.handlers.insert(
            type_key,
            Box::new(move |ext| {
                let typed = ext.as_any().downcast_ref::<E>().ok_or_else(|| {
                    GltfError::usage("Extension instance does not match registered type")
                })?;
                handler(typed)
            }),
        );
        self.names.insert(TypeId::of::<E>(), name.clone());
        self.claimed.insert(name_key, TypeId::of::<E>());
        Ok(())
    }

    /// Registered name of extension type `E`, if any
    pub fn name_of<E: Extension>(&self) -> Option<&str> {
        self.names.get(&TypeId::of::<E>()).map(String::as_str)
    }

    /// Check whether a handler exists for (type, owner), including wildcard
    pub fn has_handler(&self, ext: &dyn Extension, kind: PropertyKind) -> bool {
        let type_id = ext.as_any().type_id();
        self.handlers.contains_key(&(type_id, kind))
            || self.handlers.contains_key(&(type_id, PropertyKind::All))
    }

    /// Serialize an extension owned by a property of the given kind
    ///
    /// Returns the registered extension name and its JSON value.
    pub fn serialize(&self, ext: &dyn Extension, kind: PropertyKind) -> Result<(String, Value)> {
        let type_id = ext.as_any().type_id();
        let handler = self
            .handlers
            .get(&(type_id, kind))
            .or_else(|| self.handlers.get(&(type_id, PropertyKind::All)))
            .ok_or_else(|| {
                GltfError::usage(format!(
                    "No serialize handler registered for extension on {kind:?}"
                ))
            })?;

        let name = self
            .names
            .get(&type_id)
            .ok_or_else(|| GltfError::usage("Extension type has no registered name"))?;
        Ok((name.clone(), handler(ext)?))
    }
}

/// Registry mapping (extension name, owning property) to a deserialize handler
#[derive(Default)]
pub struct ExtensionDeserializer {
    handlers: FxHashMap<(String, PropertyKind), DeserializeFn>,
}

impl ExtensionDeserializer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a deserialize handler for an extension name owned by `kind`
    pub fn add_handler<E: Extension>(
        &mut self,
        name: impl Into<String>,
        kind: PropertyKind,
        handler: impl Fn(&Value) -> Result<E> + 'static,
    ) -> Result<()> {
        let key = (name.into(), kind);
        if self.handlers.contains_key(&key) {
            return Err(GltfError::usage(format!(
                "Deserialize handler already registered for extension '{}' on {kind:?}",
                key.0
            )));
        }
        self.handlers.insert(
            key,
            Box::new(move |value| handler(value).map(|ext| Box::new(ext) as Box<dyn Extension>)),
        );
        Ok(())
    }

    /// Check whether a handler exists for (name, owner), including wildcard
    pub fn has_handler(&self, name: &str, kind: PropertyKind) -> bool {
        self.handlers.contains_key(&(name.to_string(), kind))
            || self
                .handlers
                .contains_key(&(name.to_string(), PropertyKind::All))
    }

    /// Deserialize a named extension owned by a property of the given kind
    pub fn deserialize(
        &self,
        name: &str,
        kind: PropertyKind,
        value: &Value,
    ) -> Result<Box<dyn Extension>> {
        let handler = self
            .handlers
            .get(&(name.to_string(), kind))
            .or_else(|| self.handlers.get(&(name.to_string(), PropertyKind::All)))
            .ok_or_else(|| {
                GltfError::usage(format!(
                    "No deserialize handler registered for extension '{name}' on {kind:?}"
                ))
            })?;
        handler(value)
    }
}
