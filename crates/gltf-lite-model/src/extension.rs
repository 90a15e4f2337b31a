// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pluggable extension capability model
//!
//! An extension is any value that can report structural equality and be
//! duplicated. Entities own extensions keyed by runtime type; the core never
//! needs to know concrete extension types, only this capability surface.

use std::any::{Any, TypeId};
use std::collections::BTreeMap;
use std::fmt;

/// Capability surface every attached extension must provide
///
/// Blanket-implemented for any `'static` type that is `Debug + Clone +
/// PartialEq`, so plain data structs plug in without boilerplate.
pub trait Extension: Any + fmt::Debug {
    /// Duplicate into a new owned instance
    fn clone_box(&self) -> Box<dyn Extension>;

    /// Structural equality against another extension instance
    ///
    /// False whenever the runtime types differ.
    fn eq_box(&self, other: &dyn Extension) -> bool;

    /// Dynamic view for downcasting
    fn as_any(&self) -> &dyn Any;
}

impl<T> Extension for T
where
    T: Any + fmt::Debug + Clone + PartialEq,
{
    fn clone_box(&self) -> Box<dyn Extension> {
        Box::new(self.clone())
    }

    fn eq_box(&self, other: &dyn Extension) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| self == other)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Serialized, not-yet-typed extension: registered name plus raw JSON text
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ExtensionPair {
    pub name: String,
    pub json: String,
}

/// Extensions owned by one entity
///
/// Typed extensions are keyed by their runtime type: attaching a second
/// instance of the same type replaces the first. Extensions whose name has no
/// registered deserializer survive round trips in the raw map untouched.
#[derive(Default)]
pub struct ExtensionSet {
    typed: Vec<Box<dyn Extension>>,
    /// Extension name -> raw JSON text, for unregistered extensions
    raw: BTreeMap<String, String>,
}

impl ExtensionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a typed extension, replacing any existing one of the same type
    pub fn attach<E: Extension>(&mut self, extension: E) {
        self.detach::<E>();
        self.typed.push(Box::new(extension));
    }

    /// Get a typed extension by type
    pub fn get<E: Extension>(&self) -> Option<&E> {
        self.typed
            .iter()
            .find_map(|ext| ext.as_any().downcast_ref::<E>())
    }

    /// Check whether a typed extension of the given type is attached
    pub fn has<E: Extension>(&self) -> bool {
        self.get::<E>().is_some()
    }

    /// Remove a typed extension by type; true if one was attached
    pub fn detach<E: Extension>(&mut self) -> bool {
        let target = TypeId::of::<E>();
        let before = self.typed.len();
        self.typed.retain(|ext| ext.as_any().type_id() != target);
        before != self.typed.len()
    }

    /// Iterate attached typed extensions
    pub fn iter_typed(&self) -> impl Iterator<Item = &dyn Extension> {
        self.typed.iter().map(|ext| ext.as_ref())
    }

    /// Attach an already-boxed extension, replacing any of the same type
    pub fn attach_box(&mut self, extension: Box<dyn Extension>) {
        let target = extension.as_any().type_id();
        self.typed.retain(|ext| ext.as_any().type_id() != target);
        self.typed.push(extension);
    }

    /// Attach a serialized-but-unregistered extension
    pub fn attach_raw(&mut self, pair: ExtensionPair) {
        self.raw.insert(pair.name, pair.json);
    }

    /// Raw (name -> JSON text) extensions
    pub fn raw(&self) -> &BTreeMap<String, String> {
        &self.raw
    }

    /// Total number of attached extensions, typed and raw
    pub fn len(&self) -> usize {
        self.typed.len() + self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.typed.is_empty() && self.raw.is_empty()
    }
}

impl Clone for ExtensionSet {
    fn clone(&self) -> Self {
        Self {
            typed: self.typed.iter().map(|ext| ext.clone_box()).collect(),
            raw: self.raw.clone(),
        }
    }
}

// Set semantics: attachment order is irrelevant. Each typed extension must
// have exactly one equal counterpart (types are unique keys, so matching by
// type then delegating equality suffices).
impl PartialEq for ExtensionSet {
    fn eq(&self, other: &Self) -> bool {
        if self.typed.len() != other.typed.len() || self.raw != other.raw {
            return false;
        }
        self.typed
            .iter()
            .all(|ext| other.typed.iter().any(|o| ext.eq_box(o.as_ref())))
    }
}

impl fmt::Debug for ExtensionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionSet")
            .field("typed", &self.typed)
            .field("raw", &self.raw.keys().collect::<Vec<_>>())
            .finish()
    }
}
