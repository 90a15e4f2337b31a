// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Ordered, uniquely-keyed entity storage
//!
//! Every entity collection in a document is an [`EntityStore`]: an insertion
//! ordered sequence plus an id -> position index. Ids are stable; positions
//! are not (removal renumbers positions of later elements).

use crate::{GltfError, Result};
use rustc_hash::FxHashMap;

/// Implemented by every record an [`EntityStore`] can hold
pub trait Entity: Clone + PartialEq {
    /// The entity's id, unique within its store
    fn id(&self) -> &str;

    /// Overwrite the entity's id (used by id generation on append)
    fn set_id(&mut self, id: String);
}

/// Policy applied when an element is appended with an empty id
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AppendPolicy {
    /// An empty id is a graph-integrity error
    ThrowOnEmpty,
    /// Assign the store's current size as the id, disambiguating on collision
    GenerateOnEmpty,
}

/// Ordered collection of entities with unique, non-empty string ids
#[derive(Clone, Debug)]
pub struct EntityStore<E: Entity> {
    elements: Vec<E>,
    /// Id -> position in `elements`
    index: FxHashMap<String, usize>,
    /// Store label used in error messages ("nodes", "accessors", ...)
    label: &'static str,
}

impl<E: Entity> EntityStore<E> {
    /// Create an empty store with the given label
    pub fn new(label: &'static str) -> Self {
        Self {
            elements: Vec::new(),
            index: FxHashMap::default(),
            label,
        }
    }

    /// Store label used in error messages
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Append an element, enforcing id uniqueness
    ///
    /// With [`AppendPolicy::GenerateOnEmpty`] an empty id is replaced by the
    /// current element count, with `'_'` appended until unique. A non-empty
    /// id that collides always fails.
    ///
    /// Returns a reference to the stored element, valid until the next
    /// structural mutation.
    pub fn append(&mut self, mut element: E, policy: AppendPolicy) -> Result<&E> {
        if element.id().is_empty() {
            match policy {
                AppendPolicy::ThrowOnEmpty => {
                    return Err(GltfError::EmptyId { store: self.label });
                }
                AppendPolicy::GenerateOnEmpty => {
                    let mut id = self.elements.len().to_string();
                    while self.index.contains_key(&id) {
                        id.push('_');
                    }
                    element.set_id(id);
                }
            }
        } else if self.index.contains_key(element.id()) {
            return Err(GltfError::DuplicateId {
                store: self.label,
                id: element.id().to_string(),
            });
        }

        self.index
            .insert(element.id().to_string(), self.elements.len());
        self.elements.push(element);
        Ok(self.elements.last().unwrap())
    }

    /// Get an element by id
    pub fn get(&self, id: &str) -> Result<&E> {
        self.index
            .get(id)
            .map(|&pos| &self.elements[pos])
            .ok_or_else(|| GltfError::not_found(self.label, id))
    }

    /// Get a mutable element by id
    pub fn get_mut(&mut self, id: &str) -> Result<&mut E> {
        match self.index.get(id) {
            Some(&pos) => Ok(&mut self.elements[pos]),
            None => Err(GltfError::not_found(self.label, id)),
        }
    }

    /// Get an element by position
    pub fn get_at(&self, position: usize) -> Result<&E> {
        self.elements
            .get(position)
            .ok_or_else(|| GltfError::not_found(self.label, position.to_string()))
    }

    /// Position of an id within the store
    pub fn position_of(&self, id: &str) -> Result<usize> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| GltfError::not_found(self.label, id))
    }

    /// Check whether an id exists
    pub fn has(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// First element in insertion order
    pub fn front(&self) -> Option<&E> {
        self.elements.first()
    }

    /// Remove an element by id, renumbering positions of later elements
    pub fn remove(&mut self, id: &str) -> Result<E> {
        let pos = self.position_of(id)?;
        self.index.remove(id);
        let removed = self.elements.remove(pos);
        for (i, element) in self.elements.iter().enumerate().skip(pos) {
            self.index.insert(element.id().to_string(), i);
        }
        Ok(removed)
    }

    /// Replace an element whose id must already exist, preserving position
    pub fn replace(&mut self, element: E) -> Result<&E> {
        let pos = self.position_of(element.id())?;
        self.elements[pos] = element;
        Ok(&self.elements[pos])
    }

    /// Iterate elements in insertion order
    pub fn iter(&self) -> std::slice::Iter<'_, E> {
        self.elements.iter()
    }

    /// Element count
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Check whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Remove all elements
    pub fn clear(&mut self) {
        self.elements.clear();
        self.index.clear();
    }

    /// Take all elements out of the store, leaving it empty
    pub fn drain(&mut self) -> Vec<E> {
        self.index.clear();
        std::mem::take(&mut self.elements)
    }
}

impl<'a, E: Entity> IntoIterator for &'a EntityStore<E> {
    type Item = &'a E;
    type IntoIter = std::slice::Iter<'a, E>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

// Order-sensitive: two stores are equal only as identical sequences.
impl<E: Entity> PartialEq for EntityStore<E> {
    fn eq(&self, other: &Self) -> bool {
        self.elements == other.elements
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, PartialEq, Debug, Default)]
    struct Probe {
        id: String,
        value: i32,
    }

    impl Probe {
        fn new(id: &str, value: i32) -> Self {
            Self {
                id: id.to_string(),
                value,
            }
        }
    }

    impl Entity for Probe {
        fn id(&self) -> &str {
            &self.id
        }

        fn set_id(&mut self, id: String) {
            self.id = id;
        }
    }

    #[test]
    fn test_append_and_get() {
        let mut store = EntityStore::new("probes");
        store
            .append(Probe::new("a", 1), AppendPolicy::ThrowOnEmpty)
            .unwrap();

        let got = store.get("a").unwrap();
        assert_eq!(got, &Probe::new("a", 1));
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut store = EntityStore::new("probes");
        store
            .append(Probe::new("a", 1), AppendPolicy::ThrowOnEmpty)
            .unwrap();

        let err = store
            .append(Probe::new("a", 2), AppendPolicy::GenerateOnEmpty)
            .unwrap_err();
        assert!(matches!(err, GltfError::DuplicateId { .. }));
    }

    #[test]
    fn test_empty_id_policies() {
        let mut store = EntityStore::new("probes");

        let err = store
            .append(Probe::new("", 1), AppendPolicy::ThrowOnEmpty)
            .unwrap_err();
        assert!(matches!(err, GltfError::EmptyId { .. }));

        let id = store
            .append(Probe::new("", 1), AppendPolicy::GenerateOnEmpty)
            .unwrap()
            .id
            .clone();
        assert_eq!(id, "0");

        let id = store
            .append(Probe::new("", 2), AppendPolicy::GenerateOnEmpty)
            .unwrap()
            .id
            .clone();
        assert_eq!(id, "1");
    }

    #[test]
    fn test_generated_id_disambiguation() {
        let mut store = EntityStore::new("probes");
        store
            .append(Probe::new("1", 1), AppendPolicy::ThrowOnEmpty)
            .unwrap();

        // Generated "1" collides with the explicit id, so the marker is
        // appended.
        let id = store
            .append(Probe::new("", 2), AppendPolicy::GenerateOnEmpty)
            .unwrap()
            .id
            .clone();
        assert_eq!(id, "1_");

        let id = store
            .append(Probe::new("", 3), AppendPolicy::GenerateOnEmpty)
            .unwrap()
            .id
            .clone();
        assert_eq!(id, "2");

        // Both "5" and "5_" are taken, so the marker repeats until unique.
        store
            .append(Probe::new("5", 4), AppendPolicy::ThrowOnEmpty)
            .unwrap();
        store
            .append(Probe::new("5_", 5), AppendPolicy::ThrowOnEmpty)
            .unwrap();
        let id = store
            .append(Probe::new("", 6), AppendPolicy::GenerateOnEmpty)
            .unwrap()
            .id
            .clone();
        assert_eq!(id, "5__");
    }

    #[test]
    fn test_remove_renumbers_positions() {
        let mut store = EntityStore::new("probes");
        for id in ["a", "b", "c"] {
            store
                .append(Probe::new(id, 0), AppendPolicy::ThrowOnEmpty)
                .unwrap();
        }

        store.remove("a").unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.position_of("b").unwrap(), 0);
        assert_eq!(store.position_of("c").unwrap(), 1);
        // Ids are stable even though positions moved.
        assert_eq!(store.get_at(0).unwrap().id, "b");
    }

    #[test]
    fn test_replace_requires_existing_id() {
        let mut store = EntityStore::new("probes");
        store
            .append(Probe::new("a", 1), AppendPolicy::ThrowOnEmpty)
            .unwrap();

        store.replace(Probe::new("a", 9)).unwrap();
        assert_eq!(store.get("a").unwrap().value, 9);
        assert_eq!(store.position_of("a").unwrap(), 0);

        assert!(store.replace(Probe::new("zzz", 1)).is_err());
    }

    #[test]
    fn test_store_equality_is_order_sensitive() {
        let mut left = EntityStore::new("probes");
        let mut right = EntityStore::new("probes");
        left.append(Probe::new("a", 1), AppendPolicy::ThrowOnEmpty)
            .unwrap();
        left.append(Probe::new("b", 2), AppendPolicy::ThrowOnEmpty)
            .unwrap();
        right
            .append(Probe::new("b", 2), AppendPolicy::ThrowOnEmpty)
            .unwrap();
        right
            .append(Probe::new("a", 1), AppendPolicy::ThrowOnEmpty)
            .unwrap();

        assert_ne!(left, right);
    }
}
