// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Stream-handle caches
//!
//! Resource I/O is streamed rather than buffered wholesale, so open handles
//! are memoized per logical resource name. Handles are owned exclusively by
//! the cache for its lifetime; callers only ever borrow them.

use std::collections::VecDeque;

use gltf_lite_model::{GltfError, Result};
use rustc_hash::FxHashMap;

/// Resolver turning a logical resource name into an open stream
pub type StreamResolver<S> = Box<dyn FnMut(&str) -> Result<S>>;

/// Unbounded memoizing stream cache
pub struct StreamCache<S> {
    open: StreamResolver<S>,
    streams: FxHashMap<String, S>,
}

impl<S> StreamCache<S> {
    /// Create a cache over a resolver function
    pub fn new(open: impl FnMut(&str) -> Result<S> + 'static) -> Self {
        Self {
            open: Box::new(open),
            streams: FxHashMap::default(),
        }
    }

    /// Get the stream for a name, opening and memoizing it on first use
    pub fn get(&mut self, name: &str) -> Result<&mut S> {
        if !self.streams.contains_key(name) {
            let stream = (self.open)(name)?;
            self.streams.insert(name.to_string(), stream);
        }
        Ok(self.streams.get_mut(name).unwrap())
    }

    /// Insert or overwrite the stream for a name
    pub fn set(&mut self, name: impl Into<String>, stream: S) {
        self.streams.insert(name.into(), stream);
    }

    /// Check whether a name is currently cached
    pub fn has(&self, name: &str) -> bool {
        self.streams.contains_key(name)
    }

    /// Number of cached handles
    pub fn len(&self) -> usize {
        self.streams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }
}

/// Bounded stream cache with least-recently-used eviction
pub struct StreamCacheLru<S> {
    open: StreamResolver<S>,
    streams: FxHashMap<String, S>,
    /// Recency list, least-recently-used at the front
    order: VecDeque<String>,
    capacity: usize,
}

impl<S> StreamCacheLru<S> {
    /// Create a bounded cache; zero capacity is a configuration error
    pub fn new(capacity: usize, open: impl FnMut(&str) -> Result<S> + 'static) -> Result<Self> {
        if capacity == 0 {
            return Err(GltfError::usage("LRU stream cache capacity must be > 0"));
        }
        Ok(Self {
            open: Box::new(open),
            streams: FxHashMap::default(),
            order: VecDeque::new(),
            capacity,
        })
    }

    /// Get the stream for a name, promoting it to most-recently-used
    ///
    /// On a miss the stream is opened through the resolver; the
    /// least-recently-used handle is evicted first if the cache is full.
    pub fn get(&mut self, name: &str) -> Result<&mut S> {
        if self.streams.contains_key(name) {
            self.promote(name);
        } else {
            let stream = (self.open)(name)?;
            self.insert(name.to_string(), stream);
        }
        Ok(self.streams.get_mut(name).unwrap())
    }

    /// Insert or overwrite the stream for a name (counts as a use)
    pub fn set(&mut self, name: impl Into<String>, stream: S) {
        let name = name.into();
        if self.streams.contains_key(&name) {
            self.streams.insert(name.clone(), stream);
            self.promote(&name);
        } else {
            self.insert(name, stream);
        }
    }

    pub fn has(&self, name: &str) -> bool {
        self.streams.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.streams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn insert(&mut self, name: String, stream: S) {
        if self.streams.len() >= self.capacity {
            if let Some(evicted) = self.order.pop_front() {
                log::debug!("evicting stream handle '{evicted}'");
                self.streams.remove(&evicted);
            }
        }
        self.order.push_back(name.clone());
        self.streams.insert(name, stream);
    }

    fn promote(&mut self, name: &str) {
        if let Some(pos) = self.order.iter().position(|n| n == name) {
            let entry = self.order.remove(pos).unwrap();
            self.order.push_back(entry);
        }
    }
}
