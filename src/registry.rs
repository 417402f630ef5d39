//! Address-keyed lookup maps rebuilt wholesale from fetched collections.
//!
//! A registry answers membership queries ("is this address followed")
//! against the most recent server-confirmed collection. It is rebuilt,
//! never merged: readers see either the old complete map or the new
//! complete map.

use std::collections::HashMap;

use crate::models::{Entity, Hotspot, Validator, Witness};

/// Anything addressable enough to key a registry.
pub trait Keyed {
    fn address(&self) -> &str;
}

impl Keyed for Hotspot {
    fn address(&self) -> &str {
        &self.address
    }
}

impl Keyed for Witness {
    fn address(&self) -> &str {
        &self.address
    }
}

impl Keyed for Validator {
    fn address(&self) -> &str {
        &self.address
    }
}

impl Keyed for Entity {
    fn address(&self) -> &str {
        Entity::address(self)
    }
}

/// An address -> entity map for one collection.
#[derive(Debug)]
pub struct EntityRegistry<T> {
    by_address: HashMap<String, T>,
}

impl<T> Default for EntityRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> EntityRegistry<T> {
    pub fn new() -> Self {
        Self {
            by_address: HashMap::new(),
        }
    }

    pub fn contains(&self, address: &str) -> bool {
        self.by_address.contains_key(address)
    }

    pub fn get(&self, address: &str) -> Option<&T> {
        self.by_address.get(address)
    }

    pub fn len(&self) -> usize {
        self.by_address.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_address.is_empty()
    }

    pub fn clear(&mut self) {
        self.by_address.clear();
    }
}

impl<T: Keyed + Clone> EntityRegistry<T> {
    /// Replace the whole map from a freshly fetched collection. The
    /// replacement is built completely before the single assignment swaps
    /// it in, so no reader can observe a mix of generations.
    pub fn rebuild(&mut self, list: &[T]) {
        let next: HashMap<String, T> = list
            .iter()
            .map(|e| (e.address().to_owned(), e.clone()))
            .collect();
        self.by_address = next;
    }
}

// ============================================================================
// Tests
// ============================================================================
