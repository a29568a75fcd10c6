// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Backing store for an ordinary object's own properties, keeping the
//! canonical enumeration order from §4.1: integer-index keys ascending,
//! then string keys in insertion order, then symbol keys in insertion
//! order.

use super::property_key::PropertyKey;
use crate::ecmascript::types::spec::property_descriptor::PropertyDescriptor;
use crate::heap::Heap;
use ahash::AHashMap;

#[derive(Debug, Default, Clone)]
pub struct PropertyStorage {
    /// Keys in insertion order, split by kind at lookup time rather than
    /// stored in three buckets: integer-indices and string/symbol keys are
    /// interleaved here as inserted, and `keys_in_order` sorts them on read.
    order: Vec<PropertyKey>,
    map: AHashMap<PropertyKey, PropertyDescriptor>,
}

impl PropertyStorage {
    pub fn get(&self, key: &PropertyKey) -> Option<&PropertyDescriptor> {
        self.map.get(key)
    }

    pub fn get_mut(&mut self, key: &PropertyKey) -> Option<&mut PropertyDescriptor> {
        self.map.get_mut(key)
    }

    pub fn contains(&self, key: &PropertyKey) -> bool {
        self.map.contains_key(key)
    }

    /// Linear-scan lookup by property name text rather than by `PropertyKey`
    /// identity. Needed wherever a caller only has a borrowed `&str` and no
    /// `&mut Heap` to mint a matching `JsString` key with (see
    /// `operations_on_objects::has_property_by_str`) — O(own property count)
    /// instead of the map's O(1), but those call sites are never hot paths.
    pub fn get_by_str(&self, heap: &Heap, name: &str) -> Option<&PropertyDescriptor> {
        self.order.iter().find_map(|key| match key {
            PropertyKey::String(s) if s.as_str(heap) == name => self.map.get(key),
            _ => None,
        })
    }

    pub fn insert(&mut self, key: PropertyKey, desc: PropertyDescriptor) {
        if self.map.insert(key, desc).is_none() {
            self.order.push(key);
        }
    }

    pub fn remove(&mut self, key: &PropertyKey) {
        if self.map.remove(key).is_some() {
            self.order.retain(|k| k != key);
        }
    }

    /// ### [\[\[OwnPropertyKeys\]\]](https://tc39.es/ecma262/#sec-ordinary-object-internal-methods-and-internal-slots-ownpropertykeys)
    pub fn keys_in_order(&self, heap: &Heap) -> Vec<PropertyKey> {
        let mut indices: Vec<(u32, PropertyKey)> = Vec::new();
        let mut strings: Vec<PropertyKey> = Vec::new();
        let mut symbols: Vec<PropertyKey> = Vec::new();
        for key in &self.order {
            if let Some(index) = key.as_array_index(heap) {
                indices.push((index, *key));
            } else {
                match key {
                    PropertyKey::String(_) => strings.push(*key),
                    PropertyKey::Symbol(_) => symbols.push(*key),
                }
            }
        }
        indices.sort_by_key(|(index, _)| *index);
        indices
            .into_iter()
            .map(|(_, key)| key)
            .chain(strings)
            .chain(symbols)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
