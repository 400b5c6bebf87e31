//! Item registry
//!
//! Maps item names to the body simulating them. Bodies themselves live in the
//! physics world; the registry only keeps handles. Iteration follows insertion
//! order, which is also the draw order: later entries paint over earlier ones.

use crate::item::Item;
use std::collections::{HashMap, HashSet};
use wall_physics::BodyHandle;
use wall_render::Sprite;

/// Registry record for one item on the wall
#[derive(Debug, Clone)]
pub struct RegistryEntry {
    pub item: Item,
    pub body: BodyHandle,
    /// Inertia to restore when rotation is unlocked
    pub saved_inertia: f32,
    pub sprite: Sprite,
}

/// Name-keyed registry, at most one entry per name
#[derive(Debug, Default)]
pub struct ItemRegistry {
    entries: HashMap<String, RegistryEntry>,
    /// Names in insertion order
    order: Vec<String>,
}

impl ItemRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace. A replaced entry keeps its place in the order.
    pub fn insert(&mut self, entry: RegistryEntry) -> Option<RegistryEntry> {
        let name = entry.item.name.clone();
        let previous = self.entries.insert(name.clone(), entry);
        if previous.is_none() {
            self.order.push(name);
        }
        previous
    }

    pub fn remove(&mut self, name: &str) -> Option<RegistryEntry> {
        let removed = self.entries.remove(name)?;
        self.order.retain(|n| n != name);
        Some(removed)
    }

    pub fn get(&self, name: &str) -> Option<&RegistryEntry> {
        self.entries.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut RegistryEntry> {
        self.entries.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Entries in insertion order
    pub fn entries(&self) -> impl Iterator<Item = &RegistryEntry> {
        self.order.iter().filter_map(|name| self.entries.get(name))
    }

    /// Name of the entry simulated by `body`
    pub fn name_of(&self, body: BodyHandle) -> Option<&str> {
        self.entries
            .values()
            .find(|entry| entry.body == body)
            .map(|entry| entry.item.name.as_str())
    }

    /// Registered names missing from `desired`
    pub fn stale_names(&self, desired: &[Item]) -> Vec<String> {
        let wanted: HashSet<&str> = desired.iter().map(|item| item.name.as_str()).collect();
        self.order
            .iter()
            .filter(|name| !wanted.contains(name.as_str()))
            .cloned()
            .collect()
    }

    /// Remove and return every entry, in insertion order
    pub fn drain(&mut self) -> Vec<RegistryEntry> {
        let mut entries = std::mem::take(&mut self.entries);
        self.order
            .drain(..)
            .filter_map(|name| entries.remove(&name))
            .collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }
}
