//! Roster state — insertion-ordered records plus identifier lookup.

use std::collections::HashMap;

use bazaar_core::{Entity, EntityId};

/// The local roster for one admin view: an insertion-ordered identifier
/// sequence paired with an identifier→record lookup.
///
/// Owned exclusively by one reconciler instance; created empty on mount,
/// dropped on unmount, never persisted. Invariants: no identifier appears
/// twice in the sequence, and every sequence entry has a lookup record.
#[derive(Debug, Clone)]
pub struct Roster<E> {
    order: Vec<EntityId>,
    records: HashMap<EntityId, E>,
}

impl<E> Default for Roster<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Roster<E> {
    pub fn new() -> Self {
        Self {
            order: Vec::new(),
            records: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, id: &EntityId) -> bool {
        self.records.contains_key(id)
    }

    pub fn get(&self, id: &EntityId) -> Option<&E> {
        self.records.get(id)
    }

    /// Identifiers in insertion order.
    pub fn ids(&self) -> &[EntityId] {
        &self.order
    }

    /// Records in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &E> {
        self.order.iter().filter_map(|id| self.records.get(id))
    }

    pub fn remove(&mut self, id: &EntityId) -> Option<E> {
        let removed = self.records.remove(id)?;
        self.order.retain(|existing| existing != id);
        Some(removed)
    }
}

impl<E: Entity> Roster<E> {
    /// Insert a record. A fresh identifier is appended at the end; a known
    /// identifier keeps its position and only the record is replaced.
    pub fn insert(&mut self, record: E) {
        let id = record.entity_id().clone();
        if self.records.insert(id.clone(), record).is_none() {
            self.order.push(id);
        }
    }
}

impl<E: Clone> Roster<E> {
    /// Clone out the records in insertion order.
    pub fn to_vec(&self) -> Vec<E> {
        self.iter().cloned().collect()
    }
}
