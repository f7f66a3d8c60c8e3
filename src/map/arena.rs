//! Storage for the instances of one map.

use crate::types::{Instance, InstanceId};

/// Slot vector of instances. Removed slots stay empty, so handles are
/// never reused.
#[derive(Debug, Clone, Default)]
pub struct Arena {
    slots: Vec<Option<Instance>>,
    live: usize,
}

impl Arena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, instance: Instance) -> InstanceId {
        let id = InstanceId(self.slots.len());
        self.slots.push(Some(instance));
        self.live += 1;
        id
    }

    pub fn get(&self, id: InstanceId) -> Option<&Instance> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: InstanceId) -> Option<&mut Instance> {
        self.slots.get_mut(id.0).and_then(Option::as_mut)
    }

    pub fn contains(&self, id: InstanceId) -> bool {
        self.get(id).is_some()
    }

    pub fn remove(&mut self, id: InstanceId) -> Option<Instance> {
        let removed = self.slots.get_mut(id.0).and_then(Option::take);
        if removed.is_some() {
            self.live -= 1;
        }
        removed
    }

    /// Number of live instances.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Number of handles ever issued; bounds every link walk.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (InstanceId, &Instance)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|inst| (InstanceId(i), inst)))
    }

    pub fn ids(&self) -> Vec<InstanceId> {
        self.iter().map(|(id, _)| id).collect()
    }
}
