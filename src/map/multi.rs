//! Expansion of multi-tile objects into head and tail instances.

use std::sync::Arc;

use super::{EditResult, MapModel};
use crate::error::EditError;
use crate::types::{Instance, InstanceId, Location};
use crate::validation::DiagnosticSink;

/// How far a multi-tile object has been expanded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MultiState {
    /// Not a multi-tile object.
    Single,
    /// Head without any tail instances yet.
    NotExpanded,
    /// Some tails exist, others are missing.
    ExpandingTails,
    /// All tails exist.
    Expanded,
}

impl MapModel {
    /// Expansion state of the object an instance belongs to.
    pub fn multi_state(&self, id: InstanceId) -> MultiState {
        let head = self.head_of(id);
        let Some(inst) = self.get(head) else {
            return MultiState::Single;
        };
        let expected = inst.arch.map_or(0, |a| self.registry.tails(a).len());
        if expected == 0 {
            return MultiState::Single;
        }
        match self.multi_parts(head).len() - 1 {
            0 => MultiState::NotExpanded,
            n if n < expected => MultiState::ExpandingTails,
            _ => MultiState::Expanded,
        }
    }

    /// Create the missing tail instances of a head.
    ///
    /// Tails are created in sub-index order at the head's position plus
    /// their offset and inherit the head's effective direction, animation,
    /// shape and edit type. Inventory items and tails are left alone. Returns the
    /// number of tails created.
    pub fn expand(&mut self, head: InstanceId) -> EditResult<usize> {
        let inst = self.get(head).ok_or(EditError::MissingInstance)?;
        if inst.is_tail() || inst.container().is_some() {
            return Ok(0);
        }
        let Some(arch) = inst.arch else {
            return Ok(0);
        };

        let registry = Arc::clone(&self.registry);
        let tails = registry.tails(arch);
        let parts = self.multi_parts(head);
        let existing = parts.len() - 1;
        if existing >= tails.len() {
            return Ok(0);
        }

        let on_grid = inst.location == Location::Grid;
        let (hx, hy) = (inst.x, inst.y);
        let direction = inst.effective_direction(registry.get(arch));
        let anim_name = inst.anim_name.clone();
        let shape = inst.multi_shape_id.unwrap_or(0);
        let edit_type = inst.edit_type;

        let mut last = parts[existing];
        for tail_arch in &tails[existing..] {
            let mut tail = Instance::from_archetype(tail_arch);
            tail.x = hx + tail_arch.multi.offset.0;
            tail.y = hy + tail_arch.multi.offset.1;
            tail.multi_head = Some(head);
            tail.direction = (direction != tail_arch.direction).then_some(direction);
            tail.anim_name = anim_name.clone();
            tail.multi_shape_id = Some(if tail_arch.multi_shape_id != 0 {
                tail_arch.multi_shape_id
            } else {
                shape
            });
            tail.multi_part_nr = Some(tail_arch.multi_part_nr);
            tail.edit_type = edit_type;
            let (tx, ty) = (tail.x, tail.y);

            let id = self.arena.insert(tail);
            self.instance_mut(last)?.multi_next = Some(id);
            last = id;

            if on_grid {
                if self.grid.contains(tx, ty) {
                    self.link_cell(id, false)?;
                } else {
                    self.diagnostics.error(
                        "archmap::integrity::tail-out-of-bounds",
                        format!("Tail '{}' of {} lies outside the map at ({}, {})", tail_arch.name, head, tx, ty),
                    );
                }
            }
        }

        self.mark_lowest_part(head);
        Ok(tails.len() - existing)
    }

    /// Flag the part drawn lowest on screen.
    pub(crate) fn mark_lowest_part(&mut self, head: InstanceId) {
        let parts = self.multi_parts(head);
        if parts.len() < 2 {
            return;
        }
        let registry = Arc::clone(&self.registry);
        let head_shape = self
            .arena
            .get(head)
            .and_then(|inst| inst.multi_shape_id)
            .unwrap_or(0);

        let offsets: Vec<i32> = parts
            .iter()
            .map(|&part| {
                let inst = self.arena.get(part);
                let arch = inst.and_then(|i| i.arch).and_then(|a| registry.get(a));
                let shape = inst
                    .and_then(|i| i.multi_shape_id)
                    .filter(|&s| s != 0)
                    .unwrap_or(head_shape);
                let part_nr = inst
                    .and_then(|i| i.multi_part_nr)
                    .or_else(|| arch.map(|a| a.multi_part_nr))
                    .unwrap_or(0);
                let row = arch.map_or(0, |a| a.multi.offset.1);
                registry.part_offset(shape, part_nr, row)
            })
            .collect();

        let Some(&lowest) = offsets.iter().min() else {
            return;
        };
        for (part, offset) in parts.into_iter().zip(offsets) {
            if let Some(inst) = self.arena.get_mut(part) {
                inst.lowest_part = offset == lowest;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::registry;

    #[test]
    fn test_place_expands_all_tails() {
        let mut map = MapModel::new(registry(), 5, 5);
        let tree = map.spawn_named("bigtree").unwrap();
        assert_eq!(map.multi_state(tree), MultiState::NotExpanded);

        map.place(tree, 1, 2, false).unwrap();
        assert_eq!(map.multi_state(tree), MultiState::Expanded);

        let parts = map.multi_parts(tree);
        assert_eq!(parts.len(), 4);
        let positions: Vec<_> = parts
            .iter()
            .map(|&p| (map.get(p).unwrap().x, map.get(p).unwrap().y))
            .collect();
        assert_eq!(positions, vec![(1, 2), (2, 2), (1, 3), (2, 3)]);
        for &tail in &parts[1..] {
            assert_eq!(map.get(tail).unwrap().multi_head, Some(tree));
            assert_eq!(map.head_of(tail), tree);
            assert_eq!(map.multi_state(tail), MultiState::Expanded);
        }
        assert_eq!(map.cell(2, 3).count(), 1);
    }

    #[test]
    fn test_tails_inherit_from_head() {
        let mut map = MapModel::new(registry(), 5, 5);
        let tree = map.spawn_named("bigtree").unwrap();
        {
            let inst = map.get_mut(tree).unwrap();
            inst.direction = Some(3);
            inst.anim_name = Some("sway".to_string());
        }
        map.place(tree, 0, 0, false).unwrap();
        for part in map.multi_parts(tree) {
            let inst = map.get(part).unwrap();
            assert_eq!(inst.direction, Some(3));
            assert_eq!(inst.anim_name.as_deref(), Some("sway"));
        }
    }

    #[test]
    fn test_tails_inherit_archetype_direction_of_head() {
        let mut map = MapModel::new(registry(), 5, 5);
        let gate = map.spawn_named("gate").unwrap();
        assert_eq!(map.get(gate).unwrap().direction, None);
        map.place(gate, 0, 0, false).unwrap();

        let parts = map.multi_parts(gate);
        assert_eq!(parts.len(), 2);
        assert_eq!(map.get(parts[1]).unwrap().direction, Some(3));

        let tree = map.spawn_named("bigtree").unwrap();
        map.place(tree, 2, 2, false).unwrap();
        for part in map.multi_parts(tree) {
            assert_eq!(map.get(part).unwrap().direction, None);
        }
    }

    #[test]
    fn test_expand_is_idempotent() {
        let mut map = MapModel::new(registry(), 5, 5);
        let tree = map.spawn_named("bigtree").unwrap();
        map.place(tree, 0, 0, false).unwrap();
        assert_eq!(map.expand(tree).unwrap(), 0);
        assert_eq!(map.instance_count(), 4);
    }

    #[test]
    fn test_lowest_parts_share_the_minimum_row() {
        let mut map = MapModel::new(registry(), 5, 5);
        let tree = map.spawn_named("bigtree").unwrap();
        map.place(tree, 0, 0, false).unwrap();
        let lowest: Vec<bool> = map
            .multi_parts(tree)
            .into_iter()
            .map(|p| map.get(p).unwrap().lowest_part)
            .collect();
        assert_eq!(lowest, vec![true, true, false, false]);
    }

    #[test]
    fn test_single_object_state() {
        let mut map = MapModel::new(registry(), 2, 2);
        let floor = map.spawn_named("floor").unwrap();
        assert_eq!(map.multi_state(floor), MultiState::Single);
        assert_eq!(map.expand(floor).unwrap(), 0);
    }
}
