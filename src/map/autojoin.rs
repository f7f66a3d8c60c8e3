//! Autojoining: pick wall-like variants from the four neighbours.
//!
//! A join list holds 16 archetypes indexed by a mask of connected
//! neighbours (north 1, east 2, south 4, west 8). Inserting or deleting a
//! member updates the variants of its neighbours.

use std::sync::Arc;

use tracing::trace;

use super::{EditResult, MapModel};
use crate::diff::line_key;
use crate::error::EditError;
use crate::registry::{Direction, JoinList, JoinListId};
use crate::types::{ArchId, InstanceId};
use crate::validation::DiagnosticSink;

impl MapModel {
    /// First instance in a cell whose archetype belongs to `list`.
    pub fn join_member_at(&self, list: JoinListId, x: i32, y: i32) -> Option<InstanceId> {
        let members = self.registry.join_list(list)?;
        self.cell(x, y)
            .find(|&id| {
                self.arena
                    .get(id)
                    .and_then(|inst| inst.arch)
                    .is_some_and(|a| members.contains(a))
            })
    }

    /// Choose the variant for a new member at `(x, y)` and rejoin its
    /// neighbours.
    ///
    /// The caller places the returned archetype. Fails when the cell
    /// already holds a member of the same list.
    pub fn join_insert(&mut self, list: JoinListId, x: i32, y: i32) -> EditResult<ArchId> {
        if !self.grid.contains(x, y) {
            return Err(EditError::OutOfBounds {
                x,
                y,
                width: self.width(),
                height: self.height(),
            });
        }
        let registry = Arc::clone(&self.registry);
        let members = registry
            .join_list(list)
            .ok_or(EditError::UnknownJoinList(list.0))?;
        if self.join_member_at(list, x, y).is_some() {
            return Err(EditError::JoinOccupied { x, y });
        }

        let mut mask = 0u8;
        for direction in Direction::ALL {
            let (dx, dy) = direction.delta();
            let Some(neighbour) = self.join_member_at(list, x + dx, y + dy) else {
                continue;
            };
            mask |= direction.bit();
            let current = self.join_mask(members, neighbour);
            self.rejoin(neighbour, members.get(current | direction.opposite().bit()));
        }

        trace!(x, y, mask, "Joined new member");
        Ok(members.get(mask))
    }

    /// Rejoin the neighbours of a member removed from `(x, y)`.
    pub fn join_delete(&mut self, list: JoinListId, x: i32, y: i32) {
        let registry = Arc::clone(&self.registry);
        let Some(members) = registry.join_list(list) else {
            return;
        };
        for direction in Direction::ALL {
            let (dx, dy) = direction.delta();
            let Some(neighbour) = self.join_member_at(list, x + dx, y + dy) else {
                continue;
            };
            let current = self.join_mask(members, neighbour);
            self.rejoin(neighbour, members.get(current & !direction.opposite().bit()));
        }
    }

    /// Connection mask of a member; a member missing from the list reads 0.
    fn join_mask(&mut self, members: &JoinList, id: InstanceId) -> u8 {
        let Some(inst) = self.arena.get(id) else {
            return 0;
        };
        match inst.arch.and_then(|a| members.index_of(a)) {
            Some(mask) => mask,
            None => {
                let message = format!(
                    "'{}' at ({}, {}) is not in its join list, treating it as unconnected",
                    inst.arch_name, inst.x, inst.y
                );
                self.diagnostics.warning("archmap::ref::join-mask", message);
                0
            }
        }
    }

    /// Switch an instance to another variant of its join list.
    ///
    /// Face overrides belong to the old variant and are dropped.
    fn rejoin(&mut self, id: InstanceId, arch: ArchId) {
        let name = self
            .registry
            .get(arch)
            .map_or_else(String::new, |a| a.name.clone());
        let Some(inst) = self.arena.get_mut(id) else {
            return;
        };
        if inst.arch == Some(arch) {
            return;
        }
        inst.arch = Some(arch);
        inst.arch_name = name;
        inst.face = None;
        inst.attributes.retain(|line| line_key(line) != "face");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::PlaceOptions;
    use crate::testing::registry;

    fn wall_at(map: &MapModel, x: i32, y: i32) -> String {
        let list = map.registry().by_name("wall_00").unwrap().join_list.unwrap();
        let id = map.join_member_at(list, x, y).unwrap();
        map.get(id).unwrap().arch_name.clone()
    }

    fn add_wall(map: &mut MapModel, x: i32, y: i32) -> InstanceId {
        let wall = map.registry().id_of("wall_00").unwrap();
        map.add_arch(wall, x, y, PlaceOptions::joined()).unwrap()
    }

    #[test]
    fn test_lone_wall_uses_variant_zero() {
        let mut map = MapModel::new(registry(), 3, 3);
        add_wall(&mut map, 1, 1);
        assert_eq!(wall_at(&map, 1, 1), "wall_00");
    }

    #[test]
    fn test_neighbours_join_both_ways() {
        let mut map = MapModel::new(registry(), 3, 3);
        add_wall(&mut map, 1, 1);
        add_wall(&mut map, 1, 2);

        // (1, 2) is north of (1, 1)
        assert_eq!(wall_at(&map, 1, 1), "wall_01");
        assert_eq!(wall_at(&map, 1, 2), "wall_04");

        add_wall(&mut map, 2, 1);
        assert_eq!(wall_at(&map, 1, 1), "wall_03");
        assert_eq!(wall_at(&map, 2, 1), "wall_08");
    }

    #[test]
    fn test_cross_shape() {
        let mut map = MapModel::new(registry(), 3, 3);
        for (x, y) in [(1, 2), (2, 1), (1, 0), (0, 1)] {
            add_wall(&mut map, x, y);
        }
        add_wall(&mut map, 1, 1);
        assert_eq!(wall_at(&map, 1, 1), "wall_15");
        assert_eq!(wall_at(&map, 0, 1), "wall_02");
    }

    #[test]
    fn test_delete_rejoins_neighbours() {
        let mut map = MapModel::new(registry(), 3, 3);
        add_wall(&mut map, 1, 1);
        let east = add_wall(&mut map, 2, 1);
        assert_eq!(wall_at(&map, 1, 1), "wall_02");

        map.remove_and_join(east).unwrap();
        assert_eq!(wall_at(&map, 1, 1), "wall_00");
    }

    #[test]
    fn test_occupied_cell_rejected() {
        let mut map = MapModel::new(registry(), 3, 3);
        add_wall(&mut map, 1, 1);
        let list = map.registry().by_name("wall_00").unwrap().join_list.unwrap();
        assert_eq!(map.join_insert(list, 1, 1), Err(EditError::JoinOccupied { x: 1, y: 1 }));
        assert_eq!(map.cell(1, 1).count(), 1);
    }

    #[test]
    fn test_rejoin_drops_face_override() {
        let mut map = MapModel::new(registry(), 3, 3);
        let west = add_wall(&mut map, 0, 1);
        {
            let inst = map.get_mut(west).unwrap();
            inst.face = Some("custom.111".to_string());
            inst.attributes.push("face custom.111".to_string());
        }
        add_wall(&mut map, 1, 1);
        let inst = map.get(west).unwrap();
        assert_eq!(inst.arch_name, "wall_02");
        assert!(inst.face.is_none());
        assert!(inst.attributes.is_empty());
    }
}
