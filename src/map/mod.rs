//! The map model: header, instance arena and cell grid.
//!
//! Every cell holds a doubly linked stack of instances, bottom to top. An
//! instance can also hold an inventory list, linked the same way. All links
//! are arena handles; a removed instance leaves an empty slot, so a stale
//! handle never aliases a new object.
//!
//! Editing operations check everything first and only then mutate: a
//! rejected placement leaves the map exactly as it was.

mod arena;
mod autojoin;
mod grid;
mod multi;
mod pending;
mod shared;

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::diff::strip_inherited;
use crate::error::EditError;
use crate::registry::ArchetypeRegistry;
use crate::types::{
    calculate_edit_type, event_kind_name, ArchId, Archetype, EditType, Instance, InstanceId,
    Location, MapHeader, ScriptedEvent, DEFAULT_MAP_NAME, EVENT_TYPE,
};
use crate::validation::{Diagnostic, DiagnosticSink, Diagnostics};

pub use arena::Arena;
pub use grid::{Cell, Grid};
pub use multi::MultiState;
pub use shared::SharedMap;

type EditResult<T> = std::result::Result<T, EditError>;

/// How [`MapModel::add_arch`] places a new object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaceOptions {
    /// Insert at the bottom of each cell instead of the top.
    pub insert_below: bool,
    /// Reject when a part's cell already holds the same archetype.
    pub exclusive: bool,
    /// Pick the join-list variant matching the neighbours.
    pub join: bool,
}

impl Default for PlaceOptions {
    fn default() -> Self {
        Self {
            insert_below: false,
            exclusive: true,
            join: false,
        }
    }
}

impl PlaceOptions {
    pub fn joined() -> Self {
        Self {
            join: true,
            ..Self::default()
        }
    }
}

/// Owner of a linked list of instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Owner {
    Cell(i32, i32),
    Inventory(InstanceId),
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Owner::Cell(x, y) => write!(f, "cell ({}, {})", x, y),
            Owner::Inventory(id) => write!(f, "inventory of {}", id),
        }
    }
}

/// Iterator over one cell stack or inventory list.
///
/// The walk stops after as many steps as handles exist, so a corrupted
/// list cannot loop forever.
pub struct ListIter<'a> {
    arena: &'a Arena,
    next: Option<InstanceId>,
    remaining: usize,
}

impl Iterator for ListIter<'_> {
    type Item = InstanceId;

    fn next(&mut self) -> Option<InstanceId> {
        let id = self.next?;
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let inst = self.arena.get(id)?;
        self.next = inst.next;
        Some(id)
    }
}

/// A map being edited.
#[derive(Debug)]
pub struct MapModel {
    registry: Arc<ArchetypeRegistry>,
    header: MapHeader,
    arena: Arena,
    grid: Grid,
    active_edit_types: EditType,
    diagnostics: Diagnostics,
}

impl MapModel {
    /// Create an empty map.
    pub fn new(registry: Arc<ArchetypeRegistry>, width: usize, height: usize) -> Self {
        Self::with_header(registry, MapHeader::new(DEFAULT_MAP_NAME, width, height))
    }

    /// Create an empty map sized by its header.
    pub fn with_header(registry: Arc<ArchetypeRegistry>, header: MapHeader) -> Self {
        let grid = Grid::new(header.width, header.height);
        Self {
            registry,
            header,
            arena: Arena::new(),
            grid,
            active_edit_types: EditType::empty(),
            diagnostics: Diagnostics::new(),
        }
    }

    pub fn registry(&self) -> &Arc<ArchetypeRegistry> {
        &self.registry
    }

    pub fn header(&self) -> &MapHeader {
        &self.header
    }

    /// Mutable header. The size fields follow the grid; use
    /// [`resize`](Self::resize) to change them.
    pub fn header_mut(&mut self) -> &mut MapHeader {
        &mut self.header
    }

    pub fn width(&self) -> usize {
        self.grid.width()
    }

    pub fn height(&self) -> usize {
        self.grid.height()
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        self.grid.contains(x, y)
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn get(&self, id: InstanceId) -> Option<&Instance> {
        self.arena.get(id)
    }

    pub fn get_mut(&mut self, id: InstanceId) -> Option<&mut Instance> {
        self.arena.get_mut(id)
    }

    /// All live instances, including detached ones and tails.
    pub fn instances(&self) -> impl Iterator<Item = (InstanceId, &Instance)> {
        self.arena.iter()
    }

    pub fn instance_count(&self) -> usize {
        self.arena.len()
    }

    /// Archetype an instance refers to.
    pub fn archetype_of(&self, inst: &Instance) -> Option<&Archetype> {
        inst.arch.and_then(|id| self.registry.get(id))
    }

    /// Problems recorded while editing.
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Diagnostics {
        self.diagnostics.take()
    }

    pub fn active_edit_types(&self) -> EditType {
        self.active_edit_types
    }

    /// Head of a multi-tile object, or the instance itself.
    pub fn head_of(&self, id: InstanceId) -> InstanceId {
        self.arena
            .get(id)
            .and_then(|inst| inst.multi_head)
            .unwrap_or(id)
    }

    /// Head followed by its tails in chain order.
    pub fn multi_parts(&self, head: InstanceId) -> Vec<InstanceId> {
        let mut parts = Vec::new();
        let mut current = Some(head);
        while let Some(id) = current {
            if parts.contains(&id) || parts.len() >= self.arena.capacity() {
                break;
            }
            let Some(inst) = self.arena.get(id) else {
                break;
            };
            parts.push(id);
            current = inst.multi_next;
        }
        parts
    }

    /// Whether the instance is, or will expand into, a multi-tile object.
    pub fn is_multi(&self, id: InstanceId) -> bool {
        self.arena.get(id).is_some_and(|inst| {
            inst.in_multi_chain() || self.archetype_of(inst).is_some_and(Archetype::is_multi)
        })
    }

    /// Cell stack, bottom to top. Empty outside the map.
    pub fn cell(&self, x: i32, y: i32) -> ListIter<'_> {
        ListIter {
            arena: &self.arena,
            next: self.grid.cell(x, y).and_then(|c| c.bottom),
            remaining: self.arena.capacity(),
        }
    }

    /// Inventory of an instance in order.
    pub fn inventory(&self, container: InstanceId) -> ListIter<'_> {
        ListIter {
            arena: &self.arena,
            next: self.arena.get(container).and_then(|c| c.inv_first),
            remaining: self.arena.capacity(),
        }
    }

    /// Live instance behind a link, or `MissingInstance` for a stale one.
    fn instance(&self, id: InstanceId) -> EditResult<&Instance> {
        self.arena.get(id).ok_or(EditError::MissingInstance)
    }

    fn instance_mut(&mut self, id: InstanceId) -> EditResult<&mut Instance> {
        self.arena.get_mut(id).ok_or(EditError::MissingInstance)
    }

    /// Create a detached instance of an archetype.
    ///
    /// Spawning a tail archetype spawns its head.
    pub fn spawn(&mut self, arch: ArchId) -> EditResult<InstanceId> {
        let registry = Arc::clone(&self.registry);
        let mut archetype = registry
            .get(arch)
            .ok_or_else(|| EditError::UnknownArchetype(arch.to_string()))?;
        if let Some(head) = archetype.multi.head.and_then(|h| registry.get(h)) {
            archetype = head;
        }
        let mut inst = Instance::from_archetype(archetype);
        self.apply_defaults(&mut inst);
        Ok(self.arena.insert(inst))
    }

    /// Create a detached instance of an archetype by name.
    pub fn spawn_named(&mut self, name: &str) -> EditResult<InstanceId> {
        let arch = self
            .registry
            .id_of(name)
            .ok_or_else(|| EditError::UnknownArchetype(name.to_string()))?;
        self.spawn(arch)
    }

    /// Store an instance without linking it anywhere.
    pub(crate) fn alloc(&mut self, mut inst: Instance) -> InstanceId {
        inst.clear_links();
        self.arena.insert(inst)
    }

    /// Fill inherited defaults of a single-cell instance or head.
    pub(crate) fn apply_defaults(&self, inst: &mut Instance) {
        let Some(arch) = self.archetype_of(inst) else {
            return;
        };
        if inst.multi_shape_id.is_none() {
            inst.multi_shape_id = Some(arch.multi_shape_id);
        }
        if inst.multi_part_nr.is_none() {
            inst.multi_part_nr = Some(arch.multi_part_nr);
        }
        inst.lowest_part = arch.lowest_part;
        if !self.active_edit_types.is_empty() {
            let current = inst.edit_type.unwrap_or_default();
            let type_no = inst.effective_type(Some(arch));
            inst.edit_type = Some(calculate_edit_type(
                current,
                &inst.attributes,
                arch,
                type_no,
                self.active_edit_types,
            ));
        }
    }

    /// Cells an object of `arch` covers relative to its head.
    fn footprint(&self, arch: Option<ArchId>) -> Vec<(Option<ArchId>, i32, i32)> {
        let mut parts = vec![(arch, 0, 0)];
        if let Some(arch) = arch {
            parts.extend(
                self.registry
                    .tails(arch)
                    .iter()
                    .map(|t| (Some(t.id), t.multi.offset.0, t.multi.offset.1)),
            );
        }
        parts
    }

    fn check_placement(&self, arch: Option<ArchId>, x: i32, y: i32, exclusive: bool) -> EditResult<()> {
        for (part, dx, dy) in self.footprint(arch) {
            let (px, py) = (x + dx, y + dy);
            if !self.grid.contains(px, py) {
                return Err(EditError::OutOfBounds {
                    x: px,
                    y: py,
                    width: self.width(),
                    height: self.height(),
                });
            }
            let Some(part) = part.filter(|_| exclusive) else {
                continue;
            };
            if self
                .cell(px, py)
                .any(|id| self.arena.get(id).is_some_and(|i| i.arch == Some(part)))
            {
                let name = self
                    .registry
                    .get(part)
                    .map_or_else(|| part.to_string(), |a| a.name.clone());
                return Err(EditError::Occupied { arch: name, x: px, y: py });
            }
        }
        Ok(())
    }

    /// Place a detached instance with its head at `(x, y)`.
    ///
    /// Multi-tile objects are expanded. Fails without touching the map when
    /// any part would leave the map or land on a cell already holding the
    /// same archetype. Instances without a resolved archetype are only
    /// kept by the map loader and cannot be placed here.
    pub fn place(&mut self, id: InstanceId, x: i32, y: i32, insert_below: bool) -> EditResult<()> {
        let inst = self.instance(id)?;
        if inst.arch.is_none() {
            return Err(EditError::UnresolvedArchetype(inst.arch_name.clone()));
        }
        self.place_with(id, x, y, insert_below, true)
    }

    pub(crate) fn place_with(
        &mut self,
        id: InstanceId,
        x: i32,
        y: i32,
        insert_below: bool,
        exclusive: bool,
    ) -> EditResult<()> {
        let inst = self.arena.get(id).ok_or(EditError::MissingInstance)?;
        if !inst.is_detached() || inst.is_tail() {
            return Err(EditError::NotDetached);
        }
        self.check_placement(inst.arch, x, y, exclusive)?;

        let head = self.instance_mut(id)?;
        head.x = x;
        head.y = y;
        self.expand(id)?;

        let registry = Arc::clone(&self.registry);
        for part in self.multi_parts(id) {
            if part != id {
                let tail = self.instance_mut(part)?;
                let offset = tail
                    .arch
                    .and_then(|a| registry.get(a))
                    .map_or((0, 0), |a| a.multi.offset);
                tail.x = x + offset.0;
                tail.y = y + offset.1;
            }
            self.link_cell(part, insert_below)?;
        }
        Ok(())
    }

    /// Spawn an archetype and place it.
    pub fn add_arch(&mut self, arch: ArchId, x: i32, y: i32, options: PlaceOptions) -> EditResult<InstanceId> {
        let archetype = self
            .registry
            .get(arch)
            .ok_or_else(|| EditError::UnknownArchetype(arch.to_string()))?;

        let join_list = archetype.join_list.filter(|_| options.join && !archetype.is_multi());
        let arch = match join_list {
            Some(list) => {
                self.check_placement(Some(arch), x, y, false)?;
                self.join_insert(list, x, y)?
            }
            None => arch,
        };

        let id = self.spawn(arch)?;
        if let Err(err) = self.place_with(id, x, y, options.insert_below, options.exclusive) {
            self.arena.remove(id);
            return Err(err);
        }
        Ok(id)
    }

    fn owner_of(&self, id: InstanceId) -> Option<Owner> {
        let inst = self.arena.get(id)?;
        match inst.location {
            Location::Detached => None,
            Location::Grid => Some(Owner::Cell(inst.x, inst.y)),
            Location::Inventory(container) => Some(Owner::Inventory(container)),
        }
    }

    fn ends(&self, owner: Owner) -> (Option<InstanceId>, Option<InstanceId>) {
        match owner {
            Owner::Cell(x, y) => self.grid.cell(x, y).map_or((None, None), |c| (c.bottom, c.top)),
            Owner::Inventory(c) => self
                .arena
                .get(c)
                .map_or((None, None), |i| (i.inv_first, i.inv_last)),
        }
    }

    fn set_first(&mut self, owner: Owner, value: Option<InstanceId>) {
        match owner {
            Owner::Cell(x, y) => {
                if let Some(cell) = self.grid.cell_mut(x, y) {
                    cell.bottom = value;
                }
            }
            Owner::Inventory(c) => {
                if let Some(inst) = self.arena.get_mut(c) {
                    inst.inv_first = value;
                }
            }
        }
    }

    fn set_last(&mut self, owner: Owner, value: Option<InstanceId>) {
        match owner {
            Owner::Cell(x, y) => {
                if let Some(cell) = self.grid.cell_mut(x, y) {
                    cell.top = value;
                }
            }
            Owner::Inventory(c) => {
                if let Some(inst) = self.arena.get_mut(c) {
                    inst.inv_last = value;
                }
            }
        }
    }

    /// Append (or prepend) an instance to a list.
    ///
    /// A list end pointing to a removed instance fails before anything is
    /// linked.
    fn link(&mut self, owner: Owner, id: InstanceId, at_start: bool) -> EditResult<()> {
        let (first, last) = self.ends(owner);
        let end = if at_start { first } else { last };
        if let Some(end) = end {
            self.instance(end)?;
        }
        let inst = self.instance_mut(id)?;
        if at_start {
            inst.prev = None;
            inst.next = first;
            match first.and_then(|f| self.arena.get_mut(f)) {
                Some(f) => f.prev = Some(id),
                None => self.set_last(owner, Some(id)),
            }
            self.set_first(owner, Some(id));
        } else {
            inst.next = None;
            inst.prev = last;
            match last.and_then(|l| self.arena.get_mut(l)) {
                Some(l) => l.next = Some(id),
                None => self.set_first(owner, Some(id)),
            }
            self.set_last(owner, Some(id));
        }
        Ok(())
    }

    fn link_cell(&mut self, id: InstanceId, insert_below: bool) -> EditResult<()> {
        let inst = self.instance(id)?;
        let owner = Owner::Cell(inst.x, inst.y);
        self.link(owner, id, insert_below)?;
        self.instance_mut(id)?.location = Location::Grid;
        Ok(())
    }

    /// Take an instance out of its stack or inventory list.
    fn unlink(&mut self, id: InstanceId) {
        let Some(owner) = self.owner_of(id) else {
            return;
        };
        let Some((prev, next)) = self.arena.get(id).map(|inst| (inst.prev, inst.next)) else {
            return;
        };
        match prev.and_then(|p| self.arena.get_mut(p)) {
            Some(p) => p.next = next,
            None => self.set_first(owner, next),
        }
        match next.and_then(|n| self.arena.get_mut(n)) {
            Some(n) => n.prev = prev,
            None => self.set_last(owner, prev),
        }
        if let Some(inst) = self.arena.get_mut(id) {
            inst.prev = None;
            inst.next = None;
            inst.location = Location::Detached;
        }
    }

    /// Append a detached instance to an inventory.
    pub fn insert_into(&mut self, container: InstanceId, id: InstanceId) -> EditResult<()> {
        if !self.arena.contains(container) {
            return Err(EditError::MissingInstance);
        }
        let inst = self.arena.get(id).ok_or(EditError::MissingInstance)?;
        if !inst.is_detached() || id == container {
            return Err(EditError::NotDetached);
        }
        if self.is_multi(id) {
            return Err(EditError::NotAContainer);
        }

        let mut ancestor = Some(container);
        let mut steps = 0;
        while let Some(a) = ancestor {
            if a == id {
                return Err(EditError::NotDetached);
            }
            steps += 1;
            if steps > self.arena.capacity() {
                break;
            }
            ancestor = self.arena.get(a).and_then(Instance::container);
        }

        self.link(Owner::Inventory(container), id, false)?;
        self.instance_mut(id)?.location = Location::Inventory(container);
        Ok(())
    }

    /// Replace the inventory of `container` with detached `items`.
    ///
    /// The previous inventory is deleted.
    pub fn set_inventory(&mut self, container: InstanceId, items: Vec<InstanceId>) -> EditResult<()> {
        if !self.arena.contains(container) {
            return Err(EditError::MissingInstance);
        }
        for &item in &items {
            let inst = self.arena.get(item).ok_or(EditError::MissingInstance)?;
            if !inst.is_detached() || item == container {
                return Err(EditError::NotDetached);
            }
            if self.is_multi(item) {
                return Err(EditError::NotAContainer);
            }
        }

        let old: Vec<InstanceId> = self.inventory(container).collect();
        for child in old {
            self.remove(child)?;
        }
        for item in items {
            self.insert_into(container, item)?;
        }
        Ok(())
    }

    /// Replace the contents of a cell with detached `items`, bottom first.
    ///
    /// Objects currently in the cell are removed as a whole, including
    /// parts in other cells.
    pub fn set_cell(&mut self, x: i32, y: i32, items: Vec<InstanceId>) -> EditResult<()> {
        for &item in &items {
            let inst = self.arena.get(item).ok_or(EditError::MissingInstance)?;
            if !inst.is_detached() || inst.is_tail() {
                return Err(EditError::NotDetached);
            }
            self.check_placement(inst.arch, x, y, false)?;
        }

        let mut heads: Vec<InstanceId> = Vec::new();
        for id in self.cell(x, y) {
            let head = self.head_of(id);
            if !heads.contains(&head) {
                heads.push(head);
            }
        }
        for head in heads {
            self.remove(head)?;
        }
        for item in items {
            self.place_with(item, x, y, false, false)?;
        }
        Ok(())
    }

    /// Delete an instance.
    ///
    /// Any part of a multi-tile object removes the whole object. The
    /// inventory is deleted recursively.
    pub fn remove(&mut self, id: InstanceId) -> EditResult<()> {
        if !self.arena.contains(id) {
            return Err(EditError::MissingInstance);
        }
        let head = self.head_of(id);
        let parts = self.multi_parts(head);
        for &part in &parts {
            self.unlink(part);
        }
        for part in parts {
            self.delete_tree(part);
        }
        Ok(())
    }

    /// Delete an instance and update join-list neighbours.
    pub fn remove_and_join(&mut self, id: InstanceId) -> EditResult<()> {
        let head = self.head_of(id);
        let inst = self.arena.get(head).ok_or(EditError::MissingInstance)?;
        let join = match (inst.location, self.archetype_of(inst).and_then(|a| a.join_list)) {
            (Location::Grid, Some(list)) => Some((list, inst.x, inst.y)),
            _ => None,
        };
        self.remove(head)?;
        if let Some((list, x, y)) = join {
            self.join_delete(list, x, y);
        }
        Ok(())
    }

    /// Drop an unlinked instance and everything in its inventory.
    fn delete_tree(&mut self, root: InstanceId) {
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let children: Vec<InstanceId> = self.inventory(id).collect();
            stack.extend(children);
            if let Some(mut inst) = self.arena.remove(id) {
                inst.clear_links();
            }
        }
    }

    /// Change the map size.
    ///
    /// Negative sizes clamp to zero. Objects with any part in a cut-off
    /// column or row are deleted before the surviving cells are copied.
    pub fn resize(&mut self, width: i32, height: i32) {
        let width = width.max(0);
        let height = height.max(0);

        let mut doomed: Vec<InstanceId> = Vec::new();
        for (x, y) in self.grid.positions() {
            if x < width && y < height {
                continue;
            }
            for id in self.cell(x, y) {
                let head = self.head_of(id);
                if !doomed.contains(&head) {
                    doomed.push(head);
                }
            }
        }
        let removed = doomed.len();
        for head in doomed {
            if self.arena.contains(head) {
                let _ = self.remove(head);
            }
        }

        let mut grid = Grid::new(width as usize, height as usize);
        for (x, y) in self.grid.positions() {
            if let (Some(old), Some(new)) = (self.grid.cell(x, y), grid.cell_mut(x, y)) {
                *new = *old;
            }
        }
        self.grid = grid;
        self.header.width = width as usize;
        self.header.height = height as usize;
        debug!(width, height, removed, "Resized map");
    }

    /// Swap an instance with the one above it. Returns false at the top.
    pub fn move_up(&mut self, id: InstanceId) -> EditResult<bool> {
        let inst = self.arena.get(id).ok_or(EditError::MissingInstance)?;
        let next = inst.next;
        let (Some(owner), Some(next)) = (self.owner_of(id), next) else {
            return Ok(false);
        };
        self.swap_with_next(owner, id, next)?;
        Ok(true)
    }

    /// Swap an instance with the one below it. Returns false at the bottom.
    pub fn move_down(&mut self, id: InstanceId) -> EditResult<bool> {
        let inst = self.arena.get(id).ok_or(EditError::MissingInstance)?;
        let prev = inst.prev;
        let (Some(owner), Some(prev)) = (self.owner_of(id), prev) else {
            return Ok(false);
        };
        self.swap_with_next(owner, prev, id)?;
        Ok(true)
    }

    /// Swap `a` with `b` directly above it. Every link involved is checked
    /// before the list changes.
    fn swap_with_next(&mut self, owner: Owner, a: InstanceId, b: InstanceId) -> EditResult<()> {
        let before = self.instance(a)?.prev;
        let after = self.instance(b)?.next;
        for neighbour in before.into_iter().chain(after) {
            self.instance(neighbour)?;
        }

        match before.and_then(|p| self.arena.get_mut(p)) {
            Some(p) => p.next = Some(b),
            None => self.set_first(owner, Some(b)),
        }
        match after.and_then(|n| self.arena.get_mut(n)) {
            Some(n) => n.prev = Some(a),
            None => self.set_last(owner, Some(a)),
        }
        let upper = self.instance_mut(b)?;
        upper.prev = before;
        upper.next = Some(a);
        let lower = self.instance_mut(a)?;
        lower.prev = Some(b);
        lower.next = after;
        Ok(())
    }

    /// Change the active edit types and calculate newly enabled bits.
    pub fn set_active_edit_types(&mut self, mask: EditType) {
        let added = mask - self.active_edit_types;
        self.active_edit_types = mask;
        if added.is_empty() {
            return;
        }

        let registry = Arc::clone(&self.registry);
        for id in self.arena.ids() {
            let Some(inst) = self.arena.get(id) else {
                continue;
            };
            if inst.is_tail() {
                continue;
            }
            let Some(arch) = inst.arch.and_then(|a| registry.get(a)) else {
                continue;
            };
            let edit_type = calculate_edit_type(
                inst.edit_type.unwrap_or_default(),
                &inst.attributes,
                arch,
                inst.effective_type(Some(arch)),
                added,
            );
            for part in self.multi_parts(id) {
                if let Some(part) = self.arena.get_mut(part) {
                    part.edit_type = Some(edit_type);
                }
            }
        }
    }

    /// Edit-type bits in `mask` for an instance; tails answer for their head.
    pub fn edit_type_of(&self, id: InstanceId, mask: EditType) -> EditType {
        let Some(inst) = self.arena.get(self.head_of(id)) else {
            return EditType::empty();
        };
        if let Some(cached) = inst.edit_type.filter(|_| self.active_edit_types.contains(mask)) {
            return cached & mask;
        }
        match self.archetype_of(inst) {
            Some(arch) => calculate_edit_type(
                EditType::empty(),
                &inst.attributes,
                arch,
                inst.effective_type(Some(arch)),
                mask,
            ),
            None => EditType::empty(),
        }
    }

    /// Objects on the grid matching any bit of `mask`, heads only.
    pub fn filter(&self, mask: EditType) -> Vec<InstanceId> {
        self.arena
            .iter()
            .filter(|(_, inst)| inst.location == Location::Grid && !inst.is_tail())
            .filter(|(id, _)| self.edit_type_of(*id, mask).intersects(mask))
            .map(|(id, _)| id)
            .collect()
    }

    /// Check the scripted events in an inventory.
    ///
    /// Events without a script path are deleted; the others get the default
    /// plugin and normalized paths written back. Returns the number deleted.
    pub fn validate_events(&mut self, container: InstanceId) -> usize {
        let registry = Arc::clone(&self.registry);
        let owner_name = self
            .arena
            .get(container)
            .map_or_else(String::new, |c| c.arch_name.clone());
        let children: Vec<InstanceId> = self.inventory(container).collect();
        let mut deleted = 0;

        for id in children {
            let Some(inst) = self.arena.get(id) else {
                continue;
            };
            let arch = inst.arch.and_then(|a| registry.get(a));
            if inst.effective_type(arch) != EVENT_TYPE {
                continue;
            }
            let mut event = ScriptedEvent::from_instance(inst, arch);
            if !event.is_valid() {
                self.diagnostics.push(
                    Diagnostic::warning(
                        "archmap::ref::event-without-path",
                        format!(
                            "{} event on '{}' has no script path, deleting it",
                            event_kind_name(event.sub_type),
                            owner_name
                        ),
                    )
                    .with_help("Set the script path with a 'race' line"),
                );
                let _ = self.remove(id);
                deleted += 1;
                continue;
            }
            if event.plugin.trim().is_empty() {
                self.diagnostics.warning(
                    "archmap::ref::event-without-plugin",
                    format!(
                        "{} event on '{}' has no plugin name, using the default",
                        event_kind_name(event.sub_type),
                        owner_name
                    ),
                );
            }
            event.normalize();

            let Some(inst) = self.arena.get_mut(id) else {
                continue;
            };
            event.write_into(inst);
            if let Some(arch) = arch {
                strip_inherited(&mut inst.attributes, &arch.attributes);
                if inst.name.is_some() && inst.name == arch.object_name {
                    inst.name = None;
                }
            }
        }
        deleted
    }

    /// Repair broken cell and inventory lists.
    ///
    /// A link to a removed instance or back into the list is severed; stale
    /// `prev` pointers and list ends are corrected. Returns the number of
    /// repairs.
    pub fn repair_links(&mut self) -> usize {
        let mut owners: Vec<Owner> = self
            .grid
            .positions()
            .map(|(x, y)| Owner::Cell(x, y))
            .collect();
        owners.extend(
            self.arena
                .iter()
                .filter(|(_, inst)| inst.inv_first.is_some())
                .map(|(id, _)| Owner::Inventory(id)),
        );

        let mut repairs = 0;
        for owner in owners {
            repairs += self.repair_list(owner);
        }
        repairs
    }

    fn repair_list(&mut self, owner: Owner) -> usize {
        let (first, last) = self.ends(owner);
        let mut seen = HashSet::new();
        let mut prev: Option<InstanceId> = None;
        let mut current = first;
        let mut repairs = 0;

        while let Some(id) = current {
            if !self.arena.contains(id) || !seen.insert(id) {
                let reason = if prev == Some(id) {
                    "points to itself"
                } else if self.arena.contains(id) {
                    "loops back into the list"
                } else {
                    "points to a removed instance"
                };
                self.diagnostics.error(
                    "archmap::integrity::broken-link",
                    format!("Link in {} {}, severing it", owner, reason),
                );
                match prev.and_then(|p| self.arena.get_mut(p)) {
                    Some(p) => p.next = None,
                    None => self.set_first(owner, None),
                }
                repairs += 1;
                break;
            }
            let Some(inst) = self.arena.get_mut(id) else {
                break;
            };
            if inst.prev != prev {
                inst.prev = prev;
                repairs += 1;
            }
            prev = Some(id);
            current = inst.next;
        }

        if last != prev {
            self.set_last(owner, prev);
            repairs += 1;
        }
        repairs
    }
}
