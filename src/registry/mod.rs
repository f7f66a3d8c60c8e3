//! Archetype registry.
//!
//! The registry holds every archetype by id and by name together with the
//! join lists, type names and multi-part position table. It is built once
//! by [`RegistryBuilder`] and never mutated afterwards; maps share it
//! through an `Arc`.
//!
//! # Example
//!
//! ```ignore
//! use archmap::parser::parse_archetypes;
//! use archmap::registry::RegistryBuilder;
//! use archmap::validation::Diagnostics;
//!
//! let mut diagnostics = Diagnostics::new();
//! let archetypes = parse_archetypes(&source, None, &mut diagnostics);
//!
//! let mut builder = RegistryBuilder::new();
//! builder.add_archetypes(archetypes);
//! let registry = builder.build(&mut diagnostics);
//! ```

mod joinlist;
pub mod types;

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use crate::types::{ArchId, Archetype, MultiPositionTable};
use crate::validation::DiagnosticSink;

pub use joinlist::{Direction, JoinList, JoinListId, JOIN_VARIANTS};
pub use types::{TypeName, TypeNames};

/// Immutable store of archetypes.
#[derive(Debug, Default)]
pub struct ArchetypeRegistry {
    archetypes: Vec<Archetype>,
    by_name: HashMap<String, ArchId>,
    categories: BTreeMap<String, Vec<ArchId>>,
    join_lists: Vec<JoinList>,
    type_names: TypeNames,
    positions: Option<MultiPositionTable>,
}

impl ArchetypeRegistry {
    /// Get an archetype by id.
    pub fn get(&self, id: ArchId) -> Option<&Archetype> {
        self.archetypes.get(id.index())
    }

    /// Get an archetype by name.
    pub fn by_name(&self, name: &str) -> Option<&Archetype> {
        self.id_of(name).and_then(|id| self.get(id))
    }

    /// Resolve a name to an id.
    pub fn id_of(&self, name: &str) -> Option<ArchId> {
        self.by_name.get(name).copied()
    }

    /// All archetypes in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Archetype> {
        self.archetypes.iter()
    }

    /// All archetype names in id order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.archetypes.iter().map(|a| a.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.archetypes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.archetypes.is_empty()
    }

    /// Tails of a multi-tile head, in sub-index order.
    pub fn tails(&self, head: ArchId) -> &[Archetype] {
        let Some(arch) = self.get(head) else {
            return &[];
        };
        let start = head.index() + 1;
        let end = (start + arch.multi.tail_count).min(self.archetypes.len());
        &self.archetypes[start.min(end)..end]
    }

    /// Tail with 1-based sub-index `i`.
    pub fn tail(&self, head: ArchId, i: usize) -> Option<&Archetype> {
        i.checked_sub(1).and_then(|i| self.tails(head).get(i))
    }

    pub fn join_list(&self, id: JoinListId) -> Option<&JoinList> {
        self.join_lists.get(id.0)
    }

    pub fn join_lists(&self) -> &[JoinList] {
        &self.join_lists
    }

    /// Category names in sorted order.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(|s| s.as_str())
    }

    /// Archetypes listed under a category.
    pub fn archetypes_in<'a>(&'a self, category: &str) -> impl Iterator<Item = &'a Archetype> + 'a {
        self.categories
            .get(category)
            .into_iter()
            .flatten()
            .filter_map(|&id| self.get(id))
    }

    pub fn type_name(&self, type_no: i32) -> TypeName<'_> {
        self.type_names.name(type_no)
    }

    pub fn type_names(&self) -> &TypeNames {
        &self.type_names
    }

    pub fn positions(&self) -> Option<&MultiPositionTable> {
        self.positions.as_ref()
    }

    /// Visual vertical offset of one part of a multi-tile object.
    ///
    /// Uses the position table when one is loaded, otherwise the part's
    /// row offset.
    pub fn part_offset(&self, shape: i32, part_nr: i32, row_offset: i32) -> i32 {
        match &self.positions {
            Some(table) => table.y_offset(shape, part_nr),
            None => row_offset,
        }
    }
}

/// Builder for constructing an [`ArchetypeRegistry`].
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    archetypes: Vec<Archetype>,
    join_lists: Vec<Vec<String>>,
    type_names: TypeNames,
    positions: Option<MultiPositionTable>,
}

impl RegistryBuilder {
    /// Create a new registry builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a batch of parsed archetypes.
    ///
    /// Ids inside the batch are its indices; they are rebased onto the
    /// archetypes already added, so head/tail links stay intact.
    pub fn add_archetypes(&mut self, archetypes: impl IntoIterator<Item = Archetype>) -> &mut Self {
        let base = self.archetypes.len();
        for (i, mut arch) in archetypes.into_iter().enumerate() {
            arch.id = ArchId(base + i);
            arch.multi.head = arch.multi.head.map(|h| h.offset(base));
            self.archetypes.push(arch);
        }
        self
    }

    /// Add a single-cell archetype.
    pub fn add_archetype(&mut self, mut arch: Archetype) -> &mut Self {
        arch.multi = Default::default();
        self.add_archetypes(std::iter::once(arch))
    }

    /// Archetypes added so far.
    pub fn archetypes(&self) -> &[Archetype] {
        &self.archetypes
    }

    /// Add a join list by archetype names; resolved in [`build`](Self::build).
    pub fn add_join_list(&mut self, names: Vec<String>) -> &mut Self {
        self.join_lists.push(names);
        self
    }

    pub fn type_names(&mut self, names: TypeNames) -> &mut Self {
        self.type_names = names;
        self
    }

    pub fn positions(&mut self, table: MultiPositionTable) -> &mut Self {
        self.positions = Some(table);
        self
    }

    /// Build the registry.
    ///
    /// Duplicate names, broken multi-tile groups and invalid join lists are
    /// reported to `sink`; the registry is built from what remains.
    pub fn build(self, sink: &mut dyn DiagnosticSink) -> ArchetypeRegistry {
        let mut registry = ArchetypeRegistry {
            archetypes: self.archetypes,
            by_name: HashMap::new(),
            categories: BTreeMap::new(),
            join_lists: Vec::new(),
            type_names: self.type_names,
            positions: self.positions,
        };

        index_names(&mut registry, sink);
        check_multi_groups(&mut registry, sink);
        for names in self.join_lists {
            resolve_join_list(&mut registry, names, sink);
        }
        mark_lowest_parts(&mut registry);

        for arch in &registry.archetypes {
            if arch.is_tail() {
                continue;
            }
            if let Some(category) = &arch.category {
                registry
                    .categories
                    .entry(category.clone())
                    .or_default()
                    .push(arch.id);
            }
        }

        debug!(
            archetypes = registry.archetypes.len(),
            join_lists = registry.join_lists.len(),
            categories = registry.categories.len(),
            "Registry built"
        );
        registry
    }
}

fn index_names(registry: &mut ArchetypeRegistry, sink: &mut dyn DiagnosticSink) {
    for arch in &registry.archetypes {
        if registry.by_name.contains_key(&arch.name) {
            sink.warning(
                "archmap::ref::duplicate-archetype",
                format!("Archetype '{}' is defined more than once, keeping the first", arch.name),
            );
            continue;
        }
        registry.by_name.insert(arch.name.clone(), arch.id);
    }
}

/// Every head must be followed by exactly its tails.
fn check_multi_groups(registry: &mut ArchetypeRegistry, sink: &mut dyn DiagnosticSink) {
    for index in 0..registry.archetypes.len() {
        let head = &registry.archetypes[index];
        if head.is_tail() || head.multi.tail_count == 0 {
            continue;
        }
        let id = head.id;
        let expected = head.multi.tail_count;
        let found = registry.archetypes[index + 1..]
            .iter()
            .take(expected)
            .take_while(|a| a.multi.head == Some(id))
            .count();
        if found != expected {
            sink.error(
                "archmap::integrity::tail-count",
                format!(
                    "Multi-part archetype '{}' expects {} tails but has {}",
                    registry.archetypes[index].name, expected, found
                ),
            );
            registry.archetypes[index].multi.tail_count = found;
        }
    }
}

fn resolve_join_list(registry: &mut ArchetypeRegistry, names: Vec<String>, sink: &mut dyn DiagnosticSink) {
    let first = names.first().cloned().unwrap_or_default();
    if names.len() != JOIN_VARIANTS {
        sink.error(
            "archmap::config::join-list-size",
            format!(
                "Join list starting with '{}' has {} entries, expected {}",
                first,
                names.len(),
                JOIN_VARIANTS
            ),
        );
        return;
    }

    let mut entries = [ArchId(0); JOIN_VARIANTS];
    for (slot, name) in entries.iter_mut().zip(&names) {
        let Some(arch) = registry.by_name(name) else {
            sink.error(
                "archmap::ref::join-list-unknown",
                format!("Join list entry '{}' is not a known archetype", name),
            );
            return;
        };
        if arch.is_multi() {
            sink.error(
                "archmap::config::join-list-multi",
                format!("Join list entry '{}' is a multi-part archetype", name),
            );
            return;
        }
        *slot = arch.id;
    }

    let id = JoinListId(registry.join_lists.len());
    for arch_id in entries {
        let arch = &mut registry.archetypes[arch_id.index()];
        if arch.join_list.is_some() {
            sink.warning(
                "archmap::config::join-list-overlap",
                format!("Archetype '{}' already belongs to a join list", arch.name),
            );
            continue;
        }
        arch.join_list = Some(id);
    }
    registry.join_lists.push(JoinList::new(entries));
}

fn mark_lowest_parts(registry: &mut ArchetypeRegistry) {
    for index in 0..registry.archetypes.len() {
        let head = &registry.archetypes[index];
        if head.is_tail() || head.multi.tail_count == 0 {
            continue;
        }
        let shape = head.multi_shape_id;
        let group = index..=index + head.multi.tail_count;

        let offsets: Vec<i32> = registry.archetypes[group.clone()]
            .iter()
            .map(|part| {
                let part_shape = if part.multi_shape_id != 0 { part.multi_shape_id } else { shape };
                registry.part_offset(part_shape, part.multi_part_nr, part.multi.offset.1)
            })
            .collect();
        let Some(&lowest) = offsets.iter().min() else {
            continue;
        };
        for (part, offset) in registry.archetypes[group].iter_mut().zip(offsets) {
            part.lowest_part = offset == lowest;
        }
    }
}
