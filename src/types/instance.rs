//! Placed objects.
//!
//! An instance references one archetype and stores only what differs from
//! it. Every structured override is an `Option`: `None` inherits from the
//! archetype, `Some("")` is an explicit empty value.

use std::fmt;

use super::archetype::{ArchId, Archetype};
use super::edit_type::EditType;

/// Handle of an instance inside one map. Handles are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(pub(crate) usize);

impl InstanceId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.0)
    }
}

/// Where an instance lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Location {
    #[default]
    Detached,
    /// In a cell stack at the instance's `x`/`y`.
    Grid,
    /// In the inventory of another instance.
    Inventory(InstanceId),
}

/// A placed or owned object.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Instance {
    /// Resolved archetype; `None` when the name is unknown to the registry.
    pub arch: Option<ArchId>,
    pub arch_name: String,
    pub x: i32,
    pub y: i32,
    pub location: Location,

    /// Neighbours in the cell stack or inventory list (bottom to top).
    pub prev: Option<InstanceId>,
    pub next: Option<InstanceId>,
    pub inv_first: Option<InstanceId>,
    pub inv_last: Option<InstanceId>,

    pub multi_head: Option<InstanceId>,
    pub multi_next: Option<InstanceId>,

    pub name: Option<String>,
    pub msg: Option<String>,
    pub lore: Option<String>,
    pub type_no: Option<i32>,
    pub direction: Option<i32>,
    pub anim_name: Option<String>,
    pub face: Option<String>,

    /// Delta attribute lines.
    pub attributes: Vec<String>,
    /// Raw body of an `anim … mina` block.
    pub anim: Option<String>,
    /// `None` until calculated.
    pub edit_type: Option<EditType>,
    pub multi_shape_id: Option<i32>,
    pub multi_part_nr: Option<i32>,
    pub lowest_part: bool,
}

impl Instance {
    /// An unresolved instance referring to an archetype by name.
    pub fn named(arch_name: impl Into<String>) -> Self {
        Self {
            arch_name: arch_name.into(),
            ..Default::default()
        }
    }

    /// A fresh clone of an archetype with no overrides.
    pub fn from_archetype(arch: &Archetype) -> Self {
        Self {
            arch: Some(arch.id),
            arch_name: arch.name.clone(),
            lowest_part: arch.lowest_part,
            ..Default::default()
        }
    }

    pub fn is_tail(&self) -> bool {
        self.multi_head.is_some()
    }

    /// Whether the instance is linked into a multi-tile chain.
    pub fn in_multi_chain(&self) -> bool {
        self.multi_head.is_some() || self.multi_next.is_some()
    }

    pub fn is_detached(&self) -> bool {
        self.location == Location::Detached
    }

    pub fn container(&self) -> Option<InstanceId> {
        match self.location {
            Location::Inventory(container) => Some(container),
            _ => None,
        }
    }

    pub fn effective_type(&self, arch: Option<&Archetype>) -> i32 {
        self.type_no
            .unwrap_or_else(|| arch.map_or(0, |a| a.type_no))
    }

    pub fn effective_direction(&self, arch: Option<&Archetype>) -> i32 {
        self.direction
            .unwrap_or_else(|| arch.map_or(0, |a| a.direction))
    }

    pub fn effective_face<'a>(&'a self, arch: Option<&'a Archetype>) -> Option<&'a str> {
        self.face
            .as_deref()
            .or_else(|| arch.and_then(|a| a.face.as_deref()))
    }

    pub fn effective_name<'a>(&'a self, arch: Option<&'a Archetype>) -> &'a str {
        self.name
            .as_deref()
            .or_else(|| arch.and_then(|a| a.object_name.as_deref()))
            .unwrap_or(&self.arch_name)
    }

    /// Clear every link field.
    pub(crate) fn clear_links(&mut self) {
        self.location = Location::Detached;
        self.prev = None;
        self.next = None;
        self.inv_first = None;
        self.inv_last = None;
        self.multi_head = None;
        self.multi_next = None;
    }
}
