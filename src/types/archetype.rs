//! Archetypes: the immutable templates every placed object refers to.
//!
//! An archetype file is a sequence of `Object <name> … end` blocks. A block
//! preceded by `More` is a tail of the most recent head and carries its
//! offset relative to that head.
//!
//! ```text
//! Object bigdoor
//! type 20
//! face bigdoor.111
//! end
//! More
//! Object bigdoor_2
//! x 1
//! end
//! ```

use std::fmt;

use serde::Serialize;

use crate::registry::JoinListId;

use super::edit_type::EditType;

/// Registry index of an archetype.
///
/// The tails of a multi-tile archetype follow their head directly, so the
/// tail with sub-index `i` (1-based) of head `h` is `h + i`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ArchId(pub usize);

impl ArchId {
    pub fn index(self) -> usize {
        self.0
    }

    /// Id `n` slots after this one.
    pub fn offset(self, n: usize) -> ArchId {
        ArchId(self.0 + n)
    }
}

impl fmt::Display for ArchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Multi-tile descriptor of an archetype.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultiPart {
    /// Head archetype, set on tails only.
    pub head: Option<ArchId>,
    /// Number of tails, set on heads only.
    pub tail_count: usize,
    /// Offset of a tail relative to its head, in cells.
    pub offset: (i32, i32),
}

impl MultiPart {
    pub fn is_tail(&self) -> bool {
        self.head.is_some()
    }

    pub fn is_head(&self) -> bool {
        self.head.is_none() && self.tail_count > 0
    }

    /// Whether the archetype is any part of a multi-tile object.
    pub fn is_multi(&self) -> bool {
        self.is_tail() || self.is_head()
    }
}

/// An archetype definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Archetype {
    pub id: ArchId,
    pub name: String,
    /// Object name promoted from a `name` line.
    pub object_name: Option<String>,
    /// Opaque attribute lines, trimmed, in file order.
    pub attributes: Vec<String>,
    pub msg: Option<String>,
    pub lore: Option<String>,
    /// Raw body of an `anim … mina` block.
    pub anim: Option<String>,
    pub anim_name: Option<String>,
    pub direction: i32,
    pub type_no: i32,
    pub face: Option<String>,
    pub multi: MultiPart,
    pub multi_shape_id: i32,
    pub multi_part_nr: i32,
    pub lowest_part: bool,
    pub category: Option<String>,
    pub edit_type: EditType,
    pub join_list: Option<JoinListId>,
    pub artifact: bool,
}

impl Archetype {
    /// Create an empty archetype. The id is assigned by the registry.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: ArchId(0),
            name: name.into(),
            object_name: None,
            attributes: Vec::new(),
            msg: None,
            lore: None,
            anim: None,
            anim_name: None,
            direction: 0,
            type_no: 0,
            face: None,
            multi: MultiPart::default(),
            multi_shape_id: 0,
            multi_part_nr: 0,
            lowest_part: false,
            category: None,
            edit_type: EditType::empty(),
            join_list: None,
            artifact: false,
        }
    }

    /// Add an attribute line.
    pub fn with_attribute(mut self, line: impl Into<String>) -> Self {
        self.attributes.push(line.into());
        self
    }

    pub fn with_type(mut self, type_no: i32) -> Self {
        self.type_no = type_no;
        self
    }

    pub fn with_face(mut self, face: impl Into<String>) -> Self {
        let face = face.into();
        self.attributes.push(format!("face {}", face));
        self.face = Some(face);
        self
    }

    pub fn is_tail(&self) -> bool {
        self.multi.is_tail()
    }

    pub fn is_multi(&self) -> bool {
        self.multi.is_multi()
    }

    /// Message text, empty when the archetype has none.
    pub fn msg_text(&self) -> &str {
        self.msg.as_deref().unwrap_or("")
    }

    pub fn lore_text(&self) -> &str {
        self.lore.as_deref().unwrap_or("")
    }
}
