//! Type-number display names.
//!
//! What a type number means is external data; the registry only maps
//! numbers to names for display.

use std::collections::BTreeMap;
use std::fmt;

/// Configured type names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeNames {
    names: BTreeMap<i32, String>,
}

impl TypeNames {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, type_no: i32, name: impl Into<String>) {
        self.names.insert(type_no, name.into());
    }

    /// Name for a type number, `*UNKNOWN<n>*` when none is configured.
    pub fn name(&self, type_no: i32) -> TypeName<'_> {
        match self.names.get(&type_no) {
            Some(name) => TypeName::Known(name),
            None => TypeName::Unknown(type_no),
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl FromIterator<(i32, String)> for TypeNames {
    fn from_iter<I: IntoIterator<Item = (i32, String)>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().collect(),
        }
    }
}

/// Display name of a type number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeName<'a> {
    Known(&'a str),
    Unknown(i32),
}

impl TypeName<'_> {
    pub fn is_known(&self) -> bool {
        matches!(self, TypeName::Known(_))
    }
}

impl fmt::Display for TypeName<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeName::Known(name) => f.write_str(name),
            TypeName::Unknown(n) => write!(f, "*UNKNOWN{}*", n),
        }
    }
}
