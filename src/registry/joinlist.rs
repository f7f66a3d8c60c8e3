//! Join lists: 16 archetype variants selected by a neighbour bitmask.

use std::fmt;

use crate::types::ArchId;

/// Number of entries in a join list.
pub const JOIN_VARIANTS: usize = 16;

/// Index of a join list in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JoinListId(pub usize);

/// Neighbour direction and its mask bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    pub fn bit(self) -> u8 {
        match self {
            Direction::North => 1,
            Direction::East => 2,
            Direction::South => 4,
            Direction::West => 8,
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
        }
    }

    /// Cell offset of the neighbour in this direction. North is `y + 1`.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::North => (0, 1),
            Direction::East => (1, 0),
            Direction::South => (0, -1),
            Direction::West => (-1, 0),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::North => "north",
            Direction::East => "east",
            Direction::South => "south",
            Direction::West => "west",
        };
        f.write_str(name)
    }
}

/// A resolved join list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinList {
    entries: [ArchId; JOIN_VARIANTS],
}

impl JoinList {
    pub fn new(entries: [ArchId; JOIN_VARIANTS]) -> Self {
        Self { entries }
    }

    /// Variant for a neighbour mask; only the low four bits are used.
    pub fn get(&self, mask: u8) -> ArchId {
        self.entries[usize::from(mask & 0x0f)]
    }

    /// Mask under which `arch` appears in this list.
    pub fn index_of(&self, arch: ArchId) -> Option<u8> {
        self.entries
            .iter()
            .position(|&e| e == arch)
            .and_then(|i| u8::try_from(i).ok())
    }

    pub fn contains(&self, arch: ArchId) -> bool {
        self.entries.contains(&arch)
    }

    pub fn entries(&self) -> &[ArchId] {
        &self.entries
    }
}
