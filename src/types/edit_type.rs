//! Edit-type classification used to filter instances for bulk operations.

use crate::diff::attribute_value;

use super::archetype::Archetype;

bitflags::bitflags! {
    /// Classification bits. An instance may carry several.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct EditType: u32 {
        const MONSTER = 1 << 0;
        const EXIT = 1 << 1;
        const BACKGROUND = 1 << 2;
        const DOOR = 1 << 3;
        const WALL = 1 << 4;
        const EQUIP = 1 << 5;
        const TREASURE = 1 << 6;
        const CONNECTED = 1 << 7;
    }
}

const EXIT_TYPES: &[i32] = &[66, 41, 95];
const TREASURE_TYPES: &[i32] = &[4, 5, 36, 60, 85, 111, 123, 124, 130];
const DOOR_TYPES: &[i32] = &[20, 23, 26, 91, 21, 24];
const EQUIP_TYPES: &[i32] = &[
    13, 14, 15, 16, 33, 34, 35, 39, 70, 87, 99, 100, 104, 109, 113, 122, 3,
];

impl EditType {
    /// Parse a lowercase edit-type name as used in `archmap.yaml`.
    pub fn from_config_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "monster" => Some(Self::MONSTER),
            "exit" => Some(Self::EXIT),
            "background" => Some(Self::BACKGROUND),
            "door" => Some(Self::DOOR),
            "wall" => Some(Self::WALL),
            "equip" => Some(Self::EQUIP),
            "treasure" => Some(Self::TREASURE),
            "connected" => Some(Self::CONNECTED),
            _ => None,
        }
    }
}

/// Recompute the bits in `mask` for an object.
///
/// Bits outside `mask` are taken from `current` unchanged. Attribute values
/// are looked up in the delta lines first, then in the archetype.
pub fn calculate_edit_type(
    current: EditType,
    delta: &[String],
    arch: &Archetype,
    type_no: i32,
    mask: EditType,
) -> EditType {
    if mask.is_empty() {
        return current;
    }

    let value = |key: &str| attribute_value(delta, &arch.attributes, key);
    let mut edit_type = current - mask;

    if mask.contains(EditType::BACKGROUND) && value("is_floor") == 1 && value("no_pick") == 1 {
        edit_type |= EditType::BACKGROUND;
    }
    if mask.contains(EditType::MONSTER)
        && value("alive") == 1
        && (value("monster") == 1 || value("generator") == 1)
    {
        edit_type |= EditType::MONSTER;
    }
    if mask.contains(EditType::WALL) && type_no == 0 && value("no_pass") == 1 {
        edit_type |= EditType::WALL;
    }
    if mask.contains(EditType::CONNECTED) && value("connected") != 0 {
        edit_type |= EditType::CONNECTED;
    }
    if mask.contains(EditType::EXIT) && EXIT_TYPES.contains(&type_no) {
        edit_type |= EditType::EXIT;
    }
    if mask.contains(EditType::TREASURE)
        && value("no_pick") == 0
        && TREASURE_TYPES.contains(&type_no)
    {
        edit_type |= EditType::TREASURE;
    }
    if mask.contains(EditType::DOOR) && DOOR_TYPES.contains(&type_no) {
        edit_type |= EditType::DOOR;
    }
    if mask.contains(EditType::EQUIP) && value("no_pick") == 0 && EQUIP_TYPES.contains(&type_no) {
        edit_type |= EditType::EQUIP;
    }

    edit_type
}
