//! Map-level metadata stored in the `arch map … end` block.

/// Header name of a freshly created map.
pub const DEFAULT_MAP_NAME: &str = "<untitled>";
/// Filename of a map that has never been saved.
pub const DEFAULT_FILENAME: &str = "<new map>";
/// Number of neighbouring map slots (`tile_path_1` … `tile_path_8`).
pub const TILE_PATH_COUNT: usize = 8;

bitflags::bitflags! {
    /// Boolean map attributes, written as `<key> 1`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct MapFlags: u16 {
        const NO_SAVE = 1 << 0;
        const NO_MAGIC = 1 << 1;
        const NO_PRIEST = 1 << 2;
        const NO_SUMMON = 1 << 3;
        const NO_HARM = 1 << 4;
        const FIXED_LOGIN = 1 << 5;
        const PERM_DEATH = 1 << 6;
        const ULTRA_DEATH = 1 << 7;
        const ULTIMATE_DEATH = 1 << 8;
        const PVP = 1 << 9;
        const PLUGINS = 1 << 10;
    }
}

impl MapFlags {
    /// Flag keys in file order.
    pub const KEYS: [(MapFlags, &'static str); 11] = [
        (MapFlags::NO_SAVE, "no_save"),
        (MapFlags::NO_MAGIC, "no_magic"),
        (MapFlags::NO_PRIEST, "no_priest"),
        (MapFlags::NO_SUMMON, "no_summon"),
        (MapFlags::NO_HARM, "no_harm"),
        (MapFlags::FIXED_LOGIN, "fixed_login"),
        (MapFlags::PERM_DEATH, "perm_death"),
        (MapFlags::ULTRA_DEATH, "ultra_death"),
        (MapFlags::ULTIMATE_DEATH, "ultimate_death"),
        (MapFlags::PVP, "pvp"),
        (MapFlags::PLUGINS, "plugins"),
    ];

    pub fn from_key(key: &str) -> Option<MapFlags> {
        Self::KEYS
            .iter()
            .find(|(_, k)| *k == key)
            .map(|(flag, _)| *flag)
    }
}

/// Map header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapHeader {
    pub name: String,
    /// Path the map was loaded from; not part of the file content.
    pub filename: String,
    pub width: usize,
    pub height: usize,
    pub bg_music: Option<String>,
    pub msg: String,
    pub lore: String,
    pub enter_x: i32,
    pub enter_y: i32,
    pub reset_timeout: i32,
    pub swap_time: i32,
    pub difficulty: i32,
    /// `-1` when unset.
    pub darkness: i32,
    pub fixed_resettime: bool,
    pub unique: bool,
    pub outdoor: bool,
    pub temp: i32,
    pub pressure: i32,
    pub humid: i32,
    pub windspeed: i32,
    pub winddir: i32,
    pub sky: i32,
    pub flags: MapFlags,
    pub tile_paths: [Option<String>; TILE_PATH_COUNT],
    /// Unrecognized header lines, written back after the known fields.
    pub extra: Vec<String>,
}

impl Default for MapHeader {
    fn default() -> Self {
        Self {
            name: DEFAULT_MAP_NAME.to_string(),
            filename: DEFAULT_FILENAME.to_string(),
            width: 0,
            height: 0,
            bg_music: None,
            msg: String::new(),
            lore: String::new(),
            enter_x: 0,
            enter_y: 0,
            reset_timeout: 0,
            swap_time: 0,
            difficulty: 0,
            darkness: -1,
            fixed_resettime: false,
            unique: false,
            outdoor: false,
            temp: 0,
            pressure: 0,
            humid: 0,
            windspeed: 0,
            winddir: 0,
            sky: 0,
            flags: MapFlags::empty(),
            tile_paths: Default::default(),
            extra: Vec::new(),
        }
    }
}

impl MapHeader {
    pub fn new(name: impl Into<String>, width: usize, height: usize) -> Self {
        Self {
            name: name.into(),
            width,
            height,
            ..Default::default()
        }
    }
}
