//! Core domain types for archmap.
//!
//! - `Archetype` - immutable object templates
//! - `Instance` - placed objects referencing an archetype plus overrides
//! - `MapHeader` - map-level metadata
//! - `EditType` - classification bits for bulk operations
//! - `ScriptedEvent` - script bindings stored as inventory objects

mod archetype;
mod edit_type;
mod event;
mod face;
mod header;
mod instance;
mod position;

pub use archetype::{ArchId, Archetype, MultiPart};
pub use edit_type::{calculate_edit_type, EditType};
pub use event::{event_kind_name, EventKind, ScriptedEvent, DEFAULT_PLUGIN, EVENT_TYPE};
pub use face::{FaceHandle, FaceLookup, FaceSet};
pub use header::{MapFlags, MapHeader, DEFAULT_FILENAME, DEFAULT_MAP_NAME, TILE_PATH_COUNT};
pub use instance::{Instance, InstanceId, Location};
pub use position::{MultiPositionTable, ROW_LEN, SHAPE_ROWS, TILE_ISO_YLEN};
