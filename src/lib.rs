//! archmap - Map editing toolkit for tile-based RPG worlds
//!
//! A library for loading archetype definitions, editing maps made of
//! archetype instances, and reading and writing both in their line-oriented
//! text formats.

pub mod cli;
pub mod diff;
pub mod discovery;
pub mod error;
pub mod map;
pub mod output;
pub mod parser;
pub mod registry;
pub mod session;
pub mod types;
pub mod validation;

#[cfg(test)]
mod testing;

pub use discovery::{discover, load_registry, Config, DiscoveryResult, ScanResult};
pub use error::{ArchError, EditError, Result};
pub use map::{MapModel, MultiState, PlaceOptions, SharedMap};
pub use parser::{decode_map, encode_map, parse_archetypes};
pub use registry::{ArchetypeRegistry, Direction, JoinListId, RegistryBuilder};
pub use session::EditSession;
pub use types::{
    ArchId, Archetype, EditType, FaceLookup, FaceSet, Instance, InstanceId, Location, MapHeader,
    ScriptedEvent,
};
pub use validation::{validate_map, Diagnostic, DiagnosticSink, Diagnostics, Severity};
