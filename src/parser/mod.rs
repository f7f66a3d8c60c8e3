//! Text codecs for archetype definitions and map files.
//!
//! All formats are line oriented. Parsers never stop at malformed content:
//! they report it to a [`DiagnosticSink`](crate::validation::DiagnosticSink)
//! and keep going. Only a map file without a header fails outright.
//!
//! # Usage
//!
//! ```ignore
//! use archmap::parser::{decode_map, encode_map};
//! use archmap::validation::Diagnostics;
//!
//! let mut diagnostics = Diagnostics::new();
//! let map = decode_map(&source, registry.clone(), &mut diagnostics)?;
//! std::fs::write(path, encode_map(&map))?;
//! ```

mod archetype;
mod artifact;
mod encode;
mod header;
mod joinlist;
mod lines;
mod map;
mod position;

pub use archetype::parse_archetypes;
pub use artifact::{parse_artifacts, ARTIFACT_CATEGORY};
pub use encode::encode_map;
pub use joinlist::parse_join_lists;
pub use map::decode_map;
pub use position::parse_positions;
