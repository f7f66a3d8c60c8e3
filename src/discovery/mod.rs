//! Project discovery and archetype loading.
//!
//! A project is a directory with an optional `archmap.yaml`. Discovery
//! reads the configuration, finds the map files and loads the archetype
//! registry the maps refer to.
//!
//! # Example
//!
//! ```ignore
//! use archmap::discovery::discover;
//! use archmap::validation::Diagnostics;
//!
//! let project = discover("./world")?;
//! println!("Found {} maps", project.scan.maps.len());
//!
//! let mut diagnostics = Diagnostics::new();
//! let registry = project.load_registry(&mut diagnostics)?;
//! ```

mod config;
mod loader;
mod scanner;

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::registry::ArchetypeRegistry;
use crate::types::FaceSet;
use crate::validation::DiagnosticSink;

pub use config::Config;
pub use loader::{category_of, load_builder, load_faces, load_registry};
pub use scanner::{detect_file_kind, scan_directory, scan_sources, FileKind, ScanResult};

/// The name of the configuration file.
pub const CONFIG_FILENAME: &str = "archmap.yaml";

/// Result of discovering a project.
#[derive(Debug)]
pub struct DiscoveryResult {
    /// The project root directory.
    pub root: PathBuf,

    /// The loaded configuration (default if no archmap.yaml was found).
    pub config: Config,

    /// Whether an archmap.yaml was found.
    pub has_config: bool,

    /// Map files found in the configured map directories.
    pub scan: ScanResult,
}

impl DiscoveryResult {
    /// Load the archetype registry of the project.
    pub fn load_registry(&self, sink: &mut dyn DiagnosticSink) -> Result<ArchetypeRegistry> {
        load_registry(&self.config, &self.root, sink)
    }

    /// Load the configured face list.
    pub fn load_faces(&self) -> Result<Option<FaceSet>> {
        load_faces(&self.config, &self.root)
    }
}

/// Discover a project directory.
///
/// Looks for `archmap.yaml` in `root` and scans the configured map
/// directories. Archetypes are not loaded until
/// [`DiscoveryResult::load_registry`] is called.
pub fn discover(root: impl AsRef<Path>) -> Result<DiscoveryResult> {
    let root = root.as_ref().to_path_buf();

    let config_path = root.join(CONFIG_FILENAME);
    let (config, has_config) = if config_path.exists() {
        (Config::load(&config_path)?, true)
    } else {
        (Config::default(), false)
    };

    let mut scan = scan_sources(&config.maps, &root, &config);
    scan.archetypes.clear();

    Ok(DiscoveryResult {
        root,
        config,
        has_config,
        scan,
    })
}

/// Find the project root for a path: the closest ancestor directory
/// holding an `archmap.yaml`, or the path's own directory.
pub fn find_root(path: &Path) -> PathBuf {
    let start = if path.is_dir() {
        path
    } else {
        path.parent().unwrap_or(path)
    };
    start
        .ancestors()
        .find(|dir| dir.join(CONFIG_FILENAME).is_file())
        .unwrap_or(start)
        .to_path_buf()
}
