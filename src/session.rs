//! Editing session: the loaded registry plus the maps opened against it.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use crate::discovery::DiscoveryResult;
use crate::error::{ArchError, Result};
use crate::map::{MapModel, SharedMap};
use crate::parser::{decode_map, encode_map};
use crate::registry::ArchetypeRegistry;
use crate::types::{EditType, FaceLookup, FaceSet, MapHeader};
use crate::validation::{validate_map, DiagnosticSink, Diagnostics};

/// Owns the archetype registry and every open map.
#[derive(Debug)]
pub struct EditSession {
    registry: Arc<ArchetypeRegistry>,
    faces: Option<FaceSet>,
    edit_types: EditType,
    maps: BTreeMap<PathBuf, SharedMap>,
}

impl EditSession {
    pub fn new(registry: impl Into<Arc<ArchetypeRegistry>>) -> Self {
        Self {
            registry: registry.into(),
            faces: None,
            edit_types: EditType::empty(),
            maps: BTreeMap::new(),
        }
    }

    /// Load the registry, faces and edit types of a discovered project.
    pub fn from_project(project: &DiscoveryResult, sink: &mut dyn DiagnosticSink) -> Result<Self> {
        let registry = project.load_registry(sink)?;
        let mut session = Self::new(registry)
            .with_edit_types(project.config.active_edit_types()?);
        session.faces = project.load_faces()?;
        Ok(session)
    }

    /// Edit types calculated for every map opened from now on.
    pub fn with_edit_types(mut self, edit_types: EditType) -> Self {
        self.edit_types = edit_types;
        self
    }

    pub fn with_faces(mut self, faces: FaceSet) -> Self {
        self.faces = Some(faces);
        self
    }

    pub fn registry(&self) -> &Arc<ArchetypeRegistry> {
        &self.registry
    }

    pub fn faces(&self) -> Option<&FaceSet> {
        self.faces.as_ref()
    }

    /// Open maps by path.
    pub fn maps(&self) -> impl Iterator<Item = (&Path, &SharedMap)> {
        self.maps.iter().map(|(path, map)| (path.as_path(), map))
    }

    pub fn get(&self, path: &Path) -> Option<&SharedMap> {
        self.maps.get(path)
    }

    /// Open a map file.
    ///
    /// A map that is already open is returned as is. Read failures and a
    /// missing header fail the whole open; everything else is reported to
    /// `sink` and the map is loaded as far as possible.
    pub fn open_map(&mut self, path: &Path, sink: &mut dyn DiagnosticSink) -> Result<SharedMap> {
        if let Some(map) = self.maps.get(path) {
            return Ok(map.clone());
        }

        let source = fs::read_to_string(path).map_err(|e| ArchError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let mut map = decode_map(&source, Arc::clone(&self.registry), sink)?;
        if !self.edit_types.is_empty() {
            map.set_active_edit_types(self.edit_types);
        }
        info!(
            path = %path.display(),
            width = map.width(),
            height = map.height(),
            instances = map.instance_count(),
            "Opened map"
        );

        let shared = SharedMap::new(map);
        self.maps.insert(path.to_path_buf(), shared.clone());
        Ok(shared)
    }

    /// Create an empty map that will be written to `path`.
    pub fn new_map(&mut self, path: &Path, name: &str, width: usize, height: usize) -> SharedMap {
        let mut map = MapModel::with_header(Arc::clone(&self.registry), MapHeader::new(name, width, height));
        if !self.edit_types.is_empty() {
            map.set_active_edit_types(self.edit_types);
        }
        debug!(path = %path.display(), width, height, "Created map");

        let shared = SharedMap::new(map);
        self.maps.insert(path.to_path_buf(), shared.clone());
        shared
    }

    /// Validate and write an open map.
    ///
    /// Link errors are repaired before writing. Returns the diagnostics of
    /// the validation run.
    pub fn save_map(&self, path: &Path) -> Result<Diagnostics> {
        let shared = self.maps.get(path).ok_or_else(|| ArchError::Io {
            path: path.to_path_buf(),
            message: "map is not open".to_string(),
        })?;

        let faces = self.faces.as_ref().map(|f| f as &dyn FaceLookup);
        let mut diagnostics = validate_map(&shared.read(), faces);
        if diagnostics.has_errors() {
            let repaired = shared.write().repair_links();
            debug!(repaired, "Repaired links before saving");
            diagnostics.merge(shared.write().take_diagnostics());
        }

        let text = encode_map(&shared.read());
        write_atomic(path, &text)?;
        info!(path = %path.display(), bytes = text.len(), "Saved map");
        Ok(diagnostics)
    }

    /// Close a map without saving.
    pub fn close_map(&mut self, path: &Path) -> Option<SharedMap> {
        self.maps.remove(path)
    }
}

/// Write through a temporary sibling so a failed write keeps the old file.
fn write_atomic(path: &Path, text: &str) -> Result<()> {
    let io_error = |e: std::io::Error| ArchError::Io {
        path: path.to_path_buf(),
        message: e.to_string(),
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_error)?;
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, text).map_err(io_error)?;
    fs::rename(&tmp, path).map_err(io_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::PlaceOptions;
    use crate::testing::registry;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn session() -> EditSession {
        EditSession::new(registry())
    }

    #[test]
    fn test_new_save_open_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("maps/town");
        let mut session = session();

        let map = session.new_map(&path, "town", 4, 4);
        {
            let mut map = map.write();
            let floor = map.registry().id_of("floor").unwrap();
            map.add_arch(floor, 1, 2, PlaceOptions::default()).unwrap();
        }
        let diagnostics = session.save_map(&path).unwrap();
        assert!(diagnostics.is_ok());
        let written = fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("arch map\nname town\n"));

        session.close_map(&path);
        let mut sink = Diagnostics::new();
        let reopened = session.open_map(&path, &mut sink).unwrap();
        assert_eq!(encode_map(&reopened.read()), written);
        assert_eq!(session.maps().count(), 1);
    }

    #[test]
    fn test_open_missing_file_fails() {
        let dir = tempdir().unwrap();
        let mut session = session();
        let mut sink = Diagnostics::new();
        let err = session.open_map(&dir.path().join("nope"), &mut sink).unwrap_err();
        assert!(matches!(err, ArchError::Io { .. }));
        assert_eq!(session.maps().count(), 0);
    }

    #[test]
    fn test_open_twice_shares_map() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("m");
        fs::write(&path, "arch map\nwidth 2\nheight 2\nend\n").unwrap();

        let mut session = session();
        let mut sink = Diagnostics::new();
        let a = session.open_map(&path, &mut sink).unwrap();
        let b = session.open_map(&path, &mut sink).unwrap();
        a.resize(3, 3);
        assert_eq!(b.read().width(), 3);
    }

    #[test]
    fn test_open_applies_edit_types() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("m");
        fs::write(&path, "arch map\nwidth 2\nheight 2\nend\narch orc\nend\n").unwrap();

        let mut session = session().with_edit_types(EditType::MONSTER);
        let mut sink = Diagnostics::new();
        let map = session.open_map(&path, &mut sink).unwrap();
        assert_eq!(map.read().filter(EditType::MONSTER).len(), 1);
    }

    #[test]
    fn test_save_unknown_path_fails() {
        let session = session();
        assert!(session.save_map(Path::new("not/open")).is_err());
    }
}
