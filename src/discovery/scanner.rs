//! File system scanner for archetype and map files.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use super::config::Config;

/// Directory names never descended into.
const SKIPPED_DIRS: &[&str] = &["CVS", "dev"];

/// Kind of a discovered data file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Archetype,
    Map,
}

/// Result of scanning directories.
#[derive(Debug, Default)]
pub struct ScanResult {
    /// Discovered `.arc` files.
    pub archetypes: Vec<PathBuf>,
    /// Discovered map files.
    pub maps: Vec<PathBuf>,
}

impl ScanResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total(&self) -> usize {
        self.archetypes.len() + self.maps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    pub fn files_of_kind(&self, kind: FileKind) -> &[PathBuf] {
        match kind {
            FileKind::Archetype => &self.archetypes,
            FileKind::Map => &self.maps,
        }
    }

    pub fn merge(&mut self, other: ScanResult) {
        self.archetypes.extend(other.archetypes);
        self.maps.extend(other.maps);
    }
}

fn is_skipped(entry: &DirEntry) -> bool {
    if !entry.file_type().is_dir() || entry.depth() == 0 {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || SKIPPED_DIRS.contains(&name.as_ref())
}

/// Scan a directory for archetype and map files.
///
/// Files are returned sorted by path so loading order, and with it the
/// archetype ids, is stable.
pub fn scan_directory(root: &Path, config: &Config) -> ScanResult {
    let mut result = ScanResult::new();

    if !root.exists() {
        return result;
    }

    for entry in WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_skipped(e))
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path);
        if config.is_excluded(relative) {
            continue;
        }

        match detect_file_kind(path) {
            Some(FileKind::Archetype) => result.archetypes.push(path.to_path_buf()),
            Some(FileKind::Map) => result.maps.push(path.to_path_buf()),
            None => {}
        }
    }

    result
}

/// Scan multiple source directories relative to `base_path`.
pub fn scan_sources(sources: &[String], base_path: &Path, config: &Config) -> ScanResult {
    let mut result = ScanResult::new();
    for source in sources {
        let path = Config::resolve(base_path, Path::new(source));
        result.merge(scan_directory(&path, config));
    }
    result
}

/// Detect the kind of a data file.
///
/// `.arc` files are archetypes. Map files usually have no extension, so
/// any other file whose first non-blank line is `arch map` is a map.
pub fn detect_file_kind(path: &Path) -> Option<FileKind> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("arc") => return Some(FileKind::Archetype),
        Some("map") => return Some(FileKind::Map),
        _ => {}
    }

    let file = File::open(path).ok()?;
    let first = BufReader::new(file)
        .lines()
        .map_while(|l| l.ok())
        .find(|l| !l.trim().is_empty())?;
    (first.trim() == "arch map").then_some(FileKind::Map)
}
