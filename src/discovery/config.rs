//! Project configuration (archmap.yaml) parsing.
//!
//! The configuration names the archetype data files and the map source
//! directories. Every field has a default, so an empty file is valid.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ArchError, Result};
use crate::registry::TypeNames;
use crate::types::EditType;

/// Project configuration loaded from archmap.yaml.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding `.arc` archetype files.
    pub archetypes: PathBuf,

    /// Single collected archetype file, used instead of the directory when present.
    pub collected: PathBuf,

    /// Artifacts file.
    pub artifacts: PathBuf,

    /// Autojoin list file.
    pub autojoin: PathBuf,

    /// Multi-position table.
    pub positions: PathBuf,

    /// Face list used by validation.
    pub faces: Option<PathBuf>,

    /// Directories scanned for map files.
    pub maps: Vec<String>,

    /// Patterns to exclude from discovery.
    pub excludes: Vec<String>,

    /// Edit types computed for every loaded map.
    pub edit_types: Vec<String>,

    /// Display names of type numbers.
    pub type_names: BTreeMap<i32, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            archetypes: PathBuf::from("arch"),
            collected: PathBuf::from("archetypes"),
            artifacts: PathBuf::from("artifacts"),
            autojoin: PathBuf::from("autojoin.txt"),
            positions: PathBuf::from("multi_positions"),
            faces: None,
            maps: vec!["maps".to_string()],
            excludes: vec![],
            edit_types: vec![],
            type_names: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Load configuration from an archmap.yaml file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ArchError::Io {
            path: path.to_path_buf(),
            message: format!("Failed to read configuration: {}", e),
        })?;

        Self::parse(&content)
    }

    /// Parse configuration from YAML string.
    pub fn parse(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|e| ArchError::Config {
            message: format!("Invalid configuration: {}", e),
            help: Some("Check archmap.yaml syntax".to_string()),
        })
    }

    /// Serialize to YAML.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| ArchError::Config {
            message: e.to_string(),
            help: None,
        })
    }

    /// Combined edit-type mask of `edit_types`.
    pub fn active_edit_types(&self) -> Result<EditType> {
        self.edit_types.iter().try_fold(EditType::empty(), |mask, name| {
            EditType::from_config_name(name)
                .map(|bit| mask | bit)
                .ok_or_else(|| ArchError::Config {
                    message: format!("Unknown edit type '{}'", name),
                    help: Some(
                        "Use monster, exit, background, door, wall, equip, treasure or connected"
                            .to_string(),
                    ),
                })
        })
    }

    pub fn type_names(&self) -> TypeNames {
        self.type_names
            .iter()
            .map(|(&n, name)| (n, name.clone()))
            .collect()
    }

    /// Resolve a configured path against the project root.
    pub fn resolve(root: &Path, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            root.join(path)
        }
    }

    /// Check if a path should be excluded based on exclude patterns.
    pub fn is_excluded(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy().replace('\\', "/");
        self.excludes
            .iter()
            .any(|pattern| Self::matches_pattern(&path_str, pattern))
    }

    /// Simple glob pattern matching.
    fn matches_pattern(path: &str, pattern: &str) -> bool {
        if let Some(suffix) = pattern.strip_prefix("**/") {
            if let Some(dir) = suffix.strip_suffix("/*") {
                return path.starts_with(&format!("{}/", dir)) || path.contains(&format!("/{}/", dir));
            }
            return path.ends_with(suffix) || path.contains(&format!("/{}/", suffix));
        }

        if let Some(suffix) = pattern.strip_prefix('*') {
            if !pattern.contains('/') {
                return path.ends_with(suffix);
            }
        }

        if let Some(prefix) = pattern.strip_suffix("/*") {
            return path.starts_with(&format!("{}/", prefix)) || path.contains(&format!("/{}/", prefix));
        }

        path.contains(pattern)
    }
}
