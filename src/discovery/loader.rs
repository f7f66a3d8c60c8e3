//! Registry loader - parses archetype data files into a registry.

use std::fs;
use std::path::{Component, Path};

use tracing::{debug, info};

use crate::error::{ArchError, Result};
use crate::parser::{parse_archetypes, parse_artifacts, parse_join_lists, parse_positions};
use crate::registry::{ArchetypeRegistry, RegistryBuilder};
use crate::types::FaceSet;
use crate::validation::DiagnosticSink;

use super::config::Config;
use super::scanner::scan_directory;

/// Number of directory levels that make up a category.
const CATEGORY_DEPTH: usize = 2;

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| ArchError::Io {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Category of an archetype file: its first and second level directory
/// below the archetype root, joined with `/`.
pub fn category_of(root: &Path, file: &Path) -> Option<String> {
    let relative = file.strip_prefix(root).ok()?;
    let dirs: Vec<String> = relative
        .parent()?
        .components()
        .filter_map(|c| match c {
            Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
            _ => None,
        })
        .take(CATEGORY_DEPTH)
        .collect();
    (!dirs.is_empty()).then(|| dirs.join("/"))
}

/// Load archetypes into a builder.
///
/// The collected archetype file is used when it exists; otherwise every
/// `.arc` file below the archetype directory is parsed. Artifacts, autojoin
/// lists, the position table and type names follow. Files that cannot be
/// read are collected and reported together; malformed content goes to
/// `sink`.
pub fn load_builder(config: &Config, root: &Path, sink: &mut dyn DiagnosticSink) -> Result<RegistryBuilder> {
    let mut builder = RegistryBuilder::new();
    let mut errors: Vec<String> = Vec::new();

    let collected = Config::resolve(root, &config.collected);
    if collected.is_file() {
        debug!(path = %collected.display(), "Loading collected archetypes");
        match read(&collected) {
            Ok(source) => {
                builder.add_archetypes(parse_archetypes(&source, None, sink));
            }
            Err(e) => errors.push(format!("{}: {}", collected.display(), e)),
        }
    } else {
        let arch_root = Config::resolve(root, &config.archetypes);
        let scan = scan_directory(&arch_root, config);
        for path in &scan.archetypes {
            match read(path) {
                Ok(source) => {
                    let category = category_of(&arch_root, path);
                    builder.add_archetypes(parse_archetypes(&source, category.as_deref(), sink));
                }
                Err(e) => errors.push(format!("{}: {}", path.display(), e)),
            }
        }
    }

    let artifacts = Config::resolve(root, &config.artifacts);
    if artifacts.is_file() {
        match read(&artifacts) {
            Ok(source) => {
                let parsed = parse_artifacts(&source, builder.archetypes(), sink);
                builder.add_archetypes(parsed);
            }
            Err(e) => errors.push(format!("{}: {}", artifacts.display(), e)),
        }
    }

    let autojoin = Config::resolve(root, &config.autojoin);
    if autojoin.is_file() {
        match read(&autojoin) {
            Ok(source) => {
                for names in parse_join_lists(&source, sink) {
                    builder.add_join_list(names);
                }
            }
            Err(e) => errors.push(format!("{}: {}", autojoin.display(), e)),
        }
    }

    let positions = Config::resolve(root, &config.positions);
    if positions.is_file() {
        match read(&positions) {
            Ok(source) => {
                builder.positions(parse_positions(&source, sink));
            }
            Err(e) => errors.push(format!("{}: {}", positions.display(), e)),
        }
    }

    builder.type_names(config.type_names());

    if !errors.is_empty() {
        return Err(ArchError::Load {
            count: errors.len(),
            message: errors.join("\n  "),
            help: Some("Check the paths in archmap.yaml".to_string()),
        });
    }

    Ok(builder)
}

/// Load and build the archetype registry of a project.
pub fn load_registry(config: &Config, root: &Path, sink: &mut dyn DiagnosticSink) -> Result<ArchetypeRegistry> {
    let registry = load_builder(config, root, sink)?.build(sink);
    info!(
        archetypes = registry.len(),
        categories = registry.categories().count(),
        join_lists = registry.join_lists().len(),
        positions = registry.positions().is_some(),
        "Loaded archetypes"
    );
    Ok(registry)
}

/// Load the configured face list, if any.
pub fn load_faces(config: &Config, root: &Path) -> Result<Option<FaceSet>> {
    let Some(path) = &config.faces else {
        return Ok(None);
    };
    let path = Config::resolve(root, path);
    let faces = FaceSet::parse(&read(&path)?);
    debug!(faces = faces.len(), path = %path.display(), "Loaded faces");
    Ok(Some(faces))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::Diagnostics;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn write(root: &Path, path: &str, content: &str) {
        let path = root.join(path);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn walls() -> String {
        (0..16)
            .map(|i| format!("Object wall_{:02}\nno_pass 1\nend\n", i))
            .collect()
    }

    #[test]
    fn test_category_of() {
        let root = Path::new("/data/arch");
        assert_eq!(
            category_of(root, Path::new("/data/arch/floor/stone/x/a.arc")),
            Some("floor/stone".to_string())
        );
        assert_eq!(
            category_of(root, Path::new("/data/arch/floor/a.arc")),
            Some("floor".to_string())
        );
        assert_eq!(category_of(root, Path::new("/data/arch/a.arc")), None);
    }

    #[test]
    fn test_load_empty_project() {
        let dir = tempdir().unwrap();
        let mut diagnostics = Diagnostics::new();
        let registry = load_registry(&Config::default(), dir.path(), &mut diagnostics).unwrap();
        assert!(registry.is_empty());
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_load_archetype_directory() {
        let dir = tempdir().unwrap();
        write(dir.path(), "arch/floor/grass.arc", "Object grass\ntype 71\nend\n");
        write(
            dir.path(),
            "arch/misc/sign.arc",
            "Object sign\ntype 98\neditor_folder signs\nend\n",
        );
        write(dir.path(), "arch/dev/broken.arc", "Object broken\ntype 1\nend\n");

        let mut diagnostics = Diagnostics::new();
        let registry = load_registry(&Config::default(), dir.path(), &mut diagnostics).unwrap();

        assert_eq!(registry.len(), 2);
        assert!(registry.by_name("broken").is_none());
        let grass: Vec<_> = registry.archetypes_in("floor").map(|a| a.name.as_str()).collect();
        assert_eq!(grass, vec!["grass"]);
        assert_eq!(registry.archetypes_in("signs").count(), 1);
        assert_eq!(registry.archetypes_in("misc").count(), 0);
    }

    #[test]
    fn test_collected_file_preferred() {
        let dir = tempdir().unwrap();
        write(dir.path(), "arch/floor/grass.arc", "Object grass\ntype 71\nend\n");
        write(dir.path(), "archetypes", "Object dirt\ntype 71\nend\n");

        let mut diagnostics = Diagnostics::new();
        let registry = load_registry(&Config::default(), dir.path(), &mut diagnostics).unwrap();

        assert!(registry.by_name("dirt").is_some());
        assert!(registry.by_name("grass").is_none());
    }

    #[test]
    fn test_load_artifacts_joins_and_type_names() {
        let dir = tempdir().unwrap();
        write(dir.path(), "arch/weapons/sword.arc", "Object sword\ntype 15\ndam 4\nend\n");
        write(dir.path(), "arch/walls/walls.arc", &walls());
        write(
            dir.path(),
            "artifacts",
            "artifact sword_of_fire\ndef_arch sword\nObject of Fire\ndam 12\nend\n",
        );
        let names: Vec<String> = (0..16).map(|i| format!("wall_{:02}", i)).collect();
        write(
            dir.path(),
            "autojoin.txt",
            &format!("start\n{}\nend\n", names.join("\n")),
        );

        let mut config = Config::default();
        config.type_names.insert(15, "WEAPON".to_string());

        let mut diagnostics = Diagnostics::new();
        let registry = load_registry(&config, dir.path(), &mut diagnostics).unwrap();

        let artifact = registry.by_name("sword_of_fire").unwrap();
        assert!(artifact.artifact);
        assert_eq!(registry.join_lists().len(), 1);
        assert!(registry.by_name("wall_05").unwrap().join_list.is_some());
        assert_eq!(registry.type_name(15).to_string(), "WEAPON");
        assert_eq!(registry.type_name(16).to_string(), "*UNKNOWN16*");
    }

    #[test]
    fn test_unreadable_faces_file() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("faces")).unwrap();

        let config = Config {
            faces: Some(PathBuf::from("faces")),
            ..Default::default()
        };
        assert!(matches!(load_faces(&config, dir.path()), Err(ArchError::Io { .. })));
        assert!(load_faces(&Config::default(), dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_unreadable_archetype_file_is_load_error() {
        let dir = tempdir().unwrap();
        write(dir.path(), "arch/x/ok.arc", "Object ok\nend\n");
        fs::write(dir.path().join("arch/x/bad.arc"), [0xff, 0xfe, 0x00]).unwrap();

        let mut diagnostics = Diagnostics::new();
        let err = load_registry(&Config::default(), dir.path(), &mut diagnostics).unwrap_err();
        assert!(matches!(err, ArchError::Load { count: 1, .. }));
    }

    #[test]
    fn test_load_faces() {
        let dir = tempdir().unwrap();
        write(dir.path(), "bmaps", "00001 wall.111\n00002 floor.111\n");
        let config = Config {
            faces: Some(PathBuf::from("bmaps")),
            ..Default::default()
        };
        let faces = load_faces(&config, dir.path()).unwrap().unwrap();
        assert_eq!(faces.len(), 2);
    }
}
