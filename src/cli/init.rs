//! Init command implementation.
//!
//! Generates an `archmap.yaml` from the archetype and map files found in
//! a directory.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Component, Path, PathBuf};

use clap::Args;

use crate::discovery::{scan_directory, Config, CONFIG_FILENAME};
use crate::error::{ArchError, Result};
use crate::output::{display_path, plural, Printer};

/// Initialize an archmap project by generating archmap.yaml
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Directory to scan (default: current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Overwrite existing archmap.yaml
    #[arg(long)]
    pub force: bool,
}

/// First directory of a file below the root, `.` for files in the root.
fn top_dir(root: &Path, file: &Path) -> String {
    let relative = file.strip_prefix(root).unwrap_or(file);
    let mut components = relative.components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(dir)), Some(_)) => dir.to_string_lossy().into_owned(),
        _ => ".".to_string(),
    }
}

pub fn run(args: InitArgs, printer: &Printer) -> Result<()> {
    let config_path = args.path.join(CONFIG_FILENAME);

    if config_path.exists() && !args.force {
        return Err(ArchError::Config {
            message: format!("{} already exists", CONFIG_FILENAME),
            help: Some("Use --force to overwrite".to_string()),
        });
    }

    printer.status("Scanning", &display_path(&args.path));
    let scan = scan_directory(&args.path, &Config::default());

    let mut config = Config::default();
    let arch_dirs: BTreeSet<String> = scan
        .archetypes
        .iter()
        .map(|file| top_dir(&args.path, file))
        .collect();
    if let Some(dir) = arch_dirs.iter().next() {
        config.archetypes = PathBuf::from(dir);
    }

    let map_dirs: BTreeSet<String> = scan
        .maps
        .iter()
        .map(|file| top_dir(&args.path, file))
        .collect();
    if !map_dirs.is_empty() {
        config.maps = map_dirs.iter().cloned().collect();
    }

    let yaml = config.to_yaml()?;
    fs::write(&config_path, &yaml).map_err(|e| ArchError::Io {
        path: config_path.clone(),
        message: format!("Failed to write configuration: {}", e),
    })?;

    if arch_dirs.len() > 1 {
        printer.warning(
            "Archetypes",
            &format!(
                "found in {}, using {}",
                arch_dirs.iter().cloned().collect::<Vec<_>>().join(", "),
                config.archetypes.display()
            ),
        );
    }
    if !map_dirs.is_empty() {
        printer.info("Maps", &config.maps.join(", "));
    }
    printer.success(
        "Created",
        &format!(
            "{} ({}, {} found)",
            CONFIG_FILENAME,
            plural(scan.archetypes.len(), "archetype file", "archetype files"),
            plural(scan.maps.len(), "map", "maps")
        ),
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn init(path: &Path, force: bool) -> Result<()> {
        let args = InitArgs {
            path: path.to_path_buf(),
            force,
        };
        run(args, &Printer::plain())
    }

    #[test]
    fn test_init_empty_directory_writes_defaults() {
        let dir = tempdir().unwrap();
        init(dir.path(), false).unwrap();

        let config = Config::load(&dir.path().join(CONFIG_FILENAME)).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_init_discovers_directories() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("data/floor")).unwrap();
        fs::write(dir.path().join("data/floor/grass.arc"), "Object grass\nend\n").unwrap();
        fs::create_dir_all(dir.path().join("world/town")).unwrap();
        fs::write(dir.path().join("world/town/square"), "arch map\nend\n").unwrap();

        init(dir.path(), false).unwrap();

        let config = Config::load(&dir.path().join(CONFIG_FILENAME)).unwrap();
        assert_eq!(config.archetypes, PathBuf::from("data"));
        assert_eq!(config.maps, vec!["world"]);
    }

    #[test]
    fn test_init_errors_if_config_exists() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILENAME), "maps: [x]").unwrap();

        assert!(init(dir.path(), false).is_err());
        let content = fs::read_to_string(dir.path().join(CONFIG_FILENAME)).unwrap();
        assert_eq!(content, "maps: [x]");
    }

    #[test]
    fn test_init_force_overwrites() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILENAME), "maps: [x]").unwrap();

        init(dir.path(), true).unwrap();
        let config = Config::load(&dir.path().join(CONFIG_FILENAME)).unwrap();
        assert_eq!(config.maps, vec!["maps"]);
    }
}
