//! Resize command implementation.

use std::path::PathBuf;

use clap::Args;

use crate::error::{ArchError, Result};
use crate::output::{display_path, plural, Printer};
use crate::validation::Diagnostics;

use super::open_project;

/// Change the size of a map
#[derive(Args, Debug)]
pub struct ResizeArgs {
    /// Map file to resize
    pub file: PathBuf,

    /// New width in cells
    pub width: i32,

    /// New height in cells
    pub height: i32,
}

pub fn run(args: ResizeArgs, printer: &Printer) -> Result<()> {
    if args.width < 1 || args.height < 1 {
        return Err(ArchError::Validation {
            message: format!("Invalid map size {}x{}", args.width, args.height),
            help: Some("Width and height must be at least 1".to_string()),
        });
    }

    let mut session = open_project(&args.file, printer)?;
    let mut diagnostics = Diagnostics::new();
    let map = session.open_map(&args.file, &mut diagnostics)?;
    printer.diagnostics(&diagnostics);

    let (before, old_size) = {
        let map = map.read();
        (map.instance_count(), (map.width(), map.height()))
    };
    map.resize(args.width, args.height);
    let (after, new_size) = {
        let map = map.read();
        (map.instance_count(), (map.width(), map.height()))
    };

    let saved = session.save_map(&args.file)?;
    printer.diagnostics(&saved);
    printer.success(
        "Resized",
        &format!(
            "{} from {}x{} to {}x{} ({} removed)",
            display_path(&args.file),
            old_size.0,
            old_size.1,
            new_size.0,
            new_size.1,
            plural(before - after, "object", "objects")
        ),
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn project() -> tempfile::TempDir {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("archmap.yaml"), "").unwrap();
        fs::create_dir_all(dir.path().join("arch/floor")).unwrap();
        fs::write(dir.path().join("arch/floor/grass.arc"), "Object grass\ntype 71\nend\n").unwrap();
        dir
    }

    #[test]
    fn test_resize_shrinks_and_drops_objects() {
        let dir = project();
        let path = dir.path().join("m");
        fs::write(
            &path,
            "arch map\nwidth 4\nheight 4\nend\narch grass\nend\narch grass\nx 3\ny 3\nend\n",
        )
        .unwrap();

        let args = ResizeArgs {
            file: path.clone(),
            width: 2,
            height: 2,
        };
        run(args, &Printer::plain()).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("width 2\nheight 2\n"));
        assert_eq!(text.matches("arch grass").count(), 1);
    }

    #[test]
    fn test_resize_rejects_empty_size() {
        let dir = project();
        let args = ResizeArgs {
            file: dir.path().join("m"),
            width: 0,
            height: 3,
        };
        assert!(matches!(run(args, &Printer::plain()), Err(ArchError::Validation { .. })));
    }
}
