//! Validate command implementation.

use std::path::{Path, PathBuf};

use clap::Args;

use crate::error::{ArchError, Result};
use crate::output::{display_path, plural, summary, Printer};
use crate::session::EditSession;
use crate::types::FaceLookup;
use crate::validation::{validate_map, Diagnostics};

use super::open_project;

/// Check maps for broken links and unresolved references
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Map files to validate
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Treat warnings as errors
    #[arg(long)]
    pub strict: bool,
}

/// Decode and check one map. Load diagnostics come first.
pub fn validate_file(session: &mut EditSession, path: &Path) -> Result<Diagnostics> {
    let mut diagnostics = Diagnostics::new();
    let map = session.open_map(path, &mut diagnostics)?;
    let faces = session.faces().map(|f| f as &dyn FaceLookup);
    diagnostics.merge(validate_map(&map.read(), faces));
    session.close_map(path);
    Ok(diagnostics)
}

pub fn run(args: ValidateArgs, printer: &Printer) -> Result<()> {
    let Some(first) = args.files.first() else {
        return Ok(());
    };
    let mut session = open_project(first, printer)?;

    let mut failed = 0;
    for file in &args.files {
        printer.status("Checking", &display_path(file));
        let diagnostics = validate_file(&mut session, file)?;
        printer.diagnostics(&diagnostics);

        let bad = diagnostics.has_errors() || (args.strict && diagnostics.has_warnings());
        if bad {
            failed += 1;
            printer.error("Failed", &format!("{} ({})", display_path(file), summary(&diagnostics)));
        } else if diagnostics.has_warnings() {
            printer.warning("Passed", &format!("{} ({})", display_path(file), summary(&diagnostics)));
        }
    }

    if failed > 0 {
        return Err(ArchError::Validation {
            message: format!("{} failed validation", plural(failed, "map", "maps")),
            help: None,
        });
    }
    printer.success("Finished", &format!("{} valid", plural(args.files.len(), "map", "maps")));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::registry;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_validate_clean_map() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("town");
        fs::write(&path, "arch map\nwidth 3\nheight 3\nend\narch floor\nend\n").unwrap();

        let mut session = EditSession::new(registry());
        let diagnostics = validate_file(&mut session, &path).unwrap();
        assert!(diagnostics.is_ok(), "{:?}", diagnostics);
        assert_eq!(session.maps().count(), 0);
    }

    #[test]
    fn test_validate_reports_load_problems() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("town");
        fs::write(
            &path,
            "arch map\nwidth 3\nheight 3\nend\narch dragon\nend\narch chest\narch event_apply\nend\nend\n",
        )
        .unwrap();

        let mut session = EditSession::new(registry());
        let diagnostics = validate_file(&mut session, &path).unwrap();
        assert!(diagnostics.contains_code("archmap::ref::unknown-archetype"));
        assert!(diagnostics.contains_code("archmap::ref::unresolved-archetype"));
        assert!(diagnostics.contains_code("archmap::ref::event-without-path"));
    }

    #[test]
    fn test_run_fails_on_errors() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("archmap.yaml"), "").unwrap();
        let path = dir.path().join("broken");
        fs::write(&path, "arch floor\nend\n").unwrap();

        let args = ValidateArgs {
            files: vec![path],
            strict: false,
        };
        assert!(run(args, &Printer::plain()).is_err());
    }
}
