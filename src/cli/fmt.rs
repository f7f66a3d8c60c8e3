//! Fmt command implementation.
//!
//! Re-encodes maps so they contain only what differs from the archetypes,
//! in canonical object order.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;

use crate::error::{ArchError, Result};
use crate::output::{display_path, plural, Printer};
use crate::parser::{decode_map, encode_map};
use crate::registry::ArchetypeRegistry;
use crate::validation::{DiagnosticSink, Diagnostics};

use super::open_project;

/// Rewrite maps in canonical form
#[derive(Args, Debug)]
pub struct FmtArgs {
    /// Map files to format
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Only report maps that would change
    #[arg(long)]
    pub check: bool,
}

/// Canonical text of a map source.
pub fn format_source(
    source: &str,
    registry: Arc<ArchetypeRegistry>,
    sink: &mut dyn DiagnosticSink,
) -> Result<String> {
    let map = decode_map(source, registry, sink)?;
    Ok(encode_map(&map))
}

pub fn run(args: FmtArgs, printer: &Printer) -> Result<()> {
    let Some(first) = args.files.first() else {
        return Ok(());
    };
    let session = open_project(first, printer)?;

    let mut changed = 0;
    for file in &args.files {
        let source = fs::read_to_string(file).map_err(|e| ArchError::Io {
            path: file.clone(),
            message: e.to_string(),
        })?;
        let mut diagnostics = Diagnostics::new();
        let formatted = format_source(&source, Arc::clone(session.registry()), &mut diagnostics)?;
        printer.diagnostics(&diagnostics);

        if formatted == source {
            continue;
        }
        changed += 1;
        if args.check {
            printer.warning("Unformatted", &display_path(file));
        } else {
            fs::write(file, &formatted).map_err(|e| ArchError::Io {
                path: file.clone(),
                message: e.to_string(),
            })?;
            printer.status("Formatted", &display_path(file));
        }
    }

    if args.check && changed > 0 {
        return Err(ArchError::Validation {
            message: format!("{} not in canonical form", plural(changed, "map is", "maps are")),
            help: Some("Run `archmap fmt` without --check".to_string()),
        });
    }
    printer.success(
        "Finished",
        &format!("{} checked, {} changed", plural(args.files.len(), "map", "maps"), changed),
    );
    Ok(())
}
