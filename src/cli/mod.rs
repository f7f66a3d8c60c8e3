pub mod completions;
pub mod fmt;
pub mod init;
pub mod list;
pub mod resize;
pub mod validate;

use std::path::Path;

use clap::{ArgAction, Parser, Subcommand};

use crate::discovery::{discover, find_root};
use crate::error::Result;
use crate::output::{display_path, plural, Printer};
use crate::session::EditSession;
use crate::validation::Diagnostics;

/// archmap - Map editing toolkit for tile-based RPG worlds
#[derive(Parser, Debug)]
#[command(name = "archmap")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize an archmap project (generates archmap.yaml)
    Init(init::InitArgs),

    /// List archetypes by category
    List(list::ListArgs),

    /// Check maps for broken links and unresolved references
    Validate(validate::ValidateArgs),

    /// Rewrite maps in canonical form
    Fmt(fmt::FmtArgs),

    /// Change the size of a map
    Resize(resize::ResizeArgs),

    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

/// Load the project a path belongs to.
///
/// Registry problems are printed as warnings; they never stop a command.
pub(crate) fn open_project(path: &Path, printer: &Printer) -> Result<EditSession> {
    let root = find_root(path);
    printer.status("Loading", &display_path(&root));

    let project = discover(&root)?;
    let mut diagnostics = Diagnostics::new();
    let session = EditSession::from_project(&project, &mut diagnostics)?;

    if !diagnostics.is_empty() {
        printer.warning(
            "Archetypes",
            &plural(diagnostics.len(), "problem", "problems"),
        );
        printer.diagnostics(&diagnostics);
    }
    printer.info(
        "Loaded",
        &plural(session.registry().len(), "archetype", "archetypes"),
    );
    Ok(session)
}
