//! List command implementation.
//!
//! Loads the project's archetypes and prints them grouped by category.

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

use crate::error::{ArchError, Result};
use crate::output::{plural, Printer};
use crate::registry::ArchetypeRegistry;
use crate::types::Archetype;

use super::open_project;

/// List archetypes by category
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Project directory (default: current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Only list archetypes of this category
    #[arg(long, short)]
    pub category: Option<String>,

    /// Print JSON to stdout instead of a summary
    #[arg(long)]
    pub json: bool,
}

/// One archetype in `--json` output.
#[derive(Debug, Serialize, PartialEq)]
pub struct ArchetypeEntry<'a> {
    pub name: &'a str,
    pub category: Option<&'a str>,
    #[serde(rename = "type")]
    pub type_no: i32,
    pub type_name: String,
    pub tails: usize,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub artifact: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub join_list: Option<usize>,
}

impl<'a> ArchetypeEntry<'a> {
    fn new(registry: &'a ArchetypeRegistry, arch: &'a Archetype) -> Self {
        Self {
            name: &arch.name,
            category: arch.category.as_deref(),
            type_no: arch.type_no,
            type_name: registry.type_name(arch.type_no).to_string(),
            tails: registry.tails(arch.id).len(),
            artifact: arch.artifact,
            join_list: arch.join_list.map(|j| j.0),
        }
    }
}

/// Archetypes to list: one category, or every non-tail archetype.
pub fn select<'a>(registry: &'a ArchetypeRegistry, category: Option<&str>) -> Vec<ArchetypeEntry<'a>> {
    let mut entries: Vec<ArchetypeEntry<'a>> = match category {
        Some(category) => registry
            .archetypes_in(category)
            .map(|arch| ArchetypeEntry::new(registry, arch))
            .collect(),
        None => registry
            .iter()
            .filter(|arch| !arch.is_tail())
            .map(|arch| ArchetypeEntry::new(registry, arch))
            .collect(),
    };
    entries.sort_by(|a, b| a.name.cmp(b.name));
    entries
}

pub fn run(args: ListArgs, printer: &Printer) -> Result<()> {
    let session = open_project(&args.path, printer)?;
    let registry = session.registry();

    if let Some(category) = &args.category {
        if !registry.categories().any(|c| c == category) {
            return Err(ArchError::Config {
                message: format!("Unknown category '{}'", category),
                help: Some("Run `archmap list` to see all categories".to_string()),
            });
        }
    }

    let entries = select(registry, args.category.as_deref());
    if args.json {
        let json = serde_json::to_string_pretty(&entries).map_err(|e| ArchError::Parse {
            message: e.to_string(),
            help: None,
        })?;
        println!("{}", json);
        return Ok(());
    }

    match &args.category {
        Some(category) => {
            let names: Vec<&str> = entries.iter().map(|e| e.name).collect();
            printer.info(category, &names.join(", "));
        }
        None => {
            for category in registry.categories() {
                let count = registry.archetypes_in(category).count();
                printer.info(category, &plural(count, "archetype", "archetypes"));
            }
            let uncategorized = entries.iter().filter(|e| e.category.is_none()).count();
            if uncategorized > 0 {
                printer.info("(none)", &plural(uncategorized, "archetype", "archetypes"));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::registry;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_select_skips_tails() {
        let registry = registry();
        let entries = select(&registry, None);
        assert!(entries.iter().any(|e| e.name == "bigtree"));
        assert!(!entries.iter().any(|e| e.name == "bigtree_2"));

        let tree = entries.iter().find(|e| e.name == "bigtree").unwrap();
        assert_eq!(tree.tails, 3);
    }

    #[test]
    fn test_select_is_sorted() {
        let registry = registry();
        let names: Vec<&str> = select(&registry, None).iter().map(|e| e.name).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }

    #[test]
    fn test_json_entry_shape() {
        let registry = registry();
        let entries = select(&registry, None);
        let wall = entries.iter().find(|e| e.name == "wall_00").unwrap();
        let json = serde_json::to_value(wall).unwrap();

        assert_eq!(json["name"], "wall_00");
        assert_eq!(json["type"], 0);
        assert_eq!(json["type_name"], "*UNKNOWN0*");
        assert_eq!(json["join_list"], 0);
        assert!(json.get("artifact").is_none());
    }
}
