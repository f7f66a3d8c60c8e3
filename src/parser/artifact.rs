//! Parser for the artifacts file.
//!
//! Artifacts are archetypes derived from a base archetype:
//!
//! ```text
//! artifact sword_of_fire
//! def_arch sword
//! chance 10
//! Object of Fire
//! dam 12
//! end
//! ```
//!
//! The `Object` block is parsed over a clone of the base; base lines whose
//! key is not overridden are carried over. Other lines before `Object`
//! belong to the game's treasure generation and are ignored.

use crate::diff::missing_keys;
use crate::types::Archetype;
use crate::validation::{Diagnostic, DiagnosticSink};

use super::archetype::{ObjectParser, Step};
use super::lines::{split_key, Lines};

/// Category given to every artifact.
pub const ARTIFACT_CATEGORY: &str = "artifacts";

/// Parse an artifacts file against the already parsed base archetypes.
pub fn parse_artifacts(source: &str, bases: &[Archetype], sink: &mut dyn DiagnosticSink) -> Vec<Archetype> {
    let mut out = Vec::new();
    let mut name = String::new();
    let mut base_name = String::new();
    let mut current: Option<(ObjectParser, &Archetype, String)> = None;
    let mut skipping = false;

    for (line_no, raw) in Lines::new(source) {
        if let Some((parser, _, _)) = current.as_mut() {
            if let Step::Done = parser.feed(line_no, raw, sink) {
                if let Some((parser, base, title)) = current.take() {
                    out.push(finish_artifact(parser, base, &title, sink));
                }
            }
            continue;
        }

        let line = raw.trim();
        if skipping {
            skipping = line != "end";
            continue;
        }
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let (key, value) = split_key(line);
        match key {
            "artifact" => name = value.to_string(),
            "def_arch" => base_name = value.to_string(),
            "Object" => {
                let base = bases.iter().find(|a| a.name == base_name);
                match base {
                    Some(base) if !name.is_empty() => {
                        let mut arch = base.clone();
                        arch.name = std::mem::take(&mut name);
                        arch.attributes.clear();
                        arch.multi = Default::default();
                        arch.category = Some(ARTIFACT_CATEGORY.to_string());
                        current = Some((
                            ObjectParser::new(arch, true, false, line_no),
                            base,
                            value.to_string(),
                        ));
                    }
                    _ => {
                        sink.push(
                            Diagnostic::error(
                                "archmap::ref::artifact-base",
                                format!(
                                    "Artifact '{}' ({}) has a missing name or unknown def_arch '{}'",
                                    name, value, base_name
                                ),
                            )
                            .at_line(line_no),
                        );
                        name.clear();
                        skipping = true;
                    }
                }
                base_name.clear();
            }
            _ => {}
        }
    }

    if let Some((parser, _, _)) = current {
        parser.unterminated(sink);
    }
    out
}

fn finish_artifact(parser: ObjectParser, base: &Archetype, title: &str, sink: &mut dyn DiagnosticSink) -> Archetype {
    let mut arch = parser.finish(sink).arch;
    arch.artifact = true;
    if !title.is_empty() && !arch.attributes.iter().any(|l| split_key(l).0 == "title") {
        arch.attributes.push(format!("title {}", title));
    }
    let inherited = missing_keys(&arch.attributes, &base.attributes);
    arch.attributes.extend(inherited);
    arch
}
