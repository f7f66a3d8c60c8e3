//! Parser for autojoin list files.
//!
//! Each list is a `start … end` section with one archetype name per line.
//! Names are resolved, and list sizes checked, when the registry is built.

use crate::validation::{Diagnostic, DiagnosticSink};

use super::lines::Lines;

/// Parse the `start … end` sections of a join list file.
pub fn parse_join_lists(source: &str, sink: &mut dyn DiagnosticSink) -> Vec<Vec<String>> {
    let mut lists = Vec::new();
    let mut current: Option<(usize, Vec<String>)> = None;

    for (line_no, raw) in Lines::new(source) {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if current.is_none() {
            if line == "start" {
                current = Some((line_no, Vec::new()));
            } else {
                sink.push(
                    Diagnostic::warning(
                        "archmap::parse::stray-line",
                        format!("Line outside of a join list ignored: '{}'", line),
                    )
                    .at_line(line_no),
                );
            }
            continue;
        }
        if line == "end" {
            if let Some((_, names)) = current.take() {
                lists.push(names);
            }
        } else if let Some((_, names)) = current.as_mut() {
            names.push(line.to_string());
        }
    }

    if let Some((start, _)) = current {
        sink.push(
            Diagnostic::error(
                "archmap::parse::unterminated",
                "Join list is missing its 'end' line".to_string(),
            )
            .at_line(start),
        );
    }
    lists
}
