//! Decoder for map files.
//!
//! A map file is a header block followed by `arch <name> … end` objects. A
//! nested `arch` inside an object belongs to its inventory. Tails of
//! multi-tile objects written after `More` are skipped: placing the head
//! recreates them from the registry.
//!
//! Malformed content never aborts the decode. Unknown archetypes stay on
//! the map unresolved, objects that cannot be placed are dropped, and every
//! such decision is reported to the sink.

use std::sync::Arc;

use tracing::debug;

use crate::diff::{line_key, line_value, strip_inherited};
use crate::error::Result;
use crate::map::MapModel;
use crate::registry::ArchetypeRegistry;
use crate::types::{Instance, InstanceId};
use crate::validation::{Diagnostic, DiagnosticSink};

use super::header::parse_header;
use super::lines::{parse_number, split_key, Lines};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Object,
    Msg,
    Lore,
    Anim,
}

/// An object whose `end` has not been read yet.
struct OpenObject {
    inst: Instance,
    inventory: Vec<InstanceId>,
    line: usize,
    section: Section,
    block: Vec<String>,
}

impl OpenObject {
    fn new(arch_name: &str, line: usize) -> Self {
        Self {
            inst: Instance::named(arch_name),
            inventory: Vec::new(),
            line,
            section: Section::Object,
            block: Vec::new(),
        }
    }

    fn take_block(&mut self) -> String {
        std::mem::take(&mut self.block).join("\n")
    }
}

struct Decoder<'a> {
    map: MapModel,
    sink: &'a mut dyn DiagnosticSink,
    stack: Vec<OpenObject>,
    chain: Vec<InstanceId>,
    max_x: i32,
    max_y: i32,
    skipping_tail: bool,
}

/// Decode a map file against a registry.
///
/// Fails only when the header is missing or unterminated.
pub fn decode_map(
    source: &str,
    registry: Arc<ArchetypeRegistry>,
    sink: &mut dyn DiagnosticSink,
) -> Result<MapModel> {
    let mut lines = Lines::new(source);
    let header = parse_header(&mut lines, sink)?;
    let mut decoder = Decoder {
        map: MapModel::with_header(registry, header),
        sink,
        stack: Vec::new(),
        chain: Vec::new(),
        max_x: 0,
        max_y: 0,
        skipping_tail: false,
    };

    for (line_no, raw) in lines {
        decoder.line(line_no, raw);
    }
    Ok(decoder.finish())
}

impl Decoder<'_> {
    fn line(&mut self, line_no: usize, raw: &str) {
        let line = raw.trim();

        if let Some(open) = self.stack.last_mut() {
            let terminator = match open.section {
                Section::Object => None,
                Section::Msg => Some("endmsg"),
                Section::Lore => Some("endlore"),
                Section::Anim => Some("mina"),
            };
            if let Some(terminator) = terminator {
                if line != terminator {
                    let kept = if open.section == Section::Anim { line } else { raw };
                    open.block.push(kept.to_string());
                    return;
                }
                let text = open.take_block();
                match open.section {
                    Section::Msg => open.inst.msg = Some(text),
                    Section::Lore => open.inst.lore = Some(text),
                    _ => open.inst.anim = Some(text),
                }
                open.section = Section::Object;
                return;
            }
        }

        if self.skipping_tail {
            if line == "end" {
                self.skipping_tail = false;
            }
            return;
        }
        if line.is_empty() {
            return;
        }

        let (key, value) = split_key(line);
        match key {
            "arch" => self.stack.push(OpenObject::new(value, line_no)),
            "More" if self.stack.is_empty() => self.skipping_tail = true,
            "end" if !self.stack.is_empty() => self.close(),
            _ if self.stack.is_empty() => self.sink.push(
                Diagnostic::warning(
                    "archmap::parse::stray-line",
                    format!("Line outside of any object ignored: '{}'", line),
                )
                .at_line(line_no),
            ),
            _ => self.attribute(line_no, line, key, value),
        }
    }

    fn attribute(&mut self, line_no: usize, line: &str, key: &str, value: &str) {
        let top_level = self.stack.len() == 1;
        let Some(open) = self.stack.last_mut() else {
            return;
        };
        let inst = &mut open.inst;

        match key {
            "msg" if value.is_empty() => open.section = Section::Msg,
            "lore" if value.is_empty() => open.section = Section::Lore,
            "anim" if value.is_empty() => open.section = Section::Anim,
            "x" | "y" | "type" | "direction" => {
                let Some(n) = parse_number(value) else {
                    let name = inst.arch_name.clone();
                    inst.attributes.push(line.to_string());
                    self.sink.push(
                        Diagnostic::warning(
                            "archmap::parse::bad-number",
                            format!("'{}' in '{}' is not a number", line, name),
                        )
                        .at_line(line_no),
                    );
                    return;
                };
                match key {
                    "x" => {
                        inst.x = n;
                        if top_level {
                            self.max_x = self.max_x.max(n);
                        }
                    }
                    "y" => {
                        inst.y = n;
                        if top_level {
                            self.max_y = self.max_y.max(n);
                        }
                    }
                    "type" => inst.type_no = Some(n),
                    _ => {
                        inst.direction = Some(n);
                        inst.attributes.push(line.to_string());
                    }
                }
            }
            "face" => {
                inst.face = Some(value.to_string());
                inst.attributes.push(line.to_string());
            }
            k if k.starts_with("event_") => {
                let name = inst.arch_name.clone();
                self.sink.push(
                    Diagnostic::warning(
                        "archmap::parse::legacy-event",
                        format!("Old-style event line '{}' in '{}' dropped", line, name),
                    )
                    .with_help("Scripted events are stored as event objects in the inventory")
                    .at_line(line_no),
                );
            }
            _ => inst.attributes.push(line.to_string()),
        }
    }

    /// Finish the innermost open object.
    fn close(&mut self) {
        let Some(open) = self.stack.pop() else {
            return;
        };
        let mut inst = open.inst;
        promote_name(&mut inst);

        let registry = Arc::clone(self.map.registry());
        match registry.by_name(&inst.arch_name) {
            Some(arch) if arch.is_tail() => {
                self.sink.push(
                    Diagnostic::warning(
                        "archmap::ref::tail-archetype",
                        format!("'{}' is a tail part and cannot be placed on its own, dropping it", arch.name),
                    )
                    .at_line(open.line),
                );
                for child in open.inventory {
                    let _ = self.map.remove(child);
                }
                return;
            }
            Some(arch) => {
                inst.arch = Some(arch.id);
                strip_inherited(&mut inst.attributes, &arch.attributes);
            }
            None => self.sink.push(
                Diagnostic::error(
                    "archmap::ref::unknown-archetype",
                    format!("Unknown archetype '{}'", inst.arch_name),
                )
                .with_help("The object is kept and written back unchanged")
                .at_line(open.line),
            ),
        }
        if let Some(animation) = inst
            .attributes
            .iter()
            .rev()
            .find(|l| line_key(l) == "animation")
        {
            inst.anim_name = Some(line_value(animation).unwrap_or("").to_string());
        }
        self.map.apply_defaults(&mut inst);

        let id = self.map.alloc(inst);
        let has_inventory = !open.inventory.is_empty();
        for child in open.inventory {
            if let Err(err) = self.map.insert_into(id, child) {
                self.sink.push(
                    Diagnostic::warning("archmap::edit::inventory", format!("Inventory item dropped: {}", err))
                        .at_line(open.line),
                );
                let _ = self.map.remove(child);
            }
        }
        if has_inventory {
            self.map.validate_events(id);
        }

        match self.stack.last_mut() {
            Some(parent) => parent.inventory.push(id),
            None => self.chain.push(id),
        }
    }

    fn finish(mut self) -> MapModel {
        for open in std::mem::take(&mut self.stack).into_iter().rev() {
            self.sink.push(
                Diagnostic::error(
                    "archmap::parse::unterminated",
                    format!("Object '{}' is missing its 'end' line, dropping it", open.inst.arch_name),
                )
                .at_line(open.line),
            );
            for child in open.inventory {
                let _ = self.map.remove(child);
            }
        }

        let width = (self.max_x + 1).max(self.map.width() as i32);
        let height = (self.max_y + 1).max(self.map.height() as i32);
        if (width, height) != (self.map.width() as i32, self.map.height() as i32) {
            self.sink.warning(
                "archmap::parse::grid-grown",
                format!(
                    "Objects lie outside the {}x{} header size, growing the map to {}x{}",
                    self.map.width(),
                    self.map.height(),
                    width,
                    height
                ),
            );
            self.map.resize(width, height);
        }

        let chain = self.map.sort_pending_chain(std::mem::take(&mut self.chain));
        for id in chain {
            let Some(inst) = self.map.get(id) else {
                continue;
            };
            let (x, y, name) = (inst.x, inst.y, inst.arch_name.clone());
            if let Err(err) = self.map.place_with(id, x, y, false, false) {
                self.sink.error(
                    "archmap::edit::placement",
                    format!("'{}' at ({}, {}) dropped: {}", name, x, y, err),
                );
                let _ = self.map.remove(id);
            }
        }

        self.sink.extend(self.map.take_diagnostics());
        debug!(
            width = self.map.width(),
            height = self.map.height(),
            instances = self.map.instance_count(),
            "Map decoded"
        );
        self.map
    }
}

/// Move the last `name` line of an object into its name override.
fn promote_name(inst: &mut Instance) {
    let mut name = None;
    inst.attributes.retain(|line| {
        if line_key(line) == "name" {
            name = Some(line_value(line).unwrap_or("").to_string());
            false
        } else {
            true
        }
    });
    if name.is_some() {
        inst.name = name;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::registry;
    use crate::validation::Diagnostics;
    use pretty_assertions::assert_eq;

    fn decode(source: &str) -> (MapModel, Diagnostics) {
        let mut diagnostics = Diagnostics::new();
        let map = decode_map(source, registry(), &mut diagnostics).unwrap();
        (map, diagnostics)
    }

    fn names(map: &MapModel, x: i32, y: i32) -> Vec<String> {
        map.cell(x, y)
            .map(|id| map.get(id).unwrap().arch_name.clone())
            .collect()
    }

    const HEADER: &str = "arch map\nname test\nwidth 4\nheight 4\nend\n";

    #[test]
    fn test_decode_objects_and_overrides() {
        let source = format!(
            "{}arch floor\nx 1\ny 2\nend\narch chest\nname old chest\nweight 2000\nweight 10\nx 1\ny 2\nend\n",
            HEADER
        );
        let (map, diags) = decode(&source);
        assert!(diags.is_ok(), "{:?}", diags);
        assert_eq!(names(&map, 1, 2), vec!["floor", "chest"]);

        let chest = map.cell(1, 2).nth(1).unwrap();
        let chest = map.get(chest).unwrap();
        assert_eq!(chest.name.as_deref(), Some("old chest"));
        assert_eq!(chest.attributes, vec!["weight 10"]);
        assert_eq!(chest.arch, map.registry().id_of("chest"));
    }

    #[test]
    fn test_inventory_nesting() {
        let source = format!(
            "{}arch chest\narch sign\nmsg\nInside.\nendmsg\nend\narch event_apply\nrace scripts\\open.py\nend\nend\n",
            HEADER
        );
        let (map, diags) = decode(&source);
        assert!(!diags.has_errors(), "{:?}", diags);

        let chest = map.cell(0, 0).next().unwrap();
        let items: Vec<_> = map.inventory(chest).collect();
        assert_eq!(items.len(), 2);
        let sign = map.get(items[0]).unwrap();
        assert_eq!(sign.msg.as_deref(), Some("Inside."));
        assert_eq!(sign.container(), Some(chest));

        let event = map.get(items[1]).unwrap();
        assert_eq!(event.name.as_deref(), Some("Python"));
        assert_eq!(event.attributes, vec!["race scripts/open.py"]);
    }

    #[test]
    fn test_unknown_archetype_kept() {
        let source = format!("{}arch dragon\nhp 50\nx 2\nend\n", HEADER);
        let (map, diags) = decode(&source);
        assert!(diags.contains_code("archmap::ref::unknown-archetype"));

        let dragon = map.get(map.cell(2, 0).next().unwrap()).unwrap();
        assert_eq!(dragon.arch, None);
        assert_eq!(dragon.arch_name, "dragon");
        assert_eq!(dragon.attributes, vec!["hp 50"]);
    }

    #[test]
    fn test_multi_tails_rebuilt_and_sorted_last() {
        let source = format!(
            "{}arch bigtree\nx 1\ny 1\nend\nMore\narch bigtree_2\nx 2\ny 1\nend\narch floor\nx 2\ny 1\nend\n",
            HEADER
        );
        let (map, diags) = decode(&source);
        assert!(diags.is_ok(), "{:?}", diags);
        assert_eq!(names(&map, 2, 1), vec!["floor", "bigtree_2"]);
        assert_eq!(map.instance_count(), 5);
    }

    #[test]
    fn test_objects_outside_header_grow_map() {
        let source = format!("{}arch floor\nx 6\ny 5\nend\n", HEADER);
        let (map, diags) = decode(&source);
        assert!(diags.contains_code("archmap::parse::grid-grown"));
        assert_eq!((map.width(), map.height()), (7, 6));
        assert_eq!(names(&map, 6, 5), vec!["floor"]);
    }

    #[test]
    fn test_multi_off_the_edge_dropped() {
        let source = format!("{}arch bigtree\nx 3\ny 3\nend\n", HEADER);
        let (map, diags) = decode(&source);
        assert!(diags.contains_code("archmap::edit::placement"));
        assert_eq!(map.instance_count(), 0);
    }

    #[test]
    fn test_malformed_lines_are_reported() {
        let source = format!(
            "{}stray\narch floor\nx one\nevent_apply_plugin Python\nend\narch chest\n",
            HEADER
        );
        let (map, diags) = decode(&source);
        assert!(diags.contains_code("archmap::parse::stray-line"));
        assert!(diags.contains_code("archmap::parse::bad-number"));
        assert!(diags.contains_code("archmap::parse::legacy-event"));
        assert!(diags.contains_code("archmap::parse::unterminated"));

        let floor = map.get(map.cell(0, 0).next().unwrap()).unwrap();
        assert_eq!(floor.attributes, vec!["x one"]);
        assert_eq!(map.instance_count(), 1);
    }

    #[test]
    fn test_not_a_map() {
        let mut diagnostics = Diagnostics::new();
        assert!(decode_map("arch floor\nend\n", registry(), &mut diagnostics).is_err());
    }
}
