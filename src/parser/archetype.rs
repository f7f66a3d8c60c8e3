//! Parser for archetype definition files.
//!
//! A definition file is a sequence of `Object <name> … end` blocks. `More`
//! before an `Object` makes it a tail of the most recent head. Lines starting
//! with `#` are comments. Malformed values never stop the parse: they are
//! reported and the raw line is kept as an attribute.

use crate::types::{ArchId, Archetype, EditType};
use crate::validation::{Diagnostic, DiagnosticSink};

use super::lines::{parse_number, split_key, Lines};

/// Keys only the game client cares about; dropped on load.
const CLIENT_KEYS: &[&str] = &["visibility", "magicmap", "color_fg", "color_bg"];

/// Position within an object block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Section {
    Object,
    Msg,
    Anim,
    Lore,
}

pub(crate) enum Step {
    Continue,
    Done,
}

/// Parser for the body of one `Object` block.
pub(crate) struct ObjectParser {
    section: Section,
    arch: Archetype,
    type_set: bool,
    is_tail: bool,
    folder: Option<String>,
    block: Vec<String>,
    start_line: usize,
}

/// A finished object block.
pub(crate) struct ParsedObject {
    pub arch: Archetype,
    pub is_tail: bool,
    /// Category given by `editor_folder`.
    pub folder: Option<String>,
}

impl ObjectParser {
    pub(crate) fn new(arch: Archetype, type_set: bool, is_tail: bool, start_line: usize) -> Self {
        Self {
            section: Section::Object,
            arch,
            type_set,
            is_tail,
            folder: None,
            block: Vec::new(),
            start_line,
        }
    }

    pub(crate) fn feed(&mut self, line_no: usize, raw: &str, sink: &mut dyn DiagnosticSink) -> Step {
        let line = raw.trim();
        match self.section {
            Section::Msg => {
                if line == "endmsg" {
                    self.arch.msg = Some(self.take_block());
                    self.section = Section::Object;
                } else {
                    self.block.push(raw.to_string());
                }
                Step::Continue
            }
            Section::Lore => {
                if line == "endlore" {
                    self.arch.lore = Some(self.take_block());
                    self.section = Section::Object;
                } else {
                    self.block.push(raw.to_string());
                }
                Step::Continue
            }
            Section::Anim => {
                if line == "mina" {
                    self.arch.anim = Some(self.take_block());
                    self.arch.attributes.push(format!("animation {}", self.arch.name));
                    self.arch.anim_name = Some(self.arch.name.clone());
                    self.section = Section::Object;
                } else {
                    self.block.push(line.to_string());
                }
                Step::Continue
            }
            Section::Object => self.object_line(line_no, line, sink),
        }
    }

    fn take_block(&mut self) -> String {
        std::mem::take(&mut self.block).join("\n")
    }

    fn object_line(&mut self, line_no: usize, line: &str, sink: &mut dyn DiagnosticSink) -> Step {
        if line.is_empty() || line.starts_with('#') {
            return Step::Continue;
        }

        let (key, value) = split_key(line);
        match key {
            "end" if value.is_empty() => return Step::Done,
            "msg" if value.is_empty() => self.section = Section::Msg,
            "lore" if value.is_empty() => self.section = Section::Lore,
            "anim" if value.is_empty() => self.section = Section::Anim,
            "Object" => {
                sink.push(
                    Diagnostic::error(
                        "archmap::parse::nested-object",
                        format!("Object '{}' inside '{}' ignored", value, self.arch.name),
                    )
                    .with_help("Archetype definitions cannot contain inventory")
                    .at_line(line_no),
                );
            }
            "animation" => {
                self.arch.anim_name = Some(value.to_string());
                self.arch.attributes.push(line.to_string());
            }
            k if CLIENT_KEYS.contains(&k) => {}
            "x" | "y" => match parse_number(value) {
                Some(n) if self.is_tail => {
                    if key == "x" {
                        self.arch.multi.offset.0 = n;
                    } else {
                        self.arch.multi.offset.1 = n;
                    }
                }
                Some(_) => {
                    if self.arch.name != "map" {
                        sink.push(
                            Diagnostic::warning(
                                "archmap::parse::position-on-head",
                                format!("'{}' is not a tail but sets '{}'", self.arch.name, line),
                            )
                            .at_line(line_no),
                        );
                    }
                    self.arch.attributes.push(line.to_string());
                }
                None => self.bad_number(line_no, line, sink),
            },
            "type" => match parse_number(value) {
                Some(n) => {
                    if n == 0 {
                        sink.push(
                            Diagnostic::warning(
                                "archmap::parse::type-zero",
                                format!("'{}' has type 0", self.arch.name),
                            )
                            .at_line(line_no),
                        );
                    }
                    self.arch.type_no = n;
                    self.type_set = true;
                }
                None => self.bad_number(line_no, line, sink),
            },
            "direction" => match parse_number(value) {
                Some(n) => {
                    self.arch.direction = n;
                    self.arch.attributes.push(line.to_string());
                }
                None => self.bad_number(line_no, line, sink),
            },
            "face" => {
                self.arch.face = Some(value.to_string());
                self.arch.attributes.push(line.to_string());
            }
            "editor_folder" => self.folder = Some(value.to_string()),
            "mpart_id" => match parse_number(value) {
                Some(n) => {
                    if n <= 0 || n >= 16 {
                        sink.push(
                            Diagnostic::warning(
                                "archmap::parse::shape-id",
                                format!("'{}' has invalid mpart_id {}", self.arch.name, n),
                            )
                            .at_line(line_no),
                        );
                    }
                    self.arch.multi_shape_id = n;
                }
                None => self.bad_number(line_no, line, sink),
            },
            "mpart_nr" => match parse_number(value) {
                Some(n) => self.arch.multi_part_nr = n,
                None => self.bad_number(line_no, line, sink),
            },
            _ => self.arch.attributes.push(line.to_string()),
        }
        Step::Continue
    }

    fn bad_number(&mut self, line_no: usize, line: &str, sink: &mut dyn DiagnosticSink) {
        sink.push(
            Diagnostic::warning(
                "archmap::parse::bad-number",
                format!("'{}' in '{}' is not a number", line, self.arch.name),
            )
            .at_line(line_no),
        );
        self.arch.attributes.push(line.to_string());
    }

    /// Finalize the object after its `end` line.
    pub(crate) fn finish(mut self, sink: &mut dyn DiagnosticSink) -> ParsedObject {
        if !self.type_set {
            sink.push(
                Diagnostic::warning(
                    "archmap::parse::missing-type",
                    format!("'{}' has no type, using 0", self.arch.name),
                )
                .at_line(self.start_line),
            );
            self.arch.type_no = 0;
        }
        promote_fields(&mut self.arch, sink);
        ParsedObject {
            arch: self.arch,
            is_tail: self.is_tail,
            folder: self.folder,
        }
    }

    /// Report an object cut off by the end of input.
    pub(crate) fn unterminated(self, sink: &mut dyn DiagnosticSink) {
        sink.push(
            Diagnostic::error(
                "archmap::parse::unterminated",
                format!("Object '{}' is missing its 'end' line", self.arch.name),
            )
            .at_line(self.start_line),
        );
    }
}

/// Move `name` and `editable` lines into structured fields.
///
/// Lines between `start_script_…` and `end_script_…` are left alone.
fn promote_fields(arch: &mut Archetype, sink: &mut dyn DiagnosticSink) {
    let mut in_script = false;
    let mut kept = Vec::with_capacity(arch.attributes.len());

    for line in std::mem::take(&mut arch.attributes) {
        let (key, value) = split_key(&line);
        if key.starts_with("start_script_") {
            in_script = true;
        } else if key.starts_with("end_script_") {
            in_script = false;
        } else if !in_script && key == "name" {
            arch.object_name = Some(value.to_string());
            continue;
        } else if !in_script && key == "editable" {
            match parse_number(value) {
                Some(n) => {
                    arch.edit_type = EditType::from_bits_truncate(u32::try_from(n).unwrap_or(0));
                    continue;
                }
                None => sink.warning(
                    "archmap::parse::bad-number",
                    format!("'{}' in '{}' is not a number", line, arch.name),
                ),
            }
        }
        kept.push(line);
    }
    arch.attributes = kept;
}

/// Parse an archetype definition file.
///
/// Archetypes are returned in file order with ids equal to their index, so
/// each head is directly followed by its tails. `category` is the initial
/// category; `editor_folder` lines replace it for the rest of the file.
pub fn parse_archetypes(
    source: &str,
    category: Option<&str>,
    sink: &mut dyn DiagnosticSink,
) -> Vec<Archetype> {
    let mut out: Vec<Archetype> = Vec::new();
    let mut category = category.map(str::to_string);
    let mut current: Option<ObjectParser> = None;
    let mut more = false;
    let mut head: Option<usize> = None;

    for (line_no, raw) in Lines::new(source) {
        if let Some(parser) = current.as_mut() {
            if let Step::Done = parser.feed(line_no, raw, sink) {
                if let Some(parser) = current.take() {
                    let parsed = parser.finish(sink);
                    if let Some(folder) = &parsed.folder {
                        category = Some(folder.clone());
                    }
                    commit(&mut out, &mut head, parsed, category.as_deref());
                }
            }
            continue;
        }

        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (key, value) = split_key(line);
        match key {
            "More" => more = true,
            "Object" => {
                let is_tail = std::mem::take(&mut more);
                if is_tail && head.is_none() {
                    sink.push(
                        Diagnostic::error(
                            "archmap::parse::orphan-tail",
                            format!("'More' before '{}' has no head object", value),
                        )
                        .at_line(line_no),
                    );
                }
                let is_tail = is_tail && head.is_some();
                current = Some(ObjectParser::new(Archetype::new(value), false, is_tail, line_no));
            }
            _ => sink.push(
                Diagnostic::warning(
                    "archmap::parse::stray-line",
                    format!("Line outside of any object ignored: '{}'", line),
                )
                .at_line(line_no),
            ),
        }
    }

    if let Some(parser) = current {
        parser.unterminated(sink);
    }
    out
}

fn commit(out: &mut Vec<Archetype>, head: &mut Option<usize>, parsed: ParsedObject, category: Option<&str>) {
    let mut arch = parsed.arch;
    arch.id = ArchId(out.len());

    match (*head, parsed.is_tail) {
        (Some(h), true) => {
            arch.multi.head = Some(ArchId(h));
            arch.category = out[h].category.clone();
            out[h].multi.tail_count += 1;
        }
        _ => {
            if arch.name != "map" {
                arch.category = category.map(str::to_string);
            }
            *head = Some(out.len());
        }
    }
    out.push(arch);
}
