//! Encoder for map files.

use crate::diff::line_key;
use crate::map::MapModel;
use crate::types::InstanceId;

use super::header::encode_header;

/// Write a map in its text format.
///
/// Single-cell objects come first, cell by cell (x outer, y inner, bottom
/// to top), followed by the heads of multi-tile objects so their tails are
/// stacked above everything else when the file is read back. Only what
/// differs from the archetype is written.
pub fn encode_map(map: &MapModel) -> String {
    let mut out = String::new();
    encode_header(map.header(), &mut out);

    let mut multis: Vec<InstanceId> = Vec::new();
    for x in 0..map.width() as i32 {
        for y in 0..map.height() as i32 {
            for id in map.cell(x, y) {
                let Some(inst) = map.get(id) else {
                    continue;
                };
                if inst.is_tail() {
                    continue;
                }
                if map.is_multi(id) {
                    multis.push(id);
                } else {
                    encode_object(map, id, true, &mut out);
                }
            }
        }
    }
    for id in multis {
        encode_object(map, id, true, &mut out);
    }
    out
}

fn encode_object(map: &MapModel, id: InstanceId, top_level: bool, out: &mut String) {
    let Some(inst) = map.get(id) else {
        return;
    };
    let arch = map.archetype_of(inst);
    let mut line = |text: &str| {
        out.push_str(text);
        out.push('\n');
    };

    line(&format!("arch {}", inst.arch_name));
    if let Some(name) = &inst.name {
        line(&format!("name {}", name));
    }

    let blocks = [
        ("msg", "endmsg", &inst.msg, arch.map_or("", |a| a.msg_text())),
        ("lore", "endlore", &inst.lore, arch.map_or("", |a| a.lore_text())),
    ];
    for (start, end, text, inherited) in blocks {
        let Some(text) = text else {
            continue;
        };
        if !text.trim().is_empty() && text.trim() == inherited.trim() {
            continue;
        }
        line(start);
        if !text.is_empty() {
            line(text.as_str());
        }
        line(end);
    }

    // A written type replaces any `type` text kept in the delta.
    let type_written = match inst.type_no {
        Some(type_no) if arch.map_or(true, |a| a.type_no != type_no) => {
            line(&format!("type {}", type_no));
            true
        }
        _ => false,
    };
    for attribute in &inst.attributes {
        if type_written && line_key(attribute) == "type" {
            continue;
        }
        line(attribute.as_str());
    }
    if let Some(anim) = &inst.anim {
        line("anim");
        if !anim.is_empty() {
            line(anim.as_str());
        }
        line("mina");
    }

    if top_level {
        if inst.x != 0 {
            line(&format!("x {}", inst.x));
        }
        if inst.y != 0 {
            line(&format!("y {}", inst.y));
        }
    }

    for child in map.inventory(id) {
        encode_object(map, child, false, out);
    }
    out.push_str("end\n");
}
