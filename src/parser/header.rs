//! Codec for the `arch map … end` header block of a map file.

use crate::error::{ArchError, Result};
use crate::types::{MapFlags, MapHeader, TILE_PATH_COUNT};
use crate::validation::{Diagnostic, DiagnosticSink};

use super::lines::{parse_number, split_key, Lines};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Section {
    Fields,
    Msg,
    Lore,
}

/// Parse the header block, consuming lines up to and including its `end`.
///
/// A document that does not start with `arch map` is not a map file and
/// fails; malformed values inside the header read as 0 and are reported.
pub(crate) fn parse_header(lines: &mut Lines<'_>, sink: &mut dyn DiagnosticSink) -> Result<MapHeader> {
    let first = lines.by_ref().find(|(_, line)| !line.trim().is_empty());
    match first {
        Some((_, line)) if line.trim() == "arch map" => {}
        _ => {
            return Err(ArchError::Parse {
                message: "document does not contain a valid map format".to_string(),
                help: Some("A map file must start with an 'arch map' header block".to_string()),
            })
        }
    }

    let mut header = MapHeader {
        name: String::new(),
        ..MapHeader::default()
    };
    let mut section = Section::Fields;
    let mut block: Vec<String> = Vec::new();

    for (line_no, raw) in lines.by_ref() {
        let line = raw.trim();
        match section {
            Section::Msg => {
                if line == "endmsg" {
                    header.msg = std::mem::take(&mut block).join("\n");
                    section = Section::Fields;
                } else {
                    block.push(raw.to_string());
                }
                continue;
            }
            Section::Lore => {
                if line == "endmaplore" {
                    header.lore = std::mem::take(&mut block).join("\n");
                    section = Section::Fields;
                } else {
                    block.push(raw.to_string());
                }
                continue;
            }
            Section::Fields => {}
        }

        if line.is_empty() {
            continue;
        }
        let (key, value) = split_key(line);
        let mut number = || match parse_number(value) {
            Some(n) => n,
            None => {
                sink.push(
                    Diagnostic::warning(
                        "archmap::parse::bad-number",
                        format!("Map header line '{}' is not a number, using 0", line),
                    )
                    .at_line(line_no),
                );
                0
            }
        };

        match key {
            "end" => return Ok(header),
            "msg" => section = Section::Msg,
            "maplore" => section = Section::Lore,
            "name" => header.name = value.to_string(),
            "bg_music" => header.bg_music = Some(value.to_string()),
            "width" | "x" => header.width = usize::try_from(number()).unwrap_or(0),
            "height" | "y" => header.height = usize::try_from(number()).unwrap_or(0),
            "enter_x" | "hp" => header.enter_x = number(),
            "enter_y" | "sp" => header.enter_y = number(),
            "reset_timeout" | "weight" => header.reset_timeout = number(),
            "swap_time" | "value" => header.swap_time = number(),
            "difficulty" | "level" => header.difficulty = number(),
            "darkness" | "invisible" => header.darkness = number(),
            "fixed_resettime" | "stand_still" => header.fixed_resettime = number() != 0,
            "unique" => header.unique = number() != 0,
            "outdoor" => header.outdoor = number() != 0,
            "temp" => header.temp = number(),
            "pressure" => header.pressure = number(),
            "humid" => header.humid = number(),
            "windspeed" => header.windspeed = number(),
            "winddir" => header.winddir = number(),
            "sky" => header.sky = number(),
            _ => {
                if let Some(flag) = MapFlags::from_key(key) {
                    header.flags.set(flag, number() != 0);
                } else if let Some(slot) = tile_path_slot(key) {
                    header.tile_paths[slot] = Some(value.to_string());
                } else {
                    header.extra.push(line.to_string());
                }
            }
        }
    }

    Err(ArchError::Parse {
        message: "map header is missing its 'end' line".to_string(),
        help: None,
    })
}

fn tile_path_slot(key: &str) -> Option<usize> {
    let n: usize = key.strip_prefix("tile_path_")?.parse().ok()?;
    (1..=TILE_PATH_COUNT).contains(&n).then(|| n - 1)
}

/// Append the header block to `out`.
///
/// Fields are written in a fixed order and omitted while they hold their
/// default; the message block is always written.
pub(crate) fn encode_header(header: &MapHeader, out: &mut String) {
    let mut line = |text: String| {
        out.push_str(&text);
        out.push('\n');
    };

    line("arch map".to_string());
    if !header.name.is_empty() {
        line(format!("name {}", header.name));
    }
    if let Some(music) = header.bg_music.as_deref().filter(|m| !m.is_empty()) {
        line(format!("bg_music {}", music));
    }

    line("msg".to_string());
    let msg = header.msg.trim();
    if !msg.is_empty() {
        line(msg.to_string());
    }
    line("endmsg".to_string());

    let lore = header.lore.trim();
    if !lore.is_empty() {
        line("maplore".to_string());
        line(lore.to_string());
        line("endmaplore".to_string());
    }

    if header.width > 0 {
        line(format!("width {}", header.width));
    }
    if header.height > 0 {
        line(format!("height {}", header.height));
    }
    if header.enter_x > 0 {
        line(format!("enter_x {}", header.enter_x));
    }
    if header.enter_y > 0 {
        line(format!("enter_y {}", header.enter_y));
    }
    if header.reset_timeout > 0 {
        line(format!("reset_timeout {}", header.reset_timeout));
    }
    if header.swap_time > 0 {
        line(format!("swap_time {}", header.swap_time));
    }
    if header.difficulty > 0 {
        line(format!("difficulty {}", header.difficulty));
    }
    if header.darkness >= 0 {
        line(format!("darkness {}", header.darkness));
    }
    if header.fixed_resettime {
        line("fixed_resettime 1".to_string());
    }
    if header.unique {
        line("unique 1".to_string());
    }
    if header.outdoor {
        line("outdoor 1".to_string());
    }

    let weather = [
        ("temp", header.temp),
        ("pressure", header.pressure),
        ("humid", header.humid),
        ("windspeed", header.windspeed),
        ("winddir", header.winddir),
        ("sky", header.sky),
    ];
    for (key, value) in weather {
        if value != 0 {
            line(format!("{} {}", key, value));
        }
    }

    for (flag, key) in MapFlags::KEYS {
        if header.flags.contains(flag) {
            line(format!("{} 1", key));
        }
    }

    for (i, path) in header.tile_paths.iter().enumerate() {
        if let Some(path) = path.as_deref().filter(|p| !p.is_empty()) {
            line(format!("tile_path_{} {}", i + 1, path));
        }
    }

    for extra in &header.extra {
        line(extra.clone());
    }
    line("end".to_string());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::Diagnostics;
    use pretty_assertions::assert_eq;

    fn parse(source: &str) -> (Result<MapHeader>, Diagnostics) {
        let mut diags = Diagnostics::new();
        let mut lines = Lines::new(source);
        let header = parse_header(&mut lines, &mut diags);
        (header, diags)
    }

    #[test]
    fn test_parse_full_header() {
        let source = "\
arch map
name Town Square
bg_music town.ogg
msg
Created by someone.
endmsg
width 24
height 16
enter_x 3
enter_y 4
difficulty 2
darkness 0
outdoor 1
temp 15
no_magic 1
pvp 1
tile_path_2 /world/town_north
region town
end
";
        let (header, diags) = parse(source);
        let header = header.unwrap();
        assert!(diags.is_ok());
        assert_eq!(header.name, "Town Square");
        assert_eq!(header.bg_music.as_deref(), Some("town.ogg"));
        assert_eq!(header.msg, "Created by someone.");
        assert_eq!((header.width, header.height), (24, 16));
        assert_eq!((header.enter_x, header.enter_y), (3, 4));
        assert_eq!(header.darkness, 0);
        assert!(header.outdoor);
        assert!(header.flags.contains(MapFlags::NO_MAGIC | MapFlags::PVP));
        assert_eq!(header.tile_paths[1].as_deref(), Some("/world/town_north"));
        assert_eq!(header.extra, vec!["region town"]);

        let mut out = String::new();
        encode_header(&header, &mut out);
        assert_eq!(out, source);
    }

    #[test]
    fn test_legacy_aliases() {
        let (header, _) = parse("arch map\nx 10\ny 12\nhp 2\nsp 3\nweight 100\nvalue 50\nlevel 4\ninvisible 2\nstand_still 1\nend\n");
        let header = header.unwrap();
        assert_eq!((header.width, header.height), (10, 12));
        assert_eq!((header.enter_x, header.enter_y), (2, 3));
        assert_eq!(header.reset_timeout, 100);
        assert_eq!(header.swap_time, 50);
        assert_eq!(header.difficulty, 4);
        assert_eq!(header.darkness, 2);
        assert!(header.fixed_resettime);
    }

    #[test]
    fn test_bad_number_reads_zero() {
        let (header, diags) = parse("arch map\nwidth wide\nend\n");
        assert_eq!(header.unwrap().width, 0);
        assert!(diags.contains_code("archmap::parse::bad-number"));
    }

    #[test]
    fn test_missing_header_fails() {
        let (header, _) = parse("arch chair\nend\n");
        assert!(matches!(header, Err(ArchError::Parse { .. })));
    }

    #[test]
    fn test_unterminated_header_fails() {
        let (header, _) = parse("arch map\nname x\n");
        assert!(header.is_err());
    }

    #[test]
    fn test_encode_defaults() {
        let mut out = String::new();
        encode_header(&MapHeader::new("empty", 3, 2), &mut out);
        assert_eq!(out, "arch map\nname empty\nmsg\nendmsg\nwidth 3\nheight 2\nend\n");
    }
}
