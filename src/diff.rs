//! Delta computation between an object's attribute lines and its archetype.
//!
//! Lines are compared after trimming. The key of a line is the text before
//! its first space (`"hp 10"` has key `hp`). Structured fields such as the
//! name, message or type never pass through here.

/// Key of an attribute line.
pub fn line_key(line: &str) -> &str {
    let line = line.trim();
    match line.find(' ') {
        Some(pos) => &line[..pos],
        None => line,
    }
}

/// Value part of an attribute line, if it has one.
pub fn line_value(line: &str) -> Option<&str> {
    let line = line.trim();
    line.find(' ').map(|pos| line[pos + 1..].trim())
}

/// Lines of `instance` that do not occur in `archetype`, in instance order.
///
/// Blank lines are dropped.
pub fn diff_lines(instance: &[String], archetype: &[String]) -> Vec<String> {
    instance
        .iter()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .filter(|line| !archetype.iter().any(|a| a.trim() == *line))
        .map(str::to_string)
        .collect()
}

/// Archetype lines whose key does not occur in `instance`.
pub fn missing_keys(instance: &[String], archetype: &[String]) -> Vec<String> {
    archetype
        .iter()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .filter(|line| {
            let key = line_key(line);
            !instance.iter().any(|i| line_key(i) == key)
        })
        .map(str::to_string)
        .collect()
}

/// Re-attach a delta to its archetype.
///
/// Archetype lines are emitted in order, each replaced by the first delta
/// line with the same key; delta lines that replaced nothing follow.
pub fn reconstruct(delta: &[String], archetype: &[String]) -> Vec<String> {
    let mut used = vec![false; delta.len()];
    let mut out = Vec::with_capacity(archetype.len() + delta.len());

    for line in archetype {
        let key = line_key(line);
        let replacement = delta
            .iter()
            .enumerate()
            .find(|(i, d)| !used[*i] && line_key(d) == key);
        match replacement {
            Some((i, d)) => {
                used[i] = true;
                out.push(d.trim().to_string());
            }
            None => out.push(line.trim().to_string()),
        }
    }

    out.extend(
        delta
            .iter()
            .zip(used)
            .filter(|(_, used)| !used)
            .map(|(d, _)| d.trim().to_string()),
    );
    out
}

/// Remove delta lines that are identical to an archetype line.
///
/// Returns the number of lines removed.
pub fn strip_inherited(delta: &mut Vec<String>, archetype: &[String]) -> usize {
    let before = delta.len();
    delta.retain(|line| !archetype.iter().any(|a| a.trim() == line.trim()));
    before - delta.len()
}

fn last_value<'a>(lines: &'a [String], key: &str) -> Option<&'a str> {
    lines
        .iter()
        .rev()
        .find(|line| line_key(line) == key)
        .map(|line| line_value(line).unwrap_or(""))
}

/// Value of `key`, looked up in the delta first and then the archetype.
///
/// The last occurrence wins within each list.
pub fn attribute_str<'a>(delta: &'a [String], archetype: &'a [String], key: &str) -> Option<&'a str> {
    last_value(delta, key).or_else(|| last_value(archetype, key))
}

/// Numeric value of `key`; absent or non-numeric values read as 0.
pub fn attribute_value(delta: &[String], archetype: &[String], key: &str) -> i32 {
    attribute_str(delta, archetype, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(0)
}
