//! Line reading shared by the text parsers.

/// Iterator over `(line_number, line)` with line numbers starting at 1.
///
/// Trailing whitespace and carriage returns are removed; leading
/// whitespace is kept so message blocks survive unchanged.
pub(crate) struct Lines<'a> {
    inner: std::iter::Enumerate<std::str::Lines<'a>>,
}

impl<'a> Lines<'a> {
    pub(crate) fn new(source: &'a str) -> Self {
        Self {
            inner: source.lines().enumerate(),
        }
    }
}

impl<'a> Iterator for Lines<'a> {
    type Item = (usize, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(i, line)| (i + 1, line.trim_end()))
    }
}

/// Split a trimmed line into its key and the rest.
pub(crate) fn split_key(line: &str) -> (&str, &str) {
    match line.find(' ') {
        Some(pos) => (&line[..pos], line[pos + 1..].trim()),
        None => (line, ""),
    }
}

/// Parse an integer value.
pub(crate) fn parse_number(value: &str) -> Option<i32> {
    value.trim().parse().ok()
}
