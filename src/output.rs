//! Terminal output for the archmap CLI.
//!
//! Status lines go to stderr with a right-aligned verb column; stdout is
//! reserved for machine-readable output such as `list --json`.

use std::io::{self, IsTerminal, Write};
use std::path::Path;

use crate::validation::{Diagnostics, Severity};

/// Verbs are right-aligned to this width, like cargo.
const VERB_WIDTH: usize = 12;

#[derive(Debug, Clone, Copy)]
enum Tone {
    Green,
    Cyan,
    Yellow,
    Red,
    Dim,
}

impl Tone {
    fn ansi(self) -> &'static str {
        match self {
            Tone::Green => "\x1b[32m",
            Tone::Cyan => "\x1b[36m",
            Tone::Yellow => "\x1b[33m",
            Tone::Red => "\x1b[31m",
            Tone::Dim => "\x1b[2m",
        }
    }
}

const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Terminal-aware status printer. Colour is used when stderr is a terminal.
#[derive(Debug, Clone, Copy)]
pub struct Printer {
    color: bool,
}

impl Default for Printer {
    fn default() -> Self {
        Self::new()
    }
}

impl Printer {
    pub fn new() -> Self {
        Self {
            color: io::stderr().is_terminal(),
        }
    }

    /// Printer without colour, for tests and piped output.
    pub fn plain() -> Self {
        Self { color: false }
    }

    /// e.g. "     Opening maps/town/square"
    pub fn status(&self, verb: &str, message: &str) {
        self.line(Tone::Green, verb, message);
    }

    pub fn success(&self, verb: &str, message: &str) {
        self.line(Tone::Green, verb, message);
    }

    pub fn info(&self, verb: &str, message: &str) {
        self.line(Tone::Cyan, verb, message);
    }

    pub fn warning(&self, verb: &str, message: &str) {
        self.line(Tone::Yellow, verb, message);
    }

    pub fn error(&self, verb: &str, message: &str) {
        self.line(Tone::Red, verb, message);
    }

    pub fn dim(&self, text: &str) -> String {
        self.paint(Tone::Dim, false, text)
    }

    pub fn cyan(&self, text: &str) -> String {
        self.paint(Tone::Cyan, false, text)
    }

    /// Severity label, red for errors and yellow for warnings.
    pub fn severity(&self, severity: Severity) -> String {
        let tone = match severity {
            Severity::Error => Tone::Red,
            Severity::Warning => Tone::Yellow,
        };
        self.paint(tone, true, severity.as_str())
    }

    /// Print each diagnostic with its code, line and help text.
    pub fn diagnostics(&self, diagnostics: &Diagnostics) {
        let mut out = io::stderr().lock();
        for d in diagnostics {
            let at = d.line.map(|l| format!(" line {}", l)).unwrap_or_default();
            let label = self.severity(d.severity);
            let code = self.dim(&format!("[{}]", d.code));
            let _ = writeln!(out, "{label:>VERB_WIDTH$} {code}{at}: {}", d.message);
            if let Some(help) = d.help.as_deref() {
                let _ = writeln!(out, "{:>VERB_WIDTH$} {}", "", self.dim(&format!("help: {}", help)));
            }
        }
    }

    fn paint(&self, tone: Tone, bold: bool, text: &str) -> String {
        match (self.color, bold) {
            (false, _) => text.to_string(),
            (true, false) => format!("{}{text}{RESET}", tone.ansi()),
            (true, true) => format!("{BOLD}{}{text}{RESET}", tone.ansi()),
        }
    }

    fn line(&self, tone: Tone, verb: &str, message: &str) {
        let verb = format!("{verb:>VERB_WIDTH$}");
        let _ = writeln!(io::stderr().lock(), "{} {message}", self.paint(tone, true, &verb));
    }
}

/// `plural(1, "map", "maps")` gives "1 map".
pub fn plural(n: usize, singular: &str, many: &str) -> String {
    format!("{} {}", n, if n == 1 { singular } else { many })
}

/// Summary of a diagnostics run: "2 errors, 1 warning".
pub fn summary(diagnostics: &Diagnostics) -> String {
    format!(
        "{}, {}",
        plural(diagnostics.error_count(), "error", "errors"),
        plural(diagnostics.warning_count(), "warning", "warnings")
    )
}

/// Path relative to the working directory when it lies below it.
pub fn display_path(path: &Path) -> String {
    let relative = std::env::current_dir()
        .ok()
        .and_then(|cwd| path.strip_prefix(cwd).ok().map(Path::to_path_buf));
    match relative {
        Some(rel) if rel.as_os_str().is_empty() => ".".to_string(),
        Some(rel) => rel.display().to_string(),
        None => path.display().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{Diagnostic, DiagnosticSink};

    #[test]
    fn test_plural() {
        assert_eq!(plural(1, "map", "maps"), "1 map");
        assert_eq!(plural(0, "map", "maps"), "0 maps");
        assert_eq!(plural(5, "tail", "tails"), "5 tails");
    }

    #[test]
    fn test_summary() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.push(Diagnostic::error("archmap::test", "a"));
        diagnostics.push(Diagnostic::warning("archmap::test", "b"));
        diagnostics.push(Diagnostic::warning("archmap::test", "c"));
        assert_eq!(summary(&diagnostics), "1 error, 2 warnings");
    }

    #[test]
    fn test_plain_printer_has_no_escapes() {
        let printer = Printer::plain();
        assert_eq!(printer.severity(Severity::Error), "error");
        assert_eq!(printer.dim("x"), "x");
    }

    #[test]
    fn test_display_path_outside_cwd_stays_absolute() {
        let p = Path::new("/nonexistent/maps/town");
        assert_eq!(display_path(p), "/nonexistent/maps/town");
    }

    #[test]
    fn test_display_path_cwd_is_dot() {
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(display_path(&cwd), ".");
    }
}
