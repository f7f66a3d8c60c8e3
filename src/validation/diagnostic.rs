//! Diagnostic types shared by the parsers, the map model and validation.
//!
//! Recoverable problems (bad numbers, unknown archetypes, broken links) never
//! abort an operation. They are pushed into a [`DiagnosticSink`] and the
//! operation continues with a sensible default.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recoverable problem found while loading or checking a map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Stable code such as `archmap::parse::bad-number`.
    pub code: String,
    pub message: String,
    pub help: Option<String>,
    /// 1-indexed source line, when the diagnostic comes from a parser.
    pub line: Option<usize>,
}

impl Diagnostic {
    pub fn new(severity: Severity, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity,
            code: code.into(),
            message: message.into(),
            help: None,
            line: None,
        }
    }

    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, code, message)
    }

    pub fn warning(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, code, message)
    }

    pub fn with_help(self, help: impl Into<String>) -> Self {
        Self {
            help: Some(help.into()),
            ..self
        }
    }

    /// Attach a source line number.
    pub fn at_line(self, line: usize) -> Self {
        Self {
            line: Some(line),
            ..self
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.severity, self.code)?;
        if let Some(line) = self.line {
            write!(f, " line {}", line)?;
        }
        write!(f, ": {}", self.message)
    }
}

/// Receiver for recoverable problems.
pub trait DiagnosticSink {
    fn push(&mut self, diagnostic: Diagnostic);

    fn warning(&mut self, code: &str, message: String) {
        self.push(Diagnostic::warning(code, message));
    }

    fn error(&mut self, code: &str, message: String) {
        self.push(Diagnostic::error(code, message));
    }

    /// Forward diagnostics collected elsewhere.
    fn extend(&mut self, diagnostics: Diagnostics) {
        for diagnostic in diagnostics {
            self.push(diagnostic);
        }
    }
}

/// Collects diagnostics and mirrors each one to `tracing`.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of diagnostics at exactly `severity`.
    pub fn count(&self, severity: Severity) -> usize {
        self.items.iter().filter(|d| d.severity == severity).count()
    }

    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    pub fn has_errors(&self) -> bool {
        self.items.iter().any(Diagnostic::is_error)
    }

    pub fn has_warnings(&self) -> bool {
        self.items.iter().any(|d| !d.is_error())
    }

    /// Nothing was reported.
    pub fn is_ok(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains_code(&self, code: &str) -> bool {
        self.items.iter().any(|d| d.code == code)
    }

    /// Append another collection without tracing its entries again.
    pub fn merge(&mut self, other: Diagnostics) {
        self.items.extend(other.items);
    }

    /// Move all diagnostics out, leaving this collection empty.
    pub fn take(&mut self) -> Diagnostics {
        std::mem::take(self)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.items.iter()
    }
}

impl DiagnosticSink for Diagnostics {
    fn push(&mut self, diagnostic: Diagnostic) {
        let Diagnostic {
            severity,
            code,
            message,
            line,
            ..
        } = &diagnostic;
        match severity {
            Severity::Warning => tracing::warn!(%code, ?line, "{}", message),
            Severity::Error => tracing::error!(%code, ?line, "{}", message),
        }
        self.items.push(diagnostic);
    }

    fn extend(&mut self, diagnostics: Diagnostics) {
        self.merge(diagnostics);
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
