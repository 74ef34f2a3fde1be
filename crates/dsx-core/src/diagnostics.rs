//! Diagnostics collected during a single load.
//!
//! Every problem that does not abort the load ends up here: substituted
//! attribute defaults, ordering notes, duplicate ids, unknown tags and
//! elements that were dropped. Each entry is also forwarded to the `log`
//! facade at a level matching its severity.

use std::fmt;

/// How serious a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    fn log_level(self) -> log::Level {
        match self {
            Severity::Info => log::Level::Info,
            Severity::Warning => log::Level::Warn,
            Severity::Error => log::Level::Error,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        f.write_str(name)
    }
}

/// What went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// Missing or out-of-range attribute replaced by a default.
    Field,
    /// Section or child tag outside its canonical position.
    Ordering,
    /// Id declared more than once within one table.
    DuplicateId,
    /// Unrecognised child tag, skipped.
    UnknownTag,
    /// An element was dropped: missing id, unresolved reference, invalid value.
    Element,
    /// Per-section summary of dropped elements.
    Skipped,
    /// Component with no children and no shape.
    EmptyComponent,
}

impl DiagnosticKind {
    /// Default severity for this kind.
    pub fn severity(self) -> Severity {
        match self {
            DiagnosticKind::Ordering => Severity::Info,
            DiagnosticKind::Element => Severity::Error,
            DiagnosticKind::Field
            | DiagnosticKind::DuplicateId
            | DiagnosticKind::UnknownTag
            | DiagnosticKind::Skipped
            | DiagnosticKind::EmptyComponent => Severity::Warning,
        }
    }
}

/// A single recorded problem.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub severity: Severity,
    /// Where in the document, e.g. `materials > material 'wood'`.
    pub location: String,
    pub message: String,
    /// Source line of the offending element, when known.
    pub line: Option<usize>,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.severity, self.location)?;
        if let Some(line) = self.line {
            write!(f, " (line {line})")?;
        }
        write!(f, ": {}", self.message)
    }
}

/// Accumulator for the diagnostics of one load.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic and forward it to the logger.
    pub fn report(
        &mut self,
        kind: DiagnosticKind,
        location: impl Into<String>,
        line: Option<usize>,
        message: impl Into<String>,
    ) {
        let diagnostic = Diagnostic {
            kind,
            severity: kind.severity(),
            location: location.into(),
            message: message.into(),
            line,
        };
        log::log!(diagnostic.severity.log_level(), "{diagnostic}");
        self.entries.push(diagnostic);
    }

    /// Shorthand for a substituted attribute default.
    pub fn field(&mut self, location: impl Into<String>, line: Option<usize>, message: impl Into<String>) {
        self.report(DiagnosticKind::Field, location, line, message);
    }

    /// Shorthand for a dropped element.
    pub fn element(&mut self, location: impl Into<String>, line: Option<usize>, message: impl Into<String>) {
        self.report(DiagnosticKind::Element, location, line, message);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True when nothing above `Info` was recorded.
    pub fn is_clean(&self) -> bool {
        self.entries.iter().all(|d| d.severity == Severity::Info)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(|d| d.severity == Severity::Warning)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(|d| d.severity == Severity::Error)
    }

    pub fn first_error(&self) -> Option<&Diagnostic> {
        self.errors().next()
    }

    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.entries.iter().filter(|d| d.kind == kind).count()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
