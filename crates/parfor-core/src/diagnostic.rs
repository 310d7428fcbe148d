//! Diagnostic types for structured reporting.
//!
//! Every user-facing outcome of a run (accepted loops, misplaced annotations,
//! escape violations, unreadable files, conflicting edits) is surfaced as a
//! [`Diagnostic`]. Each diagnostic carries a stable [`DiagnosticCode`], a
//! [`Severity`], a rendered message, an optional source location, and
//! supplementary notes.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::span::SourceLocation;

/// How serious a diagnostic is.
///
/// Only [`Severity::Error`] gates rewriting; notes and warnings are purely
/// informational.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Informational remark.
    Note,
    /// Something worth attention that does not block the run.
    Warning,
    /// A hard failure for the site it is attached to.
    Error,
}

impl Severity {
    /// Returns the lower-case label used when rendering diagnostics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Note => "note",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stable identifiers for every diagnostic the tool can produce.
///
/// The set is closed: each code maps to exactly one registered message
/// template (see [`TemplateRegistry`](crate::TemplateRegistry)).
///
/// # Example
///
/// ```
/// use parfor_core::DiagnosticCode;
///
/// assert_eq!(DiagnosticCode::UnexpectedBreak.to_string(), "unexpected-break");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[non_exhaustive]
pub enum DiagnosticCode {
    /// An annotated loop passed every check and is eligible for rewriting.
    LoopAccepted,
    /// The parallel annotation is attached to something other than a
    /// range-based `for` loop.
    MisplacedAnnotation,
    /// A `break` escapes the parallel loop body.
    UnexpectedBreak,
    /// A `continue` escapes the parallel loop body.
    UnexpectedContinue,
    /// A `return` escapes the parallel loop body.
    UnexpectedReturn,
    /// A `goto` escapes the parallel loop body.
    UnexpectedGoto,
    /// The annotated loop has a shape the rewrite template cannot express.
    UnsupportedLoop,
    /// The source could not be parsed cleanly.
    SyntaxError,
    /// The input is not a C++ source file.
    UnsupportedFile,
    /// The input could not be read.
    UnreadableFile,
    /// The input changed between analysis and rewriting.
    StaleSource,
    /// Two rewrites target overlapping text in one file.
    EditConflict,
}

impl DiagnosticCode {
    /// Every code, in registration order.
    pub const ALL: [Self; 12] = [
        Self::LoopAccepted,
        Self::MisplacedAnnotation,
        Self::UnexpectedBreak,
        Self::UnexpectedContinue,
        Self::UnexpectedReturn,
        Self::UnexpectedGoto,
        Self::UnsupportedLoop,
        Self::SyntaxError,
        Self::UnsupportedFile,
        Self::UnreadableFile,
        Self::StaleSource,
        Self::EditConflict,
    ];

    /// Returns the kebab-case identifier for the code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LoopAccepted => "loop-accepted",
            Self::MisplacedAnnotation => "misplaced-annotation",
            Self::UnexpectedBreak => "unexpected-break",
            Self::UnexpectedContinue => "unexpected-continue",
            Self::UnexpectedReturn => "unexpected-return",
            Self::UnexpectedGoto => "unexpected-goto",
            Self::UnsupportedLoop => "unsupported-loop",
            Self::SyntaxError => "syntax-error",
            Self::UnsupportedFile => "unsupported-file",
            Self::UnreadableFile => "unreadable-file",
            Self::StaleSource => "stale-source",
            Self::EditConflict => "edit-conflict",
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Supplementary context attached to a diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticNote {
    message: String,
    location: Option<SourceLocation>,
}

impl DiagnosticNote {
    /// Creates a note, optionally pointing at a second location.
    #[must_use]
    pub fn new(message: impl Into<String>, location: Option<SourceLocation>) -> Self {
        Self {
            message: message.into(),
            location,
        }
    }

    /// Returns the note text.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the location the note points at, if any.
    #[must_use]
    pub const fn location(&self) -> Option<&SourceLocation> {
        self.location.as_ref()
    }
}

/// A single rendered diagnostic.
///
/// # Example
///
/// ```
/// use parfor_core::{Diagnostic, DiagnosticCode, Severity};
///
/// let diag = Diagnostic::new(
///     DiagnosticCode::UnreadableFile,
///     Severity::Error,
///     String::from("failed to read main.cpp: not found"),
///     None,
/// );
/// assert!(diag.is_error());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    code: DiagnosticCode,
    severity: Severity,
    message: String,
    location: Option<SourceLocation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    notes: Vec<DiagnosticNote>,
}

impl Diagnostic {
    /// Creates a diagnostic without notes.
    #[must_use]
    pub const fn new(
        code: DiagnosticCode,
        severity: Severity,
        message: String,
        location: Option<SourceLocation>,
    ) -> Self {
        Self {
            code,
            severity,
            message,
            location,
            notes: Vec::new(),
        }
    }

    /// Attaches a note and returns the diagnostic.
    #[must_use]
    pub fn with_note(mut self, note: DiagnosticNote) -> Self {
        self.notes.push(note);
        self
    }

    /// Returns the diagnostic code.
    #[must_use]
    pub const fn code(&self) -> DiagnosticCode {
        self.code
    }

    /// Returns the severity.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        self.severity
    }

    /// Returns the rendered message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the primary location, if available.
    #[must_use]
    pub const fn location(&self) -> Option<&SourceLocation> {
        self.location.as_ref()
    }

    /// Returns the supplementary notes.
    #[must_use]
    pub fn notes(&self) -> &[DiagnosticNote] {
        &self.notes
    }

    /// Returns `true` for error-severity diagnostics.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Receives diagnostics as they are emitted.
///
/// Emission has no return value; sinks only record.
pub trait DiagnosticSink {
    /// Records one diagnostic.
    fn report(&mut self, diagnostic: Diagnostic);
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

/// Summarises the first diagnostic in a report for the `Display` impl.
fn diagnostic_summary(diagnostics: &[Diagnostic]) -> String {
    diagnostics.first().map_or_else(
        || String::from("empty diagnostic report"),
        |d| format!("{}: {}", d.code, d.message),
    )
}

/// An ordered collection of diagnostics produced during one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{}", diagnostic_summary(&self.diagnostics))]
pub struct DiagnosticReport {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticReport {
    /// Creates a report from a vector of diagnostics.
    #[must_use]
    pub const fn new(diagnostics: Vec<Diagnostic>) -> Self {
        Self { diagnostics }
    }

    /// Returns the diagnostics in emission order.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Returns `true` if the report contains no diagnostics.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Returns the number of diagnostics in the report.
    #[must_use]
    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    /// Counts diagnostics of the given severity.
    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    /// Returns `true` if any diagnostic is an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    /// Iterates over the diagnostics carrying `code`.
    pub fn with_code(&self, code: DiagnosticCode) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(move |d| d.code == code)
    }
}

impl DiagnosticSink for DiagnosticReport {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }
}
