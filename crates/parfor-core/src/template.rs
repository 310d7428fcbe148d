//! Message templates and the central diagnostic emitter.
//!
//! Templates are registered once, when a pipeline is constructed, and are
//! immutable afterwards. The [`Emitter`] receives the registry by reference
//! and turns `(code, location, arguments)` triples into rendered
//! [`Diagnostic`]s pushed into a [`DiagnosticSink`].

use std::fmt;

use tracing::debug;

use crate::diagnostic::{Diagnostic, DiagnosticCode, DiagnosticNote, DiagnosticSink, Severity};
use crate::span::SourceLocation;

const DIAGNOSTICS_TARGET: &str = "parfor::diagnostics";

/// Severity used for the "loop accepted" notification.
///
/// Acceptance is never an error, so only the two informational levels are
/// representable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum AcceptanceLevel {
    /// Report accepted loops as notes.
    #[default]
    Note,
    /// Report accepted loops as warnings.
    Warning,
}

impl From<AcceptanceLevel> for Severity {
    fn from(level: AcceptanceLevel) -> Self {
        match level {
            AcceptanceLevel::Note => Self::Note,
            AcceptanceLevel::Warning => Self::Warning,
        }
    }
}

/// Opaque handle assigned to a template at registration time.
///
/// Identical messages always share one identifier within a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TemplateId(u16);

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A registered message template.
///
/// Messages may contain positional placeholders (`{0}`, `{1}`, ...) that are
/// filled from the arguments passed to [`Emitter::emit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticTemplate {
    id: TemplateId,
    code: DiagnosticCode,
    severity: Severity,
    message: &'static str,
}

impl DiagnosticTemplate {
    /// Returns the registry-assigned identifier.
    #[must_use]
    pub const fn id(&self) -> TemplateId {
        self.id
    }

    /// Returns the code the template is keyed by.
    #[must_use]
    pub const fn code(&self) -> DiagnosticCode {
        self.code
    }

    /// Returns the severity diagnostics from this template carry.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        self.severity
    }

    /// Returns the raw message text, placeholders included.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        self.message
    }

    /// Renders the message, substituting positional arguments.
    ///
    /// Placeholders without a matching argument are left untouched.
    ///
    /// # Example
    ///
    /// ```
    /// use parfor_core::{DiagnosticCode, TemplateRegistry};
    ///
    /// let registry = TemplateRegistry::default();
    /// let template = registry.get(DiagnosticCode::UnreadableFile);
    /// assert_eq!(
    ///     template.render(&["a.cpp", "denied"]),
    ///     "failed to read a.cpp: denied"
    /// );
    /// ```
    #[must_use]
    pub fn render(&self, args: &[&str]) -> String {
        render_placeholders(self.message, args)
    }
}

fn default_entry(code: DiagnosticCode, acceptance: AcceptanceLevel) -> (Severity, &'static str) {
    match code {
        DiagnosticCode::LoopAccepted => (
            acceptance.into(),
            "this for-range will be converted to parallel version",
        ),
        DiagnosticCode::MisplacedAnnotation => (
            Severity::Error,
            "'parallel' attribute only applies to for-range loop statements, not {0}",
        ),
        DiagnosticCode::UnexpectedBreak => (
            Severity::Error,
            "unexpected control flow statement 'break' found in parallel for-range",
        ),
        DiagnosticCode::UnexpectedContinue => (
            Severity::Error,
            "unexpected control flow statement 'continue' found in parallel for-range",
        ),
        DiagnosticCode::UnexpectedReturn => (
            Severity::Error,
            "unexpected control flow statement 'return' found in parallel for-range",
        ),
        DiagnosticCode::UnexpectedGoto => (
            Severity::Error,
            "unexpected control flow statement 'goto' found in parallel for-range",
        ),
        DiagnosticCode::UnsupportedLoop => (
            Severity::Warning,
            "parallel for-range left unchanged: {0}",
        ),
        DiagnosticCode::SyntaxError => (Severity::Error, "{0}"),
        DiagnosticCode::UnsupportedFile => {
            (Severity::Warning, "skipping {0}: not a C++ source file")
        }
        DiagnosticCode::UnreadableFile => (Severity::Error, "failed to read {0}: {1}"),
        DiagnosticCode::StaleSource => (
            Severity::Error,
            "{0} changed after it was analysed; rewrites discarded",
        ),
        DiagnosticCode::EditConflict => (
            Severity::Error,
            "conflicting rewrites in {0}: {1}",
        ),
    }
}

/// Immutable table mapping every [`DiagnosticCode`] to its template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateRegistry {
    templates: Vec<DiagnosticTemplate>,
}

impl TemplateRegistry {
    /// Registers the full template set.
    ///
    /// `acceptance` selects the severity of the "loop accepted"
    /// notification; every other severity is fixed.
    #[must_use]
    pub fn new(acceptance: AcceptanceLevel) -> Self {
        let mut templates: Vec<DiagnosticTemplate> = Vec::with_capacity(DiagnosticCode::ALL.len());
        for code in DiagnosticCode::ALL {
            let (severity, message) = default_entry(code, acceptance);
            let existing = templates
                .iter()
                .find(|t| t.severity == severity && t.message == message)
                .map(DiagnosticTemplate::id);
            let id = existing.unwrap_or_else(|| {
                TemplateId(u16::try_from(templates.len()).unwrap_or(u16::MAX))
            });
            templates.push(DiagnosticTemplate {
                id,
                code,
                severity,
                message,
            });
        }
        Self { templates }
    }

    /// Looks up the template registered for `code`.
    #[must_use]
    pub fn get(&self, code: DiagnosticCode) -> &DiagnosticTemplate {
        self.templates
            .iter()
            .find(|t| t.code == code)
            .unwrap_or(&FALLBACK_TEMPLATE)
    }

    /// Returns every registered template in registration order.
    #[must_use]
    pub fn templates(&self) -> &[DiagnosticTemplate] {
        &self.templates
    }
}

// `new` registers every code in `DiagnosticCode::ALL`; lookups only land here
// for a code added to the enum without a table entry.
static FALLBACK_TEMPLATE: DiagnosticTemplate = DiagnosticTemplate {
    id: TemplateId(u16::MAX),
    code: DiagnosticCode::SyntaxError,
    severity: Severity::Error,
    message: "{0}",
};

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::new(AcceptanceLevel::default())
    }
}

/// Central sink adapter that renders templates into diagnostics.
///
/// The emitter also counts the errors it has produced so callers can decide
/// whether a site may proceed to rewriting by comparing counts before and
/// after classifying it.
pub struct Emitter<'r, 's> {
    registry: &'r TemplateRegistry,
    sink: &'s mut dyn DiagnosticSink,
    errors: usize,
}

impl<'r, 's> Emitter<'r, 's> {
    /// Creates an emitter writing into `sink`.
    pub fn new(registry: &'r TemplateRegistry, sink: &'s mut dyn DiagnosticSink) -> Self {
        Self {
            registry,
            sink,
            errors: 0,
        }
    }

    /// Returns the registry the emitter renders from.
    #[must_use]
    pub const fn registry(&self) -> &'r TemplateRegistry {
        self.registry
    }

    /// Emits the diagnostic registered for `code`.
    pub fn emit(&mut self, code: DiagnosticCode, location: Option<SourceLocation>, args: &[&str]) {
        self.emit_with_notes(code, location, args, Vec::new());
    }

    /// Emits the diagnostic registered for `code` with supplementary notes.
    pub fn emit_with_notes(
        &mut self,
        code: DiagnosticCode,
        location: Option<SourceLocation>,
        args: &[&str],
        notes: Vec<DiagnosticNote>,
    ) {
        let template = self.registry.get(code);
        let mut diagnostic =
            Diagnostic::new(code, template.severity(), template.render(args), location);
        for note in notes {
            diagnostic = diagnostic.with_note(note);
        }

        debug!(
            target: DIAGNOSTICS_TARGET,
            code = %code,
            template = %template.id(),
            severity = %template.severity(),
            "diagnostic emitted"
        );

        if diagnostic.is_error() {
            self.errors = self.errors.saturating_add(1);
        }
        self.sink.report(diagnostic);
    }

    /// Returns the number of error-severity diagnostics emitted so far.
    #[must_use]
    pub const fn error_count(&self) -> usize {
        self.errors
    }

    /// Returns `true` once any error has been emitted.
    #[must_use]
    pub const fn has_errors(&self) -> bool {
        self.errors > 0
    }
}

/// Replaces `{N}` placeholders with the matching entry of `args`.
fn render_placeholders(message: &str, args: &[&str]) -> String {
    let mut out = String::with_capacity(message.len());
    let mut rest = message;

    while let Some(open) = rest.find('{') {
        let (before, from_brace) = rest.split_at(open);
        out.push_str(before);

        let after_brace = from_brace.get(1..).unwrap_or_default();
        let substituted = after_brace.find('}').and_then(|close| {
            let index: usize = after_brace.get(..close)?.parse().ok()?;
            let arg = args.get(index)?;
            Some((arg, close))
        });

        match substituted {
            Some((arg, close)) => {
                out.push_str(arg);
                rest = after_brace.get(close + 1..).unwrap_or_default();
            }
            None => {
                out.push('{');
                rest = after_brace;
            }
        }
    }

    out.push_str(rest);
    out
}
