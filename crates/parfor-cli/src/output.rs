//! Rendering of pipeline results.
//!
//! Rewritten sources go to stdout, byte for byte. Diagnostics go to stderr,
//! either in a compiler-style human format or as one JSON object per line.

use std::io::Write;
use std::path::Path;

use clap::ValueEnum;
use parfor::{Diagnostic, DiagnosticCode, FileReport, PipelineReport, Severity, SourceLocation};
use serde::Serialize;

use crate::AppError;

/// Output format selection for diagnostics.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    /// `path:line:col: severity: message [code]` lines plus a summary.
    #[default]
    Human,
    /// One JSON object per diagnostic per line.
    Json,
}

/// Renders one diagnostic and its notes in the human format.
///
/// Every line, including the last, ends with a newline.
#[must_use]
pub fn render_human(diagnostic: &Diagnostic) -> String {
    let prefix = diagnostic
        .location()
        .map_or_else(|| String::from("parfor"), ToString::to_string);
    let mut lines = vec![format!(
        "{prefix}: {}: {} [{}]",
        diagnostic.severity(),
        diagnostic.message(),
        diagnostic.code()
    )];
    for note in diagnostic.notes() {
        lines.push(note.location().map_or_else(
            || format!("  note: {}", note.message()),
            |location| format!("  {location}: note: {}", note.message()),
        ));
    }
    let mut rendered = lines.join("\n");
    rendered.push('\n');
    rendered
}

/// Returns the closing `N error(s), M warning(s) generated.` line, or `None`
/// when the run produced neither.
#[must_use]
pub fn render_summary(report: &PipelineReport) -> Option<String> {
    let errors = report.count(Severity::Error);
    let warnings = report.count(Severity::Warning);
    (errors > 0 || warnings > 0)
        .then(|| format!("{errors} error(s), {warnings} warning(s) generated."))
}

/// Diagnostic as serialised in the JSON format.
#[derive(Debug, Serialize)]
struct DiagnosticRecord<'a> {
    file: &'a Path,
    code: DiagnosticCode,
    severity: Severity,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    line: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    column: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    notes: Vec<NoteRecord<'a>>,
}

#[derive(Debug, Serialize)]
struct NoteRecord<'a> {
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    line: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    column: Option<u32>,
}

fn position(location: Option<&SourceLocation>) -> (Option<u32>, Option<u32>) {
    location.map_or((None, None), |location| {
        let (line, column) = location.span().start().one_based();
        (Some(line), Some(column))
    })
}

impl<'a> DiagnosticRecord<'a> {
    fn new(file: &'a FileReport, diagnostic: &'a Diagnostic) -> Self {
        let (line, column) = position(diagnostic.location());
        let notes = diagnostic
            .notes()
            .iter()
            .map(|note| {
                let (note_line, note_column) = position(note.location());
                NoteRecord {
                    message: note.message(),
                    line: note_line,
                    column: note_column,
                }
            })
            .collect();
        Self {
            file: diagnostic
                .location()
                .map_or_else(|| file.path(), SourceLocation::path),
            code: diagnostic.code(),
            severity: diagnostic.severity(),
            message: diagnostic.message(),
            line,
            column,
            notes,
        }
    }
}

/// Writes every diagnostic of `report` to `stderr` in `format`.
pub(crate) fn write_diagnostics<E: Write>(
    report: &PipelineReport,
    format: OutputFormat,
    stderr: &mut E,
) -> Result<(), AppError> {
    for file in report.files() {
        for diagnostic in file.diagnostics().diagnostics() {
            match format {
                OutputFormat::Human => stderr
                    .write_all(render_human(diagnostic).as_bytes())
                    .map_err(AppError::EmitDiagnostics)?,
                OutputFormat::Json => {
                    serde_json::to_writer(&mut *stderr, &DiagnosticRecord::new(file, diagnostic))
                        .map_err(AppError::SerialiseDiagnostic)?;
                    stderr.write_all(b"\n").map_err(AppError::EmitDiagnostics)?;
                }
            }
        }
    }

    if format == OutputFormat::Human {
        if let Some(summary) = render_summary(report) {
            writeln!(stderr, "{summary}").map_err(AppError::EmitDiagnostics)?;
        }
    }
    stderr.flush().map_err(AppError::EmitDiagnostics)
}

/// Writes the full text of every rewritten file to `stdout`, in input order.
pub(crate) fn write_rewritten<W: Write>(
    report: &PipelineReport,
    stdout: &mut W,
) -> Result<(), AppError> {
    for (_, text) in report.rewritten_files() {
        stdout
            .write_all(text.as_bytes())
            .map_err(AppError::EmitOutput)?;
        if !text.is_empty() && !text.ends_with('\n') {
            stdout.write_all(b"\n").map_err(AppError::EmitOutput)?;
        }
    }
    stdout.flush().map_err(AppError::EmitOutput)
}
