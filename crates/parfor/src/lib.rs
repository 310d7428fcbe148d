//! parfor: validate and parallelise `[[parallel]]` range-based `for` loops.
//!
//! This facade crate re-exports the stable types from [`parfor_core`] and
//! [`parfor_syntax`] and provides the [`Pipeline`] entrypoint that runs the
//! whole lint or transform pass over a set of C++ files.
//!
//! # Pipeline
//!
//! For every input file the pipeline:
//!
//! 1. parses the file and rejects `[[parallel]]` annotations placed on
//!    anything but a range-based `for` loop;
//! 2. classifies each annotated loop, reporting every `break`, `continue`,
//!    `return` or `goto` that escapes an iteration;
//! 3. in [`Mode::Transform`], rewrites each clean loop into
//!    `std::for_each(std::execution::par, ...)` and schedules the
//!    `<algorithm>` and `<execution>` includes.
//!
//! Edits from all files are collected into one [`ChangeSet`] and applied
//! after the last file, so a failure in one file never affects another.
//!
//! # Example
//!
//! ```
//! use std::path::Path;
//!
//! use parfor::{DiagnosticCode, Mode, Pipeline, PipelineOptions};
//!
//! let source = "void f(int *v) { [[parallel]] for (auto &i : v) { if (i) break; } }";
//! let reader = |_: &Path| -> std::io::Result<String> { Ok(String::from(source)) };
//!
//! let report = Pipeline::new(PipelineOptions::new(Mode::Lint)).run(["f.cpp"], &reader);
//!
//! let codes: Vec<_> = report.diagnostics().map(|d| d.code()).collect();
//! assert_eq!(codes, [DiagnosticCode::UnexpectedBreak]);
//! ```

mod pipeline;
mod report;

pub use parfor_core::{
    AcceptanceLevel, ApplyError, ApplyOutcome, ChangeSet, Diagnostic, DiagnosticCode,
    DiagnosticNote, DiagnosticReport, FsSourceReader, LineCol, RewriteEdit, Severity,
    SourceLocation, SourceReader, Span,
};
pub use parfor_syntax::{EscapeKind, PARALLEL_ATTRIBUTE, StatementKind, SupportedLanguage};

pub use pipeline::{Mode, Pipeline, PipelineOptions};
pub use report::{FileReport, PipelineReport};

#[cfg(test)]
mod tests;
