//! Core value types for the parfor loop-parallelisation pipeline.
//!
//! This crate holds everything the pipeline stages share that does not
//! depend on a parser: source spans, diagnostics and their message
//! templates, offset-addressed rewrite edits, the per-file change set and
//! the edit applier. It is re-exported by the `parfor` facade crate.
//!
//! # Core types
//!
//! - [`Span`], [`LineCol`] and [`SourceLocation`]: positions in a file
//! - [`Diagnostic`], [`DiagnosticCode`] and [`Severity`]: reported outcomes
//! - [`TemplateRegistry`] and [`Emitter`]: template-driven diagnostic emission
//! - [`RewriteEdit`] and [`ChangeSet`]: edits grouped by file
//! - [`SourceReader`] and [`ApplyOutcome`]: finalising a change set
//!
//! # Example
//!
//! ```
//! use std::path::Path;
//!
//! use parfor_core::{ChangeSet, RewriteEdit, SourceDigest};
//!
//! let path = Path::new("main.cpp");
//! let source = "int x;";
//! let mut changes = ChangeSet::new();
//! changes.extend_file(
//!     path,
//!     SourceDigest::of(source),
//!     [RewriteEdit::replace(path, 4..5, "y")],
//! );
//!
//! let reader = |_: &Path| -> std::io::Result<String> { Ok(String::from(source)) };
//! let outcome = changes.apply_with(&reader);
//! assert_eq!(outcome.files()[0].rewritten(), Some("int y;"));
//! ```

mod apply;
mod diagnostic;
mod edit;
mod span;
mod template;

pub use apply::{
    ApplyError, ApplyOutcome, FileOutcome, FsSourceReader, SourceReader, apply_edits,
};
pub use diagnostic::{
    Diagnostic, DiagnosticCode, DiagnosticNote, DiagnosticReport, DiagnosticSink, Severity,
};
pub use edit::{ChangeSet, FileChanges, RewriteEdit, SourceDigest};
pub use span::{LineCol, SourceLocation, Span};
pub use template::{AcceptanceLevel, DiagnosticTemplate, Emitter, TemplateId, TemplateRegistry};

#[cfg(test)]
mod tests;
