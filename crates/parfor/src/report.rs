//! Per-file and per-run results of a pipeline run.

use std::path::{Path, PathBuf};

use parfor_core::{Diagnostic, DiagnosticReport, Severity};

use crate::pipeline::Mode;

/// What happened to one input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    path: PathBuf,
    pub(crate) diagnostics: DiagnosticReport,
    pub(crate) accepted: usize,
    pub(crate) rewrites: usize,
    pub(crate) output: Option<String>,
}

impl FileReport {
    pub(crate) fn new(path: PathBuf) -> Self {
        Self {
            path,
            diagnostics: DiagnosticReport::default(),
            accepted: 0,
            rewrites: 0,
            output: None,
        }
    }

    /// Returns the input path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the diagnostics emitted for the file, in emission order.
    #[must_use]
    pub const fn diagnostics(&self) -> &DiagnosticReport {
        &self.diagnostics
    }

    /// Number of annotated loops that passed every check.
    #[must_use]
    pub const fn accepted_loops(&self) -> usize {
        self.accepted
    }

    /// Number of loops rewritten in the emitted text.
    ///
    /// Always zero in lint mode, and zero when the file's edits could not be
    /// applied.
    #[must_use]
    pub const fn rewrites(&self) -> usize {
        self.rewrites
    }

    /// Returns the rewritten text when at least one loop was rewritten.
    #[must_use]
    pub fn rewritten(&self) -> Option<&str> {
        self.output.as_deref()
    }

    /// Returns `true` if any error was reported for the file.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics.has_errors()
    }
}

/// Results of one run over a file set, in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineReport {
    mode: Mode,
    files: Vec<FileReport>,
}

impl PipelineReport {
    pub(crate) const fn new(mode: Mode, files: Vec<FileReport>) -> Self {
        Self { mode, files }
    }

    /// Returns the mode the run used.
    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    /// Returns every file report.
    #[must_use]
    pub fn files(&self) -> &[FileReport] {
        &self.files
    }

    /// Returns the report for `path`.
    #[must_use]
    pub fn file(&self, path: &Path) -> Option<&FileReport> {
        self.files.iter().find(|f| f.path == path)
    }

    /// Iterates over every diagnostic, file by file.
    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.files
            .iter()
            .flat_map(|f| f.diagnostics.diagnostics().iter())
    }

    /// Counts diagnostics of the given severity across all files.
    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.files.iter().map(|f| f.diagnostics.count(severity)).sum()
    }

    /// Returns `true` if any file reported an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.files.iter().any(FileReport::has_errors)
    }

    /// Iterates over the files that were rewritten, with their new text.
    pub fn rewritten_files(&self) -> impl Iterator<Item = (&Path, &str)> {
        self.files
            .iter()
            .filter_map(|f| f.rewritten().map(|text| (f.path(), text)))
    }
}
