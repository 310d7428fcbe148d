//! Applying a [`ChangeSet`] to the files it targets.
//!
//! Application never writes to disk. Each file's current text is obtained
//! through a [`SourceReader`], the file's edits are validated and applied
//! from the end of the buffer towards the start, and the rewritten text is
//! returned in an [`ApplyOutcome`]. A failure only affects its own file.

use std::fs;
use std::io;
use std::ops::Range;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

use crate::diagnostic::DiagnosticCode;
use crate::edit::{ChangeSet, FileChanges, RewriteEdit, SourceDigest};

const APPLY_TARGET: &str = "parfor::apply";

/// Supplies the current text of a file when a change set is applied.
pub trait SourceReader {
    /// Reads the full UTF-8 contents of `path`.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error when the file cannot be read.
    fn read(&self, path: &Path) -> io::Result<String>;
}

/// Reads sources from the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsSourceReader;

impl SourceReader for FsSourceReader {
    fn read(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }
}

impl<F> SourceReader for F
where
    F: Fn(&Path) -> io::Result<String>,
{
    fn read(&self, path: &Path) -> io::Result<String> {
        self(path)
    }
}

/// Why a file's edits could not be applied.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApplyError {
    /// The file could not be read back.
    #[error("failed to read {}: {source}", path.display())]
    Unreadable {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The file no longer matches the text its edits were computed against.
    #[error("{} changed after it was analysed", path.display())]
    SourceChanged {
        /// File that failed.
        path: PathBuf,
    },

    /// Two edits touch the same text.
    #[error("edits {first:?} and {second:?} overlap")]
    Conflict {
        /// File that failed.
        path: PathBuf,
        /// Byte range of the earlier edit.
        first: Range<usize>,
        /// Byte range of the later edit.
        second: Range<usize>,
    },

    /// An edit lies outside the text or splits a UTF-8 sequence.
    #[error("edit range {range:?} is not valid for the text")]
    InvalidRange {
        /// File that failed.
        path: PathBuf,
        /// Offending byte range.
        range: Range<usize>,
    },
}

impl ApplyError {
    /// Creates an [`ApplyError::Unreadable`] error.
    #[must_use]
    pub fn unreadable(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Unreadable {
            path: path.into(),
            source,
        }
    }

    /// Creates an [`ApplyError::SourceChanged`] error.
    #[must_use]
    pub fn source_changed(path: impl Into<PathBuf>) -> Self {
        Self::SourceChanged { path: path.into() }
    }

    /// Creates an [`ApplyError::Conflict`] error.
    #[must_use]
    pub fn conflict(path: impl Into<PathBuf>, first: Range<usize>, second: Range<usize>) -> Self {
        Self::Conflict {
            path: path.into(),
            first,
            second,
        }
    }

    /// Creates an [`ApplyError::InvalidRange`] error.
    #[must_use]
    pub fn invalid_range(path: impl Into<PathBuf>, range: Range<usize>) -> Self {
        Self::InvalidRange {
            path: path.into(),
            range,
        }
    }

    /// Returns the file the error belongs to.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Unreadable { path, .. }
            | Self::SourceChanged { path }
            | Self::Conflict { path, .. }
            | Self::InvalidRange { path, .. } => path,
        }
    }

    /// Returns the diagnostic code this failure is reported under.
    #[must_use]
    pub const fn code(&self) -> DiagnosticCode {
        match self {
            Self::Unreadable { .. } => DiagnosticCode::UnreadableFile,
            Self::SourceChanged { .. } => DiagnosticCode::StaleSource,
            Self::Conflict { .. } | Self::InvalidRange { .. } => DiagnosticCode::EditConflict,
        }
    }
}

/// Result of applying one file's edits.
#[derive(Debug)]
pub struct FileOutcome {
    path: PathBuf,
    result: Result<String, ApplyError>,
}

impl FileOutcome {
    /// Returns the file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the rewritten text or the failure.
    #[must_use]
    pub const fn result(&self) -> &Result<String, ApplyError> {
        &self.result
    }

    /// Returns the rewritten text when application succeeded.
    #[must_use]
    pub fn rewritten(&self) -> Option<&str> {
        self.result.as_deref().ok()
    }

    /// Consumes the outcome, returning the path and result.
    #[must_use]
    pub fn into_parts(self) -> (PathBuf, Result<String, ApplyError>) {
        (self.path, self.result)
    }
}

/// Per-file results of applying a [`ChangeSet`], in change-set order.
#[derive(Debug, Default)]
pub struct ApplyOutcome {
    files: Vec<FileOutcome>,
}

impl ApplyOutcome {
    /// Returns every file outcome.
    #[must_use]
    pub fn files(&self) -> &[FileOutcome] {
        &self.files
    }

    /// Returns the outcome for `path`.
    #[must_use]
    pub fn file(&self, path: &Path) -> Option<&FileOutcome> {
        self.files.iter().find(|f| f.path == path)
    }

    /// Iterates over the failures.
    pub fn failures(&self) -> impl Iterator<Item = &ApplyError> {
        self.files.iter().filter_map(|f| f.result.as_ref().err())
    }

    /// Returns `true` when every file was rewritten.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.files.iter().all(|f| f.result.is_ok())
    }

    /// Consumes the outcome, returning the file outcomes.
    #[must_use]
    pub fn into_files(self) -> Vec<FileOutcome> {
        self.files
    }
}

impl ChangeSet {
    /// Applies every file's edits against the text returned by `reader`.
    ///
    /// Files are handled independently; an unreadable, changed or
    /// conflicting file is reported in its own [`FileOutcome`] while the
    /// remaining files are still rewritten.
    pub fn apply_with<R: SourceReader + ?Sized>(&self, reader: &R) -> ApplyOutcome {
        let files = self
            .files()
            .iter()
            .map(|changes| FileOutcome {
                path: changes.path().to_path_buf(),
                result: apply_file(changes, reader),
            })
            .collect();
        ApplyOutcome { files }
    }
}

fn apply_file<R: SourceReader + ?Sized>(
    changes: &FileChanges,
    reader: &R,
) -> Result<String, ApplyError> {
    let path = changes.path();
    let text = reader
        .read(path)
        .map_err(|source| ApplyError::unreadable(path, source))?;

    if let Some(expected) = changes.digest() {
        if SourceDigest::of(&text) != expected {
            warn!(
                target: APPLY_TARGET,
                path = %path.display(),
                "source changed since analysis"
            );
            return Err(ApplyError::source_changed(path));
        }
    }

    let rewritten = apply_edits(path, &text, changes.edits())?;
    debug!(
        target: APPLY_TARGET,
        path = %path.display(),
        edits = changes.edits().len(),
        "applied edits"
    );
    Ok(rewritten)
}

/// Applies `edits` to `original`, which is the text of `path`.
///
/// Edits are ordered by start offset; at equal offsets insertions precede
/// replacements and otherwise keep their given order. Overlaps and invalid
/// ranges are rejected before any edit is applied. Application then runs
/// from the end of the text towards the start so earlier offsets stay valid.
///
/// # Errors
///
/// Returns [`ApplyError::InvalidRange`] for an out-of-bounds or
/// non-character-boundary range and [`ApplyError::Conflict`] for
/// overlapping edits.
///
/// # Example
///
/// ```
/// use std::path::Path;
///
/// use parfor_core::{RewriteEdit, apply_edits};
///
/// let path = Path::new("a.cpp");
/// let edits = [
///     RewriteEdit::replace(path, 4..5, "y"),
///     RewriteEdit::insert_at(path, 0, "// x\n"),
/// ];
/// let out = apply_edits(path, "int x;", &edits).unwrap();
/// assert_eq!(out, "// x\nint y;");
/// ```
pub fn apply_edits(path: &Path, original: &str, edits: &[RewriteEdit]) -> Result<String, ApplyError> {
    let mut ordered: Vec<(usize, &RewriteEdit)> = edits.iter().enumerate().collect();
    ordered.sort_by_key(|(seq, edit)| (edit.start(), !edit.is_insertion(), *seq));

    let mut covering: Option<&RewriteEdit> = None;
    for &(_, edit) in &ordered {
        validate_range(path, original, edit)?;
        if let Some(previous) = covering {
            if previous.overlaps(edit) {
                return Err(ApplyError::conflict(path, previous.range(), edit.range()));
            }
        }
        let extends = covering.is_none_or(|previous| edit.end() > previous.end());
        if !edit.is_insertion() && extends {
            covering = Some(edit);
        }
    }

    let mut result = original.to_owned();
    for &(_, edit) in ordered.iter().rev() {
        result.replace_range(edit.range(), edit.replacement());
    }
    Ok(result)
}

fn validate_range(path: &Path, text: &str, edit: &RewriteEdit) -> Result<(), ApplyError> {
    let valid = edit.start() <= edit.end()
        && edit.end() <= text.len()
        && text.is_char_boundary(edit.start())
        && text.is_char_boundary(edit.end());
    if valid {
        Ok(())
    } else {
        Err(ApplyError::invalid_range(path, edit.range()))
    }
}
