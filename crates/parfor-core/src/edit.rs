//! Offset-addressed text edits and their per-file grouping.
//!
//! Rewrites are captured as [`RewriteEdit`] values against the text that was
//! analysed, grouped per file in a [`ChangeSet`], and only applied once every
//! input has been processed.

use std::ops::Range;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

/// Fingerprint of the text a file's edits were computed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceDigest([u8; 32]);

impl SourceDigest {
    /// Hashes `source`.
    #[must_use]
    pub fn of(source: &str) -> Self {
        Self(Sha256::digest(source.as_bytes()).into())
    }
}

/// A single atomic text replacement in one file.
///
/// Offsets are UTF-8 byte offsets into the original text. A zero-length
/// range is an insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteEdit {
    path: PathBuf,
    range: Range<usize>,
    replacement: String,
}

impl RewriteEdit {
    /// Replaces `range` of the file at `path` with `replacement`.
    #[must_use]
    pub fn replace(
        path: impl Into<PathBuf>,
        range: Range<usize>,
        replacement: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            range,
            replacement: replacement.into(),
        }
    }

    /// Inserts `text` at `offset` without removing anything.
    #[must_use]
    pub fn insert_at(path: impl Into<PathBuf>, offset: usize, text: impl Into<String>) -> Self {
        Self::replace(path, offset..offset, text)
    }

    /// Path of the file the edit applies to.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Byte range being replaced.
    #[must_use]
    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    /// Inclusive start offset.
    #[must_use]
    pub const fn start(&self) -> usize {
        self.range.start
    }

    /// Exclusive end offset.
    #[must_use]
    pub const fn end(&self) -> usize {
        self.range.end
    }

    /// Replacement text.
    #[must_use]
    pub fn replacement(&self) -> &str {
        &self.replacement
    }

    /// Returns `true` when the edit removes nothing.
    #[must_use]
    pub const fn is_insertion(&self) -> bool {
        self.range.start == self.range.end
    }

    /// Returns `true` if applying both edits would touch the same text.
    ///
    /// Two replacements overlap when their ranges intersect. An insertion
    /// conflicts with a replacement only when it falls strictly inside the
    /// replaced range; insertions at either boundary are fine, as are two
    /// insertions at the same offset.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        match (self.is_insertion(), other.is_insertion()) {
            (true, true) => false,
            (true, false) => strictly_inside(self.start(), &other.range),
            (false, true) => strictly_inside(other.start(), &self.range),
            (false, false) => self.start() < other.end() && other.start() < self.end(),
        }
    }
}

const fn strictly_inside(offset: usize, range: &Range<usize>) -> bool {
    range.start < offset && offset < range.end
}

/// All edits collected for a single file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChanges {
    path: PathBuf,
    digest: Option<SourceDigest>,
    edits: Vec<RewriteEdit>,
}

impl FileChanges {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            digest: None,
            edits: Vec::new(),
        }
    }

    /// Path of the file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Fingerprint of the analysed text, when one was recorded.
    #[must_use]
    pub const fn digest(&self) -> Option<SourceDigest> {
        self.digest
    }

    /// Edits in the order they were added.
    #[must_use]
    pub fn edits(&self) -> &[RewriteEdit] {
        &self.edits
    }
}

/// Edits from a whole run, grouped by file.
///
/// Files keep the order in which they first received an edit; edits within
/// a file keep insertion order. The set is append-only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    files: Vec<FileChanges>,
}

impl ChangeSet {
    /// Creates an empty change set.
    #[must_use]
    pub const fn new() -> Self {
        Self { files: Vec::new() }
    }

    /// Appends one edit to its file's group.
    pub fn push(&mut self, edit: RewriteEdit) {
        let path = edit.path.clone();
        self.entry(path).edits.push(edit);
    }

    /// Appends a batch of edits produced by one file's analysis pass.
    ///
    /// `digest` fingerprints the text the edits were computed against and is
    /// checked again when the change set is applied.
    pub fn extend_file(
        &mut self,
        path: &Path,
        digest: SourceDigest,
        edits: impl IntoIterator<Item = RewriteEdit>,
    ) {
        let entry = self.entry(path.to_path_buf());
        entry.digest = Some(digest);
        entry.edits.extend(edits);
    }

    /// Returns the grouped changes.
    #[must_use]
    pub fn files(&self) -> &[FileChanges] {
        &self.files
    }

    /// Returns the changes recorded for `path`.
    #[must_use]
    pub fn file(&self, path: &Path) -> Option<&FileChanges> {
        self.files.iter().find(|f| f.path == path)
    }

    /// Total number of edits across all files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.iter().map(|f| f.edits.len()).sum()
    }

    /// Returns `true` when no edits were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.iter().all(|f| f.edits.is_empty())
    }

    #[expect(
        clippy::indexing_slicing,
        reason = "index comes from position() or from the push just above"
    )]
    fn entry(&mut self, path: PathBuf) -> &mut FileChanges {
        let index = match self.files.iter().position(|f| f.path == path) {
            Some(index) => index,
            None => {
                self.files.push(FileChanges::new(path));
                self.files.len() - 1
            }
        };
        &mut self.files[index]
    }
}
