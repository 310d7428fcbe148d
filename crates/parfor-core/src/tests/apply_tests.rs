//! Tests for change-set application.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use rstest::{fixture, rstest};

use crate::{ApplyError, ChangeSet, DiagnosticCode, RewriteEdit, SourceDigest, apply_edits};

/// In-memory stand-in for the filesystem.
#[derive(Default)]
struct MemoryReader {
    files: HashMap<PathBuf, String>,
}

impl MemoryReader {
    fn with(mut self, path: &str, text: &str) -> Self {
        self.files.insert(PathBuf::from(path), String::from(text));
        self
    }
}

impl crate::SourceReader for MemoryReader {
    fn read(&self, path: &Path) -> io::Result<String> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such file"))
    }
}

#[fixture]
fn path() -> &'static Path {
    Path::new("main.cpp")
}

#[rstest]
fn edits_apply_from_end_to_start(path: &Path) {
    let edits = [
        RewriteEdit::replace(path, 0..3, "long"),
        RewriteEdit::replace(path, 4..5, "y"),
    ];
    let out = apply_edits(path, "int x;", &edits).expect("apply");
    assert_eq!(out, "long y;");
}

#[rstest]
fn insertions_at_same_offset_keep_their_order(path: &Path) {
    let edits = [
        RewriteEdit::insert_at(path, 0, "A"),
        RewriteEdit::insert_at(path, 0, "B"),
    ];
    assert_eq!(apply_edits(path, "x", &edits).expect("apply"), "ABx");
}

#[rstest]
fn insertion_at_replacement_boundary_is_allowed(path: &Path) {
    let edits = [
        RewriteEdit::replace(path, 2..4, "[]"),
        RewriteEdit::insert_at(path, 2, "<"),
        RewriteEdit::insert_at(path, 4, ">"),
    ];
    assert_eq!(apply_edits(path, "abcdef", &edits).expect("apply"), "ab<[]>ef");
}

#[rstest]
fn insertion_inside_replacement_conflicts(path: &Path) {
    let edits = [
        RewriteEdit::replace(path, 0..6, "x"),
        RewriteEdit::insert_at(path, 3, "y"),
    ];
    let err = apply_edits(path, "abcdef", &edits).expect_err("conflict");
    assert!(matches!(
        err,
        ApplyError::Conflict { ref first, ref second, .. } if *first == (0..6) && *second == (3..3)
    ));
    assert_eq!(err.code(), DiagnosticCode::EditConflict);
}

#[rstest]
fn nested_replacements_conflict(path: &Path) {
    let edits = [
        RewriteEdit::replace(path, 2..4, "inner"),
        RewriteEdit::replace(path, 0..6, "outer"),
    ];
    let err = apply_edits(path, "abcdef", &edits).expect_err("conflict");
    assert!(matches!(err, ApplyError::Conflict { .. }));
}

#[rstest]
#[case::past_end(4..9)]
#[case::reversed(3..1)]
#[case::inside_multibyte(1..2)]
fn invalid_ranges_are_rejected(path: &Path, #[case] range: std::ops::Range<usize>) {
    let edits = [RewriteEdit::replace(path, range, "x")];
    let err = apply_edits(path, "é__", &edits).expect_err("invalid");
    assert!(matches!(err, ApplyError::InvalidRange { .. }));
}

#[test]
fn apply_with_reports_each_file_independently() {
    let good = Path::new("good.cpp");
    let missing = Path::new("missing.cpp");
    let mut changes = ChangeSet::new();
    changes.push(RewriteEdit::replace(missing, 0..1, "x"));
    changes.push(RewriteEdit::replace(good, 0..1, "y"));

    let reader = MemoryReader::default().with("good.cpp", "a;");
    let outcome = changes.apply_with(&reader);

    assert!(!outcome.is_success());
    assert_eq!(outcome.files().len(), 2);
    assert_eq!(outcome.file(good).and_then(|f| f.rewritten()), Some("y;"));

    let failure = outcome.failures().next().expect("one failure");
    assert_eq!(failure.path(), missing);
    assert_eq!(failure.code(), DiagnosticCode::UnreadableFile);
}

#[test]
fn apply_with_detects_changed_source() {
    let path = Path::new("main.cpp");
    let mut changes = ChangeSet::new();
    changes.extend_file(
        path,
        SourceDigest::of("int x;"),
        [RewriteEdit::replace(path, 4..5, "y")],
    );

    let reader = MemoryReader::default().with("main.cpp", "int x; // edited");
    let outcome = changes.apply_with(&reader);
    let failure = outcome.failures().next().expect("stale source");
    assert!(matches!(failure, ApplyError::SourceChanged { .. }));
    assert_eq!(failure.code(), DiagnosticCode::StaleSource);
}

#[test]
fn closures_act_as_readers() {
    let path = Path::new("main.cpp");
    let mut changes = ChangeSet::new();
    changes.push(RewriteEdit::insert_at(path, 0, "// hi\n"));

    let reader = |_: &Path| -> io::Result<String> { Ok(String::from("int x;")) };
    let outcome = changes.apply_with(&reader);
    assert_eq!(
        outcome.file(path).and_then(|f| f.rewritten()),
        Some("// hi\nint x;")
    );
}
