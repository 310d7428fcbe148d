//! Tests for [`RewriteEdit`] and [`ChangeSet`].

use std::path::Path;

use rstest::rstest;

use crate::{ChangeSet, RewriteEdit, SourceDigest};

#[rstest]
#[case::disjoint(0..3, 5..8, false)]
#[case::adjacent(0..3, 3..6, false)]
#[case::intersecting(0..5, 3..8, true)]
#[case::nested(0..10, 2..4, true)]
#[case::insertion_at_start(0..0, 0..4, false)]
#[case::insertion_at_end(4..4, 0..4, false)]
#[case::insertion_inside(2..2, 0..4, true)]
#[case::two_insertions(2..2, 2..2, false)]
fn overlap_rules(
    #[case] first: std::ops::Range<usize>,
    #[case] second: std::ops::Range<usize>,
    #[case] expected: bool,
) {
    let a = RewriteEdit::replace("a.cpp", first, "x");
    let b = RewriteEdit::replace("a.cpp", second, "y");
    assert_eq!(a.overlaps(&b), expected);
    assert_eq!(b.overlaps(&a), expected);
}

#[test]
fn insert_at_is_zero_length() {
    let edit = RewriteEdit::insert_at("a.cpp", 7, "#include <x>\n");
    assert!(edit.is_insertion());
    assert_eq!(edit.range(), 7..7);
}

#[test]
fn change_set_groups_by_file_in_first_seen_order() {
    let mut changes = ChangeSet::new();
    changes.push(RewriteEdit::replace("b.cpp", 0..1, "1"));
    changes.push(RewriteEdit::replace("a.cpp", 0..1, "2"));
    changes.push(RewriteEdit::replace("b.cpp", 2..3, "3"));

    let paths: Vec<&Path> = changes.files().iter().map(|f| f.path()).collect();
    assert_eq!(paths, [Path::new("b.cpp"), Path::new("a.cpp")]);
    assert_eq!(changes.len(), 3);

    let b = changes.file(Path::new("b.cpp")).expect("b.cpp grouped");
    let replacements: Vec<&str> = b.edits().iter().map(RewriteEdit::replacement).collect();
    assert_eq!(replacements, ["1", "3"]);
}

#[test]
fn extend_file_records_digest() {
    let mut changes = ChangeSet::new();
    let path = Path::new("a.cpp");
    changes.extend_file(path, SourceDigest::of("text"), Vec::new());

    let file = changes.file(path).expect("file recorded");
    assert_eq!(file.digest(), Some(SourceDigest::of("text")));
    assert!(changes.is_empty());
}

#[test]
fn digests_differ_for_different_text() {
    assert_ne!(SourceDigest::of("a"), SourceDigest::of("b"));
}
