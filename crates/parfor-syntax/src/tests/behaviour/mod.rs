//! Behaviour-driven development (BDD) step definitions for parfor-syntax
//! scenarios.

mod scenarios;

use std::cell::RefCell;

use parfor_core::apply_edits;
use rstest::fixture;
use rstest_bdd_macros::{given, then, when};

use crate::{EscapeKind, RewriteRule, Rewriter, SourceUnit, StatementKind, classify_escapes};

// =============================================================================
// Test World
// =============================================================================

/// State shared across BDD steps.
#[derive(Default)]
struct TestWorld {
    /// Source text under test.
    source: Option<String>,
    /// Kinds of statements carrying a misplaced annotation.
    misplaced: Vec<StatementKind>,
    /// Escape violations across all loops, in traversal order.
    violations: Vec<EscapeKind>,
    /// Number of loops that passed classification.
    accepted: usize,
    /// Source after applying the rewrites.
    output: Option<String>,
}

#[fixture]
fn world() -> RefCell<TestWorld> {
    RefCell::new(TestWorld::default())
}

/// Strips surrounding double quotes from a string if present.
fn strip_quotes(s: &str) -> &str {
    s.trim_matches('"')
}

fn fixture_source(name: &str) -> &'static str {
    match name {
        "clean loop" => {
            "#include <vector>\n\nvoid scale(std::vector<int> &arr) {\n  [[parallel]] for (auto &i : arr) { i = i * 2; }\n}\n"
        }
        "traditional for" => "void count() {\n  [[parallel]] for (int i = 1; i < 10; i++) {}\n}\n",
        "loop with break" => {
            "void scale(int *arr) {\n  [[parallel]] for (auto &i : arr) { if (i > 2) break; i = i * 2; }\n}\n"
        }
        "mixed loops" => {
            "void f(int *arr) {\n  [[parallel]] for (auto &a : arr) { if (a) continue; }\n  [[parallel]] for (auto &b : arr) { b = 0; }\n}\n"
        }
        "misplaced and clean" => {
            "void f(int *arr) {\n  [[parallel]] while (true) {}\n  [[parallel]] for (int x : arr) { g(x); }\n}\n"
        }
        "inner loop break" => {
            "void f(int *arr) {\n  [[parallel]] for (auto &a : arr) { for (int j = 0; j < a; j++) { if (j) break; } }\n}\n"
        }
        "lambda return" => {
            "void f(int *arr) {\n  [[parallel]] for (auto &a : arr) { auto g = [&]() { return a; }; a = g(); }\n}\n"
        }
        other => panic!("unknown fixture {other}"),
    }
}

// =============================================================================
// Given Steps
// =============================================================================

#[given("the source fixture {name}")]
fn given_fixture(world: &RefCell<TestWorld>, name: String) {
    world.borrow_mut().source = Some(fixture_source(strip_quotes(&name)).to_owned());
}

// =============================================================================
// When Steps
// =============================================================================

#[when("the unit is analysed and rewritten")]
fn when_analysed(world: &RefCell<TestWorld>) {
    let mut w = world.borrow_mut();
    let source = w.source.clone().expect("source should be set");
    let unit = SourceUnit::parse("fixture.cpp", &source).expect("parse");

    w.misplaced = unit.misplaced_annotations().map(|s| s.kind()).collect();

    let rule = RewriteRule::default();
    let mut rewriter = Rewriter::new(&rule, &unit);
    for found in unit.annotated_loops() {
        let violations = classify_escapes(&found, unit.path());
        if violations.is_empty() {
            w.accepted += 1;
            rewriter.rewrite(&found).expect("rewrite");
        }
        w.violations.extend(violations.iter().map(|v| v.kind()));
    }

    let edits = rewriter.finish().into_edits();
    w.output = Some(apply_edits(unit.path(), &source, &edits).expect("apply"));
}

// =============================================================================
// Then Steps
// =============================================================================

#[then("{count} loop is accepted")]
fn then_accepted(world: &RefCell<TestWorld>, count: usize) {
    assert_eq!(world.borrow().accepted, count);
}

#[then("no escape is reported")]
fn then_no_escape(world: &RefCell<TestWorld>) {
    let w = world.borrow();
    assert!(w.violations.is_empty(), "unexpected {:?}", w.violations);
}

#[then("exactly one {keyword} escape is reported")]
fn then_one_escape(world: &RefCell<TestWorld>, keyword: String) {
    let w = world.borrow();
    let kinds: Vec<&str> = w.violations.iter().map(|k| k.keyword()).collect();
    assert_eq!(kinds, [strip_quotes(&keyword)]);
}

#[then("the annotation on a {kind} is rejected")]
fn then_misplaced(world: &RefCell<TestWorld>, kind: String) {
    let w = world.borrow();
    let kinds: Vec<&str> = w.misplaced.iter().map(|k| k.describe()).collect();
    assert_eq!(kinds, [strip_quotes(&kind)]);
}

#[then("the output contains {text}")]
fn then_output_contains(world: &RefCell<TestWorld>, text: String) {
    let w = world.borrow();
    let output = w.output.as_deref().expect("output");
    let expected = strip_quotes(&text);
    assert!(
        output.contains(expected),
        "expected output to contain '{expected}', got: {output}"
    );
}

#[then("the output is unchanged")]
fn then_unchanged(world: &RefCell<TestWorld>) {
    let w = world.borrow();
    assert_eq!(w.output, w.source);
}

#[then("the output includes {header} once")]
fn then_header_once(world: &RefCell<TestWorld>, header: String) {
    let w = world.borrow();
    let output = w.output.as_deref().expect("output");
    let directive = format!("#include <{}>", strip_quotes(&header));
    assert_eq!(output.matches(&directive).count(), 1, "{output}");
}
