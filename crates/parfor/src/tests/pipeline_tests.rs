//! End-to-end tests for lint and transform runs over in-memory files.

use std::cell::Cell;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use rstest::{fixture, rstest};

use crate::{
    AcceptanceLevel, DiagnosticCode, Mode, Pipeline, PipelineOptions, PipelineReport, Severity,
    SourceReader,
};

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

impl SourceReader for MemoryReader {
    fn read(&self, path: &Path) -> io::Result<String> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such file"))
    }
}

/// Returns `first` on the first read and `later` afterwards.
struct ChangingReader {
    reads: Cell<usize>,
    first: &'static str,
    later: &'static str,
}

impl SourceReader for ChangingReader {
    fn read(&self, _path: &Path) -> io::Result<String> {
        let count = self.reads.get();
        self.reads.set(count + 1);
        Ok(String::from(if count == 0 { self.first } else { self.later }))
    }
}

const CLEAN: &str = "\
#include <vector>

void scale(std::vector<int> &arr) {
  [[parallel]] for (auto &i : arr) { i = i * 2; }
}
";

const TRADITIONAL: &str = "\
void f() {
  [[parallel]] for (int i = 1; i < 10; i++) {}
}
";

const WITH_BREAK: &str = "\
void f(std::vector<int> &arr) {
  [[parallel]] for (auto &i : arr) { if (i > 2) break; i = i * 2; }
}
";

const MIXED: &str = "\
#include <vector>

void f(std::vector<int> &a) {
  [[parallel]] for (auto &x : a) { if (x) continue; }
  [[parallel]] for (auto &y : a) { y += 1; }
}
";

#[fixture]
fn transform() -> Pipeline {
    Pipeline::new(PipelineOptions::new(Mode::Transform))
}

#[fixture]
fn lint() -> Pipeline {
    Pipeline::new(PipelineOptions::new(Mode::Lint))
}

fn run_one(pipeline: &Pipeline, path: &str, source: &str) -> PipelineReport {
    let reader = MemoryReader::default().with(path, source);
    pipeline.run([path], &reader)
}

fn codes(report: &PipelineReport) -> Vec<DiagnosticCode> {
    report.diagnostics().map(|d| d.code()).collect()
}

#[rstest]
fn clean_loop_is_rewritten(transform: Pipeline) {
    let report = run_one(&transform, "scale.cpp", CLEAN);

    assert!(!report.has_errors());
    assert_eq!(codes(&report), [DiagnosticCode::LoopAccepted]);
    let file = report.file(Path::new("scale.cpp")).expect("file report");
    assert_eq!(file.accepted_loops(), 1);
    assert_eq!(file.rewrites(), 1);
    insta::assert_snapshot!(file.rewritten().expect("rewritten").trim_end(), @r"
    #include <vector>
    #include <algorithm>
    #include <execution>

    void scale(std::vector<int> &arr) {
      std::for_each(std::execution::par, std::begin(arr), std::end(arr), [&](auto &i) { i = i * 2; });
    }
    ");
}

#[rstest]
fn traditional_for_is_rejected_at_the_annotation(transform: Pipeline) {
    let report = run_one(&transform, "f.cpp", TRADITIONAL);

    let diagnostics: Vec<_> = report.diagnostics().collect();
    let [diagnostic] = diagnostics.as_slice() else {
        panic!("expected one diagnostic, got {diagnostics:?}");
    };
    assert_eq!(diagnostic.code(), DiagnosticCode::MisplacedAnnotation);
    assert_eq!(diagnostic.severity(), Severity::Error);
    assert_eq!(
        diagnostic.message(),
        "'parallel' attribute only applies to for-range loop statements, not for statement"
    );
    assert_eq!(
        diagnostic.location().map(ToString::to_string).as_deref(),
        Some("f.cpp:2:5")
    );
    assert_eq!(diagnostic.notes().len(), 1);
    assert_eq!(report.rewritten_files().count(), 0);
}

#[rstest]
fn escaping_break_blocks_the_rewrite(transform: Pipeline) {
    let report = run_one(&transform, "f.cpp", WITH_BREAK);

    assert_eq!(codes(&report), [DiagnosticCode::UnexpectedBreak]);
    assert!(report.has_errors());
    assert_eq!(report.rewritten_files().count(), 0);
}

#[rstest]
fn rejected_loop_does_not_block_its_sibling(transform: Pipeline) {
    let report = run_one(&transform, "mixed.cpp", MIXED);

    assert_eq!(
        codes(&report),
        [DiagnosticCode::UnexpectedContinue, DiagnosticCode::LoopAccepted]
    );
    let file = report.file(Path::new("mixed.cpp")).expect("file report");
    assert_eq!(file.rewrites(), 1);
    insta::assert_snapshot!(file.rewritten().expect("rewritten").trim_end(), @r"
    #include <vector>
    #include <algorithm>
    #include <execution>

    void f(std::vector<int> &a) {
      [[parallel]] for (auto &x : a) { if (x) continue; }
      std::for_each(std::execution::par, std::begin(a), std::end(a), [&](auto &y) { y += 1; });
    }
    ");
}

#[rstest]
fn lint_reports_without_rewriting(lint: Pipeline) {
    let report = run_one(&lint, "scale.cpp", CLEAN);

    assert_eq!(codes(&report), [DiagnosticCode::LoopAccepted]);
    let file = report.file(Path::new("scale.cpp")).expect("file report");
    assert_eq!(file.accepted_loops(), 1);
    assert_eq!(file.rewrites(), 0);
    assert_eq!(file.rewritten(), None);
}

#[rstest]
#[case(AcceptanceLevel::Note, Severity::Note)]
#[case(AcceptanceLevel::Warning, Severity::Warning)]
fn acceptance_severity_is_configurable(
    #[case] level: AcceptanceLevel,
    #[case] expected: Severity,
) {
    let pipeline = Pipeline::new(PipelineOptions::new(Mode::Lint).with_acceptance(level));
    let report = run_one(&pipeline, "scale.cpp", CLEAN);

    let accepted = report.diagnostics().next().expect("acceptance diagnostic");
    assert_eq!(accepted.severity(), expected);
    assert_eq!(
        accepted.message(),
        "this for-range will be converted to parallel version"
    );
    assert!(!report.has_errors());
}

#[rstest]
fn files_fail_independently(transform: Pipeline) {
    let reader = MemoryReader::default()
        .with("good.cpp", CLEAN)
        .with("bad.cpp", WITH_BREAK);
    let report = transform.run(["bad.cpp", "missing.cpp", "good.cpp"], &reader);

    let rewritten: Vec<&Path> = report.rewritten_files().map(|(path, _)| path).collect();
    assert_eq!(rewritten, [Path::new("good.cpp")]);

    let missing = report.file(Path::new("missing.cpp")).expect("file report");
    let missing_codes: Vec<_> = missing
        .diagnostics()
        .diagnostics()
        .iter()
        .map(|d| d.code())
        .collect();
    assert_eq!(missing_codes, [DiagnosticCode::UnreadableFile]);
    assert_eq!(report.count(Severity::Error), 2);
}

#[rstest]
fn duplicate_inputs_are_processed_once(lint: Pipeline) {
    let reader = MemoryReader::default().with("scale.cpp", CLEAN);
    let report = lint.run(["scale.cpp", "scale.cpp"], &reader);

    assert_eq!(report.files().len(), 1);
    assert_eq!(report.count(Severity::Note), 1);
}

#[rstest]
#[case::current_dir_prefix("./scale.cpp")]
#[case::inner_current_dir("././scale.cpp")]
fn current_dir_spellings_are_one_input(transform: Pipeline, #[case] alias: &str) {
    let reader = MemoryReader::default().with("scale.cpp", CLEAN);
    let report = transform.run(["scale.cpp", alias], &reader);

    assert_eq!(report.files().len(), 1);
    assert_eq!(report.rewritten_files().count(), 1);
    assert_eq!(report.count(Severity::Note), 1);
}

#[rstest]
fn non_cpp_inputs_are_skipped_without_reading(lint: Pipeline) {
    let report = lint.run(["notes.txt"], &MemoryReader::default());

    let diagnostic = report.diagnostics().next().expect("diagnostic");
    assert_eq!(diagnostic.code(), DiagnosticCode::UnsupportedFile);
    assert_eq!(diagnostic.severity(), Severity::Warning);
    assert_eq!(diagnostic.message(), "skipping notes.txt: not a C++ source file");
    assert!(!report.has_errors());
}

#[rstest]
#[case::expression_body("[[parallel]] for (auto &x : a) x++;", "the loop body is not a braced block")]
#[case::init_statement(
    "[[parallel]] for (auto &b = a; auto &x : b) { x++; }",
    "the loop has an init-statement"
)]
fn unsupported_shapes_are_left_unchanged(
    transform: Pipeline,
    #[case] statement: &str,
    #[case] reason: &str,
) {
    let source = format!("void f(std::vector<int> &a) {{\n  {statement}\n}}\n");
    let report = run_one(&transform, "shape.cpp", &source);

    let diagnostic = report.diagnostics().next().expect("diagnostic");
    assert_eq!(diagnostic.code(), DiagnosticCode::UnsupportedLoop);
    assert_eq!(
        diagnostic.message(),
        format!("parallel for-range left unchanged: {reason}")
    );
    assert!(!report.has_errors());
    assert_eq!(report.rewritten_files().count(), 0);
}

#[rstest]
fn outer_loop_enclosing_a_rejected_loop_is_kept(transform: Pipeline) {
    let source = "\
void f(std::vector<std::vector<int>> &m) {
  [[parallel]] for (auto &row : m) {
    [[parallel]] for (auto &x : row) { if (x) break; }
  }
}
";
    let report = run_one(&transform, "nested.cpp", source);

    assert_eq!(
        codes(&report),
        [DiagnosticCode::UnexpectedBreak, DiagnosticCode::UnsupportedLoop]
    );
    let outer = report
        .diagnostics()
        .find(|d| d.code() == DiagnosticCode::UnsupportedLoop)
        .expect("outer loop diagnostic");
    assert!(outer.message().ends_with("it contains a rejected parallel loop"));
    assert_eq!(report.rewritten_files().count(), 0);
}

#[rstest]
#[case::transform(Mode::Transform)]
#[case::lint(Mode::Lint)]
fn loop_enclosing_a_misplaced_annotation_is_kept(#[case] mode: Mode) {
    let source = "\
void f(std::vector<int> &a) {
  [[parallel]] for (auto &i : a) { [[parallel]] i++; }
}
";
    let pipeline = Pipeline::new(PipelineOptions::new(mode));
    let report = run_one(&pipeline, "stray.cpp", source);

    assert_eq!(
        codes(&report),
        [
            DiagnosticCode::MisplacedAnnotation,
            DiagnosticCode::UnsupportedLoop
        ]
    );
    let outer = report
        .diagnostics()
        .find(|d| d.code() == DiagnosticCode::UnsupportedLoop)
        .expect("outer loop diagnostic");
    assert!(outer.message().ends_with("it contains a misplaced parallel annotation"));
    let file = report.file(Path::new("stray.cpp")).expect("file report");
    assert_eq!(file.accepted_loops(), 0);
    assert!(file.rewritten().is_none());
}

#[rstest]
fn nested_rewrites_conflict(transform: Pipeline) {
    let source = "\
void f(std::vector<std::vector<int>> &m) {
  [[parallel]] for (auto &row : m) {
    [[parallel]] for (auto &x : row) { x++; }
  }
}
";
    let report = run_one(&transform, "nested.cpp", source);

    let file = report.file(Path::new("nested.cpp")).expect("file report");
    let conflict = file
        .diagnostics()
        .with_code(DiagnosticCode::EditConflict)
        .next()
        .expect("edit conflict");
    assert!(conflict.message().starts_with("conflicting rewrites in nested.cpp: "));
    assert_eq!(file.rewritten(), None);
    assert_eq!(file.rewrites(), 0);
}

#[rstest]
fn syntax_errors_block_rewriting(transform: Pipeline) {
    let source = "\
void f(std::vector<int> &a) {
  [[parallel]] for (auto &x : a) { x++; }
  int = ;
}
";
    let report = run_one(&transform, "broken.cpp", source);

    assert!(codes(&report).contains(&DiagnosticCode::SyntaxError));
    assert!(!codes(&report).contains(&DiagnosticCode::LoopAccepted));
    assert_eq!(report.rewritten_files().count(), 0);
}

#[rstest]
fn files_changed_after_analysis_are_not_emitted(transform: Pipeline) {
    let reader = ChangingReader {
        reads: Cell::new(0),
        first: CLEAN,
        later: "int unrelated;\n",
    };
    let report = transform.run(["scale.cpp"], &reader);

    let file = report.file(Path::new("scale.cpp")).expect("file report");
    let stale = file
        .diagnostics()
        .with_code(DiagnosticCode::StaleSource)
        .next()
        .expect("stale source diagnostic");
    assert_eq!(
        stale.message(),
        "scale.cpp changed after it was analysed; rewrites discarded"
    );
    assert_eq!(file.rewritten(), None);
}
