//! Behaviour-driven tests for the `parfor` command line.

use std::cell::RefCell;
use std::ffi::OsString;
use std::fs;
use std::process::ExitCode;

use parfor_config::{AcceptanceSeverity, Config};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use tempfile::TempDir;

use super::support::invoke;

struct TestWorld {
    workspace: TempDir,
    config: Config,
    exit: Option<ExitCode>,
    stdout: String,
    stderr: String,
}

impl TestWorld {
    fn new() -> Self {
        Self {
            workspace: TempDir::new().expect("temp dir"),
            config: Config::default(),
            exit: None,
            stdout: String::new(),
            stderr: String::new(),
        }
    }

    fn write_source(&self, name: &str, text: &str) {
        fs::write(self.workspace.path().join(name), text).expect("write source");
    }

    /// Runs `command`, resolving every file-looking token inside the
    /// temporary workspace.
    fn run(&mut self, command: &str) {
        let args: Vec<OsString> = command
            .split_whitespace()
            .map(|token| {
                if token.contains('.') {
                    self.workspace.path().join(token).into_os_string()
                } else {
                    OsString::from(token)
                }
            })
            .collect();
        let result = invoke(args, self.config.clone());
        self.exit = Some(result.exit);
        self.stdout = result.stdout;
        self.stderr = result.stderr;
    }
}

fn fixture_source(name: &str) -> &'static str {
    match name {
        "a clean loop" => {
            "#include <vector>\n\nvoid scale(std::vector<int> &arr) {\n  [[parallel]] for (auto &i : arr) { i = i * 2; }\n}\n"
        }
        "a loop with a break" => {
            "void scan(std::vector<int> &arr) {\n  [[parallel]] for (auto &i : arr) { if (i > 2) break; i = i * 2; }\n}\n"
        }
        "a traditional for loop" => {
            "void count() {\n  [[parallel]] for (int i = 1; i < 10; i++) {}\n}\n"
        }
        other => panic!("unknown source fixture {other:?}"),
    }
}

fn strip_quotes(s: &str) -> &str {
    s.trim_matches('"')
}

#[fixture]
fn world() -> RefCell<TestWorld> {
    RefCell::new(TestWorld::new())
}

#[given("the source file {name} holds {contents}")]
fn given_source_file(world: &RefCell<TestWorld>, name: String, contents: String) {
    world
        .borrow()
        .write_source(strip_quotes(&name), fixture_source(&contents));
}

#[given("accepted loops are reported as warnings")]
fn given_warning_acceptance(world: &RefCell<TestWorld>) {
    world.borrow_mut().config.acceptance_severity = AcceptanceSeverity::Warning;
}

#[when("the operator runs {command}")]
fn when_operator_runs(world: &RefCell<TestWorld>, command: String) {
    world.borrow_mut().run(strip_quotes(&command));
}

#[then("the CLI exits with code {status}")]
fn then_exit_code(world: &RefCell<TestWorld>, status: u8) {
    let exit = world.borrow().exit.expect("exit code recorded");
    assert_eq!(exit, ExitCode::from(status));
}

#[then("stdout is empty")]
fn then_stdout_empty(world: &RefCell<TestWorld>) {
    let world = world.borrow();
    assert!(world.stdout.is_empty(), "stdout was {:?}", world.stdout);
}

#[then("stdout contains {snippet}")]
fn then_stdout_contains(world: &RefCell<TestWorld>, snippet: String) {
    let world = world.borrow();
    let snippet = strip_quotes(&snippet);
    assert!(
        world.stdout.contains(snippet),
        "stdout {:?} did not contain {snippet:?}",
        world.stdout
    );
}

#[then("stderr contains {snippet}")]
fn then_stderr_contains(world: &RefCell<TestWorld>, snippet: String) {
    let world = world.borrow();
    let snippet = strip_quotes(&snippet);
    assert!(
        world.stderr.contains(snippet),
        "stderr {:?} did not contain {snippet:?}",
        world.stderr
    );
}

#[scenario(path = "tests/features/parfor_cli.feature")]
fn parfor_cli_behaviour(world: RefCell<TestWorld>) {
    let _ = world;
}
