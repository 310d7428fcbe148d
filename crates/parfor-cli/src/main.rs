//! CLI entrypoint for the parfor loop parallelisation tool.
//!
//! The binary delegates to [`parfor_cli::run`], which loads configuration,
//! parses the command line, runs the lint or transform pipeline and reports
//! the results.

use std::io::{self, StderrLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    parfor_cli::run(std::env::args_os(), &mut stdout, &mut stderr)
}
