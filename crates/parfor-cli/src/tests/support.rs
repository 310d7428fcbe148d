//! Shared helpers for CLI tests.

use std::ffi::OsString;
use std::process::ExitCode;

use parfor_config::Config;

use crate::{AppError, ConfigLoader, run_with_loader};

/// Hands out a fixed configuration without touching files or environment.
pub(super) struct StaticConfigLoader {
    config: Config,
}

impl StaticConfigLoader {
    pub(super) const fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self, _args: &[OsString]) -> Result<Config, AppError> {
        Ok(self.config.clone())
    }
}

/// Captured result of one CLI invocation.
pub(super) struct Invocation {
    pub(super) exit: ExitCode,
    pub(super) stdout: String,
    pub(super) stderr: String,
}

/// Runs the CLI with `args` (program name excluded) and `config`.
pub(super) fn invoke<I, S>(args: I, config: Config) -> Invocation
where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
{
    let argv: Vec<OsString> = std::iter::once(OsString::from("parfor"))
        .chain(args.into_iter().map(Into::into))
        .collect();
    let loader = StaticConfigLoader::new(config);
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let exit = run_with_loader(argv, &mut stdout, &mut stderr, &loader);
    Invocation {
        exit,
        stdout: String::from_utf8(stdout).expect("stdout utf8"),
        stderr: String::from_utf8(stderr).expect("stderr utf8"),
    }
}
