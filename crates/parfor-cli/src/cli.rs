//! CLI argument definitions for parfor.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use parfor::Mode;

use crate::output::OutputFormat;

/// Validates `[[parallel]]` range-based for loops and rewrites them into
/// parallel `std::for_each` calls.
#[derive(Parser, Debug)]
#[command(name = "parfor", version, disable_help_subcommand = true)]
pub(crate) struct Cli {
    /// Controls how diagnostics are rendered on stderr.
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub(crate) format: OutputFormat,
    /// The operation to run.
    #[command(subcommand)]
    pub(crate) command: CliCommand,
}

/// Operations supported by the CLI.
#[derive(Subcommand, Debug, Clone)]
pub(crate) enum CliCommand {
    /// Reports misplaced annotations and unsafe loops without rewriting.
    Lint {
        /// C++ source files to check.
        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,
    },
    /// Rewrites every safe annotated loop and prints the resulting files.
    Transform {
        /// C++ source files to rewrite.
        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,
    },
}

impl CliCommand {
    /// Returns the pipeline mode the command selects.
    pub(crate) const fn mode(&self) -> Mode {
        match self {
            Self::Lint { .. } => Mode::Lint,
            Self::Transform { .. } => Mode::Transform,
        }
    }

    /// Returns the input files.
    pub(crate) fn files(&self) -> &[PathBuf] {
        match self {
            Self::Lint { files } | Self::Transform { files } => files,
        }
    }
}
