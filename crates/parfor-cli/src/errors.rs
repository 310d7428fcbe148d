//! Error types for the CLI runtime.

use std::io;
use std::process::ExitCode;
use std::sync::Arc;

use thiserror::Error;

use crate::telemetry::TelemetryError;

/// Exit status for usage and configuration failures.
const USAGE_EXIT_STATUS: u8 = 2;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<ortho_config::OrthoError>),
    #[error("{0}")]
    CliUsage(clap::Error),
    #[error("failed to initialise logging: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("failed to write rewritten sources: {0}")]
    EmitOutput(io::Error),
    #[error("failed to write diagnostics: {0}")]
    EmitDiagnostics(io::Error),
    #[error("failed to serialise diagnostic: {0}")]
    SerialiseDiagnostic(serde_json::Error),
}

impl AppError {
    /// Returns the process exit code the error maps to.
    pub(crate) fn exit_code(&self) -> ExitCode {
        match self {
            Self::LoadConfiguration(_) | Self::CliUsage(_) | Self::Telemetry(_) => {
                ExitCode::from(USAGE_EXIT_STATUS)
            }
            Self::EmitOutput(_) | Self::EmitDiagnostics(_) | Self::SerialiseDiagnostic(_) => {
                ExitCode::FAILURE
            }
        }
    }
}
