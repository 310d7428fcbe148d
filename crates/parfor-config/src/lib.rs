//! Layered configuration for the parfor command-line tool.
//!
//! Values are merged by `ortho_config` from, in increasing precedence,
//! built-in defaults, a TOML configuration file, `PARFOR_*` environment
//! variables and command-line flags. The configuration only carries ambient
//! settings: how the binary logs and how accepted loops are reported. Inputs
//! and the run mode are positional arguments handled by the CLI.

mod acceptance;
mod defaults;
mod logging;

use ortho_config::OrthoConfig;
use parfor_core::AcceptanceLevel;
use serde::{Deserialize, Serialize};

pub use acceptance::{AcceptanceSeverity, AcceptanceSeverityParseError};
pub use defaults::{
    DEFAULT_LOG_FILTER, default_acceptance_severity, default_log_filter,
    default_log_filter_string, default_log_format,
};
pub use logging::{LogFormat, LogFormatParseError};

/// Resolved configuration shared by every parfor entry point.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "PARFOR")]
pub struct Config {
    /// Tracing filter expression, in `EnvFilter` syntax.
    #[serde(default = "default_log_filter_string")]
    #[ortho_config(default = default_log_filter_string())]
    pub log_filter: String,
    /// Output format of the tracing subscriber.
    #[serde(default = "default_log_format")]
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
    /// Severity of the diagnostic emitted for each accepted loop.
    #[serde(default = "default_acceptance_severity")]
    #[ortho_config(default = default_acceptance_severity())]
    pub acceptance_severity: AcceptanceSeverity,
}

impl Config {
    /// Returns the tracing filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Returns the logging output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Returns the configured acceptance severity.
    #[must_use]
    pub const fn acceptance_severity(&self) -> AcceptanceSeverity {
        self.acceptance_severity
    }

    /// Returns the acceptance severity in the form the diagnostic registry
    /// expects.
    #[must_use]
    pub fn acceptance_level(&self) -> AcceptanceLevel {
        self.acceptance_severity.into()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            acceptance_severity: default_acceptance_severity(),
        }
    }
}
