//! Severity of the "loop accepted" notification.

use parfor_core::AcceptanceLevel;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// How accepted parallel loops are reported.
///
/// Accepted loops are never errors; operators only choose whether they show
/// up as notes or as warnings.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum AcceptanceSeverity {
    /// Report accepted loops as notes.
    #[default]
    Note,
    /// Report accepted loops as warnings.
    Warning,
}

impl From<AcceptanceSeverity> for AcceptanceLevel {
    fn from(severity: AcceptanceSeverity) -> Self {
        match severity {
            AcceptanceSeverity::Note => Self::Note,
            AcceptanceSeverity::Warning => Self::Warning,
        }
    }
}

/// Errors encountered while parsing an [`AcceptanceSeverity`] from text.
pub type AcceptanceSeverityParseError = strum::ParseError;
