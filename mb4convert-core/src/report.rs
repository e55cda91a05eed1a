//! Machine-readable run report.
//!
//! Written only when the operator asks for it with `--report`, for completed
//! and aborted runs alike. Carries no credentials or connection details
//! beyond the database name.

use crate::Result;
use crate::error::MigrateError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Whether statements were executed or only planned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// Statements were executed on the live session
    Apply,
    /// Statements were collected and printed
    Plan,
}

impl RunMode {
    /// Mode for the `--apply` flag.
    pub fn from_apply(apply: bool) -> Self {
        if apply { Self::Apply } else { Self::Plan }
    }
}

impl std::fmt::Display for RunMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Apply => write!(f, "apply"),
            Self::Plan => write!(f, "plan"),
        }
    }
}

/// Everything a finished run produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationOutcome {
    /// Converted schema
    pub database: String,
    /// Apply or plan
    pub mode: RunMode,
    /// Tables discovered, in conversion order
    pub tables: Vec<String>,
    /// Tables whose conversion went through (or was planned)
    pub converted_tables: Vec<String>,
    /// Tables whose conversion the server refused
    pub failed_tables: Vec<String>,
    /// Planned statements (empty in apply mode)
    pub statements: Vec<String>,
    /// `@@FOREIGN_KEY_CHECKS` after disabling, read in apply mode only
    pub foreign_key_checks: Option<String>,
}

impl MigrationOutcome {
    /// True when every table converted.
    pub fn is_clean(&self) -> bool {
        self.failed_tables.is_empty()
    }
}

/// Report document written to disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationReport {
    /// When the report was produced
    pub generated_at: DateTime<Utc>,
    /// Error that ended the run early, absent for completed runs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aborted: Option<String>,
    /// Run results
    #[serde(flatten)]
    pub outcome: MigrationOutcome,
}

impl MigrationReport {
    /// Stamps an outcome with the current time.
    pub fn new(outcome: MigrationOutcome) -> Self {
        Self {
            generated_at: Utc::now(),
            aborted: None,
            outcome,
        }
    }

    /// Report for a run that `error` ended before it finished.
    pub fn aborted(outcome: MigrationOutcome, error: &MigrateError) -> Self {
        Self {
            aborted: Some(error.to_string()),
            ..Self::new(outcome)
        }
    }
}

/// Writes the report as pretty-printed JSON.
///
/// # Errors
/// Returns [`MigrateError::Serialization`] if the report cannot be encoded
/// and [`MigrateError::Io`] if the file cannot be written.
pub async fn write_report(path: &Path, report: &MigrationReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report).map_err(|e| MigrateError::Serialization {
        context: "Failed to serialize run report".to_string(),
        source: e,
    })?;

    tokio::fs::write(path, json)
        .await
        .map_err(|e| MigrateError::io("write report to", path, e))?;

    tracing::info!("✓ Report saved to {}", path.display());
    Ok(())
}
