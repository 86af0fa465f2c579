//! Plan persistence.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use super::checksum::calculate_checksum;
use crate::config::OutputSettings;
use crate::error::{PlannerError, PlannerResult};
use crate::models::ObservationEntry;

/// What a successful write produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanReceipt {
    pub path: PathBuf,
    pub entries: usize,
    /// SHA-256 of the file content
    pub checksum: String,
}

/// Today's date in UTC, which names the plan directory.
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Serialize entries the way they are written to disk.
pub fn serialize_plan(entries: &[ObservationEntry]) -> PlannerResult<String> {
    serde_json::to_string_pretty(entries)
        .map_err(|e| PlannerError::WriteFailure(format!("Failed to serialize plan: {}", e)))
}

/// Writes plans under `<root>/<YYYY-MM-DD>/<file_name>`.
#[derive(Debug, Clone)]
pub struct PlanWriter {
    root: PathBuf,
    file_name: String,
}

impl PlanWriter {
    pub fn new(root: impl Into<PathBuf>, file_name: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            file_name: file_name.into(),
        }
    }

    pub fn from_settings(settings: &OutputSettings) -> Self {
        Self::new(settings.root.clone(), settings.file_name.clone())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Destination for the plan generated on `date`.
    pub fn plan_path(&self, date: NaiveDate) -> PathBuf {
        self.root
            .join(date.format("%Y-%m-%d").to_string())
            .join(&self.file_name)
    }

    /// Write the full entry sequence, creating the dated directory as needed.
    /// An existing plan for the same date is replaced.
    pub fn write(&self, entries: &[ObservationEntry], date: NaiveDate) -> PlannerResult<PlanReceipt> {
        let path = self.plan_path(date);
        let content = serialize_plan(entries)?;

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|e| {
                PlannerError::WriteFailure(format!(
                    "Failed to create directory {}: {}",
                    dir.display(),
                    e
                ))
            })?;
        }

        fs::write(&path, &content).map_err(|e| {
            PlannerError::WriteFailure(format!("Failed to write {}: {}", path.display(), e))
        })?;

        let receipt = PlanReceipt {
            path,
            entries: entries.len(),
            checksum: calculate_checksum(&content),
        };
        info!(
            path = %receipt.path.display(),
            entries = receipt.entries,
            checksum = %receipt.checksum,
            "Wrote observing plan"
        );
        Ok(receipt)
    }
}
