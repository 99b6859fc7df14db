use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// `.billproj` archive as produced by the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectArchive {
  pub filename: String,
  pub bytes: Vec<u8>,
}

pub const PROJECT_EXTENSION: &str = "billproj";

/// Record counts restored by an import
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSummary {
  #[serde(default)]
  pub invoices: u64,
  #[serde(default)]
  pub receipts: u64,
  #[serde(default)]
  pub waybills: u64,
  #[serde(default)]
  pub assets: u64,
}

impl ProjectSummary {
  pub fn documents(&self) -> u64 {
    self.invoices + self.receipts + self.waybills
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ImportReport {
  pub summary: ProjectSummary,
  #[serde(default)]
  pub imported_at: Option<DateTime<Utc>>,
}
