use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::errors::RecentsError;
use crate::domain::document::DocumentType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecentAction {
  Open,
  Save,
  Export,
  Import,
}

impl RecentAction {
  pub fn as_str(&self) -> &'static str {
    match self {
      RecentAction::Open => "open",
      RecentAction::Save => "save",
      RecentAction::Export => "export",
      RecentAction::Import => "import",
    }
  }
}

impl fmt::Display for RecentAction {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// Ordering for `RecentsService::list`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RecentSort {
  #[default]
  Recency,
  Name,
  Type,
}

impl FromStr for RecentSort {
  type Err = RecentsError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_lowercase().as_str() {
      "recent" | "recency" | "date" => Ok(RecentSort::Recency),
      "name" => Ok(RecentSort::Name),
      "type" => Ok(RecentSort::Type),
      other => Err(RecentsError::InvalidEntry(format!(
        "Unknown sort order: {}",
        other
      ))),
    }
  }
}

/// A recently opened, saved, exported or imported document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentEntry {
  pub id: Uuid,
  pub name: String,
  #[serde(default)]
  pub path: Option<String>,
  #[serde(default)]
  pub document_type: Option<DocumentType>,
  #[serde(default)]
  pub metadata: BTreeMap<String, String>,
  pub last_action: RecentAction,
  pub timestamp: DateTime<Utc>,
}

impl RecentEntry {
  pub fn new(name: impl Into<String>, last_action: RecentAction) -> Result<Self, RecentsError> {
    let name = name.into().trim().to_string();
    if name.is_empty() {
      return Err(RecentsError::InvalidEntry(
        "Entry name cannot be empty".to_string(),
      ));
    }
    Ok(Self {
      id: Uuid::new_v4(),
      name,
      path: None,
      document_type: None,
      metadata: BTreeMap::new(),
      last_action,
      timestamp: Utc::now(),
    })
  }

  pub fn with_path(mut self, path: impl Into<String>) -> Self {
    self.path = Some(path.into());
    self
  }

  pub fn with_document_type(mut self, document_type: DocumentType) -> Self {
    self.document_type = Some(document_type);
    self
  }

  pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
    self.metadata.insert(key.into(), value.into());
    self
  }

  /// Identity used for de-duplication: the path when known, else the name
  pub fn key(&self) -> &str {
    self.path.as_deref().unwrap_or(&self.name)
  }
}
