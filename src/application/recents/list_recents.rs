use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Arc;

use crate::domain::recents::{RecentEntry, RecentSort, RecentsError, RecentsService};

#[derive(Debug, Default, Deserialize)]
pub struct ListRecentsCommand {
  /// `recent`, `name` or `type`; defaults to most recent first
  #[serde(default)]
  pub sort: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RecentEntryDto {
  pub key: String,
  pub name: String,
  pub path: Option<String>,
  pub document_type: Option<String>,
  pub last_action: String,
  pub timestamp: DateTime<Utc>,
  pub metadata: BTreeMap<String, String>,
}

impl From<RecentEntry> for RecentEntryDto {
  fn from(entry: RecentEntry) -> Self {
    Self {
      key: entry.key().to_string(),
      document_type: entry.document_type.map(|t| t.as_str().to_string()),
      last_action: entry.last_action.to_string(),
      name: entry.name,
      path: entry.path,
      timestamp: entry.timestamp,
      metadata: entry.metadata,
    }
  }
}

#[derive(Debug, Serialize)]
pub struct ListRecentsResponse {
  pub entries: Vec<RecentEntryDto>,
  pub limit: usize,
}

pub struct ListRecentsUseCase {
  recents: Arc<RecentsService>,
}

impl ListRecentsUseCase {
  pub fn new(recents: Arc<RecentsService>) -> Self {
    Self { recents }
  }

  pub async fn execute(
    &self,
    command: ListRecentsCommand,
  ) -> Result<ListRecentsResponse, RecentsError> {
    let sort = match command.sort.as_deref() {
      Some(sort) => RecentSort::from_str(sort)?,
      None => RecentSort::default(),
    };

    let entries = self.recents.list(sort).await?;
    Ok(ListRecentsResponse {
      entries: entries.into_iter().map(RecentEntryDto::from).collect(),
      limit: self.recents.max_entries(),
    })
  }
}
