use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::domain::recents::{RecentsError, RecentsService};

/// Forget one entry by key, or everything when `key` is absent
#[derive(Debug, Default, Deserialize)]
pub struct RemoveRecentCommand {
  #[serde(default)]
  pub key: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RemoveRecentResponse {
  pub removed: bool,
  pub cleared: bool,
}

pub struct RemoveRecentUseCase {
  recents: Arc<RecentsService>,
}

impl RemoveRecentUseCase {
  pub fn new(recents: Arc<RecentsService>) -> Self {
    Self { recents }
  }

  pub async fn execute(
    &self,
    command: RemoveRecentCommand,
  ) -> Result<RemoveRecentResponse, RecentsError> {
    match command.key {
      Some(key) => {
        let removed = self.recents.remove(&key).await?;
        if !removed {
          tracing::debug!("No recent entry for {}", key);
        }
        Ok(RemoveRecentResponse {
          removed,
          cleared: false,
        })
      }
      None => {
        self.recents.clear().await?;
        tracing::info!("Recent documents cleared");
        Ok(RemoveRecentResponse {
          removed: true,
          cleared: true,
        })
      }
    }
  }
}
