use async_trait::async_trait;
use std::sync::Mutex;

use crate::domain::recents::{RecentEntry, RecentsError, RecentsRepository};

/// Process-local recents, used when no data directory is wanted
#[derive(Default)]
pub struct InMemoryRecentsRepository {
  entries: Mutex<Vec<RecentEntry>>,
}

impl InMemoryRecentsRepository {
  pub fn new() -> Self {
    Self::default()
  }
}

#[async_trait]
impl RecentsRepository for InMemoryRecentsRepository {
  async fn load(&self) -> Result<Vec<RecentEntry>, RecentsError> {
    self
      .entries
      .lock()
      .map(|entries| entries.clone())
      .map_err(|_| RecentsError::Storage("Recents lock poisoned".to_string()))
  }

  async fn save(&self, entries: &[RecentEntry]) -> Result<(), RecentsError> {
    let mut stored = self
      .entries
      .lock()
      .map_err(|_| RecentsError::Storage("Recents lock poisoned".to_string()))?;
    *stored = entries.to_vec();
    Ok(())
  }
}
