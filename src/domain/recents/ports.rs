use async_trait::async_trait;

use super::entities::RecentEntry;
use super::errors::RecentsError;

/// Persistent home of the recent documents list
#[async_trait]
pub trait RecentsRepository: Send + Sync {
  /// Missing or unreadable data loads as an empty list
  async fn load(&self) -> Result<Vec<RecentEntry>, RecentsError>;
  async fn save(&self, entries: &[RecentEntry]) -> Result<(), RecentsError>;
}
