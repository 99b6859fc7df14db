use async_trait::async_trait;

use super::entities::{ImportReport, ProjectArchive};
use crate::domain::document::DocumentError;

/// Whole-application backup and restore on the backend
#[async_trait]
pub trait ProjectArchiveApi: Send + Sync {
  async fn export(&self) -> Result<ProjectArchive, DocumentError>;
  async fn import(&self, filename: &str, bytes: Vec<u8>) -> Result<ImportReport, DocumentError>;
}
