use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

use crate::domain::document::DocumentError;
use crate::domain::project::{PROJECT_EXTENSION, ProjectArchiveApi, ProjectSummary};
use crate::domain::recents::{RecentAction, RecentEntry, RecentsService};

#[derive(Debug, Deserialize)]
pub struct ImportProjectCommand {
  pub path: PathBuf,
}

#[derive(Debug, Serialize)]
pub struct ImportProjectResponse {
  pub summary: ProjectSummary,
  pub documents: u64,
  pub message: String,
}

pub struct ImportProjectUseCase {
  archive: Arc<dyn ProjectArchiveApi>,
  recents: Arc<RecentsService>,
}

impl ImportProjectUseCase {
  pub fn new(archive: Arc<dyn ProjectArchiveApi>, recents: Arc<RecentsService>) -> Self {
    Self { archive, recents }
  }

  pub async fn execute(
    &self,
    command: ImportProjectCommand,
  ) -> Result<ImportProjectResponse, DocumentError> {
    let has_extension = command
      .path
      .extension()
      .and_then(|e| e.to_str())
      .is_some_and(|e| e.eq_ignore_ascii_case(PROJECT_EXTENSION));
    if !has_extension {
      return Err(DocumentError::validation(
        "path",
        format!("Project archives must use the .{} extension", PROJECT_EXTENSION),
      ));
    }

    let filename = command
      .path
      .file_name()
      .and_then(|name| name.to_str())
      .unwrap_or("project.billproj")
      .to_string();
    let bytes = tokio::fs::read(&command.path).await.map_err(|e| {
      DocumentError::Storage(format!("Cannot read {}: {}", command.path.display(), e))
    })?;

    let report = self.archive.import(&filename, bytes).await?;
    let summary = report.summary;
    tracing::info!(
      "Imported project {}: {} documents, {} assets",
      filename,
      summary.documents(),
      summary.assets
    );

    let entry = RecentEntry::new(filename, RecentAction::Import)?
      .with_path(command.path.display().to_string())
      .with_metadata("kind", "project")
      .with_metadata("documents", summary.documents().to_string());
    if let Err(e) = self.recents.record(entry).await {
      tracing::warn!("Could not record project import in recents: {}", e);
    }

    Ok(ImportProjectResponse {
      documents: summary.documents(),
      message: format!(
        "Imported {} invoices, {} receipts and {} waybills",
        summary.invoices, summary.receipts, summary.waybills
      ),
      summary,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::document::testing::MemoryRecents;
  use crate::domain::project::{ImportReport, ProjectArchive};
  use crate::domain::recents::RecentSort;
  use async_trait::async_trait;
  use std::sync::Mutex;
  use tempfile::TempDir;

  #[derive(Default)]
  struct RecordingArchive {
    received: Mutex<Vec<(String, Vec<u8>)>>,
  }

  #[async_trait]
  impl ProjectArchiveApi for RecordingArchive {
    async fn export(&self) -> Result<ProjectArchive, DocumentError> {
      Err(DocumentError::Internal("not used".to_string()))
    }

    async fn import(&self, filename: &str, bytes: Vec<u8>) -> Result<ImportReport, DocumentError> {
      self
        .received
        .lock()
        .unwrap()
        .push((filename.to_string(), bytes));
      Ok(ImportReport {
        summary: ProjectSummary {
          invoices: 3,
          receipts: 2,
          waybills: 1,
          assets: 4,
        },
        imported_at: None,
      })
    }
  }

  #[tokio::test]
  async fn test_import_uploads_file_and_records_recent() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("backup.billproj");
    std::fs::write(&path, b"PK\x03\x04").unwrap();

    let archive = Arc::new(RecordingArchive::default());
    let recents = Arc::new(RecentsService::new(Arc::new(MemoryRecents::default()), 20));
    let use_case = ImportProjectUseCase::new(archive.clone(), recents.clone());

    let response = use_case
      .execute(ImportProjectCommand { path: path.clone() })
      .await
      .unwrap();
    assert_eq!(response.documents, 6);
    assert_eq!(response.summary.assets, 4);
    assert_eq!(response.message, "Imported 3 invoices, 2 receipts and 1 waybills");

    let received = archive.received.lock().unwrap();
    assert_eq!(received[0].0, "backup.billproj");
    assert_eq!(received[0].1, b"PK\x03\x04".to_vec());

    let entries = recents.list(RecentSort::Recency).await.unwrap();
    assert_eq!(entries[0].last_action, RecentAction::Import);
    assert_eq!(entries[0].metadata.get("documents").map(String::as_str), Some("6"));
  }

  #[tokio::test]
  async fn test_wrong_extension_is_rejected() {
    let recents = Arc::new(RecentsService::new(Arc::new(MemoryRecents::default()), 20));
    let use_case = ImportProjectUseCase::new(Arc::new(RecordingArchive::default()), recents);
    let result = use_case
      .execute(ImportProjectCommand {
        path: PathBuf::from("backup.zip"),
      })
      .await;
    assert!(matches!(result, Err(DocumentError::ValidationFailure { .. })));
  }

  #[tokio::test]
  async fn test_extension_match_ignores_case() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("Backup.BILLPROJ");
    std::fs::write(&path, b"PK\x03\x04").unwrap();

    let archive = Arc::new(RecordingArchive::default());
    let recents = Arc::new(RecentsService::new(Arc::new(MemoryRecents::default()), 20));
    let use_case = ImportProjectUseCase::new(archive.clone(), recents);

    let response = use_case.execute(ImportProjectCommand { path }).await.unwrap();
    assert_eq!(response.documents, 6);
    assert_eq!(archive.received.lock().unwrap()[0].0, "Backup.BILLPROJ");
  }

  #[tokio::test]
  async fn test_missing_file_is_a_storage_error() {
    let recents = Arc::new(RecentsService::new(Arc::new(MemoryRecents::default()), 20));
    let use_case = ImportProjectUseCase::new(Arc::new(RecordingArchive::default()), recents);
    let result = use_case
      .execute(ImportProjectCommand {
        path: PathBuf::from("/nonexistent/backup.billproj"),
      })
      .await;
    assert!(matches!(result, Err(DocumentError::Storage(_))));
  }
}
