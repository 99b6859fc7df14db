use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

use crate::domain::document::{ArtifactSink, DocumentError};
use crate::domain::project::{PROJECT_EXTENSION, ProjectArchiveApi};
use crate::domain::recents::{RecentAction, RecentEntry, RecentsService};

#[derive(Debug, Serialize)]
pub struct ExportProjectResponse {
  pub path: PathBuf,
  pub filename: String,
  pub size_bytes: usize,
}

pub struct ExportProjectUseCase {
  archive: Arc<dyn ProjectArchiveApi>,
  sink: Arc<dyn ArtifactSink>,
  recents: Arc<RecentsService>,
}

/// Keep the backend's stem but always write a `.billproj` file
fn archive_filename(name: &str) -> String {
  let stem = name
    .rsplit_once('.')
    .map(|(stem, _)| stem)
    .unwrap_or(name)
    .trim();
  let stem = if stem.is_empty() { "BillingApp" } else { stem };
  format!("{}.{}", stem, PROJECT_EXTENSION)
}

impl ExportProjectUseCase {
  pub fn new(
    archive: Arc<dyn ProjectArchiveApi>,
    sink: Arc<dyn ArtifactSink>,
    recents: Arc<RecentsService>,
  ) -> Self {
    Self {
      archive,
      sink,
      recents,
    }
  }

  pub async fn execute(&self) -> Result<ExportProjectResponse, DocumentError> {
    let archive = self.archive.export().await?;
    if archive.bytes.is_empty() {
      return Err(DocumentError::Storage(
        "Project archive is empty".to_string(),
      ));
    }

    let filename = archive_filename(&archive.filename);
    let path = self.sink.save(&filename, &archive.bytes).await?;
    tracing::info!("Project exported to {}", path.display());

    let entry = RecentEntry::new(filename.clone(), RecentAction::Save)?
      .with_path(path.display().to_string())
      .with_metadata("kind", "project");
    if let Err(e) = self.recents.record(entry).await {
      tracing::warn!("Could not record project export in recents: {}", e);
    }

    Ok(ExportProjectResponse {
      path,
      filename,
      size_bytes: archive.bytes.len(),
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::document::testing::{MemoryRecents, MemorySink};
  use crate::domain::project::{ImportReport, ProjectArchive};
  use crate::domain::recents::RecentSort;
  use async_trait::async_trait;

  struct FixedArchive(ProjectArchive);

  #[async_trait]
  impl ProjectArchiveApi for FixedArchive {
    async fn export(&self) -> Result<ProjectArchive, DocumentError> {
      Ok(self.0.clone())
    }

    async fn import(&self, _filename: &str, _bytes: Vec<u8>) -> Result<ImportReport, DocumentError> {
      Err(DocumentError::Internal("not used".to_string()))
    }
  }

  fn use_case(archive: ProjectArchive) -> (ExportProjectUseCase, Arc<MemorySink>, Arc<RecentsService>) {
    let sink = Arc::new(MemorySink::default());
    let recents = Arc::new(RecentsService::new(Arc::new(MemoryRecents::default()), 20));
    let use_case =
      ExportProjectUseCase::new(Arc::new(FixedArchive(archive)), sink.clone(), recents.clone());
    (use_case, sink, recents)
  }

  #[test]
  fn test_archive_filename() {
    assert_eq!(archive_filename("BillingApp-20260314.billproj"), "BillingApp-20260314.billproj");
    assert_eq!(archive_filename("backup.zip"), "backup.billproj");
    assert_eq!(archive_filename("backup"), "backup.billproj");
    assert_eq!(archive_filename(".zip"), "BillingApp.billproj");
  }

  #[tokio::test]
  async fn test_export_saves_archive_and_records_recent() {
    let (use_case, sink, recents) = use_case(ProjectArchive {
      filename: "BillingApp-20260314.zip".to_string(),
      bytes: vec![1, 2, 3],
    });

    let response = use_case.execute().await.unwrap();
    assert_eq!(response.filename, "BillingApp-20260314.billproj");
    assert_eq!(response.path, PathBuf::from("/out/BillingApp-20260314.billproj"));
    assert_eq!(response.size_bytes, 3);
    assert_eq!(sink.saved.lock().unwrap().len(), 1);

    let entries = recents.list(RecentSort::Recency).await.unwrap();
    assert_eq!(entries[0].last_action, RecentAction::Save);
    assert_eq!(entries[0].metadata.get("kind").map(String::as_str), Some("project"));
  }

  #[tokio::test]
  async fn test_empty_archive_is_rejected() {
    let (use_case, sink, _) = use_case(ProjectArchive {
      filename: "BillingApp.billproj".to_string(),
      bytes: Vec::new(),
    });
    assert!(matches!(use_case.execute().await, Err(DocumentError::Storage(_))));
    assert!(sink.saved.lock().unwrap().is_empty());
  }
}
