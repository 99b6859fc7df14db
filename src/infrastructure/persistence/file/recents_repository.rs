use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::domain::recents::{RecentEntry, RecentsError, RecentsRepository};

/// Recent documents kept as one JSON array on disk
pub struct JsonFileRecentsRepository {
  path: PathBuf,
}

impl JsonFileRecentsRepository {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }
}

#[async_trait]
impl RecentsRepository for JsonFileRecentsRepository {
  async fn load(&self) -> Result<Vec<RecentEntry>, RecentsError> {
    let raw = match tokio::fs::read_to_string(&self.path).await {
      Ok(raw) => raw,
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
      Err(e) => {
        return Err(RecentsError::Storage(format!(
          "Failed to read {}: {}",
          self.path.display(),
          e
        )));
      }
    };

    if raw.trim().is_empty() {
      return Ok(Vec::new());
    }

    match serde_json::from_str::<Vec<RecentEntry>>(&raw) {
      Ok(entries) => Ok(entries),
      Err(e) => {
        tracing::warn!(
          "Ignoring unreadable recent documents in {}: {}",
          self.path.display(),
          e
        );
        Ok(Vec::new())
      }
    }
  }

  async fn save(&self, entries: &[RecentEntry]) -> Result<(), RecentsError> {
    if let Some(parent) = self.path.parent() {
      tokio::fs::create_dir_all(parent)
        .await
        .map_err(|e| RecentsError::Storage(format!("Failed to create {}: {}", parent.display(), e)))?;
    }

    let json = serde_json::to_vec_pretty(entries)
      .map_err(|e| RecentsError::Storage(format!("Failed to encode recent documents: {}", e)))?;

    let tmp = self.path.with_extension("json.tmp");
    tokio::fs::write(&tmp, json)
      .await
      .map_err(|e| RecentsError::Storage(format!("Failed to write {}: {}", tmp.display(), e)))?;
    tokio::fs::rename(&tmp, &self.path).await.map_err(|e| {
      RecentsError::Storage(format!("Failed to replace {}: {}", self.path.display(), e))
    })?;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::recents::RecentAction;
  use tempfile::TempDir;

  #[tokio::test]
  async fn test_missing_file_loads_empty() {
    let dir = TempDir::new().unwrap();
    let repository = JsonFileRecentsRepository::new(dir.path().join("billdesk.recents.json"));
    assert!(repository.load().await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn test_save_then_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("billdesk.recents.json");
    let repository = JsonFileRecentsRepository::new(&path);

    let entry = RecentEntry::new("INV-004", RecentAction::Export)
      .unwrap()
      .with_path("/out/INV-004.pdf");
    repository.save(std::slice::from_ref(&entry)).await.unwrap();

    assert!(path.exists());
    assert!(!path.with_extension("json.tmp").exists());
    assert_eq!(repository.load().await.unwrap(), vec![entry]);
  }

  #[tokio::test]
  async fn test_corrupt_file_loads_empty() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("billdesk.recents.json");
    std::fs::write(&path, "{not json").unwrap();

    let repository = JsonFileRecentsRepository::new(&path);
    assert!(repository.load().await.unwrap().is_empty());
  }
}
