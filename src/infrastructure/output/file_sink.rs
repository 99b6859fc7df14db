use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::domain::document::{ArtifactSink, DocumentError};

/// Writes finished artifacts into one output directory
pub struct FileArtifactSink {
  output_dir: PathBuf,
}

impl FileArtifactSink {
  pub fn new(output_dir: impl Into<PathBuf>) -> Self {
    Self {
      output_dir: output_dir.into(),
    }
  }

  pub fn output_dir(&self) -> &Path {
    &self.output_dir
  }

  fn storage_error(action: &str, path: &Path, error: std::io::Error) -> DocumentError {
    DocumentError::Storage(format!("Failed to {} {}: {}", action, path.display(), error))
  }
}

#[async_trait]
impl ArtifactSink for FileArtifactSink {
  async fn save(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf, DocumentError> {
    // Only the final component is used so a name can never leave the output directory
    let name = Path::new(filename)
      .file_name()
      .ok_or_else(|| DocumentError::validation("filename", "File name cannot be empty"))?;

    tokio::fs::create_dir_all(&self.output_dir)
      .await
      .map_err(|e| Self::storage_error("create", &self.output_dir, e))?;

    let target = self.output_dir.join(name);
    let tmp = self
      .output_dir
      .join(format!(".{}.{}.part", name.to_string_lossy(), Uuid::new_v4()));

    let write = async {
      let mut file = tokio::fs::File::create(&tmp).await?;
      file.write_all(bytes).await?;
      file.sync_all().await?;
      Ok::<_, std::io::Error>(())
    };
    if let Err(e) = write.await {
      let _ = tokio::fs::remove_file(&tmp).await;
      return Err(Self::storage_error("write", &tmp, e));
    }

    if let Err(e) = tokio::fs::rename(&tmp, &target).await {
      let _ = tokio::fs::remove_file(&tmp).await;
      return Err(Self::storage_error("move into place", &target, e));
    }

    tracing::info!("Saved {} ({} bytes)", target.display(), bytes.len());
    Ok(target)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  #[tokio::test]
  async fn test_save_writes_bytes() {
    let dir = TempDir::new().unwrap();
    let sink = FileArtifactSink::new(dir.path().join("exports"));

    let path = sink.save("INV-004.pdf", b"%PDF-1.7").await.unwrap();
    assert_eq!(path, dir.path().join("exports").join("INV-004.pdf"));
    assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.7");

    let leftovers: Vec<_> = std::fs::read_dir(dir.path().join("exports"))
      .unwrap()
      .filter_map(Result::ok)
      .filter(|e| e.file_name().to_string_lossy().ends_with(".part"))
      .collect();
    assert!(leftovers.is_empty());
  }

  #[tokio::test]
  async fn test_save_overwrites_existing() {
    let dir = TempDir::new().unwrap();
    let sink = FileArtifactSink::new(dir.path());
    sink.save("REC-001.jpg", b"old").await.unwrap();
    let path = sink.save("REC-001.jpg", b"new").await.unwrap();
    assert_eq!(std::fs::read(path).unwrap(), b"new");
  }

  #[tokio::test]
  async fn test_save_stays_inside_output_dir() {
    let dir = TempDir::new().unwrap();
    let sink = FileArtifactSink::new(dir.path().join("exports"));
    let path = sink.save("../escape.pdf", b"x").await.unwrap();
    assert_eq!(path, dir.path().join("exports").join("escape.pdf"));
  }
}
