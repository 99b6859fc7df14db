use async_trait::async_trait;
use std::path::PathBuf;

use crate::domain::document::{Asset, AssetSource, DocumentError};

/// Logo read from a configured path on every export
pub struct FileLogoSource {
  path: Option<PathBuf>,
}

impl FileLogoSource {
  pub fn new(path: Option<PathBuf>) -> Self {
    Self { path }
  }
}

fn content_type(path: &std::path::Path) -> &'static str {
  match path
    .extension()
    .and_then(|e| e.to_str())
    .map(str::to_lowercase)
    .as_deref()
  {
    Some("png") => "image/png",
    Some("jpg") | Some("jpeg") => "image/jpeg",
    Some("svg") => "image/svg+xml",
    Some("gif") => "image/gif",
    Some("webp") => "image/webp",
    _ => "application/octet-stream",
  }
}

#[async_trait]
impl AssetSource for FileLogoSource {
  async fn logo(&self) -> Result<Option<Asset>, DocumentError> {
    let Some(path) = &self.path else {
      return Ok(None);
    };

    let bytes = tokio::fs::read(path).await.map_err(|e| {
      DocumentError::Storage(format!("Failed to read logo {}: {}", path.display(), e))
    })?;

    Ok(Some(Asset {
      content_type: content_type(path).to_string(),
      bytes,
    }))
  }
}
