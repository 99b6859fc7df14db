use async_trait::async_trait;
use reqwest::multipart::{Form, Part};

use super::client::{ApiClient, network};
use crate::domain::document::DocumentError;
use crate::domain::project::{ImportReport, PROJECT_EXTENSION, ProjectArchive, ProjectArchiveApi};

const ARCHIVE_CONTENT_TYPE: &str = "application/x-billing-project";

/// `/api/project/export/` and `/api/project/import/`
pub struct HttpProjectArchiveApi {
  api: ApiClient,
}

impl HttpProjectArchiveApi {
  pub fn new(api: ApiClient) -> Self {
    Self { api }
  }
}

/// Pull the file name out of a `Content-Disposition: attachment; filename="..."` header
fn attachment_filename(header: &str) -> Option<String> {
  header.split(';').map(str::trim).find_map(|part| {
    let value = part.strip_prefix("filename=")?;
    let value = value.trim_matches('"').trim();
    (!value.is_empty()).then(|| value.to_string())
  })
}

#[async_trait]
impl ProjectArchiveApi for HttpProjectArchiveApi {
  async fn export(&self) -> Result<ProjectArchive, DocumentError> {
    let response = self
      .api
      .http()
      .post(self.api.url("/api/project/export/"))
      .send()
      .await
      .map_err(network)?;
    let response = ApiClient::check(response).await?;

    let filename = response
      .headers()
      .get(reqwest::header::CONTENT_DISPOSITION)
      .and_then(|v| v.to_str().ok())
      .and_then(attachment_filename)
      .unwrap_or_else(|| {
        format!(
          "BillingApp-{}.{}",
          chrono::Utc::now().format("%Y%m%d-%H%M%S"),
          PROJECT_EXTENSION
        )
      });
    let bytes = response.bytes().await.map_err(network)?;

    Ok(ProjectArchive {
      filename,
      bytes: bytes.to_vec(),
    })
  }

  async fn import(&self, filename: &str, bytes: Vec<u8>) -> Result<ImportReport, DocumentError> {
    let part = Part::bytes(bytes)
      .file_name(filename.to_string())
      .mime_str(ARCHIVE_CONTENT_TYPE)
      .map_err(|e| DocumentError::Internal(format!("Invalid archive part: {}", e)))?;
    let form = Form::new().part("archive", part);

    let response = self
      .api
      .http()
      .post(self.api.url("/api/project/import/"))
      .multipart(form)
      .send()
      .await
      .map_err(network)?;
    ApiClient::json(response).await
  }
}
