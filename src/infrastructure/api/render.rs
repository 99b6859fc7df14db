use async_trait::async_trait;

use super::client::{ApiClient, network};
use crate::domain::document::{DocumentError, DocumentRenderer, RenderRequest, RenderedArtifact};

/// `/api/pdf/render/`: HTML fragment in, PDF or JPEG bytes out
pub struct HttpDocumentRenderer {
  api: ApiClient,
}

impl HttpDocumentRenderer {
  pub fn new(api: ApiClient) -> Self {
    Self { api }
  }
}

#[async_trait]
impl DocumentRenderer for HttpDocumentRenderer {
  async fn render(&self, request: RenderRequest) -> Result<RenderedArtifact, DocumentError> {
    let (width, height) = request.page.dimensions_mm();
    tracing::info!(
      "Rendering {} as {} ({}x{}mm)",
      request.filename,
      request.format.as_str(),
      width,
      height
    );

    let response = self
      .api
      .http()
      .post(self.api.url("/api/pdf/render/"))
      .json(&request)
      .send()
      .await
      .map_err(network)?;

    let status = response.status();
    if !status.is_success() {
      let message = ApiClient::error_message(status, response).await;
      return Err(DocumentError::RenderFailure(message));
    }

    let content_type = response
      .headers()
      .get(reqwest::header::CONTENT_TYPE)
      .and_then(|v| v.to_str().ok())
      .unwrap_or(request.format.content_type())
      .to_string();
    if content_type.starts_with("application/json") {
      let message = ApiClient::error_message(status, response).await;
      return Err(DocumentError::RenderFailure(message));
    }

    let bytes = response.bytes().await.map_err(network)?;
    Ok(RenderedArtifact {
      filename: request.filename,
      content_type,
      bytes: bytes.to_vec(),
    })
  }
}
