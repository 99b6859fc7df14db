use reqwest::{Response, StatusCode};
use serde::Deserialize;
use std::time::Duration;

use crate::domain::document::DocumentError;

/// Shared HTTP plumbing for the billing backend endpoints
#[derive(Debug, Clone)]
pub struct ApiClient {
  client: reqwest::Client,
  base_url: String,
}

#[derive(Deserialize)]
struct ErrorBody {
  error: String,
}

impl ApiClient {
  pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, DocumentError> {
    let client = reqwest::Client::builder()
      .timeout(timeout)
      .user_agent(concat!("billdesk/", env!("CARGO_PKG_VERSION")))
      .build()
      .map_err(|e| DocumentError::Internal(format!("Failed to create HTTP client: {}", e)))?;

    Ok(Self {
      client,
      base_url: base_url.into().trim_end_matches('/').to_string(),
    })
  }

  pub fn http(&self) -> &reqwest::Client {
    &self.client
  }

  pub fn base_url(&self) -> &str {
    &self.base_url
  }

  /// Absolute URL for a path such as `/api/counter/invoice/next/`
  pub fn url(&self, path: &str) -> String {
    format!("{}/{}", self.base_url, path.trim_start_matches('/'))
  }

  /// Pass 2xx responses through, turn everything else into `NetworkFailure`
  pub async fn check(response: Response) -> Result<Response, DocumentError> {
    let status = response.status();
    if status.is_success() {
      return Ok(response);
    }
    let message = Self::error_message(status, response).await;
    Err(DocumentError::NetworkFailure(message))
  }

  /// Best effort description of a failed response, preferring `{"error": ...}` bodies
  pub async fn error_message(status: StatusCode, response: Response) -> String {
    let url = response.url().path().to_string();
    match response.text().await {
      Ok(body) => match serde_json::from_str::<ErrorBody>(&body) {
        Ok(parsed) => format!("{} ({}): {}", url, status, parsed.error),
        Err(_) if body.trim().is_empty() => format!("{} returned {}", url, status),
        Err(_) => format!("{} ({}): {}", url, status, truncate(&body, 200)),
      },
      Err(_) => format!("{} returned {}", url, status),
    }
  }

  pub async fn json<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, DocumentError> {
    let response = Self::check(response).await?;
    response
      .json::<T>()
      .await
      .map_err(|e| DocumentError::NetworkFailure(format!("Invalid response body: {}", e)))
  }
}

pub(crate) fn network(error: reqwest::Error) -> DocumentError {
  if error.is_timeout() {
    DocumentError::NetworkFailure(format!("Request timed out: {}", error))
  } else {
    DocumentError::NetworkFailure(error.to_string())
  }
}

fn truncate(text: &str, max: usize) -> &str {
  match text.char_indices().nth(max) {
    Some((index, _)) => &text[..index],
    None => text,
  }
}
