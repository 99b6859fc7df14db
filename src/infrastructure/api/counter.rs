use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeMap;

use super::client::{ApiClient, network};
use crate::domain::document::{CounterApi, DocumentError, DocumentType};

#[derive(Debug, Deserialize)]
struct NextNumber {
  next_number: String,
}

/// `/api/counter/` endpoints
pub struct HttpCounterApi {
  api: ApiClient,
}

impl HttpCounterApi {
  pub fn new(api: ApiClient) -> Self {
    Self { api }
  }

  fn next_path(document_type: DocumentType) -> String {
    format!("/api/counter/{}/next/", document_type.as_str())
  }
}

#[async_trait]
impl CounterApi for HttpCounterApi {
  async fn peek(&self, document_type: DocumentType) -> Result<String, DocumentError> {
    let response = self
      .api
      .http()
      .get(self.api.url(&Self::next_path(document_type)))
      .send()
      .await
      .map_err(network)?;
    let body: NextNumber = ApiClient::json(response).await?;
    tracing::debug!("Next {} number is {}", document_type, body.next_number);
    Ok(body.next_number)
  }

  async fn reserve(&self, document_type: DocumentType) -> Result<String, DocumentError> {
    let response = self
      .api
      .http()
      .post(self.api.url(&Self::next_path(document_type)))
      .send()
      .await
      .map_err(network)?;
    let body: NextNumber = ApiClient::json(response).await?;
    Ok(body.next_number)
  }

  async fn counts(&self) -> Result<BTreeMap<DocumentType, u64>, DocumentError> {
    let response = self
      .api
      .http()
      .get(self.api.url("/api/counter/counts/"))
      .send()
      .await
      .map_err(network)?;
    let raw: BTreeMap<String, u64> = ApiClient::json(response).await?;
    Ok(parse_counts(raw))
  }
}

/// Unknown keys are ignored, missing types count as zero
fn parse_counts(raw: BTreeMap<String, u64>) -> BTreeMap<DocumentType, u64> {
  let mut counts: BTreeMap<DocumentType, u64> =
    DocumentType::ALL.iter().map(|t| (*t, 0)).collect();
  for (key, value) in raw {
    match key.parse::<DocumentType>() {
      Ok(document_type) => {
        counts.insert(document_type, value);
      }
      Err(_) => tracing::debug!("Ignoring count for unknown document type {}", key),
    }
  }
  counts
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_next_path_per_type() {
    assert_eq!(
      HttpCounterApi::next_path(DocumentType::Waybill),
      "/api/counter/waybill/next/"
    );
  }

  #[test]
  fn test_parse_counts_fills_missing_types() {
    let raw: BTreeMap<String, u64> =
      serde_json::from_str(r#"{"invoice": 12, "receipt": 3, "quote": 9}"#).unwrap();
    let counts = parse_counts(raw);
    assert_eq!(counts.get(&DocumentType::Invoice), Some(&12));
    assert_eq!(counts.get(&DocumentType::Receipt), Some(&3));
    assert_eq!(counts.get(&DocumentType::Waybill), Some(&0));
    assert_eq!(counts.len(), 3);
  }
}
