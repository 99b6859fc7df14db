use async_trait::async_trait;
use serde_json::Value;

use super::client::{ApiClient, network};
use crate::domain::document::{
  DocumentError, DocumentRecord, DocumentRecordsApi, DocumentType, SavedRecord,
};

/// CRUD endpoints under `/api/{invoices,receipts,waybills}/api/`
pub struct HttpDocumentRecordsApi {
  api: ApiClient,
}

impl HttpDocumentRecordsApi {
  pub fn new(api: ApiClient) -> Self {
    Self { api }
  }

  fn create_path(document_type: DocumentType) -> String {
    format!("/api/{}/api/create/", document_type.plural())
  }

  fn record_path(document_type: DocumentType, id: i64) -> String {
    format!("/api/{}/api/{}/", document_type.plural(), id)
  }
}

/// Form fields at the top level, items as the JSON string the backend parses
fn body(record: &DocumentRecord) -> Result<Value, DocumentError> {
  let mut body = serde_json::Map::new();
  for (key, value) in &record.fields {
    body.insert(key.clone(), Value::String(value.clone()));
  }
  body.insert(
    "document_number".to_string(),
    Value::String(record.document_number.clone()),
  );
  let items = serde_json::to_string(&record.items)
    .map_err(|e| DocumentError::Internal(format!("Failed to encode items: {}", e)))?;
  body.insert("items_payload".to_string(), Value::String(items));
  Ok(Value::Object(body))
}

#[async_trait]
impl DocumentRecordsApi for HttpDocumentRecordsApi {
  async fn create(&self, record: &DocumentRecord) -> Result<SavedRecord, DocumentError> {
    let response = self
      .api
      .http()
      .post(self.api.url(&Self::create_path(record.document_type)))
      .json(&body(record)?)
      .send()
      .await
      .map_err(network)?;
    ApiClient::json(response).await
  }

  async fn update(&self, id: i64, record: &DocumentRecord) -> Result<SavedRecord, DocumentError> {
    let response = self
      .api
      .http()
      .put(self.api.url(&Self::record_path(record.document_type, id)))
      .json(&body(record)?)
      .send()
      .await
      .map_err(network)?;
    ApiClient::json(response).await
  }

  async fn fetch(&self, document_type: DocumentType, id: i64) -> Result<Value, DocumentError> {
    let response = self
      .api
      .http()
      .get(self.api.url(&Self::record_path(document_type, id)))
      .send()
      .await
      .map_err(network)?;
    ApiClient::json(response).await
  }
}
