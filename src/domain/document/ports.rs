use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;

use super::entities::Totals;
use super::errors::DocumentError;
use super::preview::Snapshot;
use super::value_objects::{DocumentType, ExportFormat, PageSpec};

/// Server-side document number sequence
#[async_trait]
pub trait CounterApi: Send + Sync {
  /// Next number without advancing the counter
  async fn peek(&self, document_type: DocumentType) -> Result<String, DocumentError>;
  /// Advance the counter and return the committed number
  async fn reserve(&self, document_type: DocumentType) -> Result<String, DocumentError>;
  /// Issued documents per type
  async fn counts(&self) -> Result<BTreeMap<DocumentType, u64>, DocumentError>;
}

/// Current form and item state sent for authoritative totals
#[derive(Debug, Clone, Serialize)]
pub struct CalculationRequest {
  pub document_type: DocumentType,
  pub items: Value,
}

#[async_trait]
pub trait TotalsCalculator: Send + Sync {
  async fn calculate(&self, request: CalculationRequest) -> Result<Totals, DocumentError>;
}

/// Markup handed to the rendering service
#[derive(Debug, Clone, Serialize)]
pub struct RenderRequest {
  pub html: String,
  pub document_type: DocumentType,
  pub format: ExportFormat,
  pub filename: String,
  pub page: PageSpec,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedArtifact {
  pub filename: String,
  pub content_type: String,
  pub bytes: Vec<u8>,
}

#[async_trait]
pub trait DocumentRenderer: Send + Sync {
  async fn render(&self, request: RenderRequest) -> Result<RenderedArtifact, DocumentError>;
}

/// Turns a snapshot into a markup fragment
pub trait MarkupRenderer: Send + Sync {
  fn render(&self, snapshot: &Snapshot, logo: Option<&Asset>) -> Result<String, DocumentError>;
}

/// Optional image embedded in exported documents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
  pub content_type: String,
  pub bytes: Vec<u8>,
}

#[async_trait]
pub trait AssetSource: Send + Sync {
  /// `Ok(None)` when no logo is configured
  async fn logo(&self) -> Result<Option<Asset>, DocumentError>;
}

/// Where finished artifacts end up
#[async_trait]
pub trait ArtifactSink: Send + Sync {
  async fn save(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf, DocumentError>;
}

/// Document as persisted by the backend CRUD endpoints
#[derive(Debug, Clone, Serialize)]
pub struct DocumentRecord {
  pub document_type: DocumentType,
  pub document_number: String,
  pub fields: BTreeMap<String, String>,
  pub items: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SavedRecord {
  pub id: i64,
  #[serde(default)]
  pub document_number: Option<String>,
}

#[async_trait]
pub trait DocumentRecordsApi: Send + Sync {
  async fn create(&self, record: &DocumentRecord) -> Result<SavedRecord, DocumentError>;
  async fn update(&self, id: i64, record: &DocumentRecord) -> Result<SavedRecord, DocumentError>;
  async fn fetch(&self, document_type: DocumentType, id: i64) -> Result<Value, DocumentError>;
}
