//! Hand-written port doubles shared by the document and application tests

use async_trait::async_trait;
use rust_decimal_macros::dec;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

use super::numbering::mock::MockCounter;
use super::entities::Totals;
use super::ports::{
  ArtifactSink, Asset, AssetSource, CalculationRequest, DocumentRecord, DocumentRecordsApi,
  DocumentRenderer, MarkupRenderer, RenderRequest, RenderedArtifact, SavedRecord,
  TotalsCalculator,
};
use super::preview::Snapshot;
use super::services::{DocumentSession, SessionFactory, SessionPorts, SessionSettings};
use super::totals::StackedTaxCalculator;
use super::{DocumentError, DocumentType, Levy, LineItemField};
use crate::domain::recents::{
  RecentEntry, RecentSort, RecentsError, RecentsRepository, RecentsService,
};

/// Echoes the title and number so tests can see what was rendered
pub struct PlainMarkup;

impl MarkupRenderer for PlainMarkup {
  fn render(&self, snapshot: &Snapshot, logo: Option<&Asset>) -> Result<String, DocumentError> {
    Ok(format!(
      "<h1>{} {}</h1>{}",
      snapshot.title,
      snapshot.document_number,
      if logo.is_some() { "<img>" } else { "" }
    ))
  }
}

/// Returns fixed bytes, optionally failing or waiting for a signal
#[derive(Default)]
pub struct MockRenderer {
  pub fail: bool,
  pub gate: Option<(Arc<Notify>, Arc<Notify>)>,
  pub requests: Mutex<Vec<RenderRequest>>,
}

#[async_trait]
impl DocumentRenderer for MockRenderer {
  async fn render(&self, request: RenderRequest) -> Result<RenderedArtifact, DocumentError> {
    self.requests.lock().unwrap().push(request.clone());
    if let Some((entered, release)) = &self.gate {
      entered.notify_one();
      release.notified().await;
    }
    if self.fail {
      return Err(DocumentError::RenderFailure("wkhtmltopdf crashed".to_string()));
    }
    Ok(RenderedArtifact {
      filename: request.filename,
      content_type: request.format.content_type().to_string(),
      bytes: b"%PDF-1.7".to_vec(),
    })
  }
}

/// Backend totals endpoint that is always unreachable
pub struct UnreachableCalculator;

#[async_trait]
impl TotalsCalculator for UnreachableCalculator {
  async fn calculate(&self, _request: CalculationRequest) -> Result<Totals, DocumentError> {
    Err(DocumentError::NetworkFailure("connection refused".to_string()))
  }
}

#[derive(Default)]
pub struct MemorySink {
  pub saved: Mutex<Vec<(String, Vec<u8>)>>,
}

#[async_trait]
impl ArtifactSink for MemorySink {
  async fn save(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf, DocumentError> {
    self
      .saved
      .lock()
      .unwrap()
      .push((filename.to_string(), bytes.to_vec()));
    Ok(PathBuf::from("/out").join(filename))
  }
}

pub struct MissingLogo;

#[async_trait]
impl AssetSource for MissingLogo {
  async fn logo(&self) -> Result<Option<Asset>, DocumentError> {
    Err(DocumentError::Storage("logo.png not found".to_string()))
  }
}

#[derive(Default)]
pub struct MockRecords {
  pub created: Mutex<Vec<DocumentRecord>>,
  pub updated: Mutex<Vec<(i64, DocumentRecord)>>,
}

#[async_trait]
impl DocumentRecordsApi for MockRecords {
  async fn create(&self, record: &DocumentRecord) -> Result<SavedRecord, DocumentError> {
    self.created.lock().unwrap().push(record.clone());
    Ok(SavedRecord {
      id: 41,
      document_number: Some(record.document_number.clone()),
    })
  }

  async fn update(&self, id: i64, record: &DocumentRecord) -> Result<SavedRecord, DocumentError> {
    self.updated.lock().unwrap().push((id, record.clone()));
    Ok(SavedRecord {
      id,
      document_number: None,
    })
  }

  async fn fetch(&self, _document_type: DocumentType, id: i64) -> Result<Value, DocumentError> {
    Ok(serde_json::json!({
      "id": id,
      "document_number": "INV-009",
      "customer_name": "Kwame Boateng",
      "items": "[{\"description\":\"Paint\",\"quantity\":\"3\",\"unit_price\":\"12.50\"}]"
    }))
  }
}

#[derive(Default)]
pub struct MemoryRecents {
  pub entries: Mutex<Vec<RecentEntry>>,
}

#[async_trait]
impl RecentsRepository for MemoryRecents {
  async fn load(&self) -> Result<Vec<RecentEntry>, RecentsError> {
    Ok(self.entries.lock().unwrap().clone())
  }

  async fn save(&self, entries: &[RecentEntry]) -> Result<(), RecentsError> {
    *self.entries.lock().unwrap() = entries.to_vec();
    Ok(())
  }
}

pub struct TestHarness {
  pub counter: Arc<MockCounter>,
  pub renderer: Arc<MockRenderer>,
  pub sink: Arc<MemorySink>,
  pub records: Arc<MockRecords>,
  pub recents: Arc<RecentsService>,
}

impl TestHarness {
  pub fn new(renderer: MockRenderer) -> Self {
    Self {
      counter: Arc::new(MockCounter::starting_at(4)),
      renderer: Arc::new(renderer),
      sink: Arc::new(MemorySink::default()),
      records: Arc::new(MockRecords::default()),
      recents: Arc::new(RecentsService::new(Arc::new(MemoryRecents::default()), 20)),
    }
  }

  pub fn factory(&self) -> SessionFactory {
    self.factory_with(|levies| Arc::new(StackedTaxCalculator::new(levies)))
  }

  /// Same ports, with the totals calculator built from the session levies
  pub fn factory_with(
    &self,
    calculator: impl FnOnce(Arc<[Levy]>) -> Arc<dyn TotalsCalculator>,
  ) -> SessionFactory {
    let levies: Arc<[Levy]> = vec![
      Levy::new("NHIL", dec!(0.025)).unwrap(),
      Levy::new("GETFund", dec!(0.025)).unwrap(),
      Levy::new("COVID", dec!(0.01)).unwrap(),
    ]
    .into();
    let ports = SessionPorts {
      counter: self.counter.clone(),
      calculator: Some(calculator(levies.clone())),
      markup: Arc::new(PlainMarkup),
      renderer: self.renderer.clone(),
      sink: self.sink.clone(),
      assets: Arc::new(MissingLogo),
      records: self.records.clone(),
      recents: self.recents.clone(),
    };
    SessionFactory::new(
      ports,
      SessionSettings {
        levies,
        debounce: Duration::from_millis(300),
        currency_symbol: "GH₵".to_string(),
      },
    )
  }

  pub fn session(&self, document_type: DocumentType) -> DocumentSession {
    self.factory().open(document_type)
  }

  pub async fn recent_names(&self) -> Vec<String> {
    self
      .recents
      .list(RecentSort::Recency)
      .await
      .unwrap()
      .into_iter()
      .map(|e| e.name)
      .collect()
  }
}

pub fn fill_invoice(session: &DocumentSession) {
  session.set_field("customer_name", "Ama Mensah").unwrap();
  session.update_item(0, LineItemField::Description, "Cement");
  session.update_item(0, LineItemField::Quantity, "2");
  session.update_item(0, LineItemField::UnitPrice, "10");
  let index = session.add_item().unwrap();
  session.update_item(index, LineItemField::Description, "Nails");
  session.update_item(index, LineItemField::Quantity, "1");
  session.update_item(index, LineItemField::UnitPrice, "5");
}

