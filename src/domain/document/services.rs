use chrono::Local;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use super::entities::LineItem;
use super::errors::DocumentError;
use super::form::DocumentForm;
use super::line_items::LineItemStore;
use super::numbering::{NumberReservation, ReservationOutcome};
use super::ports::{
  ArtifactSink, AssetSource, CalculationRequest, CounterApi, DocumentRecord, DocumentRecordsApi,
  DocumentRenderer, MarkupRenderer, RenderRequest, TotalsCalculator,
};
use super::preview::{PreviewSynchronizer, Snapshot, ViewMode};
use super::totals::{TotalsEngine, TotalsView};
use super::value_objects::{DocumentNumber, DocumentType, ExportFormat, Levy, LineItemField};
use crate::domain::recents::{RecentAction, RecentEntry, RecentsService};

/// Collaborators a document session talks to
#[derive(Clone)]
pub struct SessionPorts {
  pub counter: Arc<dyn CounterApi>,
  pub calculator: Option<Arc<dyn TotalsCalculator>>,
  pub markup: Arc<dyn MarkupRenderer>,
  pub renderer: Arc<dyn DocumentRenderer>,
  pub sink: Arc<dyn ArtifactSink>,
  pub assets: Arc<dyn AssetSource>,
  pub records: Arc<dyn DocumentRecordsApi>,
  pub recents: Arc<RecentsService>,
}

#[derive(Debug, Clone)]
pub struct SessionSettings {
  pub levies: Arc<[Levy]>,
  pub debounce: Duration,
  pub currency_symbol: String,
}

/// Outcome of a finished export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
  pub path: PathBuf,
  pub document_number: String,
  pub format: ExportFormat,
  /// Set when the export used a stale number because reservation failed
  pub reservation_error: Option<DocumentError>,
}

impl ExportReport {
  pub fn is_degraded(&self) -> bool {
    self.reservation_error.is_some()
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveReport {
  pub record_id: i64,
  pub document_number: String,
  pub created: bool,
}

#[derive(Debug)]
struct EditorState {
  form: DocumentForm,
  store: LineItemStore,
  preview: PreviewSynchronizer,
  record_id: Option<i64>,
}

struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
  fn drop(&mut self) {
    self.0.store(false, Ordering::Release);
  }
}

/// Reduce a file name to `[A-Za-z0-9._-]` and force the format's extension
pub fn safe_filename(stem: &str, format: ExportFormat) -> String {
  let mut cleaned: String = stem
    .trim()
    .chars()
    .map(|c| {
      if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
        c
      } else {
        '_'
      }
    })
    .collect();

  let extension = format!(".{}", format.extension());
  if cleaned.to_lowercase().ends_with(&extension) {
    cleaned.truncate(cleaned.len() - extension.len());
  }
  let cleaned = cleaned.trim_matches(|c| c == '.' || c == '_');
  let stem = if cleaned.is_empty() { "document" } else { cleaned };
  format!("{}{}", stem, extension)
}

/// Builds independent sessions sharing the same collaborators
#[derive(Clone)]
pub struct SessionFactory {
  ports: SessionPorts,
  settings: SessionSettings,
}

impl SessionFactory {
  pub fn new(ports: SessionPorts, settings: SessionSettings) -> Self {
    Self { ports, settings }
  }

  pub fn open(&self, document_type: DocumentType) -> DocumentSession {
    DocumentSession::new(document_type, self.ports.clone(), self.settings.clone())
  }

  pub fn counter(&self) -> Arc<dyn CounterApi> {
    self.ports.counter.clone()
  }

  pub fn sink(&self) -> Arc<dyn ArtifactSink> {
    self.ports.sink.clone()
  }

  pub fn recents(&self) -> Arc<RecentsService> {
    self.ports.recents.clone()
  }
}

/// One open document: form, items, totals, preview and numbering kept consistent
pub struct DocumentSession {
  document_type: DocumentType,
  editor: Mutex<EditorState>,
  totals: Arc<TotalsEngine>,
  numbering: NumberReservation,
  busy: AtomicBool,
  ports: SessionPorts,
}

impl DocumentSession {
  pub fn new(document_type: DocumentType, ports: SessionPorts, settings: SessionSettings) -> Self {
    let (levies, calculator) = if document_type.applies_levies() {
      (settings.levies, ports.calculator.clone())
    } else {
      (Arc::from(Vec::new()), None)
    };

    let totals = Arc::new(TotalsEngine::new(levies, calculator, settings.debounce));
    let store = LineItemStore::seeded();
    totals.recompute_local(store.items());

    Self {
      document_type,
      editor: Mutex::new(EditorState {
        form: DocumentForm::new(document_type),
        store,
        preview: PreviewSynchronizer::new(settings.currency_symbol),
        record_id: None,
      }),
      totals,
      numbering: NumberReservation::new(document_type, ports.counter.clone()),
      busy: AtomicBool::new(false),
      ports,
    }
  }

  fn lock(&self) -> MutexGuard<'_, EditorState> {
    self
      .editor
      .lock()
      .unwrap_or_else(|poisoned| poisoned.into_inner())
  }

  fn acquire(&self) -> Result<BusyGuard<'_>, DocumentError> {
    self
      .busy
      .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
      .map_err(|_| DocumentError::Busy)?;
    Ok(BusyGuard(&self.busy))
  }

  pub fn document_type(&self) -> DocumentType {
    self.document_type
  }

  pub fn is_busy(&self) -> bool {
    self.busy.load(Ordering::Acquire)
  }

  /// Fetch the next number for display. A failure keeps the current value.
  pub async fn load(&self) -> Result<DocumentNumber, DocumentError> {
    let result = self.numbering.peek_next().await;
    if let Err(e) = &result {
      tracing::warn!("Could not preview the next {} number: {}", self.document_type, e);
    }
    self.sync_now();
    result
  }

  pub fn document_number(&self) -> DocumentNumber {
    self.numbering.current()
  }

  pub fn items(&self) -> Vec<LineItem> {
    self.lock().store.items().to_vec()
  }

  pub fn form(&self) -> DocumentForm {
    self.lock().form.clone()
  }

  pub fn totals(&self) -> TotalsView {
    self.totals.current()
  }

  pub fn mode(&self) -> ViewMode {
    self.lock().preview.mode()
  }

  pub fn add_item(&self) -> Result<usize, DocumentError> {
    let mut state = self.lock();
    let index = state.store.add()?;
    self.after_edit(&mut state);
    Ok(index)
  }

  pub fn update_item(&self, index: usize, field: LineItemField, value: &str) -> bool {
    let mut state = self.lock();
    if !state.store.update(index, field, value) {
      return false;
    }
    self.after_edit(&mut state);
    true
  }

  pub fn remove_item(&self, index: usize) -> Option<LineItem> {
    let mut state = self.lock();
    let removed = state.store.remove(index)?;
    state.store.ensure_seeded();
    self.after_edit(&mut state);
    Some(removed)
  }

  /// Bind this session to an existing backend record so `save` updates it
  pub fn attach_record(&self, record_id: i64) {
    self.lock().record_id = Some(record_id);
  }

  pub fn set_field(&self, key: &str, value: &str) -> Result<(), DocumentError> {
    let mut state = self.lock();
    state.form.set(key, value)?;
    self.sync_locked(&mut state);
    Ok(())
  }

  // Totals follow the mutation under the same lock, then the preview mirrors both
  fn after_edit(&self, state: &mut EditorState) {
    let (_, tag) = self.totals.recompute_local(state.store.items());
    let request = CalculationRequest {
      document_type: self.document_type,
      items: state.store.to_payload(),
    };
    self.totals.schedule_remote(tag, request);
    self.sync_locked(state);
  }

  fn sync_locked(&self, state: &mut EditorState) -> Snapshot {
    let totals = self.totals.current().totals;
    let number = self.numbering.current();
    let today = Local::now().date_naive();
    let EditorState {
      form,
      store,
      preview,
      ..
    } = state;
    preview.sync(form, store.items(), &totals, &number, today)
  }

  fn sync_now(&self) -> Snapshot {
    let mut state = self.lock();
    self.sync_locked(&mut state)
  }

  /// Fresh snapshot of the current state
  pub fn snapshot(&self) -> Snapshot {
    self.sync_now()
  }

  /// Switch views; entering the preview always re-syncs
  pub fn show(&self, mode: ViewMode) -> bool {
    let mut state = self.lock();
    let changed = state.preview.show(mode);
    if mode == ViewMode::Preview {
      self.sync_locked(&mut state);
    }
    changed
  }

  pub fn toggle(&self) -> ViewMode {
    let mut state = self.lock();
    let mode = state.preview.toggle();
    if mode == ViewMode::Preview {
      self.sync_locked(&mut state);
    }
    mode
  }

  /// Ask for authoritative totals right away instead of waiting for the debounce
  pub async fn reconcile_now(&self) -> Result<TotalsView, DocumentError> {
    let (tag, request) = {
      let state = self.lock();
      (
        self.totals.latest_tag(),
        CalculationRequest {
          document_type: self.document_type,
          items: state.store.to_payload(),
        },
      )
    };
    self.totals.compute_remote(tag, request).await?;
    self.sync_now();
    Ok(self.totals.current())
  }

  pub fn validate(&self) -> Result<(), DocumentError> {
    self.lock().form.validate()
  }

  /// Reserve a number, render and save the artifact, then release the number
  pub async fn export(&self, format: ExportFormat) -> Result<ExportReport, DocumentError> {
    let _busy = self.acquire()?;
    self.validate()?;

    let outcome = self.numbering.reserve().await;
    let result = self.export_with(format, &outcome).await;

    self.numbering.release().await;
    self.sync_now();

    match &result {
      Ok(report) => tracing::info!(
        "Exported {} {} to {}",
        self.document_type,
        report.document_number,
        report.path.display()
      ),
      Err(e) => tracing::warn!("Export of {} failed: {}", self.document_type, e),
    }
    result
  }

  async fn export_with(
    &self,
    format: ExportFormat,
    outcome: &ReservationOutcome,
  ) -> Result<ExportReport, DocumentError> {
    let snapshot = self.sync_now();
    let display_name = self.lock().form.display_name().map(str::to_string);

    let logo = match self.ports.assets.logo().await {
      Ok(logo) => logo,
      Err(e) => {
        tracing::warn!("Exporting without logo: {}", e);
        None
      }
    };

    let html = self.ports.markup.render(&snapshot, logo.as_ref())?;
    let stem = match &display_name {
      Some(name) => format!("{}_{}", snapshot.document_number, name),
      None => snapshot.document_number.clone(),
    };
    let filename = safe_filename(&stem, format);

    let artifact = self
      .ports
      .renderer
      .render(RenderRequest {
        html,
        document_type: self.document_type,
        format,
        filename: filename.clone(),
        page: snapshot.page,
      })
      .await?;
    if artifact.bytes.is_empty() {
      return Err(DocumentError::RenderFailure(
        "Renderer returned an empty document".to_string(),
      ));
    }

    let path = self.ports.sink.save(&filename, &artifact.bytes).await?;

    let mut entry = RecentEntry::new(snapshot.document_number.clone(), RecentAction::Export)?
      .with_path(path.display().to_string())
      .with_document_type(self.document_type)
      .with_metadata("format", format.as_str());
    if let Some(name) = display_name {
      entry = entry.with_metadata("name", name);
    }
    if let Err(e) = self.ports.recents.record(entry).await {
      tracing::warn!("Could not update recent documents: {}", e);
    }

    let reservation_error = match outcome {
      ReservationOutcome::Reserved(_) => None,
      ReservationOutcome::Degraded { error, .. } => Some(error.clone()),
    };

    Ok(ExportReport {
      path,
      document_number: snapshot.document_number,
      format,
      reservation_error,
    })
  }

  /// Persist the document through the records API, creating it on first save
  pub async fn save(&self) -> Result<SaveReport, DocumentError> {
    let _busy = self.acquire()?;

    let (record, record_id, display_name) = {
      let state = self.lock();
      state.form.validate()?;
      (
        DocumentRecord {
          document_type: self.document_type,
          document_number: self.numbering.current().value().to_string(),
          fields: state.form.values(),
          items: state.store.to_payload(),
        },
        state.record_id,
        state.form.display_name().map(str::to_string),
      )
    };

    let saved = match record_id {
      Some(id) => self.ports.records.update(id, &record).await?,
      None => self.ports.records.create(&record).await?,
    };
    self.lock().record_id = Some(saved.id);

    let document_number = saved
      .document_number
      .clone()
      .unwrap_or_else(|| record.document_number.clone());
    tracing::info!("Saved {} {} as record {}", self.document_type, document_number, saved.id);

    let mut entry = RecentEntry::new(document_number.clone(), RecentAction::Save)?
      .with_document_type(self.document_type)
      .with_metadata("record_id", saved.id.to_string());
    if let Some(name) = display_name {
      entry = entry.with_metadata("name", name);
    }
    if let Err(e) = self.ports.recents.record(entry).await {
      tracing::warn!("Could not update recent documents: {}", e);
    }

    Ok(SaveReport {
      record_id: saved.id,
      document_number,
      created: record_id.is_none(),
    })
  }

  /// Load a saved document into this session
  pub async fn open(&self, record_id: i64) -> Result<(), DocumentError> {
    let _busy = self.acquire()?;
    let record = self
      .ports
      .records
      .fetch(self.document_type, record_id)
      .await?;

    let items: Vec<LineItem> = match record.get("items") {
      Some(Value::String(raw)) => serde_json::from_str(raw),
      Some(value) => serde_json::from_value(value.clone()),
      None => Ok(Vec::new()),
    }
    .map_err(|e| DocumentError::Internal(format!("Invalid items in record {}: {}", record_id, e)))?;

    let number = record
      .get("document_number")
      .and_then(Value::as_str)
      .map(str::to_string);
    if let Some(value) = &number {
      self.numbering.adopt(value.as_str())?;
    }

    {
      let mut state = self.lock();
      let mut form = DocumentForm::new(self.document_type);
      for spec in form.specs() {
        if let Some(Value::String(value)) = record.get(spec.key) {
          form.set(spec.key, value.as_str())?;
        }
      }
      state.form = form;
      state.store = LineItemStore::from_items(items);
      state.store.ensure_seeded();
      state.record_id = Some(record_id);
      self.after_edit(&mut state);
    }

    let entry = RecentEntry::new(
      number.unwrap_or_else(|| format!("{} {}", self.document_type.title(), record_id)),
      RecentAction::Open,
    )?
    .with_document_type(self.document_type)
    .with_metadata("record_id", record_id.to_string());
    if let Err(e) = self.ports.recents.record(entry).await {
      tracing::warn!("Could not update recent documents: {}", e);
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::document::testing::{MockRenderer, TestHarness, fill_invoice};
  use crate::domain::recents::RecentSort;
  use rust_decimal_macros::dec;
  use tokio::sync::Notify;

  #[test]
  fn test_safe_filename() {
    assert_eq!(safe_filename("INV-004_Ama Mensah", ExportFormat::Pdf), "INV-004_Ama_Mensah.pdf");
    assert_eq!(safe_filename("report.JPG", ExportFormat::Jpeg), "report.jpg");
    assert_eq!(safe_filename("../../etc", ExportFormat::Pdf), "etc.pdf");
    assert_eq!(safe_filename("", ExportFormat::Jpeg), "document.jpg");
  }

  #[tokio::test(start_paused = true)]
  async fn test_edits_update_totals_and_preview() {
    let harness = TestHarness::new(MockRenderer::default());
    let session = harness.session(DocumentType::Invoice);
    fill_invoice(&session);

    let view = session.totals();
    assert_eq!(view.totals.subtotal, dec!(25));
    assert_eq!(view.totals.grand_total, dec!(26.5));

    assert_eq!(session.toggle(), ViewMode::Preview);
    let snapshot = session.snapshot();
    assert_eq!(snapshot.field("customer_name"), Some("Ama Mensah"));
    assert_eq!(snapshot.totals.grand_total, "GH₵ 26.50");
    assert_eq!(snapshot.items.len(), 2);
  }

  #[tokio::test]
  async fn test_capacity_and_removal() {
    let harness = TestHarness::new(MockRenderer::default());
    let session = harness.session(DocumentType::Waybill);
    for _ in 0..9 {
      session.add_item().unwrap();
    }
    assert!(matches!(
      session.add_item(),
      Err(DocumentError::CapacityExceeded { limit: 10 })
    ));
    assert_eq!(session.items().len(), 10);

    for _ in 0..10 {
      session.remove_item(0).unwrap();
    }
    assert_eq!(session.items().len(), 1);
    assert!(!session.update_item(5, LineItemField::Quantity, "3"));
  }

  #[tokio::test]
  async fn test_receipts_carry_no_levies() {
    let harness = TestHarness::new(MockRenderer::default());
    let session = harness.session(DocumentType::Receipt);
    session.update_item(0, LineItemField::Quantity, "2");
    session.update_item(0, LineItemField::UnitPrice, "10");
    let totals = session.totals().totals;
    assert!(totals.levies.is_empty());
    assert_eq!(totals.grand_total, dec!(20));
  }

  #[tokio::test]
  async fn test_export_reserves_renders_and_records() {
    let harness = TestHarness::new(MockRenderer::default());
    let session = harness.session(DocumentType::Invoice);
    session.load().await.unwrap();
    fill_invoice(&session);

    let report = session.export(ExportFormat::Pdf).await.unwrap();
    assert!(!report.is_degraded());
    assert_eq!(report.document_number, "INV-004");
    assert_eq!(report.path, PathBuf::from("/out/INV-004_Ama_Mensah.pdf"));

    let requests = harness.renderer.requests.lock().unwrap().clone();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].html.contains("INV-004"));
    assert!(!requests[0].html.contains("<img>"));

    assert_eq!(harness.recent_names().await, vec!["INV-004"]);
    assert!(!session.document_number().is_reserved());
    assert_eq!(session.document_number().value(), "INV-005");
  }

  #[tokio::test]
  async fn test_invalid_form_blocks_export() {
    let harness = TestHarness::new(MockRenderer::default());
    let session = harness.session(DocumentType::Invoice);
    let err = session.export(ExportFormat::Pdf).await.unwrap_err();
    assert!(matches!(err, DocumentError::ValidationFailure { ref field, .. } if field == "customer_name"));
    assert!(harness.renderer.requests.lock().unwrap().is_empty());
    assert!(!session.is_busy());
  }

  #[tokio::test]
  async fn test_failed_reservation_degrades_export() {
    let harness = TestHarness::new(MockRenderer::default());
    let session = harness.session(DocumentType::Invoice);
    session.load().await.unwrap();
    fill_invoice(&session);
    harness.counter.set_fail_reserve(true);

    let report = session.export(ExportFormat::Jpeg).await.unwrap();
    assert!(report.is_degraded());
    assert_eq!(report.document_number, "INV-004");
    assert!(report.path.ends_with("INV-004_Ama_Mensah.jpg"));
    assert_eq!(session.document_number().value(), "INV-004");
  }

  #[tokio::test]
  async fn test_render_failure_records_nothing() {
    let harness = TestHarness::new(MockRenderer {
      fail: true,
      ..Default::default()
    });
    let session = harness.session(DocumentType::Invoice);
    session.load().await.unwrap();
    fill_invoice(&session);

    let err = session.export(ExportFormat::Pdf).await.unwrap_err();
    assert!(matches!(err, DocumentError::RenderFailure(_)));
    assert!(harness.sink.saved.lock().unwrap().is_empty());
    assert!(harness.recent_names().await.is_empty());
    // The counter still moved on; the session shows the next preview
    assert_eq!(session.document_number().value(), "INV-005");
    assert!(!session.is_busy());
  }

  #[tokio::test]
  async fn test_concurrent_export_is_rejected() {
    let entered = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let harness = TestHarness::new(MockRenderer {
      gate: Some((entered.clone(), release.clone())),
      ..Default::default()
    });
    let session = Arc::new(harness.session(DocumentType::Invoice));
    fill_invoice(&session);

    let running = tokio::spawn({
      let session = session.clone();
      async move { session.export(ExportFormat::Pdf).await }
    });
    entered.notified().await;

    assert_eq!(
      session.export(ExportFormat::Pdf).await.unwrap_err(),
      DocumentError::Busy
    );
    assert_eq!(session.save().await.unwrap_err(), DocumentError::Busy);
    assert_eq!(session.open(7).await.unwrap_err(), DocumentError::Busy);
    assert_eq!(session.form().get("customer_name"), Some("Ama Mensah"));

    release.notify_one();
    assert!(running.await.unwrap().is_ok());
    assert!(!session.is_busy());
  }

  #[tokio::test]
  async fn test_save_creates_then_updates() {
    let harness = TestHarness::new(MockRenderer::default());
    let session = harness.session(DocumentType::Invoice);
    session.load().await.unwrap();
    fill_invoice(&session);

    let first = session.save().await.unwrap();
    assert!(first.created);
    assert_eq!(first.record_id, 41);
    let created = harness.records.created.lock().unwrap().clone();
    assert_eq!(created[0].fields.get("customer_name").map(String::as_str), Some("Ama Mensah"));
    assert_eq!(created[0].items.as_array().map(Vec::len), Some(2));

    let second = session.save().await.unwrap();
    assert!(!second.created);
    assert_eq!(harness.records.updated.lock().unwrap()[0].0, 41);
    assert_eq!(harness.recent_names().await, vec!["INV-004"]);
  }

  #[tokio::test]
  async fn test_open_loads_saved_record() {
    let harness = TestHarness::new(MockRenderer::default());
    let session = harness.session(DocumentType::Invoice);
    session.open(7).await.unwrap();

    assert_eq!(session.form().get("customer_name"), Some("Kwame Boateng"));
    let items = session.items();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].total(), dec!(37.5));

    let entries = harness.recents.list(RecentSort::Recency).await.unwrap();
    assert_eq!(entries[0].name, "INV-009");
    assert_eq!(entries[0].last_action, RecentAction::Open);
    assert_eq!(entries[0].metadata.get("record_id").map(String::as_str), Some("7"));
    assert_eq!(session.document_number().value(), "INV-009");
    assert_eq!(session.snapshot().document_number, "INV-009");
  }
}
