pub mod entities;
pub mod errors;
pub mod form;
pub mod line_items;
pub mod numbering;
pub mod ports;
pub mod preview;
pub mod services;
#[cfg(test)]
pub(crate) mod testing;
pub mod totals;
pub mod value_objects;

pub use entities::{LevyAmount, LineItem, Totals};
pub use errors::DocumentError;
pub use form::{DocumentForm, FieldSpec, InvoiceForm, ReceiptForm, WaybillForm};
pub use line_items::{LineItemStore, MAX_LINE_ITEMS};
pub use numbering::{NumberReservation, ReservationOutcome};
pub use ports::{
  ArtifactSink, Asset, AssetSource, CalculationRequest, CounterApi, DocumentRecord,
  DocumentRecordsApi, DocumentRenderer, MarkupRenderer, RenderRequest, RenderedArtifact,
  SavedRecord, TotalsCalculator,
};
pub use preview::{PreviewSynchronizer, Snapshot, ViewMode};
pub use services::{
  DocumentSession, ExportReport, SaveReport, SessionFactory, SessionPorts, SessionSettings,
  safe_filename,
};
pub use totals::{StackedTaxCalculator, TotalsEngine, TotalsSource, TotalsView};
pub use value_objects::{
  DocumentNumber, DocumentType, ExportFormat, Levy, LineItemField, Orientation, PageSize,
  PageSpec, ValueObjectError,
};
