pub mod calculate_totals;
pub mod document_counts;
pub mod draft;
pub mod export_document;
pub mod open_document;
pub mod preview_document;
pub mod preview_next_number;
pub mod save_document;

pub use calculate_totals::{
  CalculateTotalsCommand, CalculateTotalsResponse, CalculateTotalsUseCase, LevyAmountDto,
};
pub use document_counts::{DocumentCountsResponse, DocumentCountsUseCase};
pub use draft::{DocumentDraftDto, DraftLineItemDto};
pub use export_document::{ExportDocumentCommand, ExportDocumentResponse, ExportDocumentUseCase};
pub use open_document::{OpenDocumentCommand, OpenDocumentUseCase};
pub use preview_document::{PreviewDocumentCommand, PreviewDocumentUseCase};
pub use preview_next_number::{
  PreviewNextNumberCommand, PreviewNextNumberResponse, PreviewNextNumberUseCase,
};
pub use save_document::{SaveDocumentCommand, SaveDocumentResponse, SaveDocumentUseCase};
