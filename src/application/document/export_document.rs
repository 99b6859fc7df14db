use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use super::draft::DocumentDraftDto;
use crate::domain::document::{
  DocumentError, DocumentType, ExportFormat, ExportReport, SessionFactory,
};

#[derive(Debug, Deserialize)]
pub struct ExportDocumentCommand {
  pub draft: DocumentDraftDto,
  pub format: String,
}

#[derive(Debug, Serialize)]
pub struct ExportDocumentResponse {
  pub path: PathBuf,
  pub document_number: String,
  pub format: ExportFormat,
  /// Present when the document went out with a number that was not reserved
  pub warning: Option<String>,
}

impl From<ExportReport> for ExportDocumentResponse {
  fn from(report: ExportReport) -> Self {
    Self {
      warning: report.reservation_error.as_ref().map(|e| {
        format!(
          "Document exported but a fresh number could not be reserved: {}",
          e
        )
      }),
      path: report.path,
      document_number: report.document_number,
      format: report.format,
    }
  }
}

pub struct ExportDocumentUseCase {
  sessions: Arc<SessionFactory>,
}

impl ExportDocumentUseCase {
  pub fn new(sessions: Arc<SessionFactory>) -> Self {
    Self { sessions }
  }

  pub async fn execute(
    &self,
    command: ExportDocumentCommand,
  ) -> Result<ExportDocumentResponse, DocumentError> {
    let document_type = DocumentType::from_str(&command.draft.document_type)?;
    let format = ExportFormat::from_str(&command.format)?;

    let session = self.sessions.open(document_type);
    if let Err(e) = session.load().await {
      tracing::debug!("Exporting without a number preview: {}", e);
    }
    command.draft.apply(&session)?;

    let report = session.export(format).await?;
    Ok(report.into())
  }
}
