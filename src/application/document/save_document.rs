use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;

use super::draft::DocumentDraftDto;
use crate::domain::document::{DocumentError, DocumentType, SessionFactory};

#[derive(Debug, Deserialize)]
pub struct SaveDocumentCommand {
  pub draft: DocumentDraftDto,
  /// Existing record to update instead of creating a new one
  #[serde(default)]
  pub record_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct SaveDocumentResponse {
  pub record_id: i64,
  pub document_number: String,
  pub created: bool,
}

pub struct SaveDocumentUseCase {
  sessions: Arc<SessionFactory>,
}

impl SaveDocumentUseCase {
  pub fn new(sessions: Arc<SessionFactory>) -> Self {
    Self { sessions }
  }

  pub async fn execute(
    &self,
    command: SaveDocumentCommand,
  ) -> Result<SaveDocumentResponse, DocumentError> {
    let document_type = DocumentType::from_str(&command.draft.document_type)?;
    let session = self.sessions.open(document_type);
    if let Err(e) = session.load().await {
      tracing::debug!("Saving without a number preview: {}", e);
    }
    command.draft.apply(&session)?;
    if let Some(record_id) = command.record_id {
      session.attach_record(record_id);
    }

    let report = session.save().await?;
    Ok(SaveDocumentResponse {
      record_id: report.record_id,
      document_number: report.document_number,
      created: report.created,
    })
  }
}
