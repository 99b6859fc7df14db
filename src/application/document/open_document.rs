use serde::Deserialize;
use std::str::FromStr;
use std::sync::Arc;

use crate::domain::document::{DocumentError, DocumentType, SessionFactory, Snapshot, ViewMode};

#[derive(Debug, Deserialize)]
pub struct OpenDocumentCommand {
  pub document_type: String,
  pub record_id: i64,
}

pub struct OpenDocumentUseCase {
  sessions: Arc<SessionFactory>,
}

impl OpenDocumentUseCase {
  pub fn new(sessions: Arc<SessionFactory>) -> Self {
    Self { sessions }
  }

  /// Load a saved record and return its preview
  pub async fn execute(&self, command: OpenDocumentCommand) -> Result<Snapshot, DocumentError> {
    let document_type = DocumentType::from_str(&command.document_type)?;
    let session = self.sessions.open(document_type);
    session.open(command.record_id).await?;

    session.show(ViewMode::Preview);
    Ok(session.snapshot())
  }
}
