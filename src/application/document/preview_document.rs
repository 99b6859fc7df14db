use serde::Deserialize;
use std::str::FromStr;
use std::sync::Arc;

use super::draft::DocumentDraftDto;
use crate::domain::document::{DocumentError, DocumentType, SessionFactory, Snapshot, ViewMode};

#[derive(Debug, Deserialize)]
pub struct PreviewDocumentCommand {
  pub draft: DocumentDraftDto,
}

pub struct PreviewDocumentUseCase {
  sessions: Arc<SessionFactory>,
}

impl PreviewDocumentUseCase {
  pub fn new(sessions: Arc<SessionFactory>) -> Self {
    Self { sessions }
  }

  /// Snapshot of the draft as the preview pane would show it
  pub async fn execute(&self, command: PreviewDocumentCommand) -> Result<Snapshot, DocumentError> {
    let document_type = DocumentType::from_str(&command.draft.document_type)?;
    let session = self.sessions.open(document_type);
    if let Err(e) = session.load().await {
      tracing::debug!("Previewing with placeholder number: {}", e);
    }
    command.draft.apply(&session)?;

    session.show(ViewMode::Preview);
    Ok(session.snapshot())
  }
}
