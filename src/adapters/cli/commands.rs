use serde::Serialize;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;

use super::args::Command;
use crate::adapters::notifications::{Notification, NotificationCenter, Tone};
use crate::application::document::{
  CalculateTotalsCommand, CalculateTotalsUseCase, DocumentCountsUseCase, DocumentDraftDto,
  ExportDocumentCommand, ExportDocumentUseCase, OpenDocumentCommand, OpenDocumentUseCase,
  PreviewDocumentCommand, PreviewDocumentUseCase, PreviewNextNumberCommand,
  PreviewNextNumberUseCase, SaveDocumentCommand, SaveDocumentUseCase,
};
use crate::application::project::{
  ExportProjectUseCase, ImportProjectCommand, ImportProjectUseCase,
};
use crate::application::recents::{
  ListRecentsCommand, ListRecentsUseCase, RemoveRecentCommand, RemoveRecentUseCase,
};
use crate::domain::document::{DocumentError, DocumentType, SessionFactory};
use crate::domain::project::ProjectArchiveApi;

/// Use cases the CLI dispatches to
pub struct CliDependencies {
  pub calculate_totals: Arc<CalculateTotalsUseCase>,
  pub preview_document: Arc<PreviewDocumentUseCase>,
  pub preview_next_number: Arc<PreviewNextNumberUseCase>,
  pub document_counts: Arc<DocumentCountsUseCase>,
  pub export_document: Arc<ExportDocumentUseCase>,
  pub save_document: Arc<SaveDocumentUseCase>,
  pub open_document: Arc<OpenDocumentUseCase>,
  pub list_recents: Arc<ListRecentsUseCase>,
  pub remove_recent: Arc<RemoveRecentUseCase>,
  pub export_project: Arc<ExportProjectUseCase>,
  pub import_project: Arc<ImportProjectUseCase>,
}

impl CliDependencies {
  pub fn new(sessions: Arc<SessionFactory>, archive: Arc<dyn ProjectArchiveApi>) -> Self {
    let recents = sessions.recents();
    Self {
      calculate_totals: Arc::new(CalculateTotalsUseCase::new(sessions.clone())),
      preview_document: Arc::new(PreviewDocumentUseCase::new(sessions.clone())),
      preview_next_number: Arc::new(PreviewNextNumberUseCase::new(sessions.counter())),
      document_counts: Arc::new(DocumentCountsUseCase::new(sessions.counter())),
      export_document: Arc::new(ExportDocumentUseCase::new(sessions.clone())),
      save_document: Arc::new(SaveDocumentUseCase::new(sessions.clone())),
      open_document: Arc::new(OpenDocumentUseCase::new(sessions.clone())),
      list_recents: Arc::new(ListRecentsUseCase::new(recents.clone())),
      remove_recent: Arc::new(RemoveRecentUseCase::new(recents.clone())),
      export_project: Arc::new(ExportProjectUseCase::new(
        archive.clone(),
        sessions.sink(),
        recents.clone(),
      )),
      import_project: Arc::new(ImportProjectUseCase::new(archive, recents)),
    }
  }
}

/// What a command printed and how the user was told about it
#[derive(Debug)]
pub struct CommandOutput {
  pub body: Option<Value>,
  pub notification: Option<Notification>,
}

impl CommandOutput {
  fn body<T: Serialize>(value: &T) -> Result<Self, DocumentError> {
    let body = serde_json::to_value(value)
      .map_err(|e| DocumentError::Internal(format!("Cannot serialize output: {}", e)))?;
    Ok(Self {
      body: Some(body),
      notification: None,
    })
  }

  fn notify(mut self, notification: Notification) -> Self {
    self.notification = Some(notification);
    self
  }
}

async fn load_draft(path: &Path) -> Result<DocumentDraftDto, DocumentError> {
  let raw = tokio::fs::read_to_string(path)
    .await
    .map_err(|e| DocumentError::Storage(format!("Cannot read {}: {}", path.display(), e)))?;
  serde_json::from_str(&raw).map_err(|e| {
    DocumentError::validation("draft", format!("{} is not a valid draft: {}", path.display(), e))
  })
}

fn type_name(document_type: impl Into<DocumentType>) -> String {
  document_type.into().as_str().to_string()
}

pub async fn dispatch(
  command: Command,
  deps: &CliDependencies,
) -> Result<CommandOutput, DocumentError> {
  match command {
    Command::Totals { draft, remote } => {
      let draft = load_draft(&draft).await?;
      let response = deps
        .calculate_totals
        .execute(CalculateTotalsCommand { draft, remote })
        .await?;
      let output = CommandOutput::body(&response)?;
      Ok(match &response.warning {
        Some(warning) => output.notify(Notification::info(warning.clone())),
        None => output,
      })
    }
    Command::Preview { draft } => {
      let draft = load_draft(&draft).await?;
      let snapshot = deps
        .preview_document
        .execute(PreviewDocumentCommand { draft })
        .await?;
      CommandOutput::body(&snapshot)
    }
    Command::Next { document_type } => {
      let response = deps
        .preview_next_number
        .execute(PreviewNextNumberCommand {
          document_type: type_name(document_type),
        })
        .await?;
      CommandOutput::body(&response)
    }
    Command::Counts => {
      let response = deps.document_counts.execute().await?;
      CommandOutput::body(&response)
    }
    Command::Export { draft, format } => {
      let draft = load_draft(&draft).await?;
      let format = crate::domain::document::ExportFormat::from(format);
      let response = deps
        .export_document
        .execute(ExportDocumentCommand {
          draft,
          format: format.as_str().to_string(),
        })
        .await?;
      let notification = Notification::from_export(&response);
      Ok(CommandOutput::body(&response)?.notify(notification))
    }
    Command::Save { draft, record_id } => {
      let draft = load_draft(&draft).await?;
      let response = deps
        .save_document
        .execute(SaveDocumentCommand { draft, record_id })
        .await?;
      let message = if response.created {
        format!("{} saved as record {}", response.document_number, response.record_id)
      } else {
        format!("{} updated", response.document_number)
      };
      Ok(CommandOutput::body(&response)?.notify(Notification::success(message)))
    }
    Command::Open {
      document_type,
      record_id,
    } => {
      let snapshot = deps
        .open_document
        .execute(OpenDocumentCommand {
          document_type: type_name(document_type),
          record_id,
        })
        .await?;
      CommandOutput::body(&snapshot)
    }
    Command::Recents { sort } => {
      let response = deps
        .list_recents
        .execute(ListRecentsCommand { sort: Some(sort) })
        .await?;
      CommandOutput::body(&response)
    }
    Command::Forget { key, clear } => {
      let key = if clear { None } else { key };
      let response = deps
        .remove_recent
        .execute(RemoveRecentCommand { key })
        .await?;
      let notification = match (response.cleared, response.removed) {
        (true, _) => Notification::success("Recent documents cleared"),
        (false, true) => Notification::success("Removed from recent documents"),
        (false, false) => Notification::info("Nothing to remove"),
      };
      Ok(CommandOutput::body(&response)?.notify(notification))
    }
    Command::ProjectExport => {
      let response = deps.export_project.execute().await?;
      let message = format!("Project exported to {}", response.path.display());
      Ok(CommandOutput::body(&response)?.notify(Notification::success(message)))
    }
    Command::ProjectImport { path } => {
      let response = deps
        .import_project
        .execute(ImportProjectCommand { path })
        .await?;
      let message = response.message.clone();
      Ok(CommandOutput::body(&response)?.notify(Notification::success(message)))
    }
  }
}

/// Run one command, print its JSON to stdout and notifications to stderr.
/// Returns the process exit code.
pub async fn run(command: Command, deps: &CliDependencies) -> i32 {
  let mut center = NotificationCenter::new();

  let code = match dispatch(command, deps).await {
    Ok(output) => {
      if let Some(body) = &output.body {
        match serde_json::to_string_pretty(body) {
          Ok(text) => println!("{}", text),
          Err(e) => tracing::error!("Cannot print output: {}", e),
        }
      }
      if let Some(notification) = output.notification {
        center.push(notification);
      }
      0
    }
    Err(error) => {
      tracing::warn!("Command failed: {}", error);
      center.push(Notification::from_error(&error));
      1
    }
  };

  for notification in center.active() {
    eprintln!("{}", notification);
  }
  if center.active().iter().any(|n| n.tone == Tone::Error) {
    1
  } else {
    code
  }
}
