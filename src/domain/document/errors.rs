use super::value_objects::ValueObjectError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
  #[error("{field}: {message}")]
  ValidationFailure { field: String, message: String },

  #[error("A document can hold at most {limit} line items")]
  CapacityExceeded { limit: usize },

  #[error("Network error: {0}")]
  NetworkFailure(String),

  #[error("Rendering failed: {0}")]
  RenderFailure(String),

  #[error("Another export or save is already running for this document")]
  Busy,

  #[error("Storage error: {0}")]
  Storage(String),

  #[error("Internal error: {0}")]
  Internal(String),
}

impl DocumentError {
  pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
    DocumentError::ValidationFailure {
      field: field.into(),
      message: message.into(),
    }
  }
}

impl From<ValueObjectError> for DocumentError {
  fn from(error: ValueObjectError) -> Self {
    let field = match &error {
      ValueObjectError::InvalidDocumentType(_) => "document_type",
      ValueObjectError::InvalidExportFormat(_) => "format",
      ValueObjectError::InvalidLevy(_) => "levies",
      ValueObjectError::InvalidLineItemField(_) => "field",
      ValueObjectError::InvalidDocumentNumber(_) => "document_number",
    };
    DocumentError::validation(field, error.to_string())
  }
}

/// Flatten validator output into the first failing field
impl From<validator::ValidationErrors> for DocumentError {
  fn from(errors: validator::ValidationErrors) -> Self {
    let mut field_errors: Vec<_> = errors.field_errors().into_iter().collect();
    field_errors.sort_by(|a, b| a.0.cmp(&b.0));

    match field_errors.first() {
      Some((field, errors)) => {
        let message = errors
          .first()
          .and_then(|error| error.message.as_ref().map(|m| m.to_string()))
          .unwrap_or_else(|| format!("Invalid field: {}", field));
        DocumentError::validation(field.to_string(), message)
      }
      None => DocumentError::validation("form", "Invalid form"),
    }
  }
}
