use thiserror::Error;

use crate::domain::document::DocumentError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecentsError {
  #[error("Invalid recent entry: {0}")]
  InvalidEntry(String),

  #[error("Storage error: {0}")]
  Storage(String),
}

impl From<RecentsError> for DocumentError {
  fn from(error: RecentsError) -> Self {
    match error {
      RecentsError::InvalidEntry(message) => DocumentError::validation("name", message),
      RecentsError::Storage(message) => DocumentError::Storage(message),
    }
  }
}
