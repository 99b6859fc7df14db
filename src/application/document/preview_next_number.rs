use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;

use crate::domain::document::{CounterApi, DocumentError, DocumentType, NumberReservation};

#[derive(Debug, Deserialize)]
pub struct PreviewNextNumberCommand {
  pub document_type: String,
}

#[derive(Debug, Serialize)]
pub struct PreviewNextNumberResponse {
  pub document_type: DocumentType,
  pub next_number: String,
}

pub struct PreviewNextNumberUseCase {
  counter: Arc<dyn CounterApi>,
}

impl PreviewNextNumberUseCase {
  pub fn new(counter: Arc<dyn CounterApi>) -> Self {
    Self { counter }
  }

  pub async fn execute(
    &self,
    command: PreviewNextNumberCommand,
  ) -> Result<PreviewNextNumberResponse, DocumentError> {
    let document_type = DocumentType::from_str(&command.document_type)?;
    let reservation = NumberReservation::new(document_type, self.counter.clone());
    let number = reservation.peek_next().await?;

    Ok(PreviewNextNumberResponse {
      document_type,
      next_number: number.value().to_string(),
    })
  }
}
