use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::errors::DocumentError;
use super::ports::CounterApi;
use super::value_objects::{DocumentNumber, DocumentType};

/// Result of trying to commit a number before an export
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReservationOutcome {
  Reserved(DocumentNumber),
  /// The counter could not be advanced; the last preview is used instead
  Degraded {
    fallback: DocumentNumber,
    error: DocumentError,
  },
}

impl ReservationOutcome {
  pub fn number(&self) -> &DocumentNumber {
    match self {
      ReservationOutcome::Reserved(number) => number,
      ReservationOutcome::Degraded { fallback, .. } => fallback,
    }
  }

  pub fn is_degraded(&self) -> bool {
    matches!(self, ReservationOutcome::Degraded { .. })
  }
}

#[derive(Debug)]
struct ReservationState {
  current: DocumentNumber,
  last_preview: Option<DocumentNumber>,
}

/// Per-document view of the server-side number sequence
pub struct NumberReservation {
  document_type: DocumentType,
  counter: Arc<dyn CounterApi>,
  state: Mutex<ReservationState>,
}

impl NumberReservation {
  pub fn new(document_type: DocumentType, counter: Arc<dyn CounterApi>) -> Self {
    Self {
      document_type,
      counter,
      state: Mutex::new(ReservationState {
        current: DocumentNumber::placeholder(document_type),
        last_preview: None,
      }),
    }
  }

  fn lock(&self) -> MutexGuard<'_, ReservationState> {
    self
      .state
      .lock()
      .unwrap_or_else(|poisoned| poisoned.into_inner())
  }

  pub fn document_type(&self) -> DocumentType {
    self.document_type
  }

  /// Number currently on display
  pub fn current(&self) -> DocumentNumber {
    self.lock().current.clone()
  }

  pub fn is_reserved(&self) -> bool {
    self.lock().current.is_reserved()
  }

  /// Show the number of an already issued document; the preview stays as the fallback
  pub fn adopt(&self, value: impl Into<String>) -> Result<DocumentNumber, DocumentError> {
    let number = DocumentNumber::preview(value.into())?;
    self.lock().current = number.clone();
    Ok(number)
  }

  /// Fetch the next number without advancing the counter
  pub async fn peek_next(&self) -> Result<DocumentNumber, DocumentError> {
    let value = self.counter.peek(self.document_type).await?;
    let number = DocumentNumber::preview(value)?;

    let mut state = self.lock();
    state.current = number.clone();
    state.last_preview = Some(number.clone());
    Ok(number)
  }

  /// Commit a number right before an export attempt
  pub async fn reserve(&self) -> ReservationOutcome {
    let result = match self.counter.reserve(self.document_type).await {
      Ok(value) => DocumentNumber::reserved(value).map_err(DocumentError::from),
      Err(e) => Err(e),
    };

    let mut state = self.lock();
    match result {
      Ok(number) => {
        tracing::info!("Reserved {} number {}", self.document_type, number);
        state.current = number.clone();
        ReservationOutcome::Reserved(number)
      }
      Err(error) => {
        let fallback = state
          .last_preview
          .clone()
          .unwrap_or_else(|| DocumentNumber::placeholder(self.document_type));
        tracing::warn!(
          "Could not reserve a {} number, falling back to {}: {}",
          self.document_type,
          fallback,
          error
        );
        state.current = fallback.clone();
        ReservationOutcome::Degraded { fallback, error }
      }
    }
  }

  /// Back to unreserved after an export attempt, then show the next preview
  pub async fn release(&self) {
    {
      let mut state = self.lock();
      state.current = state.current.released();
    }

    if let Err(e) = self.peek_next().await {
      tracing::warn!(
        "Could not refresh the next {} number: {}",
        self.document_type,
        e
      );
    }
  }

  pub async fn counts(&self) -> Result<BTreeMap<DocumentType, u64>, DocumentError> {
    self.counter.counts().await
  }
}
