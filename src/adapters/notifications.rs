use serde::Serialize;
use std::fmt;
use std::time::{Duration, Instant};

use crate::application::document::ExportDocumentResponse;
use crate::domain::document::DocumentError;

/// How long a notification stays visible
pub const NOTIFICATION_TTL: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
  Success,
  Error,
  Info,
}

impl Tone {
  pub fn as_str(&self) -> &'static str {
    match self {
      Tone::Success => "success",
      Tone::Error => "error",
      Tone::Info => "info",
    }
  }
}

/// Transient, auto-dismissing user message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
  pub tone: Tone,
  pub message: String,
  pub ttl: Duration,
  pub raised_at: Instant,
}

impl Notification {
  pub fn new(tone: Tone, message: impl Into<String>) -> Self {
    Self {
      tone,
      message: message.into(),
      ttl: NOTIFICATION_TTL,
      raised_at: Instant::now(),
    }
  }

  pub fn success(message: impl Into<String>) -> Self {
    Self::new(Tone::Success, message)
  }

  pub fn error(message: impl Into<String>) -> Self {
    Self::new(Tone::Error, message)
  }

  pub fn info(message: impl Into<String>) -> Self {
    Self::new(Tone::Info, message)
  }

  pub fn is_expired_at(&self, now: Instant) -> bool {
    now.saturating_duration_since(self.raised_at) >= self.ttl
  }

  /// Map a document failure to what the user should see
  pub fn from_error(error: &DocumentError) -> Self {
    match error {
      DocumentError::ValidationFailure { field, message } => {
        Self::error(format!("Please check {}: {}", field, message))
      }
      DocumentError::CapacityExceeded { limit } => {
        Self::error(format!("Maximum of {} items allowed", limit))
      }
      DocumentError::NetworkFailure(message) => {
        Self::error(format!("Could not reach the billing service: {}", message))
      }
      DocumentError::RenderFailure(message) => {
        Self::error(format!("Export failed: {}", message))
      }
      DocumentError::Busy => Self::info("An export is already in progress"),
      DocumentError::Storage(message) => Self::error(message.clone()),
      DocumentError::Internal(message) => {
        tracing::error!("Internal error: {}", message);
        Self::error("Something went wrong")
      }
    }
  }

  /// A degraded export still succeeded, so it is reported as info
  pub fn from_export(response: &ExportDocumentResponse) -> Self {
    match &response.warning {
      Some(warning) => Self::info(warning.clone()),
      None => Self::success(format!(
        "{} saved to {}",
        response.document_number,
        response.path.display()
      )),
    }
  }
}

impl fmt::Display for Notification {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "[{}] {}", self.tone.as_str(), self.message)
  }
}

/// Visible notifications, oldest first
#[derive(Debug, Default)]
pub struct NotificationCenter {
  active: Vec<Notification>,
}

impl NotificationCenter {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn push(&mut self, notification: Notification) {
    tracing::debug!("Notify {}", notification);
    self.active.push(notification);
  }

  pub fn active(&self) -> &[Notification] {
    &self.active
  }

  /// Drop everything whose ttl has elapsed at `now`; returns how many went away
  pub fn dismiss_expired(&mut self, now: Instant) -> usize {
    let before = self.active.len();
    self.active.retain(|n| !n.is_expired_at(now));
    before - self.active.len()
  }
}
