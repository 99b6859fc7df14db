//! Totals engine: synchronous local computation plus debounced server reconciliation.
//!
//! Every local recomputation issues a new sequence tag under the same lock that
//! stores the local result. A scheduled reconciliation carries the tag it was issued
//! with; it is only sent if that tag is still current after the quiet period, and its
//! answer is only applied if the tag is still current when it arrives.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;

use super::entities::{LineItem, Totals};
use super::errors::DocumentError;
use super::ports::{CalculationRequest, TotalsCalculator};
use super::value_objects::Levy;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Where the displayed totals came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TotalsSource {
  Local,
  Remote { tag: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TotalsView {
  pub totals: Totals,
  pub source: TotalsSource,
}

#[derive(Debug)]
struct EngineState {
  view: TotalsView,
  latest_tag: u64,
}

/// Pure local computation
pub fn compute_local(items: &[LineItem], levies: &[Levy]) -> Totals {
  Totals::calculate(items, levies)
}

pub struct TotalsEngine {
  levies: Arc<[Levy]>,
  calculator: Option<Arc<dyn TotalsCalculator>>,
  debounce: Duration,
  state: Mutex<EngineState>,
}

impl TotalsEngine {
  pub fn new(
    levies: Arc<[Levy]>,
    calculator: Option<Arc<dyn TotalsCalculator>>,
    debounce: Duration,
  ) -> Self {
    let totals = compute_local(&[], &levies);
    Self {
      levies,
      calculator,
      debounce,
      state: Mutex::new(EngineState {
        view: TotalsView {
          totals,
          source: TotalsSource::Local,
        },
        latest_tag: 0,
      }),
    }
  }

  fn lock(&self) -> MutexGuard<'_, EngineState> {
    self
      .state
      .lock()
      .unwrap_or_else(|poisoned| poisoned.into_inner())
  }

  pub fn levies(&self) -> &[Levy] {
    &self.levies
  }

  pub fn current(&self) -> TotalsView {
    self.lock().view.clone()
  }

  pub fn latest_tag(&self) -> u64 {
    self.lock().latest_tag
  }

  /// Recompute locally and supersede every outstanding reconciliation.
  /// Returns the tag a reconciliation of this state must carry.
  pub fn recompute_local(&self, items: &[LineItem]) -> (Totals, u64) {
    let totals = compute_local(items, &self.levies);
    let mut state = self.lock();
    state.latest_tag += 1;
    state.view = TotalsView {
      totals: totals.clone(),
      source: TotalsSource::Local,
    };
    (totals, state.latest_tag)
  }

  /// Apply a server answer if no newer request was issued since `tag`
  pub fn apply_remote(&self, tag: u64, totals: Totals) -> bool {
    let mut state = self.lock();
    if tag != state.latest_tag {
      tracing::debug!(
        "Discarding stale totals for request {} (latest is {})",
        tag,
        state.latest_tag
      );
      return false;
    }
    state.view = TotalsView {
      totals,
      source: TotalsSource::Remote { tag },
    };
    true
  }

  /// Ask the backend for authoritative totals right away.
  /// Returns whether the answer was applied.
  pub async fn compute_remote(
    &self,
    tag: u64,
    request: CalculationRequest,
  ) -> Result<bool, DocumentError> {
    let Some(calculator) = &self.calculator else {
      return Ok(false);
    };
    let totals = calculator.calculate(request).await?;
    Ok(self.apply_remote(tag, totals))
  }

  /// Reconcile after the quiet period unless a newer request supersedes this one.
  /// Failures are logged and leave the last known totals in place.
  pub fn schedule_remote(
    self: &Arc<Self>,
    tag: u64,
    request: CalculationRequest,
  ) -> Option<JoinHandle<()>> {
    self.calculator.as_ref()?;
    let Ok(runtime) = tokio::runtime::Handle::try_current() else {
      tracing::debug!("No runtime available, totals request {} stays local", tag);
      return None;
    };

    let engine = Arc::clone(self);
    Some(runtime.spawn(async move {
      tokio::time::sleep(engine.debounce).await;

      if engine.latest_tag() != tag {
        tracing::debug!("Skipping superseded totals request {}", tag);
        return;
      }

      if let Err(e) = engine.compute_remote(tag, request).await {
        tracing::warn!("Totals reconciliation failed, keeping last known totals: {}", e);
      }
    }))
  }
}

/// In-process calculator applying the stacked levy rule, for offline use
pub struct StackedTaxCalculator {
  levies: Arc<[Levy]>,
}

impl StackedTaxCalculator {
  pub fn new(levies: Arc<[Levy]>) -> Self {
    Self { levies }
  }
}

#[async_trait]
impl TotalsCalculator for StackedTaxCalculator {
  async fn calculate(&self, request: CalculationRequest) -> Result<Totals, DocumentError> {
    let items: Vec<LineItem> = serde_json::from_value(request.items)
      .map_err(|e| DocumentError::Internal(format!("Invalid item payload: {}", e)))?;
    Ok(Totals::calculate_stacked(&items, &self.levies))
  }
}
