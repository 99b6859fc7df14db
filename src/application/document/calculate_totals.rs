use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;

use super::draft::DocumentDraftDto;
use crate::domain::document::{DocumentError, DocumentType, SessionFactory, TotalsSource};
use crate::domain::formatting::round_money;

#[derive(Debug, Deserialize)]
pub struct CalculateTotalsCommand {
  pub draft: DocumentDraftDto,
  /// Ask the backend for authoritative totals
  #[serde(default)]
  pub remote: bool,
}

#[derive(Debug, Serialize)]
pub struct LevyAmountDto {
  pub name: String,
  pub amount: Decimal,
}

#[derive(Debug, Serialize)]
pub struct CalculateTotalsResponse {
  pub subtotal: Decimal,
  pub levies: Vec<LevyAmountDto>,
  pub grand_total: Decimal,
  pub source: String,
  /// Set when the backend could not be reached and local totals are shown
  pub warning: Option<String>,
}

pub struct CalculateTotalsUseCase {
  sessions: Arc<SessionFactory>,
}

impl CalculateTotalsUseCase {
  pub fn new(sessions: Arc<SessionFactory>) -> Self {
    Self { sessions }
  }

  pub async fn execute(
    &self,
    command: CalculateTotalsCommand,
  ) -> Result<CalculateTotalsResponse, DocumentError> {
    let document_type = DocumentType::from_str(&command.draft.document_type)?;
    let session = self.sessions.open(document_type);
    command.draft.apply(&session)?;

    let mut warning = None;
    if command.remote && document_type.applies_levies() {
      if let Err(e) = session.reconcile_now().await {
        tracing::warn!("Showing local totals: {}", e);
        warning = Some(e.to_string());
      }
    }

    let view = session.totals();
    Ok(CalculateTotalsResponse {
      subtotal: round_money(view.totals.subtotal),
      levies: view
        .totals
        .levies
        .iter()
        .map(|levy| LevyAmountDto {
          name: levy.name.clone(),
          amount: round_money(levy.amount),
        })
        .collect(),
      grand_total: round_money(view.totals.grand_total),
      source: match view.source {
        TotalsSource::Local => "local".to_string(),
        TotalsSource::Remote { .. } => "remote".to_string(),
      },
      warning,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::application::document::draft::DraftLineItemDto;
  use crate::domain::document::testing::{MockRenderer, TestHarness, UnreachableCalculator};
  use rust_decimal_macros::dec;

  fn invoice_draft() -> DocumentDraftDto {
    DocumentDraftDto {
      document_type: "invoice".to_string(),
      fields: [("customer_name".to_string(), "Ama Mensah".to_string())].into(),
      items: vec![
        DraftLineItemDto {
          description: "Cement".to_string(),
          quantity: "2".to_string(),
          unit_price: "10".to_string(),
        },
        DraftLineItemDto {
          description: "Nails".to_string(),
          quantity: "1".to_string(),
          unit_price: "5".to_string(),
        },
      ],
    }
  }

  #[tokio::test]
  async fn test_remote_totals_replace_local_ones() {
    let harness = TestHarness::new(MockRenderer::default());
    let use_case = CalculateTotalsUseCase::new(Arc::new(harness.factory()));

    let response = use_case
      .execute(CalculateTotalsCommand {
        draft: invoice_draft(),
        remote: true,
      })
      .await
      .unwrap();

    assert_eq!(response.source, "remote");
    assert_eq!(response.subtotal, dec!(25));
    assert_eq!(response.grand_total, dec!(26.50));
    assert!(response.warning.is_none());
  }

  #[tokio::test]
  async fn test_unreachable_backend_falls_back_to_local_totals() {
    let harness = TestHarness::new(MockRenderer::default());
    let sessions = harness.factory_with(|_| Arc::new(UnreachableCalculator));
    let use_case = CalculateTotalsUseCase::new(Arc::new(sessions));

    let response = use_case
      .execute(CalculateTotalsCommand {
        draft: invoice_draft(),
        remote: true,
      })
      .await
      .unwrap();

    assert_eq!(response.source, "local");
    assert_eq!(response.subtotal, dec!(25));
    assert_eq!(response.levies.len(), 3);
    assert_eq!(response.levies[0].amount, dec!(0.63));
    assert_eq!(response.grand_total, dec!(26.50));
    let warning = response.warning.unwrap();
    assert!(warning.contains("connection refused"), "{}", warning);
  }

  #[tokio::test]
  async fn test_local_only_never_warns() {
    let harness = TestHarness::new(MockRenderer::default());
    let sessions = harness.factory_with(|_| Arc::new(UnreachableCalculator));
    let use_case = CalculateTotalsUseCase::new(Arc::new(sessions));

    let response = use_case
      .execute(CalculateTotalsCommand {
        draft: invoice_draft(),
        remote: false,
      })
      .await
      .unwrap();

    assert_eq!(response.source, "local");
    assert!(response.warning.is_none());
  }
}
