use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::BTreeMap;

use super::client::{ApiClient, network};
use crate::domain::document::{
  CalculationRequest, DocumentError, LevyAmount, Totals, TotalsCalculator,
};

/// Totals as returned by `/api/invoices/calculate/`
#[derive(Debug, Deserialize)]
struct TotalsBody {
  subtotal: Decimal,
  #[serde(default)]
  levies: BTreeMap<String, Decimal>,
  grand_total: Decimal,
}

/// Authoritative invoice totals from the backend
pub struct HttpTotalsCalculator {
  api: ApiClient,
  // Display order of levy names; the wire map is unordered
  levy_order: Vec<String>,
}

impl HttpTotalsCalculator {
  pub fn new(api: ApiClient, levy_order: Vec<String>) -> Self {
    Self { api, levy_order }
  }

  fn into_totals(&self, body: TotalsBody) -> Totals {
    let mut remaining = body.levies;
    let mut levies: Vec<LevyAmount> = self
      .levy_order
      .iter()
      .filter_map(|name| {
        let key = remaining
          .keys()
          .find(|k| k.eq_ignore_ascii_case(name))
          .cloned()?;
        remaining.remove(&key).map(|amount| LevyAmount { name: key, amount })
      })
      .collect();
    levies.extend(
      remaining
        .into_iter()
        .map(|(name, amount)| LevyAmount { name, amount }),
    );

    Totals {
      subtotal: body.subtotal,
      levies,
      grand_total: body.grand_total,
    }
  }
}

#[async_trait]
impl TotalsCalculator for HttpTotalsCalculator {
  async fn calculate(&self, request: CalculationRequest) -> Result<Totals, DocumentError> {
    // The endpoint expects the item list as a JSON string
    let items_payload = serde_json::to_string(&request.items)
      .map_err(|e| DocumentError::Internal(format!("Failed to encode items: {}", e)))?;

    let response = self
      .api
      .http()
      .post(self.api.url("/api/invoices/calculate/"))
      .json(&serde_json::json!({ "items_payload": items_payload }))
      .send()
      .await
      .map_err(network)?;

    let body: TotalsBody = ApiClient::json(response).await?;
    Ok(self.into_totals(body))
  }
}
