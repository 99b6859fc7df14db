use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::value_objects::Levy;

/// Product capped at `Decimal::MAX`; amounts on a document are never negative
fn product(a: Decimal, b: Decimal) -> Decimal {
  a.checked_mul(b).unwrap_or_else(|| {
    tracing::warn!("Amount {} x {} is out of range, capping it", a, b);
    Decimal::MAX
  })
}

fn sum_capped(values: impl IntoIterator<Item = Decimal>) -> Decimal {
  values
    .into_iter()
    .fold(Decimal::ZERO, |acc, value| acc.saturating_add(value))
}

// Line Item - owned by a document's line-item store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawLineItem")]
pub struct LineItem {
  pub description: String,
  quantity: Decimal,
  unit_price: Decimal,
  total: Decimal,
}

impl LineItem {
  pub fn new(description: impl Into<String>, quantity: Decimal, unit_price: Decimal) -> Self {
    let quantity = quantity.max(Decimal::ZERO);
    let unit_price = unit_price.max(Decimal::ZERO);
    Self {
      description: description.into(),
      quantity,
      unit_price,
      total: product(quantity, unit_price),
    }
  }

  pub fn blank() -> Self {
    Self::new(String::new(), Decimal::ZERO, Decimal::ZERO)
  }

  pub fn quantity(&self) -> Decimal {
    self.quantity
  }

  pub fn unit_price(&self) -> Decimal {
    self.unit_price
  }

  pub fn total(&self) -> Decimal {
    self.total
  }

  pub fn set_quantity(&mut self, quantity: Decimal) {
    self.quantity = quantity.max(Decimal::ZERO);
    self.total = product(self.quantity, self.unit_price);
  }

  pub fn set_unit_price(&mut self, unit_price: Decimal) {
    self.unit_price = unit_price.max(Decimal::ZERO);
    self.total = product(self.quantity, self.unit_price);
  }

  pub fn is_blank(&self) -> bool {
    self.description.trim().is_empty() && self.quantity.is_zero() && self.unit_price.is_zero()
  }
}

/// Incoming item as stored by the backend; `total` is always re-derived
#[derive(Deserialize)]
struct RawLineItem {
  #[serde(default)]
  description: String,
  #[serde(default)]
  quantity: Decimal,
  #[serde(default)]
  unit_price: Decimal,
}

impl From<RawLineItem> for LineItem {
  fn from(raw: RawLineItem) -> Self {
    LineItem::new(raw.description, raw.quantity, raw.unit_price)
  }
}

/// A computed levy amount, kept in configuration order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevyAmount {
  pub name: String,
  pub amount: Decimal,
}

// Totals - derived from line items and levies, never persisted on its own
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
  pub subtotal: Decimal,
  pub levies: Vec<LevyAmount>,
  pub grand_total: Decimal,
}

impl Totals {
  pub fn zero() -> Self {
    Self {
      subtotal: Decimal::ZERO,
      levies: Vec::new(),
      grand_total: Decimal::ZERO,
    }
  }

  /// Every levy charged on the plain subtotal
  pub fn calculate(items: &[LineItem], levies: &[Levy]) -> Self {
    let subtotal = sum_capped(items.iter().map(LineItem::total));

    let levies: Vec<LevyAmount> = levies
      .iter()
      .map(|levy| LevyAmount {
        name: levy.name().to_string(),
        amount: product(subtotal, levy.rate()),
      })
      .collect();

    let grand_total = subtotal.saturating_add(sum_capped(levies.iter().map(|l| l.amount)));

    Self {
      subtotal,
      levies,
      grand_total,
    }
  }

  /// Non-stacked levies on the subtotal, stacked levies on subtotal plus the former
  pub fn calculate_stacked(items: &[LineItem], levies: &[Levy]) -> Self {
    let subtotal = sum_capped(items.iter().map(LineItem::total));

    let base_levies = sum_capped(
      levies
        .iter()
        .filter(|levy| !levy.is_stacked())
        .map(|levy| product(subtotal, levy.rate())),
    );
    let stacked_base = subtotal.saturating_add(base_levies);

    let levies: Vec<LevyAmount> = levies
      .iter()
      .map(|levy| {
        let base = if levy.is_stacked() {
          stacked_base
        } else {
          subtotal
        };
        LevyAmount {
          name: levy.name().to_string(),
          amount: product(base, levy.rate()),
        }
      })
      .collect();

    let grand_total = subtotal.saturating_add(sum_capped(levies.iter().map(|l| l.amount)));

    Self {
      subtotal,
      levies,
      grand_total,
    }
  }

  pub fn levy(&self, name: &str) -> Option<Decimal> {
    self
      .levies
      .iter()
      .find(|l| l.name.eq_ignore_ascii_case(name))
      .map(|l| l.amount)
  }

  pub fn levy_total(&self) -> Decimal {
    sum_capped(self.levies.iter().map(|l| l.amount))
  }
}
