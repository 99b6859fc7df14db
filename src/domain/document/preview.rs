use chrono::NaiveDate;
use serde::Serialize;

use super::entities::{LineItem, Totals};
use super::form::{DocumentForm, Fallback};
use super::value_objects::{DocumentNumber, DocumentType, PageSpec};
use crate::domain::formatting::{format_currency, format_number, format_quantity};

/// Shown for any empty field without a more specific default
pub const PLACEHOLDER: &str = "—";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
  #[default]
  Edit,
  Preview,
}

impl ViewMode {
  pub fn flipped(self) -> Self {
    match self {
      ViewMode::Edit => ViewMode::Preview,
      ViewMode::Preview => ViewMode::Edit,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnapshotField {
  pub key: String,
  pub label: String,
  pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnapshotLine {
  pub position: usize,
  pub description: String,
  pub quantity: String,
  pub unit_price: String,
  pub total: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnapshotLevy {
  pub name: String,
  pub amount: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnapshotTotals {
  pub subtotal: String,
  pub levies: Vec<SnapshotLevy>,
  pub grand_total: String,
}

/// Display-ready copy of the document, every value already formatted
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
  pub document_type: DocumentType,
  pub title: String,
  pub document_number: String,
  pub fields: Vec<SnapshotField>,
  pub items: Vec<SnapshotLine>,
  pub totals: SnapshotTotals,
  pub page: PageSpec,
}

impl Snapshot {
  pub fn field(&self, key: &str) -> Option<&str> {
    self
      .fields
      .iter()
      .find(|f| f.key == key)
      .map(|f| f.value.as_str())
  }
}

/// Mirrors form state into snapshots and tracks which view is showing
#[derive(Debug, Clone)]
pub struct PreviewSynchronizer {
  mode: ViewMode,
  currency_symbol: String,
  latest: Option<Snapshot>,
}

impl PreviewSynchronizer {
  pub fn new(currency_symbol: impl Into<String>) -> Self {
    Self {
      mode: ViewMode::Edit,
      currency_symbol: currency_symbol.into(),
      latest: None,
    }
  }

  pub fn mode(&self) -> ViewMode {
    self.mode
  }

  pub fn latest(&self) -> Option<&Snapshot> {
    self.latest.as_ref()
  }

  /// Build a fresh snapshot and keep it as the live preview
  pub fn sync(
    &mut self,
    form: &DocumentForm,
    items: &[LineItem],
    totals: &Totals,
    number: &DocumentNumber,
    today: NaiveDate,
  ) -> Snapshot {
    let snapshot = build_snapshot(form, items, totals, number, today, &self.currency_symbol);
    self.latest = Some(snapshot.clone());
    snapshot
  }

  /// Switch views. Showing the current view is a no-op and returns false.
  pub fn show(&mut self, mode: ViewMode) -> bool {
    if self.mode == mode {
      return false;
    }
    self.mode = mode;
    true
  }

  pub fn toggle(&mut self) -> ViewMode {
    self.mode = self.mode.flipped();
    self.mode
  }
}

fn fallback_value(fallback: Fallback, today: NaiveDate) -> String {
  match fallback {
    Fallback::Dash => PLACEHOLDER.to_string(),
    Fallback::Today => today.format("%Y-%m-%d").to_string(),
    Fallback::Text(text) => text.to_string(),
  }
}

pub fn build_snapshot(
  form: &DocumentForm,
  items: &[LineItem],
  totals: &Totals,
  number: &DocumentNumber,
  today: NaiveDate,
  currency_symbol: &str,
) -> Snapshot {
  let document_type = form.document_type();

  let fields = form
    .specs()
    .iter()
    .map(|spec| {
      let raw = form.get(spec.key).unwrap_or_default().trim();
      let value = if raw.is_empty() {
        fallback_value(spec.fallback, today)
      } else {
        raw.to_string()
      };
      SnapshotField {
        key: spec.key.to_string(),
        label: spec.label.to_string(),
        value,
      }
    })
    .collect();

  let items = items
    .iter()
    .enumerate()
    .map(|(index, item)| {
      let description = item.description.trim();
      SnapshotLine {
        position: index + 1,
        description: if description.is_empty() {
          format!("Item {}", index + 1)
        } else {
          description.to_string()
        },
        quantity: format_quantity(item.quantity()),
        unit_price: format_number(item.unit_price()),
        total: format_number(item.total()),
      }
    })
    .collect();

  let totals = SnapshotTotals {
    subtotal: format_currency(totals.subtotal, currency_symbol),
    levies: totals
      .levies
      .iter()
      .map(|levy| SnapshotLevy {
        name: levy.name.clone(),
        amount: format_currency(levy.amount, currency_symbol),
      })
      .collect(),
    grand_total: format_currency(totals.grand_total, currency_symbol),
  };

  Snapshot {
    document_type,
    title: document_type.title().to_string(),
    document_number: number.value().to_string(),
    fields,
    items,
    totals,
    page: document_type.page(),
  }
}
