use serde_json::Value;

use super::entities::LineItem;
use super::errors::DocumentError;
use super::value_objects::LineItemField;
use crate::domain::formatting::parse_amount;

/// Maximum number of live line items on one document
pub const MAX_LINE_ITEMS: usize = 10;

/// Ordered, capped list of line items for a single document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineItemStore {
  items: Vec<LineItem>,
}

impl LineItemStore {
  pub fn new() -> Self {
    Self { items: Vec::new() }
  }

  /// Start with one blank row, the way a fresh document opens
  pub fn seeded() -> Self {
    Self {
      items: vec![LineItem::blank()],
    }
  }

  /// Build from existing items, dropping anything past the cap
  pub fn from_items(items: Vec<LineItem>) -> Self {
    let mut items = items;
    if items.len() > MAX_LINE_ITEMS {
      tracing::warn!(
        "Dropping {} line items beyond the limit of {}",
        items.len() - MAX_LINE_ITEMS,
        MAX_LINE_ITEMS
      );
      items.truncate(MAX_LINE_ITEMS);
    }
    Self { items }
  }

  pub fn add(&mut self) -> Result<usize, DocumentError> {
    if self.items.len() >= MAX_LINE_ITEMS {
      return Err(DocumentError::CapacityExceeded {
        limit: MAX_LINE_ITEMS,
      });
    }
    self.items.push(LineItem::blank());
    Ok(self.items.len() - 1)
  }

  /// Returns false when the index does not address an item
  pub fn update(&mut self, index: usize, field: LineItemField, value: &str) -> bool {
    let Some(item) = self.items.get_mut(index) else {
      tracing::debug!("Ignoring update for missing line item {}", index);
      return false;
    };

    match field {
      LineItemField::Description => item.description = value.to_string(),
      LineItemField::Quantity => item.set_quantity(parse_amount(value)),
      LineItemField::UnitPrice => item.set_unit_price(parse_amount(value)),
    }
    true
  }

  pub fn remove(&mut self, index: usize) -> Option<LineItem> {
    if index < self.items.len() {
      Some(self.items.remove(index))
    } else {
      None
    }
  }

  /// Put a blank row back after the last one was removed
  pub fn ensure_seeded(&mut self) {
    if self.items.is_empty() {
      self.items.push(LineItem::blank());
    }
  }

  pub fn items(&self) -> &[LineItem] {
    &self.items
  }

  pub fn len(&self) -> usize {
    self.items.len()
  }

  pub fn is_empty(&self) -> bool {
    self.items.is_empty()
  }

  pub fn is_full(&self) -> bool {
    self.items.len() >= MAX_LINE_ITEMS
  }

  /// Items in the shape the backend stores, skipping untouched blank rows
  pub fn to_payload(&self) -> Value {
    Value::Array(
      self
        .items
        .iter()
        .filter(|item| !item.is_blank())
        .map(|item| {
          serde_json::json!({
            "description": item.description,
            "quantity": item.quantity(),
            "unit_price": item.unit_price(),
            "total": item.total(),
          })
        })
        .collect(),
    )
  }
}
