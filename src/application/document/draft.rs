use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::document::{DocumentError, DocumentSession, LineItemField, MAX_LINE_ITEMS};

/// One line item as typed by the user; numbers stay strings until parsed
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DraftLineItemDto {
  #[serde(default)]
  pub description: String,
  #[serde(default, deserialize_with = "lenient_string")]
  pub quantity: String,
  #[serde(default, deserialize_with = "lenient_string")]
  pub unit_price: String,
}

/// A whole document as described in a JSON file or request body
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DocumentDraftDto {
  pub document_type: String,
  #[serde(default)]
  pub fields: BTreeMap<String, String>,
  #[serde(default)]
  pub items: Vec<DraftLineItemDto>,
}

// Accepts `2`, `2.5` or `"2.5"` for numeric inputs
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
  D: serde::Deserializer<'de>,
{
  let value = serde_json::Value::deserialize(deserializer)?;
  Ok(match value {
    serde_json::Value::String(s) => s,
    serde_json::Value::Null => String::new(),
    other => other.to_string(),
  })
}

impl DocumentDraftDto {
  /// Replay the draft into a fresh session through the regular edit operations
  pub fn apply(&self, session: &DocumentSession) -> Result<(), DocumentError> {
    for (key, value) in &self.fields {
      session.set_field(key, value)?;
    }

    if self.items.len() > MAX_LINE_ITEMS {
      return Err(DocumentError::CapacityExceeded {
        limit: MAX_LINE_ITEMS,
      });
    }

    for (index, item) in self.items.iter().enumerate() {
      if index >= session.items().len() {
        session.add_item()?;
      }
      session.update_item(index, LineItemField::Description, &item.description);
      session.update_item(index, LineItemField::Quantity, &item.quantity);
      session.update_item(index, LineItemField::UnitPrice, &item.unit_price);
    }
    Ok(())
  }
}
