use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;
use validator::{Validate, ValidationError};

use super::errors::DocumentError;
use super::value_objects::DocumentType;

/// What a preview shows when a field is left empty
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
  Dash,
  Today,
  Text(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
  pub key: &'static str,
  pub label: &'static str,
  pub fallback: Fallback,
}

const fn field(key: &'static str, label: &'static str, fallback: Fallback) -> FieldSpec {
  FieldSpec {
    key,
    label,
    fallback,
  }
}

fn validate_required(value: &str) -> Result<(), ValidationError> {
  if value.trim().is_empty() {
    return Err(
      ValidationError::new("required").with_message(Cow::Borrowed("This field is required")),
    );
  }
  Ok(())
}

fn validate_issue_date(value: &str) -> Result<(), ValidationError> {
  let trimmed = value.trim();
  if trimmed.is_empty() || NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").is_ok() {
    return Ok(());
  }
  Err(
    ValidationError::new("date")
      .with_message(Cow::Borrowed("Issue date must be formatted as YYYY-MM-DD")),
  )
}

/// Field access shared by the three document forms
trait FormFields {
  const SPECS: &'static [FieldSpec];

  fn slot(&mut self, key: &str) -> Option<&mut String>;
  fn value(&self, key: &str) -> Option<&str>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct InvoiceForm {
  #[validate(
    custom(function = "validate_required"),
    length(max = 255, message = "Customer name cannot exceed 255 characters")
  )]
  pub customer_name: String,
  #[validate(custom(function = "validate_issue_date"))]
  pub issue_date: String,
  #[validate(length(max = 255, message = "Classification cannot exceed 255 characters"))]
  pub classification: String,
  pub notes: String,
}

impl FormFields for InvoiceForm {
  const SPECS: &'static [FieldSpec] = &[
    field("customer_name", "Billed to", Fallback::Dash),
    field("issue_date", "Date", Fallback::Today),
    field("classification", "Classification", Fallback::Text("General")),
    field("notes", "Notes", Fallback::Dash),
  ];

  fn slot(&mut self, key: &str) -> Option<&mut String> {
    match key {
      "customer_name" => Some(&mut self.customer_name),
      "issue_date" => Some(&mut self.issue_date),
      "classification" => Some(&mut self.classification),
      "notes" => Some(&mut self.notes),
      _ => None,
    }
  }

  fn value(&self, key: &str) -> Option<&str> {
    match key {
      "customer_name" => Some(&self.customer_name),
      "issue_date" => Some(&self.issue_date),
      "classification" => Some(&self.classification),
      "notes" => Some(&self.notes),
      _ => None,
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ReceiptForm {
  #[validate(
    custom(function = "validate_required"),
    length(max = 255, message = "Received from cannot exceed 255 characters")
  )]
  pub received_from: String,
  #[validate(custom(function = "validate_issue_date"))]
  pub issue_date: String,
  #[validate(length(max = 128, message = "Payment method cannot exceed 128 characters"))]
  pub payment_method: String,
  #[validate(length(max = 255, message = "Approved by cannot exceed 255 characters"))]
  pub approved_by: String,
  pub description: String,
}

impl FormFields for ReceiptForm {
  const SPECS: &'static [FieldSpec] = &[
    field("received_from", "Received from", Fallback::Dash),
    field("issue_date", "Date", Fallback::Today),
    field("payment_method", "Payment method", Fallback::Text("Cash")),
    field("approved_by", "Approved by", Fallback::Dash),
    field("description", "Being payment for", Fallback::Dash),
  ];

  fn slot(&mut self, key: &str) -> Option<&mut String> {
    match key {
      "received_from" => Some(&mut self.received_from),
      "issue_date" => Some(&mut self.issue_date),
      "payment_method" => Some(&mut self.payment_method),
      "approved_by" => Some(&mut self.approved_by),
      "description" => Some(&mut self.description),
      _ => None,
    }
  }

  fn value(&self, key: &str) -> Option<&str> {
    match key {
      "received_from" => Some(&self.received_from),
      "issue_date" => Some(&self.issue_date),
      "payment_method" => Some(&self.payment_method),
      "approved_by" => Some(&self.approved_by),
      "description" => Some(&self.description),
      _ => None,
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct WaybillForm {
  #[validate(
    custom(function = "validate_required"),
    length(max = 255, message = "Customer name cannot exceed 255 characters")
  )]
  pub customer_name: String,
  #[validate(custom(function = "validate_issue_date"))]
  pub issue_date: String,
  #[validate(
    custom(function = "validate_required"),
    length(max = 255, message = "Destination cannot exceed 255 characters")
  )]
  pub destination: String,
  #[validate(length(max = 255, message = "Driver name cannot exceed 255 characters"))]
  pub driver_name: String,
  #[validate(length(max = 255, message = "Receiver name cannot exceed 255 characters"))]
  pub receiver_name: String,
}

impl FormFields for WaybillForm {
  const SPECS: &'static [FieldSpec] = &[
    field("customer_name", "Customer", Fallback::Dash),
    field("issue_date", "Date", Fallback::Today),
    field("destination", "Destination", Fallback::Dash),
    field("driver_name", "Driver", Fallback::Dash),
    field("receiver_name", "Received by", Fallback::Dash),
  ];

  fn slot(&mut self, key: &str) -> Option<&mut String> {
    match key {
      "customer_name" => Some(&mut self.customer_name),
      "issue_date" => Some(&mut self.issue_date),
      "destination" => Some(&mut self.destination),
      "driver_name" => Some(&mut self.driver_name),
      "receiver_name" => Some(&mut self.receiver_name),
      _ => None,
    }
  }

  fn value(&self, key: &str) -> Option<&str> {
    match key {
      "customer_name" => Some(&self.customer_name),
      "issue_date" => Some(&self.issue_date),
      "destination" => Some(&self.destination),
      "driver_name" => Some(&self.driver_name),
      "receiver_name" => Some(&self.receiver_name),
      _ => None,
    }
  }
}

/// Editable header fields of one document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "document_type", rename_all = "lowercase")]
pub enum DocumentForm {
  Invoice(InvoiceForm),
  Receipt(ReceiptForm),
  Waybill(WaybillForm),
}

impl DocumentForm {
  pub fn new(document_type: DocumentType) -> Self {
    match document_type {
      DocumentType::Invoice => DocumentForm::Invoice(InvoiceForm::default()),
      DocumentType::Receipt => DocumentForm::Receipt(ReceiptForm::default()),
      DocumentType::Waybill => DocumentForm::Waybill(WaybillForm::default()),
    }
  }

  pub fn document_type(&self) -> DocumentType {
    match self {
      DocumentForm::Invoice(_) => DocumentType::Invoice,
      DocumentForm::Receipt(_) => DocumentType::Receipt,
      DocumentForm::Waybill(_) => DocumentType::Waybill,
    }
  }

  pub fn specs(&self) -> &'static [FieldSpec] {
    match self {
      DocumentForm::Invoice(_) => InvoiceForm::SPECS,
      DocumentForm::Receipt(_) => ReceiptForm::SPECS,
      DocumentForm::Waybill(_) => WaybillForm::SPECS,
    }
  }

  pub fn get(&self, key: &str) -> Option<&str> {
    match self {
      DocumentForm::Invoice(form) => form.value(key),
      DocumentForm::Receipt(form) => form.value(key),
      DocumentForm::Waybill(form) => form.value(key),
    }
  }

  pub fn set(&mut self, key: &str, value: impl Into<String>) -> Result<(), DocumentError> {
    let document_type = self.document_type();
    let slot = match self {
      DocumentForm::Invoice(form) => form.slot(key),
      DocumentForm::Receipt(form) => form.slot(key),
      DocumentForm::Waybill(form) => form.slot(key),
    };

    match slot {
      Some(slot) => {
        *slot = value.into();
        Ok(())
      }
      None => Err(DocumentError::validation(
        key,
        format!("Unknown field for {}", document_type.title().to_lowercase()),
      )),
    }
  }

  pub fn validate(&self) -> Result<(), DocumentError> {
    match self {
      DocumentForm::Invoice(form) => form.validate()?,
      DocumentForm::Receipt(form) => form.validate()?,
      DocumentForm::Waybill(form) => form.validate()?,
    }
    Ok(())
  }

  /// Trimmed, non-empty values keyed by field name
  pub fn values(&self) -> BTreeMap<String, String> {
    self
      .specs()
      .iter()
      .filter_map(|spec| {
        let value = self.get(spec.key)?.trim();
        (!value.is_empty()).then(|| (spec.key.to_string(), value.to_string()))
      })
      .collect()
  }

  /// Name shown in the recent documents list
  pub fn display_name(&self) -> Option<&str> {
    let key = match self {
      DocumentForm::Invoice(_) | DocumentForm::Waybill(_) => "customer_name",
      DocumentForm::Receipt(_) => "received_from",
    };
    self.get(key).map(str::trim).filter(|v| !v.is_empty())
  }
}
