use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValueObjectError {
  #[error("Invalid document type: {0}")]
  InvalidDocumentType(String),
  #[error("Invalid export format: {0}")]
  InvalidExportFormat(String),
  #[error("Invalid levy: {0}")]
  InvalidLevy(String),
  #[error("Invalid line item field: {0}")]
  InvalidLineItemField(String),
  #[error("Invalid document number: {0}")]
  InvalidDocumentNumber(String),
}

// Document Type
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
  Invoice,
  Receipt,
  Waybill,
}

impl DocumentType {
  pub const ALL: [DocumentType; 3] = [
    DocumentType::Invoice,
    DocumentType::Receipt,
    DocumentType::Waybill,
  ];

  /// Slug used by the counter and render endpoints
  pub fn as_str(&self) -> &'static str {
    match self {
      DocumentType::Invoice => "invoice",
      DocumentType::Receipt => "receipt",
      DocumentType::Waybill => "waybill",
    }
  }

  /// Collection segment used by the CRUD endpoints
  pub fn plural(&self) -> &'static str {
    match self {
      DocumentType::Invoice => "invoices",
      DocumentType::Receipt => "receipts",
      DocumentType::Waybill => "waybills",
    }
  }

  pub fn prefix(&self) -> &'static str {
    match self {
      DocumentType::Invoice => "INV",
      DocumentType::Receipt => "REC",
      DocumentType::Waybill => "WAY",
    }
  }

  pub fn title(&self) -> &'static str {
    match self {
      DocumentType::Invoice => "Invoice",
      DocumentType::Receipt => "Receipt",
      DocumentType::Waybill => "Waybill",
    }
  }

  /// Levies and server-side reconciliation only apply to invoices
  pub fn applies_levies(&self) -> bool {
    matches!(self, DocumentType::Invoice)
  }

  pub fn page(&self) -> PageSpec {
    match self {
      DocumentType::Invoice => PageSpec::new(PageSize::A4, Orientation::Portrait),
      DocumentType::Receipt => PageSpec::new(PageSize::A5, Orientation::Landscape),
      DocumentType::Waybill => PageSpec::new(PageSize::A4, Orientation::Portrait),
    }
  }
}

impl FromStr for DocumentType {
  type Err = ValueObjectError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_lowercase().as_str() {
      "invoice" | "invoices" => Ok(DocumentType::Invoice),
      "receipt" | "receipts" => Ok(DocumentType::Receipt),
      "waybill" | "waybills" => Ok(DocumentType::Waybill),
      _ => Err(ValueObjectError::InvalidDocumentType(format!(
        "Unknown document type: {}",
        s
      ))),
    }
  }
}

impl fmt::Display for DocumentType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

// Export Format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
  Pdf,
  Jpeg,
}

impl ExportFormat {
  pub fn as_str(&self) -> &'static str {
    match self {
      ExportFormat::Pdf => "pdf",
      ExportFormat::Jpeg => "jpeg",
    }
  }

  pub fn extension(&self) -> &'static str {
    match self {
      ExportFormat::Pdf => "pdf",
      ExportFormat::Jpeg => "jpg",
    }
  }

  pub fn content_type(&self) -> &'static str {
    match self {
      ExportFormat::Pdf => "application/pdf",
      ExportFormat::Jpeg => "image/jpeg",
    }
  }
}

impl FromStr for ExportFormat {
  type Err = ValueObjectError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_lowercase().as_str() {
      "pdf" => Ok(ExportFormat::Pdf),
      "jpg" | "jpeg" => Ok(ExportFormat::Jpeg),
      _ => Err(ValueObjectError::InvalidExportFormat(format!(
        "Unsupported format: {}",
        s
      ))),
    }
  }
}

// Page geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageSize {
  A4,
  A5,
}

impl PageSize {
  /// Portrait width and height in millimetres
  pub fn dimensions_mm(&self) -> (u32, u32) {
    match self {
      PageSize::A4 => (210, 297),
      PageSize::A5 => (148, 210),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
  Portrait,
  Landscape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSpec {
  pub size: PageSize,
  pub orientation: Orientation,
}

impl PageSpec {
  pub fn new(size: PageSize, orientation: Orientation) -> Self {
    Self { size, orientation }
  }

  /// Width and height in millimetres after applying the orientation
  pub fn dimensions_mm(&self) -> (u32, u32) {
    let (w, h) = self.size.dimensions_mm();
    match self.orientation {
      Orientation::Portrait => (w, h),
      Orientation::Landscape => (h, w),
    }
  }
}

// Levy - named percentage charge, immutable once loaded
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Levy {
  name: String,
  rate: Decimal,
  stacked: bool,
}

impl Levy {
  pub fn new(name: impl Into<String>, rate: Decimal) -> Result<Self, ValueObjectError> {
    let name = name.into().trim().to_string();
    if name.is_empty() {
      return Err(ValueObjectError::InvalidLevy(
        "Levy name cannot be empty".to_string(),
      ));
    }
    if rate < Decimal::ZERO || rate > Decimal::ONE {
      return Err(ValueObjectError::InvalidLevy(format!(
        "Rate for {} must be between 0 and 1",
        name
      )));
    }
    Ok(Self {
      name,
      rate,
      stacked: false,
    })
  }

  /// A stacked levy is charged on the subtotal plus every non-stacked levy
  pub fn stacked(mut self) -> Self {
    self.stacked = true;
    self
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn rate(&self) -> Decimal {
    self.rate
  }

  pub fn is_stacked(&self) -> bool {
    self.stacked
  }
}

// Document Number - preview (unreserved) or committed (reserved)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentNumber {
  value: String,
  reserved: bool,
}

impl DocumentNumber {
  pub fn preview(value: String) -> Result<Self, ValueObjectError> {
    Ok(Self {
      value: Self::validate(value)?,
      reserved: false,
    })
  }

  pub fn reserved(value: String) -> Result<Self, ValueObjectError> {
    Ok(Self {
      value: Self::validate(value)?,
      reserved: true,
    })
  }

  /// Shown before the first successful peek, e.g. `INV-000`
  pub fn placeholder(document_type: DocumentType) -> Self {
    Self {
      value: format!("{}-{:03}", document_type.prefix(), 0),
      reserved: false,
    }
  }

  fn validate(value: String) -> Result<String, ValueObjectError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
      return Err(ValueObjectError::InvalidDocumentNumber(
        "Document number cannot be empty".to_string(),
      ));
    }
    if trimmed.len() > 32 {
      return Err(ValueObjectError::InvalidDocumentNumber(
        "Document number cannot exceed 32 characters".to_string(),
      ));
    }
    Ok(trimmed.to_string())
  }

  pub fn value(&self) -> &str {
    &self.value
  }

  pub fn is_reserved(&self) -> bool {
    self.reserved
  }

  pub fn released(&self) -> Self {
    Self {
      value: self.value.clone(),
      reserved: false,
    }
  }
}

impl fmt::Display for DocumentNumber {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.value)
  }
}

// Line item field addressed by an update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineItemField {
  Description,
  Quantity,
  UnitPrice,
}

impl FromStr for LineItemField {
  type Err = ValueObjectError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_lowercase().as_str() {
      "description" => Ok(LineItemField::Description),
      "quantity" | "qty" => Ok(LineItemField::Quantity),
      "unit_price" | "price" => Ok(LineItemField::UnitPrice),
      _ => Err(ValueObjectError::InvalidLineItemField(s.to_string())),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use rust_decimal_macros::dec;

  #[test]
  fn test_document_type_parsing_and_labels() {
    assert_eq!(
      DocumentType::from_str("Invoice").unwrap(),
      DocumentType::Invoice
    );
    assert_eq!(
      DocumentType::from_str("waybills").unwrap(),
      DocumentType::Waybill
    );
    assert!(DocumentType::from_str("quote").is_err());
    assert_eq!(DocumentType::Receipt.prefix(), "REC");
    assert_eq!(DocumentType::Receipt.plural(), "receipts");
    assert!(DocumentType::Invoice.applies_levies());
    assert!(!DocumentType::Waybill.applies_levies());
  }

  #[test]
  fn test_page_geometry() {
    assert_eq!(DocumentType::Invoice.page().dimensions_mm(), (210, 297));
    assert_eq!(DocumentType::Receipt.page().dimensions_mm(), (210, 148));
  }

  #[test]
  fn test_export_format() {
    assert_eq!(ExportFormat::from_str("jpg").unwrap(), ExportFormat::Jpeg);
    assert_eq!(ExportFormat::Jpeg.extension(), "jpg");
    assert!(ExportFormat::from_str("png").is_err());
  }

  #[test]
  fn test_levy_bounds() {
    assert!(Levy::new("NHIL", dec!(0.025)).is_ok());
    assert!(Levy::new("ALL", dec!(1)).is_ok());
    assert!(Levy::new("", dec!(0.1)).is_err());
    assert!(Levy::new("BAD", dec!(1.5)).is_err());
    assert!(Levy::new("BAD", dec!(-0.1)).is_err());
    assert!(Levy::new("VAT", dec!(0.15)).unwrap().stacked().is_stacked());
  }

  #[test]
  fn test_document_number() {
    let number = DocumentNumber::preview("INV-004".to_string()).unwrap();
    assert!(!number.is_reserved());
    assert_eq!(number.to_string(), "INV-004");

    let reserved = DocumentNumber::reserved(" INV-004 ".to_string()).unwrap();
    assert!(reserved.is_reserved());
    assert_eq!(reserved.released(), number);

    assert!(DocumentNumber::preview("   ".to_string()).is_err());
    assert_eq!(
      DocumentNumber::placeholder(DocumentType::Waybill).value(),
      "WAY-000"
    );
  }
}
