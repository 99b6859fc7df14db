//! Command line definitions for the `billdesk` binary.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::domain::document::{DocumentType, ExportFormat};

#[derive(Debug, Parser)]
#[command(
  name = "billdesk",
  version,
  about = "Invoice, receipt and waybill generator",
  long_about = "Build invoices, receipts and waybills from JSON drafts.\n\n\
                Numbers, authoritative totals, persistence and rendering come from the\n\
                billing backend configured under [api] in config/default.toml."
)]
pub struct Cli {
  #[command(subcommand)]
  pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
  /// Compute totals for a draft
  Totals {
    /// JSON draft: {"document_type", "fields", "items"}
    #[arg(value_name = "DRAFT")]
    draft: PathBuf,

    /// Wait for the backend's authoritative totals
    #[arg(long)]
    remote: bool,
  },

  /// Print the preview snapshot of a draft
  Preview {
    #[arg(value_name = "DRAFT")]
    draft: PathBuf,
  },

  /// Show the next number without reserving it
  Next {
    #[arg(value_enum)]
    document_type: DocumentTypeArg,
  },

  /// Number of documents issued per type
  Counts,

  /// Reserve a number and render the draft
  Export {
    #[arg(value_name = "DRAFT")]
    draft: PathBuf,

    #[arg(long, value_enum, default_value = "pdf")]
    format: ExportFormatArg,
  },

  /// Create or update the backend record for a draft
  Save {
    #[arg(value_name = "DRAFT")]
    draft: PathBuf,

    /// Update this record instead of creating a new one
    #[arg(long = "record-id")]
    record_id: Option<i64>,
  },

  /// Load a saved document and print its preview
  Open {
    #[arg(value_enum)]
    document_type: DocumentTypeArg,

    record_id: i64,
  },

  /// List recently touched documents
  Recents {
    /// recent, name or type
    #[arg(long, default_value = "recent")]
    sort: String,
  },

  /// Remove an entry from the recent list
  Forget {
    /// Path or name of the entry
    #[arg(required_unless_present = "clear", conflicts_with = "clear")]
    key: Option<String>,

    /// Remove every entry
    #[arg(long)]
    clear: bool,
  },

  /// Download a .billproj backup of everything on the backend
  ProjectExport,

  /// Restore a .billproj backup
  ProjectImport {
    #[arg(value_name = "ARCHIVE")]
    path: PathBuf,
  },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DocumentTypeArg {
  Invoice,
  Receipt,
  Waybill,
}

impl From<DocumentTypeArg> for DocumentType {
  fn from(arg: DocumentTypeArg) -> Self {
    match arg {
      DocumentTypeArg::Invoice => DocumentType::Invoice,
      DocumentTypeArg::Receipt => DocumentType::Receipt,
      DocumentTypeArg::Waybill => DocumentType::Waybill,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormatArg {
  Pdf,
  Jpeg,
}

impl From<ExportFormatArg> for ExportFormat {
  fn from(arg: ExportFormatArg) -> Self {
    match arg {
      ExportFormatArg::Pdf => ExportFormat::Pdf,
      ExportFormatArg::Jpeg => ExportFormat::Jpeg,
    }
  }
}
