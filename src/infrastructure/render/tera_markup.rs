use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::sync::Arc;
use tera::{Context, Tera};

use crate::domain::document::{Asset, DocumentError, DocumentType, MarkupRenderer, Snapshot};

const TEMPLATES: [(&str, &str); 4] = [
  (
    "documents/base.html.tera",
    include_str!("../../../templates/documents/base.html.tera"),
  ),
  (
    "documents/invoice.html.tera",
    include_str!("../../../templates/documents/invoice.html.tera"),
  ),
  (
    "documents/receipt.html.tera",
    include_str!("../../../templates/documents/receipt.html.tera"),
  ),
  (
    "documents/waybill.html.tera",
    include_str!("../../../templates/documents/waybill.html.tera"),
  ),
];

/// Embed an image as a `data:` URI
pub fn data_uri(asset: &Asset) -> String {
  format!(
    "data:{};base64,{}",
    asset.content_type,
    STANDARD.encode(&asset.bytes)
  )
}

/// Renders snapshots into the HTML fragment the render endpoint expects
#[derive(Clone)]
pub struct TeraMarkupRenderer {
  tera: Arc<Tera>,
}

impl TeraMarkupRenderer {
  /// Templates compiled into the binary
  pub fn new() -> Result<Self, tera::Error> {
    let mut tera = Tera::default();
    tera.add_raw_templates(TEMPLATES)?;
    tera.autoescape_on(vec!["html.tera", ".html"]);

    Ok(Self {
      tera: Arc::new(tera),
    })
  }

  fn template_name(document_type: DocumentType) -> String {
    format!("documents/{}.html.tera", document_type.as_str())
  }
}

impl MarkupRenderer for TeraMarkupRenderer {
  fn render(&self, snapshot: &Snapshot, logo: Option<&Asset>) -> Result<String, DocumentError> {
    let mut context = Context::from_serialize(snapshot)
      .map_err(|e| DocumentError::RenderFailure(format!("Invalid snapshot: {}", e)))?;
    let (width, height) = snapshot.page.dimensions_mm();
    context.insert("page_width_mm", &width);
    context.insert("page_height_mm", &height);
    context.insert("logo_uri", &logo.map(data_uri));

    self
      .tera
      .render(&Self::template_name(snapshot.document_type), &context)
      .map_err(|e| {
        tracing::error!("Template rendering failed: {:?}", e);
        DocumentError::RenderFailure(format!("Template error: {}", e))
      })
  }
}
