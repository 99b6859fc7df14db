use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::domain::document::{CounterApi, DocumentError};

#[derive(Debug, Serialize)]
pub struct DocumentCountsResponse {
  pub counts: BTreeMap<String, u64>,
  pub total: u64,
}

pub struct DocumentCountsUseCase {
  counter: Arc<dyn CounterApi>,
}

impl DocumentCountsUseCase {
  pub fn new(counter: Arc<dyn CounterApi>) -> Self {
    Self { counter }
  }

  pub async fn execute(&self) -> Result<DocumentCountsResponse, DocumentError> {
    let counts = self.counter.counts().await?;
    let total = counts.values().sum();

    Ok(DocumentCountsResponse {
      counts: counts
        .into_iter()
        .map(|(document_type, count)| (document_type.as_str().to_string(), count))
        .collect(),
      total,
    })
  }
}
