use std::sync::Arc;
use tokio::sync::Mutex;

use super::entities::{RecentEntry, RecentSort};
use super::errors::RecentsError;
use super::ports::RecentsRepository;

pub const DEFAULT_MAX_ENTRIES: usize = 20;

/// Bounded, de-duplicated list of recently touched documents
pub struct RecentsService {
  repository: Arc<dyn RecentsRepository>,
  max_entries: usize,
  // Serializes read-modify-write cycles within this process
  write_lock: Mutex<()>,
}

impl RecentsService {
  pub fn new(repository: Arc<dyn RecentsRepository>, max_entries: usize) -> Self {
    Self {
      repository,
      max_entries: max_entries.max(1),
      write_lock: Mutex::new(()),
    }
  }

  pub fn max_entries(&self) -> usize {
    self.max_entries
  }

  /// Move the entry to the front, replacing any entry with the same key
  pub async fn record(&self, entry: RecentEntry) -> Result<Vec<RecentEntry>, RecentsError> {
    let _guard = self.write_lock.lock().await;

    let mut entries = self.repository.load().await?;
    entries.retain(|existing| existing.key() != entry.key());
    tracing::debug!("Recording recent {} ({})", entry.key(), entry.last_action);
    entries.insert(0, entry);
    entries.truncate(self.max_entries);

    self.repository.save(&entries).await?;
    Ok(entries)
  }

  pub async fn list(&self, sort: RecentSort) -> Result<Vec<RecentEntry>, RecentsError> {
    let mut entries = self.repository.load().await?;
    entries.truncate(self.max_entries);

    match sort {
      RecentSort::Recency => entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp)),
      RecentSort::Name => {
        entries.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
      }
      RecentSort::Type => entries.sort_by(|a, b| {
        a.document_type
          .cmp(&b.document_type)
          .then_with(|| b.timestamp.cmp(&a.timestamp))
      }),
    }
    Ok(entries)
  }

  /// Returns whether an entry was removed
  pub async fn remove(&self, key: &str) -> Result<bool, RecentsError> {
    let _guard = self.write_lock.lock().await;

    let mut entries = self.repository.load().await?;
    let before = entries.len();
    entries.retain(|entry| entry.key() != key);
    if entries.len() == before {
      return Ok(false);
    }

    self.repository.save(&entries).await?;
    Ok(true)
  }

  pub async fn clear(&self) -> Result<(), RecentsError> {
    let _guard = self.write_lock.lock().await;
    self.repository.save(&[]).await
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::document::DocumentType;
  use crate::domain::recents::entities::RecentAction;
  use async_trait::async_trait;
  use chrono::{Duration, Utc};

  #[derive(Default)]
  struct MemoryRepository {
    entries: std::sync::Mutex<Vec<RecentEntry>>,
    saves: std::sync::Mutex<usize>,
  }

  #[async_trait]
  impl RecentsRepository for MemoryRepository {
    async fn load(&self) -> Result<Vec<RecentEntry>, RecentsError> {
      Ok(self.entries.lock().unwrap().clone())
    }

    async fn save(&self, entries: &[RecentEntry]) -> Result<(), RecentsError> {
      *self.entries.lock().unwrap() = entries.to_vec();
      *self.saves.lock().unwrap() += 1;
      Ok(())
    }
  }

  fn entry(name: &str) -> RecentEntry {
    RecentEntry::new(name, RecentAction::Export).unwrap()
  }

  #[tokio::test]
  async fn test_record_puts_newest_first() {
    let service = RecentsService::new(Arc::new(MemoryRepository::default()), 20);
    service.record(entry("a")).await.unwrap();
    let entries = service.record(entry("b")).await.unwrap();
    let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["b", "a"]);
  }

  #[tokio::test]
  async fn test_record_deduplicates_by_path_then_name() {
    let service = RecentsService::new(Arc::new(MemoryRepository::default()), 20);
    service
      .record(entry("first").with_path("/out/INV-001.pdf"))
      .await
      .unwrap();
    service.record(entry("other")).await.unwrap();
    let entries = service
      .record(entry("renamed").with_path("/out/INV-001.pdf"))
      .await
      .unwrap();

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].name, "renamed");

    let entries = service.record(entry("other")).await.unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].name, "other");
  }

  #[tokio::test]
  async fn test_record_is_bounded() {
    let service = RecentsService::new(Arc::new(MemoryRepository::default()), 3);
    for i in 0..5 {
      service.record(entry(&format!("doc-{}", i))).await.unwrap();
    }
    let entries = service.list(RecentSort::Recency).await.unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].name, "doc-4");
    assert_eq!(entries[2].name, "doc-2");
  }

  #[tokio::test]
  async fn test_list_sorting() {
    let repository = Arc::new(MemoryRepository::default());
    let now = Utc::now();
    let mut zed = entry("Zed").with_document_type(DocumentType::Invoice);
    zed.timestamp = now;
    let mut alpha = entry("alpha").with_document_type(DocumentType::Waybill);
    alpha.timestamp = now - Duration::minutes(5);
    let mut mid = entry("Mid").with_document_type(DocumentType::Receipt);
    mid.timestamp = now - Duration::minutes(1);
    *repository.entries.lock().unwrap() = vec![alpha, zed, mid];

    let service = RecentsService::new(repository, 20);
    let by_name: Vec<_> = service
      .list(RecentSort::Name)
      .await
      .unwrap()
      .into_iter()
      .map(|e| e.name)
      .collect();
    assert_eq!(by_name, vec!["alpha", "Mid", "Zed"]);

    let by_recency = service.list(RecentSort::Recency).await.unwrap();
    assert_eq!(by_recency[0].name, "Zed");

    let by_type = service.list(RecentSort::Type).await.unwrap();
    assert_eq!(by_type[0].document_type, Some(DocumentType::Invoice));
    assert_eq!(by_type[2].document_type, Some(DocumentType::Waybill));
  }

  #[tokio::test]
  async fn test_remove_and_clear() {
    let repository = Arc::new(MemoryRepository::default());
    let service = RecentsService::new(repository.clone(), 20);
    service.record(entry("a")).await.unwrap();
    service.record(entry("b")).await.unwrap();

    assert!(service.remove("a").await.unwrap());
    assert!(!service.remove("missing").await.unwrap());
    assert_eq!(*repository.saves.lock().unwrap(), 3);

    service.clear().await.unwrap();
    assert!(service.list(RecentSort::Recency).await.unwrap().is_empty());
  }
}
