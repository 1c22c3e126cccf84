//! In-memory `VectorStore` for core tests.

use std::collections::BTreeMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;

use semdex_types::embedding::{EmbeddingRecord, ItemKey, PurgeFilter};
use semdex_types::error::RepositoryError;

use crate::repository::vector::VectorStore;

#[derive(Default)]
pub struct InMemoryVectorStore {
    records: RwLock<BTreeMap<ItemKey, EmbeddingRecord>>,
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Insert a record directly, bypassing `put` (e.g. a text-less row).
    pub fn insert_raw(&self, record: EmbeddingRecord) {
        self.records
            .write()
            .unwrap()
            .insert(record.key(), record);
    }

    fn check_read(&self) -> Result<(), RepositoryError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(RepositoryError::Connection);
        }
        Ok(())
    }
}

fn glob_match(pattern: &str, text: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let t: Vec<char> = text.chars().collect();
    fn go(p: &[char], t: &[char]) -> bool {
        match (p.first(), t.first()) {
            (None, None) => true,
            (Some('*'), _) => go(&p[1..], t) || (!t.is_empty() && go(p, &t[1..])),
            (Some('?'), Some(_)) => go(&p[1..], &t[1..]),
            (Some(a), Some(b)) if a == b => go(&p[1..], &t[1..]),
            _ => false,
        }
    }
    go(&p, &t)
}

impl VectorStore for InMemoryVectorStore {
    async fn put(
        &self,
        item_type: &str,
        item_id: &str,
        vector: &[f32],
        source_text: &str,
    ) -> Result<(), RepositoryError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(RepositoryError::Query("disk full".to_string()));
        }
        self.insert_raw(EmbeddingRecord {
            item_type: item_type.to_string(),
            item_id: item_id.to_string(),
            vector: vector.to_vec(),
            source_text: source_text.to_string(),
            created_at: Utc::now(),
        });
        Ok(())
    }

    async fn get_vector(
        &self,
        item_type: &str,
        item_id: &str,
    ) -> Result<Option<Vec<f32>>, RepositoryError> {
        // An empty vector stands in for an unreadable one.
        Ok(self
            .get_record(item_type, item_id)
            .await?
            .map(|r| r.vector)
            .filter(|v| !v.is_empty()))
    }

    async fn get_text(
        &self,
        item_type: &str,
        item_id: &str,
    ) -> Result<Option<String>, RepositoryError> {
        Ok(self
            .get_record(item_type, item_id)
            .await?
            .map(|r| r.source_text))
    }

    async fn get_record(
        &self,
        item_type: &str,
        item_id: &str,
    ) -> Result<Option<EmbeddingRecord>, RepositoryError> {
        self.check_read()?;
        Ok(self
            .records
            .read()
            .unwrap()
            .get(&ItemKey::new(item_type, item_id))
            .cloned())
    }

    async fn scan_all(&self) -> Result<Vec<EmbeddingRecord>, RepositoryError> {
        self.check_read()?;
        Ok(self.records.read().unwrap().values().cloned().collect())
    }

    async fn count_by_type(&self) -> Result<BTreeMap<String, u64>, RepositoryError> {
        self.check_read()?;
        let mut counts = BTreeMap::new();
        for key in self.records.read().unwrap().keys() {
            *counts.entry(key.item_type.clone()).or_insert(0) += 1;
        }
        Ok(counts)
    }

    async fn total_count(&self) -> Result<u64, RepositoryError> {
        self.check_read()?;
        Ok(self.records.read().unwrap().len() as u64)
    }

    async fn purge(&self, filter: &PurgeFilter) -> Result<u64, RepositoryError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(RepositoryError::Query("disk full".to_string()));
        }
        let mut records = self.records.write().unwrap();
        let before = records.len();
        records.retain(|key, _| {
            let matches = match filter {
                PurgeFilter::All => true,
                PurgeFilter::ItemType(t) => &key.item_type == t,
                PurgeFilter::IdPattern(p) => glob_match(p, &key.item_id),
                PurgeFilter::ItemTypeAndIdPattern {
                    item_type,
                    id_pattern,
                } => &key.item_type == item_type && glob_match(id_pattern, &key.item_id),
            };
            !matches
        });
        Ok((before - records.len()) as u64)
    }
}
