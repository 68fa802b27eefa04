use async_trait::async_trait;
use parking_lot::RwLock;

use super::{sample_records, AudioRecord, NewAudioRecord, RecordStore, StoreError};

/// Prefix of every id handed out by the in-memory store.
pub const FALLBACK_ID_PREFIX: &str = "temp_";

/// In-process record list. Contents are lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<Vec<AudioRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeded() -> Self {
        let store = Self::new();
        for sample in sample_records() {
            store.push(sample);
        }
        store
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn find_language(&self, language: &str) -> Option<AudioRecord> {
        let language = language.to_lowercase();
        self.records
            .read()
            .iter()
            .find(|r| r.language.to_lowercase() == language)
            .cloned()
    }

    pub fn all(&self) -> Vec<AudioRecord> {
        self.records.read().clone()
    }

    pub fn push(&self, record: NewAudioRecord) -> AudioRecord {
        let stored = AudioRecord {
            id: synthetic_id(&record.language),
            language: record.language,
            text: record.text,
            filename: record.filename,
        };
        self.records.write().push(stored.clone());
        stored
    }

    /// Removes every record carrying `id`; returns whether any did.
    pub fn remove(&self, id: &str) -> bool {
        let mut records = self.records.write();
        let before = records.len();
        records.retain(|r| r.id != id);
        records.len() != before
    }
}

/// Fallback ids derive from the language alone, so two records for the
/// same language share an id.
pub fn synthetic_id(language: &str) -> String {
    format!("{}{}", FALLBACK_ID_PREFIX, language)
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn count(&self) -> Result<u64, StoreError> {
        Ok(self.len() as u64)
    }

    async fn find_one(&self, language: &str) -> Result<Option<AudioRecord>, StoreError> {
        Ok(self.find_language(language))
    }

    async fn find_all(&self) -> Result<Vec<AudioRecord>, StoreError> {
        Ok(self.all())
    }

    async fn insert(&self, record: NewAudioRecord) -> Result<AudioRecord, StoreError> {
        Ok(self.push(record))
    }

    async fn delete_by_id(&self, id: &str) -> Result<bool, StoreError> {
        Ok(self.remove(id))
    }
}
