pub mod memory;
pub mod mongo;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::AppError;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

/// One catalog entry as held by a backend. The playback URL is not part of
/// it; see `catalog::url`.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioRecord {
    pub id: String,
    pub language: String,
    pub text: String,
    pub filename: String,
}

/// A record that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAudioRecord {
    pub language: String,
    pub text: String,
    pub filename: String,
}

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("invalid record id: {0}")]
    InvalidId(String),

    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn count(&self) -> Result<u64, StoreError>;

    /// First record whose language equals `language`, ignoring case.
    async fn find_one(&self, language: &str) -> Result<Option<AudioRecord>, StoreError>;

    async fn find_all(&self) -> Result<Vec<AudioRecord>, StoreError>;

    async fn insert(&self, record: NewAudioRecord) -> Result<AudioRecord, StoreError>;

    /// Returns whether a record was removed.
    async fn delete_by_id(&self, id: &str) -> Result<bool, StoreError>;
}

/// Which backend was selected at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreMode {
    Primary,
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Primary,
    Fallback,
}

/// Routes every operation to the primary store when one was reachable at
/// startup, and to the fallback store otherwise. Reads that fail against
/// the primary are answered from the fallback for that call only; the next
/// call tries the primary again. Writes against the primary never fall back.
pub struct StoreAdapter {
    primary: Option<Arc<dyn RecordStore>>,
    fallback: Arc<dyn RecordStore>,
}

impl StoreAdapter {
    pub fn new(primary: Option<Arc<dyn RecordStore>>, fallback: Arc<dyn RecordStore>) -> Self {
        Self { primary, fallback }
    }

    /// Fallback mode on a seeded `MemoryStore`.
    pub fn in_memory() -> Self {
        Self::new(None, Arc::new(MemoryStore::seeded()))
    }

    /// Primary mode, with a seeded `MemoryStore` behind it for failed reads.
    pub fn with_primary(primary: Arc<dyn RecordStore>) -> Self {
        Self::new(Some(primary), Arc::new(MemoryStore::seeded()))
    }

    pub fn mode(&self) -> StoreMode {
        if self.primary.is_some() {
            StoreMode::Primary
        } else {
            StoreMode::Fallback
        }
    }

    /// Inserts the sample records into the active store if it is empty.
    ///
    /// Count and insert are separate round trips, so two processes starting
    /// against the same empty collection can both seed it, and a request
    /// served before this finishes can see an empty catalog.
    pub async fn seed(&self) {
        let (store, name) = match &self.primary {
            Some(primary) => (primary, "primary"),
            None => (&self.fallback, "in-memory"),
        };

        match store.count().await {
            Ok(0) => {
                for sample in sample_records() {
                    if let Err(e) = store.insert(sample).await {
                        tracing::warn!("Failed to seed {} store: {}", name, e);
                        return;
                    }
                }
                tracing::info!("Sample audio data inserted into {} store", name);
            }
            Ok(n) => tracing::info!("Using {} storage with {} records", name, n),
            Err(e) => tracing::warn!("Could not count {} records, skipping seed: {}", name, e),
        }
    }

    pub async fn count(&self) -> Result<u64, AppError> {
        if let Some(primary) = &self.primary {
            match primary.count().await {
                Ok(n) => return Ok(n),
                Err(e) => tracing::warn!("Primary count failed, using fallback: {}", e),
            }
        }
        Ok(self.fallback.count().await?)
    }

    pub async fn find_one(&self, language: &str) -> Result<Option<AudioRecord>, AppError> {
        if let Some(primary) = &self.primary {
            match primary.find_one(language).await {
                Ok(found) => return Ok(found),
                Err(e) => tracing::warn!("Primary lookup failed, using fallback: {}", e),
            }
        }
        Ok(self.fallback.find_one(language).await?)
    }

    pub async fn find_all(&self) -> Result<Vec<AudioRecord>, AppError> {
        if let Some(primary) = &self.primary {
            match primary.find_all().await {
                Ok(records) => return Ok(records),
                Err(e) => tracing::warn!("Primary listing failed, using fallback: {}", e),
            }
        }
        Ok(self.fallback.find_all().await?)
    }

    pub async fn insert(&self, record: NewAudioRecord) -> Result<AudioRecord, AppError> {
        let store = self.primary.as_ref().unwrap_or(&self.fallback);
        Ok(store.insert(record).await?)
    }

    pub async fn delete_by_id(&self, id: &str) -> Result<DeleteOutcome, AppError> {
        match &self.primary {
            Some(primary) => {
                if primary.delete_by_id(id).await? {
                    Ok(DeleteOutcome::Primary)
                } else {
                    Err(AppError::NotFound("Audio file not found".into()))
                }
            }
            None => {
                // Reported as success whether or not the id existed.
                if !self.fallback.delete_by_id(id).await? {
                    tracing::debug!("Fallback delete of unknown id {}", id);
                }
                Ok(DeleteOutcome::Fallback)
            }
        }
    }
}

pub const ENGLISH_SAMPLE_TEXT: &str = "In the ancient land of Eldoria, where skies shimmered and forests, whispered secrets to the wind, lived a dragon named Zephyros. [sarcastically] Not the \"burn it all down\" kind... [giggles] but he was gentle, wise, with eyes like old stars. [whispers] Even the birds fell silent when he passed.";

pub const ARABIC_SAMPLE_TEXT: &str = "في أرض إلدوريا القديمة، حيث كانت السماء تتلألأ والغابات تهمس بالأسرار للريح، عاش تنين يُدعى زيفيروس. [sarcastically] ليس من نوع \"يحرق كل شيء\"... [giggles] لكنه كان لطيفًا وحكيمًا، وعيناه تشبهان النجوم القديمة. [whispers] حتى الطيور كانت تصمت عندما يمر.";

/// The two records every empty backend starts with.
pub fn sample_records() -> Vec<NewAudioRecord> {
    vec![
        NewAudioRecord {
            language: "english".into(),
            text: ENGLISH_SAMPLE_TEXT.into(),
            filename: "english_sample.mp3".into(),
        },
        NewAudioRecord {
            language: "arabic".into(),
            text: ARABIC_SAMPLE_TEXT.into(),
            filename: "arabic_sample.mp3".into(),
        },
    ]
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

    use parking_lot::Mutex;

    use super::*;

    /// Stand-in for the document store. Ids are 24 hex digits like an
    /// ObjectId; anything else is rejected as malformed. Flip `set_failing`
    /// to make every call report the backend as unavailable.
    #[derive(Default)]
    pub struct ScriptedStore {
        records: Mutex<Vec<AudioRecord>>,
        next_id: AtomicU64,
        failing: AtomicBool,
    }

    impl ScriptedStore {
        pub fn set_failing(&self, failing: bool) {
            self.failing.store(failing, Ordering::SeqCst);
        }

        pub fn len(&self) -> usize {
            self.records.lock().len()
        }

        fn check(&self) -> Result<(), StoreError> {
            if self.failing.load(Ordering::SeqCst) {
                Err(StoreError::Unavailable("scripted outage".into()))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl RecordStore for ScriptedStore {
        async fn count(&self) -> Result<u64, StoreError> {
            self.check()?;
            Ok(self.records.lock().len() as u64)
        }

        async fn find_one(&self, language: &str) -> Result<Option<AudioRecord>, StoreError> {
            self.check()?;
            Ok(self
                .records
                .lock()
                .iter()
                .find(|r| r.language.to_lowercase() == language.to_lowercase())
                .cloned())
        }

        async fn find_all(&self) -> Result<Vec<AudioRecord>, StoreError> {
            self.check()?;
            Ok(self.records.lock().clone())
        }

        async fn insert(&self, record: NewAudioRecord) -> Result<AudioRecord, StoreError> {
            self.check()?;
            let n = self.next_id.fetch_add(1, Ordering::SeqCst);
            let stored = AudioRecord {
                id: format!("{:024x}", n + 1),
                language: record.language,
                text: record.text,
                filename: record.filename,
            };
            self.records.lock().push(stored.clone());
            Ok(stored)
        }

        async fn delete_by_id(&self, id: &str) -> Result<bool, StoreError> {
            self.check()?;
            if id.len() != 24 || !id.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(StoreError::InvalidId(id.to_string()));
            }
            let mut records = self.records.lock();
            let before = records.len();
            records.retain(|r| r.id != id);
            Ok(records.len() != before)
        }
    }
}
