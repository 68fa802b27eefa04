pub mod url;

use serde::Serialize;

use crate::error::AppError;
use crate::store::{AudioRecord, DeleteOutcome, NewAudioRecord, StoreAdapter, StoreMode};

pub use url::{audio_url, RequestOrigin};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LanguageOption {
    pub code: &'static str,
    pub name: &'static str,
    pub flag: &'static str,
}

/// Languages the front-end offers. Independent of what the store holds.
pub const SUPPORTED_LANGUAGES: [LanguageOption; 5] = [
    LanguageOption {
        code: "english",
        name: "English",
        flag: "🇺🇸",
    },
    LanguageOption {
        code: "arabic",
        name: "Arabic",
        flag: "🇸🇦",
    },
    LanguageOption {
        code: "spanish",
        name: "Spanish",
        flag: "🇪🇸",
    },
    LanguageOption {
        code: "french",
        name: "French",
        flag: "🇫🇷",
    },
    LanguageOption {
        code: "german",
        name: "German",
        flag: "🇩🇪",
    },
];

pub struct CatalogService {
    store: StoreAdapter,
}

impl CatalogService {
    pub fn new(store: StoreAdapter) -> Self {
        Self { store }
    }

    pub fn mode(&self) -> StoreMode {
        self.store.mode()
    }

    pub fn list_languages(&self) -> &'static [LanguageOption] {
        &SUPPORTED_LANGUAGES
    }

    pub async fn get_by_language(&self, code: &str) -> Result<AudioRecord, AppError> {
        let language = code.trim().to_lowercase();
        self.store
            .find_one(&language)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Audio for language '{}' not found", code)))
    }

    pub async fn list_all(&self) -> Result<Vec<AudioRecord>, AppError> {
        self.store.find_all().await
    }

    /// Language codes are stored lowercased. Duplicates are accepted; only
    /// the first one stored is ever returned by `get_by_language`.
    pub async fn create(
        &self,
        language: &str,
        text: &str,
        filename: &str,
    ) -> Result<AudioRecord, AppError> {
        if language.trim().is_empty() {
            return Err(AppError::InvalidArgument("Language cannot be empty".into()));
        }
        if text.trim().is_empty() {
            return Err(AppError::InvalidArgument("Text cannot be empty".into()));
        }
        if filename.trim().is_empty() {
            return Err(AppError::InvalidArgument("Filename cannot be empty".into()));
        }

        let record = NewAudioRecord {
            language: language.trim().to_lowercase(),
            text: text.to_string(),
            filename: filename.to_string(),
        };
        let created = self.store.insert(record).await?;
        tracing::info!("Created audio record {} for '{}'", created.id, created.language);
        Ok(created)
    }

    pub async fn delete(&self, id: &str) -> Result<DeleteOutcome, AppError> {
        let outcome = self.store.delete_by_id(id).await?;
        tracing::info!("Deleted audio record {} ({:?})", id, outcome);
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::store::testing::ScriptedStore;

    async fn fallback_catalog() -> CatalogService {
        let store = StoreAdapter::in_memory();
        store.seed().await;
        CatalogService::new(store)
    }

    #[tokio::test]
    async fn seeded_languages_resolve() {
        let catalog = fallback_catalog().await;
        for code in ["english", "Arabic", "ENGLISH"] {
            let record = catalog.get_by_language(code).await.unwrap();
            assert_eq!(record.language, code.to_lowercase());
        }
    }

    #[tokio::test]
    async fn unknown_language_is_not_found() {
        let catalog = fallback_catalog().await;
        let err = catalog.get_by_language("klingon").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn languages_do_not_depend_on_store() {
        let primary = Arc::new(ScriptedStore::default());
        primary.set_failing(true);
        let catalog = CatalogService::new(StoreAdapter::with_primary(primary));

        let languages = catalog.list_languages();
        assert_eq!(languages.len(), 5);
        assert_eq!(languages[2].code, "spanish");
    }

    #[tokio::test]
    async fn create_then_read_back() {
        let catalog = fallback_catalog().await;
        let created = catalog.create("Spanish", "Hola", "es.mp3").await.unwrap();
        assert_eq!(created.id, "temp_spanish");

        let found = catalog.get_by_language("spanish").await.unwrap();
        assert_eq!(found.text, "Hola");
        assert_eq!(found.filename, "es.mp3");
        assert_eq!(catalog.list_all().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn create_against_primary_returns_store_id() {
        let primary = Arc::new(ScriptedStore::default());
        let catalog = CatalogService::new(StoreAdapter::with_primary(primary));

        let created = catalog.create("german", "Hallo", "de.mp3").await.unwrap();
        assert!(!created.id.starts_with("temp_"));
        assert_eq!(catalog.get_by_language("german").await.unwrap().id, created.id);
    }

    #[tokio::test]
    async fn create_rejects_empty_fields() {
        let catalog = fallback_catalog().await;
        for (language, text, filename) in [("", "t", "f"), ("l", " ", "f"), ("l", "t", "")] {
            let err = catalog.create(language, text, filename).await.unwrap_err();
            assert!(matches!(err, AppError::InvalidArgument(_)));
        }
        assert_eq!(catalog.list_all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn duplicate_languages_keep_first() {
        let catalog = fallback_catalog().await;
        catalog.create("english", "Second", "b.mp3").await.unwrap();
        let found = catalog.get_by_language("english").await.unwrap();
        assert_eq!(found.filename, "english_sample.mp3");
    }
}
