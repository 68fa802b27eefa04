use std::time::Duration;

use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, Document},
    options::ClientOptions,
    Client, Collection,
};
use serde::{Deserialize, Serialize};

use super::{AudioRecord, NewAudioRecord, RecordStore, StoreError};

/// Stored shape of a record. Older documents may also carry an `audio_url`
/// field; it is ignored on read and never written.
#[derive(Debug, Serialize, Deserialize)]
struct AudioDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<ObjectId>,
    language: String,
    text: String,
    filename: String,
}

impl AudioDocument {
    fn into_record(self) -> AudioRecord {
        AudioRecord {
            id: self.id.map(|oid| oid.to_hex()).unwrap_or_default(),
            language: self.language,
            text: self.text,
            filename: self.filename,
        }
    }
}

pub struct MongoStore {
    collection: Collection<AudioDocument>,
}

impl MongoStore {
    /// Connects and pings the server. Fails if the server cannot be selected
    /// within `timeout`.
    pub async fn connect(
        url: &str,
        database: &str,
        collection: &str,
        timeout: Duration,
    ) -> Result<Self, StoreError> {
        let mut options = ClientOptions::parse(url).await.map_err(unavailable)?;
        options.server_selection_timeout = Some(timeout);
        options.connect_timeout = Some(timeout);
        options.app_name = Some(env!("CARGO_PKG_NAME").to_string());

        let client = Client::with_options(options).map_err(unavailable)?;
        let db = client.database(database);
        db.run_command(doc! { "ping": 1 })
            .await
            .map_err(unavailable)?;

        Ok(Self {
            collection: db.collection(collection),
        })
    }
}

fn unavailable(err: mongodb::error::Error) -> StoreError {
    StoreError::Unavailable(err.to_string())
}

/// Whole-value, case-insensitive match on `language`. Documents written by
/// older clients keep the casing they were posted with.
fn language_filter(language: &str) -> Document {
    doc! {
        "language": {
            "$regex": format!("^{}$", regex::escape(language)),
            "$options": "i",
        }
    }
}

pub fn parse_object_id(id: &str) -> Result<ObjectId, StoreError> {
    ObjectId::parse_str(id).map_err(|_| StoreError::InvalidId(id.to_string()))
}

#[async_trait]
impl RecordStore for MongoStore {
    async fn count(&self) -> Result<u64, StoreError> {
        self.collection
            .count_documents(doc! {})
            .await
            .map_err(unavailable)
    }

    async fn find_one(&self, language: &str) -> Result<Option<AudioRecord>, StoreError> {
        let found = self
            .collection
            .find_one(language_filter(language))
            .await
            .map_err(unavailable)?;
        Ok(found.map(AudioDocument::into_record))
    }

    async fn find_all(&self) -> Result<Vec<AudioRecord>, StoreError> {
        let cursor = self.collection.find(doc! {}).await.map_err(unavailable)?;
        let docs: Vec<AudioDocument> = cursor.try_collect().await.map_err(unavailable)?;
        Ok(docs.into_iter().map(AudioDocument::into_record).collect())
    }

    async fn insert(&self, record: NewAudioRecord) -> Result<AudioRecord, StoreError> {
        let document = AudioDocument {
            id: None,
            language: record.language,
            text: record.text,
            filename: record.filename,
        };
        let result = self
            .collection
            .insert_one(&document)
            .await
            .map_err(unavailable)?;

        let id = result
            .inserted_id
            .as_object_id()
            .map(|oid| oid.to_hex())
            .ok_or_else(|| StoreError::Unavailable("insert returned a non-ObjectId id".into()))?;

        Ok(AudioRecord {
            id,
            language: document.language,
            text: document.text,
            filename: document.filename,
        })
    }

    async fn delete_by_id(&self, id: &str) -> Result<bool, StoreError> {
        let oid = parse_object_id(id)?;
        let result = self
            .collection
            .delete_one(doc! { "_id": oid })
            .await
            .map_err(unavailable)?;
        Ok(result.deleted_count > 0)
    }
}
