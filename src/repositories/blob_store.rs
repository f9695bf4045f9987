use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mongodb::{
    bson::{doc, spec::BinarySubtype, Binary},
    options::IndexOptions,
    Collection, IndexModel,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{db::Database, errors::AppResult};

/// Opaque binary storage for certificate PDFs. Deletion is best-effort:
/// removing an id that is already gone is not an error.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(&self, bytes: Vec<u8>, filename: &str) -> AppResult<String>;
    async fn get(&self, blob_id: &str) -> AppResult<Option<Vec<u8>>>;
    async fn delete(&self, blob_id: &str) -> AppResult<()>;
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct StoredBlob {
    pub id: String,
    pub filename: String,
    pub data: Binary,
    pub uploaded_at: DateTime<Utc>,
}

pub struct MongoBlobStore {
    collection: Collection<StoredBlob>,
}

impl MongoBlobStore {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection("certificate_files");
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for certificate_files collection");

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(id_index).await?;

        Ok(())
    }
}

#[async_trait]
impl BlobStore for MongoBlobStore {
    async fn put(&self, bytes: Vec<u8>, filename: &str) -> AppResult<String> {
        let blob = StoredBlob {
            id: Uuid::new_v4().to_string(),
            filename: filename.to_string(),
            data: Binary {
                subtype: BinarySubtype::Generic,
                bytes,
            },
            uploaded_at: Utc::now(),
        };

        self.collection.insert_one(&blob).await?;
        Ok(blob.id)
    }

    async fn get(&self, blob_id: &str) -> AppResult<Option<Vec<u8>>> {
        let blob = self.collection.find_one(doc! { "id": blob_id }).await?;
        Ok(blob.map(|b| b.data.bytes))
    }

    async fn delete(&self, blob_id: &str) -> AppResult<()> {
        self.collection.delete_one(doc! { "id": blob_id }).await?;
        Ok(())
    }
}
