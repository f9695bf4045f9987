use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mongodb::{
    bson::doc,
    options::{FindOneAndUpdateOptions, IndexOptions, ReturnDocument},
    Collection, IndexModel,
};

use crate::{
    db::Database,
    errors::{AppError, AppResult},
    models::domain::{Certificate, CertificateStatus},
    repositories::is_duplicate_key,
};

#[async_trait]
pub trait CertificateRepository: Send + Sync {
    /// Persists a new Active certificate. The partial unique index on
    /// (user_id, status == Active) turns a racing second insert into a
    /// `Conflict` instead of a second active certificate.
    async fn insert(&self, certificate: Certificate) -> AppResult<Certificate>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Certificate>>;
    async fn find_by_code(&self, code: &str) -> AppResult<Option<Certificate>>;
    async fn find_active_by_user(&self, user_id: &str) -> AppResult<Option<Certificate>>;
    /// Transitions Active -> Revoked atomically. Returns `None` when the
    /// certificate was not Active.
    async fn mark_revoked(
        &self,
        id: &str,
        reason: &str,
        revoked_at: DateTime<Utc>,
    ) -> AppResult<Option<Certificate>>;
}

pub struct MongoCertificateRepository {
    collection: Collection<Certificate>,
}

impl MongoCertificateRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection("certificates");
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for certificates collection");

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        let code_index = IndexModel::builder()
            .keys(doc! { "verification_code": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("verification_code_unique".to_string())
                    .build(),
            )
            .build();

        let one_active_per_user_index = IndexModel::builder()
            .keys(doc! { "user_id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .partial_filter_expression(
                        doc! { "status": CertificateStatus::Active.as_str() },
                    )
                    .name("one_active_per_user".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(id_index).await?;
        self.collection.create_index(code_index).await?;
        self.collection.create_index(one_active_per_user_index).await?;

        Ok(())
    }
}

#[async_trait]
impl CertificateRepository for MongoCertificateRepository {
    async fn insert(&self, certificate: Certificate) -> AppResult<Certificate> {
        match self.collection.insert_one(&certificate).await {
            Ok(_) => Ok(certificate),
            Err(err) if is_duplicate_key(&err) => Err(AppError::Conflict(format!(
                "User '{}' already holds an active certificate",
                certificate.user_id
            ))),
            Err(err) => Err(err.into()),
        }
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Certificate>> {
        let certificate = self.collection.find_one(doc! { "id": id }).await?;
        Ok(certificate)
    }

    async fn find_by_code(&self, code: &str) -> AppResult<Option<Certificate>> {
        let certificate = self
            .collection
            .find_one(doc! { "verification_code": code })
            .await?;
        Ok(certificate)
    }

    async fn find_active_by_user(&self, user_id: &str) -> AppResult<Option<Certificate>> {
        let certificate = self
            .collection
            .find_one(doc! {
                "user_id": user_id,
                "status": CertificateStatus::Active.as_str()
            })
            .await?;
        Ok(certificate)
    }

    async fn mark_revoked(
        &self,
        id: &str,
        reason: &str,
        revoked_at: DateTime<Utc>,
    ) -> AppResult<Option<Certificate>> {
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        let updated = self
            .collection
            .find_one_and_update(
                doc! { "id": id, "status": CertificateStatus::Active.as_str() },
                doc! { "$set": {
                    "status": CertificateStatus::Revoked.as_str(),
                    "revoked_at": mongodb::bson::to_bson(&revoked_at)?,
                    "revocation_reason": reason,
                } },
            )
            .with_options(options)
            .await?;

        Ok(updated)
    }
}
