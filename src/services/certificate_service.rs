use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;

use crate::{
    errors::{AppError, AppResult},
    models::domain::{Certificate, CertificateStatus},
    models::dto::response::{ApiMessage, CertificateVerification, CertificateView},
    repositories::{AttemptRepository, BlobStore, CertificateRepository, UserRepository},
    services::pdf_renderer::{CertificatePdfData, CertificatePdfRenderer},
    services::scoring::QuizSettings,
};

static CODE_FORMAT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^CERT-[0-9a-f]{12}-[0-9]{6}$").expect("code pattern is a valid regex")
});

const SUPERSEDED_REASON: &str = "Superseded by a higher-scoring attempt";

/// Issues, verifies, revokes and serves certificates, holding the
/// one-active-certificate-per-user invariant. Generation is serialized
/// per user; the partial unique index in the repository backs the same
/// invariant at the storage layer.
pub struct CertificateService {
    certificates: Arc<dyn CertificateRepository>,
    attempts: Arc<dyn AttemptRepository>,
    users: Arc<dyn UserRepository>,
    renderer: Arc<dyn CertificatePdfRenderer>,
    blobs: Arc<dyn BlobStore>,
    settings: QuizSettings,
    code_salt: SecretString,
    generate_locks: StdMutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl CertificateService {
    pub fn new(
        certificates: Arc<dyn CertificateRepository>,
        attempts: Arc<dyn AttemptRepository>,
        users: Arc<dyn UserRepository>,
        renderer: Arc<dyn CertificatePdfRenderer>,
        blobs: Arc<dyn BlobStore>,
        settings: QuizSettings,
        code_salt: SecretString,
    ) -> Self {
        Self {
            certificates,
            attempts,
            users,
            renderer,
            blobs,
            settings,
            code_salt,
            generate_locks: StdMutex::new(HashMap::new()),
        }
    }

    /// Issues a certificate for a completed, passing attempt.
    ///
    /// Re-requesting for the already-certified attempt returns the
    /// existing certificate. A different attempt supersedes the existing
    /// certificate only with a strictly greater score, in which case the
    /// old one is revoked and its PDF deleted best-effort; otherwise the
    /// request is rejected with the existing certificate's id and both
    /// scores.
    pub async fn generate(&self, attempt_id: &str) -> AppResult<CertificateView> {
        let attempt = self
            .attempts
            .find_by_id(attempt_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Attempt with id '{}' not found", attempt_id)))?;

        if !attempt.is_completed() {
            return Err(AppError::InvalidState(format!(
                "Attempt '{}' is {} and cannot be certified",
                attempt_id,
                attempt.status.as_str()
            )));
        }

        let score = attempt.score.unwrap_or(0.0);
        if score < self.settings.passing_score {
            return Err(AppError::InvalidState(format!(
                "Attempt '{}' scored {:.1}, below the passing score of {:.1}",
                attempt_id, score, self.settings.passing_score
            )));
        }

        let user = self
            .users
            .find_by_id(&attempt.user_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("User with id '{}' not found", attempt.user_id))
            })?;

        // One generation at a time per user: check-existing, revoke and
        // insert must not interleave with another request for the same user.
        let lock = self.user_lock(&attempt.user_id);
        let _guard = lock.lock().await;

        if let Some(existing) = self.certificates.find_active_by_user(&attempt.user_id).await? {
            if existing.attempt_id == attempt.id {
                return Ok(CertificateView::from_parts(existing, &user));
            }

            if score > existing.score {
                let revoked = self
                    .certificates
                    .mark_revoked(&existing.id, SUPERSEDED_REASON, Utc::now())
                    .await?;
                if let Some(revoked) = revoked {
                    if let Err(err) = self.blobs.delete(&revoked.pdf_blob_id).await {
                        log::warn!(
                            "Could not delete superseded certificate PDF '{}': {}",
                            revoked.pdf_blob_id,
                            err
                        );
                    }
                }
            } else {
                return Err(AppError::Conflict(format!(
                    "User '{}' already holds certificate '{}' with score {:.1}; a new score of {:.1} does not supersede it",
                    attempt.user_id, existing.id, existing.score, score
                )));
            }
        }

        let issued_at = Utc::now();
        let code = build_verification_code(
            &attempt.user_id,
            &attempt.id,
            issued_at,
            self.code_salt.expose_secret(),
        );

        let pdf_data = CertificatePdfData {
            user_name: user.name.clone(),
            user_email: user.email.clone(),
            score,
            correct_answers: attempt.correct_answers.unwrap_or(0),
            total_questions: attempt.total_questions,
            issued_at,
            verification_code: code.clone(),
        };
        let pdf_bytes = self.renderer.render(&pdf_data).await?;

        let filename = format!("certificado_{}_{}.pdf", attempt.user_id, issued_at.timestamp());
        let blob_id = self.blobs.put(pdf_bytes, &filename).await?;

        let certificate =
            Certificate::issue(&attempt.user_id, &attempt.id, &code, score, &blob_id, issued_at);

        match self.certificates.insert(certificate).await {
            Ok(certificate) => Ok(CertificateView::from_parts(certificate, &user)),
            Err(err) => {
                // The row never landed; do not leave its PDF behind.
                if let Err(cleanup_err) = self.blobs.delete(&blob_id).await {
                    log::warn!(
                        "Could not delete orphaned certificate PDF '{}': {}",
                        blob_id,
                        cleanup_err
                    );
                }
                Err(err)
            }
        }
    }

    /// Public verification lookup. Never raises for unknown codes; the
    /// outcome distinguishes malformed, unknown and revoked.
    pub async fn verify(&self, code: &str) -> AppResult<CertificateVerification> {
        if !CODE_FORMAT.is_match(code) {
            return Ok(CertificateVerification::invalid(
                "Malformed verification code",
            ));
        }

        match self.certificates.find_by_code(code).await? {
            None => Ok(CertificateVerification::invalid(
                "No certificate found for this code",
            )),
            Some(certificate) if certificate.status == CertificateStatus::Revoked => {
                Ok(CertificateVerification::revoked(&certificate))
            }
            Some(certificate) => {
                let user_name = self
                    .users
                    .find_by_id(&certificate.user_id)
                    .await?
                    .map(|u| u.name);
                Ok(CertificateVerification::valid(&certificate, user_name))
            }
        }
    }

    /// Administrative revocation. The stored PDF is kept; only
    /// supersession deletes it.
    pub async fn revoke(&self, certificate_id: &str, reason: &str) -> AppResult<ApiMessage> {
        let certificate = self
            .certificates
            .find_by_id(certificate_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "Certificate with id '{}' not found",
                    certificate_id
                ))
            })?;

        if certificate.status == CertificateStatus::Revoked {
            return Err(AppError::InvalidState(format!(
                "Certificate '{}' is already revoked",
                certificate_id
            )));
        }

        self.certificates
            .mark_revoked(certificate_id, reason, Utc::now())
            .await?
            .ok_or_else(|| {
                AppError::InvalidState(format!(
                    "Certificate '{}' is already revoked",
                    certificate_id
                ))
            })?;

        Ok(ApiMessage {
            message: format!("Certificate '{}' revoked", certificate_id),
        })
    }

    /// Serves the stored PDF. Revoked certificates cannot be downloaded.
    pub async fn download(&self, certificate_id: &str) -> AppResult<(String, Vec<u8>)> {
        let certificate = self
            .certificates
            .find_by_id(certificate_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "Certificate with id '{}' not found",
                    certificate_id
                ))
            })?;

        if certificate.status == CertificateStatus::Revoked {
            return Err(AppError::InvalidState(format!(
                "Certificate '{}' has been revoked and can no longer be downloaded",
                certificate_id
            )));
        }

        let bytes = self
            .blobs
            .get(&certificate.pdf_blob_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "PDF for certificate '{}' not found",
                    certificate_id
                ))
            })?;

        Ok((format!("{}.pdf", certificate.verification_code), bytes))
    }

    pub async fn active_for_user(&self, user_id: &str) -> AppResult<CertificateView> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id '{}' not found", user_id)))?;

        let certificate = self
            .certificates
            .find_active_by_user(user_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("User '{}' has no active certificate", user_id))
            })?;

        Ok(CertificateView::from_parts(certificate, &user))
    }

    fn user_lock(&self, user_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self
            .generate_locks
            .lock()
            .expect("certificate lock registry poisoned");
        locks
            .entry(user_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

/// Derives an unpredictable, publicly checkable code from the issuance
/// context and a secret salt: `CERT-` + the first 12 hex chars of
/// SHA-256(user:attempt:nanos:salt) + a 6-digit timestamp suffix.
pub(crate) fn build_verification_code(
    user_id: &str,
    attempt_id: &str,
    issued_at: DateTime<Utc>,
    salt: &str,
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!(
        "{}:{}:{}:{}",
        user_id,
        attempt_id,
        issued_at.timestamp_nanos_opt().unwrap_or_default(),
        salt
    ));
    let digest = format!("{:x}", hasher.finalize());
    let suffix = issued_at.timestamp_millis().rem_euclid(1_000_000);

    format!("CERT-{}-{:06}", &digest[..12], suffix)
}
