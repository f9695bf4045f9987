use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Certificates are never hard-deleted; Revoked is the terminal soft state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub enum CertificateStatus {
    Active,
    Revoked,
}

impl CertificateStatus {
    /// String form used in database filters; must match the serde encoding.
    pub fn as_str(&self) -> &'static str {
        match self {
            CertificateStatus::Active => "Active",
            CertificateStatus::Revoked => "Revoked",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Certificate {
    pub id: String,
    pub user_id: String,
    pub attempt_id: String,
    pub verification_code: String,
    pub score: f64,
    pub issued_at: DateTime<Utc>,
    pub status: CertificateStatus,
    pub pdf_blob_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revoked_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revocation_reason: Option<String>,
}

impl Certificate {
    pub fn issue(
        user_id: &str,
        attempt_id: &str,
        verification_code: &str,
        score: f64,
        pdf_blob_id: &str,
        issued_at: DateTime<Utc>,
    ) -> Self {
        Certificate {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            attempt_id: attempt_id.to_string(),
            verification_code: verification_code.to_string(),
            score,
            issued_at,
            status: CertificateStatus::Active,
            pdf_blob_id: pdf_blob_id.to_string(),
            revoked_at: None,
            revocation_reason: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == CertificateStatus::Active
    }
}
