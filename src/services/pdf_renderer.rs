use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    config::Config,
    errors::{AppError, AppResult},
};

/// Everything the external renderer needs to lay out a certificate.
#[derive(Clone, Debug, Serialize)]
pub struct CertificatePdfData {
    pub user_name: String,
    pub user_email: String,
    pub score: f64,
    pub correct_answers: i32,
    pub total_questions: i32,
    pub issued_at: DateTime<Utc>,
    pub verification_code: String,
}

/// External PDF generation, reduced to its interface: structured
/// certificate data in, rendered bytes out.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CertificatePdfRenderer: Send + Sync {
    async fn render(&self, data: &CertificatePdfData) -> AppResult<Vec<u8>>;
}

/// Renderer backed by an HTTP service. Requests run under a client-level
/// timeout so a stalled renderer surfaces as a reported failure, not a
/// hang.
pub struct HttpPdfRenderer {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpPdfRenderer {
    pub fn from_config(config: &Config) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.pdf_renderer_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.pdf_renderer_url.clone(),
        })
    }
}

#[async_trait]
impl CertificatePdfRenderer for HttpPdfRenderer {
    async fn render(&self, data: &CertificatePdfData) -> AppResult<Vec<u8>> {
        let response = self.client.post(&self.endpoint).json(data).send().await?;

        if !response.status().is_success() {
            log::error!(
                "PDF renderer answered {} for certificate '{}'",
                response.status(),
                data.verification_code
            );
            return Err(AppError::DependencyFailure(format!(
                "PDF renderer answered {}",
                response.status()
            )));
        }

        Ok(response.bytes().await?.to_vec())
    }
}
