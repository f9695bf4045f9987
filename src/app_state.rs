use std::sync::Arc;

use crate::{
    config::Config,
    db::Database,
    errors::AppResult,
    repositories::{
        MongoAttemptRepository, MongoBlobStore, MongoCertificateRepository,
        MongoQuestionBankRepository, MongoUserRepository,
    },
    services::{
        AttemptService, CertificateService, HttpPdfRenderer, QuestionBankService, QuizSettings,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub question_bank_service: Arc<QuestionBankService>,
    pub attempt_service: Arc<AttemptService>,
    pub certificate_service: Arc<CertificateService>,
    pub config: Arc<Config>,
}

impl AppState {
    pub async fn new(config: Config) -> AppResult<Self> {
        let db = Database::connect(&config).await?;
        let settings = QuizSettings::from(&config);

        let user_repository = Arc::new(MongoUserRepository::new(&db));

        let question_repository = Arc::new(MongoQuestionBankRepository::new(&db));
        question_repository.ensure_indexes().await?;

        let attempt_repository = Arc::new(MongoAttemptRepository::new(&db));
        attempt_repository.ensure_indexes().await?;

        let certificate_repository = Arc::new(MongoCertificateRepository::new(&db));
        certificate_repository.ensure_indexes().await?;

        let blob_store = Arc::new(MongoBlobStore::new(&db));
        blob_store.ensure_indexes().await?;

        let pdf_renderer = Arc::new(HttpPdfRenderer::from_config(&config)?);

        let question_bank_service = Arc::new(QuestionBankService::new(question_repository.clone()));
        let attempt_service = Arc::new(AttemptService::new(
            question_repository,
            attempt_repository.clone(),
            user_repository.clone(),
            settings,
        ));
        let certificate_service = Arc::new(CertificateService::new(
            certificate_repository,
            attempt_repository,
            user_repository,
            pdf_renderer,
            blob_store,
            settings,
            config.certificate_code_salt.clone(),
        ));

        Ok(Self {
            db,
            question_bank_service,
            attempt_service,
            certificate_service,
            config: Arc::new(config),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_is_cloneable() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<AppState>();
    }
}
