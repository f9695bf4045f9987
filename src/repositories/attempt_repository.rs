use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::doc,
    options::{FindOneAndUpdateOptions, IndexOptions, ReturnDocument},
    Collection, IndexModel,
};

use crate::{
    db::Database,
    errors::{AppError, AppResult},
    models::domain::{AttemptCompletion, AttemptStatus, QuizAttempt, UserAnswer},
    repositories::is_duplicate_key,
};

#[async_trait]
pub trait AttemptRepository: Send + Sync {
    async fn create(&self, attempt: QuizAttempt) -> AppResult<QuizAttempt>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<QuizAttempt>>;
    /// Inserts the answer. The unique (attempt_id, question_id) index is the
    /// duplicate check; a second answer for the same question comes back as
    /// `AlreadyAnswered` and leaves the first one untouched.
    async fn record_answer(&self, answer: UserAnswer) -> AppResult<UserAnswer>;
    async fn answers_for_attempt(&self, attempt_id: &str) -> AppResult<Vec<UserAnswer>>;
    /// Applies the InProgress -> Completed transition atomically. Returns
    /// `None` when the attempt was not InProgress, including when a
    /// concurrent call won the transition.
    async fn complete(
        &self,
        attempt_id: &str,
        completion: AttemptCompletion,
    ) -> AppResult<Option<QuizAttempt>>;
    async fn find_by_user(
        &self,
        user_id: &str,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<QuizAttempt>, i64)>;
}

pub struct MongoAttemptRepository {
    attempts: Collection<QuizAttempt>,
    answers: Collection<UserAnswer>,
}

impl MongoAttemptRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            attempts: db.get_collection("quiz_attempts"),
            answers: db.get_collection("user_answers"),
        }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for quiz_attempts and user_answers collections");

        let attempt_id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        let attempt_user_index = IndexModel::builder()
            .keys(doc! { "user_id": 1 })
            .options(IndexOptions::builder().name("user_id".to_string()).build())
            .build();

        self.attempts.create_index(attempt_id_index).await?;
        self.attempts.create_index(attempt_user_index).await?;

        let answer_id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        let answer_attempt_question_index = IndexModel::builder()
            .keys(doc! { "attempt_id": 1, "question_id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("attempt_question_unique".to_string())
                    .build(),
            )
            .build();

        self.answers.create_index(answer_id_index).await?;
        self.answers.create_index(answer_attempt_question_index).await?;

        Ok(())
    }
}

#[async_trait]
impl AttemptRepository for MongoAttemptRepository {
    async fn create(&self, attempt: QuizAttempt) -> AppResult<QuizAttempt> {
        self.attempts.insert_one(&attempt).await?;
        Ok(attempt)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<QuizAttempt>> {
        let attempt = self.attempts.find_one(doc! { "id": id }).await?;
        Ok(attempt)
    }

    async fn record_answer(&self, answer: UserAnswer) -> AppResult<UserAnswer> {
        match self.answers.insert_one(&answer).await {
            Ok(_) => Ok(answer),
            Err(err) if is_duplicate_key(&err) => Err(AppError::AlreadyAnswered(format!(
                "Question '{}' was already answered in attempt '{}'",
                answer.question_id, answer.attempt_id
            ))),
            Err(err) => Err(err.into()),
        }
    }

    async fn answers_for_attempt(&self, attempt_id: &str) -> AppResult<Vec<UserAnswer>> {
        let answers = self
            .answers
            .find(doc! { "attempt_id": attempt_id })
            .sort(doc! { "answered_at": 1 })
            .await?
            .try_collect()
            .await?;
        Ok(answers)
    }

    async fn complete(
        &self,
        attempt_id: &str,
        completion: AttemptCompletion,
    ) -> AppResult<Option<QuizAttempt>> {
        let mut set_doc = mongodb::bson::to_document(&completion)?;
        set_doc.insert("status", AttemptStatus::Completed.as_str());

        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        let updated = self
            .attempts
            .find_one_and_update(
                doc! { "id": attempt_id, "status": AttemptStatus::InProgress.as_str() },
                doc! { "$set": set_doc },
            )
            .with_options(options)
            .await?;

        Ok(updated)
    }

    async fn find_by_user(
        &self,
        user_id: &str,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<QuizAttempt>, i64)> {
        let filter = doc! { "user_id": user_id };

        let total = self.attempts.count_documents(filter.clone()).await?;

        let attempts = self
            .attempts
            .find(filter)
            .skip(offset as u64)
            .limit(limit)
            .sort(doc! { "started_at": -1 })
            .await?
            .try_collect()
            .await?;

        Ok((attempts, total as i64))
    }
}
