#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::SecretString;
use tokio::sync::RwLock;

use dengue_watch_server::{
    errors::{AppError, AppResult},
    models::domain::{
        AnswerOption, AttemptCompletion, AttemptStatus, Category, Certificate, CertificateStatus,
        Question, QuizAttempt, User, UserAnswer,
    },
    models::dto::response::AttemptResult,
    repositories::{
        AttemptRepository, BlobStore, CertificateRepository, QuestionBankRepository,
        UserRepository,
    },
    services::{
        pdf_renderer::{CertificatePdfData, CertificatePdfRenderer},
        AttemptService, CertificateService, QuizSettings,
    },
};

pub struct InMemoryQuestionBank {
    categories: RwLock<Vec<Category>>,
}

impl InMemoryQuestionBank {
    pub fn new(categories: Vec<Category>) -> Self {
        Self {
            categories: RwLock::new(categories),
        }
    }

    pub async fn category_of(&self, question_id: &str) -> Option<String> {
        let categories = self.categories.read().await;
        categories
            .iter()
            .find(|c| c.questions.iter().any(|q| q.id == question_id))
            .map(|c| c.id.clone())
    }
}

#[async_trait]
impl QuestionBankRepository for InMemoryQuestionBank {
    async fn active_categories(&self) -> AppResult<Vec<Category>> {
        let categories = self.categories.read().await;
        let mut active: Vec<Category> = categories
            .iter()
            .filter(|c| c.is_active)
            .cloned()
            .collect();
        for category in &mut active {
            category.questions.retain(|q| q.is_active);
        }
        Ok(active)
    }

    async fn find_question(&self, question_id: &str) -> AppResult<Option<Question>> {
        let categories = self.categories.read().await;
        Ok(categories
            .iter()
            .flat_map(|c| c.questions.iter())
            .find(|q| q.id == question_id)
            .cloned())
    }

    async fn find_questions(&self, question_ids: &[String]) -> AppResult<Vec<Question>> {
        let categories = self.categories.read().await;
        Ok(categories
            .iter()
            .flat_map(|c| c.questions.iter())
            .filter(|q| question_ids.contains(&q.id))
            .cloned()
            .collect())
    }

    async fn insert_category(&self, category: Category) -> AppResult<Category> {
        let mut categories = self.categories.write().await;
        categories.push(category.clone());
        Ok(category)
    }

    async fn add_question(&self, category_id: &str, question: Question) -> AppResult<Question> {
        let mut categories = self.categories.write().await;
        let category = categories
            .iter_mut()
            .find(|c| c.id == category_id)
            .ok_or_else(|| {
                AppError::NotFound(format!("Category with id '{}' not found", category_id))
            })?;
        category.questions.push(question.clone());
        Ok(question)
    }
}

pub struct InMemoryAttemptRepository {
    attempts: RwLock<HashMap<String, QuizAttempt>>,
    answers: RwLock<Vec<UserAnswer>>,
}

impl InMemoryAttemptRepository {
    pub fn new() -> Self {
        Self {
            attempts: RwLock::new(HashMap::new()),
            answers: RwLock::new(Vec::new()),
        }
    }
}

#[async_trait]
impl AttemptRepository for InMemoryAttemptRepository {
    async fn create(&self, attempt: QuizAttempt) -> AppResult<QuizAttempt> {
        let mut attempts = self.attempts.write().await;
        attempts.insert(attempt.id.clone(), attempt.clone());
        Ok(attempt)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<QuizAttempt>> {
        let attempts = self.attempts.read().await;
        Ok(attempts.get(id).cloned())
    }

    async fn record_answer(&self, answer: UserAnswer) -> AppResult<UserAnswer> {
        let mut answers = self.answers.write().await;
        let duplicate = answers
            .iter()
            .any(|a| a.attempt_id == answer.attempt_id && a.question_id == answer.question_id);
        if duplicate {
            return Err(AppError::AlreadyAnswered(format!(
                "Question '{}' was already answered in attempt '{}'",
                answer.question_id, answer.attempt_id
            )));
        }
        answers.push(answer.clone());
        Ok(answer)
    }

    async fn answers_for_attempt(&self, attempt_id: &str) -> AppResult<Vec<UserAnswer>> {
        let answers = self.answers.read().await;
        Ok(answers
            .iter()
            .filter(|a| a.attempt_id == attempt_id)
            .cloned()
            .collect())
    }

    async fn complete(
        &self,
        attempt_id: &str,
        completion: AttemptCompletion,
    ) -> AppResult<Option<QuizAttempt>> {
        let mut attempts = self.attempts.write().await;
        let Some(attempt) = attempts.get_mut(attempt_id) else {
            return Ok(None);
        };
        if attempt.status != AttemptStatus::InProgress {
            return Ok(None);
        }

        attempt.status = AttemptStatus::Completed;
        attempt.completed_at = Some(completion.completed_at);
        attempt.score = Some(completion.score);
        attempt.correct_answers = Some(completion.correct_answers);
        attempt.incorrect_answers = Some(completion.incorrect_answers);
        attempt.total_time_seconds = Some(completion.total_time_seconds);

        Ok(Some(attempt.clone()))
    }

    async fn find_by_user(
        &self,
        user_id: &str,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<QuizAttempt>, i64)> {
        let attempts = self.attempts.read().await;
        let mut items: Vec<_> = attempts
            .values()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| b.started_at.cmp(&a.started_at));

        let total = items.len() as i64;
        let start = offset.max(0) as usize;
        let end = (start + limit.max(0) as usize).min(items.len());

        let page = if start >= items.len() {
            vec![]
        } else {
            items[start..end].to_vec()
        };

        Ok((page, total))
    }
}

pub struct InMemoryUserRepository {
    users: RwLock<HashMap<String, User>>,
}

impl InMemoryUserRepository {
    pub fn new(users: Vec<User>) -> Self {
        Self {
            users: RwLock::new(users.into_iter().map(|u| (u.id.clone(), u)).collect()),
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(id).cloned())
    }

    async fn exists(&self, id: &str) -> AppResult<bool> {
        let users = self.users.read().await;
        Ok(users.contains_key(id))
    }
}

pub struct InMemoryCertificateRepository {
    certificates: RwLock<HashMap<String, Certificate>>,
    fail_inserts: AtomicBool,
}

impl InMemoryCertificateRepository {
    pub fn new() -> Self {
        Self {
            certificates: RwLock::new(HashMap::new()),
            fail_inserts: AtomicBool::new(false),
        }
    }

    pub fn fail_inserts(&self, fail: bool) {
        self.fail_inserts.store(fail, Ordering::SeqCst);
    }

    pub async fn active_count_for_user(&self, user_id: &str) -> usize {
        let certificates = self.certificates.read().await;
        certificates
            .values()
            .filter(|c| c.user_id == user_id && c.status == CertificateStatus::Active)
            .count()
    }

    pub async fn get(&self, id: &str) -> Option<Certificate> {
        let certificates = self.certificates.read().await;
        certificates.get(id).cloned()
    }
}

#[async_trait]
impl CertificateRepository for InMemoryCertificateRepository {
    async fn insert(&self, certificate: Certificate) -> AppResult<Certificate> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(AppError::DatabaseError("insert failed".to_string()));
        }

        let mut certificates = self.certificates.write().await;
        let already_active = certificates
            .values()
            .any(|c| c.user_id == certificate.user_id && c.status == CertificateStatus::Active);
        if already_active {
            return Err(AppError::Conflict(format!(
                "User '{}' already holds an active certificate",
                certificate.user_id
            )));
        }

        certificates.insert(certificate.id.clone(), certificate.clone());
        Ok(certificate)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Certificate>> {
        let certificates = self.certificates.read().await;
        Ok(certificates.get(id).cloned())
    }

    async fn find_by_code(&self, code: &str) -> AppResult<Option<Certificate>> {
        let certificates = self.certificates.read().await;
        Ok(certificates
            .values()
            .find(|c| c.verification_code == code)
            .cloned())
    }

    async fn find_active_by_user(&self, user_id: &str) -> AppResult<Option<Certificate>> {
        let certificates = self.certificates.read().await;
        Ok(certificates
            .values()
            .find(|c| c.user_id == user_id && c.status == CertificateStatus::Active)
            .cloned())
    }

    async fn mark_revoked(
        &self,
        id: &str,
        reason: &str,
        revoked_at: DateTime<Utc>,
    ) -> AppResult<Option<Certificate>> {
        let mut certificates = self.certificates.write().await;
        match certificates.get_mut(id) {
            Some(c) if c.status == CertificateStatus::Active => {
                c.status = CertificateStatus::Revoked;
                c.revoked_at = Some(revoked_at);
                c.revocation_reason = Some(reason.to_string());
                Ok(Some(c.clone()))
            }
            _ => Ok(None),
        }
    }
}

pub struct InMemoryBlobStore {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
    deleted: RwLock<Vec<String>>,
    next_id: RwLock<u64>,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self {
            blobs: RwLock::new(HashMap::new()),
            deleted: RwLock::new(Vec::new()),
            next_id: RwLock::new(0),
        }
    }

    pub async fn contains(&self, blob_id: &str) -> bool {
        self.blobs.read().await.contains_key(blob_id)
    }

    pub async fn len(&self) -> usize {
        self.blobs.read().await.len()
    }

    pub async fn deleted_ids(&self) -> Vec<String> {
        self.deleted.read().await.clone()
    }

    pub async fn remove(&self, blob_id: &str) {
        self.blobs.write().await.remove(blob_id);
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn put(&self, bytes: Vec<u8>, _filename: &str) -> AppResult<String> {
        let mut next_id = self.next_id.write().await;
        *next_id += 1;
        let id = format!("blob-{}", next_id);
        self.blobs.write().await.insert(id.clone(), bytes);
        Ok(id)
    }

    async fn get(&self, blob_id: &str) -> AppResult<Option<Vec<u8>>> {
        Ok(self.blobs.read().await.get(blob_id).cloned())
    }

    async fn delete(&self, blob_id: &str) -> AppResult<()> {
        self.blobs.write().await.remove(blob_id);
        self.deleted.write().await.push(blob_id.to_string());
        Ok(())
    }
}

pub struct StaticPdfRenderer;

#[async_trait]
impl CertificatePdfRenderer for StaticPdfRenderer {
    async fn render(&self, data: &CertificatePdfData) -> AppResult<Vec<u8>> {
        Ok(format!("%PDF-1.4 certificate {}", data.verification_code).into_bytes())
    }
}

pub fn make_question(text: &str, correct_index: usize) -> Question {
    let options = vec![
        AnswerOption::new("Standing water in containers", 0, correct_index == 0),
        AnswerOption::new("Fast-flowing rivers", 1, correct_index == 1),
        AnswerOption::new("Salt water pools", 2, correct_index == 2),
    ];

    Question::new(
        text,
        1,
        10,
        Some("Aedes aegypti breeds in clean standing water.".to_string()),
        options,
    )
    .expect("fixture question is valid")
}

pub fn make_category(name: &str, question_count: usize) -> Category {
    let mut category = Category::new(name, None);
    category.questions = (0..question_count)
        .map(|i| make_question(&format!("{} question {}", name, i), i % 3))
        .collect();
    category
}

pub fn make_user(id: &str, name: &str) -> User {
    User {
        id: id.to_string(),
        name: name.to_string(),
        email: format!("{}@example.com", id),
        created_at: Some(Utc::now()),
    }
}

pub struct TestHarness {
    pub bank: Arc<InMemoryQuestionBank>,
    pub attempts: Arc<InMemoryAttemptRepository>,
    pub users: Arc<InMemoryUserRepository>,
    pub certificates: Arc<InMemoryCertificateRepository>,
    pub blobs: Arc<InMemoryBlobStore>,
    pub attempt_service: AttemptService,
    pub certificate_service: CertificateService,
}

pub fn harness_with(categories: Vec<Category>, users: Vec<User>) -> TestHarness {
    let settings = QuizSettings {
        passing_score: 80.0,
        max_questions_per_attempt: 50,
    };

    let bank = Arc::new(InMemoryQuestionBank::new(categories));
    let attempts = Arc::new(InMemoryAttemptRepository::new());
    let users = Arc::new(InMemoryUserRepository::new(users));
    let certificates = Arc::new(InMemoryCertificateRepository::new());
    let blobs = Arc::new(InMemoryBlobStore::new());

    let attempt_service = AttemptService::new(
        bank.clone(),
        attempts.clone(),
        users.clone(),
        settings,
    );
    let certificate_service = CertificateService::new(
        certificates.clone(),
        attempts.clone(),
        users.clone(),
        Arc::new(StaticPdfRenderer),
        blobs.clone(),
        settings,
        SecretString::from("test_certificate_salt".to_string()),
    );

    TestHarness {
        bank,
        attempts,
        users,
        certificates,
        blobs,
        attempt_service,
        certificate_service,
    }
}

/// Default harness: two categories of five questions each, one known user.
pub fn harness() -> TestHarness {
    harness_with(
        vec![
            make_category("Prevention", 5),
            make_category("Symptoms", 5),
        ],
        vec![make_user("user-1", "Maria Silva")],
    )
}

pub async fn correct_option_id(bank: &InMemoryQuestionBank, question_id: &str) -> String {
    let question = bank
        .find_question(question_id)
        .await
        .expect("bank lookup works")
        .expect("question exists");
    question
        .correct_option()
        .expect("question has a correct option")
        .id
        .clone()
}

pub async fn wrong_option_id(bank: &InMemoryQuestionBank, question_id: &str) -> String {
    let question = bank
        .find_question(question_id)
        .await
        .expect("bank lookup works")
        .expect("question exists");
    question
        .options
        .iter()
        .find(|o| !o.is_correct)
        .expect("question has a wrong option")
        .id
        .clone()
}

/// Runs a whole quiz for the user: starts an attempt over `total`
/// questions, answers `correct` of them correctly and the rest wrong,
/// then finishes with a fixed total time of 120 seconds.
pub async fn run_quiz(
    harness: &TestHarness,
    user_id: &str,
    total: i32,
    correct: usize,
) -> AttemptResult {
    let started = harness
        .attempt_service
        .start(user_id, total)
        .await
        .expect("quiz starts");

    for (index, question) in started.questions.iter().enumerate() {
        let option_id = if index < correct {
            correct_option_id(&harness.bank, &question.id).await
        } else {
            wrong_option_id(&harness.bank, &question.id).await
        };

        harness
            .attempt_service
            .submit_answer(&started.attempt_id, &question.id, &option_id, 10)
            .await
            .expect("answer is recorded");
    }

    harness
        .attempt_service
        .finish(&started.attempt_id, 120)
        .await
        .expect("quiz finishes")
}
