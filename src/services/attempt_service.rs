use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::{
    errors::{AppError, AppResult},
    models::domain::{AttemptCompletion, Category, Question, QuizAttempt, UserAnswer},
    models::dto::response::{
        AnswerDetail, AnswerFeedback, AttemptResult, AttemptSummary, Paged, QuestionPublicView,
        StartQuizResponse,
    },
    repositories::{AttemptRepository, QuestionBankRepository, UserRepository},
    services::scoring::{score_attempt, QuizSettings},
};

/// Owns the lifecycle of a quiz attempt: question selection at start,
/// answer intake, scoring and the Completed transition, result replay.
pub struct AttemptService {
    questions: Arc<dyn QuestionBankRepository>,
    attempts: Arc<dyn AttemptRepository>,
    users: Arc<dyn UserRepository>,
    settings: QuizSettings,
}

impl AttemptService {
    pub fn new(
        questions: Arc<dyn QuestionBankRepository>,
        attempts: Arc<dyn AttemptRepository>,
        users: Arc<dyn UserRepository>,
        settings: QuizSettings,
    ) -> Self {
        Self {
            questions,
            attempts,
            users,
            settings,
        }
    }

    /// Starts a new attempt for the user, drawing a category-balanced
    /// random selection. The returned questions carry no correctness
    /// information; the answer key only surfaces after each submission.
    pub async fn start(&self, user_id: &str, total_questions: i32) -> AppResult<StartQuizResponse> {
        if total_questions < 1 || total_questions > self.settings.max_questions_per_attempt {
            return Err(AppError::ValidationError(format!(
                "total_questions must be between 1 and {}",
                self.settings.max_questions_per_attempt
            )));
        }

        if !self.users.exists(user_id).await? {
            return Err(AppError::NotFound(format!(
                "User with id '{}' not found",
                user_id
            )));
        }

        let categories = self.questions.active_categories().await?;
        let selected = draw_questions(&categories, total_questions as usize, &mut rand::rng());

        if selected.is_empty() {
            return Err(AppError::NotFound(
                "No active questions available".to_string(),
            ));
        }

        let attempt = QuizAttempt::start(user_id, selected.len() as i32);
        let attempt = self.attempts.create(attempt).await?;

        Ok(StartQuizResponse {
            attempt_id: attempt.id,
            user_id: attempt.user_id,
            started_at: attempt.started_at,
            total_questions: attempt.total_questions,
            questions: selected.into_iter().map(QuestionPublicView::from).collect(),
        })
    }

    /// Records one answer. Correctness is computed here by comparing the
    /// selected option against the question's answer key; the client never
    /// supplies it. The correct option is revealed in the feedback.
    pub async fn submit_answer(
        &self,
        attempt_id: &str,
        question_id: &str,
        selected_option_id: &str,
        time_spent_seconds: i64,
    ) -> AppResult<AnswerFeedback> {
        let attempt = self
            .attempts
            .find_by_id(attempt_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Attempt with id '{}' not found", attempt_id)))?;

        if !attempt.is_in_progress() {
            return Err(AppError::InvalidState(format!(
                "Attempt '{}' is {} and no longer accepts answers",
                attempt_id,
                attempt.status.as_str()
            )));
        }

        let question = self
            .questions
            .find_question(question_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Question with id '{}' not found", question_id))
            })?;

        if question.option_by_id(selected_option_id).is_none() {
            return Err(AppError::ValidationError(format!(
                "Option '{}' does not belong to question '{}'",
                selected_option_id, question_id
            )));
        }

        let correct = question.correct_option().ok_or_else(|| {
            AppError::InternalError(format!(
                "Question '{}' has no correct option",
                question_id
            ))
        })?;

        let is_correct = selected_option_id == correct.id;
        let answer = UserAnswer::record(
            attempt_id,
            question_id,
            selected_option_id,
            is_correct,
            time_spent_seconds,
        );
        self.attempts.record_answer(answer).await?;

        Ok(AnswerFeedback {
            question_id: question.id.clone(),
            is_correct,
            correct_option_id: correct.id.clone(),
            explanation: question.explanation.clone(),
        })
    }

    /// Scores the attempt and applies the one allowed InProgress ->
    /// Completed transition. The transition is atomic at the storage
    /// layer, so finishing twice (or racing another finish) is rejected.
    pub async fn finish(&self, attempt_id: &str, total_time_seconds: i64) -> AppResult<AttemptResult> {
        let attempt = self
            .attempts
            .find_by_id(attempt_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Attempt with id '{}' not found", attempt_id)))?;

        if !attempt.is_in_progress() {
            return Err(AppError::InvalidState(format!(
                "Attempt '{}' is {} and cannot be finished",
                attempt_id,
                attempt.status.as_str()
            )));
        }

        let answers = self.attempts.answers_for_attempt(attempt_id).await?;
        let summary = score_attempt(attempt.total_questions, &answers);

        let completion = AttemptCompletion {
            completed_at: Utc::now(),
            score: summary.score,
            correct_answers: summary.correct,
            incorrect_answers: summary.incorrect,
            total_time_seconds,
        };

        let completed = self
            .attempts
            .complete(attempt_id, completion)
            .await?
            .ok_or_else(|| {
                AppError::InvalidState(format!(
                    "Attempt '{}' is no longer in progress",
                    attempt_id
                ))
            })?;

        self.build_result(completed, answers).await
    }

    /// Read-only replay of the finish payload for a completed attempt.
    pub async fn result(&self, attempt_id: &str) -> AppResult<AttemptResult> {
        let attempt = self
            .attempts
            .find_by_id(attempt_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Attempt with id '{}' not found", attempt_id)))?;

        if !attempt.is_completed() {
            return Err(AppError::InvalidState(format!(
                "Attempt '{}' has not been completed",
                attempt_id
            )));
        }

        let answers = self.attempts.answers_for_attempt(attempt_id).await?;
        self.build_result(attempt, answers).await
    }

    pub async fn attempts_for_user(
        &self,
        user_id: &str,
        offset: i64,
        limit: i64,
    ) -> AppResult<Paged<AttemptSummary>> {
        if !self.users.exists(user_id).await? {
            return Err(AppError::NotFound(format!(
                "User with id '{}' not found",
                user_id
            )));
        }

        let (attempts, total) = self.attempts.find_by_user(user_id, offset, limit).await?;

        Ok(Paged {
            items: attempts.into_iter().map(AttemptSummary::from).collect(),
            total,
        })
    }

    async fn build_result(
        &self,
        attempt: QuizAttempt,
        answers: Vec<UserAnswer>,
    ) -> AppResult<AttemptResult> {
        let question_ids: Vec<String> = answers.iter().map(|a| a.question_id.clone()).collect();
        let questions = self.questions.find_questions(&question_ids).await?;
        let questions_by_id: HashMap<&str, &Question> =
            questions.iter().map(|q| (q.id.as_str(), q)).collect();

        let details = answers
            .iter()
            .filter_map(|answer| {
                let Some(question) = questions_by_id.get(answer.question_id.as_str()) else {
                    // Questions are deactivated rather than deleted, so a
                    // missing one means the bank was edited out from under
                    // the attempt. Keep the result readable without it.
                    log::warn!(
                        "Question '{}' referenced by attempt '{}' no longer exists",
                        answer.question_id,
                        answer.attempt_id
                    );
                    return None;
                };

                let selected_text = question
                    .option_by_id(&answer.selected_option_id)
                    .map(|o| o.text.clone())
                    .unwrap_or_default();
                let (correct_id, correct_text) = question
                    .correct_option()
                    .map(|o| (o.id.clone(), o.text.clone()))
                    .unwrap_or_default();

                Some(AnswerDetail {
                    question_id: answer.question_id.clone(),
                    question_text: question.text.clone(),
                    selected_option_id: answer.selected_option_id.clone(),
                    selected_option_text: selected_text,
                    correct_option_id: correct_id,
                    correct_option_text: correct_text,
                    is_correct: answer.is_correct,
                    explanation: question.explanation.clone(),
                    time_spent_seconds: answer.time_spent_seconds,
                })
            })
            .collect();

        let score = attempt.score.unwrap_or(0.0);
        let passed = score >= self.settings.passing_score;

        Ok(AttemptResult {
            attempt_id: attempt.id,
            user_id: attempt.user_id,
            status: attempt.status,
            total_questions: attempt.total_questions,
            correct_answers: attempt.correct_answers.unwrap_or(0),
            incorrect_answers: attempt.incorrect_answers.unwrap_or(0),
            score,
            total_time_seconds: attempt.total_time_seconds.unwrap_or(0),
            started_at: attempt.started_at,
            completed_at: attempt.completed_at,
            passed,
            can_generate_certificate: passed,
            answers: details,
        })
    }
}

/// Draws `requested` questions, spreading the draw as evenly as possible
/// across the active categories: `max(1, requested / category_count)` per
/// category, then topping up from whatever remains, without duplicates.
/// Returns fewer than requested only when the bank itself is smaller.
pub(crate) fn draw_questions<R: Rng>(
    categories: &[Category],
    requested: usize,
    rng: &mut R,
) -> Vec<Question> {
    let mut per_category_pools: Vec<Vec<Question>> = categories
        .iter()
        .filter(|c| c.is_active)
        .map(|c| c.active_questions().cloned().collect::<Vec<_>>())
        .filter(|pool| !pool.is_empty())
        .collect();

    if per_category_pools.is_empty() || requested == 0 {
        return Vec::new();
    }

    let per_category = std::cmp::max(1, requested / per_category_pools.len());

    let mut selected = Vec::new();
    let mut remaining = Vec::new();
    for pool in &mut per_category_pools {
        pool.shuffle(rng);
        let take = per_category.min(pool.len());
        selected.extend(pool.drain(..take));
        remaining.append(pool);
    }

    if selected.len() < requested {
        remaining.shuffle(rng);
        let missing = requested - selected.len();
        selected.extend(remaining.into_iter().take(missing));
    }

    selected.shuffle(rng);
    selected.truncate(requested);
    selected
}
