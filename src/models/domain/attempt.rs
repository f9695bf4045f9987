use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle of a quiz attempt. Completed and Abandoned are terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub enum AttemptStatus {
    InProgress,
    Completed,
    Abandoned,
}

impl AttemptStatus {
    /// String form used in database filters; must match the serde encoding.
    pub fn as_str(&self) -> &'static str {
        match self {
            AttemptStatus::InProgress => "InProgress",
            AttemptStatus::Completed => "Completed",
            AttemptStatus::Abandoned => "Abandoned",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct QuizAttempt {
    pub id: String,
    pub user_id: String,
    pub started_at: DateTime<Utc>,
    pub total_questions: i32,
    pub status: AttemptStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct_answers: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub incorrect_answers: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_time_seconds: Option<i64>,
}

impl QuizAttempt {
    pub fn start(user_id: &str, total_questions: i32) -> Self {
        QuizAttempt {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            started_at: Utc::now(),
            total_questions,
            status: AttemptStatus::InProgress,
            completed_at: None,
            score: None,
            correct_answers: None,
            incorrect_answers: None,
            total_time_seconds: None,
        }
    }

    pub fn is_in_progress(&self) -> bool {
        self.status == AttemptStatus::InProgress
    }

    pub fn is_completed(&self) -> bool {
        self.status == AttemptStatus::Completed
    }
}

/// One recorded answer; at most one may exist per (attempt, question).
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct UserAnswer {
    pub id: String,
    pub attempt_id: String,
    pub question_id: String,
    pub selected_option_id: String,
    pub is_correct: bool,
    pub time_spent_seconds: i64,
    pub answered_at: DateTime<Utc>,
}

impl UserAnswer {
    pub fn record(
        attempt_id: &str,
        question_id: &str,
        selected_option_id: &str,
        is_correct: bool,
        time_spent_seconds: i64,
    ) -> Self {
        UserAnswer {
            id: Uuid::new_v4().to_string(),
            attempt_id: attempt_id.to_string(),
            question_id: question_id.to_string(),
            selected_option_id: selected_option_id.to_string(),
            is_correct,
            time_spent_seconds,
            answered_at: Utc::now(),
        }
    }
}

/// Fields written by the one allowed InProgress -> Completed transition.
#[derive(Clone, Debug, Serialize)]
pub struct AttemptCompletion {
    pub completed_at: DateTime<Utc>,
    pub score: f64,
    pub correct_answers: i32,
    pub incorrect_answers: i32,
    pub total_time_seconds: i64,
}
