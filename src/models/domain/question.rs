use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};

/// A quiz category. Questions are embedded in the category document.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub is_active: bool,
    pub questions: Vec<Question>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Category {
    pub fn new(name: &str, description: Option<String>) -> Self {
        Category {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            description,
            is_active: true,
            questions: Vec::new(),
            created_at: Some(Utc::now()),
        }
    }

    pub fn active_questions(&self) -> impl Iterator<Item = &Question> {
        self.questions.iter().filter(|q| q.is_active)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Question {
    pub id: String,
    pub text: String,
    pub difficulty: i16,
    pub points: i16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    pub is_active: bool,
    pub options: Vec<AnswerOption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Question {
    /// Builds a question, enforcing that the option set carries exactly one
    /// correct answer and at least two options overall.
    pub fn new(
        text: &str,
        difficulty: i16,
        points: i16,
        explanation: Option<String>,
        options: Vec<AnswerOption>,
    ) -> AppResult<Self> {
        if options.len() < 2 {
            return Err(AppError::ValidationError(
                "A question needs at least two answer options".to_string(),
            ));
        }

        let correct_count = options.iter().filter(|o| o.is_correct).count();
        if correct_count != 1 {
            return Err(AppError::ValidationError(format!(
                "A question must have exactly one correct option, got {}",
                correct_count
            )));
        }

        Ok(Question {
            id: Uuid::new_v4().to_string(),
            text: text.to_string(),
            difficulty,
            points,
            explanation,
            is_active: true,
            options,
            created_at: Some(Utc::now()),
        })
    }

    pub fn correct_option(&self) -> Option<&AnswerOption> {
        self.options.iter().find(|o| o.is_correct)
    }

    pub fn option_by_id(&self, option_id: &str) -> Option<&AnswerOption> {
        self.options.iter().find(|o| o.id == option_id)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct AnswerOption {
    pub id: String,
    pub text: String,
    pub display_order: i16,
    pub is_correct: bool,
}

impl AnswerOption {
    pub fn new(text: &str, display_order: i16, is_correct: bool) -> Self {
        AnswerOption {
            id: Uuid::new_v4().to_string(),
            text: text.to_string(),
            display_order,
            is_correct,
        }
    }
}
