use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct StartQuizRequest {
    #[validate(length(min = 1))]
    pub user_id: String,

    #[validate(range(min = 1))]
    pub total_questions: i32,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubmitAnswerRequest {
    #[validate(length(min = 1))]
    pub attempt_id: String,

    #[validate(length(min = 1))]
    pub question_id: String,

    #[validate(length(min = 1))]
    pub selected_option_id: String,

    #[validate(range(min = 0))]
    pub time_spent_seconds: i64,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct FinishQuizRequest {
    #[validate(length(min = 1))]
    pub attempt_id: String,

    #[validate(range(min = 0))]
    pub total_time_seconds: i64,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct GenerateCertificateRequest {
    #[validate(length(min = 1))]
    pub attempt_id: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RevokeCertificateRequest {
    #[validate(length(min = 1, max = 500))]
    pub reason: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCategoryRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,

    #[validate(length(max = 500))]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateQuestionRequest {
    #[validate(length(min = 1))]
    pub category_id: String,

    #[validate(length(min = 1, max = 1000))]
    pub text: String,

    #[validate(range(min = 1, max = 5))]
    pub difficulty: i16,

    #[validate(range(min = 1))]
    pub points: i16,

    #[validate(length(max = 2000))]
    pub explanation: Option<String>,

    #[validate(length(min = 2, max = 8))]
    #[validate(nested)]
    pub options: Vec<NewAnswerOption>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct NewAnswerOption {
    #[validate(length(min = 1, max = 500))]
    pub text: String,

    pub is_correct: bool,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PaginationParams {
    #[validate(range(min = 0))]
    pub offset: Option<i64>,

    #[validate(range(min = 1, max = 100))]
    pub limit: Option<i64>,
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            offset: Some(0),
            limit: Some(20),
        }
    }
}

impl PaginationParams {
    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0)
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(20).min(100)
    }
}
