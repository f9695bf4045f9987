use std::sync::Arc;

use crate::{
    errors::AppResult,
    models::domain::{AnswerOption, Category, Question},
    models::dto::request::{CreateCategoryRequest, CreateQuestionRequest},
    models::dto::response::CategoryView,
    repositories::QuestionBankRepository,
};

/// Content-administration side of the question bank. The attempt engine
/// only ever reads from the repository; intake goes through here so the
/// exactly-one-correct-option invariant is enforced on every question
/// that enters the bank.
pub struct QuestionBankService {
    questions: Arc<dyn QuestionBankRepository>,
}

impl QuestionBankService {
    pub fn new(questions: Arc<dyn QuestionBankRepository>) -> Self {
        Self { questions }
    }

    pub async fn active_categories(&self) -> AppResult<Vec<CategoryView>> {
        let categories = self.questions.active_categories().await?;
        Ok(categories.into_iter().map(CategoryView::from).collect())
    }

    pub async fn create_category(&self, request: CreateCategoryRequest) -> AppResult<Category> {
        let category = Category::new(&request.name, request.description);
        self.questions.insert_category(category).await
    }

    pub async fn create_question(&self, request: CreateQuestionRequest) -> AppResult<Question> {
        let options = request
            .options
            .iter()
            .enumerate()
            .map(|(order, option)| AnswerOption::new(&option.text, order as i16, option.is_correct))
            .collect();

        let question = Question::new(
            &request.text,
            request.difficulty,
            request.points,
            request.explanation,
            options,
        )?;

        self.questions
            .add_question(&request.category_id, question)
            .await
    }
}
