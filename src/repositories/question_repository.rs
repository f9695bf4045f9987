use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{bson::doc, options::IndexOptions, Collection, IndexModel};

use crate::{
    db::Database,
    errors::{AppError, AppResult},
    models::domain::{Category, Question},
};

/// Read side of the question bank as the attempt engine sees it, plus the
/// intake operations used by content administrators. Lookups signal
/// absence by returning `None`, never by erroring.
#[async_trait]
pub trait QuestionBankRepository: Send + Sync {
    /// Active categories with their active questions embedded.
    async fn active_categories(&self) -> AppResult<Vec<Category>>;
    async fn find_question(&self, question_id: &str) -> AppResult<Option<Question>>;
    async fn find_questions(&self, question_ids: &[String]) -> AppResult<Vec<Question>>;
    async fn insert_category(&self, category: Category) -> AppResult<Category>;
    async fn add_question(&self, category_id: &str, question: Question) -> AppResult<Question>;
}

pub struct MongoQuestionBankRepository {
    collection: Collection<Category>,
}

impl MongoQuestionBankRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection("quiz_categories");
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for quiz_categories collection");

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        let question_id_index = IndexModel::builder()
            .keys(doc! { "questions.id": 1 })
            .options(
                IndexOptions::builder()
                    .name("question_id".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(id_index).await?;
        self.collection.create_index(question_id_index).await?;

        Ok(())
    }
}

#[async_trait]
impl QuestionBankRepository for MongoQuestionBankRepository {
    async fn active_categories(&self) -> AppResult<Vec<Category>> {
        let mut categories: Vec<Category> = self
            .collection
            .find(doc! { "is_active": true })
            .await?
            .try_collect()
            .await?;

        for category in &mut categories {
            category.questions.retain(|q| q.is_active);
        }

        Ok(categories)
    }

    async fn find_question(&self, question_id: &str) -> AppResult<Option<Question>> {
        let category = self
            .collection
            .find_one(doc! { "questions.id": question_id })
            .await?;

        Ok(category.and_then(|c| c.questions.into_iter().find(|q| q.id == question_id)))
    }

    async fn find_questions(&self, question_ids: &[String]) -> AppResult<Vec<Question>> {
        if question_ids.is_empty() {
            return Ok(Vec::new());
        }

        let categories: Vec<Category> = self
            .collection
            .find(doc! { "questions.id": { "$in": question_ids.to_vec() } })
            .await?
            .try_collect()
            .await?;

        let questions = categories
            .into_iter()
            .flat_map(|c| c.questions)
            .filter(|q| question_ids.contains(&q.id))
            .collect();

        Ok(questions)
    }

    async fn insert_category(&self, category: Category) -> AppResult<Category> {
        self.collection.insert_one(&category).await?;
        Ok(category)
    }

    async fn add_question(&self, category_id: &str, question: Question) -> AppResult<Question> {
        let question_doc = mongodb::bson::to_document(&question)?;

        let result = self
            .collection
            .update_one(
                doc! { "id": category_id },
                doc! { "$push": { "questions": question_doc } },
            )
            .await?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound(format!(
                "Category with id '{}' not found",
                category_id
            )));
        }

        Ok(question)
    }
}
