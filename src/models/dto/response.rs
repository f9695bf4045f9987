use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::domain::{
    AttemptStatus, Certificate, CertificateStatus, Category, Question, QuizAttempt, User,
};

/// Public projection of an answer option: correctness is stripped.
#[derive(Debug, Clone, Serialize)]
pub struct AnswerOptionPublicView {
    pub id: String,
    pub text: String,
    pub display_order: i16,
}

/// Public projection of a question, as returned when starting a quiz or
/// listing categories. Neither the answer key nor the explanation leaves
/// the server through this type.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionPublicView {
    pub id: String,
    pub text: String,
    pub difficulty: i16,
    pub points: i16,
    pub options: Vec<AnswerOptionPublicView>,
}

impl From<Question> for QuestionPublicView {
    fn from(question: Question) -> Self {
        QuestionPublicView {
            id: question.id,
            text: question.text,
            difficulty: question.difficulty,
            points: question.points,
            options: question
                .options
                .into_iter()
                .map(|o| AnswerOptionPublicView {
                    id: o.id,
                    text: o.text,
                    display_order: o.display_order,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryView {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub questions: Vec<QuestionPublicView>,
}

impl From<Category> for CategoryView {
    fn from(category: Category) -> Self {
        CategoryView {
            id: category.id,
            name: category.name,
            description: category.description,
            questions: category
                .questions
                .into_iter()
                .filter(|q| q.is_active)
                .map(QuestionPublicView::from)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StartQuizResponse {
    pub attempt_id: String,
    pub user_id: String,
    pub started_at: DateTime<Utc>,
    pub total_questions: i32,
    pub questions: Vec<QuestionPublicView>,
}

/// Post-submission feedback: the correct answer is revealed here, for the
/// one question that was just answered.
#[derive(Debug, Clone, Serialize)]
pub struct AnswerFeedback {
    pub question_id: String,
    pub is_correct: bool,
    pub correct_option_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

/// Full per-question detail, available once the attempt is completed.
#[derive(Debug, Clone, Serialize)]
pub struct AnswerDetail {
    pub question_id: String,
    pub question_text: String,
    pub selected_option_id: String,
    pub selected_option_text: String,
    pub correct_option_id: String,
    pub correct_option_text: String,
    pub is_correct: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    pub time_spent_seconds: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AttemptResult {
    pub attempt_id: String,
    pub user_id: String,
    pub status: AttemptStatus,
    pub total_questions: i32,
    pub correct_answers: i32,
    pub incorrect_answers: i32,
    pub score: f64,
    pub total_time_seconds: i64,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    pub passed: bool,
    pub can_generate_certificate: bool,
    pub answers: Vec<AnswerDetail>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AttemptSummary {
    pub id: String,
    pub status: AttemptStatus,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    pub total_questions: i32,
}

impl From<QuizAttempt> for AttemptSummary {
    fn from(attempt: QuizAttempt) -> Self {
        AttemptSummary {
            id: attempt.id,
            status: attempt.status,
            started_at: attempt.started_at,
            completed_at: attempt.completed_at,
            score: attempt.score,
            total_questions: attempt.total_questions,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Paged<T: Serialize> {
    pub items: Vec<T>,
    pub total: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CertificateView {
    pub id: String,
    pub verification_code: String,
    pub user_id: String,
    pub user_name: String,
    pub user_email: String,
    pub attempt_id: String,
    pub score: f64,
    pub issued_at: DateTime<Utc>,
    pub status: CertificateStatus,
    pub pdf_blob_id: String,
}

impl CertificateView {
    pub fn from_parts(certificate: Certificate, user: &User) -> Self {
        CertificateView {
            id: certificate.id,
            verification_code: certificate.verification_code,
            user_id: certificate.user_id,
            user_name: user.name.clone(),
            user_email: user.email.clone(),
            attempt_id: certificate.attempt_id,
            score: certificate.score,
            issued_at: certificate.issued_at,
            status: certificate.status,
            pdf_blob_id: certificate.pdf_blob_id,
        }
    }
}

/// Outcome of a public verification-code lookup. Never an error: unknown
/// and revoked codes both come back with `is_valid == false` and a message
/// saying which of the two it was.
#[derive(Debug, Clone, Serialize)]
pub struct CertificateVerification {
    pub is_valid: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<CertificateStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issued_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
}

impl CertificateVerification {
    pub fn invalid(message: &str) -> Self {
        CertificateVerification {
            is_valid: false,
            message: message.to_string(),
            verification_code: None,
            status: None,
            issued_at: None,
            score: None,
            user_name: None,
        }
    }

    pub fn revoked(certificate: &Certificate) -> Self {
        CertificateVerification {
            is_valid: false,
            message: "Certificate has been revoked".to_string(),
            verification_code: Some(certificate.verification_code.clone()),
            status: Some(certificate.status),
            issued_at: Some(certificate.issued_at),
            score: None,
            user_name: None,
        }
    }

    pub fn valid(certificate: &Certificate, user_name: Option<String>) -> Self {
        CertificateVerification {
            is_valid: true,
            message: "Certificate is valid".to_string(),
            verification_code: Some(certificate.verification_code.clone()),
            status: Some(certificate.status),
            issued_at: Some(certificate.issued_at),
            score: Some(certificate.score),
            user_name,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ApiMessage {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::domain::AnswerOption;
    use chrono::Utc;

    fn question_with_key() -> Question {
        Question::new(
            "Which mosquito transmits dengue?",
            1,
            10,
            Some("Aedes aegypti is the primary vector.".to_string()),
            vec![
                AnswerOption::new("Aedes aegypti", 0, true),
                AnswerOption::new("Anopheles gambiae", 1, false),
                AnswerOption::new("Culex pipiens", 2, false),
            ],
        )
        .expect("valid question")
    }

    #[test]
    fn public_view_strips_the_answer_key() {
        let question = question_with_key();
        let serialized = serde_json::to_string(&QuestionPublicView::from(question))
            .expect("view should serialize");

        assert!(!serialized.contains("is_correct"));
        assert!(!serialized.contains("explanation"));
        assert!(serialized.contains("Aedes aegypti"));
    }

    #[test]
    fn category_view_hides_inactive_questions() {
        let mut category = Category::new("Vector biology", None);
        let mut hidden = question_with_key();
        hidden.is_active = false;
        category.questions = vec![hidden, question_with_key()];

        let view = CategoryView::from(category);
        assert_eq!(view.questions.len(), 1);
    }

    #[test]
    fn verification_constructors_set_validity() {
        let cert = Certificate::issue(
            "user-1",
            "attempt-1",
            "CERT-0123456789ab-000042",
            88.0,
            "blob-1",
            Utc::now(),
        );

        let valid = CertificateVerification::valid(&cert, Some("Maria Silva".to_string()));
        assert!(valid.is_valid);
        assert_eq!(valid.score, Some(88.0));

        let mut revoked_cert = cert.clone();
        revoked_cert.status = CertificateStatus::Revoked;
        let revoked = CertificateVerification::revoked(&revoked_cert);
        assert!(!revoked.is_valid);
        assert_eq!(revoked.status, Some(CertificateStatus::Revoked));

        let unknown = CertificateVerification::invalid("No certificate found for this code");
        assert!(!unknown.is_valid);
        assert!(unknown.verification_code.is_none());
    }
}
