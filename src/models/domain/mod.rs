pub mod attempt;
pub mod certificate;
pub mod question;
pub mod user;

pub use attempt::{AttemptCompletion, AttemptStatus, QuizAttempt, UserAnswer};
pub use certificate::{Certificate, CertificateStatus};
pub use question::{AnswerOption, Category, Question};
pub use user::User;
