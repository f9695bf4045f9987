pub mod certificate_handler;
pub mod health_handler;
pub mod quiz_handler;

pub use certificate_handler::{
    download_certificate, generate_certificate, revoke_certificate, user_certificate,
    verify_certificate,
};
pub use health_handler::{health_check, health_check_live, health_check_ready};
pub use quiz_handler::{
    create_category, create_question, finish_quiz, list_categories, quiz_result, start_quiz,
    submit_answer, user_attempts,
};
