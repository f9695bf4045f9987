pub mod attempt_service;
pub mod certificate_service;
pub mod pdf_renderer;
pub mod question_bank_service;
pub mod scoring;

pub use attempt_service::AttemptService;
pub use certificate_service::CertificateService;
pub use pdf_renderer::{CertificatePdfData, CertificatePdfRenderer, HttpPdfRenderer};
pub use question_bank_service::QuestionBankService;
pub use scoring::QuizSettings;
