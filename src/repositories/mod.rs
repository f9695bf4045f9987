pub mod attempt_repository;
pub mod blob_store;
pub mod certificate_repository;
pub mod question_repository;
pub mod user_repository;

pub use attempt_repository::{AttemptRepository, MongoAttemptRepository};
pub use blob_store::{BlobStore, MongoBlobStore};
pub use certificate_repository::{CertificateRepository, MongoCertificateRepository};
pub use question_repository::{MongoQuestionBankRepository, QuestionBankRepository};
pub use user_repository::{MongoUserRepository, UserRepository};

/// True when a write failed against a unique index. The repositories map
/// this onto the domain error for the invariant the index enforces.
pub(crate) fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        mongodb::error::ErrorKind::Write(mongodb::error::WriteFailure::WriteError(write_err))
            if write_err.code == 11000
    )
}
