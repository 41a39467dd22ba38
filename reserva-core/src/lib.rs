pub mod media;
pub mod repository;
pub mod user;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    ValidationError(String),
    #[error("Internal service error: {0}")]
    InternalError(String),
    #[error("Media store rejected upload: {0}")]
    MediaError(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
