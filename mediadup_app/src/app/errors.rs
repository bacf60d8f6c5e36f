use thiserror::Error;

/// Top-level errors the orchestrator can fail with. Maps 1:1 onto the CLI's
/// exit codes (0 success / 3 partial failure are decided by
/// [`super::orchestrator::RunOutcome`], not this enum): a bad flag or flag
/// combination never starts any work (`Configuration`); anything else that
/// stops the whole run before a result can be assembled is `Unexpected`.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Configuration(_) => 2,
            AppError::Unexpected(_) => 1,
        }
    }
}

impl From<mediadup_core::Error> for AppError {
    fn from(e: mediadup_core::Error) -> Self {
        AppError::Unexpected(e.to_string())
    }
}

impl From<mediadup_cache::FsCacheErrorKind> for AppError {
    fn from(e: mediadup_cache::FsCacheErrorKind) -> Self {
        AppError::Unexpected(e.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::Unexpected(e.to_string())
    }
}
