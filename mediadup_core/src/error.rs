use std::path::PathBuf;

use thiserror::Error;

/// Structured context attached to every [`Error`]. Mirrors the fields the
/// filesystem cache and hash-creation error kinds elsewhere in this codebase
/// carry (path, operation name, underlying cause), but collapsed into one
/// shape shared by every error kind.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    pub path: Option<PathBuf>,
    pub operation: &'static str,
    pub tool: Option<&'static str>,
    pub cause: Option<String>,
}

impl ErrorContext {
    pub fn new(operation: &'static str) -> Self {
        Self {
            path: None,
            operation,
            tool: None,
            cause: None,
        }
    }

    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_tool(mut self, tool: &'static str) -> Self {
        self.tool = Some(tool);
        self
    }

    #[must_use]
    pub fn with_cause(mut self, cause: impl ToString) -> Self {
        self.cause = Some(cause.to_string());
        self
    }
}

impl std::fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.operation)?;
        if let Some(path) = &self.path {
            write!(f, " ({})", path.display())?;
        }
        if let Some(tool) = &self.tool {
            write!(f, " [{tool}]")?;
        }
        if let Some(cause) = &self.cause {
            write!(f, ": {cause}")?;
        }
        Ok(())
    }
}

/// The error taxonomy for the core. Every fallible operation in this crate
/// returns one of these seven kinds, never an opaque `Box<dyn Error>`.
#[derive(Error, Debug, Clone)]
pub enum Error {
    #[error("filesystem error: {0}")]
    FileSystem(ErrorContext),

    #[error("external tool error: {0}")]
    ExternalTool(ErrorContext),

    #[error("cache error: {0}")]
    Cache(ErrorContext),

    #[error("hashing error: {0}")]
    Hashing(ErrorContext),

    #[error("configuration error: {0}")]
    Configuration(ErrorContext),

    #[error("validation error: {0}")]
    Validation(ErrorContext),

    #[error("unknown error: {0}")]
    Unknown(ErrorContext),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn hashing(operation: &'static str, cause: impl ToString) -> Self {
        Self::Hashing(ErrorContext::new(operation).with_cause(cause))
    }

    pub fn validation(operation: &'static str, cause: impl ToString) -> Self {
        Self::Validation(ErrorContext::new(operation).with_cause(cause))
    }

    pub fn file_system(operation: &'static str, cause: impl ToString) -> Self {
        Self::FileSystem(ErrorContext::new(operation).with_cause(cause))
    }

    pub fn external_tool(operation: &'static str, tool: &'static str, cause: impl ToString) -> Self {
        Self::ExternalTool(ErrorContext::new(operation).with_tool(tool).with_cause(cause))
    }

    pub fn cache(operation: &'static str, cause: impl ToString) -> Self {
        Self::Cache(ErrorContext::new(operation).with_cause(cause))
    }

    pub fn configuration(operation: &'static str, cause: impl ToString) -> Self {
        Self::Configuration(ErrorContext::new(operation).with_cause(cause))
    }
}
