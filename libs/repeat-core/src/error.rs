//! Error types for repeat-core.

use thiserror::Error;

/// Result type alias using EngineError.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Boxed error raised by a store implementation.
pub type StorageSource = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised by repeat-session operations.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("language {0} not found")]
    LanguageNotFound(i64),

    #[error("no matching category found")]
    CategoryNotFound,

    #[error("no repeat session for language {0}")]
    SessionNotFound(i64),

    #[error("word {0} not found")]
    WordNotFound(i64),

    #[error("word {0} is not part of the repeat session")]
    WordNotInSession(i64),

    #[error("no more words to repeat")]
    NoMoreWords,

    #[error("no words available for the repeat session")]
    NoEligibleWords,

    #[error("a repeat session already exists for language {0}")]
    SessionAlreadyExists(i64),

    #[error("invalid input: {0}")]
    Validation(String),

    #[error("access to language {0} denied")]
    AccessDenied(i64),

    #[error("storage error: {0}")]
    Storage(#[source] StorageSource),
}

impl EngineError {
    /// Wrap a store-specific error.
    pub fn storage(err: impl Into<StorageSource>) -> Self {
        Self::Storage(err.into())
    }

    /// Whether the error belongs to the not-found class.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::LanguageNotFound(_)
                | Self::CategoryNotFound
                | Self::SessionNotFound(_)
                | Self::WordNotFound(_)
                | Self::WordNotInSession(_)
                | Self::NoMoreWords
                | Self::NoEligibleWords
        )
    }
}
