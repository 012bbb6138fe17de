//! Error types for the suggestion engine.

use thiserror::Error;

/// Errors raised while computing suggestions.
///
/// The only variant, [`SuggestError::Expired`], is an internal control
/// signal: a newer request superseded the one being computed, so the
/// computation must stop without producing a partial result. It is never
/// surfaced to the keyboard user.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SuggestError {
    /// The request was superseded by a newer keystroke before the
    /// computation finished.
    #[error("suggestion request superseded")]
    Expired,
}

/// A specialized `Result` type for suggestion computations.
pub type Result<T> = std::result::Result<T, SuggestError>;

/// Failure reported by a persistent word or n-gram store.
///
/// Store failures are never fatal: the in-memory dictionaries remain
/// authoritative for the session, so callers log the error and continue.
#[derive(Debug, Error)]
#[error("persistent store operation failed: {0}")]
pub struct StoreError(Box<dyn std::error::Error + Send + Sync>);

impl StoreError {
    /// Wrap any error as a store failure.
    pub fn new<E>(error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        StoreError(error.into())
    }

    /// Create a store failure from a plain message.
    pub fn msg(message: impl Into<String>) -> Self {
        StoreError(message.into().into())
    }
}
