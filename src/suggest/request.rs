//! Suggestion requests and their cancellation protocol.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{Result, SuggestError};

/// Cancellation flag shared between a request and its computation.
///
/// The flag is monotonic: it starts unset and can only ever be set, at most
/// once, when a newer request supersedes this one. The fuzzy walker checks
/// it on every node visit and the merge pipeline between phases, so an
/// expired computation stops within a bounded amount of work.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    expired: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a live token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the token expired. Idempotent.
    pub fn expire(&self) {
        self.expired.store(true, Ordering::Release);
    }

    /// True once [`expire`](Self::expire) has been called.
    pub fn is_expired(&self) -> bool {
        self.expired.load(Ordering::Acquire)
    }

    /// Fail with [`SuggestError::Expired`] if the token has been expired.
    pub fn check(&self) -> Result<()> {
        if self.is_expired() {
            Err(SuggestError::Expired)
        } else {
            Ok(())
        }
    }
}

/// What the user is typing: the active fragment and its surroundings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypingContext {
    /// Text typed since the last commit or separator.
    pub composing: String,
    /// The committed word immediately before the composing text.
    pub last_word: String,
    /// The committed word before `last_word`.
    pub second_last_word: String,
    /// Whether shift is active. Only consulted when `composing` is empty.
    pub shift: bool,
    /// Whether caps lock is active. Only consulted when `composing` is
    /// empty.
    pub caps_lock: bool,
}

impl TypingContext {
    /// Context for a bare composing fragment with no history or key state.
    pub fn composing(composing: impl Into<String>) -> Self {
        TypingContext {
            composing: composing.into(),
            ..TypingContext::default()
        }
    }
}

/// One suggestion computation, issued per keystroke.
///
/// At most one request per suggestor is live at a time; creating a new one
/// expires the previous request before the new computation starts.
#[derive(Debug, Clone)]
pub struct SuggestionsRequest {
    context: TypingContext,
    token: CancelToken,
}

impl SuggestionsRequest {
    /// Create a live request for the given typing context.
    pub fn new(context: TypingContext) -> Self {
        SuggestionsRequest {
            context,
            token: CancelToken::new(),
        }
    }

    /// The composing fragment this request is matching.
    pub fn composing(&self) -> &str {
        &self.context.composing
    }

    /// The full typing context.
    pub fn context(&self) -> &TypingContext {
        &self.context
    }

    /// The cancellation token tied to this request.
    pub fn token(&self) -> &CancelToken {
        &self.token
    }

    /// True once a newer request has superseded this one.
    pub fn is_expired(&self) -> bool {
        self.token.is_expired()
    }
}
