//! # keysuggest
//!
//! Suggestion engine for a mobile on-screen keyboard.
//!
//! Given the text being typed (the *composing* fragment) and the last two
//! committed words, the engine returns a ranked, deduplicated, case-matched
//! list of completions and corrections, one computation per keystroke.
//! Candidates come from five sources (the fuzzy-searched vocabulary trie,
//! trigram next-word prediction, numeric renderings, keystroke shortcuts,
//! and contact names), merged under a single total order with an optional
//! auto-commit default.
//!
//! Rapid re-invocation is the normal case: every new request synchronously
//! expires the previous one, superseded computations abort at their next
//! cancellation check, and results are delivered through a single-consumer
//! sink that drops anything stale.
//!
//! ## Example
//!
//! ```rust,ignore
//! use keysuggest::prelude::*;
//! use std::sync::Arc;
//!
//! let words = MemoryWordStore::with_words([("the", 5000), ("they", 900)]);
//! let suggestor = Suggestor::builder()
//!     .word_store(Arc::new(words))
//!     .build();
//! suggestor.load_now();
//!
//! let result = suggestor
//!     .find_suggestions(TypingContext::composing("teh"))
//!     .unwrap();
//! assert_eq!(result.default_suggestion().unwrap().word(), "the");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod casing;
pub mod collate;
pub mod config;
pub mod dictionary;
pub mod distance;
pub mod engine;
pub mod error;
pub mod search;
pub mod store;
pub mod suggest;
pub mod trie;

/// Common imports for convenient usage.
pub mod prelude {
    pub use crate::collate::{
        AccentFolding, CaseInsensitive, KeyCollator, KeyboardAdjacency, LanguageRules,
        NoAdjacency, QwertyLayout,
    };
    pub use crate::config::SuggestorConfig;
    pub use crate::dictionary::{
        ContactsProvider, Dictionary, LanguageDictionary, LearningDictionary,
        LookAheadDictionary, NumberDictionary, ShortcutDictionary,
    };
    pub use crate::distance::{max_edit_distance, EditCosts};
    pub use crate::engine::{FinalSuggestions, Suggestor, SuggestorBuilder};
    pub use crate::error::{StoreError, SuggestError};
    pub use crate::store::{
        MemoryNgramStore, MemoryWordStore, NgramRecord, NgramStore, WordStore,
    };
    pub use crate::suggest::{Suggestion, SuggestionKind, TypingContext};
}
