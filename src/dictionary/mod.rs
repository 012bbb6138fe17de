//! Dictionary sources feeding the suggestion pipeline.
//!
//! Each source answers one question (vocabulary completion, next-word
//! prediction, numeric renderings, shortcut expansion, contact names)
//! and emits plain [`Suggestion`](crate::suggest::Suggestion) values. The
//! two trie-backed sources share [`TrieCore`], which owns the locked trie
//! and the mutation discipline.

pub mod contacts;
pub mod language;
pub mod lookahead;
pub mod number;
pub mod shortcut;

pub use contacts::{ContactsDictionary, ContactsProvider};
pub use language::LanguageDictionary;
pub use lookahead::LookAheadDictionary;
pub use number::NumberDictionary;
pub use shortcut::ShortcutDictionary;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::collate::KeyCollator;
use crate::distance::{max_edit_distance, EditCosts};
use crate::error::Result;
use crate::search::{Candidate, FuzzySearch};
use crate::suggest::{CancelToken, SuggestionList, SuggestionsRequest};
use crate::trie::RadixTrie;

/// A queryable suggestion source.
pub trait Dictionary: Send + Sync {
    /// Produce this source's suggestions for one request, in source order.
    fn suggestions(&self, request: &SuggestionsRequest) -> Result<SuggestionList>;

    /// True if `word` is known to this source.
    fn contains(&self, word: &str) -> bool;
}

/// A dictionary that can be taught by the user.
pub trait LearningDictionary: Dictionary {
    /// Record one observation of `word`. Returns false for input this
    /// dictionary cannot learn.
    fn learn(&self, word: &str) -> bool;

    /// Explicitly keep a word the user accepted. Returns false if the word
    /// is already remembered.
    fn remember(&self, word: &str) -> bool;

    /// Drop a previously learned word. Returns false if the word is absent
    /// or too established to forget.
    fn forget(&self, word: &str) -> bool;
}

/// Shared state of the trie-backed sources: the locked trie, the collation
/// used to traverse it, and a load generation for cancelling superseded
/// bulk loads.
///
/// Searches take the read lock; learn/forget take the write lock. A bulk
/// reload builds its trie off-lock and swaps it in under the write lock,
/// so in-flight searches finish against the old data and their results die
/// with their expired requests.
pub(crate) struct TrieCore {
    trie: RwLock<RadixTrie>,
    collator: Arc<KeyCollator>,
    costs: EditCosts,
    generation: AtomicU64,
}

impl TrieCore {
    pub(crate) fn new(collator: Arc<KeyCollator>, costs: EditCosts) -> Self {
        TrieCore {
            trie: RwLock::new(RadixTrie::new()),
            collator,
            costs,
            generation: AtomicU64::new(0),
        }
    }

    /// Fuzzy candidates for `composing` over the whole trie, deduplicated
    /// by word keeping the smallest distance, plus the count sum the
    /// scores should normalize by.
    pub(crate) fn fuzzy_candidates(
        &self,
        composing: &str,
        token: &CancelToken,
    ) -> Result<(Vec<Candidate>, u64)> {
        let trie = self.trie.read();
        let search = FuzzySearch::new(&trie, &self.collator, self.costs, token);
        let max = max_edit_distance(composing.chars().count());
        let mut found: Vec<Candidate> = Vec::new();
        search.search(composing, max, &mut |candidate| {
            merge_candidate(&mut found, candidate)
        })?;
        Ok((found, trie.count_sum()))
    }

    /// Fuzzy candidates confined to the subtree below an exact `prefix`.
    pub(crate) fn candidates_below(
        &self,
        prefix: &str,
        composing: &str,
        token: &CancelToken,
    ) -> Result<(Vec<Candidate>, u64)> {
        let trie = self.trie.read();
        let search = FuzzySearch::new(&trie, &self.collator, self.costs, token);
        let max = max_edit_distance(composing.chars().count());
        let mut found: Vec<Candidate> = Vec::new();
        search.search_below(prefix, composing, max, &mut |candidate| {
            merge_candidate(&mut found, candidate)
        })?;
        Ok((found, trie.count_sum()))
    }

    /// Entries character-equivalent to `probe`, with the count sum.
    pub(crate) fn exact_candidates(
        &self,
        probe: &str,
        token: &CancelToken,
    ) -> Result<(Vec<Candidate>, u64)> {
        let trie = self.trie.read();
        let search = FuzzySearch::new(&trie, &self.collator, self.costs, token);
        let mut found: Vec<Candidate> = Vec::new();
        search.exact_matches(probe, &mut |candidate| found.push(candidate))?;
        Ok((found, trie.count_sum()))
    }

    pub(crate) fn count_of(&self, word: &str) -> Option<u32> {
        self.trie.read().count_of(word)
    }

    pub(crate) fn contains(&self, word: &str) -> bool {
        self.trie.read().contains(word)
    }

    /// Membership check that also accepts the lower-cased form.
    pub(crate) fn contains_folded(&self, word: &str) -> bool {
        let trie = self.trie.read();
        trie.contains(word) || trie.contains(&word.to_lowercase())
    }

    /// Add `increment` to a word's count, inserting it when new. A word
    /// known only in lower case is counted under its lower-cased form.
    /// Returns the spelling actually counted and the new count.
    pub(crate) fn learn_word(&self, word: &str, increment: u32) -> (String, u32) {
        let mut trie = self.trie.write();
        let lower = word.to_lowercase();
        let actual = if lower != word && trie.contains(&lower) && !trie.contains(word) {
            lower
        } else {
            word.to_string()
        };
        let count = match trie.count_of(&actual) {
            Some(current) => {
                let next = current.saturating_add(increment);
                trie.set_count(&actual, next);
                next
            }
            None => {
                trie.insert(&actual, increment);
                increment
            }
        };
        (actual, count)
    }

    /// Clear a word's entry mark, returning its former count.
    pub(crate) fn clear_entry(&self, word: &str) -> Option<u32> {
        self.trie.write().clear_entry(word)
    }

    /// Start a new bulk load, invalidating any load still in flight.
    pub(crate) fn begin_load(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// True while `generation` is still the latest load.
    pub(crate) fn load_is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::Acquire) == generation
    }

    /// Swap in a freshly built trie.
    pub(crate) fn replace(&self, trie: RadixTrie) {
        *self.trie.write() = trie;
    }
}

fn merge_candidate(found: &mut Vec<Candidate>, candidate: Candidate) {
    // Different hypothesis paths can reach the same entry; keep the
    // cheapest.
    match found.iter_mut().find(|c| c.word == candidate.word) {
        Some(existing) => {
            if candidate.distance < existing.distance {
                *existing = candidate;
            }
        }
        None => found.push(candidate),
    }
}
