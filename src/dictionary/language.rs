//! The language dictionary: fuzzy completion over the full vocabulary.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::collate::KeyCollator;
use crate::config::SuggestorConfig;
use crate::dictionary::{Dictionary, LearningDictionary, TrieCore};
use crate::error::Result;
use crate::store::WordStore;
use crate::suggest::{Suggestion, SuggestionList, SuggestionsRequest};
use crate::trie::RadixTrie;

/// Vocabulary source backed by the word trie and a persistent word store.
///
/// Scores combine rarity and correction distance, lower being better:
/// `|ln(count / count_sum)| + distance`. The single best exact-or-near
/// match is additionally spliced to the front of the source's output, so
/// the merge pipeline can promote it.
pub struct LanguageDictionary {
    core: TrieCore,
    store: Arc<dyn WordStore>,
    learn_increment: u32,
    remember_count: u32,
    max_deletable_count: u32,
    warm_start_records: usize,
}

impl LanguageDictionary {
    /// Create an empty dictionary. Call [`load`](Self::load) to populate
    /// it from the store.
    pub fn new(
        collator: Arc<KeyCollator>,
        store: Arc<dyn WordStore>,
        config: &SuggestorConfig,
    ) -> Self {
        LanguageDictionary {
            core: TrieCore::new(collator, config.costs),
            store,
            learn_increment: config.learn_increment,
            remember_count: config.remember_count,
            max_deletable_count: config.max_deletable_count,
            warm_start_records: config.warm_start_records,
        }
    }

    /// Load the vocabulary from the store: first a capped batch of the
    /// most frequent words for a fast warm start, then everything.
    ///
    /// A load superseded by a newer one abandons its result. A store
    /// failure leaves the dictionary empty; suggestions are simply absent
    /// until a later load succeeds.
    pub fn load(&self) {
        let generation = self.core.begin_load();

        if self.warm_start_records > 0 {
            match self.store.load_all(Some(self.warm_start_records)) {
                Ok(rows) => {
                    let records = rows.len();
                    let trie = build_trie(rows);
                    if !self.core.load_is_current(generation) {
                        debug!(records, "abandoning superseded warm start");
                        return;
                    }
                    self.core.replace(trie);
                    info!(records, "language dictionary warm start complete");
                }
                Err(error) => {
                    warn!(%error, "language warm start failed");
                }
            }
        }

        match self.store.load_all(None) {
            Ok(rows) => {
                let records = rows.len();
                let trie = build_trie(rows);
                if !self.core.load_is_current(generation) {
                    debug!(records, "abandoning superseded full load");
                    return;
                }
                self.core.replace(trie);
                info!(records, "language dictionary loaded");
            }
            Err(error) => {
                warn!(%error, "language dictionary load failed");
            }
        }
    }

    /// Invalidate any load still in flight, e.g. when the language
    /// changes while the old dictionary is still streaming in.
    pub fn cancel_load(&self) {
        self.core.begin_load();
    }

    /// The count of `word`, by exact lookup.
    pub fn count_of(&self, word: &str) -> Option<u32> {
        self.core.count_of(word)
    }

    /// Membership check accepting the lower-cased spelling too.
    pub fn contains_ignore_case(&self, word: &str) -> bool {
        self.core.contains_folded(word)
    }
}

impl Dictionary for LanguageDictionary {
    fn suggestions(&self, request: &SuggestionsRequest) -> Result<SuggestionList> {
        let composing = request.composing();
        let token = request.token();
        let mut list = SuggestionList::new(token.clone());
        if composing.is_empty() {
            return Ok(list);
        }

        // The best equivalent entry leads the output, ahead of the fuzzy
        // candidates, so the pipeline sees it first.
        let (matches, sum) = self.core.exact_candidates(composing, token)?;
        if let Some(best) = matches.into_iter().max_by_key(|c| c.count) {
            list.add(Suggestion::language(best.word, best.count, sum, 0.0))?;
        }

        let (candidates, sum) = self.core.fuzzy_candidates(composing, token)?;
        for candidate in candidates {
            list.add(Suggestion::language(
                candidate.word,
                candidate.count,
                sum,
                candidate.distance,
            ))?;
        }
        Ok(list)
    }

    fn contains(&self, word: &str) -> bool {
        self.core.contains(word)
    }
}

impl LearningDictionary for LanguageDictionary {
    fn learn(&self, word: &str) -> bool {
        if word.is_empty() {
            return false;
        }
        let (actual, count) = self.core.learn_word(word, self.learn_increment);
        debug!(word = %actual, count, "learned word");
        if let Err(error) = self.store.increment_or_insert(&actual, self.learn_increment) {
            warn!(%error, word = %actual, "failed to persist learned word");
        }
        true
    }

    fn remember(&self, word: &str) -> bool {
        if word.is_empty() || self.core.count_of(word).unwrap_or(0) >= self.remember_count {
            return false;
        }
        let (actual, _) = self.core.learn_word(word, self.remember_count);
        if let Err(error) = self.store.increment_or_insert(&actual, self.remember_count) {
            warn!(%error, word = %actual, "failed to persist remembered word");
        }
        true
    }

    fn forget(&self, word: &str) -> bool {
        let Some(count) = self.core.count_of(word) else {
            return false;
        };
        if count > self.max_deletable_count {
            // Built-in vocabulary stays.
            return false;
        }
        self.core.clear_entry(word);
        if let Err(error) = self.store.delete(word) {
            warn!(%error, word, "failed to delete forgotten word");
        }
        true
    }
}

fn build_trie(rows: Vec<(String, u32)>) -> RadixTrie {
    let mut trie = RadixTrie::new();
    for (word, count) in rows {
        trie.insert(&word, count);
    }
    trie
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collate::{AccentFolding, QwertyLayout};
    use crate::store::{FailingWordStore, MemoryWordStore};
    use crate::suggest::TypingContext;

    fn collator() -> Arc<KeyCollator> {
        Arc::new(KeyCollator::new(
            Arc::new(AccentFolding),
            Arc::new(QwertyLayout),
        ))
    }

    fn loaded(words: &[(&str, u32)]) -> LanguageDictionary {
        let store = Arc::new(MemoryWordStore::with_words(
            words.iter().map(|(w, c)| (w.to_string(), *c)),
        ));
        let dictionary =
            LanguageDictionary::new(collator(), store, &SuggestorConfig::default());
        dictionary.load();
        dictionary
    }

    fn request(composing: &str) -> SuggestionsRequest {
        SuggestionsRequest::new(TypingContext::composing(composing))
    }

    #[test]
    fn exact_match_leads_the_output() {
        let dictionary = loaded(&[("the", 5_000), ("they", 500), ("then", 200)]);
        let list = dictionary.suggestions(&request("the")).unwrap();
        assert_eq!(list.iter().next().unwrap().word(), "the");
        assert!(list.words().contains(&"they"));
    }

    #[test]
    fn empty_composing_yields_nothing() {
        let dictionary = loaded(&[("the", 100)]);
        let list = dictionary.suggestions(&request("")).unwrap();
        assert!(list.is_empty());
    }

    #[test]
    fn learning_twice_accumulates() {
        let dictionary = loaded(&[]);
        assert!(dictionary.learn("hello"));
        assert!(dictionary.learn("hello"));
        assert_eq!(dictionary.count_of("hello"), Some(2));
    }

    #[test]
    fn learning_prefers_known_lowercase_form() {
        let dictionary = loaded(&[("hello", 10)]);
        dictionary.learn("Hello");
        assert_eq!(dictionary.count_of("hello"), Some(11));
        assert_eq!(dictionary.count_of("Hello"), None);
    }

    #[test]
    fn forget_respects_the_ceiling() {
        let dictionary = loaded(&[("rare", 3), ("common", 100_000)]);
        assert!(dictionary.forget("rare"));
        assert!(!dictionary.contains("rare"));
        assert!(!dictionary.forget("common"));
        assert!(dictionary.contains("common"));
        assert!(!dictionary.forget("absent"));
    }

    #[test]
    fn remember_is_idempotent() {
        let dictionary = loaded(&[]);
        assert!(dictionary.remember("neologism"));
        assert!(!dictionary.remember("neologism"));
        assert_eq!(dictionary.count_of("neologism"), Some(2));
    }

    #[test]
    fn store_failure_degrades_gracefully() {
        let dictionary = LanguageDictionary::new(
            collator(),
            Arc::new(FailingWordStore),
            &SuggestorConfig::default(),
        );
        dictionary.load();
        assert!(dictionary
            .suggestions(&request("anything"))
            .unwrap()
            .is_empty());
        // The in-memory mutation still lands even though the write fails.
        assert!(dictionary.learn("offline"));
        assert_eq!(dictionary.count_of("offline"), Some(1));
    }
}
