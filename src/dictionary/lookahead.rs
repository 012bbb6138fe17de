//! The look-ahead dictionary: next-word prediction from trigram counts.
//!
//! N-grams are stored in the same radix trie as flat strings
//! (`"word1"`, `"word1 word2"`, `"word1 word2 word3"`), with counts
//! aggregated at each granularity. Prediction searches the subtree below
//! the space-terminated context prefix, so the emitted candidates are the
//! continuations only.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::collate::KeyCollator;
use crate::config::SuggestorConfig;
use crate::dictionary::{Dictionary, LearningDictionary, TrieCore};
use crate::error::Result;
use crate::store::NgramStore;
use crate::suggest::{Suggestion, SuggestionList, SuggestionsRequest};
use crate::trie::RadixTrie;

/// Next-word source anchored on the one or two committed words before the
/// cursor.
pub struct LookAheadDictionary {
    core: TrieCore,
    store: Arc<dyn NgramStore>,
    learn_increment: u32,
}

impl LookAheadDictionary {
    /// Create an empty dictionary. Call [`load`](Self::load) to populate
    /// it from the store.
    pub fn new(
        collator: Arc<KeyCollator>,
        store: Arc<dyn NgramStore>,
        config: &SuggestorConfig,
    ) -> Self {
        LookAheadDictionary {
            core: TrieCore::new(collator, config.costs),
            store,
            learn_increment: config.learn_increment,
        }
    }

    /// Load every n-gram granularity from the store.
    pub fn load(&self) {
        let generation = self.core.begin_load();
        let mut trie = RadixTrie::new();

        let loaded = (|| {
            for (word, count) in self.store.unigram_counts()? {
                trie.insert(&word, count);
            }
            for (word1, word2, count) in self.store.bigram_counts()? {
                trie.insert(&format!("{word1} {word2}"), count);
            }
            let rows = self.store.load_all()?;
            for row in &rows {
                trie.insert(
                    &format!("{} {} {}", row.word1, row.word2, row.word3),
                    row.count,
                );
            }
            Ok::<usize, crate::error::StoreError>(rows.len())
        })();

        match loaded {
            Ok(trigrams) => {
                if !self.core.load_is_current(generation) {
                    debug!(trigrams, "abandoning superseded n-gram load");
                    return;
                }
                self.core.replace(trie);
                info!(trigrams, "look-ahead dictionary loaded");
            }
            Err(error) => {
                warn!(%error, "look-ahead dictionary load failed");
            }
        }
    }

    /// Invalidate any load still in flight.
    pub fn cancel_load(&self) {
        self.core.begin_load();
    }

    /// The aggregated count stored for an n-gram string.
    pub fn count_of(&self, ngram: &str) -> Option<u32> {
        self.core.count_of(ngram)
    }
}

impl Dictionary for LookAheadDictionary {
    fn suggestions(&self, request: &SuggestionsRequest) -> Result<SuggestionList> {
        let context = request.context();
        let composing = request.composing();
        let token = request.token();
        let mut list = SuggestionList::new(token.clone());

        let word1 = context.second_last_word.to_lowercase();
        let word2 = context.last_word.to_lowercase();

        // Two words of context: continuations of "word1 word2".
        if !word1.is_empty() && !word2.is_empty() {
            let prefix = format!("{word1} {word2} ");
            let (candidates, sum) = self.core.candidates_below(&prefix, composing, token)?;
            for candidate in candidates {
                list.add(Suggestion::look_ahead(
                    candidate.word,
                    candidate.count,
                    sum,
                    candidate.distance,
                    2,
                ))?;
            }
        }

        // With nothing composed yet, fall back to single-word context so
        // predictions degrade gracefully.
        if composing.is_empty() && !word2.is_empty() {
            let prefix = format!("{word2} ");
            let (candidates, sum) = self.core.candidates_below(&prefix, composing, token)?;
            for candidate in candidates {
                list.add(Suggestion::look_ahead(
                    candidate.word,
                    candidate.count,
                    sum,
                    candidate.distance,
                    1,
                ))?;
            }
        }

        Ok(list)
    }

    fn contains(&self, word: &str) -> bool {
        self.core.contains(word)
    }
}

impl LearningDictionary for LookAheadDictionary {
    /// Learn one trigram, given as `"word1 word2 word3"`. All three
    /// granularities are counted, shorter contexts more heavily so they
    /// stay useful when the longer context is missing. Anything that does
    /// not split into exactly three words is a no-op.
    fn learn(&self, trigram: &str) -> bool {
        let words: Vec<&str> = trigram.split_whitespace().collect();
        if words.len() != 3 {
            return false;
        }
        let (word1, word2, word3) = (words[0], words[1], words[2]);

        let (_, count) = self
            .core
            .learn_word(&format!("{word1} {word2} {word3}"), self.learn_increment);
        self.core
            .learn_word(&format!("{word1} {word2}"), self.learn_increment * 2);
        self.core.learn_word(word1, self.learn_increment * 3);

        if let Err(error) = self.store.upsert_trigram(word1, word2, word3, count) {
            warn!(%error, trigram, "failed to persist learned trigram");
        }
        true
    }

    fn remember(&self, _word: &str) -> bool {
        false
    }

    fn forget(&self, _word: &str) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collate::{AccentFolding, QwertyLayout};
    use crate::store::MemoryNgramStore;
    use crate::suggest::{SuggestionKind, TypingContext};

    fn collator() -> Arc<KeyCollator> {
        Arc::new(KeyCollator::new(
            Arc::new(AccentFolding),
            Arc::new(QwertyLayout),
        ))
    }

    fn loaded(trigrams: &[(&str, &str, &str, u32)]) -> LookAheadDictionary {
        let store = Arc::new(MemoryNgramStore::with_trigrams(
            trigrams
                .iter()
                .map(|(a, b, c, n)| (a.to_string(), b.to_string(), c.to_string(), *n)),
        ));
        let dictionary =
            LookAheadDictionary::new(collator(), store, &SuggestorConfig::default());
        dictionary.load();
        dictionary
    }

    fn request(composing: &str, word1: &str, word2: &str) -> SuggestionsRequest {
        SuggestionsRequest::new(TypingContext {
            composing: composing.into(),
            second_last_word: word1.into(),
            last_word: word2.into(),
            ..TypingContext::default()
        })
    }

    #[test]
    fn predicts_continuation_of_two_words() {
        let dictionary = loaded(&[("thank", "you", "very", 3), ("thank", "you", "for", 2)]);
        let list = dictionary
            .suggestions(&request("", "thank", "you"))
            .unwrap();
        let words = list.words();
        assert!(words.contains(&"very"));
        assert!(words.contains(&"for"));
    }

    #[test]
    fn composing_narrows_the_continuations() {
        let dictionary = loaded(&[("thank", "you", "very", 3), ("thank", "you", "for", 2)]);
        let list = dictionary
            .suggestions(&request("ver", "thank", "you"))
            .unwrap();
        assert!(list.words().contains(&"very"));
    }

    #[test]
    fn single_word_context_only_applies_to_empty_composing() {
        // "you" leads a stored trigram, so it exists as a unigram prefix.
        let dictionary = loaded(&[("you", "very", "much", 3)]);
        let empty = dictionary.suggestions(&request("", "", "you")).unwrap();
        assert!(empty
            .iter()
            .any(|s| matches!(s.kind(), SuggestionKind::LookAhead { depth: 1, .. })));
        assert!(empty.words().contains(&"very"));
        let composing = dictionary.suggestions(&request("v", "", "you")).unwrap();
        assert!(composing.is_empty());
    }

    #[test]
    fn learning_counts_all_granularities() {
        let dictionary = loaded(&[]);
        assert!(dictionary.learn("thank you very"));
        assert_eq!(dictionary.count_of("thank you very"), Some(1));
        assert_eq!(dictionary.count_of("thank you"), Some(2));
        assert_eq!(dictionary.count_of("thank"), Some(3));
    }

    #[test]
    fn malformed_trigram_is_a_no_op() {
        let dictionary = loaded(&[]);
        assert!(!dictionary.learn("two words"));
        assert!(!dictionary.learn("one two three four"));
        assert!(!dictionary.learn(""));
    }

    #[test]
    fn context_is_case_insensitive() {
        let dictionary = loaded(&[("thank", "you", "very", 3)]);
        let list = dictionary
            .suggestions(&request("", "Thank", "You"))
            .unwrap();
        assert!(list.words().contains(&"very"));
    }
}
