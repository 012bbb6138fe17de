//! Contracts for the persistent word and n-gram stores.
//!
//! The SQL engine behind these traits is an external collaborator; the
//! suggestion engine only depends on the load/save shape defined here.
//! Store failures are reported, logged by the caller, and swallowed; the
//! in-memory dictionaries stay authoritative for the session.
//!
//! [`MemoryWordStore`] and [`MemoryNgramStore`] are complete in-process
//! implementations used by tests and as defaults until a real backend is
//! wired in.

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::error::StoreError;

/// Persistent storage for one language's vocabulary counts.
pub trait WordStore: Send + Sync {
    /// Load stored words ordered by count descending, optionally capped at
    /// `limit` records. The ordering lets a capped call warm the
    /// dictionary with its most useful entries first.
    fn load_all(&self, limit: Option<usize>) -> Result<Vec<(String, u32)>, StoreError>;

    /// Add `delta` to the stored count of `word`, inserting it if absent.
    fn increment_or_insert(&self, word: &str, delta: u32) -> Result<(), StoreError>;

    /// Remove `word` from the store.
    fn delete(&self, word: &str) -> Result<(), StoreError>;
}

/// One stored trigram row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NgramRecord {
    /// First word of the trigram.
    pub word1: String,
    /// Second word of the trigram.
    pub word2: String,
    /// Third word of the trigram.
    pub word3: String,
    /// Observation count.
    pub count: u32,
}

/// Persistent storage for one language's trigram counts.
pub trait NgramStore: Send + Sync {
    /// Load every trigram row, ordered by count descending.
    fn load_all(&self) -> Result<Vec<NgramRecord>, StoreError>;

    /// Insert or overwrite one trigram's count.
    fn upsert_trigram(
        &self,
        word1: &str,
        word2: &str,
        word3: &str,
        count: u32,
    ) -> Result<(), StoreError>;

    /// Counts summed per leading word, derived from the trigram rows.
    fn unigram_counts(&self) -> Result<Vec<(String, u32)>, StoreError> {
        let mut sums: FxHashMap<String, u32> = FxHashMap::default();
        for row in self.load_all()? {
            *sums.entry(row.word1).or_default() += row.count;
        }
        let mut rows: Vec<(String, u32)> = sums.into_iter().collect();
        rows.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        Ok(rows)
    }

    /// Counts summed per leading word pair, derived from the trigram rows.
    fn bigram_counts(&self) -> Result<Vec<(String, String, u32)>, StoreError> {
        let mut sums: FxHashMap<(String, String), u32> = FxHashMap::default();
        for row in self.load_all()? {
            *sums.entry((row.word1, row.word2)).or_default() += row.count;
        }
        let mut rows: Vec<(String, String, u32)> = sums
            .into_iter()
            .map(|((w1, w2), count)| (w1, w2, count))
            .collect();
        rows.sort_by(|a, b| b.2.cmp(&a.2).then_with(|| (&a.0, &a.1).cmp(&(&b.0, &b.1))));
        Ok(rows)
    }
}

/// In-memory word store.
#[derive(Debug, Default)]
pub struct MemoryWordStore {
    rows: Mutex<FxHashMap<String, u32>>,
}

impl MemoryWordStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store preloaded with the given counts.
    pub fn with_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = (S, u32)>,
        S: Into<String>,
    {
        let rows = words.into_iter().map(|(w, c)| (w.into(), c)).collect();
        MemoryWordStore {
            rows: Mutex::new(rows),
        }
    }

    /// The stored count of `word`, if present.
    pub fn count_of(&self, word: &str) -> Option<u32> {
        self.rows.lock().get(word).copied()
    }

    /// Number of stored words.
    pub fn len(&self) -> usize {
        self.rows.lock().len()
    }

    /// True if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.rows.lock().is_empty()
    }
}

impl WordStore for MemoryWordStore {
    fn load_all(&self, limit: Option<usize>) -> Result<Vec<(String, u32)>, StoreError> {
        let mut rows: Vec<(String, u32)> = self
            .rows
            .lock()
            .iter()
            .map(|(w, c)| (w.clone(), *c))
            .collect();
        rows.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        if let Some(limit) = limit {
            rows.truncate(limit);
        }
        Ok(rows)
    }

    fn increment_or_insert(&self, word: &str, delta: u32) -> Result<(), StoreError> {
        *self.rows.lock().entry(word.to_string()).or_default() += delta;
        Ok(())
    }

    fn delete(&self, word: &str) -> Result<(), StoreError> {
        self.rows.lock().remove(word);
        Ok(())
    }
}

/// In-memory n-gram store.
#[derive(Debug, Default)]
pub struct MemoryNgramStore {
    rows: Mutex<FxHashMap<(String, String, String), u32>>,
}

impl MemoryNgramStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store preloaded with the given trigram counts.
    pub fn with_trigrams<I, S>(trigrams: I) -> Self
    where
        I: IntoIterator<Item = (S, S, S, u32)>,
        S: Into<String>,
    {
        let rows = trigrams
            .into_iter()
            .map(|(w1, w2, w3, c)| ((w1.into(), w2.into(), w3.into()), c))
            .collect();
        MemoryNgramStore {
            rows: Mutex::new(rows),
        }
    }

    /// The stored count of one trigram, if present.
    pub fn count_of(&self, w1: &str, w2: &str, w3: &str) -> Option<u32> {
        self.rows
            .lock()
            .get(&(w1.to_string(), w2.to_string(), w3.to_string()))
            .copied()
    }
}

impl NgramStore for MemoryNgramStore {
    fn load_all(&self) -> Result<Vec<NgramRecord>, StoreError> {
        let mut rows: Vec<NgramRecord> = self
            .rows
            .lock()
            .iter()
            .map(|((w1, w2, w3), c)| NgramRecord {
                word1: w1.clone(),
                word2: w2.clone(),
                word3: w3.clone(),
                count: *c,
            })
            .collect();
        rows.sort_by(|a, b| b.count.cmp(&a.count));
        Ok(rows)
    }

    fn upsert_trigram(
        &self,
        word1: &str,
        word2: &str,
        word3: &str,
        count: u32,
    ) -> Result<(), StoreError> {
        self.rows.lock().insert(
            (word1.to_string(), word2.to_string(), word3.to_string()),
            count,
        );
        Ok(())
    }
}

/// A word store that fails every operation.
///
/// Exercises the degraded path: persistence errors are logged and
/// swallowed while the in-memory dictionary keeps working.
#[derive(Debug, Default)]
pub struct FailingWordStore;

impl WordStore for FailingWordStore {
    fn load_all(&self, _limit: Option<usize>) -> Result<Vec<(String, u32)>, StoreError> {
        Err(StoreError::msg("store unavailable"))
    }

    fn increment_or_insert(&self, _word: &str, _delta: u32) -> Result<(), StoreError> {
        Err(StoreError::msg("store unavailable"))
    }

    fn delete(&self, _word: &str) -> Result<(), StoreError> {
        Err(StoreError::msg("store unavailable"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_store_orders_by_count() {
        let store = MemoryWordStore::with_words([("rare", 1), ("common", 100), ("mid", 10)]);
        let rows = store.load_all(None).unwrap();
        let words: Vec<&str> = rows.iter().map(|(w, _)| w.as_str()).collect();
        assert_eq!(words, vec!["common", "mid", "rare"]);
        let capped = store.load_all(Some(2)).unwrap();
        assert_eq!(capped.len(), 2);
    }

    #[test]
    fn word_store_increments() {
        let store = MemoryWordStore::new();
        store.increment_or_insert("hello", 3).unwrap();
        store.increment_or_insert("hello", 2).unwrap();
        assert_eq!(store.count_of("hello"), Some(5));
        store.delete("hello").unwrap();
        assert_eq!(store.count_of("hello"), None);
    }

    #[test]
    fn ngram_sums_aggregate_rows() {
        let store = MemoryNgramStore::with_trigrams([
            ("thank", "you", "very", 3),
            ("thank", "you", "for", 2),
            ("thank", "goodness", "for", 1),
        ]);
        let unigrams = store.unigram_counts().unwrap();
        assert_eq!(unigrams[0], ("thank".to_string(), 6));
        let bigrams = store.bigram_counts().unwrap();
        assert_eq!(
            bigrams[0],
            ("thank".to_string(), "you".to_string(), 5)
        );
    }
}
