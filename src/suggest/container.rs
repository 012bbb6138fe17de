//! Collections of suggestions: insertion-ordered and rank-bounded.
//!
//! Both containers refuse mutation once the owning request has expired,
//! so a superseded computation aborts at its next write instead of
//! finishing uselessly.

use crate::error::Result;
use crate::suggest::request::CancelToken;
use crate::suggest::Suggestion;

/// Suggestions in insertion order, as produced by a single source.
#[derive(Debug, Clone)]
pub struct SuggestionList {
    token: CancelToken,
    items: Vec<Suggestion>,
}

impl SuggestionList {
    /// Create an empty list tied to a request's cancellation token.
    pub fn new(token: CancelToken) -> Self {
        SuggestionList {
            token,
            items: Vec::new(),
        }
    }

    /// Append a suggestion, failing if the request has expired.
    pub fn add(&mut self, suggestion: Suggestion) -> Result<()> {
        self.token.check()?;
        self.items.push(suggestion);
        Ok(())
    }

    /// Insert a suggestion at `index`, failing if the request has expired.
    pub fn insert(&mut self, index: usize, suggestion: Suggestion) -> Result<()> {
        self.token.check()?;
        self.items.insert(index, suggestion);
        Ok(())
    }

    /// Number of suggestions held.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True if no suggestions are held.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Index of the first suggestion with the given word, if any.
    pub fn index_of(&self, word: &str) -> Option<usize> {
        self.items.iter().position(|s| s.word() == word)
    }

    /// Iterate the suggestions in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Suggestion> {
        self.items.iter()
    }

    /// The suggested words, in order.
    pub fn words(&self) -> Vec<&str> {
        self.items.iter().map(Suggestion::word).collect()
    }

    /// Consume the list.
    pub fn into_vec(self) -> Vec<Suggestion> {
        self.items
    }
}

/// A rank-sorted collection bounded to the top `cap` suggestions.
///
/// Insertion keeps the list sorted by [`Suggestion::rank_cmp`]; equal
/// elements preserve their insertion order. Anything beyond the cap is
/// dropped from the tail.
#[derive(Debug, Clone)]
pub struct RankedSuggestions {
    token: CancelToken,
    cap: usize,
    items: Vec<Suggestion>,
}

impl RankedSuggestions {
    /// Create an empty ranking bounded to `cap` entries.
    pub fn new(cap: usize, token: CancelToken) -> Self {
        RankedSuggestions {
            token,
            cap,
            items: Vec::with_capacity(cap + 1),
        }
    }

    /// Offer one suggestion, failing if the request has expired.
    pub fn offer(&mut self, suggestion: Suggestion) -> Result<()> {
        self.token.check()?;
        let at = self
            .items
            .partition_point(|held| held.rank_cmp(&suggestion) != std::cmp::Ordering::Greater);
        self.items.insert(at, suggestion);
        self.items.truncate(self.cap);
        Ok(())
    }

    /// Offer every suggestion from `source`, failing if the request has
    /// expired.
    pub fn offer_all<I>(&mut self, source: I) -> Result<()>
    where
        I: IntoIterator<Item = Suggestion>,
    {
        for suggestion in source {
            self.offer(suggestion)?;
        }
        Ok(())
    }

    /// Number of suggestions held.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True if no suggestions are held.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Consume the ranking, best first.
    pub fn into_vec(self) -> Vec<Suggestion> {
        self.items
    }
}
