//! Suggestion values, their ranking order, and the collections that hold
//! them.
//!
//! Every dictionary source emits the same [`Suggestion`] type, tagged with
//! a [`SuggestionKind`]. Ranking across sources is a total order over
//! (kind priority, score, word), so a shortcut always outranks a language
//! match regardless of score, and ties break lexicographically.

pub mod container;
pub mod request;

pub use container::{RankedSuggestions, SuggestionList};
pub use request::{CancelToken, SuggestionsRequest, TypingContext};

use std::cmp::Ordering;

/// Which source produced a suggestion, with the inputs that scored it.
#[derive(Debug, Clone, PartialEq)]
pub enum SuggestionKind {
    /// The literal composing text itself, or a promoted exact match.
    Composing,
    /// A user-defined keystroke expansion.
    Shortcut,
    /// A name from the contact directory.
    Contact,
    /// A numeric rendering (literal, grouped, ordinal, or number word).
    Number,
    /// A next-word prediction from the n-gram dictionary.
    LookAhead {
        /// How many preceding words anchored the prediction (1 or 2).
        depth: u8,
        /// Frequency count of the matched n-gram.
        count: u32,
        /// Weighted edit distance of the continuation.
        distance: f64,
    },
    /// A vocabulary match from the language dictionary.
    Language {
        /// Frequency count of the word.
        count: u32,
        /// Weighted edit distance from the composing text.
        distance: f64,
    },
}

impl SuggestionKind {
    /// Fixed cross-source priority; lower sorts first.
    pub fn priority(&self) -> u8 {
        match self {
            SuggestionKind::Composing => 0,
            SuggestionKind::Shortcut => 10,
            SuggestionKind::Contact => 20,
            SuggestionKind::Number => 30,
            SuggestionKind::LookAhead { depth, .. } => {
                // Two words of context beat one.
                if *depth >= 2 {
                    40
                } else {
                    41
                }
            }
            SuggestionKind::Language { .. } => 50,
        }
    }
}

/// One ranked candidate word.
///
/// Equality is by word text only; the kind and score are ranking inputs.
#[derive(Debug, Clone)]
pub struct Suggestion {
    word: String,
    kind: SuggestionKind,
    score: f64,
}

impl Suggestion {
    /// The literal composing text, scored neutrally.
    pub fn composing(word: impl Into<String>) -> Self {
        Suggestion {
            word: word.into(),
            kind: SuggestionKind::Composing,
            score: 0.0,
        }
    }

    /// A shortcut expansion.
    pub fn shortcut(expansion: impl Into<String>) -> Self {
        Suggestion {
            word: expansion.into(),
            kind: SuggestionKind::Shortcut,
            score: 0.0,
        }
    }

    /// A contact name match.
    pub fn contact(name: impl Into<String>) -> Self {
        Suggestion {
            word: name.into(),
            kind: SuggestionKind::Contact,
            score: 0.0,
        }
    }

    /// A numeric rendering. `order` fixes the relative position among the
    /// renderings of one number (literal, word, grouped, ordinal).
    pub fn number(text: impl Into<String>, order: u8) -> Self {
        Suggestion {
            word: text.into(),
            kind: SuggestionKind::Number,
            score: f64::from(order),
        }
    }

    /// A language-dictionary match. Rare words and distant corrections both
    /// penalize the score; lower is better.
    pub fn language(word: impl Into<String>, count: u32, count_sum: u64, distance: f64) -> Self {
        Suggestion {
            word: word.into(),
            kind: SuggestionKind::Language { count, distance },
            score: frequency_score(count, count_sum, distance),
        }
    }

    /// A look-ahead prediction anchored on `depth` preceding words.
    pub fn look_ahead(
        word: impl Into<String>,
        count: u32,
        count_sum: u64,
        distance: f64,
        depth: u8,
    ) -> Self {
        Suggestion {
            word: word.into(),
            kind: SuggestionKind::LookAhead {
                depth,
                count,
                distance,
            },
            score: frequency_score(count, count_sum, distance),
        }
    }

    /// The suggested word.
    pub fn word(&self) -> &str {
        &self.word
    }

    /// The producing source.
    pub fn kind(&self) -> &SuggestionKind {
        &self.kind
    }

    /// Ranking score; lower is better within a kind.
    pub fn score(&self) -> f64 {
        self.score
    }

    /// True for the kinds eligible to be the auto-commit default.
    pub fn is_defaultable(&self) -> bool {
        matches!(
            self.kind,
            SuggestionKind::Shortcut
                | SuggestionKind::Language { .. }
                | SuggestionKind::LookAhead { .. }
        )
    }

    /// Re-tag this suggestion as the composing literal, keeping its score.
    pub fn into_composing(self) -> Suggestion {
        Suggestion {
            word: self.word,
            kind: SuggestionKind::Composing,
            score: self.score,
        }
    }

    /// Total rank order: kind priority, then score, then word.
    pub fn rank_cmp(&self, other: &Suggestion) -> Ordering {
        self.kind
            .priority()
            .cmp(&other.kind.priority())
            .then_with(|| self.score.total_cmp(&other.score))
            .then_with(|| self.word.cmp(&other.word))
    }

    pub(crate) fn set_word(&mut self, word: String) {
        self.word = word;
    }
}

impl PartialEq for Suggestion {
    fn eq(&self, other: &Self) -> bool {
        self.word == other.word
    }
}

impl PartialEq<str> for Suggestion {
    fn eq(&self, other: &str) -> bool {
        self.word == other
    }
}

fn frequency_score(count: u32, count_sum: u64, distance: f64) -> f64 {
    if count == 0 || count_sum == 0 {
        return f64::MAX;
    }
    let frequency = count as f64 / count_sum as f64;
    frequency.ln().abs() + distance
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frequent_words_score_better() {
        let common = Suggestion::language("the", 5_000, 100_000, 0.0);
        let rare = Suggestion::language("thy", 5, 100_000, 0.0);
        assert!(common.score() < rare.score());
    }

    #[test]
    fn distance_penalizes_score() {
        let exact = Suggestion::language("the", 5_000, 100_000, 0.0);
        let fuzzy = Suggestion::language("the", 5_000, 100_000, 2.0);
        assert!(exact.score() < fuzzy.score());
    }

    #[test]
    fn shortcuts_outrank_language_matches() {
        let shortcut = Suggestion::shortcut("be right back");
        let language = Suggestion::language("brb", 50_000, 100_000, 0.0);
        assert_eq!(shortcut.rank_cmp(&language), Ordering::Less);
    }

    #[test]
    fn deeper_look_ahead_ranks_first() {
        let two_words = Suggestion::look_ahead("very", 2, 1_000, 0.0, 2);
        let one_word = Suggestion::look_ahead("much", 500, 1_000, 0.0, 1);
        assert_eq!(two_words.rank_cmp(&one_word), Ordering::Less);
    }

    #[test]
    fn equality_is_by_word() {
        let a = Suggestion::language("cat", 10, 100, 0.0);
        let b = Suggestion::contact("cat");
        assert_eq!(a, b);
        assert_eq!(a, *"cat");
    }
}
