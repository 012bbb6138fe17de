//! Character equivalence and keyboard-adjacency collation.
//!
//! Fuzzy matching needs two independent judgments about a pair of
//! characters: whether the language considers them equivalent (case and
//! accent folding), and whether the physical keys sit next to each other on
//! the active layout (a plausible mis-tap). The [`KeyCollator`] combines
//! both so that an adjacent-key substitution scores better than an
//! arbitrary one.

pub mod layout;

use std::sync::Arc;

pub use layout::{NoAdjacency, QwertyLayout};

/// Language-specific character and word equivalence rules.
pub trait LanguageRules: Send + Sync {
    /// True if the language treats `c1` and `c2` as the same letter
    /// (ignoring case, and typically accents).
    fn compare_chars(&self, c1: char, c2: char) -> bool;

    /// Looser word equality: case-insensitive, and word punctuation
    /// (`'` and `-`) in `word2` is skipped.
    fn compare_words(&self, word1: &str, word2: &str) -> bool {
        let mut left = word1.chars();
        for c2 in word2.chars() {
            if c2 == '\'' || c2 == '-' {
                continue;
            }
            match left.next() {
                Some(c1) if self.compare_chars(c1, c2) => {}
                _ => return false,
            }
        }
        left.next().is_none()
    }
}

/// Physical adjacency between keys on the active keyboard layout.
pub trait KeyboardAdjacency: Send + Sync {
    /// True if `c` is a key directly adjacent to `key`.
    fn is_adjacent(&self, key: char, c: char) -> bool;
}

/// Case-insensitive rules with no accent folding.
#[derive(Debug, Clone, Copy, Default)]
pub struct CaseInsensitive;

impl LanguageRules for CaseInsensitive {
    fn compare_chars(&self, c1: char, c2: char) -> bool {
        c1 == c2 || c1.to_lowercase().eq(c2.to_lowercase())
    }
}

/// Case-insensitive rules that also fold common Latin accents, so that a
/// plain-key press matches the accented letter stored in the dictionary.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccentFolding;

impl AccentFolding {
    fn fold(c: char) -> char {
        match c {
            'á' | 'à' | 'â' | 'ä' | 'ã' | 'å' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'ó' | 'ò' | 'ô' | 'ö' | 'õ' => 'o',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'ý' | 'ÿ' => 'y',
            'ñ' => 'n',
            'ç' => 'c',
            'ß' => 's',
            _ => c,
        }
    }
}

impl LanguageRules for AccentFolding {
    fn compare_chars(&self, c1: char, c2: char) -> bool {
        if c1 == c2 {
            return true;
        }
        let f1: Vec<char> = c1.to_lowercase().map(Self::fold).collect();
        let f2: Vec<char> = c2.to_lowercase().map(Self::fold).collect();
        f1 == f2
    }
}

/// Outcome of comparing a candidate character against a typed key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyMatch {
    /// The language considers the characters equivalent. No cost.
    Equivalent,
    /// The keys are physically adjacent: a plausible mis-tap, charged the
    /// substitution cost.
    Adjacent,
    /// Neither equivalent nor adjacent.
    Mismatch,
}

/// Combines language rules with layout adjacency.
///
/// One collator is built per active language/layout pair and shared by all
/// dictionary sources; switching language replaces it wholesale.
#[derive(Clone)]
pub struct KeyCollator {
    rules: Arc<dyn LanguageRules>,
    adjacency: Arc<dyn KeyboardAdjacency>,
}

impl KeyCollator {
    /// Create a collator from language rules and a layout.
    pub fn new(rules: Arc<dyn LanguageRules>, adjacency: Arc<dyn KeyboardAdjacency>) -> Self {
        KeyCollator { rules, adjacency }
    }

    /// Compare a candidate character against the key the user pressed.
    pub fn compare_char_to_key(&self, c: char, key: char) -> KeyMatch {
        if self.rules.compare_chars(c, key) {
            KeyMatch::Equivalent
        } else if self.adjacency.is_adjacent(key, c) {
            KeyMatch::Adjacent
        } else {
            KeyMatch::Mismatch
        }
    }

    /// Language character equivalence.
    pub fn compare_chars(&self, c1: char, c2: char) -> bool {
        self.rules.compare_chars(c1, c2)
    }

    /// Loose word equality per the language rules.
    pub fn compare_words(&self, word1: &str, word2: &str) -> bool {
        self.rules.compare_words(word1, word2)
    }
}

impl std::fmt::Debug for KeyCollator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyCollator").finish_non_exhaustive()
    }
}
