//! User-defined keystroke shortcuts.

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::dictionary::Dictionary;
use crate::error::Result;
use crate::suggest::{Suggestion, SuggestionList, SuggestionsRequest};

/// Exact-match expansion table, keyed case-insensitively by keystroke.
///
/// A lookup yields at most one suggestion. The expansion's own casing is
/// authoritative; the pipeline never case-matches shortcut output.
#[derive(Debug, Default)]
pub struct ShortcutDictionary {
    table: RwLock<FxHashMap<String, String>>,
}

impl ShortcutDictionary {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table from `(keystroke, expansion)` pairs.
    pub fn with_shortcuts<I, K, V>(shortcuts: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let table = shortcuts
            .into_iter()
            .map(|(k, v)| (k.into().to_lowercase(), v.into()))
            .collect();
        ShortcutDictionary {
            table: RwLock::new(table),
        }
    }

    /// Add or replace one shortcut.
    pub fn set(&self, keystroke: &str, expansion: impl Into<String>) {
        self.table
            .write()
            .insert(keystroke.to_lowercase(), expansion.into());
    }

    /// Remove one shortcut.
    pub fn remove(&self, keystroke: &str) {
        self.table.write().remove(&keystroke.to_lowercase());
    }

    /// Number of shortcuts defined.
    pub fn len(&self) -> usize {
        self.table.read().len()
    }

    /// True if no shortcuts are defined.
    pub fn is_empty(&self) -> bool {
        self.table.read().is_empty()
    }
}

impl Dictionary for ShortcutDictionary {
    fn suggestions(&self, request: &SuggestionsRequest) -> Result<SuggestionList> {
        let mut list = SuggestionList::new(request.token().clone());
        let keystroke = request.composing().to_lowercase();
        if let Some(expansion) = self.table.read().get(&keystroke) {
            list.add(Suggestion::shortcut(expansion.clone()))?;
        }
        Ok(list)
    }

    fn contains(&self, _word: &str) -> bool {
        // Expansions are not vocabulary.
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::suggest::TypingContext;

    fn request(composing: &str) -> SuggestionsRequest {
        SuggestionsRequest::new(TypingContext::composing(composing))
    }

    #[test]
    fn expands_exact_keystroke() {
        let shortcuts = ShortcutDictionary::with_shortcuts([("brb", "be right back")]);
        let list = shortcuts.suggestions(&request("brb")).unwrap();
        assert_eq!(list.words(), vec!["be right back"]);
    }

    #[test]
    fn keystroke_matching_ignores_case() {
        let shortcuts = ShortcutDictionary::with_shortcuts([("BRB", "be right back")]);
        let list = shortcuts.suggestions(&request("Brb")).unwrap();
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn prefixes_do_not_expand() {
        let shortcuts = ShortcutDictionary::with_shortcuts([("brb", "be right back")]);
        assert!(shortcuts.suggestions(&request("br")).unwrap().is_empty());
        assert!(shortcuts.suggestions(&request("brbs")).unwrap().is_empty());
    }

    #[test]
    fn table_is_mutable() {
        let shortcuts = ShortcutDictionary::new();
        shortcuts.set("omw", "on my way!");
        assert_eq!(shortcuts.len(), 1);
        shortcuts.remove("omw");
        assert!(shortcuts.is_empty());
    }
}
