//! Contact-name suggestions backed by an external directory.

use std::sync::Arc;

use crate::dictionary::Dictionary;
use crate::error::Result;
use crate::suggest::{Suggestion, SuggestionList, SuggestionsRequest};

/// External lookup into the device's contact directory.
///
/// Implementations return full display names; the dictionary extracts the
/// matching name parts itself.
pub trait ContactsProvider: Send + Sync {
    /// Display names with any word starting with `prefix` (lower-cased).
    fn names_with_prefix(&self, prefix: &str) -> Vec<String>;
}

/// Name source over a [`ContactsProvider`].
///
/// Short composing fragments skip the directory entirely: name lookup is
/// comparatively expensive and near-useless below a few characters.
pub struct ContactsDictionary {
    provider: Arc<dyn ContactsProvider>,
    min_prefix: usize,
}

impl ContactsDictionary {
    /// Create a source over `provider`, ignoring composing fragments
    /// shorter than `min_prefix` characters.
    pub fn new(provider: Arc<dyn ContactsProvider>, min_prefix: usize) -> Self {
        ContactsDictionary {
            provider,
            min_prefix,
        }
    }
}

impl Dictionary for ContactsDictionary {
    fn suggestions(&self, request: &SuggestionsRequest) -> Result<SuggestionList> {
        let mut list = SuggestionList::new(request.token().clone());
        let composing = request.composing();
        if composing.chars().count() < self.min_prefix {
            return Ok(list);
        }

        let prefix = composing.to_lowercase();
        for name in self.provider.names_with_prefix(&prefix) {
            for part in name.split_whitespace() {
                if part.to_lowercase().starts_with(&prefix) && list.index_of(part).is_none() {
                    list.add(Suggestion::contact(part))?;
                }
            }
        }
        Ok(list)
    }

    fn contains(&self, word: &str) -> bool {
        let lower = word.to_lowercase();
        self.provider
            .names_with_prefix(&lower)
            .iter()
            .flat_map(|name| name.split_whitespace())
            .any(|part| part.to_lowercase() == lower)
    }
}

/// A provider over a fixed list of names, for tests and simple setups.
#[derive(Debug, Default)]
pub struct StaticContacts {
    names: Vec<String>,
}

impl StaticContacts {
    /// Create a provider over the given display names.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        StaticContacts {
            names: names.into_iter().map(Into::into).collect(),
        }
    }
}

impl ContactsProvider for StaticContacts {
    fn names_with_prefix(&self, prefix: &str) -> Vec<String> {
        self.names
            .iter()
            .filter(|name| {
                name.split_whitespace()
                    .any(|part| part.to_lowercase().starts_with(prefix))
            })
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::suggest::TypingContext;

    fn dictionary() -> ContactsDictionary {
        let provider = StaticContacts::new(["Gabriella Hart", "Gabriel Jones", "Harriet Gable"]);
        ContactsDictionary::new(Arc::new(provider), 5)
    }

    fn request(composing: &str) -> SuggestionsRequest {
        SuggestionsRequest::new(TypingContext::composing(composing))
    }

    #[test]
    fn matches_name_parts_by_prefix() {
        let list = dictionary().suggestions(&request("gabri")).unwrap();
        let words = list.words();
        assert!(words.contains(&"Gabriella"));
        assert!(words.contains(&"Gabriel"));
        assert!(!words.contains(&"Hart"));
    }

    #[test]
    fn short_composing_skips_the_directory() {
        assert!(dictionary().suggestions(&request("gab")).unwrap().is_empty());
    }

    #[test]
    fn duplicate_parts_collapse() {
        let provider = StaticContacts::new(["Harper Lee", "Harper Quinn"]);
        let contacts = ContactsDictionary::new(Arc::new(provider), 5);
        let list = contacts.suggestions(&request("harpe")).unwrap();
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn membership_is_exact_name_part() {
        let contacts = dictionary();
        assert!(contacts.contains("gabriella"));
        assert!(!contacts.contains("gabri"));
    }
}
