//! Engine configuration.

use serde::{Deserialize, Serialize};

use crate::distance::EditCosts;

/// Tunable parameters of the suggestion engine.
///
/// The defaults reproduce the shipped keyboard behavior. Every empirically
/// tuned constant lives here so deployments can adjust the weights without
/// touching the ranking mechanism.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestorConfig {
    /// Upper bound on the suggestion list shown per keystroke.
    pub max_suggestions: usize,
    /// A default whose score reaches this ceiling is too weak to trust and
    /// is withdrawn, leaving no auto-commit candidate.
    pub default_score_ceiling: f64,
    /// Costs charged per correction hypothesis by the fuzzy search.
    pub costs: EditCosts,
    /// Whether the n-gram dictionary contributes next-word predictions.
    pub predict_next_word: bool,
    /// Whether the contact directory contributes name suggestions.
    pub include_contacts: bool,
    /// Count added when a word is learned from committed text.
    pub learn_increment: u32,
    /// Count assigned when the user explicitly keeps an unknown word; a
    /// word at or above this count is already considered remembered.
    pub remember_count: u32,
    /// Words counted above this are built-in vocabulary and cannot be
    /// forgotten from the correction menu.
    pub max_deletable_count: u32,
    /// Composing fragments shorter than this never query the contact
    /// directory.
    pub contact_min_prefix: usize,
    /// Whether learning assumes the keyboard auto-capitalized sentence
    /// leads, and lower-cases them before counting words.
    pub auto_caps: bool,
    /// Number of records loaded synchronously for a fast warm start before
    /// the full dictionary load.
    pub warm_start_records: usize,
}

impl Default for SuggestorConfig {
    fn default() -> Self {
        SuggestorConfig {
            max_suggestions: 12,
            default_score_ceiling: 13.0,
            costs: EditCosts::default(),
            predict_next_word: true,
            include_contacts: false,
            learn_increment: 1,
            remember_count: 2,
            max_deletable_count: 1000,
            contact_min_prefix: 5,
            auto_caps: true,
            warm_start_records: 5000,
        }
    }
}
