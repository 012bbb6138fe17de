//! Edit-distance budget policy and per-hypothesis correction costs.

use serde::{Deserialize, Serialize};

/// Maximum tolerated edit distance for a composing string of `len` characters.
///
/// Short fragments get a tight budget so that one or two keystrokes are not
/// "corrected" into unrelated words; longer fragments earn more slack.
pub fn max_edit_distance(len: usize) -> f64 {
    if len <= 4 {
        2.0
    } else if len <= 8 {
        3.0
    } else {
        4.0
    }
}

/// Costs charged for each correction hypothesis during the fuzzy walk.
///
/// The defaults are all `1.0`. They are configuration rather than
/// invariants: the ranking mechanism is fixed, the weights are tunable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditCosts {
    /// Substituting an adjacent key for the intended one (a mis-tap).
    pub substitute: f64,
    /// A keystroke the user failed to type (the candidate has one more
    /// character than the composing text at this position).
    pub missing_key: f64,
    /// An extra, erroneous keystroke in the composing text.
    pub extra_key: f64,
    /// A duplicated or transposed keystroke, detected when the following
    /// typed character matches the current candidate character.
    pub double_tap: f64,
}

impl Default for EditCosts {
    fn default() -> Self {
        EditCosts {
            substitute: 1.0,
            missing_key: 1.0,
            extra_key: 1.0,
            double_tap: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budget_bands() {
        assert_eq!(max_edit_distance(0), 2.0);
        assert_eq!(max_edit_distance(1), 2.0);
        assert_eq!(max_edit_distance(4), 2.0);
        assert_eq!(max_edit_distance(5), 3.0);
        assert_eq!(max_edit_distance(8), 3.0);
        assert_eq!(max_edit_distance(9), 4.0);
        assert_eq!(max_edit_distance(40), 4.0);
    }

    #[test]
    fn default_costs_are_unit() {
        let costs = EditCosts::default();
        assert_eq!(costs.substitute, 1.0);
        assert_eq!(costs.missing_key, 1.0);
        assert_eq!(costs.extra_key, 1.0);
        assert_eq!(costs.double_tap, 1.0);
    }
}
