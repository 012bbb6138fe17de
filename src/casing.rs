//! Case analysis and case matching for suggestion words.
//!
//! Candidates are adjusted to the capitalization of the text the user
//! actually typed: an all-caps fragment upper-cases its suggestions, a
//! capitalized fragment capitalizes them, and candidates that are already
//! all-caps or mixed-case are left untouched (they are never down-cased).

/// True if every character of `word` is upper-case.
pub fn is_all_caps(word: &str) -> bool {
    word.chars().all(char::is_uppercase)
}

/// True if the first character of `word` is upper-case.
pub fn is_capitalized(word: &str) -> bool {
    word.chars().next().is_some_and(char::is_uppercase)
}

/// True if `word` mixes upper- and lower-case beyond a leading capital.
///
/// "Capitalized" words (upper first letter, lower rest) are not mixed case.
pub fn is_mixed_case(word: &str) -> bool {
    if word.chars().count() < 2 {
        return false;
    }

    let tail: String = word.chars().skip(1).collect();
    word != word.to_lowercase()
        && word != word.to_uppercase()
        && tail != tail.to_lowercase()
        && tail != tail.to_uppercase()
}

/// Lower-case `word` and capitalize its first letter.
///
/// Underscores become spaces, matching how multi-word entries are stored.
pub fn cap_first(word: &str) -> String {
    let lowered = word.to_lowercase().replace('_', " ");
    let mut chars = lowered.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => lowered,
    }
}

/// Convert `word` to match the case of `reference`.
///
/// When `reference` is empty there is nothing to imitate and the keyboard
/// shift and caps-lock states substitute for it.
pub fn match_case(reference: &str, word: &str, shift: bool, caps_lock: bool) -> String {
    if reference.is_empty() {
        return if caps_lock {
            word.to_uppercase()
        } else if shift {
            cap_first(word)
        } else {
            word.to_string()
        };
    }

    if is_all_caps(reference) {
        // A single upper-case letter only means "shifted", not "caps lock".
        return if reference.chars().count() == 1 {
            cap_first(word)
        } else {
            word.to_uppercase()
        };
    }

    if is_all_caps(word) || is_mixed_case(word) {
        // The candidate's own casing is significant. Leave it alone.
        return word.to_string();
    }

    if is_capitalized(reference) {
        return cap_first(word);
    }

    word.to_string()
}
