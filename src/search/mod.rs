//! Bounded-budget fuzzy traversal of the radix trie.
//!
//! The walker compares the composing text position-by-position against a
//! node's character run, exploring a small set of correction hypotheses:
//! an exact or adjacent-key match, a keystroke the user missed, a
//! duplicated/transposed keystroke, and an outright extra keystroke. Each
//! hypothesis charges a cost from [`EditCosts`](crate::distance::EditCosts)
//! and the walk prunes as soon as the accumulated distance exceeds the
//! budget. Once the composing text is exhausted, every entry in the
//! remaining subtree is a completion at the accumulated distance.
//!
//! The cancellation token is checked on every node visit: a superseded
//! request aborts the walk with [`SuggestError::Expired`] instead of
//! returning partial results.

use crate::collate::{KeyCollator, KeyMatch};
use crate::distance::EditCosts;
use crate::error::Result;
use crate::suggest::CancelToken;
use crate::trie::{NodeId, RadixTrie, RunPosition};

/// A word reached by the fuzzy walk, with its stored count and the
/// accumulated correction distance.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// The dictionary word.
    pub word: String,
    /// The word's frequency count.
    pub count: u32,
    /// Weighted edit distance from the composing text.
    pub distance: f64,
}

/// Fuzzy searcher over one trie, parameterized by collation and costs.
pub struct FuzzySearch<'a> {
    trie: &'a RadixTrie,
    collator: &'a KeyCollator,
    costs: EditCosts,
    token: &'a CancelToken,
}

impl<'a> FuzzySearch<'a> {
    /// Create a searcher over `trie`.
    pub fn new(
        trie: &'a RadixTrie,
        collator: &'a KeyCollator,
        costs: EditCosts,
        token: &'a CancelToken,
    ) -> Self {
        FuzzySearch {
            trie,
            collator,
            costs,
            token,
        }
    }

    /// Search the whole trie for words within `max_distance` of
    /// `composing`.
    pub fn search(
        &self,
        composing: &str,
        max_distance: f64,
        sink: &mut dyn FnMut(Candidate),
    ) -> Result<()> {
        let mut buf: Vec<char> = composing.chars().collect();
        self.walk(&mut buf, 0, self.trie.root(), 0, 0.0, max_distance, sink)
    }

    /// Search only the subtree below an exact `prefix`, as used for n-gram
    /// continuations. The prefix itself is not part of the emitted words.
    pub fn search_below(
        &self,
        prefix: &str,
        composing: &str,
        max_distance: f64,
        sink: &mut dyn FnMut(Candidate),
    ) -> Result<()> {
        let compare = |a: char, b: char| self.collator.compare_chars(a, b);
        let Some(RunPosition { node, offset }) = self.trie.descend(prefix, compare) else {
            return Ok(());
        };
        let mut buf: Vec<char> = composing.chars().collect();
        self.walk(&mut buf, 0, node, offset, 0.0, max_distance, sink)
    }

    /// Find entries whose stored word is character-equivalent to `probe`
    /// (no typo tolerance, punctuation in the stored word skipped).
    ///
    /// Unlike [`search`](Self::search) with a zero budget, this never
    /// emits completions: only entries the probe covers in full qualify.
    pub fn exact_matches(&self, probe: &str, sink: &mut dyn FnMut(Candidate)) -> Result<()> {
        let probe: Vec<char> = probe.chars().collect();
        if probe.is_empty() {
            return Ok(());
        }
        let mut path = Vec::with_capacity(probe.len());
        self.exact_walk(self.trie.root(), 0, &probe, 0, &mut path, sink)
    }

    #[allow(clippy::too_many_arguments)]
    fn exact_walk(
        &self,
        node: NodeId,
        i_run: usize,
        probe: &[char],
        i_probe: usize,
        path: &mut Vec<char>,
        sink: &mut dyn FnMut(Candidate),
    ) -> Result<()> {
        self.token.check()?;
        let run = self.trie.value(node);

        if i_probe >= probe.len() {
            // The probe is spent. Trailing punctuation in the run is fine,
            // a trailing letter makes this a completion rather than a match.
            if run[i_run..].iter().any(|c| c.is_alphabetic()) {
                return Ok(());
            }
            if i_run < run.len() {
                path.extend(run[i_run..].iter());
            }
            if self.trie.is_entry(node) {
                sink(Candidate {
                    word: path.iter().collect(),
                    count: self.trie.count(node),
                    distance: 0.0,
                });
            }
            path.truncate(path.len() - (run.len() - i_run));
            return Ok(());
        }

        if i_run >= run.len() {
            let children: Vec<NodeId> = self.trie.children(node).collect();
            for child in children {
                self.exact_walk(child, 0, probe, i_probe, path, sink)?;
            }
            return Ok(());
        }

        let run_char = run[i_run];
        if self.collator.compare_chars(probe[i_probe], run_char) {
            path.push(run_char);
            self.exact_walk(node, i_run + 1, probe, i_probe + 1, path, sink)?;
            path.pop();
        } else if !run_char.is_alphabetic() {
            path.push(run_char);
            self.exact_walk(node, i_run + 1, probe, i_probe, path, sink)?;
            path.pop();
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn walk(
        &self,
        buf: &mut Vec<char>,
        i_buf: usize,
        node: NodeId,
        i_run: usize,
        distance: f64,
        max: f64,
        sink: &mut dyn FnMut(Candidate),
    ) -> Result<()> {
        if distance > max {
            return Ok(());
        }
        self.token.check()?;

        let run_len = self.trie.value(node).len();

        if i_buf >= buf.len() {
            // Composing exhausted: everything below is a completion.
            let tail: Vec<char> = self.trie.value(node)[i_run..].to_vec();
            buf.extend(tail.iter());
            self.collect_subtree(node, buf, distance, sink)?;
            buf.truncate(buf.len() - tail.len());
            return Ok(());
        }

        if i_run >= run_len {
            // End of this node's run: continue into the children.
            let children: Vec<NodeId> = self.trie.children(node).collect();
            for child in children {
                self.walk(buf, i_buf, child, 0, distance, max, sink)?;
            }
            return Ok(());
        }

        let run_char = self.trie.value(node)[i_run];

        if !run_char.is_alphabetic() && run_char != ' ' {
            // Stored punctuation never counts against the budget.
            buf.insert(i_buf, run_char);
            self.walk(buf, i_buf + 1, node, i_run + 1, distance, max, sink)?;
            buf.remove(i_buf);
            return Ok(());
        }

        let key = buf[i_buf];

        match self.collator.compare_char_to_key(run_char, key) {
            KeyMatch::Equivalent => {
                let saved = buf[i_buf];
                buf[i_buf] = run_char;
                self.walk(buf, i_buf + 1, node, i_run + 1, distance, max, sink)?;
                buf[i_buf] = saved;
                // An exact match ends the hypotheses for this position.
                return Ok(());
            }
            KeyMatch::Adjacent => {
                let saved = buf[i_buf];
                buf[i_buf] = run_char;
                self.walk(
                    buf,
                    i_buf + 1,
                    node,
                    i_run + 1,
                    distance + self.costs.substitute,
                    max,
                    sink,
                )?;
                buf[i_buf] = saved;
            }
            KeyMatch::Mismatch => {}
        }

        // The user may have missed this character entirely.
        buf.insert(i_buf, run_char);
        self.walk(
            buf,
            i_buf + 1,
            node,
            i_run + 1,
            distance + self.costs.missing_key,
            max,
            sink,
        )?;
        buf.remove(i_buf);

        // Duplicated or transposed keystroke: the next typed character is
        // the one this run position wants.
        if i_buf + 1 < buf.len() && self.collator.compare_chars(buf[i_buf + 1], run_char) {
            let removed = buf.remove(i_buf);
            self.walk(
                buf,
                i_buf,
                node,
                i_run,
                distance + self.costs.double_tap,
                max,
                sink,
            )?;
            buf.insert(i_buf, removed);
        }

        // Or the keystroke is simply spurious.
        let removed = buf.remove(i_buf);
        self.walk(
            buf,
            i_buf,
            node,
            i_run,
            distance + self.costs.extra_key,
            max,
            sink,
        )?;
        buf.insert(i_buf, removed);

        Ok(())
    }

    fn collect_subtree(
        &self,
        node: NodeId,
        word: &mut Vec<char>,
        distance: f64,
        sink: &mut dyn FnMut(Candidate),
    ) -> Result<()> {
        self.token.check()?;

        if self.trie.is_entry(node) {
            sink(Candidate {
                word: word.iter().collect(),
                count: self.trie.count(node),
                distance,
            });
        }

        let children: Vec<NodeId> = self.trie.children(node).collect();
        for child in children {
            let len = self.trie.value(child).len();
            word.extend(self.trie.value(child).iter());
            self.collect_subtree(child, word, distance, sink)?;
            word.truncate(word.len() - len);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collate::{AccentFolding, QwertyLayout};
    use crate::distance::max_edit_distance;
    use std::sync::Arc;

    fn collator() -> KeyCollator {
        KeyCollator::new(Arc::new(AccentFolding), Arc::new(QwertyLayout))
    }

    fn lexicon(words: &[(&str, u32)]) -> RadixTrie {
        let mut trie = RadixTrie::new();
        for (word, count) in words {
            trie.insert(word, *count);
        }
        trie
    }

    fn run_search(trie: &RadixTrie, composing: &str) -> Vec<Candidate> {
        let collator = collator();
        let token = CancelToken::new();
        let search = FuzzySearch::new(trie, &collator, EditCosts::default(), &token);
        let mut found = Vec::new();
        let max = max_edit_distance(composing.chars().count());
        search
            .search(composing, max, &mut |c| found.push(c))
            .unwrap();
        found
    }

    #[test]
    fn exact_word_has_zero_distance() {
        let trie = lexicon(&[("the", 100), ("they", 50)]);
        let found = run_search(&trie, "the");
        let the = found.iter().find(|c| c.word == "the").unwrap();
        assert_eq!(the.distance, 0.0);
        assert_eq!(the.count, 100);
    }

    #[test]
    fn completions_keep_the_accumulated_distance() {
        let trie = lexicon(&[("testing", 5)]);
        let found = run_search(&trie, "test");
        let testing = found.iter().find(|c| c.word == "testing").unwrap();
        assert_eq!(testing.distance, 0.0);
    }

    #[test]
    fn transposed_keystrokes_are_recovered() {
        let trie = lexicon(&[("the", 100)]);
        let found = run_search(&trie, "teh");
        let the = found.iter().find(|c| c.word == "the").unwrap();
        assert_eq!(the.distance, 1.0);
    }

    #[test]
    fn adjacent_key_counts_as_substitution() {
        // 'w' neighbors 'e' on QWERTY, so "thw" finds "the" cheaply.
        let trie = lexicon(&[("the", 100)]);
        let found = run_search(&trie, "thw");
        let the = found.iter().find(|c| c.word == "the").unwrap();
        assert_eq!(the.distance, 1.0);
    }

    #[test]
    fn missing_keystroke_is_tolerated() {
        let trie = lexicon(&[("there", 10)]);
        let found = run_search(&trie, "thre");
        assert!(found.iter().any(|c| c.word == "there"));
    }

    #[test]
    fn stored_punctuation_is_free() {
        let trie = lexicon(&[("don't", 10)]);
        let found = run_search(&trie, "dont");
        let dont = found.iter().find(|c| c.word == "don't").unwrap();
        assert_eq!(dont.distance, 0.0);
    }

    #[test]
    fn distance_never_exceeds_the_budget() {
        let trie = lexicon(&[
            ("alpha", 1),
            ("beta", 2),
            ("gamma", 3),
            ("delta", 4),
            ("epsilon", 5),
        ]);
        for composing in ["a", "alp", "gamm", "epsilo", "zzz"] {
            let max = max_edit_distance(composing.chars().count());
            for candidate in run_search(&trie, composing) {
                assert!(
                    candidate.distance <= max,
                    "{} -> {} at {}",
                    composing,
                    candidate.word,
                    candidate.distance
                );
            }
        }
    }

    #[test]
    fn expired_token_aborts_the_walk() {
        let trie = lexicon(&[("the", 100)]);
        let collator = collator();
        let token = CancelToken::new();
        token.expire();
        let search = FuzzySearch::new(&trie, &collator, EditCosts::default(), &token);
        let mut sink = |_c: Candidate| panic!("no candidate should be emitted");
        let result = search.search("the", 2.0, &mut sink);
        assert!(result.is_err());
    }

    #[test]
    fn search_below_prefix_emits_continuations_only() {
        let trie = lexicon(&[
            ("thank you", 6),
            ("thank you very", 3),
            ("thank you for", 2),
        ]);
        let collator = collator();
        let token = CancelToken::new();
        let search = FuzzySearch::new(&trie, &collator, EditCosts::default(), &token);
        let mut found = Vec::new();
        search
            .search_below("thank you ", "", 2.0, &mut |c| found.push(c))
            .unwrap();
        let words: Vec<&str> = found.iter().map(|c| c.word.as_str()).collect();
        assert!(words.contains(&"very"));
        assert!(words.contains(&"for"));
        assert!(!words.iter().any(|w| w.contains("thank")));
    }

    #[test]
    fn exact_matches_ignores_near_misses() {
        let trie = lexicon(&[("the", 100), ("they", 50)]);
        let collator = collator();
        let token = CancelToken::new();
        let search = FuzzySearch::new(&trie, &collator, EditCosts::default(), &token);
        let mut found = Vec::new();
        search
            .exact_matches("The", &mut |c| found.push(c))
            .unwrap();
        // The stored form comes back, not the probe's casing, and the
        // longer entry "they" is not a match.
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].word, "the");
        assert_eq!(found[0].count, 100);
    }

    #[test]
    fn exact_matches_skips_stored_punctuation() {
        let trie = lexicon(&[("don't", 42)]);
        let collator = collator();
        let token = CancelToken::new();
        let search = FuzzySearch::new(&trie, &collator, EditCosts::default(), &token);
        let mut found = Vec::new();
        search
            .exact_matches("dont", &mut |c| found.push(c))
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].word, "don't");
    }
}
