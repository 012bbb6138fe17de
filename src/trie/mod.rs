//! Compressed radix trie mapping words to frequency counts.
//!
//! Every dictionary source that stores vocabulary uses this structure: a
//! prefix tree whose nodes own contiguous character runs, so common
//! prefixes are stored once. A node with a non-zero count is an *entry*:
//! the concatenation of runs from the root to it spells a real word.
//! Forgetting a word only zeroes its count; nodes are never structurally
//! removed, because their runs may still serve other words.
//!
//! The trie itself is single-threaded by construction. Owners wrap it in a
//! read-write lock: searches are readers, learn/forget are writers.

use smallvec::SmallVec;

/// Index of a node within a [`RadixTrie`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

/// Position inside a node's character run, as returned by prefix descent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunPosition {
    /// The node the descent stopped in.
    pub node: NodeId,
    /// Number of characters of that node's run already consumed.
    pub offset: usize,
}

#[derive(Debug)]
struct Node {
    value: Vec<char>,
    count: u32,
    children: SmallVec<[u32; 4]>,
}

impl Node {
    fn new(value: Vec<char>, count: u32) -> Self {
        Node {
            value,
            count,
            children: SmallVec::new(),
        }
    }
}

/// Compressed prefix tree with per-entry counts and a running count sum.
#[derive(Debug)]
pub struct RadixTrie {
    nodes: Vec<Node>,
    count_sum: u64,
}

impl Default for RadixTrie {
    fn default() -> Self {
        Self::new()
    }
}

impl RadixTrie {
    /// Create an empty trie.
    pub fn new() -> Self {
        RadixTrie {
            nodes: vec![Node::new(Vec::new(), 0)],
            count_sum: 0,
        }
    }

    /// The root node. Its run is empty and it is never an entry.
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Sum of the counts of all entries.
    pub fn count_sum(&self) -> u64 {
        self.count_sum
    }

    /// Number of nodes, including the root.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// The character run owned by `id`.
    pub fn value(&self, id: NodeId) -> &[char] {
        &self.nodes[id.0 as usize].value
    }

    /// The entry count of `id` (zero when the node is not an entry).
    pub fn count(&self, id: NodeId) -> u32 {
        self.nodes[id.0 as usize].count
    }

    /// True if `id` marks the end of a stored word.
    pub fn is_entry(&self, id: NodeId) -> bool {
        self.count(id) > 0
    }

    /// Children of `id`, ordered by the first character of their runs.
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes[id.0 as usize].children.iter().map(|&i| NodeId(i))
    }

    /// Insert `word` with `count`, overwriting the count if the word is
    /// already present. Empty words are ignored.
    pub fn insert(&mut self, word: &str, count: u32) {
        let chars: Vec<char> = word.chars().collect();
        if chars.is_empty() {
            return;
        }
        self.insert_at(0, &chars, count);
    }

    fn insert_at(&mut self, node: usize, s: &[char], count: u32) {
        for slot in 0..self.nodes[node].children.len() {
            let child = self.nodes[node].children[slot] as usize;
            let shared = matching_prefix(&self.nodes[child].value, s);
            if shared == 0 {
                continue;
            }

            let value_len = self.nodes[child].value.len();
            if shared == value_len && shared == s.len() {
                // The word already ends exactly here. Overwrite.
                let old = self.nodes[child].count;
                self.nodes[child].count = count;
                self.count_sum = self.count_sum - u64::from(old) + u64::from(count);
                return;
            }

            if shared == value_len {
                self.insert_at(child, &s[shared..], count);
                return;
            }

            // The run is longer than the shared prefix: split the child.
            let is_entry_here = shared == s.len();
            let mid_count = if is_entry_here { count } else { 0 };
            let mid = self.push_node(Node::new(s[..shared].to_vec(), mid_count));
            let tail = self.nodes[child].value.split_off(shared);
            self.nodes[child].value = tail;

            self.nodes[node].children[slot] = mid as u32;
            self.attach_child(mid, child as u32);
            if !is_entry_here {
                let leaf = self.push_node(Node::new(s[shared..].to_vec(), count));
                self.attach_child(mid, leaf as u32);
            }
            self.count_sum += u64::from(count);
            return;
        }

        let leaf = self.push_node(Node::new(s.to_vec(), count));
        self.attach_child(node, leaf as u32);
        self.count_sum += u64::from(count);
    }

    fn push_node(&mut self, node: Node) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    fn attach_child(&mut self, parent: usize, child: u32) {
        let first = self.nodes[child as usize].value.first().copied();
        // Keep children ordered by the first character of their runs.
        let pos = self.nodes[parent]
            .children
            .iter()
            .position(|&c| self.nodes[c as usize].value.first().copied() > first)
            .unwrap_or_else(|| self.nodes[parent].children.len());
        self.nodes[parent].children.insert(pos, child);
    }

    fn find_exact(&self, word: &str) -> Option<NodeId> {
        let chars: Vec<char> = word.chars().collect();
        if chars.is_empty() {
            return None;
        }
        let mut node = 0usize;
        let mut i = 0usize;
        'descend: while i < chars.len() {
            for &child in &self.nodes[node].children {
                let child = child as usize;
                let value = &self.nodes[child].value;
                if value.first() != chars.get(i) {
                    continue;
                }
                if chars.len() - i < value.len() || value[..] != chars[i..i + value.len()] {
                    return None;
                }
                i += value.len();
                node = child;
                continue 'descend;
            }
            return None;
        }
        Some(NodeId(node as u32))
    }

    /// The count of `word`, by exact-character descent.
    pub fn count_of(&self, word: &str) -> Option<u32> {
        self.find_exact(word)
            .map(|id| self.count(id))
            .filter(|&c| c > 0)
    }

    /// True if `word` is stored as an entry, by exact-character descent.
    pub fn contains(&self, word: &str) -> bool {
        self.count_of(word).is_some()
    }

    /// Set the count of an existing entry. Returns false if `word` is not
    /// an exact entry.
    pub fn set_count(&mut self, word: &str, count: u32) -> bool {
        match self.find_exact(word) {
            Some(id) if self.count(id) > 0 => {
                let old = self.nodes[id.0 as usize].count;
                self.nodes[id.0 as usize].count = count;
                self.count_sum = self.count_sum - u64::from(old) + u64::from(count);
                true
            }
            _ => false,
        }
    }

    /// Clear the entry mark of `word`, leaving the node path in place.
    /// Returns the former count.
    pub fn clear_entry(&mut self, word: &str) -> Option<u32> {
        let id = self.find_exact(word)?;
        let old = self.nodes[id.0 as usize].count;
        if old == 0 {
            return None;
        }
        self.nodes[id.0 as usize].count = 0;
        self.count_sum -= u64::from(old);
        Some(old)
    }

    /// Descend along `prefix` using `compare` for character equivalence.
    ///
    /// Non-alphabetic run characters that fail to match are consumed
    /// silently, so stored punctuation does not block the descent. Returns
    /// the position the descent stopped at, which may be in the middle of a
    /// node's run.
    pub fn descend<F>(&self, prefix: &str, compare: F) -> Option<RunPosition>
    where
        F: Fn(char, char) -> bool + Copy,
    {
        let chars: Vec<char> = prefix.chars().collect();
        if chars.is_empty() {
            return Some(RunPosition {
                node: self.root(),
                offset: 0,
            });
        }
        self.descend_from(0, &chars, compare)
    }

    fn descend_from<F>(&self, node: usize, prefix: &[char], compare: F) -> Option<RunPosition>
    where
        F: Fn(char, char) -> bool + Copy,
    {
        for &child in &self.nodes[node].children {
            let child = child as usize;
            let value = &self.nodes[child].value;
            let mut i = 0usize; // position in prefix
            let mut j = 0usize; // position in value
            while i < prefix.len() && j < value.len() {
                if compare(prefix[i], value[j]) {
                    i += 1;
                    j += 1;
                } else if !value[j].is_alphabetic() {
                    // Punctuation inside the stored word; skip it.
                    j += 1;
                } else {
                    break;
                }
            }
            if i == prefix.len() {
                return Some(RunPosition {
                    node: NodeId(child as u32),
                    offset: j,
                });
            }
            if i > 0 && j == value.len() {
                if let Some(found) = self.descend_from(child, &prefix[i..], compare) {
                    return Some(found);
                }
            }
            // Partial match inside the run, or a failed subtree: try the
            // next sibling.
        }
        None
    }
}

fn matching_prefix(l: &[char], r: &[char]) -> usize {
    l.iter().zip(r.iter()).take_while(|(a, b)| a == b).count()
}
