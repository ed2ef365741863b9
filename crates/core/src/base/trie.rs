//! Longest-match base name lookup for magic item names.
//!
//! Magic items wrap their base in a prefix and a suffix
//! (`Fecund Atoll Map of Bameth`), so the base has to be found inside the
//! display name rather than compared against it.

use std::collections::HashMap;

#[derive(Debug, Default)]
struct Node {
    children: HashMap<char, Node>,
    terminal: bool,
}

/// Character trie over known base names.
#[derive(Debug, Default)]
pub struct BaseTrie {
    root: Node,
    len: usize,
}

impl BaseTrie {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, base: &str) {
        let mut node = &mut self.root;
        for c in base.chars() {
            node = node.children.entry(c).or_default();
        }
        if !node.terminal {
            node.terminal = true;
            self.len += 1;
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Find the longest known base contained in `name`.
    ///
    /// Matches start and end on word boundaries. On equal length the
    /// leftmost match wins.
    pub fn longest_match<'a>(&self, name: &'a str) -> Option<&'a str> {
        let mut best: Option<&'a str> = None;

        for (start, _) in word_starts(name) {
            if let Some(found) = self.longest_from(&name[start..]) {
                if best.map_or(true, |b| found.len() > b.len()) {
                    best = Some(found);
                }
            }
        }

        best
    }

    fn longest_from<'a>(&self, rest: &'a str) -> Option<&'a str> {
        let mut node = &self.root;
        let mut longest = None;

        for (i, c) in rest.char_indices() {
            match node.children.get(&c) {
                Some(next) => node = next,
                None => break,
            }
            let end = i + c.len_utf8();
            let at_boundary = rest[end..].chars().next().map_or(true, |n| n == ' ');
            if node.terminal && at_boundary {
                longest = Some(&rest[..end]);
            }
        }

        longest
    }
}

fn word_starts(name: &str) -> impl Iterator<Item = (usize, char)> + '_ {
    let mut previous = ' ';
    name.char_indices().filter(move |&(_, c)| {
        let start = previous == ' ' && c != ' ';
        previous = c;
        start
    })
}
