//! Prefix tree over the word list
//!
//! Nodes live in a flat arena and link to children by index. Per-symbol
//! occurrence counts are kept beside the tree, together with a cumulative
//! table so weighted draws are a binary search instead of a scan.

use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::LexiconError;

/// Ordered set of symbols the lexicon accepts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alphabet {
    symbols: Vec<char>,
}

impl Alphabet {
    /// Build from a string of symbols; duplicates are dropped, order is kept
    pub fn new(symbols: &str) -> Self {
        let mut seen = Vec::new();
        for c in symbols.chars() {
            if !seen.contains(&c) {
                seen.push(c);
            }
        }
        Self { symbols: seen }
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn contains(&self, symbol: char) -> bool {
        self.index_of(symbol).is_some()
    }

    pub fn index_of(&self, symbol: char) -> Option<usize> {
        self.symbols.iter().position(|&c| c == symbol)
    }

    pub fn symbols(&self) -> &[char] {
        &self.symbols
    }

    pub fn as_string(&self) -> String {
        self.symbols.iter().collect()
    }
}

impl Default for Alphabet {
    fn default() -> Self {
        Self::new(crate::consts::DEFAULT_ALPHABET)
    }
}

/// Result of a completion query
///
/// `letters` are the symbols that extend the prefix toward some indexed word,
/// in alphabet order. `word_end` is the reserved marker: the prefix itself is
/// a complete word.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Completions {
    pub letters: Vec<char>,
    pub word_end: bool,
}

impl Completions {
    /// True when the prefix leads nowhere
    pub fn is_empty(&self) -> bool {
        self.letters.is_empty() && !self.word_end
    }

    pub fn contains(&self, letter: char) -> bool {
        self.letters.contains(&letter)
    }
}

#[derive(Debug, Clone, Default)]
struct Node {
    children: BTreeMap<char, u32>,
    terminal: bool,
}

/// Read-only word index built once at startup
#[derive(Debug, Clone)]
pub struct LexiconIndex {
    alphabet: Alphabet,
    nodes: Vec<Node>,
    /// Occurrence count per alphabet position
    counts: Vec<u64>,
    /// Running sum of `counts`; last entry is the total weight
    cumulative: Vec<u64>,
    word_count: usize,
}

const ROOT: usize = 0;

impl LexiconIndex {
    /// Index every word. Fails on the first word that is empty or uses a
    /// symbol outside `alphabet`; nothing partial is returned. A repeated
    /// word is indexed and counted once.
    pub fn build<I, S>(alphabet: Alphabet, words: I) -> Result<Self, LexiconError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut index = Self {
            counts: vec![0; alphabet.len()],
            cumulative: Vec::new(),
            alphabet,
            nodes: vec![Node::default()],
            word_count: 0,
        };
        for word in words {
            index.insert(word.as_ref())?;
        }
        index.rebuild_cumulative();
        log::debug!(
            "Lexicon built: {} words, {} nodes, {} letters",
            index.word_count,
            index.nodes.len(),
            index.total_weight()
        );
        Ok(index)
    }

    fn insert(&mut self, word: &str) -> Result<(), LexiconError> {
        if word.is_empty() {
            return Err(LexiconError::EmptyWord);
        }
        // Validate before touching the tree so counts never see a bad word
        let mut positions = Vec::with_capacity(word.len());
        for symbol in word.chars() {
            match self.alphabet.index_of(symbol) {
                Some(i) => positions.push(i),
                None => {
                    return Err(LexiconError::MalformedWord {
                        word: word.to_string(),
                        symbol,
                    });
                }
            }
        }

        if self.contains_exact(word) {
            return Ok(());
        }

        let mut node = ROOT;
        for (symbol, pos) in word.chars().zip(positions) {
            self.counts[pos] += 1;
            node = match self.nodes[node].children.get(&symbol) {
                Some(&child) => child as usize,
                None => {
                    let child = self.nodes.len();
                    self.nodes.push(Node::default());
                    self.nodes[node].children.insert(symbol, child as u32);
                    child
                }
            };
        }
        self.nodes[node].terminal = true;
        self.word_count += 1;
        Ok(())
    }

    fn rebuild_cumulative(&mut self) {
        let mut sum = 0;
        self.cumulative = self
            .counts
            .iter()
            .map(|&c| {
                sum += c;
                sum
            })
            .collect();
    }

    /// Walk the tree along `prefix`
    fn find<I>(&self, prefix: I) -> Option<usize>
    where
        I: IntoIterator<Item = char>,
    {
        let mut node = ROOT;
        for symbol in prefix {
            node = *self.nodes[node].children.get(&symbol)? as usize;
        }
        Some(node)
    }

    /// Symbols that can follow `prefix`, plus the word-end marker
    pub fn completions(&self, prefix: &str) -> Completions {
        if self.word_count == 0 {
            return Completions::default();
        }
        match self.find(prefix.chars()) {
            Some(node) => {
                let node = &self.nodes[node];
                let mut letters: Vec<char> = node.children.keys().copied().collect();
                letters.sort_by_key(|&c| self.alphabet.index_of(c));
                Completions {
                    letters,
                    word_end: node.terminal,
                }
            }
            None => Completions::default(),
        }
    }

    pub fn contains_exact(&self, word: &str) -> bool {
        self.find(word.chars())
            .is_some_and(|node| self.nodes[node].terminal)
    }

    /// Draw a symbol with probability proportional to its occurrence count
    pub fn weighted_random_symbol<R: Rng>(&self, rng: &mut R) -> Result<char, LexiconError> {
        let total = self.total_weight();
        if total == 0 {
            return Err(LexiconError::EmptyLexicon);
        }
        let roll = rng.random_range(0..total);
        // First bucket whose running sum exceeds the roll
        let pos = self.cumulative.partition_point(|&c| c <= roll);
        Ok(self.alphabet.symbols()[pos])
    }

    /// Occurrence count of one symbol across all (word, position) pairs
    pub fn count(&self, symbol: char) -> u64 {
        self.alphabet
            .index_of(symbol)
            .map(|i| self.counts[i])
            .unwrap_or(0)
    }

    /// Counts keyed by symbol, zero entries omitted
    pub fn counts(&self) -> BTreeMap<char, u64> {
        self.alphabet
            .symbols()
            .iter()
            .zip(&self.counts)
            .filter(|(_, c)| **c > 0)
            .map(|(&s, &c)| (s, c))
            .collect()
    }

    pub fn total_weight(&self) -> u64 {
        self.cumulative.last().copied().unwrap_or(0)
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    /// Number of distinct words indexed
    pub fn len(&self) -> usize {
        self.word_count
    }

    pub fn is_empty(&self) -> bool {
        self.word_count == 0
    }

    /// All indexed words, depth first in code point order
    pub fn words(&self) -> Vec<String> {
        let mut out = Vec::with_capacity(self.word_count);
        let mut prefix = String::new();
        self.collect_words(ROOT, &mut prefix, &mut out);
        out
    }

    fn collect_words(&self, node: usize, prefix: &mut String, out: &mut Vec<String>) {
        if self.nodes[node].terminal {
            out.push(prefix.clone());
        }
        for (&symbol, &child) in &self.nodes[node].children {
            prefix.push(symbol);
            self.collect_words(child as usize, prefix, out);
            prefix.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn lexicon(words: &[&str]) -> LexiconIndex {
        LexiconIndex::build(Alphabet::new("ABCDEFGHIJKLMNOPQRSTUVWXYZ"), words).unwrap()
    }

    #[test]
    fn test_completions_scenario() {
        let lex = lexicon(&["CAT", "CAR", "CARD"]);

        let ca = lex.completions("CA");
        assert_eq!(ca.letters, vec!['R', 'T']);
        assert!(!ca.word_end);

        let car = lex.completions("CAR");
        assert_eq!(car.letters, vec!['D']);
        assert!(car.word_end);

        assert!(lex.completions("DOG").is_empty());
    }

    #[test]
    fn test_empty_prefix() {
        let lex = lexicon(&["CAT", "DOG"]);
        assert_eq!(lex.completions("").letters, vec!['C', 'D']);

        let empty = lexicon(&[]);
        assert!(empty.completions("").is_empty());
        assert!(empty.is_empty());
    }

    #[test]
    fn test_contains_exact() {
        let lex = lexicon(&["CAT", "CAR", "CARD"]);
        assert!(lex.contains_exact("CAR"));
        assert!(lex.contains_exact("CARD"));
        assert!(!lex.contains_exact("CA"));
        assert!(!lex.contains_exact("CARDS"));
        assert!(!lex.contains_exact(""));
    }

    #[test]
    fn test_malformed_word_rejected() {
        let err = LexiconIndex::build(Alphabet::new("ABC"), ["AB", "ABX"]).unwrap_err();
        assert_eq!(
            err,
            LexiconError::MalformedWord {
                word: "ABX".into(),
                symbol: 'X'
            }
        );

        let err = LexiconIndex::build(Alphabet::new("ABC"), ["AB", ""]).unwrap_err();
        assert_eq!(err, LexiconError::EmptyWord);
    }

    #[test]
    fn test_counts_per_position() {
        let lex = lexicon(&["AAB", "BA"]);
        assert_eq!(lex.count('A'), 3);
        assert_eq!(lex.count('B'), 2);
        assert_eq!(lex.count('Z'), 0);
        assert_eq!(lex.total_weight(), 5);
        assert_eq!(lex.len(), 2);
    }

    #[test]
    fn test_duplicate_words_counted_once() {
        let lex = lexicon(&["AB", "ABC", "AB"]);
        assert_eq!(lex.len(), 2);
        assert_eq!(lex.count('A'), 2);
        assert_eq!(lex.count('C'), 1);
        assert_eq!(lex.total_weight(), 5);
    }

    #[test]
    fn test_weighted_draw_empty() {
        let lex = lexicon(&[]);
        let mut rng = Pcg32::seed_from_u64(1);
        assert_eq!(
            lex.weighted_random_symbol(&mut rng),
            Err(LexiconError::EmptyLexicon)
        );
    }

    #[test]
    fn test_weighted_draw_converges() {
        // A: 6, B: 3, C: 1
        let lex = lexicon(&["AAAAAA", "BBB", "C"]);
        let mut rng = Pcg32::seed_from_u64(42);
        let n = 100_000;
        let mut hits = BTreeMap::new();
        for _ in 0..n {
            *hits.entry(lex.weighted_random_symbol(&mut rng).unwrap()).or_insert(0u32) += 1;
        }
        for (symbol, expected) in [('A', 0.6), ('B', 0.3), ('C', 0.1)] {
            let freq = hits[&symbol] as f64 / n as f64;
            assert!(
                (freq - expected).abs() < 0.01,
                "{symbol}: {freq} vs {expected}"
            );
        }
        assert!(!hits.contains_key(&'D'));
    }

    #[test]
    fn test_words_round_trip() {
        let lex = lexicon(&["CARD", "CAT", "CAR"]);
        assert_eq!(lex.words(), vec!["CAR", "CARD", "CAT"]);
    }

    proptest! {
        #[test]
        fn prop_every_word_is_found(words in prop::collection::vec("[A-E]{1,6}", 0..40)) {
            let lex = LexiconIndex::build(Alphabet::new("ABCDE"), &words).unwrap();
            for w in &words {
                prop_assert!(lex.contains_exact(w));
            }
        }

        #[test]
        fn prop_completions_empty_iff_not_prefix(
            words in prop::collection::vec("[A-D]{1,5}", 1..30),
            prefix in "[A-D]{0,4}",
        ) {
            let lex = LexiconIndex::build(Alphabet::new("ABCD"), &words).unwrap();
            let is_prefix = words.iter().any(|w| w.starts_with(&prefix));
            prop_assert_eq!(lex.completions(&prefix).is_empty(), !is_prefix);
        }
    }
}
