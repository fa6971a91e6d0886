//! Word source and lexicon cache
//!
//! The cache stores the logical content of a built lexicon (alphabet, words,
//! counts) so startup can skip reading the full word list.

use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::index::{Alphabet, LexiconIndex};
use crate::error::LoadError;
use crate::persistence;

/// Cache format version
pub const CACHE_VERSION: u32 = 1;

/// Which path produced the lexicon
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPath {
    Cache,
    Source,
}

/// Read one word per line: trimmed, upper-cased, blanks and words with
/// symbols outside `alphabet` skipped. Repeats (often case variants) are
/// kept once, in first-seen order.
pub fn read_word_list<R: BufRead>(reader: R, alphabet: &Alphabet) -> io::Result<Vec<String>> {
    let mut words = Vec::new();
    let mut seen = BTreeSet::new();
    let mut rejected = 0usize;
    for line in reader.lines() {
        let word = line?.trim().to_uppercase();
        if word.is_empty() {
            continue;
        }
        if !word.chars().all(|c| alphabet.contains(c)) {
            rejected += 1;
        } else if seen.insert(word.clone()) {
            words.push(word);
        }
    }
    log::debug!("Read {} words ({} outside alphabet)", words.len(), rejected);
    Ok(words)
}

/// Persisted lexicon content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LexiconCache {
    pub alphabet: String,
    pub words: Vec<String>,
    pub counts: BTreeMap<char, u64>,
}

impl LexiconCache {
    pub fn from_index(index: &LexiconIndex) -> Self {
        Self {
            alphabet: index.alphabet().as_string(),
            words: index.words(),
            counts: index.counts(),
        }
    }

    /// Rebuild the index; `None` if the cache does not match `alphabet` or
    /// its stored counts disagree with its words.
    pub fn into_index(self, alphabet: &Alphabet) -> Option<LexiconIndex> {
        if Alphabet::new(&self.alphabet) != *alphabet {
            log::warn!("Lexicon cache built for a different alphabet");
            return None;
        }
        let index = match LexiconIndex::build(alphabet.clone(), &self.words) {
            Ok(index) => index,
            Err(e) => {
                log::warn!("Lexicon cache has bad words: {}", e);
                return None;
            }
        };
        if index.counts() != self.counts {
            log::warn!("Lexicon cache counts do not match its words");
            return None;
        }
        Some(index)
    }
}

/// Build the index straight from a word list file
pub fn build_from_source(source: &Path, alphabet: &Alphabet) -> Result<LexiconIndex, LoadError> {
    let file = File::open(source).map_err(|e| LoadError::WordSource {
        path: source.to_path_buf(),
        source: e,
    })?;
    let words = read_word_list(BufReader::new(file), alphabet).map_err(|e| LoadError::WordSource {
        path: source.to_path_buf(),
        source: e,
    })?;
    let index = LexiconIndex::build(alphabet.clone(), &words)?;
    if index.is_empty() {
        return Err(LoadError::Empty(source.to_path_buf()));
    }
    Ok(index)
}

/// Try the cache first, fall back to the word list and refresh the cache.
///
/// An empty lexicon is never accepted from either path.
pub fn load_or_build(
    cache: &Path,
    source: &Path,
    alphabet: &Alphabet,
) -> Result<(LexiconIndex, LoadPath), LoadError> {
    match persistence::load_json::<LexiconCache>(cache, CACHE_VERSION) {
        Ok(cached) => match cached.into_index(alphabet) {
            Some(index) if !index.is_empty() => {
                log::info!("Loaded {} words from cache {}", index.len(), cache.display());
                return Ok((index, LoadPath::Cache));
            }
            _ => log::info!("Ignoring stale lexicon cache {}", cache.display()),
        },
        Err(e) => log::info!("No usable lexicon cache: {}", e),
    }

    log::info!("Parsing word list {}", source.display());
    let index = build_from_source(source, alphabet)?;
    log::info!("Indexed {} words", index.len());

    if let Err(e) = persistence::save_json(cache, CACHE_VERSION, &LexiconCache::from_index(&index)) {
        log::warn!("Could not write lexicon cache: {}", e);
    }
    Ok((index, LoadPath::Source))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Cursor;
    use std::path::PathBuf;

    fn scratch(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("nucleus-lexicon-{}-{name}", std::process::id()))
    }

    #[test]
    fn test_read_word_list_filters() {
        let alphabet = Alphabet::new("ABCDEFGHIJKLMNOPQRSTUVWXYZÅÄÖ");
        let text = "katt\n  hund \n\nfår\nx-ray\nöl\nKatt\n";
        let words = read_word_list(Cursor::new(text), &alphabet).unwrap();
        assert_eq!(words, vec!["KATT", "HUND", "FÅR", "ÖL"]);
    }

    #[test]
    fn test_load_or_build_falls_back_then_uses_cache() {
        let alphabet = Alphabet::new("ABCDEFGHIJKLMNOPQRSTUVWXYZ");
        let cache = scratch("fallback-cache.json");
        let source = scratch("fallback-words.txt");
        let _ = fs::remove_file(&cache);
        fs::write(&source, "cat\ncar\ncard\n").unwrap();

        let (first, path) = load_or_build(&cache, &source, &alphabet).unwrap();
        assert_eq!(path, LoadPath::Source);
        assert!(cache.exists());

        let (second, path) = load_or_build(&cache, &source, &alphabet).unwrap();
        assert_eq!(path, LoadPath::Cache);
        assert_eq!(first.words(), second.words());
        assert_eq!(first.counts(), second.counts());

        let _ = fs::remove_file(&cache);
        let _ = fs::remove_file(&source);
    }

    #[test]
    fn test_cache_with_wrong_counts_is_rejected() {
        let alphabet = Alphabet::new("ABC");
        let mut cache = LexiconCache {
            alphabet: "ABC".into(),
            words: vec!["AB".into()],
            counts: BTreeMap::from([('A', 1), ('B', 1)]),
        };
        assert!(cache.clone().into_index(&alphabet).is_some());
        cache.counts.insert('C', 4);
        assert!(cache.into_index(&alphabet).is_none());
    }

    #[test]
    fn test_cache_from_repeated_words_reloads() {
        let alphabet = Alphabet::new("ABC");
        let index = LexiconIndex::build(alphabet.clone(), ["AB", "CAB", "AB"]).unwrap();
        let cache = LexiconCache::from_index(&index);
        assert_eq!(cache.words, vec!["AB", "CAB"]);

        let reloaded = cache.into_index(&alphabet).unwrap();
        assert_eq!(reloaded.counts(), index.counts());
        assert_eq!(reloaded.count('A'), 2);
    }

    #[test]
    fn test_cache_for_other_alphabet_is_rejected() {
        let cache = LexiconCache {
            alphabet: "AB".into(),
            words: vec!["AB".into()],
            counts: BTreeMap::from([('A', 1), ('B', 1)]),
        };
        assert!(cache.into_index(&Alphabet::new("ABC")).is_none());
    }

    #[test]
    fn test_missing_source_is_fatal() {
        let alphabet = Alphabet::new("ABC");
        let cache = scratch("nosource-cache.json");
        let _ = fs::remove_file(&cache);
        let err = load_or_build(&cache, &scratch("does-not-exist.txt"), &alphabet).unwrap_err();
        assert!(matches!(err, LoadError::WordSource { .. }));
    }

    #[test]
    fn test_empty_source_is_fatal() {
        let alphabet = Alphabet::new("ABC");
        let cache = scratch("empty-cache.json");
        let source = scratch("empty-words.txt");
        let _ = fs::remove_file(&cache);
        fs::write(&source, "\nxyz\n").unwrap();
        let err = load_or_build(&cache, &source, &alphabet).unwrap_err();
        assert!(matches!(err, LoadError::Empty(_)));
        let _ = fs::remove_file(&source);
    }
}
