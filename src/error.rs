//! Error types
//!
//! Stale actor ids are deliberately absent: lifecycle operations on unknown
//! actors are no-ops and report `false` instead of failing.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures while building or sampling the lexicon
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexiconError {
    /// A word contains a symbol outside the configured alphabet
    #[error("word {word:?} contains symbol {symbol:?} outside the alphabet")]
    MalformedWord { word: String, symbol: char },
    /// Empty words cannot be indexed
    #[error("empty word in lexicon input")]
    EmptyWord,
    /// Weighted draw attempted with zero total weight
    #[error("lexicon has no letters to draw from")]
    EmptyLexicon,
}

/// Failures while reading or validating a configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Failures of the versioned JSON store
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported format version {found} (expected {expected})")]
    VersionMismatch { expected: u32, found: u32 },
}

/// Fatal startup failure while producing a lexicon
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read word list {path}: {source}")]
    WordSource {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Lexicon(#[from] LexiconError),
    #[error("word list {0} produced an empty lexicon")]
    Empty(PathBuf),
}
