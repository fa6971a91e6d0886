//! Word lexicon
//!
//! - `index`: prefix tree with completion queries and weighted letter draws
//! - `source`: word list reading and the on-disk cache

pub mod index;
pub mod source;

pub use index::{Alphabet, Completions, LexiconIndex};
pub use source::{LexiconCache, LoadPath, build_from_source, load_or_build, read_word_list};
