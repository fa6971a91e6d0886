//! High score leaderboard system
//!
//! Persisted as a versioned JSON file, tracks top 5 scores.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::PersistenceError;
use crate::persistence;

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 5;

/// File format version
pub const HIGHSCORE_VERSION: u32 = 1;

/// Name on the seeded entries
pub const DEFAULT_NAME: &str = "Nucleus";

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    /// Player's score
    pub score: u64,
    pub name: String,
    /// Level reached
    pub level: u32,
}

/// High score leaderboard, sorted descending by score
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Leaderboard for a fresh install: 1000 down to 200
    pub fn seeded() -> Self {
        let mut scores = Self::new();
        for score in [200, 400, 600, 800, 1000] {
            scores.add_score(score, DEFAULT_NAME, 1);
        }
        scores
    }

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        // Check if score beats the lowest entry
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Get the rank a score would achieve (1-indexed, None if doesn't qualify)
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Add a new score to the leaderboard (if it qualifies)
    /// Returns the rank achieved (1-indexed) or None if didn't qualify
    pub fn add_score(&mut self, score: u64, name: &str, level: u32) -> Option<usize> {
        let rank = self.potential_rank(score)?;
        self.entries.insert(
            rank - 1,
            HighScoreEntry {
                score,
                name: name.to_string(),
                level,
            },
        );
        self.entries.truncate(MAX_HIGH_SCORES);
        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    /// Read the table at `path`, falling back to the seeded table when the
    /// file is missing or unreadable
    pub fn load(path: &Path) -> Self {
        match persistence::load_json::<Self>(path, HIGHSCORE_VERSION) {
            Ok(mut scores) => {
                scores.entries.sort_by(|a, b| b.score.cmp(&a.score));
                scores.entries.truncate(MAX_HIGH_SCORES);
                log::info!("Loaded {} high scores", scores.entries.len());
                scores
            }
            Err(PersistenceError::Io { .. }) => {
                log::info!("No high scores found, starting fresh");
                Self::seeded()
            }
            Err(err) => {
                log::warn!("Ignoring high score file {}: {}", path.display(), err);
                Self::seeded()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), PersistenceError> {
        persistence::save_json(path, HIGHSCORE_VERSION, self)?;
        log::info!("High scores saved ({} entries)", self.entries.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_order() {
        let scores = HighScores::seeded();
        let values: Vec<u64> = scores.entries.iter().map(|e| e.score).collect();
        assert_eq!(values, vec![1000, 800, 600, 400, 200]);
        assert!(scores.entries.iter().all(|e| e.name == DEFAULT_NAME));
    }

    #[test]
    fn test_add_score_ranks_and_trims() {
        let mut scores = HighScores::seeded();
        assert_eq!(scores.potential_rank(700), Some(3));
        assert_eq!(scores.add_score(700, "Player", 4), Some(3));
        assert_eq!(scores.entries.len(), MAX_HIGH_SCORES);
        assert_eq!(scores.entries.last().unwrap().score, 400);

        // Ties do not displace existing entries
        assert!(!scores.qualifies(400));
        assert_eq!(scores.add_score(400, "Player", 1), None);
        assert_eq!(scores.add_score(0, "Player", 1), None);
        assert_eq!(scores.add_score(5000, "Best", 9), Some(1));
        assert_eq!(scores.top_score(), Some(5000));
    }

    #[test]
    fn test_partial_table_accepts_anything_positive() {
        let mut scores = HighScores::new();
        assert!(scores.is_empty());
        assert_eq!(scores.add_score(1, "A", 1), Some(1));
        assert_eq!(scores.add_score(3, "B", 1), Some(1));
        assert_eq!(scores.add_score(2, "C", 1), Some(2));
    }

    #[test]
    fn test_load_missing_then_save() {
        let path = std::env::temp_dir().join(format!("nucleus-scores-{}.json", std::process::id()));
        let _ = std::fs::remove_file(&path);

        let mut scores = HighScores::load(&path);
        assert_eq!(scores, HighScores::seeded());

        scores.add_score(900, "Player", 3);
        scores.save(&path).unwrap();
        assert_eq!(HighScores::load(&path), scores);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_load_corrupt_falls_back() {
        let path = std::env::temp_dir().join(format!("nucleus-scores-bad-{}.json", std::process::id()));
        std::fs::write(&path, "not json").unwrap();
        assert_eq!(HighScores::load(&path), HighScores::seeded());
        let _ = std::fs::remove_file(&path);
    }
}
