//! Game configuration
//!
//! Loaded from a JSON file; every field has a default so partial files work.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;

/// Which actor an empty selection picks when several bear the typed letter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EmptyPick {
    /// Earliest spawned actor of that letter
    First,
    /// Actor closest to the arena center
    #[default]
    NearestOrigin,
}

impl EmptyPick {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmptyPick::First => "first",
            EmptyPick::NearestOrigin => "nearest_origin",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "first" => Some(EmptyPick::First),
            "nearest" | "nearest_origin" => Some(EmptyPick::NearestOrigin),
            _ => None,
        }
    }
}

/// One entry of the level schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelSpec {
    /// Letters to clear in this level before advancing
    pub letters: u32,
    /// Spawn cap override for this level
    #[serde(default)]
    pub letter_cap: Option<usize>,
    /// Spring constant override for this level
    #[serde(default)]
    pub spring_constant: Option<f32>,
}

impl LevelSpec {
    pub fn new(letters: u32) -> Self {
        Self {
            letters,
            letter_cap: None,
            spring_constant: None,
        }
    }
}

/// Full game configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // === Physics ===
    /// Half-extent of the square world bounds
    pub world_radius: f32,
    /// Fixed simulation step (seconds)
    pub time_step: f64,
    pub velocity_iterations: u32,
    pub position_iterations: u32,
    pub friction: f32,
    pub restitution: f32,
    pub density: f32,

    // === Force field ===
    pub spring_constant: f32,
    pub damping: f32,
    /// Outward push on tombstoned letters
    pub destroy_force: f32,

    // === Gameplay ===
    /// Default cap on live letters
    pub letter_count: usize,
    /// Initial time budget (seconds)
    pub time_limit: f64,
    /// Time granted per level advance (seconds)
    pub extra_time: f64,
    /// Spawn ring radius
    pub creation_distance: f32,
    /// World time between spawn attempts (seconds)
    pub creation_interval: f64,
    pub min_radius: f32,
    pub max_radius: f32,
    /// Extra distance under which two selected letters count as touching
    pub adjacency_margin: f32,
    pub empty_pick: EmptyPick,
    /// Clamp on a single frame delta (seconds); `None` keeps every delta
    pub max_frame_delta: Option<f64>,
    /// Level thresholds; past the end the game runs in endless mode
    pub levels: Vec<LevelSpec>,

    // === Dictionary ===
    pub alphabet: String,
    pub dictionary_file: PathBuf,
    pub dictionary_cache: PathBuf,

    // === Scores ===
    pub highscore_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            world_radius: WORLD_RADIUS,
            time_step: TIME_STEP,
            velocity_iterations: 10,
            position_iterations: 8,
            friction: 1.0,
            restitution: 0.0,
            density: 1.0,

            spring_constant: SPRING_CONSTANT,
            damping: DAMPING,
            destroy_force: DESTROY_FORCE,

            letter_count: LETTER_COUNT,
            time_limit: TIME_LIMIT,
            extra_time: EXTRA_TIME,
            creation_distance: 30.0,
            creation_interval: 0.1,
            min_radius: 0.8,
            max_radius: 1.2,
            adjacency_margin: ADJACENCY_MARGIN,
            empty_pick: EmptyPick::NearestOrigin,
            max_frame_delta: None,
            levels: [20, 30, 40, 50, 60].into_iter().map(LevelSpec::new).collect(),

            alphabet: DEFAULT_ALPHABET.to_string(),
            dictionary_file: PathBuf::from("/usr/share/dict/swedish"),
            dictionary_cache: PathBuf::from("nucleus-dictionary.json"),

            highscore_file: PathBuf::from("nucleus-highscores.json"),
        }
    }
}

impl Config {
    /// Read and validate a JSON config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&text)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.to_string()));
        if !(self.time_step > 0.0) {
            return invalid("time_step must be positive");
        }
        if !(self.world_radius > 0.0) {
            return invalid("world_radius must be positive");
        }
        if !(self.min_radius > 0.0) || self.min_radius > self.max_radius {
            return invalid("radius range must satisfy 0 < min_radius <= max_radius");
        }
        if !(self.creation_interval > 0.0) {
            return invalid("creation_interval must be positive");
        }
        if self.alphabet.is_empty() {
            return invalid("alphabet must not be empty");
        }
        if self.max_frame_delta.is_some_and(|d| d < self.time_step) {
            return invalid("max_frame_delta must be at least one time_step");
        }
        Ok(())
    }

    /// Alphabet as an ordered symbol set
    pub fn alphabet(&self) -> crate::lexicon::Alphabet {
        crate::lexicon::Alphabet::new(&self.alphabet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_empty_selection_measures_from_center_by_default() {
        assert_eq!(Config::default().empty_pick, EmptyPick::NearestOrigin);
        let config = Config::from_json(r#"{"time_limit": 30.0}"#).unwrap();
        assert_eq!(config.empty_pick, EmptyPick::NearestOrigin);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = Config::from_json(
            r#"{"time_limit": 30.0, "empty_pick": "first", "levels": [{"letters": 5, "letter_cap": 12}]}"#,
        )
        .unwrap();
        assert_eq!(config.time_limit, 30.0);
        assert_eq!(config.empty_pick, EmptyPick::First);
        assert_eq!(config.levels.len(), 1);
        assert_eq!(config.levels[0].letter_cap, Some(12));
        assert_eq!(config.levels[0].spring_constant, None);
        assert_eq!(config.letter_count, LETTER_COUNT);
    }

    #[test]
    fn test_invalid_radius_range() {
        let err = Config::from_json(r#"{"min_radius": 2.0, "max_radius": 1.0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_bad_json() {
        assert!(matches!(
            Config::from_json("{ nope").unwrap_err(),
            ConfigError::Parse(_)
        ));
    }

    #[test]
    fn test_empty_pick_from_str() {
        assert_eq!(EmptyPick::from_str("Nearest"), Some(EmptyPick::NearestOrigin));
        assert_eq!(EmptyPick::from_str("first"), Some(EmptyPick::First));
        assert_eq!(EmptyPick::from_str("last"), None);
        assert_eq!(EmptyPick::NearestOrigin.as_str(), "nearest_origin");
    }
}
