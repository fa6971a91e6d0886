//! Nucleus - A word-formation arcade game
//!
//! Letters orbit the center of a physics arena; the player spells words from
//! them before the clock runs out.
//!
//! Core modules:
//! - `lexicon`: Prefix tree, completion queries, weighted letter draws
//! - `sim`: Deterministic fixed-step simulation (actors, selection, forces, levels)
//! - `persistence`: Versioned JSON save/load
//! - `config`: Data-driven game tuning
//! - `autoplay`: Idle-mode player

pub mod autoplay;
pub mod config;
pub mod error;
pub mod highscores;
pub mod lexicon;
pub mod persistence;
pub mod sim;

pub use config::{Config, EmptyPick, LevelSpec};
pub use error::{ConfigError, LexiconError, LoadError, PersistenceError};
pub use highscores::HighScores;
pub use lexicon::{Alphabet, LexiconIndex};

use glam::Vec2;

/// Default tuning constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const TIME_STEP: f64 = 1.0 / 60.0;

    /// Half-extent of the world bounds; bodies past it are destroyed
    pub const WORLD_RADIUS: f32 = 100.0;

    /// Spring pull toward the center
    pub const SPRING_CONSTANT: f32 = 10.0;
    /// Velocity damping applied to every letter
    pub const DAMPING: f32 = 5.0;
    /// Outward push on letters being removed
    pub const DESTROY_FORCE: f32 = 100.0;

    /// Live letter cap
    pub const LETTER_COUNT: usize = 46;
    /// Initial time budget (seconds)
    pub const TIME_LIMIT: f64 = 90.0;
    /// Bonus time per level (seconds)
    pub const EXTRA_TIME: f64 = 30.0;

    /// Slack added to radii when testing whether two letters touch
    pub const ADJACENCY_MARGIN: f32 = 0.5;

    pub const DEFAULT_ALPHABET: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZÅÄÖ";
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}
