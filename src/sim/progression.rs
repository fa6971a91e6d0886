//! Level and time budget
//!
//! Evaluated once per fixed step with the current world time. Running out of
//! time wins over a level advance in the same step; past the end of the level
//! schedule no further advances happen (endless mode).

use super::force::ForceField;
use crate::config::{Config, LevelSpec};

/// What changed in this step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    None,
    /// World time is past the limit; reported every step once reached
    TimeUp,
    LevelAdvanced { level: u32 },
}

#[derive(Debug, Clone)]
pub struct ProgressionController {
    /// 1-based
    level: u32,
    time_limit: f64,
    letters_cleared: u32,
    world_time: f64,
    closing: bool,
    levels: Vec<LevelSpec>,
    extra_time: f64,
    default_cap: usize,
    base_field: ForceField,
}

impl ProgressionController {
    pub fn new(config: &Config) -> Self {
        Self {
            level: 1,
            time_limit: config.time_limit,
            letters_cleared: 0,
            world_time: 0.0,
            closing: false,
            levels: config.levels.clone(),
            extra_time: config.extra_time,
            default_cap: config.letter_count,
            base_field: ForceField {
                spring_constant: config.spring_constant,
                damping: config.damping,
                destroy_force: config.destroy_force,
            },
        }
    }

    /// Check the time budget, then the level threshold
    pub fn evaluate(&mut self, world_time: f64) -> Transition {
        debug_assert!(world_time >= self.world_time, "world time went backwards");
        self.world_time = world_time;

        if self.world_time > self.time_limit {
            if !self.closing {
                log::info!("Time up at level {} ({:.2}s)", self.level, self.world_time);
            }
            self.closing = true;
            return Transition::TimeUp;
        }

        let Some(threshold) = self.current_threshold() else {
            return Transition::None;
        };
        if self.letters_cleared < threshold {
            return Transition::None;
        }

        self.level += 1;
        self.time_limit += self.extra_time;
        self.letters_cleared = 0;
        log::info!(
            "Level {} reached, time limit now {:.0}s",
            self.level,
            self.time_limit
        );
        Transition::LevelAdvanced { level: self.level }
    }

    /// Credit letters from an accepted word
    pub fn record_cleared(&mut self, letters: u32) {
        self.letters_cleared += letters;
    }

    fn current_spec(&self) -> Option<&LevelSpec> {
        self.levels.get(self.level as usize - 1)
    }

    /// Letters needed to finish the current level; `None` in endless mode
    pub fn current_threshold(&self) -> Option<u32> {
        self.current_spec().map(|spec| spec.letters)
    }

    /// Live letter cap for spawning
    pub fn letter_cap(&self) -> usize {
        self.current_spec()
            .and_then(|spec| spec.letter_cap)
            .unwrap_or(self.default_cap)
    }

    /// Force field parameters for the current level
    pub fn force_field(&self) -> ForceField {
        let mut field = self.base_field;
        if let Some(k) = self.current_spec().and_then(|spec| spec.spring_constant) {
            field.spring_constant = k;
        }
        field
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn letters_cleared(&self) -> u32 {
        self.letters_cleared
    }

    pub fn time_limit(&self) -> f64 {
        self.time_limit
    }

    pub fn world_time(&self) -> f64 {
        self.world_time
    }

    pub fn is_closing(&self) -> bool {
        self.closing
    }

    pub fn time_remaining(&self) -> f64 {
        (self.time_limit - self.world_time).max(0.0)
    }

    /// Remaining time as `m:ss`
    pub fn format_time(&self) -> String {
        let seconds = self.time_remaining() as u64;
        format!("{}:{:02}", seconds / 60, seconds % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(levels: &[u32]) -> Config {
        Config {
            time_limit: 1.0,
            extra_time: 2.0,
            letter_count: 10,
            levels: levels.iter().copied().map(LevelSpec::new).collect(),
            ..Config::default()
        }
    }

    #[test]
    fn test_time_limit_is_strict() {
        let mut p = ProgressionController::new(&config(&[]));
        for step in 1..=4 {
            assert_eq!(p.evaluate(step as f64 * 0.25), Transition::None);
        }
        assert_eq!(p.world_time(), p.time_limit());
        assert!(!p.is_closing());

        assert_eq!(p.evaluate(1.25), Transition::TimeUp);
        assert!(p.is_closing());
        assert_eq!(p.evaluate(1.5), Transition::TimeUp);
        assert_eq!(p.time_remaining(), 0.0);
    }

    #[test]
    fn test_level_advance() {
        let mut p = ProgressionController::new(&config(&[3, 5]));
        assert_eq!(p.current_threshold(), Some(3));
        p.record_cleared(2);
        assert_eq!(p.evaluate(0.25), Transition::None);
        p.record_cleared(1);
        assert_eq!(p.evaluate(0.5), Transition::LevelAdvanced { level: 2 });
        assert_eq!(p.letters_cleared(), 0);
        assert_eq!(p.time_limit(), 3.0);
        assert_eq!(p.current_threshold(), Some(5));
    }

    #[test]
    fn test_endless_after_schedule() {
        let mut p = ProgressionController::new(&config(&[1]));
        p.record_cleared(1);
        assert_eq!(p.evaluate(0.25), Transition::LevelAdvanced { level: 2 });
        assert_eq!(p.current_threshold(), None);
        p.record_cleared(100);
        assert_eq!(p.evaluate(0.5), Transition::None);
        assert_eq!(p.level(), 2);
    }

    #[test]
    fn test_time_up_wins_over_threshold() {
        let mut p = ProgressionController::new(&config(&[1]));
        p.record_cleared(5);
        assert_eq!(p.evaluate(1.5), Transition::TimeUp);
        assert_eq!(p.level(), 1);
    }

    #[test]
    fn test_level_overrides() {
        let mut cfg = config(&[]);
        cfg.levels = vec![
            LevelSpec::new(1),
            LevelSpec {
                letters: 4,
                letter_cap: Some(20),
                spring_constant: Some(12.5),
            },
        ];
        let mut p = ProgressionController::new(&cfg);
        assert_eq!(p.letter_cap(), 10);
        assert_eq!(p.force_field().spring_constant, cfg.spring_constant);

        p.record_cleared(1);
        p.evaluate(0.1);
        assert_eq!(p.letter_cap(), 20);
        assert_eq!(p.force_field().spring_constant, 12.5);
        assert_eq!(p.force_field().damping, cfg.damping);
    }

    #[test]
    fn test_format_time() {
        let mut cfg = config(&[]);
        cfg.time_limit = 90.0;
        let mut p = ProgressionController::new(&cfg);
        assert_eq!(p.format_time(), "1:30");
        p.evaluate(85.5);
        assert_eq!(p.format_time(), "0:04");
    }
}
