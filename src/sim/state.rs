//! Game context and outbound events
//!
//! One `GameState` owns everything a running game needs. Player input enters
//! through the methods here; time enters through `tick::advance`.

use std::sync::Arc;

use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::actor::{ActorId, ActorTable, SpriteHandle};
use super::arena::ArenaPhysics;
use super::clock::SimulationClock;
use super::physics::{Material, PhysicsWorld};
use super::progression::ProgressionController;
use super::selection::{CommitResult, PrefixStatus, SelectionEngine};
use crate::config::Config;
use crate::lexicon::LexiconIndex;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Letters spawn and words score
    Playing,
    /// Time ran out; remaining letters are flying off and nothing spawns
    Closing,
    /// No actors left after closing
    GameOver,
}

/// Notifications for presentation and audio. Consumers may ignore any of them.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    ActorSpawned {
        id: ActorId,
        letter: char,
        radius: f32,
    },
    ActorTombstoned {
        id: ActorId,
    },
    ActorDestroyed {
        id: ActorId,
        /// Sprite to release, if one was attached
        sprite: Option<SpriteHandle>,
    },
    SelectionChanged {
        word: String,
    },
    WordAccepted {
        word: String,
        score: u64,
    },
    WordRejected {
        word: String,
    },
    LevelAdvanced {
        level: u32,
    },
    GameOver {
        score: u64,
    },
}

/// A running game
#[derive(Debug)]
pub struct GameState<P: PhysicsWorld> {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub config: Config,
    pub lexicon: Arc<LexiconIndex>,
    pub table: ActorTable<P>,
    pub selection: SelectionEngine,
    pub progression: ProgressionController,
    pub clock: SimulationClock,
    /// World time of the next spawn attempt
    pub next_spawn_at: f64,
    pub score: u64,
    pub words_accepted: u32,
    pub phase: GamePhase,
    events: Vec<GameEvent>,
}

impl<P: PhysicsWorld> GameState<P> {
    pub fn new(config: Config, lexicon: Arc<LexiconIndex>, physics: P, seed: u64) -> Self {
        let material = Material {
            density: config.density,
            friction: config.friction,
            restitution: config.restitution,
        };
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            lexicon,
            table: ActorTable::new(physics, material),
            selection: SelectionEngine::new(config.empty_pick, config.adjacency_margin),
            progression: ProgressionController::new(&config),
            clock: SimulationClock::new(config.time_step, config.max_frame_delta),
            next_spawn_at: config.creation_interval,
            score: 0,
            words_accepted: 0,
            phase: GamePhase::Playing,
            events: Vec::new(),
            config,
        }
    }

    /// Queue an event behind whatever the actor table has already reported
    pub fn emit(&mut self, event: GameEvent) {
        self.events.extend(self.table.take_events());
        self.events.push(event);
    }

    /// Take every pending event, oldest first
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.events.extend(self.table.take_events());
        std::mem::take(&mut self.events)
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    fn accepts_input(&self) -> bool {
        self.phase != GamePhase::GameOver
    }

    pub(crate) fn selection_changed(&mut self) {
        let word = self.selection.word(&self.table);
        self.emit(GameEvent::SelectionChanged { word });
    }

    /// Select one more actor bearing `letter`
    pub fn extend(&mut self, letter: char) -> Option<ActorId> {
        if !self.accepts_input() {
            return None;
        }
        let picked = self.selection.extend(&self.table, letter)?;
        self.selection_changed();
        Some(picked)
    }

    pub fn backspace(&mut self) -> Option<ActorId> {
        if !self.accepts_input() {
            return None;
        }
        let removed = self.selection.backspace(&self.table)?;
        self.selection_changed();
        Some(removed)
    }

    /// Drop the whole selection
    pub fn cancel(&mut self) -> bool {
        if !self.selection.clear() {
            return false;
        }
        self.selection_changed();
        true
    }

    /// Try the current selection as a word
    pub fn commit(&mut self) -> CommitResult {
        if !self.accepts_input() {
            return CommitResult::Empty;
        }
        let result = self.selection.commit(&mut self.table, &self.lexicon);
        if result == CommitResult::Empty {
            return result;
        }
        match &result {
            CommitResult::Empty => {}
            CommitResult::Accepted(accepted) => {
                self.score += accepted.score;
                self.words_accepted += 1;
                self.progression.record_cleared(accepted.actors.len() as u32);
                log::debug!(
                    "Accepted {} for {} x {} = {}",
                    accepted.word,
                    accepted.base_score,
                    accepted.multiplier,
                    accepted.score
                );
                self.emit(GameEvent::WordAccepted {
                    word: accepted.word.clone(),
                    score: accepted.score,
                });
            }
            CommitResult::Rejected { word } => {
                log::debug!("Rejected {}", word);
                self.emit(GameEvent::WordRejected { word: word.clone() });
            }
        }
        self.selection_changed();
        result
    }

    /// Feed typed characters: alphabet letters extend (case-insensitive),
    /// newline commits, backspace removes. Returns how many letters were
    /// selected.
    pub fn type_text(&mut self, text: &str) -> usize {
        let mut selected = 0;
        for ch in text.chars() {
            match ch {
                '\n' | '\r' => {
                    self.commit();
                }
                '\u{8}' => {
                    self.backspace();
                }
                _ => {
                    let letter = ch.to_uppercase().next().unwrap_or(ch);
                    if self.lexicon.alphabet().contains(letter) && self.extend(letter).is_some() {
                        selected += 1;
                    }
                }
            }
        }
        selected
    }

    /// Letters currently selected
    pub fn word(&self) -> String {
        self.selection.word(&self.table)
    }

    pub fn prefix_status(&self) -> PrefixStatus {
        self.selection.current_prefix_status(&self.table, &self.lexicon)
    }

    pub fn level(&self) -> u32 {
        self.progression.level()
    }

    pub fn time_remaining(&self) -> f64 {
        self.progression.time_remaining()
    }
}

impl GameState<ArenaPhysics> {
    /// Game on the built-in arena world sized from the config
    pub fn with_arena(config: Config, lexicon: Arc<LexiconIndex>, seed: u64) -> Self {
        let physics = ArenaPhysics::new(config.world_radius);
        Self::new(config, lexicon, physics, seed)
    }
}
