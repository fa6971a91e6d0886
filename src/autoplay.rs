//! Idle/demo mode player
//!
//! Types through the same input API a human uses. Every `think_interval` it
//! either extends the selection with an available letter that keeps it a
//! valid prefix, commits a finished word, or backs off a dead end.

use std::collections::BTreeSet;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::sim::{GameState, PhysicsWorld};

/// What the player did on one update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoAction {
    Extend(char),
    Commit,
    Backspace,
}

#[derive(Debug, Clone)]
pub struct AutoPlayer {
    rng: Pcg32,
    /// Shortest word worth committing while longer ones are still reachable
    min_word_len: usize,
    think_interval: f64,
    cooldown: f64,
    /// Prefixes known to lead nowhere with the letters on the board
    dead_ends: BTreeSet<String>,
    last_live: usize,
}

impl AutoPlayer {
    pub fn new(seed: u64, min_word_len: usize, think_interval: f64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            min_word_len: min_word_len.max(1),
            think_interval,
            cooldown: 0.0,
            dead_ends: BTreeSet::new(),
            last_live: 0,
        }
    }

    /// Advance the think timer by `dt` and act when it expires
    pub fn update<P: PhysicsWorld>(&mut self, state: &mut GameState<P>, dt: f64) -> Option<AutoAction> {
        self.cooldown -= dt;
        if self.cooldown > 0.0 {
            return None;
        }
        self.cooldown += self.think_interval;
        self.act(state)
    }

    /// Pick and perform one input
    pub fn act<P: PhysicsWorld>(&mut self, state: &mut GameState<P>) -> Option<AutoAction> {
        if state.is_game_over() {
            return None;
        }

        // Board changed; old dead ends may be reachable again
        let live = state.table.live_count(None);
        if live != self.last_live {
            self.dead_ends.clear();
            self.last_live = live;
        }

        let word = state.word();
        let completions = state.lexicon.completions(&word);
        let candidates: Vec<char> = completions
            .letters
            .iter()
            .copied()
            .filter(|&letter| {
                state
                    .table
                    .bucket(letter)
                    .iter()
                    .any(|&id| !state.selection.contains(id))
            })
            .filter(|&letter| !self.dead_ends.contains(&format!("{word}{letter}")))
            .collect();

        let length = word.chars().count();
        if completions.word_end && (length >= self.min_word_len || candidates.is_empty()) {
            state.commit();
            self.dead_ends.clear();
            return Some(AutoAction::Commit);
        }

        if !candidates.is_empty() {
            let letter = candidates[self.rng.random_range(0..candidates.len())];
            if state.extend(letter).is_some() {
                return Some(AutoAction::Extend(letter));
            }
        }

        if word.is_empty() {
            return None;
        }
        log::trace!("Autoplay backing off {}", word);
        self.dead_ends.insert(word);
        state.backspace();
        Some(AutoAction::Backspace)
    }
}
