//! Player letter selection
//!
//! Holds the in-progress word as an ordered list of actor ids. The list may go
//! stale when actors are tombstoned or destroyed out of band, so every
//! operation purges dead references before it reads or scores anything.

use glam::Vec2;

use super::actor::{ActorId, ActorTable};
use super::physics::PhysicsWorld;
use crate::config::EmptyPick;
use crate::lexicon::LexiconIndex;

/// Feedback for the current prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixStatus {
    /// No word starts with the selection
    NoMatch,
    /// Some longer word starts with the selection
    PartialMatch,
    /// The selection spells a word
    CompleteMatch,
}

/// A word that scored
#[derive(Debug, Clone, PartialEq)]
pub struct AcceptedWord {
    pub word: String,
    pub actors: Vec<ActorId>,
    /// One point per letter
    pub base_score: u64,
    /// 1 plus the number of touching letter pairs
    pub multiplier: u64,
    pub score: u64,
}

/// Outcome of `SelectionEngine::commit`
#[derive(Debug, Clone, PartialEq)]
pub enum CommitResult {
    /// Nothing was selected
    Empty,
    Accepted(AcceptedWord),
    Rejected { word: String },
}

#[derive(Debug, Clone)]
pub struct SelectionEngine {
    selected: Vec<ActorId>,
    empty_pick: EmptyPick,
    adjacency_margin: f32,
}

impl SelectionEngine {
    pub fn new(empty_pick: EmptyPick, adjacency_margin: f32) -> Self {
        Self {
            selected: Vec::new(),
            empty_pick,
            adjacency_margin,
        }
    }

    pub fn selected(&self) -> &[ActorId] {
        &self.selected
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn contains(&self, id: ActorId) -> bool {
        self.selected.contains(&id)
    }

    pub fn clear(&mut self) -> bool {
        let had_any = !self.selected.is_empty();
        self.selected.clear();
        had_any
    }

    /// Drop references to actors that are gone or tombstoned
    pub fn purge_stale<P: PhysicsWorld>(&mut self, table: &ActorTable<P>) -> usize {
        let before = self.selected.len();
        self.selected.retain(|&id| table.is_live(id));
        before - self.selected.len()
    }

    /// Select an unselected live actor bearing `letter`.
    ///
    /// With a non-empty selection the actor nearest the last selected one
    /// wins; an empty selection uses the configured `EmptyPick`. Ties go to
    /// the earliest spawned actor.
    pub fn extend<P: PhysicsWorld>(&mut self, table: &ActorTable<P>, letter: char) -> Option<ActorId> {
        self.purge_stale(table);

        let reference = match self.selected.last() {
            Some(&last) => table.position(last),
            None => match self.empty_pick {
                EmptyPick::First => None,
                EmptyPick::NearestOrigin => Some(Vec2::ZERO),
            },
        };

        let mut candidates = table
            .bucket(letter)
            .iter()
            .copied()
            .filter(|id| !self.selected.contains(id));

        let picked = match reference {
            None => candidates.next(),
            Some(origin) => {
                let mut best: Option<(ActorId, f32)> = None;
                for id in candidates {
                    let Some(pos) = table.position(id) else {
                        continue;
                    };
                    let d = pos.distance_squared(origin);
                    if best.is_none_or(|(_, best_d)| d < best_d) {
                        best = Some((id, d));
                    }
                }
                best.map(|(id, _)| id)
            }
        }?;

        self.selected.push(picked);
        Some(picked)
    }

    /// Remove the most recently selected actor
    pub fn backspace<P: PhysicsWorld>(&mut self, table: &ActorTable<P>) -> Option<ActorId> {
        self.purge_stale(table);
        self.selected.pop()
    }

    /// Letters of the live selection, in order
    pub fn word<P: PhysicsWorld>(&self, table: &ActorTable<P>) -> String {
        self.selected.iter().filter_map(|&id| table.letter(id)).collect()
    }

    pub fn current_prefix_status<P: PhysicsWorld>(
        &self,
        table: &ActorTable<P>,
        lexicon: &LexiconIndex,
    ) -> PrefixStatus {
        let completions = lexicon.completions(&self.word(table));
        if completions.word_end {
            PrefixStatus::CompleteMatch
        } else if completions.is_empty() {
            PrefixStatus::NoMatch
        } else {
            PrefixStatus::PartialMatch
        }
    }

    /// Score the selection if it spells a word, tombstoning its letters;
    /// otherwise drop it. The selection is empty afterwards either way.
    pub fn commit<P: PhysicsWorld>(
        &mut self,
        table: &mut ActorTable<P>,
        lexicon: &LexiconIndex,
    ) -> CommitResult {
        self.purge_stale(table);
        if self.selected.is_empty() {
            return CommitResult::Empty;
        }

        let word = self.word(table);
        let actors = std::mem::take(&mut self.selected);
        if !lexicon.contains_exact(&word) {
            return CommitResult::Rejected { word };
        }

        let base_score = actors.len() as u64;
        let multiplier = adjacency_multiplier(table, &actors, self.adjacency_margin);
        for &id in &actors {
            table.tombstone(id);
        }
        CommitResult::Accepted(AcceptedWord {
            word,
            actors,
            base_score,
            multiplier,
            score: base_score * multiplier,
        })
    }
}

/// 1 plus the number of unordered pairs whose centers are closer than the
/// sum of their radii plus `margin`
pub fn adjacency_multiplier<P: PhysicsWorld>(table: &ActorTable<P>, actors: &[ActorId], margin: f32) -> u64 {
    let placed: Vec<(Vec2, f32)> = actors
        .iter()
        .filter_map(|&id| Some((table.position(id)?, table.actor(id)?.radius)))
        .collect();
    let mut multiplier = 1;
    for (i, &(pa, ra)) in placed.iter().enumerate() {
        for &(pb, rb) in &placed[i + 1..] {
            let reach = ra + rb + margin;
            if pa.distance_squared(pb) < reach * reach {
                multiplier += 1;
            }
        }
    }
    multiplier
}
