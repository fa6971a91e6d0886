//! Letter actors and their physics bodies
//!
//! `ActorTable` is the only owner of the body <-> actor association. Actors
//! live in an id-keyed arena; the reverse link from a body is a side table,
//! never data stored on the body. Every lifecycle call tolerates stale ids.

use std::collections::{BTreeMap, HashMap};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::physics::{BodyDef, BodyHandle, Material, PhysicsWorld};
use super::state::GameEvent;

/// Stable actor identifier, never reused within a table
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ActorId(pub u32);

/// Presentation-side handle for an actor's sprite (owned by the presentation layer)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpriteHandle(pub u64);

/// One letter tile
#[derive(Debug, Clone)]
pub struct Actor {
    pub id: ActorId,
    /// `None` once tombstoned
    letter: Option<char>,
    pub radius: f32,
    body: BodyHandle,
    sprite: Option<SpriteHandle>,
}

impl Actor {
    pub fn letter(&self) -> Option<char> {
        self.letter
    }

    pub fn is_tombstoned(&self) -> bool {
        self.letter.is_none()
    }

    pub fn body(&self) -> BodyHandle {
        self.body
    }

    pub fn sprite(&self) -> Option<SpriteHandle> {
        self.sprite
    }
}

/// Owner of all actors and of the physics world they live in
#[derive(Debug)]
pub struct ActorTable<P: PhysicsWorld> {
    physics: P,
    material: Material,
    actors: BTreeMap<ActorId, Actor>,
    by_body: HashMap<BodyHandle, ActorId>,
    /// Untombstoned actors per letter, in spawn order
    buckets: BTreeMap<char, Vec<ActorId>>,
    next_id: u32,
    events: Vec<GameEvent>,
}

impl<P: PhysicsWorld> ActorTable<P> {
    pub fn new(physics: P, material: Material) -> Self {
        Self {
            physics,
            material,
            actors: BTreeMap::new(),
            by_body: HashMap::new(),
            buckets: BTreeMap::new(),
            next_id: 1,
            events: Vec::new(),
        }
    }

    /// Create body and actor together and register the letter
    pub fn spawn(&mut self, letter: char, position: Vec2, angle: f32, radius: f32) -> ActorId {
        let body = self.physics.create_body(&BodyDef::at(position, angle));
        self.physics
            .create_circle_shape(body, &self.material.circle(radius));

        let id = ActorId(self.next_id);
        self.next_id += 1;
        self.actors.insert(
            id,
            Actor {
                id,
                letter: Some(letter),
                radius,
                body,
                sprite: None,
            },
        );
        self.by_body.insert(body, id);
        self.buckets.entry(letter).or_default().push(id);
        self.events.push(GameEvent::ActorSpawned { id, letter, radius });
        id
    }

    /// Clear an actor's letter; its body keeps simulating. No-op if the
    /// actor is unknown or already tombstoned.
    pub fn tombstone(&mut self, id: ActorId) -> bool {
        let Some(actor) = self.actors.get_mut(&id) else {
            return false;
        };
        let Some(letter) = actor.letter.take() else {
            return false;
        };
        if let Some(bucket) = self.buckets.get_mut(&letter) {
            bucket.retain(|a| *a != id);
            if bucket.is_empty() {
                self.buckets.remove(&letter);
            }
        }
        self.events.push(GameEvent::ActorTombstoned { id });
        true
    }

    /// Tombstone every actor still bearing a letter
    pub fn tombstone_all(&mut self) -> usize {
        let live: Vec<ActorId> = self.buckets.values().flatten().copied().collect();
        live.into_iter().filter(|&id| self.tombstone(id)).count()
    }

    /// Tear down body, actor and sprite link. No-op if already gone.
    pub fn destroy(&mut self, id: ActorId) -> bool {
        if !self.actors.contains_key(&id) {
            return false;
        }
        self.tombstone(id);
        let Some(actor) = self.actors.remove(&id) else {
            return false;
        };
        self.by_body.remove(&actor.body);
        if !self.physics.destroy_body(actor.body) {
            log::debug!("Body {:?} of actor {:?} already gone", actor.body, id);
        }
        self.events.push(GameEvent::ActorDestroyed {
            id,
            sprite: actor.sprite,
        });
        true
    }

    /// Destroy the actors behind escaped bodies; unknown and repeated
    /// handles are skipped.
    pub fn drain_boundary_violations(&mut self, violators: &[BodyHandle]) -> usize {
        let ids: Vec<ActorId> = violators
            .iter()
            .filter_map(|body| self.by_body.get(body).copied())
            .collect();
        ids.into_iter().filter(|&id| self.destroy(id)).count()
    }

    /// Untombstoned actors, optionally only those bearing `letter`
    pub fn live_count(&self, letter: Option<char>) -> usize {
        match letter {
            Some(l) => self.buckets.get(&l).map_or(0, Vec::len),
            None => self.buckets.values().map(Vec::len).sum(),
        }
    }

    /// All actors, tombstoned ones included
    pub fn len(&self) -> usize {
        self.actors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }

    pub fn actor(&self, id: ActorId) -> Option<&Actor> {
        self.actors.get(&id)
    }

    pub fn actor_for_body(&self, body: BodyHandle) -> Option<ActorId> {
        self.by_body.get(&body).copied()
    }

    /// Present and not tombstoned
    pub fn is_live(&self, id: ActorId) -> bool {
        self.letter(id).is_some()
    }

    pub fn letter(&self, id: ActorId) -> Option<char> {
        self.actors.get(&id).and_then(|a| a.letter)
    }

    pub fn position(&self, id: ActorId) -> Option<Vec2> {
        self.physics.position(self.actors.get(&id)?.body)
    }

    pub fn velocity(&self, id: ActorId) -> Option<Vec2> {
        self.physics.velocity(self.actors.get(&id)?.body)
    }

    pub fn angle(&self, id: ActorId) -> Option<f32> {
        self.physics.angle(self.actors.get(&id)?.body)
    }

    /// Actor ids in ascending order
    pub fn ids(&self) -> impl Iterator<Item = ActorId> + '_ {
        self.actors.keys().copied()
    }

    pub fn actors(&self) -> impl Iterator<Item = &Actor> + '_ {
        self.actors.values()
    }

    /// Live actors bearing `letter`, in spawn order
    pub fn bucket(&self, letter: char) -> &[ActorId] {
        self.buckets.get(&letter).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn apply_force(&mut self, id: ActorId, force: Vec2) -> bool {
        match self.actors.get(&id) {
            Some(actor) => {
                self.physics.apply_force(actor.body, force);
                true
            }
            None => false,
        }
    }

    /// Step the physics world and return this step's boundary violations
    pub fn step_physics(&mut self, dt: f32, velocity_iterations: u32, position_iterations: u32) -> Vec<BodyHandle> {
        self.physics.step(dt, velocity_iterations, position_iterations);
        self.physics.take_boundary_violations()
    }

    /// Record the presentation handle so destruction can release it
    pub fn attach_sprite(&mut self, id: ActorId, sprite: SpriteHandle) -> bool {
        match self.actors.get_mut(&id) {
            Some(actor) => {
                actor.sprite = Some(sprite);
                true
            }
            None => false,
        }
    }

    pub fn physics(&self) -> &P {
        &self.physics
    }

    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Verify bucket and body-link consistency
    pub fn check_invariants(&self) -> Result<(), String> {
        let mut bucketed = 0;
        for (&letter, bucket) in &self.buckets {
            if bucket.is_empty() {
                return Err(format!("empty bucket for {letter:?}"));
            }
            for id in bucket {
                match self.actors.get(id) {
                    None => return Err(format!("{id:?} in bucket {letter:?} but destroyed")),
                    Some(a) if a.letter != Some(letter) => {
                        return Err(format!("{id:?} in bucket {letter:?} bears {:?}", a.letter));
                    }
                    Some(_) => bucketed += 1,
                }
            }
        }
        let untombstoned = self.actors.values().filter(|a| a.letter.is_some()).count();
        if bucketed != untombstoned {
            return Err(format!(
                "{bucketed} bucket entries for {untombstoned} lettered actors"
            ));
        }
        if self.by_body.len() != self.actors.len() {
            return Err("body link table out of sync".to_string());
        }
        for (body, id) in &self.by_body {
            if self.actors.get(id).map(|a| a.body) != Some(*body) {
                return Err(format!("{body:?} links to {id:?} which does not own it"));
            }
        }
        Ok(())
    }
}
