//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by actor and body id)
//! - No rendering or platform dependencies
//!
//! The physics engine is a collaborator behind `PhysicsWorld`; `ArenaPhysics`
//! is the built-in implementation.

pub mod actor;
pub mod arena;
pub mod clock;
pub mod force;
pub mod physics;
pub mod progression;
pub mod selection;
pub mod state;
pub mod tick;

pub use actor::{Actor, ActorId, ActorTable, SpriteHandle};
pub use arena::ArenaPhysics;
pub use clock::SimulationClock;
pub use force::ForceField;
pub use physics::{BodyDef, BodyHandle, CircleShape, Material, PhysicsWorld, Shape};
pub use progression::{ProgressionController, Transition};
pub use selection::{AcceptedWord, CommitResult, PrefixStatus, SelectionEngine, adjacency_multiplier};
pub use state::{GameEvent, GamePhase, GameState};
pub use tick::{advance, fixed_step, spawn_letter};
