//! Physics collaborator interface
//!
//! The simulation core never integrates bodies itself. It talks to a
//! `PhysicsWorld` through opaque `BodyHandle`s and reads back positions,
//! velocities and boundary violations.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Opaque, stable identifier of a physics body
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BodyHandle(pub u32);

/// Initial body placement
#[derive(Debug, Clone, Copy, Default)]
pub struct BodyDef {
    pub position: Vec2,
    pub angle: f32,
    pub linear_velocity: Vec2,
    pub angular_velocity: f32,
}

impl BodyDef {
    pub fn at(position: Vec2, angle: f32) -> Self {
        Self {
            position,
            angle,
            ..Default::default()
        }
    }
}

/// Circle fixture with material properties
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircleShape {
    pub radius: f32,
    pub density: f32,
    pub friction: f32,
    pub restitution: f32,
}

/// Material shared by every letter body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub density: f32,
    pub friction: f32,
    pub restitution: f32,
}

impl Material {
    pub fn circle(&self, radius: f32) -> CircleShape {
        CircleShape {
            radius,
            density: self.density,
            friction: self.friction,
            restitution: self.restitution,
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Self {
            density: 1.0,
            friction: 1.0,
            restitution: 0.0,
        }
    }
}

/// Shape geometry in body-local coordinates
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Circle { radius: f32 },
    Polygon { vertices: Vec<Vec2> },
}

impl Shape {
    /// Closed outline (first point repeated at the end), for debug drawing
    pub fn outline(&self, segments: usize) -> Vec<Vec2> {
        match self {
            Shape::Circle { radius } => {
                let segments = segments.max(3);
                (0..=segments)
                    .map(|i| {
                        let angle = std::f32::consts::TAU * i as f32 / segments as f32;
                        crate::polar_to_cartesian(*radius, angle)
                    })
                    .collect()
            }
            Shape::Polygon { vertices } => {
                let mut points = vertices.clone();
                if let Some(&first) = vertices.first() {
                    points.push(first);
                }
                points
            }
        }
    }

    /// Radius of the smallest origin-centered circle containing the shape
    pub fn bounding_radius(&self) -> f32 {
        match self {
            Shape::Circle { radius } => *radius,
            Shape::Polygon { vertices } => vertices.iter().map(|v| v.length()).fold(0.0, f32::max),
        }
    }
}

/// Capability the simulation core needs from a physics engine.
///
/// Every query on a destroyed or unknown handle returns `None`/`false`
/// rather than failing.
pub trait PhysicsWorld {
    fn create_body(&mut self, def: &BodyDef) -> BodyHandle;

    /// Attach a circle fixture; returns false for an unknown body
    fn create_circle_shape(&mut self, body: BodyHandle, shape: &CircleShape) -> bool;

    /// Accumulate a force at the body's center of mass for the next step
    fn apply_force(&mut self, body: BodyHandle, force: Vec2);

    fn position(&self, body: BodyHandle) -> Option<Vec2>;

    fn velocity(&self, body: BodyHandle) -> Option<Vec2>;

    fn angle(&self, body: BodyHandle) -> Option<f32>;

    /// Advance the world by `dt` seconds
    fn step(&mut self, dt: f32, velocity_iterations: u32, position_iterations: u32);

    /// Remove a body; returns false if it was already gone
    fn destroy_body(&mut self, body: BodyHandle) -> bool;

    /// Bodies outside the world bounds after the last step
    fn take_boundary_violations(&mut self) -> Vec<BodyHandle>;
}
