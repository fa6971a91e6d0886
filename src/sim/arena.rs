//! Minimal deterministic physics world
//!
//! Circle bodies under accumulated forces, semi-implicit Euler integration,
//! impulse-based contact between bounding circles, and a square world bound
//! that reports escaped bodies once per step. Bodies iterate in handle order.

use std::collections::BTreeMap;

use glam::Vec2;

use super::physics::{BodyDef, BodyHandle, CircleShape, PhysicsWorld, Shape};

/// Penetration allowed before position correction kicks in
const LINEAR_SLOP: f32 = 0.005;
/// Fraction of the remaining overlap removed per position iteration
const CORRECTION_FACTOR: f32 = 0.4;

/// Per-body state used by the solver
#[derive(Debug, Clone, Copy)]
struct Kinematics {
    pos: Vec2,
    vel: Vec2,
    inv_mass: f32,
    radius: f32,
    friction: f32,
    restitution: f32,
}

#[derive(Debug, Clone)]
struct Body {
    kin: Kinematics,
    angle: f32,
    angular_vel: f32,
    force: Vec2,
    mass: f32,
    shapes: Vec<Shape>,
}

impl Body {
    fn collides(&self) -> bool {
        !self.shapes.is_empty()
    }
}

/// Reference `PhysicsWorld` used by the native runner and tests
#[derive(Debug, Clone)]
pub struct ArenaPhysics {
    bodies: BTreeMap<BodyHandle, Body>,
    next_handle: u32,
    /// Bodies must stay within [-half_extent, half_extent] on both axes
    half_extent: f32,
    violations: Vec<BodyHandle>,
}

impl ArenaPhysics {
    pub fn new(half_extent: f32) -> Self {
        Self {
            bodies: BTreeMap::new(),
            next_handle: 1,
            half_extent,
            violations: Vec::new(),
        }
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn contains(&self, body: BodyHandle) -> bool {
        self.bodies.contains_key(&body)
    }

    /// Immovable polygon (walls, obstacles); collides by its bounding circle
    pub fn create_static_polygon(&mut self, position: Vec2, vertices: Vec<Vec2>) -> BodyHandle {
        let handle = self.create_body(&BodyDef::at(position, 0.0));
        if let Some(body) = self.bodies.get_mut(&handle) {
            let shape = Shape::Polygon { vertices };
            body.kin.radius = body.kin.radius.max(shape.bounding_radius());
            body.shapes.push(shape);
        }
        handle
    }

    pub fn set_velocity(&mut self, body: BodyHandle, velocity: Vec2) {
        if let Some(b) = self.bodies.get_mut(&body) {
            b.kin.vel = velocity;
        }
    }

    pub fn mass(&self, body: BodyHandle) -> Option<f32> {
        self.bodies.get(&body).map(|b| b.mass)
    }

    /// World-space outlines of every shape on `body`
    pub fn outlines(&self, body: BodyHandle, segments: usize) -> Vec<Vec<Vec2>> {
        let Some(b) = self.bodies.get(&body) else {
            return Vec::new();
        };
        let rot = Vec2::from_angle(b.angle);
        b.shapes
            .iter()
            .map(|shape| {
                shape
                    .outline(segments)
                    .into_iter()
                    .map(|p| b.kin.pos + rot.rotate(p))
                    .collect()
            })
            .collect()
    }

    fn out_of_bounds(&self, kin: &Kinematics) -> bool {
        kin.pos.x.abs() + kin.radius > self.half_extent
            || kin.pos.y.abs() + kin.radius > self.half_extent
    }

    fn colliding_pairs(&self) -> Vec<(BodyHandle, BodyHandle)> {
        let handles: Vec<_> = self
            .bodies
            .iter()
            .filter(|(_, b)| b.collides())
            .map(|(h, _)| *h)
            .collect();
        let mut pairs = Vec::new();
        for (i, &a) in handles.iter().enumerate() {
            for &b in &handles[i + 1..] {
                let ka = &self.bodies[&a].kin;
                let kb = &self.bodies[&b].kin;
                if ka.inv_mass == 0.0 && kb.inv_mass == 0.0 {
                    continue;
                }
                let reach = ka.radius + kb.radius;
                if ka.pos.distance_squared(kb.pos) < reach * reach {
                    pairs.push((a, b));
                }
            }
        }
        pairs
    }

    fn solve_velocity(a: &mut Kinematics, b: &mut Kinematics) {
        let normal = (b.pos - a.pos).normalize_or_zero();
        if normal == Vec2::ZERO {
            return;
        }
        let inv_sum = a.inv_mass + b.inv_mass;
        let rel = b.vel - a.vel;
        let vn = rel.dot(normal);
        if vn >= 0.0 {
            return; // separating
        }
        let restitution = a.restitution.max(b.restitution);
        let jn = -(1.0 + restitution) * vn / inv_sum;

        let tangent = rel - normal * vn;
        let jt = if tangent.length_squared() > 0.0 {
            let t = tangent.normalize();
            let mu = (a.friction * b.friction).sqrt();
            (-rel.dot(t) / inv_sum).clamp(-mu * jn, mu * jn) * t
        } else {
            Vec2::ZERO
        };

        let impulse = normal * jn + jt;
        a.vel -= impulse * a.inv_mass;
        b.vel += impulse * b.inv_mass;
    }

    fn solve_position(a: &mut Kinematics, b: &mut Kinematics) {
        let delta = b.pos - a.pos;
        let dist = delta.length();
        let penetration = a.radius + b.radius - dist;
        if penetration <= LINEAR_SLOP || dist == 0.0 {
            return;
        }
        let normal = delta / dist;
        let correction = normal * (penetration - LINEAR_SLOP) * CORRECTION_FACTOR
            / (a.inv_mass + b.inv_mass);
        a.pos -= correction * a.inv_mass;
        b.pos += correction * b.inv_mass;
    }

    fn for_each_pair(&mut self, pairs: &[(BodyHandle, BodyHandle)], solve: fn(&mut Kinematics, &mut Kinematics)) {
        for &(ha, hb) in pairs {
            let (Some(mut ka), Some(mut kb)) = (
                self.bodies.get(&ha).map(|b| b.kin),
                self.bodies.get(&hb).map(|b| b.kin),
            ) else {
                continue;
            };
            solve(&mut ka, &mut kb);
            if let Some(body) = self.bodies.get_mut(&ha) {
                body.kin = ka;
            }
            if let Some(body) = self.bodies.get_mut(&hb) {
                body.kin = kb;
            }
        }
    }
}

impl PhysicsWorld for ArenaPhysics {
    fn create_body(&mut self, def: &BodyDef) -> BodyHandle {
        let handle = BodyHandle(self.next_handle);
        self.next_handle += 1;
        self.bodies.insert(
            handle,
            Body {
                kin: Kinematics {
                    pos: def.position,
                    vel: def.linear_velocity,
                    inv_mass: 0.0,
                    radius: 0.0,
                    friction: 0.0,
                    restitution: 0.0,
                },
                angle: def.angle,
                angular_vel: def.angular_velocity,
                force: Vec2::ZERO,
                mass: 0.0,
                shapes: Vec::new(),
            },
        );
        handle
    }

    fn create_circle_shape(&mut self, body: BodyHandle, shape: &CircleShape) -> bool {
        let Some(b) = self.bodies.get_mut(&body) else {
            return false;
        };
        b.shapes.push(Shape::Circle {
            radius: shape.radius,
        });
        b.mass += shape.density * std::f32::consts::PI * shape.radius * shape.radius;
        b.kin.inv_mass = if b.mass > 0.0 { 1.0 / b.mass } else { 0.0 };
        b.kin.radius = b.kin.radius.max(shape.radius);
        b.kin.friction = shape.friction;
        b.kin.restitution = shape.restitution;
        true
    }

    fn apply_force(&mut self, body: BodyHandle, force: Vec2) {
        if let Some(b) = self.bodies.get_mut(&body) {
            b.force += force;
        }
    }

    fn position(&self, body: BodyHandle) -> Option<Vec2> {
        self.bodies.get(&body).map(|b| b.kin.pos)
    }

    fn velocity(&self, body: BodyHandle) -> Option<Vec2> {
        self.bodies.get(&body).map(|b| b.kin.vel)
    }

    fn angle(&self, body: BodyHandle) -> Option<f32> {
        self.bodies.get(&body).map(|b| b.angle)
    }

    fn step(&mut self, dt: f32, velocity_iterations: u32, position_iterations: u32) {
        for body in self.bodies.values_mut() {
            body.kin.vel += body.force * body.kin.inv_mass * dt;
            body.force = Vec2::ZERO;
        }

        let pairs = self.colliding_pairs();
        for _ in 0..velocity_iterations {
            self.for_each_pair(&pairs, Self::solve_velocity);
        }

        for body in self.bodies.values_mut() {
            if body.kin.inv_mass > 0.0 {
                body.kin.pos += body.kin.vel * dt;
                body.angle += body.angular_vel * dt;
            }
        }

        let pairs = self.colliding_pairs();
        for _ in 0..position_iterations {
            self.for_each_pair(&pairs, Self::solve_position);
        }

        self.violations = self
            .bodies
            .iter()
            .filter(|(_, b)| self.out_of_bounds(&b.kin))
            .map(|(h, _)| *h)
            .collect();
    }

    fn destroy_body(&mut self, body: BodyHandle) -> bool {
        self.violations.retain(|h| *h != body);
        self.bodies.remove(&body).is_some()
    }

    fn take_boundary_violations(&mut self) -> Vec<BodyHandle> {
        std::mem::take(&mut self.violations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::physics::Material;

    fn circle(world: &mut ArenaPhysics, pos: Vec2, radius: f32) -> BodyHandle {
        let h = world.create_body(&BodyDef::at(pos, 0.0));
        world.create_circle_shape(h, &Material::default().circle(radius));
        h
    }

    #[test]
    fn test_force_integration() {
        let mut world = ArenaPhysics::new(100.0);
        let h = circle(&mut world, Vec2::ZERO, 1.0);
        let mass = world.mass(h).unwrap();
        assert!((mass - std::f32::consts::PI).abs() < 1e-5);

        world.apply_force(h, Vec2::new(mass, 0.0)); // 1 unit/s^2
        world.step(1.0, 1, 1);
        assert!((world.velocity(h).unwrap().x - 1.0).abs() < 1e-5);
        assert!((world.position(h).unwrap().x - 1.0).abs() < 1e-5);

        // Forces do not persist across steps
        world.step(1.0, 1, 1);
        assert!((world.velocity(h).unwrap().x - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_boundary_violation_reported_each_step() {
        let mut world = ArenaPhysics::new(10.0);
        let inside = circle(&mut world, Vec2::ZERO, 1.0);
        let outside = circle(&mut world, Vec2::new(9.5, 0.0), 1.0);

        world.step(0.01, 1, 1);
        assert_eq!(world.take_boundary_violations(), vec![outside]);
        assert!(world.take_boundary_violations().is_empty());

        world.step(0.01, 1, 1);
        assert_eq!(world.take_boundary_violations(), vec![outside]);
        assert!(world.contains(inside));
    }

    #[test]
    fn test_destroy_is_idempotent() {
        let mut world = ArenaPhysics::new(10.0);
        let h = circle(&mut world, Vec2::ZERO, 1.0);
        assert!(world.destroy_body(h));
        assert!(!world.destroy_body(h));
        assert!(world.position(h).is_none());
        world.apply_force(h, Vec2::ONE);
        assert!(!world.create_circle_shape(h, &Material::default().circle(1.0)));
    }

    #[test]
    fn test_overlapping_circles_separate() {
        let mut world = ArenaPhysics::new(100.0);
        let a = circle(&mut world, Vec2::new(-0.5, 0.0), 1.0);
        let b = circle(&mut world, Vec2::new(0.5, 0.0), 1.0);
        world.set_velocity(a, Vec2::new(1.0, 0.0));
        world.set_velocity(b, Vec2::new(-1.0, 0.0));

        for _ in 0..60 {
            world.step(1.0 / 60.0, 10, 8);
        }
        let gap = world.position(a).unwrap().distance(world.position(b).unwrap());
        assert!(gap > 1.9, "gap {gap}");
        // Approach stopped by the contact
        assert!(world.velocity(a).unwrap().x <= 1e-4);
    }

    #[test]
    fn test_static_polygon_blocks() {
        let mut world = ArenaPhysics::new(100.0);
        let wall = world.create_static_polygon(
            Vec2::new(3.0, 0.0),
            vec![
                Vec2::new(-0.5, -0.5),
                Vec2::new(0.5, -0.5),
                Vec2::new(0.5, 0.5),
                Vec2::new(-0.5, 0.5),
            ],
        );
        let ball = circle(&mut world, Vec2::ZERO, 1.0);
        world.set_velocity(ball, Vec2::new(5.0, 0.0));
        for _ in 0..120 {
            world.step(1.0 / 60.0, 10, 8);
        }
        assert_eq!(world.position(wall), Some(Vec2::new(3.0, 0.0)));
        assert!(world.position(ball).unwrap().x < 3.0);
        assert_eq!(world.outlines(wall, 0)[0].len(), 5);
    }
}
