//! Per-step force field
//!
//! Lettered actors hang on a damped spring toward the arena center.
//! Tombstoned actors are pushed outward at constant strength until they
//! cross the world bound. A body sitting exactly on the center is pushed
//! along its facing instead.

use glam::Vec2;

use super::actor::{ActorId, ActorTable};
use super::physics::PhysicsWorld;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForceField {
    pub spring_constant: f32,
    pub damping: f32,
    pub destroy_force: f32,
}

impl ForceField {
    /// Force on one body; `angle` only matters for a tombstoned body at the
    /// center, where the position has no direction
    pub fn force(&self, tombstoned: bool, position: Vec2, velocity: Vec2, angle: f32) -> Vec2 {
        let damping = self.damping * velocity;
        if tombstoned {
            let outward = position
                .try_normalize()
                .unwrap_or_else(|| Vec2::from_angle(angle));
            self.destroy_force * outward - damping
        } else {
            -(self.spring_constant * position) - damping
        }
    }

    /// Apply the field to every actor in the table, in id order
    pub fn apply<P: PhysicsWorld>(&self, table: &mut ActorTable<P>) -> usize {
        let forces: Vec<(ActorId, Vec2)> = table
            .actors()
            .filter_map(|actor| {
                let pos = table.position(actor.id)?;
                let vel = table.velocity(actor.id)?;
                let angle = table.angle(actor.id)?;
                Some((actor.id, self.force(actor.is_tombstoned(), pos, vel, angle)))
            })
            .collect();
        let applied = forces.len();
        for (id, force) in forces {
            table.apply_force(id, force);
        }
        applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::arena::ArenaPhysics;
    use crate::sim::physics::Material;

    const FIELD: ForceField = ForceField {
        spring_constant: 10.0,
        damping: 5.0,
        destroy_force: 100.0,
    };

    #[test]
    fn test_spring_and_damping() {
        let f = FIELD.force(false, Vec2::new(2.0, 0.0), Vec2::new(0.0, 1.0), 0.0);
        assert_eq!(f, Vec2::new(-20.0, -5.0));
    }

    #[test]
    fn test_outward_push() {
        let f = FIELD.force(true, Vec2::new(0.0, 4.0), Vec2::new(1.0, 0.0), 1.0);
        assert_eq!(f, Vec2::new(-5.0, 100.0));
    }

    #[test]
    fn test_centered_tombstone_pushed_along_facing() {
        assert_eq!(FIELD.force(true, Vec2::ZERO, Vec2::ZERO, 0.0), Vec2::new(100.0, 0.0));
        let f = FIELD.force(true, Vec2::ZERO, Vec2::ZERO, std::f32::consts::FRAC_PI_2);
        assert!(f.x.abs() < 1e-4 && (f.y - 100.0).abs() < 1e-4, "{f}");
        // Lettered bodies at the center feel nothing
        assert_eq!(FIELD.force(false, Vec2::ZERO, Vec2::ZERO, 0.0), Vec2::ZERO);
    }

    #[test]
    fn test_apply_moves_letters() {
        let mut t = ActorTable::new(ArenaPhysics::new(100.0), Material::default());
        let live = t.spawn('A', Vec2::new(10.0, 0.0), 0.0, 1.0);
        let dead = t.spawn('B', Vec2::new(-10.0, 0.0), 0.0, 1.0);
        t.tombstone(dead);

        assert_eq!(FIELD.apply(&mut t), 2);
        t.step_physics(1.0 / 60.0, 10, 8);

        assert!(t.velocity(live).unwrap().x < 0.0, "pulled inward");
        assert!(t.velocity(dead).unwrap().x < 0.0, "pushed outward");
        assert!(t.position(dead).unwrap().x < -10.0);
    }

    #[test]
    fn test_apply_moves_centered_tombstone() {
        let mut t = ActorTable::new(ArenaPhysics::new(100.0), Material::default());
        let dead = t.spawn('A', Vec2::ZERO, std::f32::consts::PI, 1.0);
        t.tombstone(dead);

        FIELD.apply(&mut t);
        t.step_physics(1.0 / 60.0, 10, 8);

        assert_eq!(t.angle(dead), Some(std::f32::consts::PI));
        assert!(t.position(dead).unwrap().x < 0.0);
    }
}
