//! Physics phase of the tick

use botsim_core::rotate;
use botsim_world::SimWorld;

/// Moves bodies; runs between the pre-tick and after-physics hooks
pub trait PhysicsStep {
    fn step(&mut self, world: &mut SimWorld, dt: f32);
}

impl<F: FnMut(&mut SimWorld, f32)> PhysicsStep for F {
    fn step(&mut self, world: &mut SimWorld, dt: f32) {
        self(world, dt)
    }
}

/// Integrates each body's velocities without collision handling.
///
/// `velocity` is expressed in the body's local frame, so a body with a
/// forward velocity drives along its own heading.
#[derive(Debug, Clone, Copy, Default)]
pub struct KinematicPhysics;

impl PhysicsStep for KinematicPhysics {
    fn step(&mut self, world: &mut SimWorld, dt: f32) {
        world.for_each_body_mut(|pose, motion| {
            pose.position += rotate(motion.velocity, pose.rotation) * dt;
            pose.rotation += motion.angular_velocity * dt;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use botsim_core::{Pose, Vec2};
    use botsim_world::Motion;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_kinematic_step_uses_body_heading() {
        let mut world = SimWorld::new();
        let body = world
            .spawn_body("robot", Pose::new(Vec2::ZERO, FRAC_PI_2), 0.0)
            .unwrap();
        world
            .set_motion(
                body,
                Motion {
                    velocity: Vec2::new(2.0, 0.0),
                    angular_velocity: 1.0,
                },
            )
            .unwrap();

        KinematicPhysics.step(&mut world, 0.5);

        let pose = world.pose(body).unwrap();
        assert!(pose.position.approx_eq(&Vec2::new(0.0, 1.0), 1e-5), "got {:?}", pose.position);
        assert!((pose.rotation - (FRAC_PI_2 + 0.5)).abs() < 1e-6);
    }

    #[test]
    fn test_closure_physics() {
        let mut world = SimWorld::new();
        let body = world.spawn_body("robot", Pose::IDENTITY, 0.0).unwrap();
        let mut physics = |w: &mut SimWorld, _dt: f32| {
            w.set_pose(body, Pose::new(Vec2::new(5.0, 5.0), 1.0)).unwrap();
        };
        physics.step(&mut world, 0.1);
        assert_eq!(world.pose(body).unwrap().rotation, 1.0);
    }
}
