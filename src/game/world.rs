//! World handle: the physics space plus the field's fixed entities

use glam::Vec2;
use rapier2d::prelude::*;
use tracing::debug;

use crate::physics::{self, ContactBegin, PhysicsError, Space};
use crate::util::time::tick_delta;

use super::field::{self, category};
use super::Team;

/// The singleton ball
#[derive(Debug, Clone, Copy)]
struct Ball {
    body: RigidBodyHandle,
    collider: ColliderHandle,
}

/// Owns the physics space, the static field geometry, the ball and the
/// center restart gate. Holds no match policy.
pub struct FieldWorld {
    space: Space,
    ball: Ball,
    gate: ColliderHandle,
}

impl FieldWorld {
    pub fn new() -> Result<Self, PhysicsError> {
        let mut space = Space::new(tick_delta());
        build_edges(&mut space)?;

        let gate = space.add_collider(
            ColliderBuilder::ball(field::GATE_RADIUS)
                .collision_groups(InteractionGroups::none())
                .build(),
            None,
        )?;

        let body = space.add_body(
            RigidBodyBuilder::dynamic()
                .linear_damping(field::LINEAR_DAMPING)
                .can_sleep(false)
                .ccd_enabled(true)
                .build(),
        );
        let collider = space.add_collider(
            ColliderBuilder::ball(field::BALL_RADIUS)
                .mass(field::BALL_MASS)
                .restitution(field::BALL_ELASTICITY)
                .friction(field::BALL_FRICTION)
                .restitution_combine_rule(CoefficientCombineRule::Multiply)
                .friction_combine_rule(CoefficientCombineRule::Multiply)
                .collision_groups(physics::groups(
                    category::BALL,
                    category::FIELD | category::PLAYERS,
                ))
                .active_events(ActiveEvents::COLLISION_EVENTS)
                .build(),
            Some(body),
        )?;

        Ok(Self {
            space,
            ball: Ball { body, collider },
            gate,
        })
    }

    pub fn space(&self) -> &Space {
        &self.space
    }

    pub fn space_mut(&mut self) -> &mut Space {
        &mut self.space
    }

    /// Advance one physics tick
    pub fn step(&mut self) -> Vec<ContactBegin> {
        self.space.step()
    }

    pub fn ball_position(&self) -> Vec2 {
        self.space.position(self.ball.body).unwrap_or(Vec2::ZERO)
    }

    #[cfg(test)]
    pub fn ball_velocity(&self) -> Vec2 {
        self.space.velocity(self.ball.body).unwrap_or(Vec2::ZERO)
    }

    /// Teleport the ball with the given velocity
    #[cfg(test)]
    pub fn place_ball(&mut self, position: Vec2, velocity: Vec2) -> Result<(), PhysicsError> {
        self.space.place_body(self.ball.body, position, velocity)
    }

    /// Ball back to the center spot, at rest
    pub fn reset_ball(&mut self) -> Result<(), PhysicsError> {
        self.space.reset_body(self.ball.body, Vec2::ZERO)
    }

    #[cfg(test)]
    pub fn ball_collider(&self) -> ColliderHandle {
        self.ball.collider
    }

    /// Keep `blocked`'s players out of the center zone
    pub fn arm_gate(&mut self, blocked: Team) -> Result<(), PhysicsError> {
        self.space
            .set_collision_groups(self.gate, physics::groups(category::GATE, blocked.category()))
    }

    pub fn release_gate(&mut self) -> Result<(), PhysicsError> {
        self.space
            .set_collision_groups(self.gate, InteractionGroups::none())
    }

    /// Open the restart gate on the ball's first contact after a kickoff.
    /// Returns whether the gate was released.
    pub fn release_gate_on_ball_contact(
        &mut self,
        contacts: &[ContactBegin],
    ) -> Result<bool, PhysicsError> {
        let ball = self.ball.collider;
        if !self.gate_armed() || !contacts.iter().any(|c| c.involves(ball)) {
            return Ok(false);
        }
        self.release_gate()?;
        debug!("Ball touched, restart gate released");
        Ok(true)
    }

    pub fn gate_groups(&self) -> InteractionGroups {
        self.space
            .collision_groups(self.gate)
            .unwrap_or_else(InteractionGroups::none)
    }

    pub fn gate_armed(&self) -> bool {
        self.gate_groups() != InteractionGroups::none()
    }
}

fn edge(a: Vec2, b: Vec2, groups: InteractionGroups) -> Collider {
    let shape = SharedShape::capsule(point![a.x, a.y], point![b.x, b.y], field::EDGE_RADIUS);
    ColliderBuilder::new(shape)
        .restitution(field::EDGE_ELASTICITY)
        .friction(field::EDGE_FRICTION)
        .restitution_combine_rule(CoefficientCombineRule::Multiply)
        .friction_combine_rule(CoefficientCombineRule::Multiply)
        .collision_groups(groups)
        .build()
}

/// Side walls with the goal mouths left open, plus goal lines that stop
/// players but let the ball through.
fn build_edges(space: &mut Space) -> Result<(), PhysicsError> {
    let (hfw, hfh, hgs) = (field::half_width(), field::half_height(), 0.5 * field::GOAL_SIZE);
    let wall_groups = physics::groups(category::FIELD, category::BALL | category::PLAYERS);
    let goal_groups = physics::groups(category::GOAL_LINE, category::PLAYERS);

    let side_points = [
        Vec2::new(-hfw, hgs),
        Vec2::new(-hfw, hfh),
        Vec2::new(hfw, hfh),
        Vec2::new(hfw, hgs),
    ];

    for sign in [-1.0_f32, 1.0] {
        let flip = Vec2::new(1.0, sign);
        for pair in side_points.windows(2) {
            space.add_collider(edge(pair[0] * flip, pair[1] * flip, wall_groups), None)?;
        }

        let goal_line = edge(
            Vec2::new(sign * hfw, -hgs),
            Vec2::new(sign * hfw, hgs),
            goal_groups,
        );
        space.add_collider(goal_line, None)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_geometry() {
        let world = FieldWorld::new().unwrap();
        // 2 x (3 walls + 1 goal line) + gate + ball
        assert_eq!(world.space().collider_count(), 10);
        assert_eq!(world.ball_position(), Vec2::ZERO);
        assert!(!world.gate_armed());
    }

    #[test]
    fn test_ball_passes_through_goal_mouth() {
        let mut world = FieldWorld::new().unwrap();
        world
            .place_ball(Vec2::new(450.0, 0.0), Vec2::new(600.0, 0.0))
            .unwrap();

        for _ in 0..20 {
            world.step();
        }

        assert!(world.ball_position().x > field::half_width());
    }

    #[test]
    fn test_ball_bounces_off_side_wall() {
        let mut world = FieldWorld::new().unwrap();
        world
            .place_ball(Vec2::new(0.0, 200.0), Vec2::new(0.0, 600.0))
            .unwrap();

        for _ in 0..20 {
            world.step();
        }

        assert!(world.ball_position().y < field::half_height());
        assert!(world.ball_velocity().y < 0.0);
    }

    #[test]
    fn test_ball_slows_down_in_free_motion() {
        let mut world = FieldWorld::new().unwrap();
        world
            .place_ball(Vec2::new(-200.0, 0.0), Vec2::new(100.0, 0.0))
            .unwrap();

        for _ in 0..60 {
            world.step();
        }

        let v = world.ball_velocity().x;
        assert!(v > 0.0 && v < 20.0);
    }

    #[test]
    fn test_gate_toggle() {
        let mut world = FieldWorld::new().unwrap();

        world.arm_gate(Team::Right).unwrap();
        assert!(world.gate_armed());
        assert_eq!(
            world.gate_groups().filter,
            Group::from_bits_truncate(category::RIGHT_PLAYER)
        );

        world.release_gate().unwrap();
        assert!(!world.gate_armed());
    }

    #[test]
    fn test_gate_releases_once_on_ball_contact() {
        let mut world = FieldWorld::new().unwrap();
        world.arm_gate(Team::Left).unwrap();

        assert!(!world.release_gate_on_ball_contact(&[]).unwrap());
        assert!(world.gate_armed());

        let ball = world.ball_collider();
        let touch = ContactBegin { a: ball, b: ball };
        assert!(world.release_gate_on_ball_contact(&[touch]).unwrap());
        assert!(!world.gate_armed());

        // latch stays open until the gate is armed again
        assert!(!world.release_gate_on_ball_contact(&[touch]).unwrap());
    }

    #[test]
    fn test_ball_hitting_wall_releases_armed_gate() {
        let mut world = FieldWorld::new().unwrap();
        world.arm_gate(Team::Right).unwrap();
        world
            .place_ball(Vec2::new(0.0, 200.0), Vec2::new(0.0, 600.0))
            .unwrap();

        let mut released = false;
        for _ in 0..20 {
            let contacts = world.step();
            released |= world.release_gate_on_ball_contact(&contacts).unwrap();
        }

        assert!(released);
        assert!(!world.gate_armed());
    }
}
