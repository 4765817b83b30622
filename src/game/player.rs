//! Player entity: body, collider, cursor and the control joint

use glam::Vec2;
use rapier2d::prelude::*;

use crate::physics::{self, PhysicsError, Space};

use super::field::{self, category};
use super::{ClientId, Team};

/// A connected player's simulation objects.
///
/// The motor joint from the kinematic cursor to the body is the control
/// constraint: while it is attached the player follows its cursor.
#[derive(Debug)]
pub struct PlayerEntity {
    pub id: ClientId,
    pub team: Team,
    body: RigidBodyHandle,
    collider: ColliderHandle,
    cursor: RigidBodyHandle,
    joint: Option<ImpulseJointHandle>,
}

impl PlayerEntity {
    /// Create the player's bodies at `position`
    pub fn spawn(
        space: &mut Space,
        id: ClientId,
        team: Team,
        position: Vec2,
        control: bool,
    ) -> Result<Self, PhysicsError> {
        let body = space.add_body(
            RigidBodyBuilder::dynamic()
                .translation(physics::to_vector(position))
                .linear_damping(field::LINEAR_DAMPING)
                .lock_rotations()
                .can_sleep(false)
                .build(),
        );
        let collider = space.add_collider(
            ColliderBuilder::ball(field::PLAYER_RADIUS)
                .mass(field::PLAYER_MASS)
                .restitution(field::PLAYER_ELASTICITY)
                .friction(field::PLAYER_FRICTION)
                .restitution_combine_rule(CoefficientCombineRule::Multiply)
                .friction_combine_rule(CoefficientCombineRule::Multiply)
                .collision_groups(player_groups(team))
                .build(),
            Some(body),
        )?;

        let cursor = space.add_body(
            RigidBodyBuilder::kinematic_position_based()
                .translation(physics::to_vector(position))
                .build(),
        );

        let mut player = Self {
            id,
            team,
            body,
            collider,
            cursor,
            joint: None,
        };
        player.set_control(space, control)?;
        Ok(player)
    }

    pub fn position(&self, space: &Space) -> Vec2 {
        space.position(self.body).unwrap_or(Vec2::ZERO)
    }

    #[cfg(test)]
    pub fn velocity(&self, space: &Space) -> Vec2 {
        space.velocity(self.body).unwrap_or(Vec2::ZERO)
    }

    #[cfg(test)]
    pub fn cursor(&self, space: &Space) -> Vec2 {
        space.position(self.cursor).unwrap_or(Vec2::ZERO)
    }

    pub fn set_cursor(&self, space: &mut Space, target: Vec2) -> Result<(), PhysicsError> {
        space.reset_body(self.cursor, target)
    }

    /// Move body and cursor to `position` at rest
    pub fn place(&self, space: &mut Space, position: Vec2) -> Result<(), PhysicsError> {
        space.reset_body(self.body, position)?;
        space.reset_body(self.cursor, position)
    }

    /// Attach or detach the control joint. Idempotent.
    pub fn set_control(&mut self, space: &mut Space, enabled: bool) -> Result<(), PhysicsError> {
        match (self.joint, enabled) {
            (None, true) => {
                let joint = physics::follow_joint(
                    field::PLAYER_MAX_FORCE,
                    field::CONTROL_STIFFNESS,
                    field::CONTROL_DAMPING,
                );
                self.joint = Some(space.add_joint(self.cursor, self.body, joint)?);
            }
            (Some(joint), false) => {
                space.remove_joint(joint)?;
                self.joint = None;
            }
            _ => {}
        }
        Ok(())
    }

    #[cfg(test)]
    pub fn has_control(&self) -> bool {
        self.joint.is_some()
    }

    /// Tear down in the order the space requires: joint, collider, body, cursor
    pub fn release(mut self, space: &mut Space) -> Result<(), PhysicsError> {
        self.set_control(space, false)?;
        space.remove_collider(self.collider)?;
        space.remove_body(self.body)?;
        space.remove_body(self.cursor)?;
        Ok(())
    }
}

fn player_groups(team: Team) -> InteractionGroups {
    physics::groups(
        team.category(),
        category::FIELD | category::GOAL_LINE | category::BALL | category::PLAYERS | category::GATE,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::time::tick_delta;

    #[test]
    fn test_spawn_and_release_leaves_space_clean() {
        let mut space = Space::new(tick_delta());
        let bodies = space.body_count();
        let colliders = space.collider_count();

        let player = PlayerEntity::spawn(&mut space, 1, Team::Left, Vec2::new(-200.0, 0.0), true)
            .unwrap();
        assert_eq!(space.body_count(), bodies + 2);
        assert_eq!(space.joint_count(), 1);
        assert!(player.has_control());
        assert_eq!(player.cursor(&space), Vec2::new(-200.0, 0.0));

        player.release(&mut space).unwrap();
        assert_eq!(space.body_count(), bodies);
        assert_eq!(space.collider_count(), colliders);
        assert_eq!(space.joint_count(), 0);
    }

    #[test]
    fn test_release_without_control() {
        let mut space = Space::new(tick_delta());
        let player = PlayerEntity::spawn(&mut space, 2, Team::Right, Vec2::new(200.0, 0.0), false)
            .unwrap();

        player.release(&mut space).unwrap();
        assert_eq!(space.body_count(), 0);
    }

    #[test]
    fn test_spawn_without_control() {
        let mut space = Space::new(tick_delta());
        let mut player = PlayerEntity::spawn(&mut space, 7, Team::Right, Vec2::new(200.0, 0.0), false)
            .unwrap();

        assert!(!player.has_control());
        assert_eq!(space.joint_count(), 0);

        player.set_control(&mut space, true).unwrap();
        player.set_control(&mut space, true).unwrap();
        assert!(player.has_control());
        assert_eq!(space.joint_count(), 1);
    }

    #[test]
    fn test_player_follows_cursor() {
        let mut space = Space::new(tick_delta());
        let player = PlayerEntity::spawn(&mut space, 1, Team::Left, Vec2::new(-200.0, 0.0), true)
            .unwrap();
        player.set_cursor(&mut space, Vec2::new(-100.0, 0.0)).unwrap();

        for _ in 0..30 {
            space.step();
        }

        let pos = player.position(&space);
        assert!(pos.x > -200.0);
        assert!(pos.distance(Vec2::new(-100.0, 0.0)) < 100.0);
    }

    #[test]
    fn test_place_moves_cursor_with_body() {
        let mut space = Space::new(tick_delta());
        let player = PlayerEntity::spawn(&mut space, 1, Team::Left, Vec2::new(-200.0, 0.0), true)
            .unwrap();
        player.set_cursor(&mut space, Vec2::new(-50.0, 50.0)).unwrap();

        player.place(&mut space, Vec2::new(-300.0, -100.0)).unwrap();

        assert_eq!(player.position(&space), Vec2::new(-300.0, -100.0));
        assert_eq!(player.cursor(&space), Vec2::new(-300.0, -100.0));
        assert_eq!(player.velocity(&space), Vec2::ZERO);
    }
}
