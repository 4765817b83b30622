//! Entity registry: connected client id -> player entity

use std::collections::HashMap;

use glam::Vec2;

use crate::physics::PhysicsError;

use super::player::PlayerEntity;
use super::world::FieldWorld;
use super::{ClientId, Team};

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("client {0} is already registered")]
    Duplicate(ClientId),

    #[error(transparent)]
    Physics(#[from] PhysicsError),
}

#[derive(Default)]
pub struct Registry {
    players: HashMap<ClientId, PlayerEntity>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create and insert a player entity.
    ///
    /// `control` sets the initial state of the control joint.
    pub fn add_player(
        &mut self,
        world: &mut FieldWorld,
        id: ClientId,
        team: Team,
        position: Vec2,
        control: bool,
    ) -> Result<&PlayerEntity, RegistryError> {
        if self.players.contains_key(&id) {
            return Err(RegistryError::Duplicate(id));
        }
        let player = PlayerEntity::spawn(world.space_mut(), id, team, position, control)?;
        Ok(self.players.entry(id).or_insert(player))
    }

    /// Remove a player. Unknown ids are a no-op and return `false`.
    pub fn remove_player(
        &mut self,
        world: &mut FieldWorld,
        id: ClientId,
    ) -> Result<bool, PhysicsError> {
        let Some(player) = self.players.remove(&id) else {
            return Ok(false);
        };
        player.release(world.space_mut())?;

        if self.players.len() < 2 {
            world.release_gate()?;
        }
        Ok(true)
    }

    /// Move a player's cursor. Unknown ids are a no-op and return `false`.
    pub fn set_intent(
        &self,
        world: &mut FieldWorld,
        id: ClientId,
        target: Vec2,
    ) -> Result<bool, PhysicsError> {
        match self.players.get(&id) {
            Some(player) => {
                player.set_cursor(world.space_mut(), target)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Enable or disable every player's control joint
    pub fn set_control(&mut self, world: &mut FieldWorld, enabled: bool) -> Result<(), PhysicsError> {
        for player in self.players.values_mut() {
            player.set_control(world.space_mut(), enabled)?;
        }
        Ok(())
    }

    #[cfg(test)]
    pub fn get(&self, id: ClientId) -> Option<&PlayerEntity> {
        self.players.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlayerEntity> {
        self.players.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut PlayerEntity> {
        self.players.values_mut()
    }

    pub fn ids(&self) -> Vec<ClientId> {
        self.players.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Member count per team, indexed by [`Team::index`]
    pub fn team_sizes(&self) -> [usize; 2] {
        let mut sizes = [0; 2];
        for player in self.players.values() {
            sizes[player.team.index()] += 1;
        }
        sizes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (FieldWorld, Registry) {
        (FieldWorld::new().unwrap(), Registry::new())
    }

    #[test]
    fn test_duplicate_registration_is_rejected() {
        let (mut world, mut registry) = setup();
        registry
            .add_player(&mut world, 1, Team::Left, Vec2::new(-200.0, 0.0), true)
            .unwrap();

        let err = registry
            .add_player(&mut world, 1, Team::Right, Vec2::new(200.0, 0.0), true)
            .unwrap_err();
        assert!(matches!(err, RegistryError::Duplicate(1)));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(1).unwrap().team, Team::Left);
    }

    #[test]
    fn test_remove_unknown_is_noop() {
        let (mut world, mut registry) = setup();
        registry
            .add_player(&mut world, 1, Team::Left, Vec2::new(-200.0, 0.0), true)
            .unwrap();
        let before = registry.get(1).unwrap().position(world.space());

        assert!(!registry.remove_player(&mut world, 99).unwrap());
        assert!(!registry.remove_player(&mut world, 99).unwrap());

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(1).unwrap().position(world.space()), before);
        assert!(registry.get(1).unwrap().has_control());
    }

    #[test]
    fn test_remove_releases_physics_objects() {
        let (mut world, mut registry) = setup();
        let bodies = world.space().body_count();
        registry
            .add_player(&mut world, 5, Team::Right, Vec2::new(200.0, 0.0), true)
            .unwrap();

        assert!(registry.remove_player(&mut world, 5).unwrap());
        assert!(registry.is_empty());
        assert_eq!(world.space().body_count(), bodies);
        assert_eq!(world.space().joint_count(), 0);
    }

    #[test]
    fn test_gate_disabled_below_two_players() {
        let (mut world, mut registry) = setup();
        registry
            .add_player(&mut world, 1, Team::Left, Vec2::new(-200.0, 0.0), true)
            .unwrap();
        registry
            .add_player(&mut world, 2, Team::Right, Vec2::new(200.0, 0.0), true)
            .unwrap();
        world.arm_gate(Team::Left).unwrap();

        registry.remove_player(&mut world, 2).unwrap();

        assert!(!world.gate_armed());
    }

    #[test]
    fn test_intent_moves_cursor_only_for_known_ids() {
        let (mut world, mut registry) = setup();
        registry
            .add_player(&mut world, 3, Team::Left, Vec2::new(-200.0, 0.0), true)
            .unwrap();

        assert!(registry
            .set_intent(&mut world, 3, Vec2::new(-100.0, 40.0))
            .unwrap());
        assert!(!registry
            .set_intent(&mut world, 4, Vec2::new(0.0, 0.0))
            .unwrap());

        assert_eq!(
            registry.get(3).unwrap().cursor(world.space()),
            Vec2::new(-100.0, 40.0)
        );
    }

    #[test]
    fn test_team_sizes() {
        let (mut world, mut registry) = setup();
        for (id, team) in [(1, Team::Left), (2, Team::Right), (3, Team::Left)] {
            registry
                .add_player(&mut world, id, team, Vec2::new(team.side() * 300.0, id as f32 * 30.0), true)
                .unwrap();
        }

        assert_eq!(registry.team_sizes(), [2, 1]);
    }
}
