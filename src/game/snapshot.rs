//! Snapshot building for network transmission

use std::collections::BTreeMap;

use crate::ws::protocol::{BallSnapshot, PlayerSnapshot, ServerMsg};

use super::field;
use super::r#match::MatchState;
use super::registry::Registry;
use super::world::FieldWorld;
use super::ClientId;

/// Full state message: every player, the ball and the score
pub fn build_state(world: &FieldWorld, registry: &Registry, rules: &MatchState) -> ServerMsg {
    let players = registry
        .iter()
        .map(|p| {
            (
                p.id.to_string(),
                PlayerSnapshot {
                    pos: p.position(world.space()).into(),
                    team: p.team.index() as u8,
                },
            )
        })
        .collect::<BTreeMap<_, _>>();

    ServerMsg::State {
        players,
        ball: BallSnapshot {
            pos: world.ball_position().into(),
        },
        score: rules.score(),
    }
}

/// Field layout for a newly joined client
pub fn build_config(id: ClientId) -> ServerMsg {
    ServerMsg::Config {
        id: id.to_string(),
        field_width: field::FIELD_WIDTH,
        field_height: field::FIELD_HEIGHT,
        goal_size: field::GOAL_SIZE,
        player_radius: field::PLAYER_RADIUS,
        ball_radius: field::BALL_RADIUS,
    }
}
