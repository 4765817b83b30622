//! Field layout and build-time game constants

use std::time::Duration;

pub const FIELD_WIDTH: f32 = 1000.0;
pub const FIELD_HEIGHT: f32 = 500.0;
/// Width of the goal mouth on each end line
pub const GOAL_SIZE: f32 = 200.0;
/// Radius of the rounded wall segments
pub const EDGE_RADIUS: f32 = 8.0;
pub const EDGE_ELASTICITY: f32 = 1.0;
pub const EDGE_FRICTION: f32 = 1.0;

pub const PLAYER_RADIUS: f32 = 10.0;
pub const PLAYER_MASS: f32 = 1.0;
/// Force cap on the cursor joint, keeps player motion soft
pub const PLAYER_MAX_FORCE: f32 = 1000.0;
/// Motor gains of the cursor joint, critically damped for a unit mass
pub const CONTROL_STIFFNESS: f32 = 100.0;
pub const CONTROL_DAMPING: f32 = 20.0;
pub const PLAYER_ELASTICITY: f32 = 0.9;
pub const PLAYER_FRICTION: f32 = 0.1;

pub const BALL_RADIUS: f32 = 10.0;
pub const BALL_MASS: f32 = 0.1;
pub const BALL_ELASTICITY: f32 = 0.9;
pub const BALL_FRICTION: f32 = 0.1;

/// Linear damping coefficient. About 10% of a body's velocity is left
/// after one second of free motion (`-ln 0.1`).
pub const LINEAR_DAMPING: f32 = 2.3;

/// Radius of the center restart zone
pub const GATE_RADIUS: f32 = 0.25 * FIELD_HEIGHT;
/// Minimum spawn distance of a player center from the field center
pub const CENTER_CLEARANCE: f32 = GATE_RADIUS + PLAYER_RADIUS;

/// Control freeze after a kickoff
pub const PAUSE_TIME: Duration = Duration::from_secs(1);
pub const SCORE_LIMIT: u32 = 10;

/// Collision categories
pub mod category {
    pub const FIELD: u32 = 1 << 0;
    pub const GOAL_LINE: u32 = 1 << 1;
    pub const BALL: u32 = 1 << 2;
    pub const LEFT_PLAYER: u32 = 1 << 3;
    pub const RIGHT_PLAYER: u32 = 1 << 4;
    pub const GATE: u32 = 1 << 5;

    pub const PLAYERS: u32 = LEFT_PLAYER | RIGHT_PLAYER;
}

pub const fn half_width() -> f32 {
    0.5 * FIELD_WIDTH
}

pub const fn half_height() -> f32 {
    0.5 * FIELD_HEIGHT
}
