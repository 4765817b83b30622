//! WebSocket protocol message definitions
//! These are the wire types for client-server communication

use std::collections::BTreeMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// 2D position on the wire
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl From<Vec2> for Position {
    fn from(v: Vec2) -> Self {
        Self { x: v.x, y: v.y }
    }
}

impl From<Position> for Vec2 {
    fn from(p: Position) -> Self {
        Vec2::new(p.x, p.y)
    }
}

/// Messages sent from client to server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMsg {
    /// Where the player wants to go
    Player {
        /// Cursor position in field coordinates
        pos: Position,
    },
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMsg {
    /// Field layout and the client's own id, sent once after joining
    Config {
        id: String,
        field_width: f32,
        field_height: f32,
        goal_size: f32,
        player_radius: f32,
        ball_radius: f32,
    },

    /// Game state snapshot (sent at regular intervals)
    State {
        /// Keyed by stringified client id
        players: BTreeMap<String, PlayerSnapshot>,
        ball: BallSnapshot,
        score: [u32; 2],
    },
}

/// Player state in a snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub pos: Position,
    /// 0 or 1
    pub team: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BallSnapshot {
    pub pos: Position,
}
