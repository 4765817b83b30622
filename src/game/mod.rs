//! Game session: world, players, match rules and the orchestrator

pub mod field;
pub mod r#match;
pub mod player;
pub mod registry;
pub mod session;
pub mod snapshot;
pub mod teams;
pub mod world;

pub use registry::RegistryError;
pub use session::{Session, SessionState, SharedSession};

use field::category;

/// Opaque client identity, assigned monotonically per connection
pub type ClientId = u64;

/// One of the two sides.
///
/// `Left` defends the goal at negative x, `Right` the one at positive x.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Team {
    Left,
    Right,
}

impl Team {
    pub fn index(self) -> usize {
        match self {
            Team::Left => 0,
            Team::Right => 1,
        }
    }

    pub fn opponent(self) -> Team {
        match self {
            Team::Left => Team::Right,
            Team::Right => Team::Left,
        }
    }

    /// Sign of x over the team's own half
    pub fn side(self) -> f32 {
        match self {
            Team::Left => -1.0,
            Team::Right => 1.0,
        }
    }

    /// Collision category of this team's player shapes
    pub fn category(self) -> u32 {
        match self {
            Team::Left => category::LEFT_PLAYER,
            Team::Right => category::RIGHT_PLAYER,
        }
    }
}

impl std::fmt::Display for Team {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.index())
    }
}
