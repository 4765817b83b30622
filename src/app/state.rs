//! Application state shared across routes

use std::sync::Arc;

use crate::config::Config;
use crate::game::SharedSession;
use crate::ws::hub::Hub;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Socket side of the session channels
    pub hub: Arc<Hub>,
    /// Read access for health reporting
    pub session: SharedSession,
}

impl AppState {
    pub fn new(config: Config, hub: Arc<Hub>, session: SharedSession) -> Self {
        Self {
            config: Arc::new(config),
            hub,
            session,
        }
    }
}
