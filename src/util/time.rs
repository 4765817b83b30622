//! Time utilities for game simulation

use std::time::{Duration, Instant};

/// Server start time for uptime tracking
static SERVER_START: std::sync::OnceLock<Instant> = std::sync::OnceLock::new();

/// Initialize server start time (call once at startup)
pub fn init_server_time() {
    SERVER_START.get_or_init(Instant::now);
}

/// Get server uptime in seconds
pub fn uptime_secs() -> u64 {
    SERVER_START
        .get()
        .map(|start| start.elapsed().as_secs())
        .unwrap_or(0)
}

/// Tick rate configuration
pub const SIMULATION_TPS: u32 = 60; // physics steps per second
pub const BROADCAST_TPS: u32 = 24; // state snapshots per second

/// Wall-clock period of one physics step
pub fn tick_duration() -> Duration {
    Duration::from_secs(1) / SIMULATION_TPS
}

/// Wall-clock period between state broadcasts
pub fn broadcast_duration() -> Duration {
    Duration::from_secs(1) / BROADCAST_TPS
}

/// Calculate delta time for physics (in seconds)
pub fn tick_delta() -> f32 {
    1.0 / SIMULATION_TPS as f32
}

/// Number of whole physics ticks in `duration`
pub fn ticks_in(duration: Duration) -> u32 {
    (duration.as_micros() / tick_duration().as_micros()) as u32
}
