//! WebSocket transport: wire protocol, socket handler and the session hub

pub mod handler;
pub mod hub;
pub mod protocol;
