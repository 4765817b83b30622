//! Transport hub between socket tasks and the session.
//!
//! Socket tasks push control events (connect/close) and inbound messages;
//! the session pushes outbound messages into per-client queues.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use crate::game::{ClientId, RegistryError};

use super::protocol::{ClientMsg, ServerMsg};

/// How long the session waits for a registered client to confirm
pub const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(5);

/// Outbound queue depth per client
pub const OUTBOX_CAPACITY: usize = 64;

const CONTROL_CAPACITY: usize = 64;
const INBOX_CAPACITY: usize = 1024;

/// Confirmation that a registered client is ready for traffic
#[derive(Debug)]
pub struct Establish;

/// A new connection asking to join.
///
/// The session answers on `register` with the assigned id, then waits on
/// `establish` before creating the player.
#[derive(Debug)]
pub struct ConnectRequest {
    pub register: oneshot::Sender<ClientId>,
    pub establish: oneshot::Receiver<Establish>,
}

#[derive(Debug)]
pub enum ControlEvent {
    Connect(ConnectRequest),
    Close(ClientId),
}

/// A decoded message from a client
#[derive(Debug, Clone)]
pub struct Inbound {
    pub from: ClientId,
    pub msg: ClientMsg,
}

#[derive(Debug, thiserror::Error)]
pub enum HandshakeError {
    #[error("session is not accepting connections")]
    SessionClosed,

    #[error("peer went away before registration completed")]
    Dropped,

    #[error("registration was not confirmed")]
    Rejected,

    #[error("registration timed out")]
    TimedOut,

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Receiving ends, owned by the session's control loop
pub struct HubReceivers {
    pub control: mpsc::Receiver<ControlEvent>,
    pub inbox: mpsc::Receiver<Inbound>,
}

pub struct Hub {
    outboxes: DashMap<ClientId, mpsc::Sender<Arc<ServerMsg>>>,
    control_tx: mpsc::Sender<ControlEvent>,
    inbox_tx: mpsc::Sender<Inbound>,
}

impl Hub {
    pub fn new() -> (Self, HubReceivers) {
        let (control_tx, control) = mpsc::channel(CONTROL_CAPACITY);
        let (inbox_tx, inbox) = mpsc::channel(INBOX_CAPACITY);
        let hub = Self {
            outboxes: DashMap::new(),
            control_tx,
            inbox_tx,
        };
        (hub, HubReceivers { control, inbox })
    }

    /// Client side of the connect handshake: ask for an id, attach the
    /// outbound queue, then confirm.
    pub async fn connect(
        &self,
        outbox: mpsc::Sender<Arc<ServerMsg>>,
    ) -> Result<ClientId, HandshakeError> {
        let (register_tx, register_rx) = oneshot::channel();
        let (establish_tx, establish_rx) = oneshot::channel();

        self.control_tx
            .send(ControlEvent::Connect(ConnectRequest {
                register: register_tx,
                establish: establish_rx,
            }))
            .await
            .map_err(|_| HandshakeError::SessionClosed)?;

        let id = register_rx.await.map_err(|_| HandshakeError::Dropped)?;
        self.outboxes.insert(id, outbox);

        if establish_tx.send(Establish).is_err() {
            self.outboxes.remove(&id);
            return Err(HandshakeError::Rejected);
        }
        Ok(id)
    }

    /// Detach a client and tell the session it is gone
    pub async fn disconnect(&self, id: ClientId) {
        self.outboxes.remove(&id);
        if self.control_tx.send(ControlEvent::Close(id)).await.is_err() {
            debug!(client_id = id, "Session gone, close not delivered");
        }
    }

    /// Queue a control event directly
    #[cfg(test)]
    pub async fn control(&self, event: ControlEvent) -> bool {
        self.control_tx.send(event).await.is_ok()
    }

    /// Hand a decoded client message to the session
    pub async fn deliver(&self, inbound: Inbound) -> bool {
        self.inbox_tx.send(inbound).await.is_ok()
    }

    /// Queue a message for one client without waiting.
    ///
    /// Unknown clients and full queues drop the message.
    pub fn send(&self, id: ClientId, msg: Arc<ServerMsg>) -> bool {
        let Some(outbox) = self.outboxes.get(&id) else {
            return false;
        };
        match outbox.try_send(msg) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                debug!(client_id = id, "Outbox full, dropping message");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        }
    }

    pub fn connected(&self) -> usize {
        self.outboxes.len()
    }
}
