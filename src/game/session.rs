//! Session orchestrator: shared session state and the three loops driving it
//!
//! The physics loop, the broadcast loop and the control loop each run as
//! their own task. They share one `SessionState` behind a single mutex; no
//! task holds the lock across an await point.

use std::sync::Arc;

use glam::Vec2;
use parking_lot::Mutex;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::physics::PhysicsError;
use crate::util::time::{broadcast_duration, tick_duration};
use crate::ws::hub::{ConnectRequest, ControlEvent, HandshakeError, Hub, HubReceivers, HANDSHAKE_TIMEOUT};
use crate::ws::protocol::{ClientMsg, ServerMsg};

use super::r#match::MatchState;
use super::registry::{Registry, RegistryError};
use super::snapshot::{build_config, build_state};
use super::teams::{next_team, placement};
use super::world::FieldWorld;
use super::ClientId;

/// Session state guarded by the session lock
pub type SharedSession = Arc<Mutex<SessionState>>;

/// Everything the loops mutate: world, players, rules and the session RNG
pub struct SessionState {
    world: FieldWorld,
    registry: Registry,
    rules: MatchState,
    rng: ChaCha8Rng,
    tick: u64,
    next_id: ClientId,
}

impl SessionState {
    pub fn new(seed: u64) -> Result<Self, PhysicsError> {
        Self::with_rules(seed, MatchState::new())
    }

    fn with_rules(seed: u64, rules: MatchState) -> Result<Self, PhysicsError> {
        Ok(Self {
            world: FieldWorld::new()?,
            registry: Registry::new(),
            rules,
            rng: ChaCha8Rng::seed_from_u64(seed),
            tick: 0,
            next_id: 1,
        })
    }

    pub fn shared(self) -> SharedSession {
        Arc::new(Mutex::new(self))
    }

    /// One fixed physics step followed by the match rules
    pub fn physics_tick(&mut self) {
        self.tick += 1;
        let contacts = self.world.step();

        if let Err(e) = self.world.release_gate_on_ball_contact(&contacts) {
            error!(tick = self.tick, error = %e, "Failed to release restart gate");
        }

        match self.rules.tick(&mut self.world, &mut self.registry, &mut self.rng) {
            Ok(Some(goal)) => {
                info!(
                    tick = self.tick,
                    scorer = %goal.scorer,
                    score = ?goal.score,
                    limit_reset = goal.limit_reset,
                    "Goal"
                );
            }
            Ok(None) => {}
            Err(e) => error!(tick = self.tick, error = %e, "Match rules failed"),
        }
    }

    /// Ids start at 1 and are never reused, abandoned handshakes included
    pub fn allocate_id(&mut self) -> ClientId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Put a new client on the smaller team and return its config message
    pub fn join(&mut self, id: ClientId) -> Result<ServerMsg, RegistryError> {
        let team = next_team(self.registry.team_sizes(), &mut self.rng);
        let position = placement(team, &mut self.rng);
        let control = !self.rules.is_paused();

        self.registry
            .add_player(&mut self.world, id, team, position, control)?;
        info!(client_id = id, team = %team, players = self.registry.len(), "Player joined");

        Ok(build_config(id))
    }

    pub fn leave(&mut self, id: ClientId) {
        match self.registry.remove_player(&mut self.world, id) {
            Ok(true) => info!(client_id = id, players = self.registry.len(), "Player left"),
            Ok(false) => debug!(client_id = id, "Close for unknown client"),
            Err(e) => error!(client_id = id, error = %e, "Failed to remove player"),
        }
    }

    pub fn intent(&mut self, id: ClientId, target: Vec2) {
        if let Err(e) = self.registry.set_intent(&mut self.world, id, target) {
            error!(client_id = id, error = %e, "Failed to apply intent");
        }
    }

    /// State message plus the ids it goes to
    pub fn snapshot(&self) -> (ServerMsg, Vec<ClientId>) {
        (
            build_state(&self.world, &self.registry, &self.rules),
            self.registry.ids(),
        )
    }

    pub fn player_count(&self) -> usize {
        self.registry.len()
    }

    pub fn score(&self) -> [u32; 2] {
        self.rules.score()
    }
}

/// Handles to the running session tasks
pub struct Session {
    physics: JoinHandle<()>,
    broadcast: JoinHandle<()>,
    control: JoinHandle<()>,
}

impl Session {
    pub fn spawn(state: SharedSession, hub: Arc<Hub>, receivers: HubReceivers) -> Self {
        let physics = tokio::spawn(physics_loop(state.clone()));
        let broadcast = tokio::spawn(broadcast_loop(state.clone(), hub.clone()));
        let control = tokio::spawn(control_loop(state, hub, receivers));

        Self {
            physics,
            broadcast,
            control,
        }
    }

    pub fn abort(&self) {
        self.physics.abort();
        self.broadcast.abort();
        self.control.abort();
    }
}

async fn physics_loop(state: SharedSession) {
    let mut ticker = time::interval(tick_duration());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        state.lock().physics_tick();
    }
}

async fn broadcast_loop(state: SharedSession, hub: Arc<Hub>) {
    let mut ticker = time::interval(broadcast_duration());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;

        let (msg, recipients) = state.lock().snapshot();
        let msg = Arc::new(msg);
        for id in recipients {
            // a client may have left since the snapshot; send just misses
            hub.send(id, msg.clone());
        }
    }
}

async fn control_loop(state: SharedSession, hub: Arc<Hub>, receivers: HubReceivers) {
    let HubReceivers {
        mut control,
        mut inbox,
    } = receivers;

    loop {
        tokio::select! {
            event = control.recv() => match event {
                Some(ControlEvent::Connect(request)) => {
                    match handshake(&state, &hub, request).await {
                        Ok(_) => {}
                        Err(e @ HandshakeError::Registry(_)) => {
                            error!(error = %e, "Failed to create player");
                        }
                        Err(e) => debug!(error = %e, "Handshake abandoned"),
                    }
                }
                Some(ControlEvent::Close(id)) => state.lock().leave(id),
                None => break,
            },
            Some(inbound) = inbox.recv() => {
                let ClientMsg::Player { pos } = inbound.msg;
                state.lock().intent(inbound.from, pos.into());
            }
        }
    }

    warn!("Control channel closed, session stops accepting clients");
}

/// Session side of the connect handshake.
///
/// The entity only exists once the client has confirmed; the config message
/// is queued under the same lock so it precedes the first state message.
async fn handshake(
    state: &SharedSession,
    hub: &Hub,
    request: ConnectRequest,
) -> Result<ClientId, HandshakeError> {
    let id = state.lock().allocate_id();
    request
        .register
        .send(id)
        .map_err(|_| HandshakeError::Dropped)?;

    match time::timeout(HANDSHAKE_TIMEOUT, request.establish).await {
        Ok(Ok(_)) => {}
        Ok(Err(_)) => return Err(HandshakeError::Dropped),
        Err(_) => return Err(HandshakeError::TimedOut),
    }

    let mut session = state.lock();
    let config = session.join(id)?;
    hub.send(id, Arc::new(config));
    Ok(id)
}
