//! The coordinating service that owns the matching state.
//!
//! `Matchmaker` is cheap to clone; every clone shares one [`MatchState`]
//! behind a single async mutex. Holding that lock is what makes a step
//! atomic: queue and session mutations never interleave, and events routed
//! from one sender reach the receiver's outbox in the order they were sent.

mod pairing;
mod router;


use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info};

use duet_common::ConnectionId;
use duet_config::MatchingConfig;
use duet_media::MediaProvider;

use crate::error::MatchError;
use crate::protocol::ClientEvent;
use crate::registry::{ConnectionStatus, MatchState, Outbox, Session};

pub use pairing::{MatchOutcome, PendingMatch};
pub use router::RouteOutcome;

/// Tunables for the pairing engine.
#[derive(Debug, Clone)]
pub struct MatchSettings {
    /// Budget for allocating a room and both credentials.
    pub media_timeout: Duration,
    /// Text of the `error` event both parties get when a match fails.
    pub match_failed_message: String,
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self::from(&MatchingConfig::default())
    }
}

impl From<&MatchingConfig> for MatchSettings {
    fn from(config: &MatchingConfig) -> Self {
        Self {
            media_timeout: Duration::from_millis(config.media_timeout_ms),
            match_failed_message: config.match_failed_message.clone(),
        }
    }
}

/// Point-in-time counts for health reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MatchStats {
    pub connections: usize,
    pub waiting: usize,
    pub sessions: usize,
}

#[derive(Clone)]
pub struct Matchmaker {
    state: Arc<Mutex<MatchState>>,
    media: Arc<dyn MediaProvider>,
    settings: Arc<MatchSettings>,
}

impl Matchmaker {
    pub fn new(media: Arc<dyn MediaProvider>, settings: MatchSettings) -> Self {
        Self {
            state: Arc::new(Mutex::new(MatchState::new())),
            media,
            settings: Arc::new(settings),
        }
    }

    pub fn settings(&self) -> &MatchSettings {
        &self.settings
    }

    /// Track a newly accepted socket. It starts Idle.
    pub async fn register(&self, id: ConnectionId, outbox: Outbox) {
        let mut state = self.state.lock().await;
        state.connections.register(id.clone(), outbox);
        debug!(conn = %id, total = state.connections.len(), "Connection registered");
    }

    /// Dispatch one inbound client event.
    pub async fn handle(&self, id: &ConnectionId, event: ClientEvent) -> Result<(), MatchError> {
        match event {
            ClientEvent::RequestMatch => self.request_match(id).await.map(|_| ()),
            ClientEvent::CancelMatch => {
                self.cancel_match(id).await;
                Ok(())
            }
            ClientEvent::LeaveSession => {
                self.leave(id).await;
                Ok(())
            }
            relayed => {
                if let Some(event) = relayed.into_relay() {
                    self.route(id, event).await;
                }
                Ok(())
            }
        }
    }

    /// Withdraw `id` from the waiting queue. No effect once a match for it
    /// is already in flight. Returns whether it was waiting.
    pub async fn cancel_match(&self, id: &ConnectionId) -> bool {
        let mut state = self.state.lock().await;
        let state = &mut *state;
        let removed = state.queue.remove(&mut state.connections, id);
        if removed {
            info!(conn = %id, waiting = state.queue.len(), "Match request cancelled");
        }
        removed
    }

    pub async fn status(&self, id: &ConnectionId) -> Option<ConnectionStatus> {
        self.state.lock().await.connections.status(id)
    }

    pub async fn session_of(&self, id: &ConnectionId) -> Option<Session> {
        self.state.lock().await.sessions.find_by_member(id).cloned()
    }

    pub async fn stats(&self) -> MatchStats {
        let state = self.state.lock().await;
        MatchStats {
            connections: state.connections.len(),
            waiting: state.queue.len(),
            sessions: state.sessions.len(),
        }
    }
}
