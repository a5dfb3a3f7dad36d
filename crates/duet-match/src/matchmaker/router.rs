//! Event routing and teardown.

use tracing::{debug, info};

use duet_common::ConnectionId;

use crate::protocol::{RelayEvent, ServerEvent};
use crate::registry::MatchState;

use super::Matchmaker;

/// Where a relayed event went.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    Delivered(ConnectionId),
    /// Sender had no active session. Not an error: stray events right after
    /// a partner leaves are normal.
    Dropped,
}

impl Matchmaker {
    /// Relay `event` from `sender` to the other member of its session.
    pub async fn route(&self, sender: &ConnectionId, event: RelayEvent) -> RouteOutcome {
        let state = self.state.lock().await;

        let Some(peer) = state.sessions.other_member(sender).cloned() else {
            debug!(conn = %sender, event = ?event, "No active session, dropping event");
            return RouteOutcome::Dropped;
        };

        if !state.connections.send(&peer, event.into_peer_event()) {
            debug!(conn = %sender, peer = %peer, "Peer outbox closed");
        }
        RouteOutcome::Delivered(peer)
    }

    /// Explicit leave. Safe in any state; a no-op for a connection with no
    /// queue entry and no session.
    pub async fn leave(&self, id: &ConnectionId) {
        let mut state = self.state.lock().await;
        teardown(&mut state, id);

        // A member of an in-flight match keeps its ticket; that attempt
        // resolves on its own.
        if let Some(conn) = state.connections.get_mut(id) {
            if conn.match_ticket().is_none() {
                conn.reset();
            }
        }
    }

    /// Transport closed. Purges `id` everywhere; an in-flight match that
    /// involves it will take the failure path when it resolves.
    pub async fn disconnect(&self, id: &ConnectionId) {
        let mut state = self.state.lock().await;
        teardown(&mut state, id);
        if state.connections.remove(id).is_some() {
            debug!(conn = %id, total = state.connections.len(), "Connection unregistered");
        }
    }
}

/// Leave the queue, end the session, and tell the partner exactly once.
fn teardown(state: &mut MatchState, id: &ConnectionId) {
    if state.queue.remove(&mut state.connections, id) {
        info!(conn = %id, waiting = state.queue.len(), "Left the waiting queue");
    }

    if let Some(other) = state.sessions.remove(id, &mut state.connections) {
        state.connections.send(&other, ServerEvent::PeerLeft);
        info!(
            conn = %id,
            peer = %other,
            sessions = state.sessions.len(),
            "Session ended"
        );
    }
}
