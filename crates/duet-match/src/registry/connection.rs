//! Connection registry: one entry per live client socket.

use std::collections::HashMap;

use tokio::sync::mpsc;

use duet_common::{ConnectionId, SessionId};

use crate::protocol::ServerEvent;

/// Outbound channel of one connection. The socket task drains it.
pub type Outbox = mpsc::UnboundedSender<ServerEvent>;

/// Where a connection stands in the matching lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Idle,
    Waiting,
    Paired,
}

#[derive(Debug)]
pub struct Connection {
    id: ConnectionId,
    status: ConnectionStatus,
    /// Index into the session registry, set only while Paired.
    session: Option<SessionId>,
    /// Set while this connection is one side of an in-flight match.
    match_ticket: Option<u64>,
    outbox: Outbox,
}

impl Connection {
    fn new(id: ConnectionId, outbox: Outbox) -> Self {
        Self {
            id,
            status: ConnectionStatus::Idle,
            session: None,
            match_ticket: None,
            outbox,
        }
    }

    pub fn id(&self) -> &ConnectionId {
        &self.id
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    pub fn session(&self) -> Option<&SessionId> {
        self.session.as_ref()
    }

    pub fn match_ticket(&self) -> Option<u64> {
        self.match_ticket
    }

    /// Queue an event for this client. Returns false if its socket is gone.
    pub fn send(&self, event: ServerEvent) -> bool {
        self.outbox.send(event).is_ok()
    }

    pub(crate) fn mark_waiting(&mut self) {
        self.status = ConnectionStatus::Waiting;
    }

    /// Claim this connection for match attempt `ticket`. It stays Waiting
    /// from the outside until the attempt resolves.
    pub(crate) fn begin_match(&mut self, ticket: u64) {
        self.status = ConnectionStatus::Waiting;
        self.match_ticket = Some(ticket);
    }

    pub(crate) fn abandon_match(&mut self) {
        self.status = ConnectionStatus::Idle;
        self.match_ticket = None;
    }

    pub(crate) fn pair(&mut self, session: SessionId) {
        self.status = ConnectionStatus::Paired;
        self.session = Some(session);
        self.match_ticket = None;
    }

    pub(crate) fn reset(&mut self) {
        self.status = ConnectionStatus::Idle;
        self.session = None;
    }
}

#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: HashMap<ConnectionId, Connection>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a connection in the Idle state. Registering an id twice keeps the
    /// first entry.
    pub fn register(&mut self, id: ConnectionId, outbox: Outbox) -> &Connection {
        self.connections
            .entry(id.clone())
            .or_insert_with(|| Connection::new(id, outbox))
    }

    /// Drop the entry only. Purging the connection from the queue and the
    /// session registry is `MatchState::unregister`'s job.
    pub(crate) fn remove(&mut self, id: &ConnectionId) -> Option<Connection> {
        self.connections.remove(id)
    }

    pub fn get(&self, id: &ConnectionId) -> Option<&Connection> {
        self.connections.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: &ConnectionId) -> Option<&mut Connection> {
        self.connections.get_mut(id)
    }

    pub fn contains(&self, id: &ConnectionId) -> bool {
        self.connections.contains_key(id)
    }

    pub fn status(&self, id: &ConnectionId) -> Option<ConnectionStatus> {
        self.connections.get(id).map(Connection::status)
    }

    /// Send to `id` if registered. Returns whether the event was queued.
    pub fn send(&self, id: &ConnectionId, event: ServerEvent) -> bool {
        self.connections
            .get(id)
            .map(|conn| conn.send(event))
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Connection> {
        self.connections.values()
    }
}
