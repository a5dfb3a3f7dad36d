//! Session registry: the active pairs and who belongs to which.

use std::collections::HashMap;

use duet_common::{ConnectionId, SessionId};

use crate::error::MatchError;

use super::connection::{ConnectionRegistry, ConnectionStatus};

/// A matched pair sharing one media room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    id: SessionId,
    members: [ConnectionId; 2],
}

impl Session {
    /// Build a session for two distinct connections.
    pub fn new(id: SessionId, a: ConnectionId, b: ConnectionId) -> Result<Self, MatchError> {
        if a == b {
            return Err(MatchError::InvalidSession(format!(
                "connection {a} cannot be paired with itself"
            )));
        }
        Ok(Self { id, members: [a, b] })
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn members(&self) -> &[ConnectionId; 2] {
        &self.members
    }

    pub fn contains(&self, id: &ConnectionId) -> bool {
        self.members.contains(id)
    }

    /// The member that is not `id`. `None` if `id` is not a member.
    pub fn other_member(&self, id: &ConnectionId) -> Option<&ConnectionId> {
        match &self.members {
            [a, b] if a == id => Some(b),
            [a, b] if b == id => Some(a),
            _ => None,
        }
    }
}

/// Owner of every live session. Connections only hold the session id as an
/// index; both are updated together here.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: HashMap<SessionId, Session>,
    by_member: HashMap<ConnectionId, SessionId>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `session` and mark both members Paired.
    ///
    /// Fails without touching anything if a member is unregistered, already
    /// in a session, or the session id is taken.
    pub fn add(
        &mut self,
        session: Session,
        connections: &mut ConnectionRegistry,
    ) -> Result<(), MatchError> {
        if self.sessions.contains_key(&session.id) {
            return Err(MatchError::InvalidSession(format!(
                "session {} already exists",
                session.id
            )));
        }
        for member in &session.members {
            let conn = connections
                .get(member)
                .ok_or_else(|| MatchError::NoSuchConnection(member.clone()))?;
            if self.by_member.contains_key(member) || conn.status() == ConnectionStatus::Paired {
                return Err(MatchError::AlreadyPaired(member.clone()));
            }
        }

        for member in &session.members {
            if let Some(conn) = connections.get_mut(member) {
                conn.pair(session.id.clone());
            }
            self.by_member.insert(member.clone(), session.id.clone());
        }
        self.sessions.insert(session.id.clone(), session);
        Ok(())
    }

    pub fn find_by_member(&self, id: &ConnectionId) -> Option<&Session> {
        self.by_member
            .get(id)
            .and_then(|session_id| self.sessions.get(session_id))
    }

    /// The partner of `id` in its current session.
    pub fn other_member(&self, id: &ConnectionId) -> Option<&ConnectionId> {
        self.find_by_member(id)?.other_member(id)
    }

    pub fn get(&self, id: &SessionId) -> Option<&Session> {
        self.sessions.get(id)
    }

    /// Tear down the session `id` belongs to. Both members go back to Idle
    /// (if still registered) and the other member is returned so the caller
    /// can notify it.
    pub fn remove(
        &mut self,
        id: &ConnectionId,
        connections: &mut ConnectionRegistry,
    ) -> Option<ConnectionId> {
        let session_id = self.by_member.remove(id)?;
        let session = self.sessions.remove(&session_id)?;

        for member in &session.members {
            self.by_member.remove(member);
            if let Some(conn) = connections.get_mut(member) {
                conn.reset();
            }
        }

        session.other_member(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Session> {
        self.sessions.values()
    }
}
