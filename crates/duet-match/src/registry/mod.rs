//! The process-wide matching state: connections, the waiting queue, and
//! the session registry.
//!
//! These three are only ever mutated together, through `&mut MatchState`,
//! so they cannot drift apart.

mod connection;
mod queue;
mod session;

pub use connection::{Connection, ConnectionRegistry, ConnectionStatus, Outbox};
pub use queue::WaitingQueue;
pub use session::{Session, SessionRegistry};

#[derive(Debug, Default)]
pub struct MatchState {
    pub connections: ConnectionRegistry,
    pub queue: WaitingQueue,
    pub sessions: SessionRegistry,
    next_ticket: u64,
}

impl MatchState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id for the next match attempt.
    pub(crate) fn next_ticket(&mut self) -> u64 {
        self.next_ticket += 1;
        self.next_ticket
    }

    /// Check the cross-structure invariants, describing the first violation.
    #[cfg(test)]
    pub(crate) fn audit(&self) -> Result<(), String> {
        use std::collections::HashSet;

        let mut seen = HashSet::new();
        for id in self.queue.iter() {
            if !seen.insert(id) {
                return Err(format!("{id} queued twice"));
            }
            match self.connections.get(id) {
                Some(conn) if conn.status() == ConnectionStatus::Waiting => {}
                Some(conn) => return Err(format!("{id} queued with status {:?}", conn.status())),
                None => return Err(format!("{id} queued but unregistered")),
            }
            if self.sessions.find_by_member(id).is_some() {
                return Err(format!("{id} both queued and in a session"));
            }
        }

        let mut members = HashSet::new();
        for session in self.sessions.iter() {
            let [a, b] = session.members();
            if a == b {
                return Err(format!("session {} pairs {a} with itself", session.id()));
            }
            for member in session.members() {
                if !members.insert(member) {
                    return Err(format!("{member} is in two sessions"));
                }
                match self.connections.get(member) {
                    Some(conn)
                        if conn.status() == ConnectionStatus::Paired
                            && conn.session() == Some(session.id()) => {}
                    Some(conn) => {
                        return Err(format!(
                            "{member} in session {} but status {:?} / ref {:?}",
                            session.id(),
                            conn.status(),
                            conn.session()
                        ))
                    }
                    None => return Err(format!("{member} in a session but unregistered")),
                }
            }
        }

        for conn in self.connections.iter() {
            let in_session = self.sessions.find_by_member(conn.id()).is_some();
            if (conn.status() == ConnectionStatus::Paired) != in_session {
                return Err(format!(
                    "{} has status {:?} but session membership {in_session}",
                    conn.id(),
                    conn.status()
                ));
            }
            if conn.status() != ConnectionStatus::Paired && conn.session().is_some() {
                return Err(format!("{} holds a stale session ref", conn.id()));
            }
        }
        Ok(())
    }
}
