//! FIFO queue of connections waiting for a partner.

use std::collections::VecDeque;

use duet_common::ConnectionId;

use crate::error::MatchError;

use super::connection::{ConnectionRegistry, ConnectionStatus};

/// Arrival-ordered waiters. Ties are broken by the order `enqueue` calls
/// reach the sequencer.
#[derive(Debug, Default)]
pub struct WaitingQueue {
    entries: VecDeque<ConnectionId>,
}

impl WaitingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an Idle connection to the tail and mark it Waiting.
    pub fn enqueue(
        &mut self,
        connections: &mut ConnectionRegistry,
        id: &ConnectionId,
    ) -> Result<(), MatchError> {
        let conn = connections
            .get_mut(id)
            .ok_or_else(|| MatchError::NoSuchConnection(id.clone()))?;

        match conn.status() {
            ConnectionStatus::Idle => {}
            ConnectionStatus::Waiting => return Err(MatchError::AlreadyWaiting(id.clone())),
            ConnectionStatus::Paired => return Err(MatchError::AlreadyPaired(id.clone())),
        }

        conn.mark_waiting();
        self.entries.push_back(id.clone());
        Ok(())
    }

    /// Pop the oldest waiter. Its status is left as Waiting; the caller
    /// decides what it becomes next.
    pub fn dequeue_oldest(&mut self, connections: &ConnectionRegistry) -> Option<ConnectionId> {
        while let Some(id) = self.entries.pop_front() {
            if connections.contains(&id) {
                return Some(id);
            }
        }
        None
    }

    /// Take `id` out of the queue and reset it to Idle. Returns false if it
    /// was not queued.
    pub fn remove(&mut self, connections: &mut ConnectionRegistry, id: &ConnectionId) -> bool {
        let Some(pos) = self.entries.iter().position(|queued| queued == id) else {
            return false;
        };
        self.entries.remove(pos);
        if let Some(conn) = connections.get_mut(id) {
            conn.reset();
        }
        true
    }

    pub fn contains(&self, id: &ConnectionId) -> bool {
        self.entries.contains(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConnectionId> {
        self.entries.iter()
    }
}
