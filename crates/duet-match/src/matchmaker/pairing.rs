//! Pairing engine.
//!
//! A match runs in three steps:
//! 1. Under the lock: dequeue the oldest waiter, or enqueue the requester
//!    and tell it to wait. Both sides of a hit get the same match ticket.
//! 2. Lock released: allocate a room and one credential per member, bounded
//!    by `MatchSettings::media_timeout`.
//! 3. Under the lock: commit the session if both members still hold the
//!    ticket, otherwise fail the attempt for whoever is still around.
//!
//! [`Matchmaker::begin_match`] runs step 1 alone and
//! [`Matchmaker::complete_match`] runs steps 2 and 3, so a caller that must
//! keep reading input can finish step 1 before spawning the rest.

use tracing::{info, warn};

use duet_common::{ConnectionId, MediaError, SessionId};
use duet_media::{Credential, RoomId};

use crate::error::MatchError;
use crate::protocol::ServerEvent;
use crate::registry::{ConnectionStatus, Session};

use super::Matchmaker;

/// How a `request_match` call ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
    /// No one was waiting; the requester is now queued.
    Waiting,
    /// A session was formed.
    Matched(SessionId),
    /// The attempt was abandoned and both parties were told.
    Failed,
}

/// Two connections claimed by one in-flight attempt. `members[0]` is the
/// waiter that was dequeued, `members[1]` the requester.
#[derive(Debug)]
#[must_use = "a pending match holds both members until completed"]
pub struct PendingMatch {
    ticket: u64,
    members: [ConnectionId; 2],
}

impl PendingMatch {
    pub fn ticket(&self) -> u64 {
        self.ticket
    }

    pub fn members(&self) -> &[ConnectionId; 2] {
        &self.members
    }
}

impl Matchmaker {
    /// Find a partner for `id`, or queue it until one arrives.
    pub async fn request_match(&self, id: &ConnectionId) -> Result<MatchOutcome, MatchError> {
        let Some(pending) = self.begin_match(id).await? else {
            return Ok(MatchOutcome::Waiting);
        };
        Ok(self.complete_match(pending).await)
    }

    /// Step 1 only. `None` means `id` was queued and told to wait; `Some`
    /// means a partner was claimed and [`Self::complete_match`] must follow.
    pub async fn begin_match(&self, id: &ConnectionId) -> Result<Option<PendingMatch>, MatchError> {
        let mut state = self.state.lock().await;
        let state = &mut *state;

        let conn = state
            .connections
            .get(id)
            .ok_or_else(|| MatchError::NoSuchConnection(id.clone()))?;
        match conn.status() {
            ConnectionStatus::Idle => {}
            ConnectionStatus::Waiting => return Err(MatchError::AlreadyWaiting(id.clone())),
            ConnectionStatus::Paired => return Err(MatchError::AlreadyPaired(id.clone())),
        }

        let Some(peer) = state.queue.dequeue_oldest(&state.connections) else {
            state.queue.enqueue(&mut state.connections, id)?;
            state.connections.send(id, ServerEvent::Waiting);
            info!(conn = %id, waiting = state.queue.len(), "Waiting for a partner");
            return Ok(None);
        };

        let ticket = state.next_ticket();
        for member in [&peer, id] {
            if let Some(conn) = state.connections.get_mut(member) {
                conn.begin_match(ticket);
            }
        }
        info!(ticket, conn = %id, peer = %peer, "Partner found, provisioning room");

        Ok(Some(PendingMatch {
            ticket,
            members: [peer, id.clone()],
        }))
    }

    /// Steps 2 and 3 for an attempt started by [`Self::begin_match`].
    pub async fn complete_match(&self, pending: PendingMatch) -> MatchOutcome {
        let result = self.provision_room().await;
        self.commit_match(pending, result).await
    }

    /// Allocate a room and one credential per member.
    async fn provision_room(&self) -> Result<(RoomId, [Credential; 2]), MediaError> {
        let media = self.media.as_ref();
        let attempt = async {
            let room = media.allocate_room().await?;
            let (first, second) = tokio::try_join!(
                media.issue_credential(&room),
                media.issue_credential(&room)
            )?;
            Ok::<_, MediaError>((room, [first, second]))
        };

        let timeout = self.settings.media_timeout;
        match tokio::time::timeout(timeout, attempt).await {
            Ok(result) => result,
            Err(_) => Err(MediaError::Timeout(timeout.as_millis() as u64)),
        }
    }

    async fn commit_match(
        &self,
        pending: PendingMatch,
        result: Result<(RoomId, [Credential; 2]), MediaError>,
    ) -> MatchOutcome {
        let mut state = self.state.lock().await;
        let state = &mut *state;
        let PendingMatch { ticket, members } = pending;

        let intact = members.iter().all(|member| {
            state
                .connections
                .get(member)
                .is_some_and(|conn| conn.match_ticket() == Some(ticket))
        });

        let reason = match result {
            Ok((room, credentials)) if intact => {
                let formed =
                    match Session::new(room.clone(), members[0].clone(), members[1].clone()) {
                        Ok(session) => state.sessions.add(session, &mut state.connections),
                        Err(e) => Err(e),
                    };
                match formed {
                    Ok(()) => {
                        for (member, credential) in members.iter().zip(credentials) {
                            state.connections.send(
                                member,
                                ServerEvent::Matched {
                                    token: credential.into_token(),
                                    session_id: room.clone(),
                                },
                            );
                        }
                        info!(
                            ticket,
                            session = %room,
                            a = %members[0],
                            b = %members[1],
                            sessions = state.sessions.len(),
                            "Session formed"
                        );
                        return MatchOutcome::Matched(room);
                    }
                    Err(e) => e.to_string(),
                }
            }
            Ok((room, _)) => format!("a member left before room {room} was ready"),
            Err(e) => e.to_string(),
        };

        warn!(ticket, reason = %reason, "Match failed");
        for member in &members {
            if let Some(conn) = state.connections.get_mut(member) {
                if conn.match_ticket() == Some(ticket) {
                    conn.abandon_match();
                    conn.send(ServerEvent::Error {
                        message: self.settings.match_failed_message.clone(),
                    });
                }
            }
        }
        MatchOutcome::Failed
    }
}
