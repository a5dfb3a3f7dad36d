//! Errors surfaced by matching operations.
//!
//! None of these are fatal. The server logs them and carries on; the only
//! ones a client ever hears about are media failures, and those arrive as
//! an `error` event rather than through this type.

use duet_common::{ConnectionId, MediaError};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatchError {
    #[error("connection {0} is already waiting")]
    AlreadyWaiting(ConnectionId),

    #[error("connection {0} is already in a session")]
    AlreadyPaired(ConnectionId),

    #[error("unknown connection {0}")]
    NoSuchConnection(ConnectionId),

    #[error("invalid session: {0}")]
    InvalidSession(String),

    #[error(transparent)]
    Media(#[from] MediaError),
}
