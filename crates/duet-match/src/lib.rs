//! Matching and session coordination for anonymous one-to-one calls.
//!
//! Clients ask for a partner, wait in a FIFO queue, get paired with the
//! oldest waiter, and receive a media room plus their own join token. From
//! then on their chat, typing, and screen-share signals are relayed to each
//! other and to nobody else until one of them leaves or disconnects.
//!
//! All state lives in one [`MatchState`] behind the [`Matchmaker`]'s lock,
//! which acts as the single sequencer for every mutation. The only step that
//! suspends is the call to the media collaborator during pairing.

pub mod error;
pub mod matchmaker;
pub mod protocol;
pub mod registry;

pub use error::MatchError;
pub use matchmaker::{
    MatchOutcome, MatchSettings, MatchStats, Matchmaker, PendingMatch, RouteOutcome,
};
pub use protocol::{ClientEvent, RelayEvent, ServerEvent};
pub use registry::{
    Connection, ConnectionRegistry, ConnectionStatus, MatchState, Outbox, Session,
    SessionRegistry, WaitingQueue,
};
