//! Client-facing wire protocol.
//!
//! Every frame is a JSON text message `{"event": <name>, "data": <payload>}`.
//! Events without a payload omit `data`.

use serde::{Deserialize, Serialize};

use duet_common::SessionId;

/// Messages a client sends to the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ClientEvent {
    #[serde(rename = "requestMatch")]
    RequestMatch,

    #[serde(rename = "cancelMatch")]
    CancelMatch,

    #[serde(rename = "leaveSession")]
    LeaveSession,

    #[serde(rename = "chat-message")]
    ChatMessage { text: String },

    #[serde(rename = "typing")]
    Typing(bool),

    #[serde(rename = "screen-share-started")]
    ScreenShareStarted,

    #[serde(rename = "screen-share-stopped")]
    ScreenShareStopped,
}

impl ClientEvent {
    pub fn decode(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// The peer-scoped part of this event, if it is one that gets relayed.
    pub fn into_relay(self) -> Option<RelayEvent> {
        match self {
            ClientEvent::ChatMessage { text } => Some(RelayEvent::ChatMessage { text }),
            ClientEvent::Typing(typing) => Some(RelayEvent::Typing(typing)),
            ClientEvent::ScreenShareStarted => Some(RelayEvent::ScreenShareStarted),
            ClientEvent::ScreenShareStopped => Some(RelayEvent::ScreenShareStopped),
            ClientEvent::RequestMatch | ClientEvent::CancelMatch | ClientEvent::LeaveSession => {
                None
            }
        }
    }
}

/// The application-level events relayed between the two members of a
/// session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayEvent {
    ChatMessage { text: String },
    Typing(bool),
    ScreenShareStarted,
    ScreenShareStopped,
}

impl RelayEvent {
    /// What the receiving member sees. Payloads pass through untouched.
    pub fn into_peer_event(self) -> ServerEvent {
        match self {
            RelayEvent::ChatMessage { text } => ServerEvent::ChatMessage { text },
            RelayEvent::Typing(typing) => ServerEvent::Typing(typing),
            RelayEvent::ScreenShareStarted => ServerEvent::PeerScreenShareStarted,
            RelayEvent::ScreenShareStopped => ServerEvent::PeerScreenShareStopped,
        }
    }
}

/// Messages the server sends to a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    #[serde(rename = "waiting")]
    Waiting,

    #[serde(rename = "matched")]
    Matched {
        token: String,
        #[serde(rename = "sessionId")]
        session_id: SessionId,
    },

    #[serde(rename = "error")]
    Error { message: String },

    #[serde(rename = "peerLeft")]
    PeerLeft,

    #[serde(rename = "chat-message")]
    ChatMessage { text: String },

    #[serde(rename = "typing")]
    Typing(bool),

    #[serde(rename = "peer-screen-share-started")]
    PeerScreenShareStarted,

    #[serde(rename = "peer-screen-share-stopped")]
    PeerScreenShareStopped,
}

impl ServerEvent {
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
