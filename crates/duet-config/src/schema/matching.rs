use serde::{Deserialize, Serialize};

/// Pairing behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Upper bound on the media collaborator calls of one match attempt, in
    /// milliseconds (valid range: 100-120000). Expiry fails the match.
    pub media_timeout_ms: u64,
    /// Human-readable text of the `error` event sent when a match fails.
    pub match_failed_message: String,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            media_timeout_ms: 10_000,
            match_failed_message: "Could not connect you with a partner. Please try again.".into(),
        }
    }
}
