use serde::{Deserialize, Serialize};

/// Which media collaborator backs room allocation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum MediaProviderKind {
    /// REST SFU API.
    #[default]
    Http,
    /// In-process rooms and tokens, for local development.
    Loopback,
}

/// Media collaborator (SFU) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    pub provider: MediaProviderKind,
    /// Base URL of the SFU REST API.
    pub api_url: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    /// Prefix for generated room names.
    pub room_prefix: String,
    /// Room lifetime in seconds (valid range: 60-86400).
    pub room_ttl_secs: u32,
    /// Join-token lifetime in seconds (valid range: 60-86400).
    pub token_ttl_secs: u32,
    /// Per-request HTTP timeout in seconds (valid range: 1-120).
    pub request_timeout_secs: u32,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            provider: MediaProviderKind::Http,
            api_url: "https://api.daily.co/v1".into(),
            api_key_env: "DUET_MEDIA_API_KEY".into(),
            room_prefix: "duet".into(),
            room_ttl_secs: 3600,
            token_ttl_secs: 3600,
            request_timeout_secs: 10,
        }
    }
}
