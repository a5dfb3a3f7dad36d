//! HTTP media provider configuration.

use std::fmt;

use duet_config::MediaConfig;

use crate::MediaError;

/// HTTP media provider configuration.
#[derive(Clone)]
pub struct HttpMediaConfig {
    pub api_url: String,
    pub api_key: String,
    pub room_prefix: String,
    pub room_ttl_secs: u32,
    pub token_ttl_secs: u32,
    pub request_timeout_secs: u32,
}

impl fmt::Debug for HttpMediaConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpMediaConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &"[REDACTED]")
            .field("room_prefix", &self.room_prefix)
            .field("room_ttl_secs", &self.room_ttl_secs)
            .field("token_ttl_secs", &self.token_ttl_secs)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl HttpMediaConfig {
    pub fn new(api_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let defaults = MediaConfig::default();
        Self {
            api_url: api_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            room_prefix: defaults.room_prefix,
            room_ttl_secs: defaults.room_ttl_secs,
            token_ttl_secs: defaults.token_ttl_secs,
            request_timeout_secs: defaults.request_timeout_secs,
        }
    }

    /// Build from the `[media]` config section, reading the API key from
    /// the environment variable it names.
    pub fn from_media_config(config: &MediaConfig) -> Result<Self, MediaError> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                MediaError::NotConfigured(format!(
                    "set {} to the SFU API key",
                    config.api_key_env
                ))
            })?;

        Ok(Self {
            room_prefix: config.room_prefix.clone(),
            room_ttl_secs: config.room_ttl_secs,
            token_ttl_secs: config.token_ttl_secs,
            request_timeout_secs: config.request_timeout_secs,
            ..Self::new(config.api_url.clone(), api_key)
        })
    }

    pub fn with_room_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.room_prefix = prefix.into();
        self
    }
}
