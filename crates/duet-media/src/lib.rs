//! Media collaborator client for duet.
//!
//! The signaling core never touches audio or video. It needs exactly two
//! things from the SFU that carries the media: a room for a freshly matched
//! pair, and one join credential per member. This crate defines that
//! contract and ships two implementations:
//! - `HttpMediaProvider`, a REST client for a hosted SFU
//! - `LoopbackMediaProvider`, in-process rooms for local runs and tests

pub mod http;
pub mod loopback;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

pub use duet_common::MediaError;
pub use duet_common::SessionId as RoomId;
pub use http::{HttpMediaConfig, HttpMediaProvider};
pub use loopback::LoopbackMediaProvider;

use duet_config::{MediaConfig, MediaProviderKind};

#[async_trait]
pub trait MediaProvider: Send + Sync {
    /// Create a room for one pair.
    ///
    /// Create-or-fetch: if the collaborator reports that the room already
    /// exists, the existing room is returned as success.
    async fn allocate_room(&self) -> Result<RoomId, MediaError>;

    /// Issue a join credential for `room`.
    async fn issue_credential(&self, room: &RoomId) -> Result<Credential, MediaError>;
}

/// Opaque join token for one member of a room.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_token(self) -> String {
        self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential([REDACTED])")
    }
}

/// Build the provider selected by `config`.
pub fn provider_from_config(config: &MediaConfig) -> Result<Arc<dyn MediaProvider>, MediaError> {
    match config.provider {
        MediaProviderKind::Http => {
            let http_config = HttpMediaConfig::from_media_config(config)?;
            Ok(Arc::new(HttpMediaProvider::new(http_config)?))
        }
        MediaProviderKind::Loopback => {
            Ok(Arc::new(LoopbackMediaProvider::new(config.room_prefix.clone())))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_debug_is_redacted() {
        let cred = Credential::new("secret-token");
        assert_eq!(format!("{cred:?}"), "Credential([REDACTED])");
        assert_eq!(cred.as_str(), "secret-token");
    }

    #[test]
    fn loopback_from_config() {
        let config = MediaConfig {
            provider: MediaProviderKind::Loopback,
            ..MediaConfig::default()
        };
        assert!(provider_from_config(&config).is_ok());
    }

    #[test]
    fn http_from_config_requires_api_key() {
        let config = MediaConfig {
            provider: MediaProviderKind::Http,
            api_key_env: "DUET_TEST_KEY_THAT_IS_NEVER_SET".into(),
            ..MediaConfig::default()
        };
        let err = provider_from_config(&config).err().unwrap();
        assert!(matches!(err, MediaError::NotConfigured(_)));
    }
}
