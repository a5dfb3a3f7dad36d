//! Validation for the server, matching, and media sections.

use crate::schema::{DuetConfig, MediaProviderKind};

use super::helpers::{validate_non_empty, validate_range};

/// Validate listener constraints.
pub(crate) fn validate_server(errors: &mut Vec<String>, config: &DuetConfig) {
    let server = &config.server;
    validate_non_empty(errors, "server.bind", &server.bind);
    validate_range(errors, "server.port", server.port.into(), 1, 65535);
    validate_range(errors, "server.health_port", server.health_port.into(), 1, 65535);
    if server.port == server.health_port {
        errors.push(format!(
            "server.health_port = {} must differ from server.port",
            server.health_port
        ));
    }
    validate_range(
        errors,
        "server.max_message_bytes",
        server.max_message_bytes.into(),
        1024,
        1024 * 1024,
    );
    validate_range(
        errors,
        "server.handshake_timeout_secs",
        server.handshake_timeout_secs.into(),
        1,
        120,
    );
}

/// Validate pairing constraints.
pub(crate) fn validate_matching(errors: &mut Vec<String>, config: &DuetConfig) {
    validate_range(
        errors,
        "matching.media_timeout_ms",
        config.matching.media_timeout_ms,
        100,
        120_000,
    );
    validate_non_empty(
        errors,
        "matching.match_failed_message",
        &config.matching.match_failed_message,
    );
}

/// Validate media collaborator constraints.
pub(crate) fn validate_media(errors: &mut Vec<String>, config: &DuetConfig) {
    let media = &config.media;
    if media.provider == MediaProviderKind::Http {
        if !media.api_url.starts_with("http://") && !media.api_url.starts_with("https://") {
            errors.push(format!(
                "media.api_url = {:?} must be an http(s) URL",
                media.api_url
            ));
        }
        validate_non_empty(errors, "media.api_key_env", &media.api_key_env);
    }
    validate_non_empty(errors, "media.room_prefix", &media.room_prefix);
    validate_range(errors, "media.room_ttl_secs", media.room_ttl_secs.into(), 60, 86_400);
    validate_range(errors, "media.token_ttl_secs", media.token_ttl_secs.into(), 60, 86_400);
    validate_range(
        errors,
        "media.request_timeout_secs",
        media.request_timeout_secs.into(),
        1,
        120,
    );
}
