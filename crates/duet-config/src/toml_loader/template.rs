//! Default TOML config template with inline documentation comments.

/// Generate the default TOML config content with comments.
pub(crate) fn default_config_toml() -> String {
    r##"# duet signaling server configuration
# Schema version 1
# Only override what you want to change -- missing fields use defaults.

[server]
# bind = "0.0.0.0"
# port = 8080                    # WebSocket signaling
# health_port = 8081             # GET /health
# max_message_bytes = 65536      # 1024-1048576
# handshake_timeout_secs = 10    # 1-120

[matching]
# media_timeout_ms = 10000       # 100-120000, expiry fails the match
# match_failed_message = "Could not connect you with a partner. Please try again."

[media]
# provider = "http"              # "http" or "loopback"
# api_url = "https://api.daily.co/v1"
# api_key_env = "DUET_MEDIA_API_KEY"
# room_prefix = "duet"
# room_ttl_secs = 3600           # 60-86400
# token_ttl_secs = 3600          # 60-86400
# request_timeout_secs = 10      # 1-120

[logging]
# level = "INFO"                 # DEBUG, INFO, WARNING, ERROR
"##
    .to_string()
}
