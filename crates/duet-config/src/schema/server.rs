use serde::{Deserialize, Serialize};

/// Listener settings for the signaling socket and the liveness endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address both listeners bind to.
    pub bind: String,
    /// WebSocket port (valid range: 1-65535).
    pub port: u16,
    /// HTTP liveness port; must differ from `port`.
    pub health_port: u16,
    /// Largest accepted WebSocket message in bytes (valid range: 1024-1048576).
    pub max_message_bytes: u32,
    /// Seconds allowed for the WebSocket handshake (valid range: 1-120).
    pub handshake_timeout_secs: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".into(),
            port: 8080,
            health_port: 8081,
            max_message_bytes: 64 * 1024,
            handshake_timeout_secs: 10,
        }
    }
}

impl ServerConfig {
    pub fn ws_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }

    pub fn health_addr(&self) -> String {
        format!("{}:{}", self.bind, self.health_port)
    }
}
