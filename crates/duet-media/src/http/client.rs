//! HTTP media provider struct, request building, and response parsing.

use reqwest::StatusCode;
use serde_json::Value;

use crate::{MediaError, RoomId};

use super::config::HttpMediaConfig;

/// Longest slice of an error body carried into a `MediaError`.
const ERROR_BODY_LIMIT: usize = 200;

/// REST-backed media provider.
pub struct HttpMediaProvider {
    pub(crate) config: HttpMediaConfig,
    pub(crate) http: reqwest::Client,
}

impl HttpMediaProvider {
    pub fn new(config: HttpMediaConfig) -> Result<Self, MediaError> {
        let http = reqwest::Client::builder()
            .connect_timeout(std::time::Duration::from_secs(5))
            .timeout(std::time::Duration::from_secs(
                config.request_timeout_secs.into(),
            ))
            .build()
            .map_err(|e| MediaError::NotConfigured(format!("HTTP client: {e}")))?;
        Ok(Self { config, http })
    }

    pub(crate) fn rooms_url(&self) -> String {
        format!("{}/rooms", self.config.api_url)
    }

    pub(crate) fn room_url(&self, name: &str) -> String {
        format!("{}/rooms/{name}", self.config.api_url)
    }

    pub(crate) fn tokens_url(&self) -> String {
        format!("{}/meeting-tokens", self.config.api_url)
    }

    pub(crate) fn bearer(&self) -> String {
        format!("Bearer {}", self.config.api_key)
    }

    /// A fresh, collision-resistant room name.
    pub(crate) fn next_room_name(&self) -> String {
        format!("{}-{}", self.config.room_prefix, uuid::Uuid::new_v4().simple())
    }

    /// Build the JSON body for `POST /rooms`.
    pub(crate) fn build_room_body(&self, name: &str) -> Value {
        serde_json::json!({
            "name": name,
            "privacy": "private",
            "properties": {
                "exp": expiry(self.config.room_ttl_secs),
                "max_participants": 2,
            },
        })
    }

    /// Build the JSON body for `POST /meeting-tokens`.
    pub(crate) fn build_token_body(&self, room: &RoomId) -> Value {
        serde_json::json!({
            "properties": {
                "room_name": room.as_str(),
                "exp": expiry(self.config.token_ttl_secs),
                "is_owner": false,
            },
        })
    }
}

/// Unix timestamp `ttl_secs` from now.
fn expiry(ttl_secs: u32) -> i64 {
    chrono::Utc::now().timestamp() + i64::from(ttl_secs)
}

/// Whether an error response means "that room already exists".
///
/// Some collaborators answer with 409, others with a 400 whose message
/// says so; both count.
pub(crate) fn is_room_conflict(status: StatusCode, body: &str) -> bool {
    if status == StatusCode::CONFLICT {
        return true;
    }
    if !status.is_client_error() {
        return false;
    }
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|json| {
            json["info"]
                .as_str()
                .or_else(|| json["error"].as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.to_string());
    message.to_lowercase().contains("already exists")
}

/// Extract the room name from a room object.
pub(crate) fn parse_room(json: &Value) -> Option<RoomId> {
    json["name"].as_str().filter(|s| !s.is_empty()).map(RoomId::new)
}

/// Extract the token from a meeting-token response.
pub(crate) fn parse_token(json: &Value) -> Option<String> {
    json["token"]
        .as_str()
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

pub(crate) fn truncate_body(text: &str) -> String {
    text.chars().take(ERROR_BODY_LIMIT).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> HttpMediaProvider {
        HttpMediaProvider::new(
            HttpMediaConfig::new("https://sfu.example/v1", "key").with_room_prefix("duet"),
        )
        .unwrap()
    }

    #[test]
    fn urls_are_built_from_base() {
        let p = provider();
        assert_eq!(p.rooms_url(), "https://sfu.example/v1/rooms");
        assert_eq!(p.room_url("duet-1"), "https://sfu.example/v1/rooms/duet-1");
        assert_eq!(p.tokens_url(), "https://sfu.example/v1/meeting-tokens");
        assert_eq!(p.bearer(), "Bearer key");
    }

    #[test]
    fn room_names_are_prefixed_and_unique() {
        let p = provider();
        let a = p.next_room_name();
        let b = p.next_room_name();
        assert!(a.starts_with("duet-"));
        assert_ne!(a, b);
    }

    #[test]
    fn room_body_limits_participants() {
        let p = provider();
        let body = p.build_room_body("duet-abc");
        assert_eq!(body["name"], "duet-abc");
        assert_eq!(body["privacy"], "private");
        assert_eq!(body["properties"]["max_participants"], 2);
        assert!(body["properties"]["exp"].as_i64().unwrap() > chrono::Utc::now().timestamp());
    }

    #[test]
    fn token_body_names_room() {
        let p = provider();
        let body = p.build_token_body(&RoomId::new("duet-abc"));
        assert_eq!(body["properties"]["room_name"], "duet-abc");
        assert_eq!(body["properties"]["is_owner"], false);
    }

    #[test]
    fn conflict_status_is_conflict() {
        assert!(is_room_conflict(StatusCode::CONFLICT, ""));
    }

    #[test]
    fn already_exists_message_is_conflict() {
        let body = r#"{"error":"invalid-request-error","info":"a room named duet-1 already exists"}"#;
        assert!(is_room_conflict(StatusCode::BAD_REQUEST, body));
        assert!(is_room_conflict(StatusCode::BAD_REQUEST, "Room Already Exists"));
    }

    #[test]
    fn other_errors_are_not_conflicts() {
        let body = r#"{"error":"authentication-error","info":"bad key"}"#;
        assert!(!is_room_conflict(StatusCode::UNAUTHORIZED, body));
        assert!(!is_room_conflict(
            StatusCode::INTERNAL_SERVER_ERROR,
            "already exists"
        ));
    }

    #[test]
    fn parse_room_and_token() {
        let room = serde_json::json!({"name": "duet-1", "url": "https://x/duet-1"});
        assert_eq!(parse_room(&room), Some(RoomId::new("duet-1")));
        assert_eq!(parse_room(&serde_json::json!({})), None);

        let token = serde_json::json!({"token": "eyJ..."});
        assert_eq!(parse_token(&token).as_deref(), Some("eyJ..."));
        assert_eq!(parse_token(&serde_json::json!({"token": ""})), None);
    }

    #[test]
    fn truncate_body_caps_length() {
        let long = "x".repeat(1000);
        assert_eq!(truncate_body(&long).len(), ERROR_BODY_LIMIT);
    }
}
