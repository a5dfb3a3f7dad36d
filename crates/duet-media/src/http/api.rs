//! MediaProvider trait implementation for HttpMediaProvider.

use async_trait::async_trait;
use tracing::{debug, info};

use crate::{Credential, MediaError, MediaProvider, RoomId};

use super::client::{is_room_conflict, parse_room, parse_token, truncate_body, HttpMediaProvider};

impl HttpMediaProvider {
    /// Look up an existing room by name.
    async fn fetch_room(&self, name: &str) -> Result<RoomId, MediaError> {
        let response = self
            .http
            .get(self.room_url(name))
            .header("Authorization", self.bearer())
            .send()
            .await
            .map_err(|e| MediaError::Allocation(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(MediaError::Allocation(format!(
                "HTTP {status}: {}",
                truncate_body(&text)
            )));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| MediaError::Allocation(e.to_string()))?;

        parse_room(&json)
            .ok_or_else(|| MediaError::Allocation("room response without a name".into()))
    }
}

#[async_trait]
impl MediaProvider for HttpMediaProvider {
    async fn allocate_room(&self) -> Result<RoomId, MediaError> {
        let name = self.next_room_name();
        debug!(room = %name, "SFU room create request");

        let response = self
            .http
            .post(self.rooms_url())
            .header("Authorization", self.bearer())
            .json(&self.build_room_body(&name))
            .send()
            .await
            .map_err(|e| MediaError::Allocation(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            if is_room_conflict(status, &text) {
                info!(room = %name, "SFU room already exists, reusing it");
                return self.fetch_room(&name).await;
            }
            return Err(MediaError::Allocation(format!(
                "HTTP {status}: {}",
                truncate_body(&text)
            )));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| MediaError::Allocation(e.to_string()))?;

        parse_room(&json)
            .ok_or_else(|| MediaError::Allocation("room response without a name".into()))
    }

    async fn issue_credential(&self, room: &RoomId) -> Result<Credential, MediaError> {
        debug!(room = %room, "SFU token request");

        let response = self
            .http
            .post(self.tokens_url())
            .header("Authorization", self.bearer())
            .json(&self.build_token_body(room))
            .send()
            .await
            .map_err(|e| MediaError::Credential(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(MediaError::Credential(format!(
                "HTTP {status}: {}",
                truncate_body(&text)
            )));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| MediaError::Credential(e.to_string()))?;

        parse_token(&json)
            .map(Credential::new)
            .ok_or_else(|| MediaError::Credential("token response without a token".into()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::{Path, State};
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::Value;
    use tokio::net::TcpListener;

    use super::*;
    use crate::HttpMediaConfig;

    /// Canned SFU. `{name}` in a body is replaced by the room name the
    /// request carried.
    #[derive(Clone)]
    struct StubSfu {
        create: (StatusCode, String),
        fetch: (StatusCode, String),
        token: (StatusCode, String),
        calls: Arc<Mutex<Vec<String>>>,
    }

    impl StubSfu {
        fn new() -> Self {
            Self {
                create: (StatusCode::OK, r#"{"name":"{name}"}"#.into()),
                fetch: (StatusCode::OK, r#"{"name":"{name}"}"#.into()),
                token: (StatusCode::OK, r#"{"token":"tok-123"}"#.into()),
                calls: Arc::default(),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn reply(
            &self,
            headers: &HeaderMap,
            call: String,
            canned: &(StatusCode, String),
            name: &str,
        ) -> (StatusCode, String) {
            self.calls.lock().unwrap().push(call);
            if headers.get("authorization").and_then(|v| v.to_str().ok()) != Some("Bearer test-key")
            {
                return (StatusCode::UNAUTHORIZED, "bad key".into());
            }
            (canned.0, canned.1.replace("{name}", name))
        }
    }

    async fn create_room(
        State(sfu): State<StubSfu>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> (StatusCode, String) {
        let name = body["name"].as_str().unwrap_or_default().to_string();
        sfu.reply(&headers, format!("POST /rooms {name}"), &sfu.create, &name)
    }

    async fn fetch_room(
        State(sfu): State<StubSfu>,
        headers: HeaderMap,
        Path(name): Path<String>,
    ) -> (StatusCode, String) {
        sfu.reply(&headers, format!("GET /rooms/{name}"), &sfu.fetch, &name)
    }

    async fn meeting_token(
        State(sfu): State<StubSfu>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> (StatusCode, String) {
        let room = body["properties"]["room_name"]
            .as_str()
            .unwrap_or_default()
            .to_string();
        sfu.reply(&headers, format!("POST /meeting-tokens {room}"), &sfu.token, &room)
    }

    async fn serve(sfu: StubSfu) -> HttpMediaProvider {
        let router = Router::new()
            .route("/v1/rooms", post(create_room))
            .route("/v1/rooms/:name", get(fetch_room))
            .route("/v1/meeting-tokens", post(meeting_token))
            .with_state(sfu);
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        let config = HttpMediaConfig::new(format!("http://{addr}/v1/"), "test-key")
            .with_room_prefix("duet");
        HttpMediaProvider::new(config).unwrap()
    }

    #[tokio::test]
    async fn creates_room() {
        let sfu = StubSfu::new();
        let provider = serve(sfu.clone()).await;

        let room = provider.allocate_room().await.unwrap();
        assert!(room.as_str().starts_with("duet-"));
        assert_eq!(sfu.calls(), vec![format!("POST /rooms {room}")]);
    }

    #[tokio::test]
    async fn conflict_status_fetches_existing_room() {
        let mut sfu = StubSfu::new();
        sfu.create = (StatusCode::CONFLICT, String::new());
        let provider = serve(sfu.clone()).await;

        let room = provider.allocate_room().await.unwrap();
        assert_eq!(
            sfu.calls(),
            vec![format!("POST /rooms {room}"), format!("GET /rooms/{room}")]
        );
    }

    #[tokio::test]
    async fn already_exists_message_fetches_existing_room() {
        let mut sfu = StubSfu::new();
        sfu.create = (
            StatusCode::BAD_REQUEST,
            r#"{"error":"invalid-request-error","info":"a room named {name} already exists"}"#
                .into(),
        );
        let provider = serve(sfu.clone()).await;

        let room = provider.allocate_room().await.unwrap();
        assert!(room.as_str().starts_with("duet-"));
        assert_eq!(sfu.calls().len(), 2);
    }

    #[tokio::test]
    async fn failed_fetch_after_conflict_is_allocation_error() {
        let mut sfu = StubSfu::new();
        sfu.create = (StatusCode::CONFLICT, String::new());
        sfu.fetch = (StatusCode::NOT_FOUND, r#"{"error":"not-found"}"#.into());
        let provider = serve(sfu).await;

        match provider.allocate_room().await {
            Err(MediaError::Allocation(msg)) => assert!(msg.contains("404"), "{msg}"),
            other => panic!("expected allocation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn server_error_is_allocation_error_with_truncated_body() {
        let mut sfu = StubSfu::new();
        sfu.create = (StatusCode::INTERNAL_SERVER_ERROR, "x".repeat(500));
        let provider = serve(sfu.clone()).await;

        match provider.allocate_room().await {
            Err(MediaError::Allocation(msg)) => {
                assert!(msg.starts_with("HTTP 500"), "{msg}");
                assert!(msg.contains(&"x".repeat(200)));
                assert!(!msg.contains(&"x".repeat(201)));
            }
            other => panic!("expected allocation error, got {other:?}"),
        }
        // Not a conflict, so no lookup follows.
        assert_eq!(sfu.calls().len(), 1);
    }

    #[tokio::test]
    async fn issues_credential_for_room() {
        let sfu = StubSfu::new();
        let provider = serve(sfu.clone()).await;

        let room = RoomId::new("duet-abc");
        let credential = provider.issue_credential(&room).await.unwrap();
        assert_eq!(credential.as_str(), "tok-123");
        assert_eq!(sfu.calls(), vec!["POST /meeting-tokens duet-abc".to_string()]);
    }

    #[tokio::test]
    async fn rejected_token_is_credential_error() {
        let mut sfu = StubSfu::new();
        sfu.token = (StatusCode::FORBIDDEN, "room is locked".into());
        let provider = serve(sfu).await;

        match provider.issue_credential(&RoomId::new("duet-abc")).await {
            Err(MediaError::Credential(msg)) => {
                assert!(msg.contains("403"), "{msg}");
                assert!(msg.contains("room is locked"), "{msg}");
            }
            other => panic!("expected credential error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn token_response_without_token_is_credential_error() {
        let mut sfu = StubSfu::new();
        sfu.token = (StatusCode::OK, r#"{"token":""}"#.into());
        let provider = serve(sfu).await;

        assert!(matches!(
            provider.issue_credential(&RoomId::new("duet-abc")).await,
            Err(MediaError::Credential(_))
        ));
    }
}
