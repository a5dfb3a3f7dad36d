//! HTTP liveness endpoint.
//!
//! `GET /health` reports that the process is up along with the current
//! connection, queue, and session counts.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use duet_match::{MatchStats, Matchmaker};

#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    /// RFC 3339, UTC.
    pub time: String,
    #[serde(flatten)]
    pub stats: MatchStats,
}

impl HealthReport {
    pub async fn snapshot(matchmaker: &Matchmaker) -> Self {
        Self {
            status: "ok",
            time: chrono::Utc::now().to_rfc3339(),
            stats: matchmaker.stats().await,
        }
    }
}

pub fn router(matchmaker: Matchmaker) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .with_state(matchmaker)
}

async fn health_check(State(matchmaker): State<Matchmaker>) -> Json<HealthReport> {
    Json(HealthReport::snapshot(&matchmaker).await)
}
