//! # helm-proxy
//!
//! Axum server adapting the upstream agent API to the shape the
//! console's chat stream reader expects.
//!
//! Routes:
//! - `POST /api/chat`: forward the last user message to the agent's
//!   `run_sse` endpoint and re-frame the reply as `0:"…"` lines
//! - `GET /api/chat/sessions/{session_id}`: chat history passthrough
//! - `GET /health`: liveness + uptime
//!
//! The proxy never relays a raw upstream failure to the browser: an
//! unreachable or misbehaving agent degrades to a canned, well-formed
//! reply so the chat UI always receives a stream it can render.

#![deny(unsafe_code)]

pub mod chat;
pub mod error;
pub mod health;

use std::time::Instant;

use axum::Router;
use axum::extract::State;
use axum::response::Json;
use axum::routing::{get, post};
use helm_settings::AgentSettings;
use tower_http::cors::CorsLayer;

/// Shared state accessible from Axum handlers.
#[derive(Clone)]
pub struct AppState {
    /// Upstream agent endpoints and identifiers.
    pub agent: AgentSettings,
    /// Shared HTTP client for upstream calls.
    pub http: reqwest::Client,
    /// When the server started.
    pub start_time: Instant,
}

/// The chat proxy server.
pub struct ProxyServer {
    state: AppState,
}

impl ProxyServer {
    /// Create a server forwarding to the given agent API.
    #[must_use]
    pub fn new(agent: AgentSettings) -> Self {
        Self {
            state: AppState {
                agent,
                http: reqwest::Client::new(),
                start_time: Instant::now(),
            },
        }
    }

    /// Build the Axum router with all routes.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/api/chat", post(chat::chat_handler))
            .route(
                "/api/chat/sessions/{session_id}",
                get(chat::session_history_handler),
            )
            .route("/health", get(health_handler))
            .layer(CorsLayer::permissive())
            .with_state(self.state.clone())
    }
}

/// GET /health
async fn health_handler(State(state): State<AppState>) -> Json<health::HealthResponse> {
    Json(health::health_check(state.start_time))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn make_server() -> ProxyServer {
        ProxyServer::new(AgentSettings::default())
    }

    #[tokio::test]
    async fn health_endpoint_returns_ok() {
        let app = make_server().router();
        let resp = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = resp.into_body().collect().await.unwrap().to_bytes();
        let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(parsed["status"], "ok");
        assert!(parsed["uptime_secs"].is_number());
    }

    #[tokio::test]
    async fn unknown_route_returns_404() {
        let app = make_server().router();
        let resp = app
            .oneshot(
                Request::builder()
                    .uri("/nope")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
