//! HTTP route definitions

use std::time::Duration;

use axum::{
    extract::State,
    http::{header, HeaderValue, Method},
    response::Json,
    routing::get,
    Router,
};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    services::ServeDir,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::warn;

use crate::app::AppState;
use crate::util::time::uptime_secs;
use crate::ws::handler::ws_handler;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(state.config.client_origins.as_deref());

    let mut router = Router::new()
        .route("/health", get(health_handler))
        .route("/ws", get(ws_handler));
    if let Some(dir) = &state.config.static_dir {
        router = router.fallback_service(ServeDir::new(dir));
    }

    router
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
                .layer(CompressionLayer::new())
                .layer(cors),
        )
        .with_state(state)
}

/// Restrict to the configured origins, or allow any when none are set
fn cors_layer(origins: Option<&[String]>) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    let Some(origins) = origins else {
        return base.allow_origin(Any);
    };

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    base.allow_origin(allowed)
}

// ============================================================================
// Health endpoint
// ============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime_secs: u64,
    players: usize,
    connections: usize,
    score: [u32; 2],
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let (players, score) = {
        let session = state.session.lock();
        (session.player_count(), session.score())
    };

    Json(HealthResponse {
        status: "ok",
        uptime_secs: uptime_secs(),
        players,
        connections: state.hub.connected(),
        score,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;
    use crate::game::SessionState;
    use crate::ws::hub::Hub;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app_with(config: crate::config::Config) -> Router {
        let (hub, _receivers) = Hub::new();
        let session = SessionState::new(1).unwrap().shared();
        build_router(AppState::new(config, Arc::new(hub), session))
    }

    fn app() -> Router {
        app_with(test_config())
    }

    #[tokio::test]
    async fn test_health_reports_session() {
        let response = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["players"], 0);
        assert_eq!(json["score"], serde_json::json!([0, 0]));
    }

    #[tokio::test]
    async fn test_ws_route_requires_upgrade() {
        let response = app()
            .oneshot(Request::get("/ws").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn test_no_client_files_without_static_dir() {
        let response = app()
            .oneshot(Request::get("/index.html").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_static_dir_serves_client_files() {
        let dir = std::env::temp_dir().join(format!("soc-client-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("index.html"), "<canvas></canvas>").unwrap();

        let mut config = test_config();
        config.static_dir = Some(dir.clone());
        let response = app_with(config)
            .oneshot(Request::get("/index.html").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"<canvas></canvas>");
        std::fs::remove_dir_all(dir).ok();
    }
}
