//! HTTP endpoints
//!
//! Health, per-session stats, and the WebSocket upgrade route.

use axum::{
    extract::{Path, State},
    http::{HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::websocket::ws_handler;

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let cors_layer = build_cors_layer(
        &state.settings.server.cors_origins,
        state.settings.server.cors_enabled,
    );

    Router::new()
        .route("/health", get(health_check))
        .route("/api/stats/:session_id", get(session_stats))
        .route("/ws", get(ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(state)
}

/// Build CORS layer from configured origins
///
/// - If cors_enabled is false, returns a permissive layer (dev only)
/// - If cors_origins is empty or entirely invalid, defaults to
///   localhost:3000 for safety
fn build_cors_layer(origins: &[String], enabled: bool) -> CorsLayer {
    if !enabled {
        tracing::warn!("CORS is disabled - allowing all origins (NOT FOR PRODUCTION)");
        return CorsLayer::permissive();
    }

    let localhost = || {
        CorsLayer::new()
            .allow_origin(HeaderValue::from_static("http://localhost:3000"))
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
    };

    if origins.is_empty() {
        tracing::info!("No CORS origins configured, defaulting to localhost:3000");
        return localhost();
    }

    let parsed_origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                tracing::warn!("Invalid CORS origin: {}", origin);
                None
            })
        })
        .collect();

    if parsed_origins.is_empty() {
        tracing::error!("All configured CORS origins are invalid, falling back to localhost");
        return localhost();
    }

    tracing::info!("CORS configured with {} origins", parsed_origins.len());
    CorsLayer::new()
        .allow_origin(parsed_origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
        .allow_credentials(true)
}

/// Health check: reports dependency reachability alongside liveness
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let llm_available = state.llm.is_available().await;
    let documents = state.search.collection_size().await.ok();
    let sessions = state.store.active_session_count().await;

    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "llm": {
            "model": state.llm.model_name(),
            "available": llm_available,
        },
        "vector_search": {
            "collection": state.search.name(),
            "documents": documents,
        },
        "sessions": {
            "active": sessions,
            "backend": state.store.backend_name(),
        },
    }))
}

/// Per-session stats
async fn session_stats(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    let record = state
        .store
        .session_info(&session_id)
        .await
        .ok_or(StatusCode::NOT_FOUND)?;

    Ok(Json(serde_json::json!({
        "session_id": record.session_id,
        "created_at": record.created_at.to_rfc3339(),
        "last_activity": record.last_activity.to_rfc3339(),
        "turn_count": record.turn_count,
        "form_state": record.form_state.as_str(),
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cors_layer_with_invalid_origins_does_not_panic() {
        let _ = build_cors_layer(&["not a header value\u{7f}".to_string()], true);
        let _ = build_cors_layer(&[], true);
        let _ = build_cors_layer(&[], false);
    }
}
