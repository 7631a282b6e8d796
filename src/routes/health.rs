use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
};
use chrono::Utc;
use serde_json::json;

/// Create health check routes
pub fn create_health_routes() -> Router<crate::server::Server> {
    Router::new()
        .route("/", get(health))
        .route("/ready", get(ready))
}

/// Liveness: the process is up and serving.
async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": Utc::now(),
    }))
}

/// Readiness: the backing store answers a ping.
async fn ready(State(server): State<crate::server::Server>) -> Response {
    match server.database.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ready",
                "timestamp": Utc::now(),
            })),
        )
            .into_response(),
        Err(err) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "unavailable",
                "error": err.to_string(),
                "timestamp": Utc::now(),
            })),
        )
            .into_response(),
    }
}
