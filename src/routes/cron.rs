use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::post,
};
use chrono::Utc;
use serde_json::json;
use tracing::error;

/// Create the externally triggered reset routes. The cron auth middleware in
/// front of these verifies the shared secret.
pub fn create_cron_routes() -> Router<crate::server::Server> {
    Router::new()
        .route("/reset-daily", post(reset_daily))
        .route("/reset-weekly", post(reset_weekly))
}

/// Zero every user's daily counters. The trigger owns the schedule; this
/// handler resets unconditionally and reports how many rows it swept.
async fn reset_daily(State(server): State<crate::server::Server>) -> Response {
    match server.metering.reset_daily_usage().await {
        Ok(count) => reset_success(count, "daily"),
        Err(err) => reset_failure(err, "daily"),
    }
}

/// Zero every user's weekly counters. Same contract as the daily reset.
async fn reset_weekly(State(server): State<crate::server::Server>) -> Response {
    match server.metering.reset_weekly_usage().await {
        Ok(count) => reset_success(count, "weekly"),
        Err(err) => reset_failure(err, "weekly"),
    }
}

fn reset_success(count: u64, kind: &str) -> Response {
    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "count": count,
            "message": format!("{kind} counters reset for {count} users"),
            "timestamp": Utc::now(),
        })),
    )
        .into_response()
}

fn reset_failure(err: crate::error::AppError, kind: &str) -> Response {
    error!(%err, "{kind} counter reset failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "success": false,
            "error": err.to_string(),
            "timestamp": Utc::now(),
        })),
    )
        .into_response()
}
