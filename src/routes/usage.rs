use crate::{auth::UserExtractor, database::entities::Plan, error::AppError};
use axum::{Router, extract::State, response::Json, routing::get};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

/// Create usage API routes for authenticated users
pub fn create_usage_routes() -> Router<crate::server::Server> {
    Router::new().route("/usage", get(get_usage))
}

/// Current-moment usage snapshot for one user
#[derive(Debug, Serialize)]
pub struct UsageResponse {
    pub user_id: String,
    pub plan: Plan,
    pub plan_expires_at: Option<DateTime<Utc>>,
    pub chat_used_today: i32,
    pub videos_generated_this_week: i32,
    pub voice_minutes_this_week: Decimal,
    pub images_generated_this_week: i32,
    pub email_verified: bool,
}

/// Get the authenticated user's usage snapshot
async fn get_usage(
    State(server): State<crate::server::Server>,
    UserExtractor(user): UserExtractor,
) -> Result<Json<UsageResponse>, AppError> {
    let record = server.metering.usage_snapshot(&user.user_id).await?;

    Ok(Json(UsageResponse {
        user_id: record.user_id,
        plan: record.plan,
        plan_expires_at: record.plan_expires_at,
        chat_used_today: record.chat_used_today,
        videos_generated_this_week: record.videos_generated_this_week,
        voice_minutes_this_week: record.voice_minutes_this_week,
        images_generated_this_week: record.images_generated_this_week,
        email_verified: user.email_verified,
    }))
}
