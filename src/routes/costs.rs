use crate::{
    auth::UserExtractor,
    database::{CostAggregates, UserCostBreakdown},
    error::AppError,
};
use axum::{
    Router,
    extract::{Query, State},
    response::{IntoResponse, Json, Response},
    routing::get,
};
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Create cost reporting API routes for authenticated users
pub fn create_cost_routes() -> Router<crate::server::Server> {
    Router::new().route("/costs", get(get_costs))
}

/// Query parameters for the cost report
#[derive(Debug, Deserialize)]
pub struct CostsQuery {
    /// Reporting window ending now, in days
    pub period_days: Option<u32>,
    /// Switch to the all-users report; requires admin
    pub admin: Option<bool>,
}

/// Cost report for a single user
#[derive(Debug, Serialize)]
pub struct UserCostsResponse {
    pub user_id: String,
    pub period_days: u32,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub total_cost: Decimal,
    pub total_tokens: u64,
    pub by_model: BTreeMap<String, Decimal>,
    pub by_feature: BTreeMap<String, Decimal>,
    pub entry_count: u64,
}

/// System-wide cost report with per-user breakdown
#[derive(Debug, Serialize)]
pub struct SystemCostsResponse {
    pub period_days: u32,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub total_cost: Decimal,
    pub total_tokens: u64,
    pub by_model: BTreeMap<String, Decimal>,
    pub by_feature: BTreeMap<String, Decimal>,
    pub entry_count: u64,
    pub per_user: Vec<UserCostBreakdown>,
}

const DEFAULT_PERIOD_DAYS: u32 = 30;
const MAX_PERIOD_DAYS: u32 = 365;

/// Get cost totals for the reporting window. `admin=true` switches to the
/// all-users variant, gated by the configured admin predicate.
async fn get_costs(
    State(server): State<crate::server::Server>,
    UserExtractor(user): UserExtractor,
    Query(params): Query<CostsQuery>,
) -> Result<Response, AppError> {
    let period_days = params
        .period_days
        .unwrap_or(DEFAULT_PERIOD_DAYS)
        .clamp(1, MAX_PERIOD_DAYS);
    let end_date = Utc::now();
    let start_date = end_date - Duration::days(period_days as i64);

    if params.admin.unwrap_or(false) {
        if !server.config.is_admin(&user.user_id) {
            return Err(AppError::Forbidden("Admin access required".to_string()));
        }

        let (totals, per_user) = server
            .cost_service
            .all_users_costs(start_date, end_date)
            .await?;

        return Ok(Json(system_response(period_days, start_date, end_date, totals, per_user))
            .into_response());
    }

    let aggregates = server
        .cost_service
        .user_costs(&user.user_id, start_date, end_date)
        .await?;

    Ok(Json(UserCostsResponse {
        user_id: user.user_id,
        period_days,
        start_date,
        end_date,
        total_cost: aggregates.total_cost,
        total_tokens: aggregates.total_tokens,
        by_model: aggregates.by_model,
        by_feature: aggregates.by_feature,
        entry_count: aggregates.entry_count,
    })
    .into_response())
}

fn system_response(
    period_days: u32,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
    totals: CostAggregates,
    per_user: Vec<UserCostBreakdown>,
) -> SystemCostsResponse {
    SystemCostsResponse {
        period_days,
        start_date,
        end_date,
        total_cost: totals.total_cost,
        total_tokens: totals.total_tokens,
        by_model: totals.by_model,
        by_feature: totals.by_feature,
        entry_count: totals.entry_count,
        per_user,
    }
}
