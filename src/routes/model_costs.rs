use crate::{database::entities::ModelCost, error::AppError};
use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, put},
};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Create admin price table API routes
pub fn create_admin_cost_routes() -> Router<crate::server::Server> {
    Router::new()
        .route("/admin/costs", get(get_all_model_costs))
        .route("/admin/costs/{model_id}", get(get_model_cost))
        .route("/admin/costs/{model_id}", put(upsert_model_cost))
        .route("/admin/costs/{model_id}", delete(delete_model_cost))
}

/// Request body for price table updates
#[derive(Debug, Serialize, Deserialize)]
pub struct ModelCostRequest {
    /// Cost per 1000 prompt tokens in USD
    pub input_cost_per_1k_tokens: f64,
    /// Cost per 1000 completion tokens in USD
    pub output_cost_per_1k_tokens: f64,
}

/// Get all model costs (admin only)
async fn get_all_model_costs(
    State(server): State<crate::server::Server>,
) -> Result<Json<Vec<ModelCost>>, AppError> {
    // Admin permissions already checked by middleware
    let costs = server.database.model_costs().get_all().await?;
    Ok(Json(costs))
}

/// Get a specific model's rates (admin only)
async fn get_model_cost(
    State(server): State<crate::server::Server>,
    Path(model_id): Path<String>,
) -> Result<Json<ModelCost>, AppError> {
    let cost = server
        .database
        .model_costs()
        .find_by_model(&model_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("no pricing for model {model_id}")))?;

    Ok(Json(cost))
}

/// Upsert a model's rates (admin only)
async fn upsert_model_cost(
    State(server): State<crate::server::Server>,
    Path(model_id): Path<String>,
    Json(request): Json<ModelCostRequest>,
) -> Result<StatusCode, AppError> {
    if request.input_cost_per_1k_tokens < 0.0 || request.output_cost_per_1k_tokens < 0.0 {
        return Err(AppError::InvalidEntry(
            "model costs must be non-negative".to_string(),
        ));
    }

    let cost = ModelCost {
        id: 0, // Will be set by database
        model_id,
        input_cost_per_1k_tokens: Decimal::from_f64_retain(request.input_cost_per_1k_tokens)
            .unwrap_or_default(),
        output_cost_per_1k_tokens: Decimal::from_f64_retain(request.output_cost_per_1k_tokens)
            .unwrap_or_default(),
        updated_at: Utc::now(),
    };

    server.database.model_costs().upsert(&cost).await?;
    Ok(StatusCode::OK)
}

/// Delete a model's rates (admin only)
async fn delete_model_cost(
    State(server): State<crate::server::Server>,
    Path(model_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let deleted = server
        .database
        .model_costs()
        .delete_by_model(&model_id)
        .await?;

    if !deleted {
        return Err(AppError::NotFound(format!("no pricing for model {model_id}")));
    }

    Ok(StatusCode::NO_CONTENT)
}
