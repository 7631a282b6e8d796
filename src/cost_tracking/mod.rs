//! Cost ledger: validation, per-model pricing, and read-side reports.

pub mod pricing;

use crate::database::{
    CostAggregates, CostQuery, DatabaseManager, UserCostBreakdown,
    entities::{CostEntry, Feature},
};
use crate::error::AppError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{error, info, warn};

/// A cost record as produced by an LLM call site, before pricing.
#[derive(Debug, Clone)]
pub struct NewCostEntry {
    pub user_id: String,
    pub model: String,
    pub prompt_tokens: i32,
    pub completion_tokens: i32,
    pub total_tokens: i32,
    pub feature: Feature,
}

pub struct CostTrackingService {
    database: Arc<dyn DatabaseManager>,
}

impl CostTrackingService {
    pub fn new(database: Arc<dyn DatabaseManager>) -> Self {
        Self { database }
    }

    /// Validate and append one ledger entry, pricing it from the model cost
    /// table at insert time. A model without a configured rate is recorded
    /// at zero cost so new models never block call sites; admins backfill
    /// the rate later.
    pub async fn record_cost(&self, new: NewCostEntry) -> Result<CostEntry, AppError> {
        if new.prompt_tokens < 0 || new.completion_tokens < 0 {
            return Err(AppError::InvalidEntry(format!(
                "token counts must be non-negative: prompt={}, completion={}",
                new.prompt_tokens, new.completion_tokens
            )));
        }

        if new.total_tokens != new.prompt_tokens + new.completion_tokens {
            return Err(AppError::InvalidEntry(format!(
                "total_tokens {} does not equal prompt_tokens {} + completion_tokens {}",
                new.total_tokens, new.prompt_tokens, new.completion_tokens
            )));
        }

        let estimated_cost = match self.database.model_costs().find_by_model(&new.model).await? {
            Some(model_cost) => {
                pricing::compute_cost(&model_cost, new.prompt_tokens, new.completion_tokens)
            }
            None => {
                warn!(model = %new.model, "no pricing configured for model, recording zero cost");
                Decimal::ZERO
            }
        };

        let entry = CostEntry {
            id: 0,
            user_id: new.user_id,
            model: new.model,
            prompt_tokens: new.prompt_tokens,
            completion_tokens: new.completion_tokens,
            total_tokens: new.total_tokens,
            estimated_cost,
            feature: new.feature,
            created_at: Utc::now(),
        };

        let inserted = self.database.costs().insert(&entry).await?;
        Ok(inserted)
    }

    /// Fire-and-forget variant for request paths: the caller's response never
    /// waits on, or fails with, the ledger write. Failures are still reported
    /// loudly through the log.
    pub fn record_cost_detached(self: &Arc<Self>, new: NewCostEntry) {
        let service = Arc::clone(self);
        tokio::spawn(async move {
            let user_id = new.user_id.clone();
            let feature = new.feature;
            if let Err(err) = service.record_cost(new).await {
                error!(
                    user_id = %user_id,
                    feature = feature.as_str(),
                    %err,
                    "failed to record cost ledger entry"
                );
            }
        });
    }

    /// Aggregate one user's ledger over `start <= created_at < end`.
    pub async fn user_costs(
        &self,
        user_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<CostAggregates, AppError> {
        let aggregates = self
            .database
            .costs()
            .aggregate(&CostQuery {
                user_id: Some(user_id.to_string()),
                start,
                end,
            })
            .await?;

        Ok(aggregates)
    }

    /// Aggregate every user's ledger over the range, with a per-user
    /// breakdown. Authorization is the caller's concern: handlers gate this
    /// behind the admin predicate before calling.
    pub async fn all_users_costs(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<(CostAggregates, Vec<UserCostBreakdown>), AppError> {
        let result = self.database.costs().aggregate_all_users(start, end).await?;
        Ok(result)
    }

    /// Seed the price table with embedded defaults, skipping models an admin
    /// has already configured. Returns how many rows were inserted.
    pub async fn seed_default_costs(&self) -> Result<u32, AppError> {
        let dao = self.database.model_costs();
        let mut inserted = 0u32;

        for cost in pricing::default_model_costs() {
            if dao.insert_if_absent(&cost).await? {
                inserted += 1;
            }
        }

        if inserted > 0 {
            info!(inserted, "seeded default model costs");
        }

        Ok(inserted)
    }
}
