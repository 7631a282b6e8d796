use crate::database::entities::{CostEntry, cost_entries};
use crate::database::{DatabaseError, DatabaseResult};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use std::collections::BTreeMap;

/// Ledger query parameters. The date range is half-open:
/// `start <= created_at < end`.
#[derive(Debug, Clone)]
pub struct CostQuery {
    pub user_id: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Aggregates over a set of ledger entries. Group-by maps are BTreeMaps so
/// keys come out lexicographically ordered and output is deterministic.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct CostAggregates {
    pub total_cost: Decimal,
    pub total_tokens: u64,
    pub by_model: BTreeMap<String, Decimal>,
    pub by_feature: BTreeMap<String, Decimal>,
    pub entry_count: u64,
}

impl CostAggregates {
    fn fold(&mut self, entry: &CostEntry) {
        self.total_cost += entry.estimated_cost;
        self.total_tokens += entry.total_tokens as u64;
        *self.by_model.entry(entry.model.clone()).or_default() += entry.estimated_cost;
        *self
            .by_feature
            .entry(entry.feature.as_str().to_string())
            .or_default() += entry.estimated_cost;
        self.entry_count += 1;
    }
}

/// Per-user slice of a system-wide aggregation.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct UserCostBreakdown {
    pub user_id: String,
    pub total_cost: Decimal,
    pub total_tokens: u64,
    pub entry_count: u64,
}

/// Cost ledger DAO. Append-only: inserts and range reads, nothing else.
pub struct CostLedgerDao {
    db: DatabaseConnection,
}

impl CostLedgerDao {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Append one entry. The entry's own `created_at` is stored verbatim so
    /// callers control the ledger timestamp.
    pub async fn insert(&self, entry: &CostEntry) -> DatabaseResult<CostEntry> {
        let active_model = cost_entries::ActiveModel {
            id: ActiveValue::NotSet,
            user_id: Set(entry.user_id.clone()),
            model: Set(entry.model.clone()),
            prompt_tokens: Set(entry.prompt_tokens),
            completion_tokens: Set(entry.completion_tokens),
            total_tokens: Set(entry.total_tokens),
            estimated_cost: Set(entry.estimated_cost),
            feature: Set(entry.feature),
            created_at: Set(entry.created_at),
        };

        let inserted = active_model
            .insert(&self.db)
            .await
            .map_err(|e| DatabaseError::Database(e.to_string()))?;

        Ok(inserted)
    }

    /// Fetch entries in the half-open range, oldest first.
    pub async fn entries_in_range(&self, query: &CostQuery) -> DatabaseResult<Vec<CostEntry>> {
        let mut select = cost_entries::Entity::find()
            .filter(cost_entries::Column::CreatedAt.gte(query.start))
            .filter(cost_entries::Column::CreatedAt.lt(query.end));

        if let Some(ref user_id) = query.user_id {
            select = select.filter(cost_entries::Column::UserId.eq(user_id));
        }

        let entries = select
            .order_by_asc(cost_entries::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| DatabaseError::Database(e.to_string()))?;

        Ok(entries)
    }

    /// Aggregate matching entries: a pure fold over the rows. An empty range
    /// yields all-zero aggregates.
    pub async fn aggregate(&self, query: &CostQuery) -> DatabaseResult<CostAggregates> {
        let entries = self.entries_in_range(query).await?;

        let mut aggregates = CostAggregates::default();
        for entry in &entries {
            aggregates.fold(entry);
        }

        Ok(aggregates)
    }

    /// Aggregate across all users in the range, plus a per-user breakdown
    /// sorted by user id.
    pub async fn aggregate_all_users(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DatabaseResult<(CostAggregates, Vec<UserCostBreakdown>)> {
        let entries = self
            .entries_in_range(&CostQuery {
                user_id: None,
                start,
                end,
            })
            .await?;

        let mut totals = CostAggregates::default();
        let mut per_user: BTreeMap<String, UserCostBreakdown> = BTreeMap::new();

        for entry in &entries {
            totals.fold(entry);

            let breakdown =
                per_user
                    .entry(entry.user_id.clone())
                    .or_insert_with(|| UserCostBreakdown {
                        user_id: entry.user_id.clone(),
                        total_cost: Decimal::ZERO,
                        total_tokens: 0,
                        entry_count: 0,
                    });
            breakdown.total_cost += entry.estimated_cost;
            breakdown.total_tokens += entry.total_tokens as u64;
            breakdown.entry_count += 1;
        }

        Ok((totals, per_user.into_values().collect()))
    }
}
