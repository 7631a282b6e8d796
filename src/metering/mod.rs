//! Usage metering: per-user rolling counters and the reset operations the
//! external scheduler triggers.

use crate::database::{DatabaseManager, UsageCounter, entities::UserUsageRecord};
use crate::error::AppError;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{info, trace};

/// Read and write side of the usage counter store. Holds no state of its
/// own: every call goes straight to the database, so concurrent requests
/// contend only there.
pub struct MeteringService {
    database: Arc<dyn DatabaseManager>,
}

impl MeteringService {
    pub fn new(database: Arc<dyn DatabaseManager>) -> Self {
        Self { database }
    }

    /// Current-moment read of a user's plan and counters. Unknown users are
    /// an error, never a zeroed snapshot: a fabricated zero would mask
    /// quota exhaustion.
    pub async fn usage_snapshot(&self, user_id: &str) -> Result<UserUsageRecord, AppError> {
        let record = self
            .database
            .usage()
            .get(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("no usage record for user {user_id}")))?;

        Ok(record)
    }

    /// Add `amount` to one of the integer counters. The addition is a single
    /// database-side UPDATE, so concurrent calls for the same user all land.
    pub async fn increment(
        &self,
        user_id: &str,
        counter: UsageCounter,
        amount: i32,
    ) -> Result<(), AppError> {
        if amount <= 0 {
            return Err(AppError::InvalidEntry(format!(
                "increment amount must be positive, got {amount}"
            )));
        }

        self.database.usage().increment(user_id, counter, amount).await?;
        trace!(user_id, counter = counter.as_str(), amount, "usage counter incremented");
        Ok(())
    }

    /// Add fractional minutes to the weekly voice counter.
    pub async fn add_voice_minutes(
        &self,
        user_id: &str,
        minutes: Decimal,
    ) -> Result<(), AppError> {
        if minutes <= Decimal::ZERO {
            return Err(AppError::InvalidEntry(format!(
                "voice minutes must be positive, got {minutes}"
            )));
        }

        self.database.usage().add_voice_minutes(user_id, minutes).await?;
        Ok(())
    }

    /// Zero every user's daily chat counter right now. Whether it is time to
    /// reset is the trigger's decision, not this function's: there is no
    /// wall-clock guard, and re-running is harmless.
    pub async fn reset_daily_usage(&self) -> Result<u64, AppError> {
        let count = self.database.usage().reset_daily().await?;
        info!(count, "daily usage counters reset");
        Ok(count)
    }

    /// Zero every user's weekly counters right now. Same contract as
    /// [`reset_daily_usage`](Self::reset_daily_usage).
    pub async fn reset_weekly_usage(&self) -> Result<u64, AppError> {
        let count = self.database.usage().reset_weekly().await?;
        info!(count, "weekly usage counters reset");
        Ok(count)
    }
}
