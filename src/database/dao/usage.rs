use crate::database::entities::{UserUsageRecord, user_usage};
use crate::database::{DatabaseError, DatabaseResult};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    sea_query::{Expr, ExprTrait, OnConflict},
};

/// Integer usage counters. Voice minutes are decimal and have their own
/// entry point on the DAO.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageCounter {
    ChatUsedToday,
    VideosThisWeek,
    ImagesThisWeek,
}

impl UsageCounter {
    fn column(&self) -> user_usage::Column {
        match self {
            UsageCounter::ChatUsedToday => user_usage::Column::ChatUsedToday,
            UsageCounter::VideosThisWeek => user_usage::Column::VideosGeneratedThisWeek,
            UsageCounter::ImagesThisWeek => user_usage::Column::ImagesGeneratedThisWeek,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UsageCounter::ChatUsedToday => "chat_used_today",
            UsageCounter::VideosThisWeek => "videos_generated_this_week",
            UsageCounter::ImagesThisWeek => "images_generated_this_week",
        }
    }
}

/// Usage counters DAO for database operations
pub struct UsageDao {
    db: DatabaseConnection,
}

impl UsageDao {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Fetch a user's counters and plan metadata.
    pub async fn get(&self, user_id: &str) -> DatabaseResult<Option<UserUsageRecord>> {
        let record = user_usage::Entity::find_by_id(user_id)
            .one(&self.db)
            .await
            .map_err(|e| DatabaseError::Database(e.to_string()))?;

        Ok(record)
    }

    /// Create or refresh a user's row using native upsert. The signup path
    /// creates the row; a conflicting insert only refreshes plan metadata
    /// and never touches the counters.
    pub async fn upsert(&self, record: &UserUsageRecord) -> DatabaseResult<()> {
        let active_model = user_usage::ActiveModel {
            user_id: Set(record.user_id.clone()),
            plan: Set(record.plan),
            plan_expires_at: Set(record.plan_expires_at),
            chat_used_today: Set(record.chat_used_today),
            videos_generated_this_week: Set(record.videos_generated_this_week),
            voice_minutes_this_week: Set(record.voice_minutes_this_week),
            images_generated_this_week: Set(record.images_generated_this_week),
            updated_at: Set(record.updated_at),
        };

        let on_conflict = OnConflict::column(user_usage::Column::UserId)
            .update_columns([
                user_usage::Column::Plan,
                user_usage::Column::PlanExpiresAt,
                user_usage::Column::UpdatedAt,
            ])
            .to_owned();

        user_usage::Entity::insert(active_model)
            .on_conflict(on_conflict)
            .exec_without_returning(&self.db)
            .await
            .map_err(|e| DatabaseError::Database(e.to_string()))?;

        Ok(())
    }

    /// Atomically add `amount` to the named counter. The addition happens in
    /// a single UPDATE so concurrent increments for the same user can never
    /// collapse into one.
    pub async fn increment(
        &self,
        user_id: &str,
        counter: UsageCounter,
        amount: i32,
    ) -> DatabaseResult<()> {
        let column = counter.column();

        let result = user_usage::Entity::update_many()
            .col_expr(column, Expr::col(column).add(amount))
            .col_expr(user_usage::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(user_usage::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await
            .map_err(|e| DatabaseError::Database(e.to_string()))?;

        if result.rows_affected == 0 {
            return Err(DatabaseError::NotFound);
        }

        Ok(())
    }

    /// Atomically add fractional minutes to the weekly voice counter.
    pub async fn add_voice_minutes(&self, user_id: &str, minutes: Decimal) -> DatabaseResult<()> {
        let column = user_usage::Column::VoiceMinutesThisWeek;

        let result = user_usage::Entity::update_many()
            .col_expr(column, Expr::col(column).add(minutes))
            .col_expr(user_usage::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(user_usage::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await
            .map_err(|e| DatabaseError::Database(e.to_string()))?;

        if result.rows_affected == 0 {
            return Err(DatabaseError::NotFound);
        }

        Ok(())
    }

    /// Zero the daily chat counter for every user in one sweep. Returns the
    /// number of rows swept; re-running within the same boundary re-zeroes
    /// already-zero rows and reports the same count.
    pub async fn reset_daily(&self) -> DatabaseResult<u64> {
        let result = user_usage::Entity::update_many()
            .col_expr(user_usage::Column::ChatUsedToday, Expr::value(0))
            .col_expr(user_usage::Column::UpdatedAt, Expr::value(Utc::now()))
            .exec(&self.db)
            .await
            .map_err(|e| DatabaseError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }

    /// Zero all three weekly counters for every user. A single UPDATE keeps
    /// the sweep all-or-nothing per row: no reader ever sees a user with
    /// some weekly counters reset and others not.
    pub async fn reset_weekly(&self) -> DatabaseResult<u64> {
        let result = user_usage::Entity::update_many()
            .col_expr(
                user_usage::Column::VideosGeneratedThisWeek,
                Expr::value(0),
            )
            .col_expr(
                user_usage::Column::VoiceMinutesThisWeek,
                Expr::value(Decimal::ZERO),
            )
            .col_expr(
                user_usage::Column::ImagesGeneratedThisWeek,
                Expr::value(0),
            )
            .col_expr(user_usage::Column::UpdatedAt, Expr::value(Utc::now()))
            .exec(&self.db)
            .await
            .map_err(|e| DatabaseError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }

    /// Delete a user's row. Only the account-deletion path calls this.
    pub async fn delete(&self, user_id: &str) -> DatabaseResult<bool> {
        let result = user_usage::Entity::delete_many()
            .filter(user_usage::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await
            .map_err(|e| DatabaseError::Database(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }
}
