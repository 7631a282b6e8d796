use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{entity::prelude::*, sea_query::StringLen};
use serde::{Deserialize, Serialize};

/// Subscription plan, surfaced read-only by this service. The billing system
/// owns plan transitions.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    Default,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum Plan {
    #[sea_orm(string_value = "free")]
    #[serde(rename = "free")]
    #[default]
    Free,
    #[sea_orm(string_value = "pro")]
    #[serde(rename = "pro")]
    Pro,
    #[sea_orm(string_value = "business")]
    #[serde(rename = "business")]
    Business,
}

impl Plan {
    pub fn as_str(&self) -> &'static str {
        match self {
            Plan::Free => "free",
            Plan::Pro => "pro",
            Plan::Business => "business",
        }
    }
}

/// One row per user: rolling usage counters plus plan metadata.
///
/// Counters only grow between resets; the reset sweeps zero them for all
/// users at once. The row is created at signup and deleted with the user.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user_usage")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,
    #[sea_orm(column_type = "String(StringLen::N(16))", default_value = "free")]
    pub plan: Plan,
    pub plan_expires_at: Option<DateTime<Utc>>,
    pub chat_used_today: i32,
    pub videos_generated_this_week: i32,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub voice_minutes_this_week: Decimal,
    pub images_generated_this_week: i32,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Create a fresh record with zeroed counters, as the signup path does.
    pub fn new(user_id: impl Into<String>, plan: Plan) -> Self {
        Self {
            user_id: user_id.into(),
            plan,
            plan_expires_at: None,
            chat_used_today: 0,
            videos_generated_this_week: 0,
            voice_minutes_this_week: Decimal::ZERO,
            images_generated_this_week: 0,
            updated_at: Utc::now(),
        }
    }

    pub fn with_plan_expires_at(mut self, expires_at: DateTime<Utc>) -> Self {
        self.plan_expires_at = Some(expires_at);
        self
    }
}
