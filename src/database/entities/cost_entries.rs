use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{entity::prelude::*, sea_query::StringLen};
use serde::{Deserialize, Serialize};

/// Product feature that triggered the LLM call.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum Feature {
    #[sea_orm(string_value = "chat")]
    #[serde(rename = "chat")]
    Chat,
    #[sea_orm(string_value = "image")]
    #[serde(rename = "image")]
    Image,
    #[sea_orm(string_value = "voice")]
    #[serde(rename = "voice")]
    Voice,
    #[sea_orm(string_value = "video")]
    #[serde(rename = "video")]
    Video,
}

impl Feature {
    pub fn as_str(&self) -> &'static str {
        match self {
            Feature::Chat => "chat",
            Feature::Image => "image",
            Feature::Voice => "voice",
            Feature::Video => "video",
        }
    }
}

/// One ledger entry per LLM invocation. Append-only: the DAO exposes no
/// update or delete, and rows are never touched after insert.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "cost_entries")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: String,
    pub model: String,
    pub prompt_tokens: i32,
    pub completion_tokens: i32,
    pub total_tokens: i32,
    #[sea_orm(column_type = "Decimal(Some((12, 6)))")]
    pub estimated_cost: Decimal,
    #[sea_orm(column_type = "String(StringLen::N(16))")]
    pub feature: Feature,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
