use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Per-model price table row: USD per 1000 prompt/completion tokens.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "model_costs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub model_id: String,
    #[sea_orm(column_type = "Decimal(Some((12, 6)))")]
    pub input_cost_per_1k_tokens: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 6)))")]
    pub output_cost_per_1k_tokens: Decimal,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
