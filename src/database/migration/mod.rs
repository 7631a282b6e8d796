use sea_orm_migration::prelude::*;

pub use sea_orm_migration::MigratorTrait;

mod m20250310_100000_create_user_usage_table;
mod m20250310_100100_create_cost_entries_table;
mod m20250310_100200_create_model_costs_table;
mod m20250614_000001_add_plan_expires_at_column;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250310_100000_create_user_usage_table::Migration),
            Box::new(m20250310_100100_create_cost_entries_table::Migration),
            Box::new(m20250310_100200_create_model_costs_table::Migration),
            Box::new(m20250614_000001_add_plan_expires_at_column::Migration),
        ]
    }
}

/// Common table and column identifiers
#[derive(Iden)]
pub enum UserUsage {
    Table,
    UserId,
    Plan,
    PlanExpiresAt,
    ChatUsedToday,
    VideosGeneratedThisWeek,
    VoiceMinutesThisWeek,
    ImagesGeneratedThisWeek,
    UpdatedAt,
}

#[derive(Iden)]
pub enum CostEntries {
    Table,
    Id,
    UserId,
    Model,
    PromptTokens,
    CompletionTokens,
    TotalTokens,
    EstimatedCost,
    Feature,
    CreatedAt,
}

#[derive(Iden)]
pub enum ModelCosts {
    Table,
    Id,
    ModelId,
    #[iden = "input_cost_per_1k_tokens"]
    InputCostPer1kTokens,
    #[iden = "output_cost_per_1k_tokens"]
    OutputCostPer1kTokens,
    UpdatedAt,
}
