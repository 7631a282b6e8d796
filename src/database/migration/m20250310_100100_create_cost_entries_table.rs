use super::CostEntries;
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CostEntries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CostEntries::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CostEntries::UserId).string().not_null())
                    .col(ColumnDef::new(CostEntries::Model).string().not_null())
                    .col(
                        ColumnDef::new(CostEntries::PromptTokens)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CostEntries::CompletionTokens)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CostEntries::TotalTokens)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CostEntries::EstimatedCost)
                            .decimal_len(12, 6)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CostEntries::Feature)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CostEntries::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Create index on user_id for per-user reports
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_cost_entries_user_id")
                    .table(CostEntries::Table)
                    .col(CostEntries::UserId)
                    .to_owned(),
            )
            .await?;

        // Create index on created_at for range queries
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_cost_entries_created_at")
                    .table(CostEntries::Table)
                    .col(CostEntries::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // Composite index for user + range queries
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_cost_entries_user_created")
                    .table(CostEntries::Table)
                    .col(CostEntries::UserId)
                    .col(CostEntries::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CostEntries::Table).to_owned())
            .await
    }
}
