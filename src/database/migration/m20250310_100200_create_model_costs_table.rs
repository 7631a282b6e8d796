use super::ModelCosts;
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ModelCosts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ModelCosts::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ModelCosts::ModelId)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(ModelCosts::InputCostPer1kTokens)
                            .decimal_len(12, 6)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ModelCosts::OutputCostPer1kTokens)
                            .decimal_len(12, 6)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ModelCosts::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ModelCosts::Table).to_owned())
            .await
    }
}
