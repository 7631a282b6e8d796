use super::UserUsage;
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UserUsage::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserUsage::UserId)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(UserUsage::Plan)
                            .string_len(16)
                            .not_null()
                            .default("free"),
                    )
                    .col(
                        ColumnDef::new(UserUsage::ChatUsedToday)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(UserUsage::VideosGeneratedThisWeek)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(UserUsage::VoiceMinutesThisWeek)
                            .decimal_len(10, 2)
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(UserUsage::ImagesGeneratedThisWeek)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(UserUsage::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Reset sweeps touch every row; the plan column serves admin
        // filtering in ad-hoc queries.
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_user_usage_plan")
                    .table(UserUsage::Table)
                    .col(UserUsage::Plan)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserUsage::Table).to_owned())
            .await
    }
}
