//! Create `notification` table with a polymorphic recipient (no foreign key).
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Notification::Table)
                    .if_not_exists()
                    .col(uuid(Notification::Id).primary_key())
                    .col(uuid(Notification::RecipientId).not_null())
                    .col(string_len(Notification::RecipientModel, 16).not_null())
                    .col(string_len(Notification::Kind, 32).not_null())
                    .col(string_len(Notification::Title, 255).not_null())
                    .col(text(Notification::Body).not_null())
                    .col(ColumnDef::new(Notification::Data).json().null())
                    .col(boolean(Notification::IsRead).not_null())
                    .col(ColumnDef::new(Notification::ReadAt).timestamp_with_time_zone().null())
                    .col(boolean(Notification::IsMuted).not_null())
                    .col(ColumnDef::new(Notification::ExpiresAt).timestamp_with_time_zone().null())
                    .col(timestamp_with_time_zone(Notification::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Notification::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Notification::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Notification {
    Table,
    Id,
    RecipientId,
    RecipientModel,
    Kind,
    Title,
    Body,
    Data,
    IsRead,
    ReadAt,
    IsMuted,
    ExpiresAt,
    CreatedAt,
    UpdatedAt,
}
