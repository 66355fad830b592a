//! Create `admin` table (username + argon2 password hash).
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Admin::Table)
                    .if_not_exists()
                    .col(uuid(Admin::Id).primary_key())
                    .col(string_len(Admin::Username, 64).unique_key().not_null())
                    .col(string_len(Admin::Name, 64).not_null())
                    .col(ColumnDef::new(Admin::Email).string_len(255).null())
                    .col(ColumnDef::new(Admin::PhoneNumber).string_len(20).null())
                    .col(string_len(Admin::PasswordHash, 255).not_null())
                    .col(string_len(Admin::Role, 32).not_null())
                    .col(boolean(Admin::IsActive).not_null())
                    .col(ColumnDef::new(Admin::LastLogin).timestamp_with_time_zone().null())
                    .col(timestamp_with_time_zone(Admin::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Admin::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Admin::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Admin {
    Table,
    Id,
    Username,
    Name,
    Email,
    PhoneNumber,
    PasswordHash,
    Role,
    IsActive,
    LastLogin,
    CreatedAt,
    UpdatedAt,
}
