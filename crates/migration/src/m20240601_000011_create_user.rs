//! Create `user` table.
//!
//! End customers authenticated by phone number + PIN; soft-delete timestamp kept for admin listing.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(User::Table)
                    .if_not_exists()
                    .col(uuid(User::Id).primary_key())
                    .col(string_len(User::UserCode, 32).unique_key().not_null())
                    .col(string_len(User::PhoneNumber, 20).unique_key().not_null())
                    .col(string_len(User::Name, 64).not_null())
                    .col(ColumnDef::new(User::Email).string_len(255).null())
                    .col(string_len(User::PinHash, 255).not_null())
                    .col(string_len(User::Role, 32).not_null())
                    .col(boolean(User::IsVerified).not_null())
                    .col(boolean(User::IsActive).not_null())
                    .col(string_len(User::Status, 32).not_null())
                    .col(integer(User::FailedAttempts).not_null())
                    .col(ColumnDef::new(User::LockUntil).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(User::LastLogin).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(User::DeletedAt).timestamp_with_time_zone().null())
                    .col(big_integer(User::Coins).not_null())
                    .col(ColumnDef::new(User::Address).string_len(255).null())
                    .col(ColumnDef::new(User::City).string_len(64).null())
                    .col(ColumnDef::new(User::State).string_len(64).null())
                    .col(ColumnDef::new(User::Zipcode).string_len(16).null())
                    .col(string_len(User::Country, 64).not_null())
                    .col(ColumnDef::new(User::Photo).string_len(512).null())
                    .col(timestamp_with_time_zone(User::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(User::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(User::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum User {
    Table,
    Id,
    UserCode,
    PhoneNumber,
    Name,
    Email,
    PinHash,
    Role,
    IsVerified,
    IsActive,
    Status,
    FailedAttempts,
    LockUntil,
    LastLogin,
    DeletedAt,
    Coins,
    Address,
    City,
    State,
    Zipcode,
    Country,
    Photo,
    CreatedAt,
    UpdatedAt,
}
