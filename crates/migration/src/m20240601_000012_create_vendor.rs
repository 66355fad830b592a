//! Create `vendor` table.
//!
//! Service providers; `is_verified` is the admin approval flag, `phone_verified` the OTP check.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Vendor::Table)
                    .if_not_exists()
                    .col(uuid(Vendor::Id).primary_key())
                    .col(string_len(Vendor::VendorCode, 32).unique_key().not_null())
                    .col(string_len(Vendor::PhoneNumber, 20).unique_key().not_null())
                    .col(string_len(Vendor::Name, 64).not_null())
                    .col(ColumnDef::new(Vendor::Email).string_len(255).null())
                    .col(string_len(Vendor::PinHash, 255).not_null())
                    .col(boolean(Vendor::PhoneVerified).not_null())
                    .col(boolean(Vendor::IsVerified).not_null())
                    .col(boolean(Vendor::IsActive).not_null())
                    .col(boolean(Vendor::IsSuspended).not_null())
                    .col(boolean(Vendor::IsBlocked).not_null())
                    .col(boolean(Vendor::DutyOn).not_null())
                    .col(ColumnDef::new(Vendor::DutyChangedAt).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(Vendor::WorkState).string_len(64).null())
                    .col(ColumnDef::new(Vendor::WorkCity).string_len(64).null())
                    .col(json(Vendor::WorkPincodes).not_null())
                    .col(integer(Vendor::FailedAttempts).not_null())
                    .col(ColumnDef::new(Vendor::LockUntil).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(Vendor::LastLogin).timestamp_with_time_zone().null())
                    .col(timestamp_with_time_zone(Vendor::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Vendor::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Vendor::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Vendor {
    Table,
    Id,
    VendorCode,
    PhoneNumber,
    Name,
    Email,
    PinHash,
    PhoneVerified,
    IsVerified,
    IsActive,
    IsSuspended,
    IsBlocked,
    DutyOn,
    DutyChangedAt,
    WorkState,
    WorkCity,
    WorkPincodes,
    FailedAttempts,
    LockUntil,
    LastLogin,
    CreatedAt,
    UpdatedAt,
}
