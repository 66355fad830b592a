//! Create booking tables: `booking`, `booking_item`, `lead_response` and `dispute`.
//!
//! `booking.vendor_id` stays null until a vendor accepts the lead.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Booking::Table)
                    .if_not_exists()
                    .col(uuid(Booking::Id).primary_key())
                    .col(string_len(Booking::BookingCode, 32).unique_key().not_null())
                    .col(string_len(Booking::StartCode, 8).not_null())
                    .col(uuid(Booking::UserId).not_null())
                    .col(ColumnDef::new(Booking::VendorId).uuid().null())
                    .col(string_len(Booking::Status, 32).not_null())
                    .col(date(Booking::ScheduledDate).not_null())
                    .col(string_len(Booking::ScheduledTime, 32).not_null())
                    .col(string_len(Booking::Address, 512).not_null())
                    .col(ColumnDef::new(Booking::Latitude).double().null())
                    .col(ColumnDef::new(Booking::Longitude).double().null())
                    .col(ColumnDef::new(Booking::Pincode).string_len(16).null())
                    .col(double(Booking::TotalPrice).not_null())
                    .col(double(Booking::BasePrice).not_null())
                    .col(integer(Booking::RescheduleCount).not_null())
                    .col(ColumnDef::new(Booking::CancelledBy).string_len(32).null())
                    .col(ColumnDef::new(Booking::CancellationReason).text().null())
                    .col(ColumnDef::new(Booking::CancelledAt).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(Booking::AcceptedAt).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(Booking::CompletedAt).timestamp_with_time_zone().null())
                    .col(timestamp_with_time_zone(Booking::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Booking::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_booking_user")
                            .from(Booking::Table, Booking::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_booking_vendor")
                            .from(Booking::Table, Booking::VendorId)
                            .to(Vendor::Table, Vendor::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(BookingItem::Table)
                    .if_not_exists()
                    .col(uuid(BookingItem::Id).primary_key())
                    .col(uuid(BookingItem::BookingId).not_null())
                    .col(uuid(BookingItem::ServiceId).not_null())
                    .col(integer(BookingItem::Quantity).not_null())
                    .col(ColumnDef::new(BookingItem::AdminPrice).double().null())
                    .col(double(BookingItem::FinalPrice).not_null())
                    .col(boolean(BookingItem::IsPriceConfirmed).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_booking_item_booking")
                            .from(BookingItem::Table, BookingItem::BookingId)
                            .to(Booking::Table, Booking::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_booking_item_service")
                            .from(BookingItem::Table, BookingItem::ServiceId)
                            .to(Service::Table, Service::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(LeadResponse::Table)
                    .if_not_exists()
                    .col(uuid(LeadResponse::Id).primary_key())
                    .col(uuid(LeadResponse::BookingId).not_null())
                    .col(uuid(LeadResponse::VendorId).not_null())
                    .col(string_len(LeadResponse::Decision, 32).not_null())
                    .col(timestamp_with_time_zone(LeadResponse::CreatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_lead_response_booking")
                            .from(LeadResponse::Table, LeadResponse::BookingId)
                            .to(Booking::Table, Booking::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_lead_response_vendor")
                            .from(LeadResponse::Table, LeadResponse::VendorId)
                            .to(Vendor::Table, Vendor::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Dispute::Table)
                    .if_not_exists()
                    .col(uuid(Dispute::Id).primary_key())
                    .col(uuid(Dispute::BookingId).not_null())
                    .col(uuid(Dispute::UserId).not_null())
                    .col(text(Dispute::Reason).not_null())
                    .col(string_len(Dispute::Status, 32).not_null())
                    .col(timestamp_with_time_zone(Dispute::CreatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_dispute_booking")
                            .from(Dispute::Table, Dispute::BookingId)
                            .to(Booking::Table, Booking::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_dispute_user")
                            .from(Dispute::Table, Dispute::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Dispute::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(LeadResponse::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(BookingItem::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Booking::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Booking {
    Table,
    Id,
    BookingCode,
    StartCode,
    UserId,
    VendorId,
    Status,
    ScheduledDate,
    ScheduledTime,
    Address,
    Latitude,
    Longitude,
    Pincode,
    TotalPrice,
    BasePrice,
    RescheduleCount,
    CancelledBy,
    CancellationReason,
    CancelledAt,
    AcceptedAt,
    CompletedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum BookingItem {
    Table,
    Id,
    BookingId,
    ServiceId,
    Quantity,
    AdminPrice,
    FinalPrice,
    IsPriceConfirmed,
}

#[derive(DeriveIden)]
enum LeadResponse { Table, Id, BookingId, VendorId, Decision, CreatedAt }

#[derive(DeriveIden)]
enum Dispute { Table, Id, BookingId, UserId, Reason, Status, CreatedAt }

#[derive(DeriveIden)]
enum User { Table, Id }

#[derive(DeriveIden)]
enum Vendor { Table, Id }

#[derive(DeriveIden)]
enum Service { Table, Id }
