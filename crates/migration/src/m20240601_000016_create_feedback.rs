//! Create `feedback` table; one row per (booking, user) enforced by the index migration.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Feedback::Table)
                    .if_not_exists()
                    .col(uuid(Feedback::Id).primary_key())
                    .col(uuid(Feedback::BookingId).not_null())
                    .col(uuid(Feedback::UserId).not_null())
                    .col(uuid(Feedback::VendorId).not_null())
                    .col(integer(Feedback::Rating).not_null())
                    .col(text(Feedback::Review).not_null())
                    .col(timestamp_with_time_zone(Feedback::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Feedback::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_feedback_booking")
                            .from(Feedback::Table, Feedback::BookingId)
                            .to(Booking::Table, Booking::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_feedback_user")
                            .from(Feedback::Table, Feedback::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_feedback_vendor")
                            .from(Feedback::Table, Feedback::VendorId)
                            .to(Vendor::Table, Vendor::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Feedback::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Feedback { Table, Id, BookingId, UserId, VendorId, Rating, Review, CreatedAt, UpdatedAt }

#[derive(DeriveIden)]
enum Booking { Table, Id }

#[derive(DeriveIden)]
enum User { Table, Id }

#[derive(DeriveIden)]
enum Vendor { Table, Id }
