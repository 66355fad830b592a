use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Catalog lookups by parent
        manager
            .create_index(
                Index::create()
                    .name("idx_subcategory_category")
                    .table(Subcategory::Table)
                    .col(Subcategory::CategoryId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_service_category_subcategory")
                    .table(Service::Table)
                    .col(Service::CategoryId)
                    .col(Service::SubcategoryId)
                    .to_owned(),
            )
            .await?;

        // VendorService: composite unique (vendor_id, service_id)
        manager
            .create_index(
                Index::create()
                    .name("uniq_vendor_service")
                    .table(VendorService::Table)
                    .col(VendorService::VendorId)
                    .col(VendorService::ServiceId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Booking: owner, assignee and status filters
        manager
            .create_index(
                Index::create()
                    .name("idx_booking_user")
                    .table(Booking::Table)
                    .col(Booking::UserId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_booking_vendor")
                    .table(Booking::Table)
                    .col(Booking::VendorId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_booking_status")
                    .table(Booking::Table)
                    .col(Booking::Status)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_booking_item_booking")
                    .table(BookingItem::Table)
                    .col(BookingItem::BookingId)
                    .to_owned(),
            )
            .await?;

        // LeadResponse: one decision per (booking, vendor)
        manager
            .create_index(
                Index::create()
                    .name("uniq_lead_response_booking_vendor")
                    .table(LeadResponse::Table)
                    .col(LeadResponse::BookingId)
                    .col(LeadResponse::VendorId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Feedback: one review per (booking, user)
        manager
            .create_index(
                Index::create()
                    .name("uniq_feedback_booking_user")
                    .table(Feedback::Table)
                    .col(Feedback::BookingId)
                    .col(Feedback::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_feedback_vendor")
                    .table(Feedback::Table)
                    .col(Feedback::VendorId)
                    .to_owned(),
            )
            .await?;

        // AuditLog: per-actor and per-action timelines
        manager
            .create_index(
                Index::create()
                    .name("idx_audit_actor_timestamp")
                    .table(AuditLog::Table)
                    .col(AuditLog::ActorId)
                    .col(AuditLog::Timestamp)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_audit_action_timestamp")
                    .table(AuditLog::Table)
                    .col(AuditLog::Action)
                    .col(AuditLog::Timestamp)
                    .to_owned(),
            )
            .await?;

        // Notification: recipient inbox
        manager
            .create_index(
                Index::create()
                    .name("idx_notification_recipient")
                    .table(Notification::Table)
                    .col(Notification::RecipientId)
                    .col(Notification::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_notification_recipient").table(Notification::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_audit_action_timestamp").table(AuditLog::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_audit_actor_timestamp").table(AuditLog::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_feedback_vendor").table(Feedback::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("uniq_feedback_booking_user").table(Feedback::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("uniq_lead_response_booking_vendor").table(LeadResponse::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_booking_item_booking").table(BookingItem::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_booking_status").table(Booking::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_booking_vendor").table(Booking::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_booking_user").table(Booking::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("uniq_vendor_service").table(VendorService::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_service_category_subcategory").table(Service::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_subcategory_category").table(Subcategory::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Subcategory { Table, CategoryId }

#[derive(DeriveIden)]
enum Service { Table, CategoryId, SubcategoryId }

#[derive(DeriveIden)]
enum VendorService { Table, VendorId, ServiceId }

#[derive(DeriveIden)]
enum Booking { Table, UserId, VendorId, Status }

#[derive(DeriveIden)]
enum BookingItem { Table, BookingId }

#[derive(DeriveIden)]
enum LeadResponse { Table, BookingId, VendorId }

#[derive(DeriveIden)]
enum Feedback { Table, BookingId, UserId, VendorId }

#[derive(DeriveIden)]
enum AuditLog { Table, Action, ActorId, Timestamp }

#[derive(DeriveIden)]
enum Notification { Table, RecipientId, CreatedAt }
