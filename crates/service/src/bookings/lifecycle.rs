use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, QueryFilter, Set, TransactionTrait,
};
use serde_json::json;
use tracing::{error, info, instrument};
use uuid::Uuid;

use common::metrics::{BOOKINGS_CREATED_TOTAL, VENDOR_SEARCH_FAILURES_TOTAL};
use models::enums::{ActorModel, AuditAction, BookingStatus, DisputeStatus, NotificationType};
use models::validation::MAX_RESCHEDULES;
use models::{booking, booking_item, codes, dispute, offering, vendor};

use super::views::{hydrate_one, BookingView};
use super::{find_by_reference, parse_date, BookingService, NewBooking, RetryOutcome, VendorMatch};
use crate::audit::Actor;
use crate::errors::ServiceError;
use crate::notifications::{notify_quietly, NewNotification};

struct PricedLine {
    service: offering::Model,
    quantity: i32,
}

impl BookingService {
    /// Create a booking awaiting vendor acceptance; `confirmation` starts the vendor search.
    #[instrument(skip(self, actor, input), fields(user_id = %actor.id))]
    pub async fn create(&self, actor: &Actor, input: NewBooking) -> Result<BookingView, ServiceError> {
        if input.services.is_empty() {
            return Err(ServiceError::Validation("At least one service is required for booking".into()));
        }
        let mut lines = Vec::with_capacity(input.services.len());
        for line in &input.services {
            let missing = || ServiceError::NotFound(format!("Service with ID {} not found", line.service_id));
            let id = Uuid::parse_str(line.service_id.trim()).map_err(|_| missing())?;
            let service = offering::Entity::find_by_id(id).one(&self.db).await?.ok_or_else(missing)?;
            let quantity = line.quantity.unwrap_or(1);
            if quantity < 1 {
                return Err(ServiceError::Validation("Quantity must be at least 1".into()));
            }
            lines.push(PricedLine { service, quantity });
        }
        if input.time.trim().is_empty() {
            return Err(ServiceError::Validation("Scheduled time is required".into()));
        }
        if input.address.trim().is_empty() {
            return Err(ServiceError::Validation("Address is required".into()));
        }
        let scheduled_date = parse_date(&input.date)?;
        let total = input.total_price.unwrap_or(0.0);
        let now = Utc::now();

        let txn = self.db.begin().await?;
        let created = booking::ActiveModel {
            id: Set(Uuid::new_v4()),
            booking_code: Set(codes::booking_code()),
            start_code: Set(self.otp.booking_code()),
            user_id: Set(actor.id),
            vendor_id: Set(None),
            status: Set(BookingStatus::PendingAcceptance),
            scheduled_date: Set(scheduled_date),
            scheduled_time: Set(input.time.trim().to_string()),
            address: Set(input.address.trim().to_string()),
            latitude: Set(input.latitude),
            longitude: Set(input.longitude),
            pincode: Set(input.pincode),
            total_price: Set(total),
            base_price: Set(total),
            reschedule_count: Set(0),
            cancelled_by: Set(None),
            cancellation_reason: Set(None),
            cancelled_at: Set(None),
            accepted_at: Set(None),
            completed_at: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(&txn)
        .await?;
        for line in lines {
            let admin_price = line.service.admin_price;
            // a zero admin price still needs a quote
            let confirmed = admin_price.filter(|p| *p != 0.0);
            booking_item::ActiveModel {
                id: Set(Uuid::new_v4()),
                booking_id: Set(created.id),
                service_id: Set(line.service.id),
                quantity: Set(line.quantity),
                admin_price: Set(admin_price),
                final_price: Set(confirmed.map(|p| p * f64::from(line.quantity)).unwrap_or(0.0)),
                is_price_confirmed: Set(confirmed.is_some()),
            }
            .insert(&txn)
            .await?;
        }
        txn.commit().await?;

        BOOKINGS_CREATED_TOTAL.inc();
        info!(event = "booking_created", booking = %created.booking_code);
        self.audit.record_detached(actor.audit(AuditAction::BookingCreated).details(json!({
            "bookingID": created.booking_code,
            "services": input.services.len(),
            "totalPrice": total,
        })));

        if input.confirmation == Some(true) {
            self.spawn_vendor_search(created.clone());
        }
        hydrate_one(&self.db, created).await
    }

    /// Create a booking and start the vendor search right away.
    pub async fn request_lead(&self, actor: &Actor, mut input: NewBooking) -> Result<BookingView, ServiceError> {
        input.confirmation = Some(true);
        self.create(actor, input).await
    }

    /// Alert every vendor currently able to take work.
    #[instrument(skip(self, booking), fields(booking = %booking.booking_code))]
    pub async fn search_vendors(&self, booking: &booking::Model) -> Result<Vec<VendorMatch>, ServiceError> {
        let online = vendor::Entity::find()
            .filter(vendor::Column::DutyOn.eq(true))
            .filter(vendor::Column::IsActive.eq(true))
            .filter(vendor::Column::IsVerified.eq(true))
            .filter(vendor::Column::IsSuspended.eq(false))
            .filter(vendor::Column::IsBlocked.eq(false))
            .all(&self.db)
            .await?;

        for v in &online {
            notify_quietly(
                &self.db,
                NewNotification {
                    recipient_id: v.id,
                    recipient_model: ActorModel::Vendor,
                    kind: NotificationType::BookingAlert,
                    title: "New booking request".into(),
                    body: format!("Booking {} is scheduled for {} {}", booking.booking_code, booking.scheduled_date, booking.scheduled_time),
                    data: Some(json!({ "bookingId": booking.id, "bookingID": booking.booking_code })),
                },
            )
            .await;
        }
        info!(event = "vendor_search", found = online.len());
        Ok(online.into_iter().map(|v| VendorMatch { vendor_id: v.id, distance: 0.0 }).collect())
    }

    /// Run [`search_vendors`](Self::search_vendors) in the background; failures are only logged.
    pub fn spawn_vendor_search(&self, booking: booking::Model) {
        let this = self.clone();
        tokio::spawn(async move {
            match this.search_vendors(&booking).await {
                Ok(found) if found.is_empty() => {
                    info!(event = "vendor_search_empty", booking = %booking.booking_code, "no vendors found");
                }
                Ok(_) => {}
                Err(e) => {
                    VENDOR_SEARCH_FAILURES_TOTAL.inc();
                    error!(event = "vendor_search_failed", booking = %booking.booking_code, error = %e);
                }
            }
        });
    }

    #[instrument(skip(self, actor, reason), fields(user_id = %actor.id))]
    pub async fn cancel(&self, actor: &Actor, reference: &str, reason: Option<String>) -> Result<booking::Model, ServiceError> {
        let found = find_by_reference(&self.db, reference, Some(actor.id)).await?;
        if found.status.is_terminal() {
            return Err(ServiceError::Validation(format!("Booking is already {}", found.status.as_str())));
        }
        let now = Utc::now();
        let vendor_id = found.vendor_id;
        let mut am = found.into_active_model();
        am.status = Set(BookingStatus::Cancelled);
        am.cancelled_by = Set(Some("user".into()));
        am.cancellation_reason = Set(reason.clone());
        am.cancelled_at = Set(Some(now.into()));
        am.updated_at = Set(now.into());
        let updated = am.update(&self.db).await?;

        self.audit.record_detached(
            actor
                .audit(AuditAction::BookingCancelled)
                .details(json!({ "bookingID": updated.booking_code, "reason": reason })),
        );
        if let Some(vendor_id) = vendor_id {
            notify_quietly(
                &self.db,
                NewNotification {
                    recipient_id: vendor_id,
                    recipient_model: ActorModel::Vendor,
                    kind: NotificationType::BookingCancelled,
                    title: "Booking cancelled".into(),
                    body: format!("Booking {} was cancelled by the customer", updated.booking_code),
                    data: Some(json!({ "bookingId": updated.id })),
                },
            )
            .await;
        }
        Ok(updated)
    }

    /// Move a booking to a new slot; at most two reschedules per booking.
    #[instrument(skip(self), fields(%user_id))]
    pub async fn reschedule(
        &self,
        user_id: Uuid,
        reference: &str,
        date: Option<&str>,
        time: Option<&str>,
    ) -> Result<booking::Model, ServiceError> {
        let (date, time) = match (date.map(str::trim), time.map(str::trim)) {
            (Some(d), Some(t)) if !d.is_empty() && !t.is_empty() => (d, t),
            _ => return Err(ServiceError::Validation("Both date and time are required for rescheduling".into())),
        };
        let found = find_by_reference(&self.db, reference, Some(user_id)).await?;
        if found.reschedule_count >= MAX_RESCHEDULES {
            return Err(ServiceError::Validation(format!(
                "Maximum reschedule limit ({MAX_RESCHEDULES}) reached for this booking"
            )));
        }
        if found.status.is_terminal() {
            return Err(ServiceError::Validation("Cannot reschedule a completed or cancelled booking".into()));
        }
        let new_date = parse_date(date)?;

        let count = found.reschedule_count + 1;
        let mut am = found.into_active_model();
        am.scheduled_date = Set(new_date);
        am.scheduled_time = Set(time.to_string());
        am.reschedule_count = Set(count);
        am.updated_at = Set(Utc::now().into());
        Ok(am.update(&self.db).await?)
    }

    /// Re-run the vendor search for a booking still waiting for acceptance.
    pub async fn retry_search(&self, user_id: Uuid, reference: &str) -> Result<RetryOutcome, ServiceError> {
        let found = find_by_reference(&self.db, reference, Some(user_id)).await?;
        if found.status != BookingStatus::PendingAcceptance {
            return Err(ServiceError::Validation("Search can only be retried for pending bookings".into()));
        }
        let nearby = self.search_vendors(&found).await?;
        Ok(RetryOutcome { found: !nearby.is_empty(), count: nearby.len(), booking_code: found.booking_code })
    }

    /// Advance an assigned booking one step: on_the_way, arrived, ongoing, completed.
    #[instrument(skip(self, actor), fields(vendor_id = %actor.id))]
    pub async fn update_status(&self, actor: &Actor, reference: &str, target: BookingStatus) -> Result<booking::Model, ServiceError> {
        let found = booking::Entity::find()
            .filter(super::reference_condition(reference))
            .filter(booking::Column::VendorId.eq(actor.id))
            .one(&self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Booking"))?;
        if found.status.vendor_next() != Some(target) {
            return Err(ServiceError::Validation(format!(
                "Cannot change booking status from {} to {}",
                found.status.as_str(),
                target.as_str()
            )));
        }
        let now = Utc::now();
        let user_id = found.user_id;
        let mut am = found.into_active_model();
        am.status = Set(target);
        if target == BookingStatus::Completed {
            am.completed_at = Set(Some(now.into()));
        }
        am.updated_at = Set(now.into());
        let updated = am.update(&self.db).await?;

        if target == BookingStatus::Completed {
            self.audit
                .record_detached(actor.audit(AuditAction::BookingCompleted).details(json!({ "bookingID": updated.booking_code })));
            notify_quietly(
                &self.db,
                NewNotification {
                    recipient_id: user_id,
                    recipient_model: ActorModel::User,
                    kind: NotificationType::BookingCompleted,
                    title: "Booking completed".into(),
                    body: format!("Booking {} has been completed. Tell us how it went!", updated.booking_code),
                    data: Some(json!({ "bookingId": updated.id })),
                },
            )
            .await;
        }
        Ok(updated)
    }

    pub async fn raise_dispute(&self, user_id: Uuid, reference: &str, reason: &str) -> Result<dispute::Model, ServiceError> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(ServiceError::Validation("Dispute reason is required".into()));
        }
        let found = find_by_reference(&self.db, reference, Some(user_id)).await?;
        let created = dispute::ActiveModel {
            id: Set(Uuid::new_v4()),
            booking_id: Set(found.id),
            user_id: Set(user_id),
            reason: Set(reason.to_string()),
            status: Set(DisputeStatus::Open),
            created_at: Set(Utc::now().into()),
        }
        .insert(&self.db)
        .await?;
        info!(event = "dispute_raised", booking = %found.booking_code);
        Ok(created)
    }
}
