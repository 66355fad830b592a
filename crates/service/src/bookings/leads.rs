use chrono::Utc;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde_json::json;
use tracing::{info, instrument};
use uuid::Uuid;

use models::enums::{ActorModel, AuditAction, BookingStatus, LeadDecision, NotificationType};
use models::{booking, lead_response, vendor};

use super::views::{hydrate, hydrate_one, BookingView};
use super::{find_by_reference, BookingService, VendorHistory};
use crate::audit::Actor;
use crate::errors::ServiceError;
use crate::notifications::{notify_quietly, NewNotification};

fn lead_gone() -> ServiceError {
    ServiceError::Validation("Lead is no longer available".into())
}

fn is_open(b: &booking::Model) -> bool {
    b.status == BookingStatus::PendingAcceptance && b.vendor_id.is_none()
}

/// Assigns the vendor only while the booking is still unclaimed. False when another vendor got there first.
pub(super) async fn claim<C: ConnectionTrait>(db: &C, booking_id: Uuid, vendor_id: Uuid) -> Result<bool, ServiceError> {
    let now = Utc::now().fixed_offset();
    let res = booking::Entity::update_many()
        .col_expr(booking::Column::VendorId, Expr::value(Some(vendor_id)))
        .col_expr(booking::Column::Status, Expr::value(BookingStatus::OnTheWay.as_str()))
        .col_expr(booking::Column::AcceptedAt, Expr::value(Some(now)))
        .col_expr(booking::Column::UpdatedAt, Expr::value(now))
        .filter(booking::Column::Id.eq(booking_id))
        .filter(booking::Column::Status.eq(BookingStatus::PendingAcceptance))
        .filter(booking::Column::VendorId.is_null())
        .exec(db)
        .await?;
    Ok(res.rows_affected == 1)
}

impl BookingService {
    async fn eligible_vendor(&self, vendor_id: Uuid) -> Result<vendor::Model, ServiceError> {
        let v = vendor::Entity::find_by_id(vendor_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Vendor"))?;
        if !v.is_active || !v.is_verified || v.is_suspended || v.is_blocked {
            return Err(ServiceError::Forbidden("Vendor account is not approved to take leads".into()));
        }
        Ok(v)
    }

    /// Claim an open lead. The status and vendor are set in one conditional update so
    /// two vendors cannot both win the same booking.
    #[instrument(skip(self, actor), fields(vendor_id = %actor.id))]
    pub async fn accept_lead(&self, actor: &Actor, reference: &str) -> Result<BookingView, ServiceError> {
        self.eligible_vendor(actor.id).await?;
        let found = find_by_reference(&self.db, reference, None).await?;
        if !is_open(&found) {
            return Err(lead_gone());
        }
        if !claim(&self.db, found.id, actor.id).await? {
            return Err(lead_gone());
        }
        lead_response::Entity::delete_many()
            .filter(lead_response::Column::BookingId.eq(found.id))
            .filter(lead_response::Column::VendorId.eq(actor.id))
            .exec(&self.db)
            .await?;

        let accepted = booking::Entity::find_by_id(found.id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Booking"))?;
        info!(event = "lead_accepted", booking = %accepted.booking_code);
        self.audit
            .record_detached(actor.audit(AuditAction::BookingAccepted).details(json!({ "bookingID": accepted.booking_code })));
        notify_quietly(
            &self.db,
            NewNotification {
                recipient_id: accepted.user_id,
                recipient_model: ActorModel::User,
                kind: NotificationType::BookingAccepted,
                title: "Booking accepted".into(),
                body: format!("A professional accepted booking {} and is on the way", accepted.booking_code),
                data: Some(json!({ "bookingId": accepted.id, "vendorId": actor.id })),
            },
        )
        .await;
        hydrate_one(&self.db, accepted).await
    }

    async fn triage(&self, vendor_id: Uuid, reference: &str, decision: LeadDecision) -> Result<lead_response::Model, ServiceError> {
        let found = find_by_reference(&self.db, reference, None).await?;
        if !is_open(&found) {
            return Err(lead_gone());
        }
        lead_response::Entity::delete_many()
            .filter(lead_response::Column::BookingId.eq(found.id))
            .filter(lead_response::Column::VendorId.eq(vendor_id))
            .exec(&self.db)
            .await?;
        let saved = lead_response::ActiveModel {
            id: Set(Uuid::new_v4()),
            booking_id: Set(found.id),
            vendor_id: Set(vendor_id),
            decision: Set(decision),
            created_at: Set(Utc::now().into()),
        }
        .insert(&self.db)
        .await?;
        Ok(saved)
    }

    /// Hide a lead from this vendor's open list.
    pub async fn reject_lead(&self, vendor_id: Uuid, reference: &str) -> Result<lead_response::Model, ServiceError> {
        self.triage(vendor_id, reference, LeadDecision::Rejected).await
    }

    /// Park a lead on this vendor's "later" list.
    pub async fn mark_lead_later(&self, vendor_id: Uuid, reference: &str) -> Result<lead_response::Model, ServiceError> {
        self.triage(vendor_id, reference, LeadDecision::Later).await
    }

    async fn lead_ids(&self, vendor_id: Uuid, decision: LeadDecision) -> Result<Vec<Uuid>, ServiceError> {
        Ok(lead_response::Entity::find()
            .filter(lead_response::Column::VendorId.eq(vendor_id))
            .filter(lead_response::Column::Decision.eq(decision))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|r| r.booking_id)
            .collect())
    }

    /// Unassigned bookings awaiting acceptance that this vendor has not rejected, newest first.
    pub async fn open_leads(&self, vendor_id: Uuid) -> Result<Vec<BookingView>, ServiceError> {
        let rejected = self.lead_ids(vendor_id, LeadDecision::Rejected).await?;
        let mut q = booking::Entity::find()
            .filter(booking::Column::Status.eq(BookingStatus::PendingAcceptance))
            .filter(booking::Column::VendorId.is_null());
        if !rejected.is_empty() {
            q = q.filter(booking::Column::Id.is_not_in(rejected));
        }
        let rows = q.order_by_desc(booking::Column::CreatedAt).all(&self.db).await?;
        hydrate(&self.db, rows).await
    }

    /// Leads parked for later that are still open.
    pub async fn vendor_later(&self, vendor_id: Uuid) -> Result<Vec<BookingView>, ServiceError> {
        let later = self.lead_ids(vendor_id, LeadDecision::Later).await?;
        if later.is_empty() {
            return Ok(Vec::new());
        }
        let rows = booking::Entity::find()
            .filter(booking::Column::Id.is_in(later))
            .filter(booking::Column::Status.eq(BookingStatus::PendingAcceptance))
            .filter(booking::Column::VendorId.is_null())
            .order_by_desc(booking::Column::CreatedAt)
            .all(&self.db)
            .await?;
        hydrate(&self.db, rows).await
    }

    pub async fn vendor_history(&self, vendor_id: Uuid) -> Result<VendorHistory, ServiceError> {
        let assigned = booking::Entity::find()
            .filter(booking::Column::VendorId.eq(vendor_id))
            .order_by_desc(booking::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(VendorHistory { bookings: hydrate(&self.db, assigned).await?, later: self.vendor_later(vendor_id).await? })
    }
}
