use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use models::enums::{BookingStatus, Role, StatusGroup};
use models::booking;

use super::views::{hydrate, hydrate_one, BookingView};
use super::{find_by_reference, BookingDetails, BookingService, CategorizedBookings};
use crate::errors::ServiceError;

impl BookingService {
    /// The caller's bookings grouped by status, newest first. Vendors see assigned bookings.
    pub async fn my_bookings(&self, account_id: Uuid, role: Role) -> Result<CategorizedBookings, ServiceError> {
        let column = if role == Role::Vendor { booking::Column::VendorId } else { booking::Column::UserId };
        let rows = booking::Entity::find()
            .filter(column.eq(account_id))
            .order_by_desc(booking::Column::CreatedAt)
            .all(&self.db)
            .await?;

        let mut out = CategorizedBookings::default();
        for view in hydrate(&self.db, rows).await? {
            match view.booking.status.group() {
                StatusGroup::Pending => out.pending.push(view),
                StatusGroup::Active => out.active.push(view),
                StatusGroup::Completed => out.completed.push(view),
                StatusGroup::Cancelled => out.cancelled.push(view),
            }
        }
        Ok(out)
    }

    /// Visible to the owning user, the assigned vendor and admins; anyone else gets a 404.
    /// The start code is included only for the owning user.
    pub async fn details(&self, reference: &str, account_id: Uuid, role: Role) -> Result<BookingDetails, ServiceError> {
        let found = find_by_reference(&self.db, reference, None).await?;
        let allowed = match role {
            Role::Admin | Role::SuperAdmin => true,
            Role::User => found.user_id == account_id,
            Role::Vendor => found.vendor_id == Some(account_id),
        };
        if !allowed {
            return Err(ServiceError::not_found("Booking"));
        }
        let otp = (role == Role::User).then(|| found.start_code.clone());
        Ok(BookingDetails { booking: hydrate_one(&self.db, found).await?, otp })
    }

    pub async fn completed_history(&self, user_id: Uuid) -> Result<Vec<BookingView>, ServiceError> {
        let rows = booking::Entity::find()
            .filter(booking::Column::UserId.eq(user_id))
            .filter(booking::Column::Status.eq(BookingStatus::Completed))
            .order_by_desc(booking::Column::CompletedAt)
            .all(&self.db)
            .await?;
        hydrate(&self.db, rows).await
    }
}
