use std::collections::HashMap;

use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use serde::Serialize;
use uuid::Uuid;

use models::{booking, booking_item, offering, user, vendor};

use crate::errors::ServiceError;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceSummary {
    pub id: Uuid,
    pub title: String,
    pub is_admin_priced: bool,
    pub admin_price: Option<f64>,
    pub photo: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ItemView {
    #[serde(flatten)]
    pub item: booking_item::Model,
    pub service: Option<ServiceSummary>,
}

/// The other side of a booking as shown to clients.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PartyView {
    pub id: Uuid,
    pub name: String,
    pub phone_number: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BookingView {
    #[serde(flatten)]
    pub booking: booking::Model,
    pub services: Vec<ItemView>,
    pub user: Option<PartyView>,
    pub vendor: Option<PartyView>,
}

/// Attach items, service summaries and both parties, keeping input order.
pub(crate) async fn hydrate<C: ConnectionTrait>(db: &C, bookings: Vec<booking::Model>) -> Result<Vec<BookingView>, ServiceError> {
    if bookings.is_empty() {
        return Ok(Vec::new());
    }
    let booking_ids: Vec<Uuid> = bookings.iter().map(|b| b.id).collect();
    let items = booking_item::Entity::find()
        .filter(booking_item::Column::BookingId.is_in(booking_ids))
        .all(db)
        .await?;

    let service_ids: Vec<Uuid> = items.iter().map(|i| i.service_id).collect();
    let services: HashMap<Uuid, ServiceSummary> = offering::Entity::find()
        .filter(offering::Column::Id.is_in(service_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|s| {
            (
                s.id,
                ServiceSummary {
                    id: s.id,
                    title: s.title,
                    is_admin_priced: s.is_admin_priced,
                    admin_price: s.admin_price,
                    photo: s.photo,
                },
            )
        })
        .collect();

    let user_ids: Vec<Uuid> = bookings.iter().map(|b| b.user_id).collect();
    let users: HashMap<Uuid, PartyView> = user::Entity::find()
        .filter(user::Column::Id.is_in(user_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|u| (u.id, PartyView { id: u.id, name: u.name, phone_number: u.phone_number }))
        .collect();

    let vendor_ids: Vec<Uuid> = bookings.iter().filter_map(|b| b.vendor_id).collect();
    let vendors: HashMap<Uuid, PartyView> = if vendor_ids.is_empty() {
        HashMap::new()
    } else {
        vendor::Entity::find()
            .filter(vendor::Column::Id.is_in(vendor_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|v| (v.id, PartyView { id: v.id, name: v.name, phone_number: v.phone_number }))
            .collect()
    };

    let mut by_booking: HashMap<Uuid, Vec<ItemView>> = HashMap::new();
    for item in items {
        let service = services.get(&item.service_id).cloned();
        by_booking.entry(item.booking_id).or_default().push(ItemView { item, service });
    }

    Ok(bookings
        .into_iter()
        .map(|b| BookingView {
            services: by_booking.remove(&b.id).unwrap_or_default(),
            user: users.get(&b.user_id).cloned(),
            vendor: b.vendor_id.and_then(|id| vendors.get(&id).cloned()),
            booking: b,
        })
        .collect())
}

pub(crate) async fn hydrate_one<C: ConnectionTrait>(db: &C, booking: booking::Model) -> Result<BookingView, ServiceError> {
    hydrate(db, vec![booking])
        .await?
        .pop()
        .ok_or_else(|| ServiceError::not_found("Booking"))
}
