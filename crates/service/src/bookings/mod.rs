//! Booking lifecycle: creation, vendor search, lead triage, status progression,
//! cancellation and rescheduling.
//!
//! A booking is addressed either by its UUID or by its `B…` booking code.

mod leads;
mod lifecycle;
mod queries;
mod views;

#[cfg(test)]
mod tests;

use chrono::NaiveDate;
use sea_orm::{ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use models::booking;

use crate::audit::AuditService;
use crate::errors::ServiceError;
use crate::otp::OtpGenerator;

pub use views::{BookingView, ItemView, PartyView, ServiceSummary};

/// One requested service line; ids arrive as strings from clients.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceLine {
    pub service_id: String,
    pub quantity: Option<i32>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct NewBooking {
    pub services: Vec<ServiceLine>,
    pub date: String,
    pub time: String,
    pub address: String,
    pub total_price: Option<f64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub pincode: Option<String>,
    /// Start the vendor search immediately.
    pub confirmation: Option<bool>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VendorMatch {
    pub vendor_id: Uuid,
    /// Always 0 until geo matching exists.
    pub distance: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RetryOutcome {
    pub found: bool,
    pub count: usize,
    #[serde(rename = "bookingID")]
    pub booking_code: String,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct CategorizedBookings {
    pub pending: Vec<BookingView>,
    pub active: Vec<BookingView>,
    pub completed: Vec<BookingView>,
    pub cancelled: Vec<BookingView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BookingDetails {
    pub booking: BookingView,
    /// Code the user reads out to the vendor when work starts. Only the user sees it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub otp: Option<String>,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct VendorHistory {
    pub bookings: Vec<BookingView>,
    pub later: Vec<BookingView>,
}

#[derive(Clone)]
pub struct BookingService {
    db: DatabaseConnection,
    audit: AuditService,
    otp: OtpGenerator,
}

impl BookingService {
    pub fn new(db: DatabaseConnection, audit: AuditService, otp: OtpGenerator) -> Self {
        Self { db, audit, otp }
    }
}

/// Match a booking by UUID or by booking code.
pub(crate) fn reference_condition(reference: &str) -> Condition {
    match Uuid::parse_str(reference) {
        Ok(id) => Condition::any()
            .add(booking::Column::Id.eq(id))
            .add(booking::Column::BookingCode.eq(reference)),
        Err(_) => Condition::all().add(booking::Column::BookingCode.eq(reference)),
    }
}

pub(crate) async fn find_by_reference<C: ConnectionTrait>(
    db: &C,
    reference: &str,
    owner: Option<Uuid>,
) -> Result<booking::Model, ServiceError> {
    let mut q = booking::Entity::find().filter(reference_condition(reference));
    if let Some(user_id) = owner {
        q = q.filter(booking::Column::UserId.eq(user_id));
    }
    q.one(db).await?.ok_or_else(|| ServiceError::not_found("Booking"))
}

/// `YYYY-MM-DD`, or the date part of an RFC 3339 timestamp.
pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, ServiceError> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| chrono::DateTime::parse_from_rfc3339(raw).map(|dt| dt.date_naive()))
        .map_err(|_| ServiceError::Validation("Invalid date format provided".into()))
}
