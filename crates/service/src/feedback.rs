//! Ratings and reviews of completed bookings.
use std::collections::HashMap;

use chrono::Utc;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use models::enums::BookingStatus;
use models::{booking, feedback, user, validation, vendor};

use crate::bookings::find_by_reference;
use crate::errors::ServiceError;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackInput {
    pub booking_id: String,
    pub rating: i32,
    #[serde(default)]
    pub review: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewEntry {
    pub id: Uuid,
    pub rating: i32,
    pub review: String,
    pub user_name: String,
    /// Booking code, not the row id.
    pub booking_id: Option<String>,
    pub created_at: DateTimeWithTimeZone,
}

/// One of the caller's own reviews.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserReview {
    pub id: Uuid,
    pub rating: i32,
    pub review: String,
    pub vendor_name: String,
    pub booking_id: Option<String>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorFeedback {
    pub average_rating: f64,
    pub total_reviews: usize,
    pub feedbacks: Vec<ReviewEntry>,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackCheck {
    pub has_feedback: bool,
}

/// Rate a completed booking; one entry per booking and user.
#[instrument(skip(db, input), fields(user_id = %user_id))]
pub async fn submit<C: ConnectionTrait>(db: &C, user_id: Uuid, input: FeedbackInput) -> Result<feedback::Model, ServiceError> {
    validation::rating(input.rating)?;
    let review = input.review.unwrap_or_default();
    validation::review(&review)?;

    let found = find_by_reference(db, &input.booking_id, Some(user_id)).await?;
    if found.status != BookingStatus::Completed {
        return Err(ServiceError::Validation("Feedback can only be submitted for completed bookings".into()));
    }
    let vendor_id = found
        .vendor_id
        .ok_or_else(|| ServiceError::Validation("Booking has no assigned vendor".into()))?;
    let existing = feedback::Entity::find()
        .filter(feedback::Column::BookingId.eq(found.id))
        .filter(feedback::Column::UserId.eq(user_id))
        .count(db)
        .await?;
    if existing > 0 {
        return Err(ServiceError::Validation("Feedback already submitted for this booking".into()));
    }

    let now = Utc::now();
    let created = feedback::ActiveModel {
        id: Set(Uuid::new_v4()),
        booking_id: Set(found.id),
        user_id: Set(user_id),
        vendor_id: Set(vendor_id),
        rating: Set(input.rating),
        review: Set(review.trim().to_string()),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(db)
    .await?;
    info!(event = "feedback_submitted", booking_id = %found.id, rating = created.rating);
    Ok(created)
}

/// Average rating rounded to one decimal plus every review, newest first.
pub async fn vendor_feedback<C: ConnectionTrait>(db: &C, vendor_id: Uuid) -> Result<VendorFeedback, ServiceError> {
    let rows = feedback::Entity::find()
        .filter(feedback::Column::VendorId.eq(vendor_id))
        .order_by_desc(feedback::Column::CreatedAt)
        .all(db)
        .await?;

    let user_ids: Vec<Uuid> = rows.iter().map(|f| f.user_id).collect();
    let names: HashMap<Uuid, String> = if user_ids.is_empty() {
        HashMap::new()
    } else {
        user::Entity::find()
            .filter(user::Column::Id.is_in(user_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|u| (u.id, u.name))
            .collect()
    };
    let codes = booking_codes(db, &rows).await?;

    let total_reviews = rows.len();
    let average_rating = if total_reviews == 0 {
        0.0
    } else {
        let sum: i32 = rows.iter().map(|f| f.rating).sum();
        (sum as f64 / total_reviews as f64 * 10.0).round() / 10.0
    };
    let feedbacks = rows
        .into_iter()
        .map(|f| ReviewEntry {
            id: f.id,
            rating: f.rating,
            user_name: display_name(names.get(&f.user_id), "User"),
            booking_id: codes.get(&f.booking_id).cloned(),
            review: f.review,
            created_at: f.created_at,
        })
        .collect();
    Ok(VendorFeedback { average_rating, total_reviews, feedbacks })
}

/// The caller's reviews, newest first, with the vendor's name and the booking code.
pub async fn my_feedback<C: ConnectionTrait>(db: &C, user_id: Uuid) -> Result<Vec<UserReview>, ServiceError> {
    let rows = feedback::Entity::find()
        .filter(feedback::Column::UserId.eq(user_id))
        .order_by_desc(feedback::Column::CreatedAt)
        .all(db)
        .await?;
    let vendor_ids: Vec<Uuid> = rows.iter().map(|f| f.vendor_id).collect();
    let names: HashMap<Uuid, String> = if vendor_ids.is_empty() {
        HashMap::new()
    } else {
        vendor::Entity::find()
            .filter(vendor::Column::Id.is_in(vendor_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|v| (v.id, v.name))
            .collect()
    };
    let codes = booking_codes(db, &rows).await?;
    Ok(rows
        .into_iter()
        .map(|f| UserReview {
            id: f.id,
            rating: f.rating,
            vendor_name: display_name(names.get(&f.vendor_id), "Vendor"),
            booking_id: codes.get(&f.booking_id).cloned(),
            review: f.review,
            created_at: f.created_at,
        })
        .collect())
}

async fn booking_codes<C: ConnectionTrait>(db: &C, rows: &[feedback::Model]) -> Result<HashMap<Uuid, String>, ServiceError> {
    if rows.is_empty() {
        return Ok(HashMap::new());
    }
    let ids: Vec<Uuid> = rows.iter().map(|f| f.booking_id).collect();
    Ok(booking::Entity::find()
        .filter(booking::Column::Id.is_in(ids))
        .all(db)
        .await?
        .into_iter()
        .map(|b| (b.id, b.booking_code))
        .collect())
}

fn display_name(name: Option<&String>, fallback: &str) -> String {
    name.filter(|n| !n.trim().is_empty()).cloned().unwrap_or_else(|| fallback.to_string())
}

pub async fn check<C: ConnectionTrait>(db: &C, user_id: Uuid, reference: &str) -> Result<FeedbackCheck, ServiceError> {
    let found: booking::Model = find_by_reference(db, reference, Some(user_id)).await?;
    let count = feedback::Entity::find()
        .filter(feedback::Column::BookingId.eq(found.id))
        .filter(feedback::Column::UserId.eq(user_id))
        .count(db)
        .await?;
    Ok(FeedbackCheck { has_feedback: count > 0 })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::{Actor, AuditService};
    use crate::bookings::{BookingService, NewBooking, ServiceLine};
    use crate::otp::OtpGenerator;
    use crate::test_support;
    use models::enums::Role;

    async fn completed_booking(db: &sea_orm::DatabaseConnection) -> (Uuid, Uuid, booking::Model) {
        let fx = test_support::catalog_fixture(db).await;
        let owner = test_support::user_fixture(db, "+919700000040").await;
        let vendor = test_support::vendor_fixture(db, "+919800000040", true).await;
        let svc = BookingService::new(db.clone(), AuditService::new(db.clone()), OtpGenerator::new(true));
        let view = svc
            .create(
                &Actor::new(owner.id, Role::User),
                NewBooking {
                    services: vec![ServiceLine { service_id: fx.priced.id.to_string(), quantity: Some(1) }],
                    date: "2030-04-01".into(),
                    time: "09:00".into(),
                    address: "4 Lake Rd".into(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let vendor_actor = Actor::new(vendor.id, Role::Vendor);
        let code = view.booking.booking_code.clone();
        svc.accept_lead(&vendor_actor, &code).await.unwrap();
        for next in [BookingStatus::Arrived, BookingStatus::Ongoing] {
            svc.update_status(&vendor_actor, &code, next).await.unwrap();
        }
        (owner.id, vendor.id, view.booking)
    }

    async fn completed_row(db: &sea_orm::DatabaseConnection, user_id: Uuid, vendor_id: Uuid) -> Uuid {
        let now = Utc::now();
        booking::ActiveModel {
            id: Set(Uuid::new_v4()),
            booking_code: Set(models::codes::booking_code()),
            start_code: Set("1234".into()),
            user_id: Set(user_id),
            vendor_id: Set(Some(vendor_id)),
            status: Set(BookingStatus::Completed),
            scheduled_date: Set(now.date_naive()),
            scheduled_time: Set("10:00".into()),
            address: Set("4 Lake Rd".into()),
            latitude: Set(None),
            longitude: Set(None),
            pincode: Set(None),
            total_price: Set(0.0),
            base_price: Set(0.0),
            reschedule_count: Set(0),
            cancelled_by: Set(None),
            cancellation_reason: Set(None),
            cancelled_at: Set(None),
            accepted_at: Set(Some(now.into())),
            completed_at: Set(Some(now.into())),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(db)
        .await
        .unwrap()
        .id
    }

    #[tokio::test]
    async fn only_completed_bookings_accept_feedback_once() {
        let db = test_support::get_db().await.unwrap();
        let (user_id, vendor_id, booked) = completed_booking(&db).await;
        let input = FeedbackInput { booking_id: booked.id.to_string(), rating: 4, review: Some("Tidy work".into()) };

        let err = submit(&db, user_id, input.clone()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(ref m) if m == "Feedback can only be submitted for completed bookings"));

        let svc = BookingService::new(db.clone(), AuditService::new(db.clone()), OtpGenerator::new(true));
        svc.update_status(&Actor::new(vendor_id, Role::Vendor), &booked.booking_code, BookingStatus::Completed)
            .await
            .unwrap();

        let saved = submit(&db, user_id, input.clone()).await.unwrap();
        assert_eq!(saved.vendor_id, vendor_id);
        let err = submit(&db, user_id, input).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(ref m) if m == "Feedback already submitted for this booking"));

        assert!(check(&db, user_id, &booked.booking_code).await.unwrap().has_feedback);
        let mine = my_feedback(&db, user_id).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].booking_id.as_deref(), Some(booked.booking_code.as_str()));
        assert_eq!(mine[0].rating, 4);
        assert!(!mine[0].vendor_name.is_empty());
    }

    #[tokio::test]
    async fn rating_and_ownership_rules() {
        let db = test_support::get_db().await.unwrap();
        let (user_id, _, booked) = completed_booking(&db).await;
        let stranger = test_support::user_fixture(&db, "+919700000041").await;

        let bad = FeedbackInput { booking_id: booked.id.to_string(), rating: 6, review: None };
        assert!(matches!(submit(&db, user_id, bad).await, Err(ServiceError::Validation(_))));

        let long = FeedbackInput { booking_id: booked.id.to_string(), rating: 3, review: Some("x".repeat(1001)) };
        assert!(matches!(submit(&db, user_id, long).await, Err(ServiceError::Validation(_))));

        let foreign = FeedbackInput { booking_id: booked.id.to_string(), rating: 3, review: None };
        assert!(matches!(submit(&db, stranger.id, foreign).await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn vendor_summary_rounds_average() {
        let db = test_support::get_db().await.unwrap();
        let (user_id, vendor_id, booked) = completed_booking(&db).await;
        let empty = vendor_feedback(&db, vendor_id).await.unwrap();
        assert_eq!(empty.total_reviews, 0);
        assert_eq!(empty.average_rating, 0.0);

        let now = Utc::now();
        let mut booking_ids = vec![booked.id];
        for _ in 0..2 {
            booking_ids.push(completed_row(&db, user_id, vendor_id).await);
        }
        for (rating, booking_id) in [5, 4, 4].into_iter().zip(booking_ids) {
            feedback::ActiveModel {
                id: Set(Uuid::new_v4()),
                booking_id: Set(booking_id),
                user_id: Set(user_id),
                vendor_id: Set(vendor_id),
                rating: Set(rating),
                review: Set(String::new()),
                created_at: Set(now.into()),
                updated_at: Set(now.into()),
            }
            .insert(&db)
            .await
            .unwrap();
        }
        let summary = vendor_feedback(&db, vendor_id).await.unwrap();
        assert_eq!(summary.total_reviews, 3);
        assert_eq!(summary.average_rating, 4.3);
        assert_eq!(summary.feedbacks[0].user_name, "Test User");
        assert!(summary.feedbacks.iter().any(|f| f.booking_id.as_deref() == Some(booked.booking_code.as_str())));
        assert!(summary.feedbacks.iter().all(|f| f.booking_id.as_ref().is_some_and(|c| c.starts_with('B'))));
    }

    #[tokio::test]
    async fn reviews_fall_back_to_placeholder_names() {
        use sea_orm::sea_query::Expr;

        let db = test_support::get_db().await.unwrap();
        let (user_id, vendor_id, _) = completed_booking(&db).await;
        let booking_id = completed_row(&db, user_id, vendor_id).await;
        let now = Utc::now();
        feedback::ActiveModel {
            id: Set(Uuid::new_v4()),
            booking_id: Set(booking_id),
            user_id: Set(user_id),
            vendor_id: Set(vendor_id),
            rating: Set(5),
            review: Set("Great".into()),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(&db)
        .await
        .unwrap();
        user::Entity::update_many().col_expr(user::Column::Name, Expr::value("")).exec(&db).await.unwrap();
        vendor::Entity::update_many().col_expr(vendor::Column::Name, Expr::value("")).exec(&db).await.unwrap();

        let summary = vendor_feedback(&db, vendor_id).await.unwrap();
        assert_eq!(summary.feedbacks[0].user_name, "User");
        let mine = my_feedback(&db, user_id).await.unwrap();
        assert_eq!(mine[0].vendor_name, "Vendor");
        assert_eq!(mine[0].review, "Great");
    }
}
