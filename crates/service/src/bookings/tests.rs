use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use uuid::Uuid;

use models::enums::{BookingStatus, NotificationType, Role};
use models::notification;

use super::*;
use crate::audit::{Actor, AuditService};
use crate::otp::OtpGenerator;
use crate::test_support::{self, CatalogFixture};

async fn setup() -> (DatabaseConnection, BookingService, CatalogFixture) {
    let db = test_support::get_db().await.unwrap();
    let svc = BookingService::new(db.clone(), AuditService::new(db.clone()), OtpGenerator::new(true));
    let catalog = test_support::catalog_fixture(&db).await;
    (db, svc, catalog)
}

fn request(catalog: &CatalogFixture) -> NewBooking {
    NewBooking {
        services: vec![
            ServiceLine { service_id: catalog.priced.id.to_string(), quantity: Some(2) },
            ServiceLine { service_id: catalog.quoted.id.to_string(), quantity: None },
        ],
        date: "2030-01-15".into(),
        time: "10:00 AM".into(),
        address: "12 MG Road".into(),
        total_price: Some(500.0),
        pincode: Some("560001".into()),
        ..Default::default()
    }
}

#[tokio::test]
async fn create_prices_items_and_awaits_acceptance() {
    let (db, svc, catalog) = setup().await;
    let owner = test_support::user_fixture(&db, "+919700000010").await;
    let view = svc.create(&Actor::new(owner.id, Role::User), request(&catalog)).await.unwrap();

    assert_eq!(view.booking.status, BookingStatus::PendingAcceptance);
    assert!(view.booking.booking_code.starts_with('B'));
    assert_eq!(view.booking.total_price, 500.0);
    assert_eq!(view.services.len(), 2);
    let priced = view.services.iter().find(|i| i.item.service_id == catalog.priced.id).unwrap();
    assert_eq!(priced.item.final_price, 500.0);
    assert!(priced.item.is_price_confirmed);
    let quoted = view.services.iter().find(|i| i.item.service_id == catalog.quoted.id).unwrap();
    assert_eq!(quoted.item.final_price, 0.0);
    assert_eq!(quoted.item.quantity, 1);
    assert!(!quoted.item.is_price_confirmed);
    assert_eq!(view.user.as_ref().map(|u| u.id), Some(owner.id));
    assert_eq!(quoted.service.as_ref().map(|s| s.title.as_str()), Some("Deep Cleaning"));
}

#[tokio::test]
async fn zero_admin_price_is_not_a_confirmed_price() {
    let (db, svc, catalog) = setup().await;
    let owner = test_support::user_fixture(&db, "+919700000044").await;
    let free = test_support::offering_fixture(&db, &catalog.category, None, "Inspection", Some(0.0)).await;
    let view = svc
        .create(
            &Actor::new(owner.id, Role::User),
            NewBooking {
                services: vec![ServiceLine { service_id: free.id.to_string(), quantity: Some(3) }],
                ..request(&catalog)
            },
        )
        .await
        .unwrap();

    let item = &view.services[0].item;
    assert_eq!(item.admin_price, Some(0.0));
    assert_eq!(item.final_price, 0.0);
    assert!(!item.is_price_confirmed);
}

#[tokio::test]
async fn create_rejects_empty_and_unknown_services() {
    let (db, svc, catalog) = setup().await;
    let owner = test_support::user_fixture(&db, "+919700000011").await;
    let actor = Actor::new(owner.id, Role::User);

    let mut empty = request(&catalog);
    empty.services.clear();
    let err = svc.create(&actor, empty).await.unwrap_err();
    assert!(matches!(err, ServiceError::Validation(ref m) if m == "At least one service is required for booking"));

    let ghost = Uuid::new_v4();
    let mut unknown = request(&catalog);
    unknown.services = vec![ServiceLine { service_id: ghost.to_string(), quantity: None }];
    let err = svc.create(&actor, unknown).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(ref m) if *m == format!("Service with ID {ghost} not found")));

    let mut malformed = request(&catalog);
    malformed.services = vec![ServiceLine { service_id: "abc".into(), quantity: None }];
    let err = svc.create(&actor, malformed).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(ref m) if m == "Service with ID abc not found"));

    let mut bad_date = request(&catalog);
    bad_date.date = "next tuesday".into();
    assert!(matches!(svc.create(&actor, bad_date).await, Err(ServiceError::Validation(_))));
}

#[tokio::test]
async fn reschedule_is_limited_to_two() {
    let (db, svc, catalog) = setup().await;
    let owner = test_support::user_fixture(&db, "+919700000012").await;
    let view = svc.create(&Actor::new(owner.id, Role::User), request(&catalog)).await.unwrap();
    let code = view.booking.booking_code.clone();

    let err = svc.reschedule(owner.id, &code, Some("2030-02-01"), None).await.unwrap_err();
    assert!(matches!(err, ServiceError::Validation(ref m) if m == "Both date and time are required for rescheduling"));
    let err = svc.reschedule(owner.id, &code, Some("01/02/2030"), Some("9 AM")).await.unwrap_err();
    assert!(matches!(err, ServiceError::Validation(ref m) if m == "Invalid date format provided"));

    let first = svc.reschedule(owner.id, &code, Some("2030-02-01"), Some("9 AM")).await.unwrap();
    assert_eq!(first.reschedule_count, 1);
    assert_eq!(first.scheduled_date.to_string(), "2030-02-01");
    let second = svc
        .reschedule(owner.id, &view.booking.id.to_string(), Some("2030-02-02T08:00:00Z"), Some("8 AM"))
        .await
        .unwrap();
    assert_eq!(second.reschedule_count, 2);

    let err = svc.reschedule(owner.id, &code, Some("2030-02-03"), Some("8 AM")).await.unwrap_err();
    assert!(matches!(err, ServiceError::Validation(ref m) if m == "Maximum reschedule limit (2) reached for this booking"));
}

#[tokio::test]
async fn cancel_is_owner_only_and_final() {
    let (db, svc, catalog) = setup().await;
    let owner = test_support::user_fixture(&db, "+919700000013").await;
    let other = test_support::user_fixture(&db, "+919700000014").await;
    let view = svc.create(&Actor::new(owner.id, Role::User), request(&catalog)).await.unwrap();
    let code = view.booking.booking_code.clone();

    let err = svc.cancel(&Actor::new(other.id, Role::User), &code, None).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(ref m) if m == "Booking not found"));

    let cancelled = svc.cancel(&Actor::new(owner.id, Role::User), &code, Some("changed plans".into())).await.unwrap();
    assert_eq!(cancelled.status, BookingStatus::Cancelled);
    assert_eq!(cancelled.cancelled_by.as_deref(), Some("user"));
    assert!(cancelled.cancelled_at.is_some());

    let err = svc.cancel(&Actor::new(owner.id, Role::User), &code, None).await.unwrap_err();
    assert!(matches!(err, ServiceError::Validation(ref m) if m == "Booking is already cancelled"));
    let err = svc.reschedule(owner.id, &code, Some("2030-02-01"), Some("9 AM")).await.unwrap_err();
    assert!(matches!(err, ServiceError::Validation(ref m) if m == "Cannot reschedule a completed or cancelled booking"));
    let err = svc.retry_search(owner.id, &code).await.unwrap_err();
    assert!(matches!(err, ServiceError::Validation(ref m) if m == "Search can only be retried for pending bookings"));
}

#[tokio::test]
async fn search_alerts_only_available_vendors() {
    let (db, svc, catalog) = setup().await;
    let owner = test_support::user_fixture(&db, "+919700000015").await;
    let on_duty = test_support::vendor_fixture(&db, "+919600000001", true).await;
    let off_duty = test_support::vendor_fixture(&db, "+919600000002", false).await;
    let view = svc.create(&Actor::new(owner.id, Role::User), request(&catalog)).await.unwrap();

    let outcome = svc.retry_search(owner.id, &view.booking.booking_code).await.unwrap();
    assert!(outcome.found);
    assert_eq!(outcome.count, 1);
    assert_eq!(outcome.booking_code, view.booking.booking_code);

    let alerts = notification::Entity::find()
        .filter(notification::Column::Kind.eq(NotificationType::BookingAlert))
        .all(&db)
        .await
        .unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].recipient_id, on_duty.id);
    assert!(alerts.iter().all(|a| a.recipient_id != off_duty.id));
}

#[tokio::test]
async fn lead_acceptance_and_status_progression() {
    let (db, svc, catalog) = setup().await;
    let owner = test_support::user_fixture(&db, "+919700000016").await;
    let first = test_support::vendor_fixture(&db, "+919600000003", true).await;
    let second = test_support::vendor_fixture(&db, "+919600000004", true).await;
    let pending = test_support::vendor_fixture(&db, "+919600000005", false).await;
    let user = Actor::new(owner.id, Role::User);
    let vendor = Actor::new(first.id, Role::Vendor);
    let view = svc.create(&user, request(&catalog)).await.unwrap();
    let code = view.booking.booking_code.clone();

    let err = svc.accept_lead(&Actor::new(pending.id, Role::Vendor), &code).await.unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden(_)));

    let accepted = svc.accept_lead(&vendor, &code).await.unwrap();
    assert_eq!(accepted.booking.status, BookingStatus::OnTheWay);
    assert_eq!(accepted.booking.vendor_id, Some(first.id));
    assert!(accepted.booking.accepted_at.is_some());
    assert_eq!(accepted.vendor.as_ref().map(|v| v.id), Some(first.id));

    let err = svc.accept_lead(&Actor::new(second.id, Role::Vendor), &code).await.unwrap_err();
    assert!(matches!(err, ServiceError::Validation(ref m) if m == "Lead is no longer available"));

    let err = svc.update_status(&vendor, &code, BookingStatus::Completed).await.unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
    let err = svc.update_status(&Actor::new(second.id, Role::Vendor), &code, BookingStatus::Arrived).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));

    svc.update_status(&vendor, &code, BookingStatus::Arrived).await.unwrap();
    let mine = svc.my_bookings(first.id, Role::Vendor).await.unwrap();
    assert_eq!(mine.active.len(), 1);
    svc.update_status(&vendor, &code, BookingStatus::Ongoing).await.unwrap();
    let done = svc.update_status(&vendor, &code, BookingStatus::Completed).await.unwrap();
    assert!(done.completed_at.is_some());

    let grouped = svc.my_bookings(owner.id, Role::User).await.unwrap();
    assert_eq!(grouped.completed.len(), 1);
    assert!(grouped.pending.is_empty() && grouped.active.is_empty());
    assert_eq!(svc.completed_history(owner.id).await.unwrap().len(), 1);

    let user_alerts = crate::notifications::list_for(&db, owner.id).await.unwrap();
    assert!(user_alerts.iter().any(|n| n.kind == NotificationType::BookingAccepted));
    assert!(user_alerts.iter().any(|n| n.kind == NotificationType::BookingCompleted));
}

#[tokio::test]
async fn lead_claim_loses_once_another_vendor_holds_it() {
    let (db, svc, catalog) = setup().await;
    let owner = test_support::user_fixture(&db, "+919700000042").await;
    let first = test_support::vendor_fixture(&db, "+919600000042", true).await;
    let second = test_support::vendor_fixture(&db, "+919600000043", true).await;
    let view = svc.create(&Actor::new(owner.id, Role::User), request(&catalog)).await.unwrap();

    // Both vendors saw the lead open; only the first conditional update lands.
    assert!(super::leads::claim(&db, view.booking.id, first.id).await.unwrap());
    assert!(!super::leads::claim(&db, view.booking.id, second.id).await.unwrap());
    let row = models::booking::Entity::find_by_id(view.booking.id).one(&db).await.unwrap().unwrap();
    assert_eq!(row.vendor_id, Some(first.id));
    assert_eq!(row.status, BookingStatus::OnTheWay);
}

#[tokio::test]
async fn concurrent_accepts_have_one_winner() {
    let (db, svc, catalog) = setup().await;
    let owner = test_support::user_fixture(&db, "+919700000043").await;
    let first = test_support::vendor_fixture(&db, "+919600000044", true).await;
    let second = test_support::vendor_fixture(&db, "+919600000045", true).await;
    let view = svc.create(&Actor::new(owner.id, Role::User), request(&catalog)).await.unwrap();
    let code = view.booking.booking_code.clone();

    let first_actor = Actor::new(first.id, Role::Vendor);
    let second_actor = Actor::new(second.id, Role::Vendor);
    let (a, b) = tokio::join!(
        svc.accept_lead(&first_actor, &code),
        svc.accept_lead(&second_actor, &code),
    );
    assert_eq!([a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count(), 1);
    let loser = if a.is_ok() { b } else { a };
    assert!(matches!(loser, Err(ServiceError::Validation(ref m)) if m == "Lead is no longer available"));
    let winner = svc.details(&code, owner.id, Role::User).await.unwrap().booking.booking.vendor_id;
    assert!(winner == Some(first.id) || winner == Some(second.id));
}

#[tokio::test]
async fn details_are_limited_to_parties_and_admins() {
    let (db, svc, catalog) = setup().await;
    let owner = test_support::user_fixture(&db, "+919700000017").await;
    let stranger = test_support::user_fixture(&db, "+919700000018").await;
    let view = svc.create(&Actor::new(owner.id, Role::User), request(&catalog)).await.unwrap();
    let id = view.booking.id.to_string();

    let details = svc.details(&id, owner.id, Role::User).await.unwrap();
    assert_eq!(details.otp.as_deref(), Some("1234"));
    assert_eq!(details.booking.booking.id, view.booking.id);
    let admin_view = svc.details(&id, Uuid::new_v4(), Role::Admin).await.unwrap();
    assert!(admin_view.otp.is_none());
    let body = serde_json::to_value(&admin_view).unwrap();
    assert!(body.get("otp").is_none());
    assert!(body["booking"].get("startCode").is_none() && body["booking"].get("start_code").is_none());
    assert!(matches!(svc.details(&id, stranger.id, Role::User).await, Err(ServiceError::NotFound(_))));
    assert!(matches!(svc.details(&id, stranger.id, Role::Vendor).await, Err(ServiceError::NotFound(_))));
    assert!(matches!(svc.details("B000000FFFF", owner.id, Role::User).await, Err(ServiceError::NotFound(_))));
}

#[tokio::test]
async fn start_codes_are_random_per_booking_and_hidden_from_vendor() {
    let db = test_support::get_db().await.unwrap();
    let catalog = test_support::catalog_fixture(&db).await;
    let svc = BookingService::new(db.clone(), AuditService::new(db.clone()), OtpGenerator::new(false));
    let owner = test_support::user_fixture(&db, "+919700000041").await;
    let v = test_support::vendor_fixture(&db, "+919600000041", true).await;
    let user = Actor::new(owner.id, Role::User);

    let mut codes = std::collections::HashSet::new();
    for _ in 0..6 {
        let view = svc.create(&user, request(&catalog)).await.unwrap();
        let code = svc.details(&view.booking.id.to_string(), owner.id, Role::User).await.unwrap().otp.unwrap();
        assert_eq!(code.len(), 4);
        codes.insert(code);
    }
    assert!(codes.len() > 1);

    let view = svc.create(&user, request(&catalog)).await.unwrap();
    let id = view.booking.id.to_string();
    svc.accept_lead(&Actor::new(v.id, Role::Vendor), &id).await.unwrap();
    let vendor_view = svc.details(&id, v.id, Role::Vendor).await.unwrap();
    assert!(vendor_view.otp.is_none());
}

#[tokio::test]
async fn rejected_and_later_leads_are_filtered() {
    let (db, svc, catalog) = setup().await;
    let owner = test_support::user_fixture(&db, "+919700000019").await;
    let v = test_support::vendor_fixture(&db, "+919600000006", true).await;
    let user = Actor::new(owner.id, Role::User);
    let a = svc.create(&user, request(&catalog)).await.unwrap();
    let b = svc.create(&user, request(&catalog)).await.unwrap();
    let c = svc.create(&user, request(&catalog)).await.unwrap();

    assert_eq!(svc.open_leads(v.id).await.unwrap().len(), 3);
    svc.reject_lead(v.id, &a.booking.booking_code).await.unwrap();
    svc.mark_lead_later(v.id, &b.booking.booking_code).await.unwrap();

    let open: Vec<Uuid> = svc.open_leads(v.id).await.unwrap().into_iter().map(|l| l.booking.id).collect();
    assert_eq!(open.len(), 2);
    assert!(!open.contains(&a.booking.id));

    let later = svc.vendor_later(v.id).await.unwrap();
    assert_eq!(later.len(), 1);
    assert_eq!(later[0].booking.id, b.booking.id);

    svc.accept_lead(&Actor::new(v.id, Role::Vendor), &c.booking.booking_code).await.unwrap();
    let history = svc.vendor_history(v.id).await.unwrap();
    assert_eq!(history.bookings.len(), 1);
    assert_eq!(history.later.len(), 1);

    svc.cancel(&user, &b.booking.booking_code, None).await.unwrap();
    assert!(svc.vendor_later(v.id).await.unwrap().is_empty());
    assert!(matches!(
        svc.reject_lead(v.id, &b.booking.booking_code).await,
        Err(ServiceError::Validation(_))
    ));
}

#[tokio::test]
async fn disputes_need_a_reason_and_ownership() {
    let (db, svc, catalog) = setup().await;
    let owner = test_support::user_fixture(&db, "+919700000020").await;
    let view = svc.create(&Actor::new(owner.id, Role::User), request(&catalog)).await.unwrap();
    let code = view.booking.booking_code.clone();

    assert!(matches!(svc.raise_dispute(owner.id, &code, "  ").await, Err(ServiceError::Validation(_))));
    assert!(matches!(svc.raise_dispute(Uuid::new_v4(), &code, "late").await, Err(ServiceError::NotFound(_))));
    let d = svc.raise_dispute(owner.id, &code, "vendor never arrived").await.unwrap();
    assert_eq!(d.booking_id, view.booking.id);
}

#[test]
fn parse_date_accepts_plain_and_rfc3339() {
    assert_eq!(parse_date("2030-01-02").unwrap().to_string(), "2030-01-02");
    assert_eq!(parse_date("2030-01-02T23:00:00+05:30").unwrap().to_string(), "2030-01-02");
    assert!(parse_date("02-01-2030").is_err());
}
