use crate::db::connect_memory;
use crate::enums::{BookingStatus, Role, UserStatus};
use crate::{admin, booking, category, offering, user, vendor};
use anyhow::Result;
use chrono::{NaiveDate, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

pub(crate) fn new_user(phone: &str) -> user::NewUser {
    user::NewUser {
        phone_number: phone.to_string(),
        name: "Asha Rao".to_string(),
        email: Some("  Asha@Example.COM ".to_string()),
        pin_hash: "hash".to_string(),
    }
}

#[tokio::test]
async fn test_user_create_applies_defaults() -> Result<()> {
    let db = connect_memory().await?;

    let created = user::create(&db, new_user("+919800000001")).await?;
    assert_eq!(created.role, Role::User);
    assert_eq!(created.status, UserStatus::Active);
    assert_eq!(created.coins, user::DEFAULT_COINS);
    assert_eq!(created.country, "India");
    assert_eq!(created.email.as_deref(), Some("asha@example.com"));
    assert!(!created.is_verified);

    let found = user::find_by_phone(&db, "+919800000001").await?;
    assert_eq!(found.map(|u| u.id), Some(created.id));
    Ok(())
}

#[tokio::test]
async fn test_user_create_rejects_bad_phone() -> Result<()> {
    let db = connect_memory().await?;
    let err = user::create(&db, new_user("abc")).await.unwrap_err();
    assert_eq!(err.to_string(), "Invalid phone number format.");
    Ok(())
}

#[tokio::test]
async fn test_duplicate_phone_is_unique_violation() -> Result<()> {
    let db = connect_memory().await?;
    user::create(&db, new_user("+919800000002")).await?;
    let err = user::create(&db, new_user("+919800000002")).await.unwrap_err();
    match err {
        crate::errors::ModelError::Db(e) => assert!(matches!(
            e.sql_err(),
            Some(sea_orm::SqlErr::UniqueConstraintViolation(_))
        )),
        other => panic!("unexpected error: {other}"),
    }
    Ok(())
}

#[tokio::test]
async fn test_vendor_availability_flags() -> Result<()> {
    let db = connect_memory().await?;
    let created = vendor::create(
        &db,
        vendor::NewVendor {
            phone_number: "+919800000003".into(),
            name: "Ravi Kumar".into(),
            email: None,
            pin_hash: "hash".into(),
            work_state: Some("KA".into()),
            work_city: Some("Bengaluru".into()),
            work_pincodes: vec!["560001".into()],
        },
    )
    .await?;
    assert!(!created.is_available());

    let mut am: vendor::ActiveModel = created.into();
    am.duty_on = Set(true);
    am.is_verified = Set(true);
    let updated = am.update(&db).await?;
    assert!(updated.is_available());
    assert_eq!(updated.work_pincodes, serde_json::json!(["560001"]));
    Ok(())
}

#[tokio::test]
async fn test_admin_username_is_normalized() -> Result<()> {
    let db = connect_memory().await?;
    admin::create(
        &db,
        admin::NewAdmin {
            username: " Root ".into(),
            name: "Root".into(),
            email: None,
            phone_number: None,
            password_hash: "hash".into(),
            role: Role::SuperAdmin,
        },
    )
    .await?;
    let found = admin::find_by_username(&db, "ROOT").await?;
    assert_eq!(found.map(|a| a.role), Some(Role::SuperAdmin));

    let err = admin::create(
        &db,
        admin::NewAdmin {
            username: "someone".into(),
            name: "Someone".into(),
            email: None,
            phone_number: None,
            password_hash: "hash".into(),
            role: Role::User,
        },
    )
    .await;
    assert!(err.is_err());
    Ok(())
}

#[tokio::test]
async fn test_booking_round_trips_status_and_date() -> Result<()> {
    let db = connect_memory().await?;
    let owner = user::create(&db, new_user("+919800000004")).await?;
    let now = Utc::now();
    let cat = category::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set("Cleaning".into()),
        description: Set(None),
        icon: Set(None),
        membership_fee: Set(0.0),
        default_free_credits: Set(0),
        sort_order: Set(1),
        is_active: Set(true),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&db)
    .await?;
    offering::ActiveModel {
        id: Set(Uuid::new_v4()),
        category_id: Set(cat.id),
        subcategory_id: Set(None),
        title: Set("Deep clean".into()),
        description: Set(None),
        photo: Set(None),
        more_info: Set(None),
        admin_price: Set(Some(499.0)),
        is_admin_priced: Set(true),
        approx_completion_time: Set(Some(120)),
        is_active: Set(true),
        quantity_enabled: Set(true),
        price_adjustment_enabled: Set(false),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&db)
    .await?;

    let date = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
    let b = booking::ActiveModel {
        id: Set(Uuid::new_v4()),
        booking_code: Set(crate::codes::booking_code()),
        start_code: Set("1234".into()),
        user_id: Set(owner.id),
        vendor_id: Set(None),
        status: Set(BookingStatus::PendingAcceptance),
        scheduled_date: Set(date),
        scheduled_time: Set("10:00 AM".into()),
        address: Set("12 MG Road".into()),
        latitude: Set(None),
        longitude: Set(None),
        pincode: Set(Some("560001".into())),
        total_price: Set(499.0),
        base_price: Set(499.0),
        reschedule_count: Set(0),
        cancelled_by: Set(None),
        cancellation_reason: Set(None),
        cancelled_at: Set(None),
        accepted_at: Set(None),
        completed_at: Set(None),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&db)
    .await?;

    let found = booking::Entity::find()
        .filter(booking::Column::Status.eq(BookingStatus::PendingAcceptance))
        .one(&db)
        .await?
        .expect("booking");
    assert_eq!(found.id, b.id);
    assert_eq!(found.scheduled_date, date);
    Ok(())
}
