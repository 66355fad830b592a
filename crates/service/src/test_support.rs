#![cfg(test)]
//! Fresh migrated in-memory database per test plus small fixtures.
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, IntoActiveModel, Set};
use uuid::Uuid;

use models::{category, offering, subcategory, user, vendor};

pub async fn get_db() -> Result<DatabaseConnection, anyhow::Error> {
    models::db::connect_memory().await
}

pub async fn user_fixture(db: &DatabaseConnection, phone: &str) -> user::Model {
    user::create(
        db,
        user::NewUser {
            phone_number: phone.to_string(),
            name: "Test User".into(),
            email: Some("user@example.com".into()),
            pin_hash: "unused".into(),
        },
    )
    .await
    .expect("create user fixture")
}

/// Vendor that is on duty, verified and eligible for leads when `available`.
pub async fn vendor_fixture(db: &DatabaseConnection, phone: &str, available: bool) -> vendor::Model {
    let created = vendor::create(
        db,
        vendor::NewVendor {
            phone_number: phone.to_string(),
            name: "Test Vendor".into(),
            email: None,
            pin_hash: "unused".into(),
            work_state: Some("KA".into()),
            work_city: Some("Bengaluru".into()),
            work_pincodes: vec!["560001".into()],
        },
    )
    .await
    .expect("create vendor fixture");
    let mut am = created.into_active_model();
    am.phone_verified = Set(true);
    am.is_verified = Set(available);
    am.duty_on = Set(available);
    am.update(db).await.expect("update vendor fixture")
}

pub struct CatalogFixture {
    pub category: category::Model,
    pub subcategory: subcategory::Model,
    /// Admin-priced at 250.
    pub priced: offering::Model,
    /// No admin price.
    pub quoted: offering::Model,
}

pub async fn catalog_fixture(db: &DatabaseConnection) -> CatalogFixture {
    let now = Utc::now();
    let category = category::ActiveModel {
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
    .insert(db)
    .await
    .expect("category fixture");
    let subcategory = subcategory::ActiveModel {
        id: Set(Uuid::new_v4()),
        category_id: Set(category.id),
        name: Set("Home".into()),
        description: Set(None),
        sort_order: Set(1),
        price: Set(0.0),
        is_active: Set(true),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(db)
    .await
    .expect("subcategory fixture");
    let priced = offering_fixture(db, &category, Some(&subcategory), "Sofa Cleaning", Some(250.0)).await;
    let quoted = offering_fixture(db, &category, Some(&subcategory), "Deep Cleaning", None).await;
    CatalogFixture { category, subcategory, priced, quoted }
}

pub async fn offering_fixture(
    db: &DatabaseConnection,
    category: &category::Model,
    subcategory: Option<&subcategory::Model>,
    title: &str,
    admin_price: Option<f64>,
) -> offering::Model {
    let now = Utc::now();
    offering::ActiveModel {
        id: Set(Uuid::new_v4()),
        category_id: Set(category.id),
        subcategory_id: Set(subcategory.map(|s| s.id)),
        title: Set(title.to_string()),
        description: Set(None),
        photo: Set(None),
        more_info: Set(None),
        admin_price: Set(admin_price),
        is_admin_priced: Set(admin_price.is_some()),
        approx_completion_time: Set(Some(60)),
        is_active: Set(true),
        quantity_enabled: Set(true),
        price_adjustment_enabled: Set(false),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(db)
    .await
    .expect("service fixture")
}
