//! Category → Subcategory → Service catalog: public browsing plus admin CRUD.
use chrono::Utc;
use sea_orm::{
    sea_query::{Expr, Func},
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, QueryTrait, Set,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use models::{booking_item, category, offering, subcategory};

use crate::errors::ServiceError;
use crate::pagination::{PageInfo, Pagination};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub membership_fee: Option<f64>,
    pub default_free_credits: Option<i32>,
    pub order: Option<i32>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubcategoryInput {
    #[serde(alias = "category")]
    pub category_id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub order: Option<i32>,
    pub price: Option<f64>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceInput {
    #[serde(alias = "categoryId")]
    pub category: Option<String>,
    #[serde(alias = "subcategoryId")]
    pub subcategory: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub photo: Option<String>,
    pub more_info: Option<String>,
    pub admin_price: Option<f64>,
    pub approx_completion_time: Option<i32>,
    pub is_active: Option<bool>,
    pub quantity_enabled: Option<bool>,
    pub price_adjustment_enabled: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct ServiceQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServicePage {
    pub services: Vec<offering::Model>,
    pub pagination: PageInfo,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubcategoryTree {
    #[serde(flatten)]
    pub subcategory: subcategory::Model,
    pub services: Vec<offering::Model>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryTree {
    #[serde(flatten)]
    pub category: category::Model,
    pub subcategories: Vec<SubcategoryTree>,
}

/// Client-supplied id; blank, "null" and "undefined" count as missing.
fn clean_id(raw: Option<&str>) -> Option<&str> {
    let s = raw?.trim();
    if s.is_empty() || s == "null" || s == "undefined" { None } else { Some(s) }
}

fn required(value: Option<String>, message: &str) -> Result<String, ServiceError> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ServiceError::Validation(message.to_string())),
    }
}

pub async fn active_categories<C: ConnectionTrait>(db: &C) -> Result<Vec<category::Model>, ServiceError> {
    Ok(category::Entity::find()
        .filter(category::Column::IsActive.eq(true))
        .order_by_asc(category::Column::SortOrder)
        .order_by_asc(category::Column::Name)
        .all(db)
        .await?)
}

pub async fn subcategories_of<C: ConnectionTrait>(db: &C, category_id: Uuid) -> Result<Vec<subcategory::Model>, ServiceError> {
    Ok(subcategory::Entity::find()
        .filter(subcategory::Column::CategoryId.eq(category_id))
        .filter(subcategory::Column::IsActive.eq(true))
        .order_by_asc(subcategory::Column::SortOrder)
        .order_by_asc(subcategory::Column::Name)
        .all(db)
        .await?)
}

/// Active services of a subcategory by title, with optional case-insensitive title search.
pub async fn services_of<C: ConnectionTrait>(
    db: &C,
    subcategory_id: Uuid,
    query: ServiceQuery,
) -> Result<ServicePage, ServiceError> {
    let (page_idx, limit) = Pagination { page: query.page.unwrap_or(1), per_page: query.limit.unwrap_or(10) }.normalize();
    let mut q = offering::Entity::find()
        .filter(offering::Column::SubcategoryId.eq(subcategory_id))
        .filter(offering::Column::IsActive.eq(true));
    if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search.to_lowercase());
        q = q.filter(Expr::expr(Func::lower(Expr::col(offering::Column::Title))).like(pattern));
    }
    let total = q.clone().count(db).await?;
    let services = q
        .order_by_asc(offering::Column::Title)
        .offset(page_idx * limit)
        .limit(limit)
        .all(db)
        .await?;
    Ok(ServicePage { services, pagination: PageInfo::new(page_idx, limit, total) })
}

pub async fn service_details<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<offering::Model, ServiceError> {
    offering::Entity::find_by_id(id)
        .filter(offering::Column::IsActive.eq(true))
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("Service"))
}

/// Active categories with their active subcategories and services, each level sorted.
pub async fn catalog_tree<C: ConnectionTrait>(db: &C) -> Result<Vec<CategoryTree>, ServiceError> {
    let categories = active_categories(db).await?;
    let subcategories = subcategory::Entity::find()
        .filter(subcategory::Column::IsActive.eq(true))
        .order_by_asc(subcategory::Column::SortOrder)
        .order_by_asc(subcategory::Column::Name)
        .all(db)
        .await?;
    let services = offering::Entity::find()
        .filter(offering::Column::IsActive.eq(true))
        .order_by_asc(offering::Column::Title)
        .all(db)
        .await?;

    Ok(categories
        .into_iter()
        .map(|category| {
            let subcategories = subcategories
                .iter()
                .filter(|s| s.category_id == category.id)
                .map(|s| SubcategoryTree {
                    subcategory: s.clone(),
                    services: services.iter().filter(|o| o.subcategory_id == Some(s.id)).cloned().collect(),
                })
                .collect();
            CategoryTree { category, subcategories }
        })
        .collect())
}

pub async fn create_category<C: ConnectionTrait>(db: &C, input: CategoryInput) -> Result<category::Model, ServiceError> {
    let now = Utc::now();
    let created = category::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(required(input.name, "Category name is required")?),
        description: Set(input.description),
        icon: Set(input.icon),
        membership_fee: Set(input.membership_fee.unwrap_or(0.0)),
        default_free_credits: Set(input.default_free_credits.unwrap_or(0)),
        sort_order: Set(input.order.unwrap_or(0)),
        is_active: Set(input.is_active.unwrap_or(true)),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(db)
    .await?;
    info!(event = "category_created", id = %created.id);
    Ok(created)
}

pub async fn update_category<C: ConnectionTrait>(db: &C, id: Uuid, input: CategoryInput) -> Result<category::Model, ServiceError> {
    let found = category::Entity::find_by_id(id).one(db).await?.ok_or_else(|| ServiceError::not_found("Category"))?;
    let mut am = found.into_active_model();
    if let Some(name) = input.name {
        am.name = Set(required(Some(name), "Category name is required")?);
    }
    if input.description.is_some() {
        am.description = Set(input.description);
    }
    if input.icon.is_some() {
        am.icon = Set(input.icon);
    }
    if let Some(fee) = input.membership_fee {
        am.membership_fee = Set(fee);
    }
    if let Some(credits) = input.default_free_credits {
        am.default_free_credits = Set(credits);
    }
    if let Some(order) = input.order {
        am.sort_order = Set(order);
    }
    if let Some(active) = input.is_active {
        am.is_active = Set(active);
    }
    am.updated_at = Set(Utc::now().into());
    Ok(am.update(db).await?)
}

/// Removes the category; its subcategories and services go with it.
/// Booking items pointing at any of the given services.
async fn booked_items<C: ConnectionTrait>(db: &C, services: sea_orm::Select<offering::Entity>) -> Result<u64, ServiceError> {
    let ids = services.select_only().column(offering::Column::Id).into_query();
    Ok(booking_item::Entity::find()
        .filter(booking_item::Column::ServiceId.in_subquery(ids))
        .count(db)
        .await?)
}

/// Deleting a category cascades to its services, so it is refused while any of them is booked.
pub async fn delete_category<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<category::Model, ServiceError> {
    let found = category::Entity::find_by_id(id).one(db).await?.ok_or_else(|| ServiceError::not_found("Category"))?;
    let services = offering::Entity::find().filter(offering::Column::CategoryId.eq(id));
    if booked_items(db, services).await? > 0 {
        return Err(ServiceError::Validation(
            "Category has services used by existing bookings and cannot be deleted".into(),
        ));
    }
    found.clone().delete(db).await?;
    Ok(found)
}

pub async fn create_subcategory<C: ConnectionTrait>(db: &C, input: SubcategoryInput) -> Result<subcategory::Model, ServiceError> {
    let category_id = clean_id(input.category_id.as_deref())
        .ok_or_else(|| ServiceError::Validation("A valid category ID is required".into()))?;
    let category_id = Uuid::parse_str(category_id).map_err(|_| ServiceError::not_found("Category"))?;
    category::Entity::find_by_id(category_id).one(db).await?.ok_or_else(|| ServiceError::not_found("Category"))?;

    let now = Utc::now();
    Ok(subcategory::ActiveModel {
        id: Set(Uuid::new_v4()),
        category_id: Set(category_id),
        name: Set(required(input.name, "Subcategory name is required")?),
        description: Set(input.description),
        sort_order: Set(input.order.unwrap_or(0)),
        price: Set(input.price.unwrap_or(0.0)),
        is_active: Set(input.is_active.unwrap_or(true)),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(db)
    .await?)
}

pub async fn update_subcategory<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    input: SubcategoryInput,
) -> Result<subcategory::Model, ServiceError> {
    let found = subcategory::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("Subcategory"))?;
    let mut am = found.into_active_model();
    if let Some(raw) = clean_id(input.category_id.as_deref()) {
        let category_id = Uuid::parse_str(raw).map_err(|_| ServiceError::not_found("Category"))?;
        category::Entity::find_by_id(category_id).one(db).await?.ok_or_else(|| ServiceError::not_found("Category"))?;
        am.category_id = Set(category_id);
    }
    if let Some(name) = input.name {
        am.name = Set(required(Some(name), "Subcategory name is required")?);
    }
    if input.description.is_some() {
        am.description = Set(input.description);
    }
    if let Some(order) = input.order {
        am.sort_order = Set(order);
    }
    if let Some(price) = input.price {
        am.price = Set(price);
    }
    if let Some(active) = input.is_active {
        am.is_active = Set(active);
    }
    am.updated_at = Set(Utc::now().into());
    Ok(am.update(db).await?)
}

pub async fn delete_subcategory<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<subcategory::Model, ServiceError> {
    let found = subcategory::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("Subcategory"))?;
    found.clone().delete(db).await?;
    Ok(found)
}

async fn resolve_category<C: ConnectionTrait>(db: &C, raw: &str) -> Result<Uuid, ServiceError> {
    let missing = || ServiceError::NotFound(format!("Category not found with ID: {raw}"));
    let id = Uuid::parse_str(raw).map_err(|_| missing())?;
    category::Entity::find_by_id(id).one(db).await?.ok_or_else(missing)?;
    Ok(id)
}

async fn resolve_subcategory<C: ConnectionTrait>(db: &C, raw: &str) -> Result<Uuid, ServiceError> {
    let missing = || ServiceError::NotFound(format!("Subcategory not found with ID: {raw}"));
    let id = Uuid::parse_str(raw).map_err(|_| missing())?;
    subcategory::Entity::find_by_id(id).one(db).await?.ok_or_else(missing)?;
    Ok(id)
}

pub async fn create_service<C: ConnectionTrait>(db: &C, input: ServiceInput) -> Result<offering::Model, ServiceError> {
    let raw_category = clean_id(input.category.as_deref())
        .ok_or_else(|| ServiceError::Validation("A valid category ID is required".into()))?;
    let category_id = resolve_category(db, raw_category).await?;
    let subcategory_id = match clean_id(input.subcategory.as_deref()) {
        Some(raw) => Some(resolve_subcategory(db, raw).await?),
        None => None,
    };

    let now = Utc::now();
    let created = offering::ActiveModel {
        id: Set(Uuid::new_v4()),
        category_id: Set(category_id),
        subcategory_id: Set(subcategory_id),
        title: Set(required(input.title, "Service title is required")?),
        description: Set(input.description),
        photo: Set(input.photo),
        more_info: Set(input.more_info),
        admin_price: Set(input.admin_price),
        is_admin_priced: Set(input.admin_price.is_some()),
        approx_completion_time: Set(input.approx_completion_time),
        is_active: Set(input.is_active.unwrap_or(true)),
        quantity_enabled: Set(input.quantity_enabled.unwrap_or(false)),
        price_adjustment_enabled: Set(input.price_adjustment_enabled.unwrap_or(false)),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(db)
    .await?;
    info!(event = "service_created", id = %created.id);
    Ok(created)
}

pub async fn update_service<C: ConnectionTrait>(db: &C, id: Uuid, input: ServiceInput) -> Result<offering::Model, ServiceError> {
    let found = offering::Entity::find_by_id(id).one(db).await?.ok_or_else(|| ServiceError::not_found("Service"))?;
    let mut am = found.into_active_model();
    if let Some(raw) = clean_id(input.category.as_deref()) {
        am.category_id = Set(resolve_category(db, raw).await?);
    }
    if let Some(raw) = clean_id(input.subcategory.as_deref()) {
        am.subcategory_id = Set(Some(resolve_subcategory(db, raw).await?));
    }
    if let Some(title) = input.title {
        am.title = Set(required(Some(title), "Service title is required")?);
    }
    if input.description.is_some() {
        am.description = Set(input.description);
    }
    if input.photo.is_some() {
        am.photo = Set(input.photo);
    }
    if input.more_info.is_some() {
        am.more_info = Set(input.more_info);
    }
    if let Some(price) = input.admin_price {
        am.admin_price = Set(Some(price));
        am.is_admin_priced = Set(true);
    }
    if input.approx_completion_time.is_some() {
        am.approx_completion_time = Set(input.approx_completion_time);
    }
    if let Some(active) = input.is_active {
        am.is_active = Set(active);
    }
    if let Some(enabled) = input.quantity_enabled {
        am.quantity_enabled = Set(enabled);
    }
    if let Some(enabled) = input.price_adjustment_enabled {
        am.price_adjustment_enabled = Set(enabled);
    }
    am.updated_at = Set(Utc::now().into());
    Ok(am.update(db).await?)
}

/// Fails while bookings still reference the service.
pub async fn delete_service<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<offering::Model, ServiceError> {
    let found = offering::Entity::find_by_id(id).one(db).await?.ok_or_else(|| ServiceError::not_found("Service"))?;
    if booked_items(db, offering::Entity::find_by_id(id)).await? > 0 {
        return Err(ServiceError::Validation("Service is used by existing bookings and cannot be deleted".into()));
    }
    found.clone().delete(db).await?;
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::{Actor, AuditService};
    use crate::bookings::{BookingService, NewBooking, ServiceLine};
    use crate::otp::OtpGenerator;
    use crate::test_support;
    use models::enums::Role;

    #[tokio::test]
    async fn browse_active_catalog_with_search_and_pages() {
        let db = test_support::get_db().await.unwrap();
        let fx = test_support::catalog_fixture(&db).await;
        for title in ["Window Cleaning", "Kitchen Cleaning", "Pest Control"] {
            test_support::offering_fixture(&db, &fx.category, Some(&fx.subcategory), title, None).await;
        }
        let hidden = test_support::offering_fixture(&db, &fx.category, Some(&fx.subcategory), "Hidden Cleaning", None).await;
        update_service(&db, hidden.id, ServiceInput { is_active: Some(false), ..Default::default() }).await.unwrap();

        assert_eq!(active_categories(&db).await.unwrap().len(), 1);
        assert_eq!(subcategories_of(&db, fx.category.id).await.unwrap().len(), 1);

        let page = services_of(&db, fx.subcategory.id, ServiceQuery { page: Some(1), limit: Some(2), search: None })
            .await
            .unwrap();
        assert_eq!(page.pagination, PageInfo { page: 1, limit: 2, total: 5, pages: 3 });
        assert_eq!(page.services[0].title, "Deep Cleaning");

        let found = services_of(&db, fx.subcategory.id, ServiceQuery { search: Some("CLEAN".into()), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(found.pagination.total, 4);

        assert!(service_details(&db, fx.priced.id).await.is_ok());
        let err = service_details(&db, hidden.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(ref m) if m == "Service not found"));
    }

    #[tokio::test]
    async fn create_service_checks_category_and_subcategory() {
        let db = test_support::get_db().await.unwrap();
        let fx = test_support::catalog_fixture(&db).await;

        let err = create_service(&db, ServiceInput { category: Some("undefined".into()), title: Some("X".into()), ..Default::default() })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(ref m) if m == "A valid category ID is required"));

        let ghost = Uuid::new_v4().to_string();
        let err = create_service(&db, ServiceInput { category: Some(ghost.clone()), title: Some("X".into()), ..Default::default() })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(ref m) if *m == format!("Category not found with ID: {ghost}")));

        let err = create_service(
            &db,
            ServiceInput {
                category: Some(fx.category.id.to_string()),
                subcategory: Some(ghost.clone()),
                title: Some("X".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(ref m) if m.starts_with("Subcategory not found with ID")));

        let created = create_service(
            &db,
            ServiceInput {
                category: Some(fx.category.id.to_string()),
                subcategory: Some(fx.subcategory.id.to_string()),
                title: Some("AC Repair".into()),
                admin_price: Some(399.0),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert!(created.is_admin_priced);
    }

    #[tokio::test]
    async fn tree_and_cascading_deletes() {
        let db = test_support::get_db().await.unwrap();
        let fx = test_support::catalog_fixture(&db).await;
        let empty = create_category(&db, CategoryInput { name: Some("Beauty".into()), order: Some(2), ..Default::default() })
            .await
            .unwrap();

        let tree = catalog_tree(&db).await.unwrap();
        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].category.id, fx.category.id);
        assert_eq!(tree[0].subcategories[0].services.len(), 2);
        assert!(tree[1].subcategories.is_empty());

        let renamed = update_category(&db, empty.id, CategoryInput { name: Some("Salon".into()), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(renamed.name, "Salon");
        assert!(matches!(
            update_category(&db, Uuid::new_v4(), CategoryInput::default()).await,
            Err(ServiceError::NotFound(ref m)) if m == "Category not found"
        ));

        delete_subcategory(&db, fx.subcategory.id).await.unwrap();
        let orphan = offering::Entity::find_by_id(fx.priced.id).one(&db).await.unwrap().unwrap();
        assert_eq!(orphan.subcategory_id, None);

        delete_category(&db, fx.category.id).await.unwrap();
        assert!(offering::Entity::find_by_id(fx.priced.id).one(&db).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn booked_service_cannot_be_deleted() {
        let db = test_support::get_db().await.unwrap();
        let fx = test_support::catalog_fixture(&db).await;
        let owner = test_support::user_fixture(&db, "+919700000030").await;
        let bookings = BookingService::new(db.clone(), AuditService::new(db.clone()), OtpGenerator::new(true));
        bookings
            .create(
                &Actor::new(owner.id, Role::User),
                NewBooking {
                    services: vec![ServiceLine { service_id: fx.priced.id.to_string(), quantity: None }],
                    date: "2030-03-01".into(),
                    time: "11:00".into(),
                    address: "1 Park St".into(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(matches!(
            delete_service(&db, fx.priced.id).await,
            Err(ServiceError::Validation(ref m)) if m == "Service is used by existing bookings and cannot be deleted"
        ));
        assert!(matches!(delete_category(&db, fx.category.id).await, Err(ServiceError::Validation(_))));
        assert!(offering::Entity::find_by_id(fx.priced.id).one(&db).await.unwrap().is_some());

        assert!(delete_service(&db, fx.quoted.id).await.is_ok());
        delete_subcategory(&db, fx.subcategory.id).await.unwrap();
    }
}
