//! App home screen content: service sections and promotional banners.
use std::collections::HashSet;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, ModelTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use models::enums::BannerAudience;
use models::{banner, category, offering, service_section, subcategory};

use crate::errors::ServiceError;

pub const DEFAULT_SECTION_LIMIT: i32 = 10;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionInput {
    pub title: Option<String>,
    #[serde(alias = "category")]
    pub category_id: Option<Uuid>,
    #[serde(alias = "subcategory")]
    pub subcategory_id: Option<Uuid>,
    pub limit: Option<i32>,
    pub order: Option<i32>,
    pub is_active: Option<bool>,
}

/// Banner fields; `image` is already a hosted URL by the time it reaches here.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BannerInput {
    pub title: Option<String>,
    pub image: Option<String>,
    #[serde(alias = "category")]
    pub category_id: Option<Uuid>,
    pub audience: Option<BannerAudience>,
    pub order: Option<i32>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    pub active_only: bool,
    pub category_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SectionView {
    #[serde(flatten)]
    pub section: service_section::Model,
    pub services: Vec<offering::Model>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardData {
    pub sections: Vec<SectionView>,
    pub banners: Vec<banner::Model>,
}

/// Active sections, each filled with up to `limit` active services, plus active user banners.
pub async fn dashboard_data<C: ConnectionTrait>(db: &C) -> Result<DashboardData, ServiceError> {
    let sections = list_sections(db, ListQuery { active_only: true, category_id: None }).await?;
    let mut views = Vec::with_capacity(sections.len());
    for section in sections {
        let mut q = offering::Entity::find()
            .filter(offering::Column::CategoryId.eq(section.category_id))
            .filter(offering::Column::IsActive.eq(true));
        if let Some(sub) = section.subcategory_id {
            q = q.filter(offering::Column::SubcategoryId.eq(sub));
        }
        let services = q
            .order_by_asc(offering::Column::Title)
            .limit(section.item_limit.max(0) as u64)
            .all(db)
            .await?;
        views.push(SectionView { section, services });
    }
    let banners = banners_for(db, BannerAudience::User).await?;
    Ok(DashboardData { sections: views, banners })
}

pub async fn list_sections<C: ConnectionTrait>(db: &C, query: ListQuery) -> Result<Vec<service_section::Model>, ServiceError> {
    let mut q = service_section::Entity::find();
    if query.active_only {
        q = q.filter(service_section::Column::IsActive.eq(true));
    }
    if let Some(category_id) = query.category_id {
        q = q.filter(service_section::Column::CategoryId.eq(category_id));
    }
    Ok(q.order_by_asc(service_section::Column::SortOrder).all(db).await?)
}

async fn ensure_category<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<(), ServiceError> {
    category::Entity::find_by_id(id).one(db).await?.ok_or_else(|| ServiceError::not_found("Category"))?;
    Ok(())
}

async fn ensure_subcategory<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<(), ServiceError> {
    subcategory::Entity::find_by_id(id).one(db).await?.ok_or_else(|| ServiceError::not_found("Subcategory"))?;
    Ok(())
}

fn required_text(value: Option<String>, message: &str) -> Result<String, ServiceError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ServiceError::Validation(message.to_string()))
}

fn section_limit(limit: Option<i32>) -> Result<i32, ServiceError> {
    match limit {
        None => Ok(DEFAULT_SECTION_LIMIT),
        Some(n) if n >= 1 => Ok(n),
        Some(_) => Err(ServiceError::Validation("Section limit must be at least 1".into())),
    }
}

pub async fn create_section<C: ConnectionTrait>(db: &C, input: SectionInput) -> Result<service_section::Model, ServiceError> {
    let title = required_text(input.title, "Section title is required")?;
    let category_id = input.category_id.ok_or_else(|| ServiceError::Validation("Category is required".into()))?;
    ensure_category(db, category_id).await?;
    if let Some(sub) = input.subcategory_id {
        ensure_subcategory(db, sub).await?;
    }
    let now = Utc::now();
    Ok(service_section::ActiveModel {
        id: Set(Uuid::new_v4()),
        title: Set(title),
        category_id: Set(category_id),
        subcategory_id: Set(input.subcategory_id),
        item_limit: Set(section_limit(input.limit)?),
        sort_order: Set(input.order.unwrap_or(0)),
        is_active: Set(input.is_active.unwrap_or(true)),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(db)
    .await?)
}

pub async fn update_section<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    input: SectionInput,
) -> Result<service_section::Model, ServiceError> {
    let found = service_section::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("Service section"))?;
    let mut am = found.into_active_model();
    if let Some(title) = input.title {
        am.title = Set(required_text(Some(title), "Section title is required")?);
    }
    if let Some(category_id) = input.category_id {
        ensure_category(db, category_id).await?;
        am.category_id = Set(category_id);
    }
    if let Some(sub) = input.subcategory_id {
        ensure_subcategory(db, sub).await?;
        am.subcategory_id = Set(Some(sub));
    }
    if input.limit.is_some() {
        am.item_limit = Set(section_limit(input.limit)?);
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

pub async fn delete_section<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<(), ServiceError> {
    let found = service_section::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("Service section"))?;
    found.delete(db).await?;
    Ok(())
}

/// Active banners for one audience, by display order.
pub async fn banners_for<C: ConnectionTrait>(db: &C, audience: BannerAudience) -> Result<Vec<banner::Model>, ServiceError> {
    Ok(banner::Entity::find()
        .filter(banner::Column::Audience.eq(audience))
        .filter(banner::Column::IsActive.eq(true))
        .order_by_asc(banner::Column::SortOrder)
        .all(db)
        .await?)
}

pub async fn list_banners<C: ConnectionTrait>(db: &C, query: ListQuery) -> Result<Vec<banner::Model>, ServiceError> {
    let mut q = banner::Entity::find();
    if query.active_only {
        q = q.filter(banner::Column::IsActive.eq(true));
    }
    if let Some(category_id) = query.category_id {
        q = q.filter(banner::Column::CategoryId.eq(category_id));
    }
    Ok(q.order_by_asc(banner::Column::SortOrder).all(db).await?)
}

pub async fn create_banner<C: ConnectionTrait>(db: &C, input: BannerInput) -> Result<banner::Model, ServiceError> {
    let title = required_text(input.title, "Banner title is required")?;
    let image = required_text(input.image, "Banner image is required")?;
    let category_id = input.category_id.ok_or_else(|| ServiceError::Validation("Category is required".into()))?;
    ensure_category(db, category_id).await?;
    let now = Utc::now();
    let created = banner::ActiveModel {
        id: Set(Uuid::new_v4()),
        title: Set(title),
        image: Set(image),
        category_id: Set(category_id),
        audience: Set(input.audience.unwrap_or(BannerAudience::User)),
        sort_order: Set(input.order.unwrap_or(0)),
        is_active: Set(input.is_active.unwrap_or(true)),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(db)
    .await?;
    info!(event = "banner_created", id = %created.id, audience = ?created.audience);
    Ok(created)
}

pub async fn update_banner<C: ConnectionTrait>(db: &C, id: Uuid, input: BannerInput) -> Result<banner::Model, ServiceError> {
    let found = banner::Entity::find_by_id(id).one(db).await?.ok_or_else(|| ServiceError::not_found("Banner"))?;
    let mut am = found.into_active_model();
    if let Some(title) = input.title {
        am.title = Set(required_text(Some(title), "Banner title is required")?);
    }
    if let Some(image) = input.image {
        am.image = Set(required_text(Some(image), "Banner image is required")?);
    }
    if let Some(category_id) = input.category_id {
        ensure_category(db, category_id).await?;
        am.category_id = Set(category_id);
    }
    if let Some(audience) = input.audience {
        am.audience = Set(audience);
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

pub async fn delete_banner<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<(), ServiceError> {
    let found = banner::Entity::find_by_id(id).one(db).await?.ok_or_else(|| ServiceError::not_found("Banner"))?;
    found.delete(db).await?;
    Ok(())
}

/// One section per subcategory that lacks one, titled "{name} Services". Returns how many were created.
pub async fn seed_sections<C: ConnectionTrait>(db: &C) -> Result<u64, ServiceError> {
    let existing: HashSet<Uuid> = service_section::Entity::find()
        .filter(service_section::Column::SubcategoryId.is_not_null())
        .all(db)
        .await?
        .into_iter()
        .filter_map(|s| s.subcategory_id)
        .collect();
    let subcategories = subcategory::Entity::find()
        .order_by_asc(subcategory::Column::SortOrder)
        .order_by_asc(subcategory::Column::Name)
        .all(db)
        .await?;

    let mut created = 0u64;
    for sub in subcategories.into_iter().filter(|s| !existing.contains(&s.id)) {
        create_section(
            db,
            SectionInput {
                title: Some(format!("{} Services", sub.name)),
                category_id: Some(sub.category_id),
                subcategory_id: Some(sub.id),
                limit: Some(DEFAULT_SECTION_LIMIT),
                order: Some(created as i32 + 1),
                is_active: Some(true),
            },
        )
        .await?;
        created += 1;
    }
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;

    #[tokio::test]
    async fn dashboard_fills_sections_and_user_banners() {
        let db = test_support::get_db().await.unwrap();
        let fx = test_support::catalog_fixture(&db).await;
        let section = create_section(
            &db,
            SectionInput {
                title: Some("Popular".into()),
                category_id: Some(fx.category.id),
                subcategory_id: Some(fx.subcategory.id),
                limit: Some(1),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        let banner = |audience| BannerInput {
            title: Some("Sale".into()),
            image: Some("https://img.example/b.png".into()),
            category_id: Some(fx.category.id),
            audience: Some(audience),
            ..Default::default()
        };
        create_banner(&db, banner(BannerAudience::User)).await.unwrap();
        create_banner(&db, banner(BannerAudience::Vendor)).await.unwrap();

        let data = dashboard_data(&db).await.unwrap();
        assert_eq!(data.sections.len(), 1);
        assert_eq!(data.sections[0].section.id, section.id);
        assert_eq!(data.sections[0].services.len(), 1);
        assert_eq!(data.sections[0].services[0].title, "Deep Cleaning");
        assert_eq!(data.banners.len(), 1);
        assert_eq!(banners_for(&db, BannerAudience::Vendor).await.unwrap().len(), 1);

        update_section(&db, section.id, SectionInput { is_active: Some(false), ..Default::default() }).await.unwrap();
        assert!(dashboard_data(&db).await.unwrap().sections.is_empty());
    }

    #[tokio::test]
    async fn banner_requires_image_and_known_category() {
        let db = test_support::get_db().await.unwrap();
        let fx = test_support::catalog_fixture(&db).await;

        let no_image = BannerInput { title: Some("T".into()), category_id: Some(fx.category.id), ..Default::default() };
        let err = create_banner(&db, no_image).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(ref m) if m == "Banner image is required"));

        let ghost = BannerInput {
            title: Some("T".into()),
            image: Some("x.png".into()),
            category_id: Some(Uuid::new_v4()),
            ..Default::default()
        };
        assert!(matches!(create_banner(&db, ghost).await, Err(ServiceError::NotFound(ref m)) if m == "Category not found"));

        assert!(matches!(delete_banner(&db, Uuid::new_v4()).await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn seeding_sections_is_idempotent() {
        let db = test_support::get_db().await.unwrap();
        let fx = test_support::catalog_fixture(&db).await;
        assert_eq!(seed_sections(&db).await.unwrap(), 1);
        assert_eq!(seed_sections(&db).await.unwrap(), 0);
        let sections = list_sections(&db, ListQuery::default()).await.unwrap();
        assert_eq!(sections[0].title, format!("{} Services", fx.subcategory.name));
        assert_eq!(sections[0].item_limit, DEFAULT_SECTION_LIMIT);
    }
}
