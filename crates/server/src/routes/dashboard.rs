use axum::extract::multipart::Field;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use serde::Deserialize;
use tracing::debug;
use utoipa::IntoParams;
use uuid::Uuid;

use models::enums::BannerAudience;
use models::{banner, service_section};
use service::dashboard::{self, BannerInput, DashboardData, ListQuery, SectionInput};
use service::image_host::ImageFile;

use crate::envelope::{created, done, ok, Envelope};
use crate::errors::{AppError, AppResult};
use crate::extract::{ApiPath, ApiQuery, JsonBody};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub category_id: Option<Uuid>,
}

#[utoipa::path(get, path = "/dashboard", tag = "dashboard", responses((status = 200, description = "Active sections with their services plus user banners")))]
pub async fn dashboard_data(State(state): State<AppState>) -> AppResult<Envelope<DashboardData>> {
    let data = dashboard::dashboard_data(&state.db).await?;
    Ok(ok("Dashboard data fetched successfully", data))
}

#[utoipa::path(get, path = "/dashboard/service-sections", tag = "dashboard", params(ListParams), responses((status = 200, description = "Active service sections")))]
pub async fn sections(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<ListParams>,
) -> AppResult<Envelope<Vec<service_section::Model>>> {
    let list = dashboard::list_sections(&state.db, ListQuery { active_only: true, category_id: params.category_id }).await?;
    Ok(ok("Service sections fetched successfully", list))
}

#[utoipa::path(get, path = "/dashboard/banners", tag = "dashboard", responses((status = 200, description = "Active user banners")))]
pub async fn banners(State(state): State<AppState>) -> AppResult<Envelope<Vec<banner::Model>>> {
    let list = dashboard::banners_for(&state.db, BannerAudience::User).await?;
    Ok(ok("Banners fetched successfully", list))
}

#[utoipa::path(get, path = "/dashboard/vendor-banners", tag = "dashboard", responses((status = 200, description = "Active vendor banners")))]
pub async fn vendor_banners(State(state): State<AppState>) -> AppResult<Envelope<Vec<banner::Model>>> {
    let list = dashboard::banners_for(&state.db, BannerAudience::Vendor).await?;
    Ok(ok("Vendor banners fetched successfully", list))
}

#[utoipa::path(get, path = "/dashboard/admin/service-sections", tag = "dashboard", security(("bearer" = [])), params(ListParams), responses((status = 200, description = "All service sections")))]
pub async fn all_sections(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<ListParams>,
) -> AppResult<Envelope<Vec<service_section::Model>>> {
    let list = dashboard::list_sections(&state.db, ListQuery { active_only: false, category_id: params.category_id }).await?;
    Ok(ok("Service sections fetched successfully", list))
}

#[utoipa::path(post, path = "/dashboard/service-sections", tag = "dashboard", security(("bearer" = [])), request_body = crate::openapi::SectionDoc, responses((status = 201, description = "Section created"), (status = 400, description = "Validation failed"), (status = 404, description = "Category or subcategory not found")))]
pub async fn create_section(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<SectionInput>,
) -> AppResult<(StatusCode, Envelope<service_section::Model>)> {
    let section = dashboard::create_section(&state.db, input).await?;
    Ok(created("Service section created successfully", section))
}

#[utoipa::path(put, path = "/dashboard/service-sections/{id}", tag = "dashboard", security(("bearer" = [])), params(("id" = Uuid, Path, description = "Section id")), request_body = crate::openapi::SectionDoc, responses((status = 200, description = "Section updated"), (status = 404, description = "Service section not found")))]
pub async fn update_section(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    JsonBody(input): JsonBody<SectionInput>,
) -> AppResult<Envelope<service_section::Model>> {
    let section = dashboard::update_section(&state.db, id, input).await?;
    Ok(ok("Service section updated successfully", section))
}

#[utoipa::path(delete, path = "/dashboard/service-sections/{id}", tag = "dashboard", security(("bearer" = [])), params(("id" = Uuid, Path, description = "Section id")), responses((status = 200, description = "Section deleted"), (status = 404, description = "Service section not found")))]
pub async fn delete_section(State(state): State<AppState>, ApiPath(id): ApiPath<Uuid>) -> AppResult<Envelope<()>> {
    dashboard::delete_section(&state.db, id).await?;
    Ok(done("Service section deleted successfully"))
}

#[utoipa::path(post, path = "/dashboard/service-sections/seed", tag = "dashboard", security(("bearer" = [])), responses((status = 200, description = "Number of sections created")))]
pub async fn seed_sections(State(state): State<AppState>) -> AppResult<Envelope<u64>> {
    let count = dashboard::seed_sections(&state.db).await?;
    Ok(ok("Service sections seeded successfully", count))
}

#[utoipa::path(get, path = "/dashboard/admin/banners", tag = "dashboard", security(("bearer" = [])), params(ListParams), responses((status = 200, description = "All banners")))]
pub async fn all_banners(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<ListParams>,
) -> AppResult<Envelope<Vec<banner::Model>>> {
    let list = dashboard::list_banners(&state.db, ListQuery { active_only: false, category_id: params.category_id }).await?;
    Ok(ok("Banners fetched successfully", list))
}

#[utoipa::path(post, path = "/dashboard/banners", tag = "dashboard", security(("bearer" = [])), request_body(content = crate::openapi::BannerFormDoc, content_type = "multipart/form-data"), responses((status = 201, description = "Banner created"), (status = 400, description = "Validation failed"), (status = 503, description = "Image upload not configured")))]
pub async fn create_banner(State(state): State<AppState>, multipart: Multipart) -> AppResult<(StatusCode, Envelope<banner::Model>)> {
    let input = banner_form(&state, multipart).await?;
    let created_row = dashboard::create_banner(&state.db, input).await?;
    Ok(created("Banner created successfully", created_row))
}

#[utoipa::path(put, path = "/dashboard/banners/{id}", tag = "dashboard", security(("bearer" = [])), params(("id" = Uuid, Path, description = "Banner id")), request_body(content = crate::openapi::BannerFormDoc, content_type = "multipart/form-data"), responses((status = 200, description = "Banner updated"), (status = 404, description = "Banner not found")))]
pub async fn update_banner(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    multipart: Multipart,
) -> AppResult<Envelope<banner::Model>> {
    let input = banner_form(&state, multipart).await?;
    let updated = dashboard::update_banner(&state.db, id, input).await?;
    Ok(ok("Banner updated successfully", updated))
}

#[utoipa::path(delete, path = "/dashboard/banners/{id}", tag = "dashboard", security(("bearer" = [])), params(("id" = Uuid, Path, description = "Banner id")), responses((status = 200, description = "Banner deleted"), (status = 404, description = "Banner not found")))]
pub async fn delete_banner(State(state): State<AppState>, ApiPath(id): ApiPath<Uuid>) -> AppResult<Envelope<()>> {
    dashboard::delete_banner(&state.db, id).await?;
    Ok(done("Banner deleted successfully"))
}

async fn field_text(field: Field<'_>) -> AppResult<String> {
    field.text().await.map_err(|e| AppError::Validation(e.body_text()))
}

/// Collect banner fields from a multipart form. An `image` file part is uploaded
/// to the image host; a plain `image` text part is taken as an existing URL.
async fn banner_form(state: &AppState, mut multipart: Multipart) -> AppResult<BannerInput> {
    let mut input = BannerInput::default();
    while let Some(field) = multipart.next_field().await.map_err(|e| AppError::Validation(e.body_text()))? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "image" if field.file_name().is_some() => {
                let file_name = field.file_name().unwrap_or("banner").to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(|e| AppError::Validation(e.body_text()))?;
                debug!(%file_name, size = bytes.len(), "banner image received");
                let url = state.images.upload(ImageFile { file_name, content_type, bytes: bytes.to_vec() }).await?;
                input.image = Some(url);
            }
            "image" => input.image = Some(field_text(field).await?),
            "title" => input.title = Some(field_text(field).await?),
            "category" | "categoryId" => {
                let raw = field_text(field).await?;
                let id = Uuid::parse_str(raw.trim()).map_err(|_| AppError::Validation("Invalid category ID".into()))?;
                input.category_id = Some(id);
            }
            "audience" => {
                let raw = field_text(field).await?;
                let audience = serde_json::from_value::<BannerAudience>(serde_json::Value::String(raw.trim().to_lowercase()))
                    .map_err(|_| AppError::Validation("Audience must be user or vendor".into()))?;
                input.audience = Some(audience);
            }
            "order" => {
                let raw = field_text(field).await?;
                let order = raw.trim().parse().map_err(|_| AppError::Validation("Order must be a number".into()))?;
                input.order = Some(order);
            }
            "isActive" => {
                let raw = field_text(field).await?;
                input.is_active = Some(matches!(raw.trim(), "true" | "1"));
            }
            _ => debug!(field = %name, "ignoring unknown banner field"),
        }
    }
    Ok(input)
}
