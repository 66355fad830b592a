use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use models::{category, offering, subcategory};
use service::catalog::{self, CategoryInput, CategoryTree, ServiceInput, ServicePage, ServiceQuery, SubcategoryInput};

use crate::envelope::{created, ok, Envelope};
use crate::errors::AppResult;
use crate::extract::{ApiPath, ApiQuery, JsonBody};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ServiceListParams {
    /// 1-based, default 1.
    pub page: Option<u32>,
    /// Default 10.
    pub limit: Option<u32>,
    /// Case-insensitive title filter.
    pub search: Option<String>,
}

#[utoipa::path(get, path = "/services/categories", tag = "catalog", responses((status = 200, description = "Active categories by order then name")))]
pub async fn categories(State(state): State<AppState>) -> AppResult<Envelope<Vec<category::Model>>> {
    let list = catalog::active_categories(&state.db).await?;
    Ok(ok("Categories fetched successfully", list))
}

#[utoipa::path(get, path = "/services/categories/{id}/subcategories", tag = "catalog", params(("id" = Uuid, Path, description = "Category id")), responses((status = 200, description = "Active subcategories")))]
pub async fn subcategories(State(state): State<AppState>, ApiPath(id): ApiPath<Uuid>) -> AppResult<Envelope<Vec<subcategory::Model>>> {
    let list = catalog::subcategories_of(&state.db, id).await?;
    Ok(ok("Subcategories fetched successfully", list))
}

#[utoipa::path(get, path = "/services/subcategories/{id}/services", tag = "catalog", params(("id" = Uuid, Path, description = "Subcategory id"), ServiceListParams), responses((status = 200, description = "One page of active services")))]
pub async fn services(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiQuery(params): ApiQuery<ServiceListParams>,
) -> AppResult<Envelope<ServicePage>> {
    let query = ServiceQuery { page: params.page, limit: params.limit, search: params.search };
    let page = catalog::services_of(&state.db, id, query).await?;
    Ok(ok("Services fetched successfully", page))
}

#[utoipa::path(get, path = "/services/{id}", tag = "catalog", params(("id" = Uuid, Path, description = "Service id")), responses((status = 200, description = "Active service"), (status = 404, description = "Service not found")))]
pub async fn service_details(State(state): State<AppState>, ApiPath(id): ApiPath<Uuid>) -> AppResult<Envelope<offering::Model>> {
    let found = catalog::service_details(&state.db, id).await?;
    Ok(ok("Service fetched successfully", found))
}

#[utoipa::path(get, path = "/services/admin/tree", tag = "catalog", security(("bearer" = [])), responses((status = 200, description = "Categories with nested subcategories and services")))]
pub async fn tree(State(state): State<AppState>) -> AppResult<Envelope<Vec<CategoryTree>>> {
    let tree = catalog::catalog_tree(&state.db).await?;
    Ok(ok("Catalog fetched successfully", tree))
}

#[utoipa::path(post, path = "/services/admin/categories", tag = "catalog", security(("bearer" = [])), request_body = crate::openapi::CategoryDoc, responses((status = 201, description = "Category created"), (status = 400, description = "Validation failed")))]
pub async fn create_category(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<CategoryInput>,
) -> AppResult<(StatusCode, Envelope<category::Model>)> {
    let created_row = catalog::create_category(&state.db, input).await?;
    Ok(created("Category created successfully", created_row))
}

#[utoipa::path(put, path = "/services/admin/categories/{id}", tag = "catalog", security(("bearer" = [])), params(("id" = Uuid, Path, description = "Category id")), request_body = crate::openapi::CategoryDoc, responses((status = 200, description = "Category updated"), (status = 404, description = "Category not found")))]
pub async fn update_category(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    JsonBody(input): JsonBody<CategoryInput>,
) -> AppResult<Envelope<category::Model>> {
    let updated = catalog::update_category(&state.db, id, input).await?;
    Ok(ok("Category updated successfully", updated))
}

#[utoipa::path(delete, path = "/services/admin/categories/{id}", tag = "catalog", security(("bearer" = [])), params(("id" = Uuid, Path, description = "Category id")), responses((status = 200, description = "Category deleted"), (status = 404, description = "Category not found")))]
pub async fn delete_category(State(state): State<AppState>, ApiPath(id): ApiPath<Uuid>) -> AppResult<Envelope<category::Model>> {
    let deleted = catalog::delete_category(&state.db, id).await?;
    Ok(ok("Category deleted successfully", deleted))
}

#[utoipa::path(post, path = "/services/admin/subcategories", tag = "catalog", security(("bearer" = [])), request_body = crate::openapi::SubcategoryDoc, responses((status = 201, description = "Subcategory created"), (status = 404, description = "Category not found")))]
pub async fn create_subcategory(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<SubcategoryInput>,
) -> AppResult<(StatusCode, Envelope<subcategory::Model>)> {
    let created_row = catalog::create_subcategory(&state.db, input).await?;
    Ok(created("Subcategory created successfully", created_row))
}

#[utoipa::path(put, path = "/services/admin/subcategories/{id}", tag = "catalog", security(("bearer" = [])), params(("id" = Uuid, Path, description = "Subcategory id")), request_body = crate::openapi::SubcategoryDoc, responses((status = 200, description = "Subcategory updated"), (status = 404, description = "Subcategory not found")))]
pub async fn update_subcategory(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    JsonBody(input): JsonBody<SubcategoryInput>,
) -> AppResult<Envelope<subcategory::Model>> {
    let updated = catalog::update_subcategory(&state.db, id, input).await?;
    Ok(ok("Subcategory updated successfully", updated))
}

#[utoipa::path(delete, path = "/services/admin/subcategories/{id}", tag = "catalog", security(("bearer" = [])), params(("id" = Uuid, Path, description = "Subcategory id")), responses((status = 200, description = "Subcategory deleted"), (status = 404, description = "Subcategory not found")))]
pub async fn delete_subcategory(State(state): State<AppState>, ApiPath(id): ApiPath<Uuid>) -> AppResult<Envelope<subcategory::Model>> {
    let deleted = catalog::delete_subcategory(&state.db, id).await?;
    Ok(ok("Subcategory deleted successfully", deleted))
}

#[utoipa::path(post, path = "/services/admin/services", tag = "catalog", security(("bearer" = [])), request_body = crate::openapi::ServiceDoc, responses((status = 201, description = "Service created"), (status = 400, description = "Category id missing or invalid"), (status = 404, description = "Category or subcategory not found")))]
pub async fn create_service(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<ServiceInput>,
) -> AppResult<(StatusCode, Envelope<offering::Model>)> {
    let created_row = catalog::create_service(&state.db, input).await?;
    Ok(created("Service created successfully", created_row))
}

#[utoipa::path(put, path = "/services/admin/services/{id}", tag = "catalog", security(("bearer" = [])), params(("id" = Uuid, Path, description = "Service id")), request_body = crate::openapi::ServiceDoc, responses((status = 200, description = "Service updated"), (status = 404, description = "Service not found")))]
pub async fn update_service(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    JsonBody(input): JsonBody<ServiceInput>,
) -> AppResult<Envelope<offering::Model>> {
    let updated = catalog::update_service(&state.db, id, input).await?;
    Ok(ok("Service updated successfully", updated))
}

#[utoipa::path(delete, path = "/services/admin/services/{id}", tag = "catalog", security(("bearer" = [])), params(("id" = Uuid, Path, description = "Service id")), responses((status = 200, description = "Service deleted"), (status = 400, description = "Service still referenced by bookings"), (status = 404, description = "Service not found")))]
pub async fn delete_service(State(state): State<AppState>, ApiPath(id): ApiPath<Uuid>) -> AppResult<Envelope<offering::Model>> {
    let deleted = catalog::delete_service(&state.db, id).await?;
    Ok(ok("Service deleted successfully", deleted))
}
