use axum::extract::State;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use models::enums::{AuditAction, UserStatus};
use models::{audit_log, user, vendor};
use service::admin::{DashboardStats, UserList, UserListQuery};
use service::audit::{ActionQuery, AuditLogView};
use service::vendors::VendorFlags;

use crate::envelope::{ok, Envelope};
use crate::errors::{AppError, AppResult};
use crate::extract::{ApiPath, ApiQuery, CurrentActor, JsonBody};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct UserListParams {
    /// Default 10.
    pub limit: Option<u64>,
    pub skip: Option<u64>,
    /// Matches name, email or phone, case-insensitive.
    pub search: Option<String>,
    #[serde(default)]
    pub include_deleted: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct StatusUpdateRequest {
    #[schema(value_type = String, example = "SUSPENDED")]
    pub status: UserStatus,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct UserLogParams {
    /// Default 50.
    pub limit: Option<u64>,
    pub skip: Option<u64>,
    pub action: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ActionLogParams {
    /// Default 100.
    pub limit: Option<u64>,
    pub skip: Option<u64>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

fn parse_action(raw: &str) -> AppResult<AuditAction> {
    AuditAction::parse(raw).ok_or_else(|| AppError::Validation(format!("Invalid audit action: {raw}")))
}

#[utoipa::path(get, path = "/admin/dashboard", tag = "admin", security(("bearer" = [])), responses((status = 200, description = "Headline counters; zeros when the counts fail")))]
pub async fn dashboard_stats(State(state): State<AppState>) -> AppResult<Envelope<DashboardStats>> {
    let stats = state.admin.dashboard_stats().await;
    Ok(ok("Dashboard stats fetched successfully", stats))
}

#[utoipa::path(get, path = "/admin/users", tag = "admin", security(("bearer" = [])), params(UserListParams), responses((status = 200, description = "Users, newest first")))]
pub async fn list_users(State(state): State<AppState>, ApiQuery(params): ApiQuery<UserListParams>) -> AppResult<Envelope<UserList>> {
    let query = UserListQuery {
        limit: params.limit,
        skip: params.skip,
        search: params.search,
        include_deleted: params.include_deleted,
    };
    let list = state.admin.list_users(query).await?;
    Ok(ok("Users fetched successfully", list))
}

#[utoipa::path(put, path = "/admin/users/{id}/status", tag = "admin", security(("bearer" = [])), params(("id" = Uuid, Path, description = "User id")), request_body = StatusUpdateRequest, responses((status = 200, description = "Status updated"), (status = 404, description = "User not found")))]
pub async fn update_user_status(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ApiPath(id): ApiPath<Uuid>,
    JsonBody(body): JsonBody<StatusUpdateRequest>,
) -> AppResult<Envelope<user::Model>> {
    let updated = state.admin.update_user_status(&actor, id, body.status).await?;
    Ok(ok("User status updated successfully", updated))
}

#[utoipa::path(get, path = "/admin/audit-logs/user/{id}", tag = "admin", security(("bearer" = [])), params(("id" = Uuid, Path, description = "User id"), UserLogParams), responses((status = 200, description = "Audit entries for the user, newest first"), (status = 400, description = "Unknown action")))]
pub async fn user_audit_logs(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiQuery(params): ApiQuery<UserLogParams>,
) -> AppResult<Envelope<Vec<audit_log::Model>>> {
    let action = params.action.as_deref().map(parse_action).transpose()?;
    let logs = state.admin.user_audit_logs(id, params.limit, params.skip, action).await?;
    Ok(ok("Audit logs fetched successfully", logs))
}

#[utoipa::path(get, path = "/admin/audit-logs/action/{action}", tag = "admin", security(("bearer" = [])), params(("action" = String, Path, description = "Audit action, e.g. login"), ActionLogParams), responses((status = 200, description = "Entries with the actor's name and phone"), (status = 400, description = "Unknown action")))]
pub async fn audit_logs_by_action(
    State(state): State<AppState>,
    ApiPath(action): ApiPath<String>,
    ApiQuery(params): ApiQuery<ActionLogParams>,
) -> AppResult<Envelope<Vec<AuditLogView>>> {
    let action = parse_action(&action)?;
    let query = ActionQuery { limit: params.limit, skip: params.skip, start_date: params.start_date, end_date: params.end_date };
    let logs = state.admin.audit_logs_by_action(action, query).await?;
    Ok(ok("Audit logs fetched successfully", logs))
}

#[utoipa::path(put, path = "/admin/vendors/{id}/flags", tag = "admin", security(("bearer" = [])), params(("id" = Uuid, Path, description = "Vendor id")), request_body = crate::openapi::VendorFlagsDoc, responses((status = 200, description = "Moderation flags updated"), (status = 404, description = "Vendor not found")))]
pub async fn set_vendor_flags(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    JsonBody(flags): JsonBody<VendorFlags>,
) -> AppResult<Envelope<vendor::Model>> {
    let updated = state.vendors.set_flags(id, flags).await?;
    Ok(ok("Vendor updated successfully", updated))
}
