use axum::extract::State;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use models::notification;
use service::notifications;

use crate::envelope::{ok, Envelope};
use crate::errors::AppResult;
use crate::extract::{ApiPath, AuthContext, JsonBody};
use crate::state::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct MuteRequest {
    #[serde(default = "muted_default")]
    pub muted: bool,
}

fn muted_default() -> bool { true }

#[utoipa::path(get, path = "/notifications", tag = "notifications", security(("bearer" = [])), responses((status = 200, description = "Unexpired notifications, newest first")))]
pub async fn list(State(state): State<AppState>, ctx: AuthContext) -> AppResult<Envelope<Vec<notification::Model>>> {
    let list = notifications::list_for(&state.db, ctx.id).await?;
    Ok(ok("Notifications fetched successfully", list))
}

#[utoipa::path(put, path = "/notifications/{id}/read", tag = "notifications", security(("bearer" = [])), params(("id" = Uuid, Path, description = "Notification id")), responses((status = 200, description = "Marked read"), (status = 404, description = "Notification not found")))]
pub async fn mark_read(
    State(state): State<AppState>,
    ctx: AuthContext,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<Envelope<notification::Model>> {
    let updated = notifications::mark_read(&state.db, ctx.id, id).await?;
    Ok(ok("Notification marked as read", updated))
}

#[utoipa::path(put, path = "/notifications/{id}/mute", tag = "notifications", security(("bearer" = [])), params(("id" = Uuid, Path, description = "Notification id")), request_body = MuteRequest, responses((status = 200, description = "Mute flag set"), (status = 404, description = "Notification not found")))]
pub async fn mute(
    State(state): State<AppState>,
    ctx: AuthContext,
    ApiPath(id): ApiPath<Uuid>,
    body: Option<JsonBody<MuteRequest>>,
) -> AppResult<Envelope<notification::Model>> {
    let muted = body.map_or(true, |JsonBody(b)| b.muted);
    let updated = notifications::set_muted(&state.db, ctx.id, id, muted).await?;
    let message = if muted { "Notification muted" } else { "Notification unmuted" };
    Ok(ok(message, updated))
}
