use axum::extract::State;
use serde_json::{Map, Value};

use service::users::Profile;

use crate::envelope::{done, ok, Envelope};
use crate::errors::AppResult;
use crate::extract::{AuthContext, CurrentActor, JsonBody};
use crate::state::AppState;

#[utoipa::path(get, path = "/users/profile", tag = "users", security(("bearer" = [])), responses((status = 200, description = "Own profile"), (status = 404, description = "User not found")))]
pub async fn get_profile(State(state): State<AppState>, ctx: AuthContext) -> AppResult<Envelope<Profile>> {
    let profile = state.users.profile(ctx.id).await?;
    Ok(ok("Profile fetched successfully", profile))
}

/// Only `name`, `email` and `image` (or `photo`) may be sent.
#[utoipa::path(patch, path = "/users/profile", tag = "users", security(("bearer" = [])), request_body = crate::openapi::ProfileUpdateDoc, responses((status = 200, description = "Updated profile"), (status = 400, description = "Invalid updates")))]
pub async fn update_profile(
    State(state): State<AppState>,
    ctx: AuthContext,
    JsonBody(updates): JsonBody<Map<String, Value>>,
) -> AppResult<Envelope<Profile>> {
    let profile = state.users.update_profile(ctx.id, updates).await?;
    Ok(ok("Profile updated successfully", profile))
}

#[utoipa::path(delete, path = "/users/account", tag = "users", security(("bearer" = [])), responses((status = 200, description = "Account and owned records deleted"), (status = 404, description = "User not found")))]
pub async fn delete_account(State(state): State<AppState>, CurrentActor(actor): CurrentActor) -> AppResult<Envelope<()>> {
    state.users.delete_account(&actor).await?;
    Ok(done("Account deleted successfully"))
}
