use axum::extract::State;
use serde::Deserialize;
use utoipa::ToSchema;

use models::{offering, vendor};
use service::bookings::{BookingView, VendorHistory};
use service::vendors::VendorProfile;

use crate::envelope::{ok, Envelope};
use crate::errors::AppResult;
use crate::extract::{AuthContext, CurrentActor, JsonBody};
use crate::state::AppState;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DutyRequest {
    pub is_on: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServicesRequest {
    #[serde(default)]
    pub service_ids: Vec<String>,
}

#[utoipa::path(get, path = "/vendors/profile", tag = "vendors", security(("bearer" = [])), responses((status = 200, description = "Vendor profile with offered services"), (status = 404, description = "Vendor not found")))]
pub async fn get_profile(State(state): State<AppState>, ctx: AuthContext) -> AppResult<Envelope<VendorProfile>> {
    let profile = state.vendors.profile(ctx.id).await?;
    Ok(ok("Profile fetched successfully", profile))
}

#[utoipa::path(put, path = "/vendors/duty", tag = "vendors", security(("bearer" = [])), request_body = DutyRequest, responses((status = 200, description = "Duty status changed")))]
pub async fn toggle_duty(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    JsonBody(body): JsonBody<DutyRequest>,
) -> AppResult<Envelope<vendor::Model>> {
    let updated = state.vendors.toggle_duty(&actor, body.is_on).await?;
    let message = if body.is_on { "You are now on duty" } else { "You are now off duty" };
    Ok(ok(message, updated))
}

#[utoipa::path(put, path = "/vendors/services", tag = "vendors", security(("bearer" = [])), request_body = ServicesRequest, responses((status = 200, description = "Offered services replaced"), (status = 404, description = "Unknown service id")))]
pub async fn set_services(
    State(state): State<AppState>,
    ctx: AuthContext,
    JsonBody(body): JsonBody<ServicesRequest>,
) -> AppResult<Envelope<Vec<offering::Model>>> {
    let services = state.vendors.set_services(ctx.id, &body.service_ids).await?;
    Ok(ok("Services updated successfully", services))
}

#[utoipa::path(get, path = "/vendors/leads", tag = "vendors", security(("bearer" = [])), responses((status = 200, description = "Unassigned bookings this vendor has not rejected")))]
pub async fn open_leads(State(state): State<AppState>, ctx: AuthContext) -> AppResult<Envelope<Vec<BookingView>>> {
    let leads = state.bookings.open_leads(ctx.id).await?;
    Ok(ok("Leads fetched successfully", leads))
}

#[utoipa::path(get, path = "/vendors/leads/later", tag = "vendors", security(("bearer" = [])), responses((status = 200, description = "Leads saved for later")))]
pub async fn later_leads(State(state): State<AppState>, ctx: AuthContext) -> AppResult<Envelope<Vec<BookingView>>> {
    let leads = state.bookings.vendor_later(ctx.id).await?;
    Ok(ok("Later leads fetched successfully", leads))
}

#[utoipa::path(get, path = "/vendors/history", tag = "vendors", security(("bearer" = [])), responses((status = 200, description = "Assigned bookings and later leads")))]
pub async fn history(State(state): State<AppState>, ctx: AuthContext) -> AppResult<Envelope<VendorHistory>> {
    let history = state.bookings.vendor_history(ctx.id).await?;
    Ok(ok("Booking history fetched successfully", history))
}
