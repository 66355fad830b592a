use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;
use utoipa::ToSchema;

use models::enums::BookingStatus;
use models::{booking, dispute, lead_response};
use service::bookings::{BookingDetails, BookingView, CategorizedBookings, NewBooking, RetryOutcome};

use crate::envelope::{created, ok, Envelope};
use crate::errors::AppResult;
use crate::extract::{ApiPath, AuthContext, CurrentActor, JsonBody};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CancelRequest {
    pub reason: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct RescheduleRequest {
    /// `YYYY-MM-DD` or RFC 3339.
    pub date: Option<String>,
    pub time: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DisputeRequest {
    pub reason: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct StatusRequest {
    #[schema(value_type = String, example = "arrived")]
    pub status: BookingStatus,
}

#[utoipa::path(post, path = "/bookings", tag = "bookings", security(("bearer" = [])), request_body = crate::openapi::NewBookingDoc, responses((status = 201, description = "Booking created"), (status = 400, description = "No services"), (status = 404, description = "Unknown service")))]
pub async fn create(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    JsonBody(body): JsonBody<NewBooking>,
) -> AppResult<(StatusCode, Envelope<BookingView>)> {
    let view = state.bookings.create(&actor, body).await?;
    Ok(created("Booking created successfully", view))
}

/// Same as booking creation, with the vendor search always started.
#[utoipa::path(post, path = "/bookings/request-lead", tag = "bookings", security(("bearer" = [])), request_body = crate::openapi::NewBookingDoc, responses((status = 201, description = "Booking created, vendor search started")))]
pub async fn request_lead(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    JsonBody(body): JsonBody<NewBooking>,
) -> AppResult<(StatusCode, Envelope<BookingView>)> {
    let view = state.bookings.request_lead(&actor, body).await?;
    Ok(created("Lead requested successfully", view))
}

#[utoipa::path(get, path = "/bookings/mine", tag = "bookings", security(("bearer" = [])), responses((status = 200, description = "Own bookings grouped as pending, active, completed, cancelled")))]
pub async fn my_bookings(State(state): State<AppState>, ctx: AuthContext) -> AppResult<Envelope<CategorizedBookings>> {
    let grouped = state.bookings.my_bookings(ctx.id, ctx.role).await?;
    Ok(ok("Bookings fetched successfully", grouped))
}

#[utoipa::path(get, path = "/bookings/history", tag = "bookings", security(("bearer" = [])), responses((status = 200, description = "Completed bookings")))]
pub async fn completed_history(State(state): State<AppState>, ctx: AuthContext) -> AppResult<Envelope<Vec<BookingView>>> {
    let history = state.bookings.completed_history(ctx.id).await?;
    Ok(ok("Booking history fetched successfully", history))
}

#[utoipa::path(get, path = "/bookings/{id}", tag = "bookings", security(("bearer" = [])), params(("id" = String, Path, description = "Booking UUID or booking code")), responses((status = 200, description = "Booking with start code"), (status = 404, description = "Booking not found")))]
pub async fn details(
    State(state): State<AppState>,
    ctx: AuthContext,
    ApiPath(id): ApiPath<String>,
) -> AppResult<Envelope<BookingDetails>> {
    let details = state.bookings.details(&id, ctx.id, ctx.role).await?;
    Ok(ok("Booking fetched successfully", details))
}

#[utoipa::path(put, path = "/bookings/{id}/cancel", tag = "bookings", security(("bearer" = [])), params(("id" = String, Path, description = "Booking UUID or booking code")), request_body = CancelRequest, responses((status = 200, description = "Cancelled"), (status = 400, description = "Already completed or cancelled"), (status = 404, description = "Booking not found")))]
pub async fn cancel(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ApiPath(id): ApiPath<String>,
    body: Option<JsonBody<CancelRequest>>,
) -> AppResult<Envelope<booking::Model>> {
    let reason = body.and_then(|JsonBody(b)| b.reason);
    let cancelled = state.bookings.cancel(&actor, &id, reason).await?;
    Ok(ok("Booking cancelled successfully", cancelled))
}

#[utoipa::path(put, path = "/bookings/{id}/reschedule", tag = "bookings", security(("bearer" = [])), params(("id" = String, Path, description = "Booking UUID or booking code")), request_body = RescheduleRequest, responses((status = 200, description = "Rescheduled"), (status = 400, description = "Missing slot, limit reached or invalid date")))]
pub async fn reschedule(
    State(state): State<AppState>,
    ctx: AuthContext,
    ApiPath(id): ApiPath<String>,
    JsonBody(body): JsonBody<RescheduleRequest>,
) -> AppResult<Envelope<booking::Model>> {
    let updated = state
        .bookings
        .reschedule(ctx.id, &id, body.date.as_deref(), body.time.as_deref())
        .await?;
    Ok(ok("Booking rescheduled successfully", updated))
}

#[utoipa::path(post, path = "/bookings/{id}/retry-search", tag = "bookings", security(("bearer" = [])), params(("id" = String, Path, description = "Booking UUID or booking code")), responses((status = 200, description = "Search re-run"), (status = 400, description = "Booking no longer awaiting acceptance")))]
pub async fn retry_search(
    State(state): State<AppState>,
    ctx: AuthContext,
    ApiPath(id): ApiPath<String>,
) -> AppResult<Envelope<RetryOutcome>> {
    let outcome = state.bookings.retry_search(ctx.id, &id).await?;
    let message = if outcome.found { "Vendors notified" } else { "No vendors available right now" };
    Ok(ok(message, outcome))
}

#[utoipa::path(post, path = "/bookings/{id}/dispute", tag = "bookings", security(("bearer" = [])), params(("id" = String, Path, description = "Booking UUID or booking code")), request_body = DisputeRequest, responses((status = 201, description = "Dispute opened"), (status = 400, description = "Reason missing")))]
pub async fn raise_dispute(
    State(state): State<AppState>,
    ctx: AuthContext,
    ApiPath(id): ApiPath<String>,
    JsonBody(body): JsonBody<DisputeRequest>,
) -> AppResult<(StatusCode, Envelope<dispute::Model>)> {
    let opened = state.bookings.raise_dispute(ctx.id, &id, &body.reason).await?;
    Ok(created("Dispute raised successfully", opened))
}

#[utoipa::path(post, path = "/bookings/{id}/accept", tag = "bookings", security(("bearer" = [])), params(("id" = String, Path, description = "Booking UUID or booking code")), responses((status = 200, description = "Lead accepted"), (status = 400, description = "Already taken or not awaiting acceptance")))]
pub async fn accept_lead(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ApiPath(id): ApiPath<String>,
) -> AppResult<Envelope<BookingView>> {
    let view = state.bookings.accept_lead(&actor, &id).await?;
    Ok(ok("Lead accepted successfully", view))
}

#[utoipa::path(post, path = "/bookings/{id}/reject", tag = "bookings", security(("bearer" = [])), params(("id" = String, Path, description = "Booking UUID or booking code")), responses((status = 200, description = "Lead rejected")))]
pub async fn reject_lead(
    State(state): State<AppState>,
    ctx: AuthContext,
    ApiPath(id): ApiPath<String>,
) -> AppResult<Envelope<lead_response::Model>> {
    let response = state.bookings.reject_lead(ctx.id, &id).await?;
    Ok(ok("Lead rejected", response))
}

#[utoipa::path(post, path = "/bookings/{id}/later", tag = "bookings", security(("bearer" = [])), params(("id" = String, Path, description = "Booking UUID or booking code")), responses((status = 200, description = "Lead saved for later")))]
pub async fn mark_later(
    State(state): State<AppState>,
    ctx: AuthContext,
    ApiPath(id): ApiPath<String>,
) -> AppResult<Envelope<lead_response::Model>> {
    let response = state.bookings.mark_lead_later(ctx.id, &id).await?;
    Ok(ok("Lead saved for later", response))
}

#[utoipa::path(put, path = "/bookings/{id}/status", tag = "bookings", security(("bearer" = [])), params(("id" = String, Path, description = "Booking UUID or booking code")), request_body = StatusRequest, responses((status = 200, description = "Status advanced"), (status = 400, description = "Transition not allowed"), (status = 403, description = "Not the assigned vendor")))]
pub async fn update_status(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ApiPath(id): ApiPath<String>,
    JsonBody(body): JsonBody<StatusRequest>,
) -> AppResult<Envelope<booking::Model>> {
    let updated = state.bookings.update_status(&actor, &id, body.status).await?;
    Ok(ok("Booking status updated successfully", updated))
}
