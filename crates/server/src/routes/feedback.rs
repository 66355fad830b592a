use axum::extract::State;
use axum::http::StatusCode;
use uuid::Uuid;

use models::feedback;
use service::feedback::{self as reviews, FeedbackCheck, FeedbackInput, UserReview, VendorFeedback};

use crate::envelope::{created, ok, Envelope};
use crate::errors::AppResult;
use crate::extract::{ApiPath, AuthContext, JsonBody};
use crate::state::AppState;

#[utoipa::path(post, path = "/feedback", tag = "feedback", security(("bearer" = [])), request_body = crate::openapi::FeedbackDoc, responses((status = 201, description = "Feedback stored"), (status = 400, description = "Booking not completed, duplicate or invalid rating"), (status = 404, description = "Booking not found")))]
pub async fn submit(
    State(state): State<AppState>,
    ctx: AuthContext,
    JsonBody(input): JsonBody<FeedbackInput>,
) -> AppResult<(StatusCode, Envelope<feedback::Model>)> {
    let stored = reviews::submit(&state.db, ctx.id, input).await?;
    Ok(created("Feedback submitted successfully", stored))
}

#[utoipa::path(get, path = "/feedback/vendor/{id}", tag = "feedback", params(("id" = Uuid, Path, description = "Vendor id")), responses((status = 200, description = "Average rating and reviews")))]
pub async fn vendor_feedback(State(state): State<AppState>, ApiPath(id): ApiPath<Uuid>) -> AppResult<Envelope<VendorFeedback>> {
    let summary = reviews::vendor_feedback(&state.db, id).await?;
    Ok(ok("Vendor feedback fetched successfully", summary))
}

#[utoipa::path(get, path = "/feedback/my", tag = "feedback", security(("bearer" = [])), responses((status = 200, description = "Feedback written by the caller")))]
pub async fn my_feedback(State(state): State<AppState>, ctx: AuthContext) -> AppResult<Envelope<Vec<UserReview>>> {
    let list = reviews::my_feedback(&state.db, ctx.id).await?;
    Ok(ok("Feedback fetched successfully", list))
}

#[utoipa::path(get, path = "/feedback/check/{booking_id}", tag = "feedback", security(("bearer" = [])), params(("booking_id" = String, Path, description = "Booking UUID or booking code")), responses((status = 200, description = "Whether feedback exists")))]
pub async fn check(
    State(state): State<AppState>,
    ctx: AuthContext,
    ApiPath(booking_id): ApiPath<String>,
) -> AppResult<Envelope<FeedbackCheck>> {
    let result = reviews::check(&state.db, ctx.id, &booking_id).await?;
    Ok(ok("Feedback status fetched successfully", result))
}
