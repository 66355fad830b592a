use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use common::types::ApiResponse;

pub type Envelope<T> = Json<ApiResponse<T>>;

pub fn ok<T: Serialize>(message: &str, data: T) -> Envelope<T> {
    Json(ApiResponse::success(message, data))
}

pub fn created<T: Serialize>(message: &str, data: T) -> (StatusCode, Envelope<T>) {
    (StatusCode::CREATED, Json(ApiResponse::success(message, data)))
}

pub fn done(message: &str) -> Envelope<()> {
    Json(ApiResponse::message(message))
}
