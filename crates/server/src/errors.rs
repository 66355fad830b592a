use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::{error, warn};
use validator::ValidationErrors;

use common::types::ApiResponse;
use service::auth::errors::AuthError;
use service::errors::ServiceError;

/// Every failure a handler can surface, rendered as the `{success, message, data}` envelope.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error("{0}")]
    Validation(String),
    #[error("Invalid JSON payload")]
    InvalidJson,
    #[error("Resource not found")]
    BadPath,
    #[error("Route {0} not found")]
    RouteNotFound(String),
    #[error("Unauthorized access")]
    Unauthorized,
    #[error("{0}")]
    Forbidden(String),
    #[error("Too many requests, please try again later")]
    TooManyRequests,
    #[error("{0}")]
    Internal(String),
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self { AppError::Service(ServiceError::Auth(e)) }
}

impl From<ValidationErrors> for AppError {
    fn from(e: ValidationErrors) -> Self { AppError::Validation(join_validation(&e)) }
}

/// Field messages sorted by field name and joined with ", ".
pub fn join_validation(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));
    let messages: Vec<String> = fields
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(m) => m.to_string(),
                None => format!("{field} is invalid"),
            })
        })
        .collect();
    messages.join(", ")
}

fn auth_status(e: &AuthError) -> StatusCode {
    match e {
        AuthError::Validation(_)
        | AuthError::Conflict(_)
        | AuthError::InvalidOtp
        | AuthError::SessionExpired(_) => StatusCode::BAD_REQUEST,
        AuthError::NotFound(_) => StatusCode::NOT_FOUND,
        AuthError::InvalidCredentials | AuthError::TokenInvalid | AuthError::TokenExpired => StatusCode::UNAUTHORIZED,
        AuthError::Locked | AuthError::Inactive(_) | AuthError::NotVerified => StatusCode::FORBIDDEN,
        AuthError::HashError(_) | AuthError::TokenError(_) | AuthError::Repository(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Service(e) => match e {
                ServiceError::Validation(_) | ServiceError::Conflict(_) => StatusCode::BAD_REQUEST,
                ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
                ServiceError::Forbidden(_) => StatusCode::FORBIDDEN,
                ServiceError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                ServiceError::Upstream(_) => StatusCode::BAD_GATEWAY,
                ServiceError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
                ServiceError::Auth(a) => auth_status(a),
            },
            AppError::Validation(_) | AppError::InvalidJson => StatusCode::BAD_REQUEST,
            AppError::BadPath | AppError::RouteNotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing message. Database and internal failures are masked.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Internal(_)
            | AppError::Service(ServiceError::Db(_))
            | AppError::Service(ServiceError::Auth(
                AuthError::HashError(_) | AuthError::TokenError(_) | AuthError::Repository(_),
            )) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, status = status.as_u16(), "request failed");
        } else {
            warn!(error = %self, status = status.as_u16(), "request rejected");
        }
        let message = self.public_message();
        (status, Json(ApiResponse::<()>::failure(message))).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}
