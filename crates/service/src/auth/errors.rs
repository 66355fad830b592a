use thiserror::Error;

/// Business errors for auth workflows
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    NotFound(String),
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Account is locked. Please try again later")]
    Locked,
    #[error("{0}")]
    Inactive(String),
    #[error("Please verify your phone number first")]
    NotVerified,
    #[error("Invalid or expired OTP")]
    InvalidOtp,
    #[error("{0}")]
    SessionExpired(String),
    #[error("Unauthorized access")]
    TokenInvalid,
    #[error("Token expired")]
    TokenExpired,
    #[error("hashing error: {0}")]
    HashError(String),
    #[error("token error: {0}")]
    TokenError(String),
    #[error("repository error: {0}")]
    Repository(String),
}

impl AuthError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            AuthError::Validation(_) => 1001,
            AuthError::Conflict(_) => 1002,
            AuthError::NotFound(_) => 1003,
            AuthError::InvalidCredentials => 1004,
            AuthError::Locked => 1005,
            AuthError::Inactive(_) => 1006,
            AuthError::NotVerified => 1007,
            AuthError::InvalidOtp => 1008,
            AuthError::SessionExpired(_) => 1009,
            AuthError::TokenInvalid => 1010,
            AuthError::TokenExpired => 1011,
            AuthError::HashError(_) => 1101,
            AuthError::TokenError(_) => 1102,
            AuthError::Repository(_) => 1200,
        }
    }
}
