use models::errors::ModelError;
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

use crate::auth::errors::AuthError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    /// Unique-key collision, rendered as "{field} already exists".
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    Unavailable(String),
    #[error("upstream error: {0}")]
    Upstream(String),
    #[error("database error: {0}")]
    Db(String),
    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self { Self::NotFound(format!("{} not found", entity)) }
}

impl From<DbErr> for ServiceError {
    fn from(e: DbErr) -> Self {
        match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(msg)) => {
                ServiceError::Conflict(format!("{} already exists", duplicate_field(&msg)))
            }
            Some(SqlErr::ForeignKeyConstraintViolation(_)) => {
                ServiceError::Validation("Referenced resource does not exist or is still in use".into())
            }
            _ => ServiceError::Db(e.to_string()),
        }
    }
}

impl From<ModelError> for ServiceError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::Validation(msg) => ServiceError::Validation(msg),
            ModelError::Db(db) => db.into(),
        }
    }
}

/// Best-effort column name from a driver's unique violation message, camelCased for clients.
pub(crate) fn duplicate_field(msg: &str) -> String {
    // sqlite: "UNIQUE constraint failed: user.phone_number"
    // postgres: "duplicate key value violates unique constraint \"user_phone_number_key\""
    let raw = if let Some(rest) = msg.split("UNIQUE constraint failed:").nth(1) {
        rest.trim()
            .split(',')
            .next()
            .and_then(|col| col.rsplit('.').next())
            .unwrap_or("")
            .to_string()
    } else if let Some(rest) = msg.split("unique constraint \"").nth(1) {
        let name = rest.split('"').next().unwrap_or("");
        let name = name.strip_suffix("_key").unwrap_or(name);
        name.split_once('_').map(|(_, col)| col.to_string()).unwrap_or_default()
    } else {
        String::new()
    };
    if raw.is_empty() {
        return "Resource".to_string();
    }
    let mut out = String::with_capacity(raw.len());
    let mut upper = false;
    for ch in raw.chars() {
        if ch == '_' {
            upper = true;
        } else if upper {
            out.extend(ch.to_uppercase());
            upper = false;
        } else {
            out.push(ch);
        }
    }
    out
}
