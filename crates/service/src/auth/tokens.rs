//! HS256 access/refresh tokens. The two kinds are signed with different secrets.
use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use models::enums::Role;

use super::errors::AuthError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    pub sub: Uuid,
    pub role: Role,
    pub iat: usize,
    pub exp: usize,
}

#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: u64,
}

#[derive(Clone)]
pub struct TokenIssuer {
    access_secret: String,
    refresh_secret: String,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenIssuer {
    pub fn new(access_secret: impl Into<String>, refresh_secret: impl Into<String>, access_ttl: Duration, refresh_ttl: Duration) -> Self {
        Self {
            access_secret: access_secret.into(),
            refresh_secret: refresh_secret.into(),
            access_ttl,
            refresh_ttl,
        }
    }

    pub fn from_config(cfg: &configs::AuthConfig) -> Self {
        Self::new(
            cfg.jwt_secret.clone(),
            cfg.jwt_refresh_secret.clone(),
            Duration::from_secs(cfg.access_ttl_secs),
            Duration::from_secs(cfg.refresh_ttl_secs),
        )
    }

    pub fn access_ttl_secs(&self) -> u64 {
        self.access_ttl.as_secs()
    }

    pub fn issue_pair(&self, sub: Uuid, role: Role) -> Result<TokenPair, AuthError> {
        Ok(TokenPair {
            access_token: self.issue_access(sub, role)?,
            refresh_token: sign(&self.refresh_secret, &claims(sub, role, self.refresh_ttl))?,
            expires_in: self.access_ttl.as_secs(),
        })
    }

    pub fn issue_access(&self, sub: Uuid, role: Role) -> Result<String, AuthError> {
        sign(&self.access_secret, &claims(sub, role, self.access_ttl))
    }

    pub fn verify_access(&self, token: &str) -> Result<Claims, AuthError> {
        verify(&self.access_secret, token)
    }

    pub fn verify_refresh(&self, token: &str) -> Result<Claims, AuthError> {
        verify(&self.refresh_secret, token)
    }
}

fn claims(sub: Uuid, role: Role, ttl: Duration) -> Claims {
    let now = Utc::now().timestamp().max(0) as usize;
    Claims { sub, role, iat: now, exp: now + ttl.as_secs() as usize }
}

fn sign(secret: &str, claims: &Claims) -> Result<String, AuthError> {
    encode(&Header::new(Algorithm::HS256), claims, &EncodingKey::from_secret(secret.as_bytes()))
        .map_err(|e| AuthError::TokenError(e.to_string()))
}

fn verify(secret: &str, token: &str) -> Result<Claims, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::TokenInvalid,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer() -> TokenIssuer {
        TokenIssuer::new("access", "refresh", Duration::from_secs(60), Duration::from_secs(600))
    }

    #[test]
    fn access_and_refresh_are_not_interchangeable() {
        let id = Uuid::new_v4();
        let pair = issuer().issue_pair(id, Role::Vendor).unwrap();
        let claims = issuer().verify_access(&pair.access_token).unwrap();
        assert_eq!(claims.sub, id);
        assert_eq!(claims.role, Role::Vendor);
        assert!(matches!(issuer().verify_access(&pair.refresh_token), Err(AuthError::TokenInvalid)));
        assert!(issuer().verify_refresh(&pair.refresh_token).is_ok());
        assert_eq!(pair.expires_in, 60);
    }

    #[test]
    fn expired_token_is_reported_as_expired() {
        let now = Utc::now().timestamp() as usize;
        let stale = Claims { sub: Uuid::new_v4(), role: Role::User, iat: now - 120, exp: now - 60 };
        let token = sign("access", &stale).unwrap();
        assert!(matches!(issuer().verify_access(&token), Err(AuthError::TokenExpired)));
        assert!(matches!(issuer().verify_access("garbage"), Err(AuthError::TokenInvalid)));
    }
}
