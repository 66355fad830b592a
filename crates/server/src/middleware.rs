//! Bearer auth, role guards, rate limiting, metrics and audit middleware.
use std::sync::Arc;
use std::time::Instant;

use axum::body::{to_bytes, Body};
use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use serde_json::Value;
use tracing::debug;

use common::metrics::{HTTP_REQUESTS_TOTAL, HTTP_REQUEST_DURATION, RATE_LIMITED_TOTAL};
use models::enums::{AuditAction, Role};
use service::audit::{redact, AuditEntry, AuditService};

use crate::errors::AppError;
use crate::extract::{request_info, AuthContext};
use crate::state::{AppState, Limiters};

pub const ADMINS: &[Role] = &[Role::Admin, Role::SuperAdmin];
pub const SUPER_ADMINS: &[Role] = &[Role::SuperAdmin];
pub const USERS: &[Role] = &[Role::User];
pub const VENDORS: &[Role] = &[Role::Vendor];

const MAX_AUDITED_BODY: usize = 64 * 1024;

/// Verify `Authorization: Bearer <token>` and stash the caller as [`AuthContext`].
pub async fn require_auth(State(state): State<AppState>, mut req: Request, next: Next) -> Result<Response, AppError> {
    let token = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AppError::Unauthorized)?;
    let claims = state.auth.verify_access(token)?;
    debug!(user_id = %claims.sub, role = claims.role.as_str(), "authenticated");
    req.extensions_mut().insert(AuthContext { id: claims.sub, role: claims.role });
    Ok(next.run(req).await)
}

/// Reject callers whose role is not in the allowed set.
pub async fn require_roles(State(allowed): State<&'static [Role]>, req: Request, next: Next) -> Result<Response, AppError> {
    let ctx = req.extensions().get::<AuthContext>().copied().ok_or(AppError::Unauthorized)?;
    if !allowed.contains(&ctx.role) {
        return Err(AppError::Forbidden("You do not have permission to perform this action".into()));
    }
    Ok(next.run(req).await)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimiterKind {
    Api,
    Auth,
    Otp,
}

/// Fixed-window limit keyed by client address.
pub async fn rate_limit(
    State((limiters, kind)): State<(Arc<Limiters>, LimiterKind)>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let limiter = match kind {
        LimiterKind::Api => &limiters.api,
        LimiterKind::Auth => &limiters.auth,
        LimiterKind::Otp => &limiters.otp,
    };
    let (parts, body) = req.into_parts();
    let key = request_info(&parts).ip.unwrap_or_else(|| "unknown".to_string());
    let decision = limiter.check(&key);
    if !decision.allowed {
        RATE_LIMITED_TOTAL.with_label_values(&[limiter.name()]).inc();
        let mut resp = AppError::TooManyRequests.into_response();
        if let Ok(v) = HeaderValue::from_str(&decision.reset_after.as_secs().to_string()) {
            resp.headers_mut().insert("retry-after", v);
        }
        return Ok(resp);
    }
    let mut resp = next.run(Request::from_parts(parts, body)).await;
    let headers = resp.headers_mut();
    headers.insert("x-ratelimit-limit", HeaderValue::from(decision.limit));
    headers.insert("x-ratelimit-remaining", HeaderValue::from(decision.remaining));
    Ok(resp)
}

pub async fn track_metrics(req: Request, next: Next) -> Response {
    let method = req.method().as_str().to_string();
    let started = Instant::now();
    let resp = next.run(req).await;
    HTTP_REQUESTS_TOTAL.with_label_values(&[method.as_str(), resp.status().as_str()]).inc();
    HTTP_REQUEST_DURATION
        .with_label_values(&[method.as_str()])
        .observe(started.elapsed().as_secs_f64());
    resp
}

/// Record `action` for the authenticated caller once the handler succeeds.
/// Secrets in the JSON body are redacted before they reach the log.
pub async fn audit_trail(
    State((audit, action)): State<(AuditService, AuditAction)>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (parts, body) = req.into_parts();
    let bytes = to_bytes(body, MAX_AUDITED_BODY).await.map_err(|_| AppError::InvalidJson)?;
    let ctx = parts.extensions.get::<AuthContext>().copied();
    let info = request_info(&parts);
    let details = serde_json::from_slice::<Value>(&bytes)
        .ok()
        .and_then(|v| match v {
            Value::Object(map) => Some(Value::Object(redact(map))),
            _ => None,
        });

    let resp = next.run(Request::from_parts(parts, Body::from(bytes))).await;
    if let (true, Some(ctx)) = (resp.status().is_success(), ctx) {
        let mut entry = AuditEntry::new(action, ctx.id, ctx.role.actor_model()).request(info);
        if let Some(details) = details {
            entry = entry.details(details);
        }
        audit.record_detached(entry);
    }
    Ok(resp)
}
