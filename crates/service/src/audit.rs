//! Best-effort audit trail. Writes never fail the caller: errors are logged and swallowed.
use std::net::SocketAddr;

use axum::http::HeaderMap;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{error, instrument};
use uuid::Uuid;

use models::audit_log;
use models::enums::{ActorModel, AuditAction, Role};
use models::{admin, user, vendor};

use crate::errors::ServiceError;
use crate::pagination::Window;

const REDACTED_KEYS: &[&str] = &["pin", "confirmPin", "newPin", "password", "confirmPassword", "otp", "refreshToken"];

/// Client address and agent captured for each audit entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestInfo {
    pub ip: Option<String>,
    pub user_agent: Option<String>,
}

impl RequestInfo {
    /// Client address as seen through `trusted_proxies` reverse proxies.
    ///
    /// Each trusted proxy appends the address it received the request from, so the
    /// client is `trusted_proxies` entries from the right of `X-Forwarded-For`; anything
    /// further left is client-supplied. With no trusted proxies the socket peer is used.
    pub fn from_parts(headers: &HeaderMap, peer: Option<SocketAddr>, trusted_proxies: usize) -> Self {
        let hops: Vec<&str> = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(',').map(str::trim).filter(|h| !h.is_empty()).collect())
            .unwrap_or_default();
        let forwarded = match trusted_proxies {
            0 => None,
            n => hops.get(hops.len().saturating_sub(n)).map(|h| h.to_string()),
        };
        let ip = forwarded.or_else(|| peer.map(|p| p.ip().to_string()));
        let user_agent = headers
            .get(axum::http::header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        Self { ip, user_agent }
    }
}

#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub action: AuditAction,
    pub actor_id: Option<Uuid>,
    pub actor_model: Option<ActorModel>,
    pub details: Option<Value>,
    pub request: RequestInfo,
}

impl AuditEntry {
    pub fn new(action: AuditAction, actor_id: Uuid, actor_model: ActorModel) -> Self {
        Self { action, actor_id: Some(actor_id), actor_model: Some(actor_model), details: None, request: RequestInfo::default() }
    }

    pub fn details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn request(mut self, request: RequestInfo) -> Self {
        self.request = request;
        self
    }
}

/// Authenticated caller of a service operation.
#[derive(Debug, Clone)]
pub struct Actor {
    pub id: Uuid,
    pub role: Role,
    pub request: RequestInfo,
}

impl Actor {
    pub fn new(id: Uuid, role: Role) -> Self {
        Self { id, role, request: RequestInfo::default() }
    }

    pub fn with_request(mut self, request: RequestInfo) -> Self {
        self.request = request;
        self
    }

    pub fn audit(&self, action: AuditAction) -> AuditEntry {
        AuditEntry::new(action, self.id, self.role.actor_model()).request(self.request.clone())
    }
}

/// Drops credential-like keys from a JSON object before it is persisted.
pub fn redact(mut body: Map<String, Value>) -> Map<String, Value> {
    for key in REDACTED_KEYS {
        body.remove(*key);
    }
    body
}

/// Name and phone of whoever performed an audited action.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActorSummary {
    pub id: Uuid,
    pub name: String,
    pub phone_number: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogView {
    #[serde(flatten)]
    pub log: audit_log::Model,
    pub actor: Option<ActorSummary>,
}

#[derive(Debug, Clone, Default)]
pub struct ActionQuery {
    pub limit: Option<u64>,
    pub skip: Option<u64>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

#[derive(Clone)]
pub struct AuditService {
    db: DatabaseConnection,
}

impl AuditService {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }

    /// Persist an entry; `None` when the write failed.
    #[instrument(skip(self, entry), fields(action = ?entry.action, actor_id = ?entry.actor_id))]
    pub async fn record(&self, entry: AuditEntry) -> Option<audit_log::Model> {
        let am = audit_log::ActiveModel {
            id: Set(Uuid::new_v4()),
            action: Set(entry.action),
            actor_id: Set(entry.actor_id),
            actor_model: Set(entry.actor_model),
            details: Set(entry.details),
            ip: Set(entry.request.ip),
            user_agent: Set(entry.request.user_agent),
            timestamp: Set(Utc::now().into()),
        };
        match am.insert(&self.db).await {
            Ok(m) => Some(m),
            Err(e) => {
                common::metrics::AUDIT_WRITE_FAILURES_TOTAL.inc();
                error!(event = "audit_write_failed", error = %e, "failed to create audit log");
                None
            }
        }
    }

    /// Fire-and-forget variant of [`record`](Self::record).
    pub fn record_detached(&self, entry: AuditEntry) {
        let this = self.clone();
        tokio::spawn(async move {
            this.record(entry).await;
        });
    }

    /// Newest-first logs of one actor, optionally narrowed to an action.
    pub async fn user_logs(
        &self,
        actor_id: Uuid,
        window: Window,
        action: Option<AuditAction>,
    ) -> Result<Vec<audit_log::Model>, ServiceError> {
        let mut q = audit_log::Entity::find().filter(audit_log::Column::ActorId.eq(actor_id));
        if let Some(action) = action {
            q = q.filter(audit_log::Column::Action.eq(action));
        }
        let logs = q
            .order_by_desc(audit_log::Column::Timestamp)
            .offset(window.skip)
            .limit(window.limit)
            .all(&self.db)
            .await?;
        Ok(logs)
    }

    /// Newest-first logs of one action with the actor's name and phone resolved.
    pub async fn logs_by_action(&self, action: AuditAction, query: ActionQuery) -> Result<Vec<AuditLogView>, ServiceError> {
        let window = Window::new(query.limit, query.skip, 100);
        let mut q = audit_log::Entity::find().filter(audit_log::Column::Action.eq(action));
        if let Some(start) = query.start_date {
            q = q.filter(audit_log::Column::Timestamp.gte(start));
        }
        if let Some(end) = query.end_date {
            q = q.filter(audit_log::Column::Timestamp.lte(end));
        }
        let logs = q
            .order_by_desc(audit_log::Column::Timestamp)
            .offset(window.skip)
            .limit(window.limit)
            .all(&self.db)
            .await?;

        let mut out = Vec::with_capacity(logs.len());
        for log in logs {
            let actor = match (log.actor_id, log.actor_model) {
                (Some(id), Some(model)) => self.resolve_actor(id, model).await?,
                _ => None,
            };
            out.push(AuditLogView { log, actor });
        }
        Ok(out)
    }

    async fn resolve_actor(&self, id: Uuid, model: ActorModel) -> Result<Option<ActorSummary>, ServiceError> {
        let found = match model {
            ActorModel::User => user::Entity::find_by_id(id)
                .one(&self.db)
                .await?
                .map(|u| ActorSummary { id, name: u.name, phone_number: Some(u.phone_number) }),
            ActorModel::Vendor => vendor::Entity::find_by_id(id)
                .one(&self.db)
                .await?
                .map(|v| ActorSummary { id, name: v.name, phone_number: Some(v.phone_number) }),
            ActorModel::Admin => admin::Entity::find_by_id(id)
                .one(&self.db)
                .await?
                .map(|a| ActorSummary { id, name: a.name, phone_number: a.phone_number }),
        };
        Ok(found)
    }
}
