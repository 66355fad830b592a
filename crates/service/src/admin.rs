//! Back-office queries: headline stats, user moderation and audit-log browsing.
use chrono::{Duration, Utc};
use sea_orm::{
    sea_query::{Expr, Func},
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, IntoActiveModel, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::Serialize;
use serde_json::json;
use tracing::{error, instrument};
use uuid::Uuid;

use models::enums::{AuditAction, UserStatus};
use models::{audit_log, booking, user, vendor};

use crate::audit::{ActionQuery, Actor, AuditLogView, AuditService};
use crate::errors::ServiceError;
use crate::pagination::Window;

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_users: u64,
    pub total_vendors: u64,
    pub total_bookings: u64,
    pub recent_logins: u64,
    pub recent_payments: u64,
}

#[derive(Debug, Clone, Default)]
pub struct UserListQuery {
    pub limit: Option<u64>,
    pub skip: Option<u64>,
    pub search: Option<String>,
    pub include_deleted: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserList {
    pub users: Vec<user::Model>,
    pub total: u64,
    pub limit: u64,
    pub skip: u64,
}

#[derive(Clone)]
pub struct AdminService {
    db: DatabaseConnection,
    audit: AuditService,
}

impl AdminService {
    pub fn new(db: DatabaseConnection, audit: AuditService) -> Self { Self { db, audit } }

    /// Counts for the admin home screen; zeros when any query fails.
    pub async fn dashboard_stats(&self) -> DashboardStats {
        match self.try_stats().await {
            Ok(stats) => stats,
            Err(e) => {
                error!(event = "dashboard_stats_failed", error = %e);
                DashboardStats::default()
            }
        }
    }

    async fn try_stats(&self) -> Result<DashboardStats, ServiceError> {
        let since = Utc::now() - Duration::hours(24);
        let recent = |action: AuditAction| {
            audit_log::Entity::find()
                .filter(audit_log::Column::Action.eq(action))
                .filter(audit_log::Column::Timestamp.gte(since))
                .count(&self.db)
        };
        let (total_users, total_vendors, total_bookings, recent_logins, recent_payments) = tokio::try_join!(
            user::Entity::find().filter(user::Column::IsActive.eq(true)).count(&self.db),
            vendor::Entity::find()
                .filter(vendor::Column::IsActive.eq(true))
                .filter(vendor::Column::IsVerified.eq(true))
                .count(&self.db),
            booking::Entity::find().count(&self.db),
            recent(AuditAction::Login),
            recent(AuditAction::Payment),
        )?;
        Ok(DashboardStats { total_users, total_vendors, total_bookings, recent_logins, recent_payments })
    }

    /// Newest users first; `search` matches name, email or phone case-insensitively.
    pub async fn list_users(&self, query: UserListQuery) -> Result<UserList, ServiceError> {
        let window = Window::new(query.limit, query.skip, 10);
        let mut q = user::Entity::find();
        if !query.include_deleted {
            q = q.filter(user::Column::DeletedAt.is_null());
        }
        if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let pattern = format!("%{}%", search.to_lowercase());
            let lower = |col: user::Column| Expr::expr(Func::lower(Expr::col(col)));
            q = q.filter(
                Condition::any()
                    .add(lower(user::Column::Name).like(pattern.clone()))
                    .add(lower(user::Column::Email).like(pattern.clone()))
                    .add(lower(user::Column::PhoneNumber).like(pattern)),
            );
        }
        let total = q.clone().count(&self.db).await?;
        let users = q
            .order_by_desc(user::Column::CreatedAt)
            .offset(window.skip)
            .limit(window.limit)
            .all(&self.db)
            .await?;
        Ok(UserList { users, total, limit: window.limit, skip: window.skip })
    }

    /// `ACTIVE` re-enables the account, anything else disables it.
    #[instrument(skip(self, actor), fields(admin_id = %actor.id, user_id = %user_id))]
    pub async fn update_user_status(&self, actor: &Actor, user_id: Uuid, status: UserStatus) -> Result<user::Model, ServiceError> {
        let found = user::Entity::find_by_id(user_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("User"))?;
        let old_status = found.status;
        let mut am = found.into_active_model();
        am.status = Set(status);
        am.is_active = Set(status == UserStatus::Active);
        am.updated_at = Set(Utc::now().into());
        let updated = am.update(&self.db).await?;

        self.audit
            .record(actor.audit(AuditAction::UserStatusUpdated).details(json!({
                "targetUser": user_id,
                "oldStatus": old_status,
                "newStatus": status,
            })))
            .await;
        Ok(updated)
    }

    pub async fn user_audit_logs(
        &self,
        user_id: Uuid,
        limit: Option<u64>,
        skip: Option<u64>,
        action: Option<AuditAction>,
    ) -> Result<Vec<audit_log::Model>, ServiceError> {
        self.audit.user_logs(user_id, Window::new(limit, skip, 50), action).await
    }

    pub async fn audit_logs_by_action(&self, action: AuditAction, query: ActionQuery) -> Result<Vec<AuditLogView>, ServiceError> {
        self.audit.logs_by_action(action, query).await
    }
}
