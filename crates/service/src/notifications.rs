//! In-app notifications addressed to a user or vendor.
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, IntoActiveModel, QueryFilter, QueryOrder, Set,
};
use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

use models::enums::{ActorModel, NotificationType};
use models::notification;

use crate::errors::ServiceError;

#[derive(Debug, Clone)]
pub struct NewNotification {
    pub recipient_id: Uuid,
    pub recipient_model: ActorModel,
    pub kind: NotificationType,
    pub title: String,
    pub body: String,
    pub data: Option<Value>,
}

pub async fn notify<C: ConnectionTrait>(db: &C, new: NewNotification) -> Result<notification::Model, ServiceError> {
    let now = Utc::now().into();
    let am = notification::ActiveModel {
        id: Set(Uuid::new_v4()),
        recipient_id: Set(new.recipient_id),
        recipient_model: Set(new.recipient_model),
        kind: Set(new.kind),
        title: Set(new.title),
        body: Set(new.body),
        data: Set(new.data),
        is_read: Set(false),
        read_at: Set(None),
        is_muted: Set(false),
        expires_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    };
    Ok(am.insert(db).await?)
}

/// Like [`notify`] but a failure only logs; used on side paths of booking flows.
pub async fn notify_quietly<C: ConnectionTrait>(db: &C, new: NewNotification) {
    let recipient = new.recipient_id;
    if let Err(e) = notify(db, new).await {
        warn!(event = "notification_failed", %recipient, error = %e);
    }
}

/// Non-expired notifications of one recipient, newest first.
pub async fn list_for<C: ConnectionTrait>(db: &C, recipient_id: Uuid) -> Result<Vec<notification::Model>, ServiceError> {
    let now = Utc::now();
    let rows = notification::Entity::find()
        .filter(notification::Column::RecipientId.eq(recipient_id))
        .filter(
            Condition::any()
                .add(notification::Column::ExpiresAt.is_null())
                .add(notification::Column::ExpiresAt.gt(now)),
        )
        .order_by_desc(notification::Column::CreatedAt)
        .all(db)
        .await?;
    Ok(rows)
}

async fn owned<C: ConnectionTrait>(db: &C, recipient_id: Uuid, id: Uuid) -> Result<notification::Model, ServiceError> {
    notification::Entity::find_by_id(id)
        .filter(notification::Column::RecipientId.eq(recipient_id))
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("Notification"))
}

pub async fn mark_read<C: ConnectionTrait>(db: &C, recipient_id: Uuid, id: Uuid) -> Result<notification::Model, ServiceError> {
    let found = owned(db, recipient_id, id).await?;
    if found.is_read {
        return Ok(found);
    }
    let now = Utc::now();
    let mut am = found.into_active_model();
    am.is_read = Set(true);
    am.read_at = Set(Some(now.into()));
    am.updated_at = Set(now.into());
    Ok(am.update(db).await?)
}

pub async fn set_muted<C: ConnectionTrait>(
    db: &C,
    recipient_id: Uuid,
    id: Uuid,
    muted: bool,
) -> Result<notification::Model, ServiceError> {
    let mut am = owned(db, recipient_id, id).await?.into_active_model();
    am.is_muted = Set(muted);
    am.updated_at = Set(Utc::now().into());
    Ok(am.update(db).await?)
}

pub async fn delete_for_recipient<C: ConnectionTrait>(db: &C, recipient_id: Uuid) -> Result<u64, ServiceError> {
    let res = notification::Entity::delete_many()
        .filter(notification::Column::RecipientId.eq(recipient_id))
        .exec(db)
        .await?;
    Ok(res.rows_affected)
}
