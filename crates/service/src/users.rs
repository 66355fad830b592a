//! End-user profile and account removal.
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter, Set};
use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use models::enums::AuditAction;
use models::{audit_log, booking, dispute, feedback, notification, user, validation};

use crate::audit::{Actor, AuditService};
use crate::errors::ServiceError;

const UPDATABLE: &[&str] = &["name", "email", "image", "photo"];

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Profile {
    pub id: Uuid,
    pub image: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: String,
}

impl From<user::Model> for Profile {
    fn from(u: user::Model) -> Self {
        Self { id: u.id, image: u.photo.unwrap_or_default(), name: u.name, email: u.email, phone: u.phone_number }
    }
}

#[derive(Clone)]
pub struct UserService {
    db: DatabaseConnection,
    audit: AuditService,
}

impl UserService {
    pub fn new(db: DatabaseConnection, audit: AuditService) -> Self { Self { db, audit } }

    async fn find(&self, id: Uuid) -> Result<user::Model, ServiceError> {
        user::Entity::find_by_id(id)
            .filter(user::Column::DeletedAt.is_null())
            .one(&self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("User"))
    }

    pub async fn profile(&self, id: Uuid) -> Result<Profile, ServiceError> {
        Ok(self.find(id).await?.into())
    }

    /// Accepts only `name`, `email` and `image` (or its alias `photo`).
    #[instrument(skip(self, updates), fields(user_id = %id))]
    pub async fn update_profile(&self, id: Uuid, updates: Map<String, Value>) -> Result<Profile, ServiceError> {
        if updates.keys().any(|k| !UPDATABLE.contains(&k.as_str())) {
            return Err(ServiceError::Validation(
                "Invalid updates. Only name, email, and image can be updated.".into(),
            ));
        }
        let text = |key: &str| updates.get(key).and_then(Value::as_str).map(str::trim).filter(|v| !v.is_empty());

        let found = self.find(id).await?;
        let mut am = found.into_active_model();
        if let Some(name) = text("name") {
            validation::name(name)?;
            am.name = Set(name.to_string());
        }
        if let Some(email) = text("email") {
            am.email = Set(Some(email.to_lowercase()));
        }
        if let Some(image) = text("image").or_else(|| text("photo")) {
            am.photo = Set(Some(image.to_string()));
        }
        am.updated_at = Set(Utc::now().into());
        Ok(am.update(&self.db).await?.into())
    }

    /// Records `account_deleted`, then removes the user's data one table at a time with no rollback.
    #[instrument(skip(self, actor), fields(user_id = %actor.id))]
    pub async fn delete_account(&self, actor: &Actor) -> Result<(), ServiceError> {
        let found = self.find(actor.id).await?;
        let kept = self
            .audit
            .record(actor.audit(AuditAction::AccountDeleted).details(json!({
                "phoneNumber": found.phone_number,
                "userID": found.user_code,
                "deletedAt": Utc::now(),
            })))
            .await
            .map(|log| log.id);

        dispute::Entity::delete_many().filter(dispute::Column::UserId.eq(found.id)).exec(&self.db).await?;
        feedback::Entity::delete_many().filter(feedback::Column::UserId.eq(found.id)).exec(&self.db).await?;
        booking::Entity::delete_many().filter(booking::Column::UserId.eq(found.id)).exec(&self.db).await?;
        notification::Entity::delete_many()
            .filter(notification::Column::RecipientId.eq(found.id))
            .exec(&self.db)
            .await?;
        let mut logs = audit_log::Entity::delete_many().filter(audit_log::Column::ActorId.eq(found.id));
        if let Some(kept) = kept {
            logs = logs.filter(audit_log::Column::Id.ne(kept));
        } else {
            warn!(event = "account_deleted_unaudited", user_id = %found.id);
        }
        logs.exec(&self.db).await?;
        user::Entity::delete_by_id(found.id).exec(&self.db).await?;
        info!(event = "account_deleted", user_id = %found.id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bookings::{BookingService, NewBooking, ServiceLine};
    use crate::notifications::{notify, NewNotification};
    use crate::otp::OtpGenerator;
    use crate::test_support;
    use models::enums::{ActorModel, NotificationType, Role};
    use sea_orm::PaginatorTrait;

    #[tokio::test]
    async fn profile_updates_are_restricted() {
        let db = test_support::get_db().await.unwrap();
        let svc = UserService::new(db.clone(), AuditService::new(db.clone()));
        let u = test_support::user_fixture(&db, "+919700000050").await;

        let profile = svc.profile(u.id).await.unwrap();
        assert_eq!(profile.image, "");
        assert_eq!(profile.phone, "+919700000050");

        let mut bad = Map::new();
        bad.insert("phoneNumber".into(), json!("+1000000"));
        let err = svc.update_profile(u.id, bad).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(ref m) if m.starts_with("Invalid updates")));

        let mut good = Map::new();
        good.insert("name".into(), json!("Asha Rao"));
        good.insert("photo".into(), json!("https://img.example/a.png"));
        let updated = svc.update_profile(u.id, good).await.unwrap();
        assert_eq!(updated.name, "Asha Rao");
        assert_eq!(updated.image, "https://img.example/a.png");

        assert!(matches!(svc.profile(Uuid::new_v4()).await, Err(ServiceError::NotFound(ref m)) if m == "User not found"));
    }

    #[tokio::test]
    async fn delete_account_removes_owned_rows() {
        let db = test_support::get_db().await.unwrap();
        let audit = AuditService::new(db.clone());
        let svc = UserService::new(db.clone(), audit.clone());
        let fx = test_support::catalog_fixture(&db).await;
        let u = test_support::user_fixture(&db, "+919700000051").await;
        let actor = Actor::new(u.id, Role::User);

        let bookings = BookingService::new(db.clone(), audit.clone(), OtpGenerator::new(true));
        let view = bookings
            .create(
                &actor,
                NewBooking {
                    services: vec![ServiceLine { service_id: fx.quoted.id.to_string(), quantity: None }],
                    date: "2030-05-01".into(),
                    time: "08:00".into(),
                    address: "7 Hill View".into(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        bookings.raise_dispute(u.id, &view.booking.booking_code, "No show").await.unwrap();
        notify(
            &db,
            NewNotification {
                recipient_id: u.id,
                recipient_model: ActorModel::User,
                kind: NotificationType::General,
                title: "Hi".into(),
                body: "Welcome".into(),
                data: None,
            },
        )
        .await
        .unwrap();
        audit.record(actor.audit(AuditAction::Login)).await.unwrap();

        svc.delete_account(&actor).await.unwrap();

        assert!(user::Entity::find_by_id(u.id).one(&db).await.unwrap().is_none());
        assert_eq!(booking::Entity::find().count(&db).await.unwrap(), 0);
        assert_eq!(dispute::Entity::find().count(&db).await.unwrap(), 0);
        assert_eq!(notification::Entity::find().count(&db).await.unwrap(), 0);
        let logs = audit_log::Entity::find()
            .filter(audit_log::Column::ActorId.eq(u.id))
            .all(&db)
            .await
            .unwrap();
        assert!(logs.iter().any(|l| l.action == AuditAction::AccountDeleted));
        assert!(!logs.iter().any(|l| l.action == AuditAction::Login));
    }
}
