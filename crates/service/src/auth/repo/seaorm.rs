use chrono::{DateTime, Utc};
use sea_orm::{sea_query::Expr, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, SqlErr};
use uuid::Uuid;

use models::enums::UserStatus;
use models::errors::ModelError;
use models::{admin, user, vendor};

use crate::auth::domain::{Account, AccountKind, AdminAccount, NewAccount, NewAdmin};
use crate::auth::errors::AuthError;
use crate::auth::repository::AuthRepository;
use crate::errors::duplicate_field;

pub struct SeaOrmAuthRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmAuthRepository {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }
}

fn db_err(e: DbErr) -> AuthError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(msg)) => {
            AuthError::Conflict(format!("{} already exists", duplicate_field(&msg)))
        }
        _ => AuthError::Repository(e.to_string()),
    }
}

fn model_err(e: ModelError) -> AuthError {
    match e {
        ModelError::Validation(msg) => AuthError::Validation(msg),
        ModelError::Db(db) => db_err(db),
    }
}

fn utc(t: Option<sea_orm::prelude::DateTimeWithTimeZone>) -> Option<DateTime<Utc>> {
    t.map(|t| t.with_timezone(&Utc))
}

fn from_user(u: user::Model) -> Account {
    Account {
        id: u.id,
        kind: AccountKind::User,
        phone_number: u.phone_number,
        name: u.name,
        email: u.email,
        pin_hash: u.pin_hash,
        phone_verified: u.is_verified,
        is_active: u.is_active && u.deleted_at.is_none(),
        suspended: u.status == UserStatus::Suspended,
        failed_attempts: u.failed_attempts,
        lock_until: utc(u.lock_until),
    }
}

fn from_vendor(v: vendor::Model) -> Account {
    Account {
        id: v.id,
        kind: AccountKind::Vendor,
        phone_number: v.phone_number,
        name: v.name,
        email: v.email,
        pin_hash: v.pin_hash,
        phone_verified: v.phone_verified,
        is_active: v.is_active,
        suspended: v.is_suspended || v.is_blocked,
        failed_attempts: v.failed_attempts,
        lock_until: utc(v.lock_until),
    }
}

fn from_admin(a: admin::Model) -> AdminAccount {
    AdminAccount {
        id: a.id,
        username: a.username,
        name: a.name,
        email: a.email,
        password_hash: a.password_hash,
        role: a.role,
        is_active: a.is_active,
    }
}

impl SeaOrmAuthRepository {
    async fn set_user(&self, id: Uuid, cols: Vec<(user::Column, sea_orm::Value)>) -> Result<(), AuthError> {
        let mut q = user::Entity::update_many().filter(user::Column::Id.eq(id));
        for (col, value) in cols {
            q = q.col_expr(col, Expr::value(value));
        }
        q.col_expr(user::Column::UpdatedAt, Expr::value(sea_orm::Value::from(Utc::now().fixed_offset())))
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn set_vendor(&self, id: Uuid, cols: Vec<(vendor::Column, sea_orm::Value)>) -> Result<(), AuthError> {
        let mut q = vendor::Entity::update_many().filter(vendor::Column::Id.eq(id));
        for (col, value) in cols {
            q = q.col_expr(col, Expr::value(value));
        }
        q.col_expr(vendor::Column::UpdatedAt, Expr::value(sea_orm::Value::from(Utc::now().fixed_offset())))
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl AuthRepository for SeaOrmAuthRepository {
    async fn find_account(&self, kind: AccountKind, phone: &str) -> Result<Option<Account>, AuthError> {
        match kind {
            AccountKind::User => Ok(user::find_by_phone(&self.db, phone).await.map_err(model_err)?.map(from_user)),
            AccountKind::Vendor => Ok(vendor::find_by_phone(&self.db, phone).await.map_err(model_err)?.map(from_vendor)),
        }
    }

    async fn create_account(&self, new: NewAccount) -> Result<Account, AuthError> {
        match new.kind {
            AccountKind::User => {
                let created = user::create(
                    &self.db,
                    user::NewUser {
                        phone_number: new.phone_number,
                        name: new.name,
                        email: new.email,
                        pin_hash: new.pin_hash,
                    },
                )
                .await
                .map_err(model_err)?;
                Ok(from_user(created))
            }
            AccountKind::Vendor => {
                let created = vendor::create(
                    &self.db,
                    vendor::NewVendor {
                        phone_number: new.phone_number,
                        name: new.name,
                        email: new.email,
                        pin_hash: new.pin_hash,
                        work_state: new.work_state,
                        work_city: new.work_city,
                        work_pincodes: new.work_pincodes,
                    },
                )
                .await
                .map_err(model_err)?;
                Ok(from_vendor(created))
            }
        }
    }

    async fn mark_verified(&self, kind: AccountKind, id: Uuid) -> Result<(), AuthError> {
        match kind {
            AccountKind::User => self.set_user(id, vec![(user::Column::IsVerified, true.into())]).await,
            AccountKind::Vendor => self.set_vendor(id, vec![(vendor::Column::PhoneVerified, true.into())]).await,
        }
    }

    async fn update_pin(&self, kind: AccountKind, id: Uuid, pin_hash: String) -> Result<(), AuthError> {
        let none: Option<sea_orm::prelude::DateTimeWithTimeZone> = None;
        match kind {
            AccountKind::User => {
                self.set_user(
                    id,
                    vec![
                        (user::Column::PinHash, pin_hash.into()),
                        (user::Column::FailedAttempts, 0i32.into()),
                        (user::Column::LockUntil, none.into()),
                    ],
                )
                .await
            }
            AccountKind::Vendor => {
                self.set_vendor(
                    id,
                    vec![
                        (vendor::Column::PinHash, pin_hash.into()),
                        (vendor::Column::FailedAttempts, 0i32.into()),
                        (vendor::Column::LockUntil, none.into()),
                    ],
                )
                .await
            }
        }
    }

    async fn record_login_failure(
        &self,
        kind: AccountKind,
        id: Uuid,
        failed_attempts: i32,
        lock_until: Option<DateTime<Utc>>,
    ) -> Result<(), AuthError> {
        let lock = lock_until.map(|t| t.fixed_offset());
        match kind {
            AccountKind::User => {
                self.set_user(
                    id,
                    vec![(user::Column::FailedAttempts, failed_attempts.into()), (user::Column::LockUntil, lock.into())],
                )
                .await
            }
            AccountKind::Vendor => {
                self.set_vendor(
                    id,
                    vec![(vendor::Column::FailedAttempts, failed_attempts.into()), (vendor::Column::LockUntil, lock.into())],
                )
                .await
            }
        }
    }

    async fn record_login_success(&self, kind: AccountKind, id: Uuid, at: DateTime<Utc>) -> Result<(), AuthError> {
        let none: Option<sea_orm::prelude::DateTimeWithTimeZone> = None;
        let at = Some(at.fixed_offset());
        match kind {
            AccountKind::User => {
                self.set_user(
                    id,
                    vec![
                        (user::Column::FailedAttempts, 0i32.into()),
                        (user::Column::LockUntil, none.into()),
                        (user::Column::LastLogin, at.into()),
                    ],
                )
                .await
            }
            AccountKind::Vendor => {
                self.set_vendor(
                    id,
                    vec![
                        (vendor::Column::FailedAttempts, 0i32.into()),
                        (vendor::Column::LockUntil, none.into()),
                        (vendor::Column::LastLogin, at.into()),
                    ],
                )
                .await
            }
        }
    }

    async fn find_admin(&self, username: &str) -> Result<Option<AdminAccount>, AuthError> {
        Ok(admin::find_by_username(&self.db, username).await.map_err(model_err)?.map(from_admin))
    }

    async fn create_admin(&self, new: NewAdmin) -> Result<AdminAccount, AuthError> {
        let created = admin::create(
            &self.db,
            admin::NewAdmin {
                username: new.username,
                name: new.name,
                email: new.email,
                phone_number: None,
                password_hash: new.password_hash,
                role: new.role,
            },
        )
        .await
        .map_err(model_err)?;
        Ok(from_admin(created))
    }

    async fn record_admin_login(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), AuthError> {
        admin::Entity::update_many()
            .col_expr(admin::Column::LastLogin, Expr::value(Some(at.fixed_offset())))
            .filter(admin::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::auth::domain::VendorSignupInput;
    use crate::auth::service::{AuthConfig, AuthService};
    use crate::auth::tokens::TokenIssuer;
    use crate::cache::Cache;
    use crate::test_support;

    #[tokio::test]
    async fn vendor_flow_persists_verification_and_lockout() {
        let db = test_support::get_db().await.unwrap();
        let repo = Arc::new(SeaOrmAuthRepository::new(db.clone()));
        let tokens = TokenIssuer::new("a", "r", Duration::from_secs(60), Duration::from_secs(600));
        let cfg = AuthConfig { max_failed_attempts: 2, ..AuthConfig::default() };
        let svc = AuthService::new(repo.clone(), Arc::new(Cache::new()), tokens, cfg);

        let phone = "+919822222222";
        svc.vendor_signup(VendorSignupInput {
            phone_number: phone.into(),
            name: "Imran".into(),
            email: None,
            pin: "1122".into(),
            confirm_pin: "1122".into(),
            work_state: "Kerala".into(),
            work_city: "Kochi".into(),
            work_pincodes: vec!["682001".into()],
            accepted_terms: true,
            accepted_privacy: true,
        })
        .await
        .unwrap();
        svc.verify_signup_otp(AccountKind::Vendor, phone, "123456").await.unwrap();

        let stored = vendor::find_by_phone(&db, phone).await.unwrap().unwrap();
        assert!(stored.phone_verified);
        assert!(!stored.is_verified);
        assert_eq!(stored.work_pincodes, serde_json::json!(["682001"]));

        svc.login(AccountKind::Vendor, phone, "1122").await.unwrap();
        assert!(vendor::find_by_phone(&db, phone).await.unwrap().unwrap().last_login.is_some());

        assert!(matches!(svc.login(AccountKind::Vendor, phone, "0000").await, Err(AuthError::InvalidCredentials)));
        assert!(matches!(svc.login(AccountKind::Vendor, phone, "0000").await, Err(AuthError::Locked)));
        let locked = repo.find_account(AccountKind::Vendor, phone).await.unwrap().unwrap();
        assert!(locked.is_locked(Utc::now()));
    }

    #[tokio::test]
    async fn duplicate_admin_maps_to_conflict() {
        let db = test_support::get_db().await.unwrap();
        let repo = SeaOrmAuthRepository::new(db);
        let new = NewAdmin {
            username: "root".into(),
            name: "Root".into(),
            email: None,
            password_hash: "x".into(),
            role: models::enums::Role::SuperAdmin,
        };
        repo.create_admin(new.clone()).await.unwrap();
        let err = repo.create_admin(new).await.unwrap_err();
        assert!(matches!(err, AuthError::Conflict(ref m) if m == "username already exists"), "{err:?}");
    }
}
