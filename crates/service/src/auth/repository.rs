use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::domain::{Account, AccountKind, AdminAccount, NewAccount, NewAdmin};
use super::errors::AuthError;

/// Repository abstraction for auth-related persistence.
#[async_trait]
pub trait AuthRepository: Send + Sync {
    async fn find_account(&self, kind: AccountKind, phone: &str) -> Result<Option<Account>, AuthError>;
    async fn create_account(&self, new: NewAccount) -> Result<Account, AuthError>;
    async fn mark_verified(&self, kind: AccountKind, id: Uuid) -> Result<(), AuthError>;
    async fn update_pin(&self, kind: AccountKind, id: Uuid, pin_hash: String) -> Result<(), AuthError>;

    /// Store the new failure count and, when the account just crossed the limit, the lock expiry.
    async fn record_login_failure(
        &self,
        kind: AccountKind,
        id: Uuid,
        failed_attempts: i32,
        lock_until: Option<DateTime<Utc>>,
    ) -> Result<(), AuthError>;
    async fn record_login_success(&self, kind: AccountKind, id: Uuid, at: DateTime<Utc>) -> Result<(), AuthError>;

    async fn find_admin(&self, username: &str) -> Result<Option<AdminAccount>, AuthError>;
    async fn create_admin(&self, new: NewAdmin) -> Result<AdminAccount, AuthError>;
    async fn record_admin_login(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), AuthError>;
}

/// Simple in-memory mock repository for tests and benches
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    fn poisoned<T>(e: std::sync::PoisonError<T>) -> AuthError {
        AuthError::Repository(e.to_string())
    }

    #[derive(Default)]
    pub struct MockAuthRepository {
        accounts: Mutex<HashMap<(AccountKind, String), Account>>, // key: (kind, phone)
        admins: Mutex<HashMap<String, AdminAccount>>,             // key: username
    }

    impl MockAuthRepository {
        /// Snapshot of an account for assertions.
        pub fn account(&self, kind: AccountKind, phone: &str) -> Option<Account> {
            self.accounts.lock().ok()?.get(&(kind, phone.to_string())).cloned()
        }

        fn update<F: FnOnce(&mut Account)>(&self, kind: AccountKind, id: Uuid, f: F) -> Result<(), AuthError> {
            let mut accounts = self.accounts.lock().map_err(poisoned)?;
            let account = accounts
                .values_mut()
                .find(|a| a.kind == kind && a.id == id)
                .ok_or_else(|| AuthError::NotFound("Account not found".into()))?;
            f(account);
            Ok(())
        }
    }

    #[async_trait]
    impl AuthRepository for MockAuthRepository {
        async fn find_account(&self, kind: AccountKind, phone: &str) -> Result<Option<Account>, AuthError> {
            let accounts = self.accounts.lock().map_err(poisoned)?;
            Ok(accounts.get(&(kind, phone.to_string())).cloned())
        }

        async fn create_account(&self, new: NewAccount) -> Result<Account, AuthError> {
            let mut accounts = self.accounts.lock().map_err(poisoned)?;
            let key = (new.kind, new.phone_number.clone());
            if accounts.contains_key(&key) {
                return Err(AuthError::Conflict("phoneNumber already exists".into()));
            }
            let account = Account {
                id: Uuid::new_v4(),
                kind: new.kind,
                phone_number: new.phone_number,
                name: new.name,
                email: new.email,
                pin_hash: new.pin_hash,
                phone_verified: false,
                is_active: true,
                suspended: false,
                failed_attempts: 0,
                lock_until: None,
            };
            accounts.insert(key, account.clone());
            Ok(account)
        }

        async fn mark_verified(&self, kind: AccountKind, id: Uuid) -> Result<(), AuthError> {
            self.update(kind, id, |a| a.phone_verified = true)
        }

        async fn update_pin(&self, kind: AccountKind, id: Uuid, pin_hash: String) -> Result<(), AuthError> {
            self.update(kind, id, |a| {
                a.pin_hash = pin_hash;
                a.failed_attempts = 0;
                a.lock_until = None;
            })
        }

        async fn record_login_failure(
            &self,
            kind: AccountKind,
            id: Uuid,
            failed_attempts: i32,
            lock_until: Option<DateTime<Utc>>,
        ) -> Result<(), AuthError> {
            self.update(kind, id, |a| {
                a.failed_attempts = failed_attempts;
                a.lock_until = lock_until;
            })
        }

        async fn record_login_success(&self, kind: AccountKind, id: Uuid, _at: DateTime<Utc>) -> Result<(), AuthError> {
            self.update(kind, id, |a| {
                a.failed_attempts = 0;
                a.lock_until = None;
            })
        }

        async fn find_admin(&self, username: &str) -> Result<Option<AdminAccount>, AuthError> {
            let admins = self.admins.lock().map_err(poisoned)?;
            Ok(admins.get(&username.trim().to_lowercase()).cloned())
        }

        async fn create_admin(&self, new: NewAdmin) -> Result<AdminAccount, AuthError> {
            let mut admins = self.admins.lock().map_err(poisoned)?;
            let username = new.username.trim().to_lowercase();
            if admins.contains_key(&username) {
                return Err(AuthError::Conflict("username already exists".into()));
            }
            let admin = AdminAccount {
                id: Uuid::new_v4(),
                username: username.clone(),
                name: new.name,
                email: new.email,
                password_hash: new.password_hash,
                role: new.role,
                is_active: true,
            };
            admins.insert(username, admin.clone());
            Ok(admin)
        }

        async fn record_admin_login(&self, _id: Uuid, _at: DateTime<Utc>) -> Result<(), AuthError> {
            Ok(())
        }
    }
}
