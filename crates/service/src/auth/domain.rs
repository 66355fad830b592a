use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use models::enums::{ActorModel, Role};

/// PIN-authenticated account families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountKind {
    User,
    Vendor,
}

impl AccountKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AccountKind::User => "user",
            AccountKind::Vendor => "vendor",
        }
    }

    pub fn role(self) -> Role {
        match self {
            AccountKind::User => Role::User,
            AccountKind::Vendor => Role::Vendor,
        }
    }

    pub fn actor_model(self) -> ActorModel {
        self.role().actor_model()
    }
}

/// Login-relevant view of a user or vendor row.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: Uuid,
    pub kind: AccountKind,
    pub phone_number: String,
    pub name: String,
    pub email: Option<String>,
    pub pin_hash: String,
    pub phone_verified: bool,
    pub is_active: bool,
    pub suspended: bool,
    pub failed_attempts: i32,
    pub lock_until: Option<DateTime<Utc>>,
}

impl Account {
    pub fn is_locked(&self, now: DateTime<Utc>) -> bool {
        self.lock_until.is_some_and(|until| until > now)
    }
}

#[derive(Debug, Clone)]
pub struct NewAccount {
    pub kind: AccountKind,
    pub phone_number: String,
    pub name: String,
    pub email: Option<String>,
    pub pin_hash: String,
    pub work_state: Option<String>,
    pub work_city: Option<String>,
    pub work_pincodes: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct AdminAccount {
    pub id: Uuid,
    pub username: String,
    pub name: String,
    pub email: Option<String>,
    pub password_hash: String,
    pub role: Role,
    pub is_active: bool,
}

#[derive(Debug, Clone)]
pub struct NewAdmin {
    pub username: String,
    pub name: String,
    pub email: Option<String>,
    pub password_hash: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSignupInput {
    pub phone_number: String,
    pub name: String,
    pub email: Option<String>,
    pub pin: String,
    pub confirm_pin: String,
    pub accepted_terms: bool,
    pub accepted_privacy: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VendorSignupInput {
    pub phone_number: String,
    pub name: String,
    pub email: Option<String>,
    pub pin: String,
    pub confirm_pin: String,
    pub work_state: String,
    pub work_city: String,
    pub work_pincodes: Vec<String>,
    pub accepted_terms: bool,
    pub accepted_privacy: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminSignupInput {
    pub username: String,
    pub name: String,
    pub email: Option<String>,
    pub password: String,
    pub confirm_password: String,
}

/// Details held in the cache between the two signup steps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingSignup {
    pub phone_number: String,
    pub name: String,
    pub email: Option<String>,
}

/// Account fields returned to clients after signup or login.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AccountProfile {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub role: Role,
    pub is_verified: bool,
}

impl From<&Account> for AccountProfile {
    fn from(a: &Account) -> Self {
        Self {
            id: a.id,
            name: a.name.clone(),
            username: None,
            phone_number: Some(a.phone_number.clone()),
            email: a.email.clone(),
            role: a.kind.role(),
            is_verified: a.phone_verified,
        }
    }
}

impl From<&AdminAccount> for AccountProfile {
    fn from(a: &AdminAccount) -> Self {
        Self {
            id: a.id,
            name: a.name.clone(),
            username: Some(a.username.clone()),
            phone_number: None,
            email: a.email.clone(),
            role: a.role,
            is_verified: true,
        }
    }
}

/// Login result (session)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub user: AccountProfile,
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// Access token lifetime in seconds.
    pub expires_in: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupTicket {
    pub signup_id: String,
    pub phone_number: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginTicket {
    pub login_id: String,
    pub phone_number: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetTicket {
    pub reset_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshedToken {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}
