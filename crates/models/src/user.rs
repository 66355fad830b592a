use chrono::Utc;
use sea_orm::{entity::prelude::*, ConnectionTrait, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::codes;
use crate::enums::{Role, UserStatus};
use crate::errors::ModelError;
use crate::validation;

pub const DEFAULT_COINS: i64 = 1000;
pub const DEFAULT_COUNTRY: &str = "India";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[serde(rename = "userID")]
    pub user_code: String,
    pub phone_number: String,
    pub name: String,
    pub email: Option<String>,
    #[serde(skip_serializing)]
    pub pin_hash: String,
    pub role: Role,
    pub is_verified: bool,
    pub is_active: bool,
    pub status: UserStatus,
    #[serde(skip_serializing)]
    pub failed_attempts: i32,
    #[serde(skip_serializing)]
    pub lock_until: Option<DateTimeWithTimeZone>,
    pub last_login: Option<DateTimeWithTimeZone>,
    pub deleted_at: Option<DateTimeWithTimeZone>,
    pub coins: i64,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zipcode: Option<String>,
    pub country: String,
    pub photo: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::booking::Entity")]
    Booking,
}

impl Related<super::booking::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Booking.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Fields accepted when registering a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub phone_number: String,
    pub name: String,
    pub email: Option<String>,
    pub pin_hash: String,
}

pub async fn create<C: ConnectionTrait>(db: &C, new: NewUser) -> Result<Model, ModelError> {
    validation::phone(&new.phone_number)?;
    validation::name(&new.name)?;
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        user_code: Set(codes::user_code()),
        phone_number: Set(new.phone_number),
        name: Set(new.name.trim().to_string()),
        email: Set(new.email.map(|e| e.trim().to_lowercase())),
        pin_hash: Set(new.pin_hash),
        role: Set(Role::User),
        is_verified: Set(false),
        is_active: Set(true),
        status: Set(UserStatus::Active),
        failed_attempts: Set(0),
        lock_until: Set(None),
        last_login: Set(None),
        deleted_at: Set(None),
        coins: Set(DEFAULT_COINS),
        address: Set(None),
        city: Set(None),
        state: Set(None),
        zipcode: Set(None),
        country: Set(DEFAULT_COUNTRY.to_string()),
        photo: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    };
    Ok(am.insert(db).await?)
}

pub async fn find_by_phone<C: ConnectionTrait>(db: &C, phone: &str) -> Result<Option<Model>, ModelError> {
    Ok(Entity::find().filter(Column::PhoneNumber.eq(phone)).one(db).await?)
}
