use chrono::Utc;
use sea_orm::{entity::prelude::*, ConnectionTrait, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::enums::Role;
use crate::errors::ModelError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "admin")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub username: String,
    pub name: String,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub is_active: bool,
    pub last_login: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Debug, Clone)]
pub struct NewAdmin {
    pub username: String,
    pub name: String,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub password_hash: String,
    pub role: Role,
}

pub async fn create<C: ConnectionTrait>(db: &C, new: NewAdmin) -> Result<Model, ModelError> {
    if new.username.trim().len() < 3 {
        return Err(ModelError::Validation("Username must be at least 3 characters".into()));
    }
    if !new.role.is_admin() {
        return Err(ModelError::Validation("Admin role must be admin or super_admin".into()));
    }
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        username: Set(new.username.trim().to_lowercase()),
        name: Set(new.name.trim().to_string()),
        email: Set(new.email.map(|e| e.trim().to_lowercase())),
        phone_number: Set(new.phone_number),
        password_hash: Set(new.password_hash),
        role: Set(new.role),
        is_active: Set(true),
        last_login: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    };
    Ok(am.insert(db).await?)
}

pub async fn find_by_username<C: ConnectionTrait>(db: &C, username: &str) -> Result<Option<Model>, ModelError> {
    let username = username.trim().to_lowercase();
    Ok(Entity::find().filter(Column::Username.eq(username)).one(db).await?)
}
