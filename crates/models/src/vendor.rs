use chrono::Utc;
use sea_orm::{entity::prelude::*, ConnectionTrait, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::codes;
use crate::errors::ModelError;
use crate::validation;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "vendor")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[serde(rename = "vendorID")]
    pub vendor_code: String,
    pub phone_number: String,
    pub name: String,
    pub email: Option<String>,
    #[serde(skip_serializing)]
    pub pin_hash: String,
    pub phone_verified: bool,
    /// Admin approval; only verified vendors receive leads.
    pub is_verified: bool,
    pub is_active: bool,
    pub is_suspended: bool,
    pub is_blocked: bool,
    pub duty_on: bool,
    pub duty_changed_at: Option<DateTimeWithTimeZone>,
    pub work_state: Option<String>,
    pub work_city: Option<String>,
    pub work_pincodes: Json,
    #[serde(skip_serializing)]
    pub failed_attempts: i32,
    #[serde(skip_serializing)]
    pub lock_until: Option<DateTimeWithTimeZone>,
    pub last_login: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::vendor_service::Entity")]
    VendorService,
}

impl Related<super::vendor_service::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VendorService.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Eligible to receive new leads.
    pub fn is_available(&self) -> bool {
        self.duty_on && self.is_active && self.is_verified && !self.is_suspended && !self.is_blocked
    }
}

#[derive(Debug, Clone)]
pub struct NewVendor {
    pub phone_number: String,
    pub name: String,
    pub email: Option<String>,
    pub pin_hash: String,
    pub work_state: Option<String>,
    pub work_city: Option<String>,
    pub work_pincodes: Vec<String>,
}

pub async fn create<C: ConnectionTrait>(db: &C, new: NewVendor) -> Result<Model, ModelError> {
    validation::phone(&new.phone_number)?;
    validation::name(&new.name)?;
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        vendor_code: Set(codes::vendor_code()),
        phone_number: Set(new.phone_number),
        name: Set(new.name.trim().to_string()),
        email: Set(new.email.map(|e| e.trim().to_lowercase())),
        pin_hash: Set(new.pin_hash),
        phone_verified: Set(false),
        is_verified: Set(false),
        is_active: Set(true),
        is_suspended: Set(false),
        is_blocked: Set(false),
        duty_on: Set(false),
        duty_changed_at: Set(None),
        work_state: Set(new.work_state),
        work_city: Set(new.work_city),
        work_pincodes: Set(serde_json::json!(new.work_pincodes)),
        failed_attempts: Set(0),
        lock_until: Set(None),
        last_login: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    };
    Ok(am.insert(db).await?)
}

pub async fn find_by_phone<C: ConnectionTrait>(db: &C, phone: &str) -> Result<Option<Model>, ModelError> {
    Ok(Entity::find().filter(Column::PhoneNumber.eq(phone)).one(db).await?)
}
