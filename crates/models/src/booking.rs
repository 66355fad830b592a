use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::enums::BookingStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "booking")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[serde(rename = "bookingID")]
    pub booking_code: String,
    /// Job-start code, shown only to the booking's user.
    #[serde(skip)]
    pub start_code: String,
    pub user_id: Uuid,
    pub vendor_id: Option<Uuid>,
    pub status: BookingStatus,
    pub scheduled_date: Date,
    pub scheduled_time: String,
    pub address: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub pincode: Option<String>,
    pub total_price: f64,
    pub base_price: f64,
    pub reschedule_count: i32,
    pub cancelled_by: Option<String>,
    pub cancellation_reason: Option<String>,
    pub cancelled_at: Option<DateTimeWithTimeZone>,
    pub accepted_at: Option<DateTimeWithTimeZone>,
    pub completed_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    #[sea_orm(
        belongs_to = "super::vendor::Entity",
        from = "Column::VendorId",
        to = "super::vendor::Column::Id"
    )]
    Vendor,
    #[sea_orm(has_many = "super::booking_item::Entity")]
    BookingItem,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::vendor::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vendor.def()
    }
}

impl Related<super::booking_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BookingItem.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
