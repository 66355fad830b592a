//! String-backed enums shared by entities, tokens and API payloads.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[sea_orm(string_value = "user")]
    User,
    #[sea_orm(string_value = "vendor")]
    Vendor,
    #[sea_orm(string_value = "admin")]
    Admin,
    #[sea_orm(string_value = "super_admin")]
    SuperAdmin,
}

impl Role {
    /// Position in the role hierarchy, `user` lowest.
    pub fn rank(self) -> u8 {
        match self {
            Role::User => 1,
            Role::Vendor => 2,
            Role::Admin => 3,
            Role::SuperAdmin => 4,
        }
    }

    pub fn is_admin(self) -> bool {
        matches!(self, Role::Admin | Role::SuperAdmin)
    }

    pub fn actor_model(self) -> ActorModel {
        match self {
            Role::User => ActorModel::User,
            Role::Vendor => ActorModel::Vendor,
            Role::Admin | Role::SuperAdmin => ActorModel::Admin,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Vendor => "vendor",
            Role::Admin => "admin",
            Role::SuperAdmin => "super_admin",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Role::User),
            "vendor" => Some(Role::Vendor),
            "admin" => Some(Role::Admin),
            "super_admin" => Some(Role::SuperAdmin),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "UPPERCASE")]
pub enum UserStatus {
    #[sea_orm(string_value = "PENDING")]
    Pending,
    #[sea_orm(string_value = "ACTIVE")]
    Active,
    #[sea_orm(string_value = "SUSPENDED")]
    Suspended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "pending_acceptance")]
    PendingAcceptance,
    #[sea_orm(string_value = "on_the_way")]
    OnTheWay,
    #[sea_orm(string_value = "arrived")]
    Arrived,
    #[sea_orm(string_value = "ongoing")]
    Ongoing,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

/// Buckets used by the "my bookings" listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusGroup {
    Pending,
    Active,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::PendingAcceptance => "pending_acceptance",
            BookingStatus::OnTheWay => "on_the_way",
            BookingStatus::Arrived => "arrived",
            BookingStatus::Ongoing => "ongoing",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, BookingStatus::Completed | BookingStatus::Cancelled)
    }

    pub fn group(self) -> StatusGroup {
        match self {
            BookingStatus::Pending | BookingStatus::PendingAcceptance => StatusGroup::Pending,
            BookingStatus::OnTheWay | BookingStatus::Arrived | BookingStatus::Ongoing => StatusGroup::Active,
            BookingStatus::Completed => StatusGroup::Completed,
            BookingStatus::Cancelled => StatusGroup::Cancelled,
        }
    }

    /// Next status a vendor may move an assigned booking to.
    pub fn vendor_next(self) -> Option<BookingStatus> {
        match self {
            BookingStatus::OnTheWay => Some(BookingStatus::Arrived),
            BookingStatus::Arrived => Some(BookingStatus::Ongoing),
            BookingStatus::Ongoing => Some(BookingStatus::Completed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    #[sea_orm(string_value = "login")]
    Login,
    #[sea_orm(string_value = "logout")]
    Logout,
    #[sea_orm(string_value = "booking_created")]
    BookingCreated,
    #[sea_orm(string_value = "booking_accepted")]
    BookingAccepted,
    #[sea_orm(string_value = "booking_cancelled")]
    BookingCancelled,
    #[sea_orm(string_value = "booking_completed")]
    BookingCompleted,
    #[sea_orm(string_value = "payment")]
    Payment,
    #[sea_orm(string_value = "account_deleted")]
    AccountDeleted,
    #[sea_orm(string_value = "profile_updated")]
    ProfileUpdated,
    #[sea_orm(string_value = "duty_toggled")]
    DutyToggled,
    #[sea_orm(string_value = "user_status_updated")]
    UserStatusUpdated,
}

impl AuditAction {
    pub fn parse(s: &str) -> Option<Self> {
        serde_json::from_value(serde_json::Value::String(s.to_string())).ok()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum ActorModel {
    #[sea_orm(string_value = "User")]
    User,
    #[sea_orm(string_value = "Vendor")]
    Vendor,
    #[sea_orm(string_value = "Admin")]
    Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    #[sea_orm(string_value = "booking_alert")]
    BookingAlert,
    #[sea_orm(string_value = "booking_accepted")]
    BookingAccepted,
    #[sea_orm(string_value = "booking_cancelled")]
    BookingCancelled,
    #[sea_orm(string_value = "booking_completed")]
    BookingCompleted,
    #[sea_orm(string_value = "price_confirmation")]
    PriceConfirmation,
    #[sea_orm(string_value = "reminder")]
    Reminder,
    #[sea_orm(string_value = "general")]
    General,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
pub enum LeadDecision {
    #[sea_orm(string_value = "rejected")]
    Rejected,
    #[sea_orm(string_value = "later")]
    Later,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
pub enum DisputeStatus {
    #[sea_orm(string_value = "open")]
    Open,
    #[sea_orm(string_value = "resolved")]
    Resolved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum BannerAudience {
    #[sea_orm(string_value = "user")]
    User,
    #[sea_orm(string_value = "vendor")]
    Vendor,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_hierarchy_and_actor_model() {
        assert!(Role::SuperAdmin.rank() > Role::Admin.rank());
        assert!(Role::Vendor.rank() > Role::User.rank());
        assert_eq!(Role::SuperAdmin.actor_model(), ActorModel::Admin);
        assert_eq!(Role::parse("vendor"), Some(Role::Vendor));
        assert_eq!(Role::parse("root"), None);
    }

    #[test]
    fn booking_status_groups_and_transitions() {
        assert_eq!(BookingStatus::PendingAcceptance.group(), StatusGroup::Pending);
        assert_eq!(BookingStatus::Arrived.group(), StatusGroup::Active);
        assert_eq!(BookingStatus::OnTheWay.vendor_next(), Some(BookingStatus::Arrived));
        assert_eq!(BookingStatus::Ongoing.vendor_next(), Some(BookingStatus::Completed));
        assert_eq!(BookingStatus::Completed.vendor_next(), None);
        assert!(BookingStatus::Cancelled.is_terminal());
        assert_eq!(serde_json::to_string(&BookingStatus::OnTheWay).unwrap(), "\"on_the_way\"");
    }

    #[test]
    fn audit_action_parses_wire_names() {
        assert_eq!(AuditAction::parse("duty_toggled"), Some(AuditAction::DutyToggled));
        assert_eq!(AuditAction::parse("unknown"), None);
    }
}
