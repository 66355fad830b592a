//! Vendor profile, duty switch, service selection and admin moderation flags.
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, instrument};
use uuid::Uuid;

use models::enums::AuditAction;
use models::{offering, vendor, vendor_service};

use crate::audit::{Actor, AuditService};
use crate::errors::ServiceError;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorProfile {
    #[serde(flatten)]
    pub vendor: vendor::Model,
    pub services: Vec<offering::Model>,
}

/// Admin moderation switches; unset fields stay as they are.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorFlags {
    pub is_verified: Option<bool>,
    pub is_active: Option<bool>,
    pub is_suspended: Option<bool>,
    pub is_blocked: Option<bool>,
}

#[derive(Clone)]
pub struct VendorService {
    db: DatabaseConnection,
    audit: AuditService,
}

impl VendorService {
    pub fn new(db: DatabaseConnection, audit: AuditService) -> Self { Self { db, audit } }

    async fn find(&self, id: Uuid) -> Result<vendor::Model, ServiceError> {
        vendor::Entity::find_by_id(id).one(&self.db).await?.ok_or_else(|| ServiceError::not_found("Vendor"))
    }

    pub async fn profile(&self, id: Uuid) -> Result<VendorProfile, ServiceError> {
        let found = self.find(id).await?;
        let service_ids: Vec<Uuid> = vendor_service::Entity::find()
            .filter(vendor_service::Column::VendorId.eq(id))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|vs| vs.service_id)
            .collect();
        let services = if service_ids.is_empty() {
            Vec::new()
        } else {
            offering::Entity::find().filter(offering::Column::Id.is_in(service_ids)).all(&self.db).await?
        };
        Ok(VendorProfile { vendor: found, services })
    }

    #[instrument(skip(self, actor), fields(vendor_id = %actor.id))]
    pub async fn toggle_duty(&self, actor: &Actor, is_on: bool) -> Result<vendor::Model, ServiceError> {
        let found = self.find(actor.id).await?;
        let previous = found.duty_on;
        let now = Utc::now();
        let mut am = found.into_active_model();
        am.duty_on = Set(is_on);
        am.duty_changed_at = Set(Some(now.into()));
        am.updated_at = Set(now.into());
        let updated = am.update(&self.db).await?;
        self.audit.record_detached(actor.audit(AuditAction::DutyToggled).details(json!({
            "from": previous,
            "to": is_on,
        })));
        info!(event = "duty_toggled", duty_on = is_on);
        Ok(updated)
    }

    /// Replace the vendor's selected services; every id must name an existing service.
    pub async fn set_services(&self, vendor_id: Uuid, service_ids: &[String]) -> Result<Vec<offering::Model>, ServiceError> {
        self.find(vendor_id).await?;
        let mut ids = Vec::with_capacity(service_ids.len());
        for raw in service_ids {
            let missing = || ServiceError::NotFound(format!("Service with ID {raw} not found"));
            let id = Uuid::parse_str(raw.trim()).map_err(|_| missing())?;
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        let services = if ids.is_empty() {
            Vec::new()
        } else {
            offering::Entity::find().filter(offering::Column::Id.is_in(ids.clone())).all(&self.db).await?
        };
        if let Some(missing) = ids.iter().find(|id| !services.iter().any(|s| s.id == **id)) {
            return Err(ServiceError::NotFound(format!("Service with ID {missing} not found")));
        }

        let now = Utc::now();
        let txn = self.db.begin().await?;
        vendor_service::Entity::delete_many()
            .filter(vendor_service::Column::VendorId.eq(vendor_id))
            .exec(&txn)
            .await?;
        for id in &ids {
            vendor_service::ActiveModel {
                id: Set(Uuid::new_v4()),
                vendor_id: Set(vendor_id),
                service_id: Set(*id),
                created_at: Set(now.into()),
            }
            .insert(&txn)
            .await?;
        }
        txn.commit().await?;
        Ok(services)
    }

    pub async fn set_flags(&self, vendor_id: Uuid, flags: VendorFlags) -> Result<vendor::Model, ServiceError> {
        let mut am = self.find(vendor_id).await?.into_active_model();
        if let Some(v) = flags.is_verified {
            am.is_verified = Set(v);
        }
        if let Some(v) = flags.is_active {
            am.is_active = Set(v);
        }
        if let Some(v) = flags.is_suspended {
            am.is_suspended = Set(v);
        }
        if let Some(v) = flags.is_blocked {
            am.is_blocked = Set(v);
        }
        am.updated_at = Set(Utc::now().into());
        Ok(am.update(&self.db).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;
    use models::enums::Role;

    #[tokio::test]
    async fn duty_and_flags_drive_availability() {
        let db = test_support::get_db().await.unwrap();
        let svc = VendorService::new(db.clone(), AuditService::new(db.clone()));
        let v = test_support::vendor_fixture(&db, "+919800000060", true).await;
        assert!(v.is_available());

        let off = svc.toggle_duty(&Actor::new(v.id, Role::Vendor), false).await.unwrap();
        assert!(!off.duty_on);
        assert!(off.duty_changed_at.is_some());

        let on = svc.toggle_duty(&Actor::new(v.id, Role::Vendor), true).await.unwrap();
        assert!(on.is_available());
        let blocked = svc.set_flags(v.id, VendorFlags { is_blocked: Some(true), ..Default::default() }).await.unwrap();
        assert!(!blocked.is_available());

        let err = svc.toggle_duty(&Actor::new(Uuid::new_v4(), Role::Vendor), true).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(ref m) if m == "Vendor not found"));
    }

    #[tokio::test]
    async fn service_selection_is_replaced() {
        let db = test_support::get_db().await.unwrap();
        let svc = VendorService::new(db.clone(), AuditService::new(db.clone()));
        let fx = test_support::catalog_fixture(&db).await;
        let v = test_support::vendor_fixture(&db, "+919800000061", true).await;

        let both = [fx.priced.id.to_string(), fx.quoted.id.to_string()];
        assert_eq!(svc.set_services(v.id, &both).await.unwrap().len(), 2);
        svc.set_services(v.id, &[fx.quoted.id.to_string()]).await.unwrap();
        let profile = svc.profile(v.id).await.unwrap();
        assert_eq!(profile.services.len(), 1);
        assert_eq!(profile.services[0].id, fx.quoted.id);

        let ghost = Uuid::new_v4().to_string();
        let err = svc.set_services(v.id, &[ghost.clone()]).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(ref m) if *m == format!("Service with ID {ghost} not found")));
        assert_eq!(svc.profile(v.id).await.unwrap().services.len(), 1);
    }
}
