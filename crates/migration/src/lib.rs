//! Migrator registering entity-specific migrations in dependency order.
//! Indexes are applied last.
pub use sea_orm_migration::prelude::*;

mod m20240601_000011_create_user;
mod m20240601_000012_create_vendor;
mod m20240601_000013_create_admin;
mod m20240601_000014_create_catalog;
mod m20240601_000015_create_booking;
mod m20240601_000016_create_feedback;
mod m20240601_000017_create_audit_log;
mod m20240601_000018_create_notification;
mod m20240601_000019_create_dashboard_content;
mod m20240601_000002_add_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240601_000011_create_user::Migration),
            Box::new(m20240601_000012_create_vendor::Migration),
            Box::new(m20240601_000013_create_admin::Migration),
            Box::new(m20240601_000014_create_catalog::Migration),
            Box::new(m20240601_000015_create_booking::Migration),
            Box::new(m20240601_000016_create_feedback::Migration),
            Box::new(m20240601_000017_create_audit_log::Migration),
            Box::new(m20240601_000018_create_notification::Migration),
            Box::new(m20240601_000019_create_dashboard_content::Migration),
            // Indexes should always be applied last
            Box::new(m20240601_000002_add_indexes::Migration),
        ]
    }
}
