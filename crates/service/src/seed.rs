//! Startup seeding driven by the `[seed]` config section.
use sea_orm::DatabaseConnection;
use tracing::{info, warn};

use configs::{SeedAdmin, SeedConfig};
use models::admin;
use models::enums::Role;

use crate::auth::pin::hash_secret;
use crate::dashboard;
use crate::errors::ServiceError;

/// Create configured admins that do not exist yet. Returns the number created.
pub async fn seed_admins(db: &DatabaseConnection, admins: &[SeedAdmin]) -> Result<usize, ServiceError> {
    let mut created = 0;
    for seed in admins {
        let role = match Role::parse(seed.role.trim()) {
            Some(role) if role.is_admin() => role,
            _ => {
                warn!(event = "seed_admin_skipped", username = %seed.username, role = %seed.role, "role must be admin or super_admin");
                continue;
            }
        };
        if admin::find_by_username(db, &seed.username).await?.is_some() {
            continue;
        }
        admin::create(
            db,
            admin::NewAdmin {
                username: seed.username.clone(),
                name: seed.name.clone(),
                email: seed.email.clone(),
                phone_number: seed.phone_number.clone(),
                password_hash: hash_secret(&seed.password)?,
                role,
            },
        )
        .await?;
        info!(event = "admin_seeded", username = %seed.username, role = role.as_str());
        created += 1;
    }
    Ok(created)
}

pub async fn run(db: &DatabaseConnection, cfg: &SeedConfig) -> Result<(), ServiceError> {
    seed_admins(db, &cfg.admins).await?;
    if cfg.service_sections {
        let created = dashboard::seed_sections(db).await?;
        info!(event = "service_sections_seeded", created);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::pin::verify_secret;
    use crate::test_support;

    fn seed(username: &str, role: &str) -> SeedAdmin {
        SeedAdmin {
            username: username.into(),
            name: "Ops".into(),
            email: None,
            phone_number: None,
            password: "s3cretpass".into(),
            role: role.into(),
        }
    }

    #[tokio::test]
    async fn seeds_missing_admins_once() {
        let db = test_support::get_db().await.unwrap();
        let admins = vec![seed("root", "super_admin"), seed("ops", "admin"), seed("shop", "vendor")];
        assert_eq!(seed_admins(&db, &admins).await.unwrap(), 2);
        assert_eq!(seed_admins(&db, &admins).await.unwrap(), 0);

        let root = admin::find_by_username(&db, "root").await.unwrap().unwrap();
        assert_eq!(root.role, Role::SuperAdmin);
        assert!(verify_secret("s3cretpass", &root.password_hash).unwrap());
        assert!(admin::find_by_username(&db, "shop").await.unwrap().is_none());
    }
}
