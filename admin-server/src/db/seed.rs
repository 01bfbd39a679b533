//! Idempotent seed data
//!
//! Inserts the permission catalog, the system roles with their default
//! grants and, when configured, a bootstrap SuperAdmin. Existing rows are
//! left untouched so edits made through the API survive restarts.

use sqlx::SqlitePool;

use super::repository::{RepoError, RepoResult};
use crate::auth::password::hash_password;
use crate::auth::permissions::{self, SUPER_ADMIN, SYSTEM_ROLES};
use shared::util::{now_millis, snowflake_id};

/// Bootstrap account created on first start
#[derive(Clone)]
pub struct BootstrapAdmin {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for BootstrapAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootstrapAdmin")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

pub async fn run(pool: &SqlitePool, admin: Option<&BootstrapAdmin>) -> RepoResult<()> {
    let now = now_millis();
    let mut tx = pool.begin().await?;

    for entry in permissions::catalog() {
        sqlx::query("INSERT OR IGNORE INTO permission (id, name, description) VALUES (?1, ?2, ?3)")
            .bind(snowflake_id())
            .bind(&entry.name)
            .bind(&entry.description)
            .execute(&mut *tx)
            .await?;
    }

    for role in SYSTEM_ROLES {
        let inserted = sqlx::query(
            "INSERT OR IGNORE INTO role \
             (id, name, description, is_active, is_protected, created_at) \
             VALUES (?1, ?2, ?3, 1, ?4, ?5)",
        )
        .bind(snowflake_id())
        .bind(role.name)
        .bind(role.description)
        .bind(role.is_protected)
        .bind(now)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        // Grants are only written for newly created roles
        if inserted == 0 {
            continue;
        }
        for grant in permissions::default_grants(role.name) {
            sqlx::query(
                "INSERT OR IGNORE INTO role_permission (role_id, permission_id, created_at) \
                 SELECT r.id, p.id, ?3 FROM role r, permission p WHERE r.name = ?1 AND p.name = ?2",
            )
            .bind(role.name)
            .bind(&grant)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }
        tracing::info!(role = role.name, "Seeded system role");
    }

    tx.commit().await?;

    if let Some(admin) = admin {
        seed_admin(pool, admin, now).await?;
    }
    Ok(())
}

async fn seed_admin(pool: &SqlitePool, admin: &BootstrapAdmin, now: i64) -> RepoResult<()> {
    let email = admin.email.trim().to_lowercase();
    let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM user WHERE email = ?1")
        .bind(&email)
        .fetch_optional(pool)
        .await?;
    if exists.is_some() {
        return Ok(());
    }

    let password_hash = hash_password(&admin.password)
        .map_err(|e| RepoError::Database(format!("Failed to hash bootstrap password: {e}")))?;

    sqlx::query(
        "INSERT INTO user (id, first_name, email, password_hash, role_id, is_active, \
         is_email_confirmed, created_at) \
         SELECT ?1, 'Super', ?2, ?3, r.id, 1, 1, ?4 FROM role r WHERE r.name = ?5",
    )
    .bind(snowflake_id())
    .bind(&email)
    .bind(&password_hash)
    .bind(now)
    .bind(SUPER_ADMIN)
    .execute(pool)
    .await?;

    tracing::info!(email = %email, "Seeded bootstrap SuperAdmin");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::verify_password;
    use crate::db::repository::{permission, role, testing, user};

    #[tokio::test]
    async fn seed_is_idempotent() {
        let pool = testing::pool().await;
        run(&pool, None).await.unwrap();
        run(&pool, None).await.unwrap();

        assert_eq!(role::count(&pool).await.unwrap(), 5);
        let catalog = permission::find_all(&pool).await.unwrap();
        assert_eq!(catalog.len(), permissions::catalog().len());
    }

    #[tokio::test]
    async fn seed_keeps_edited_grants() {
        let pool = testing::pool().await;
        run(&pool, None).await.unwrap();
        let guest = role::find_by_name(&pool, "Guest").await.unwrap().unwrap();
        sqlx::query("DELETE FROM role_permission WHERE role_id = ?1")
            .bind(guest.id)
            .execute(&pool)
            .await
            .unwrap();

        run(&pool, None).await.unwrap();
        assert!(permission::find_by_role(&pool, guest.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn system_roles_are_protected_as_configured() {
        let pool = testing::pool().await;
        run(&pool, None).await.unwrap();

        for system in SYSTEM_ROLES {
            let role = role::find_by_name(&pool, system.name).await.unwrap().unwrap();
            assert_eq!(role.is_protected, system.is_protected, "{}", system.name);
        }
    }

    #[tokio::test]
    async fn bootstrap_admin_is_created_once() {
        let pool = testing::pool().await;
        let admin = BootstrapAdmin {
            email: " Root@Example.com ".into(),
            password: "Str0ng!pass".into(),
        };
        run(&pool, Some(&admin)).await.unwrap();
        run(&pool, Some(&admin)).await.unwrap();

        assert_eq!(user::count(&pool).await.unwrap(), 1);
        let root = user::find_by_email(&pool, "root@example.com").await.unwrap().unwrap();
        assert!(verify_password("Str0ng!pass", &root.password_hash).unwrap());
        assert_eq!(
            user::find_active_role_name(&pool, &root).await.unwrap().as_deref(),
            Some(SUPER_ADMIN)
        );
    }
}
