//! SQLite-backed identity store and permission catalog

use std::collections::BTreeSet;

use async_trait::async_trait;
use shared::models::User;
use sqlx::SqlitePool;

use super::repository::{RepoError, permission, user};
use crate::auth::{IdentityStore, PermissionCatalog};

/// Reads users, roles and grants straight from the pool on every call
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityStore for SqliteStore {
    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, RepoError> {
        user::find_by_id(&self.pool, id).await
    }

    /// A user holds at most one role; a deactivated role counts as none
    async fn get_roles_for_user(&self, user: &User) -> Result<Vec<String>, RepoError> {
        Ok(user::find_active_role_name(&self.pool, user)
            .await?
            .into_iter()
            .collect())
    }
}

#[async_trait]
impl PermissionCatalog for SqliteStore {
    async fn get_permissions_for_roles(
        &self,
        roles: &BTreeSet<String>,
    ) -> Result<BTreeSet<String>, RepoError> {
        permission::names_for_roles(&self.pool, roles).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::resolver;
    use crate::db::repository::{role, testing};
    use crate::db::seed;

    async fn user_with_role(pool: &SqlitePool, role_name: &str) -> User {
        let role = role::find_by_name(pool, role_name).await.unwrap().unwrap();
        sqlx::query(
            "INSERT INTO user (id, first_name, email, password_hash, role_id, created_at) \
             VALUES (10, 'Gus', 'gus@example.com', 'x', ?1, 0)",
        )
        .bind(role.id)
        .execute(pool)
        .await
        .unwrap();
        user::find_by_id(pool, 10).await.unwrap().unwrap()
    }

    #[tokio::test]
    async fn roles_come_from_storage() {
        let pool = testing::pool().await;
        seed::run(&pool, None).await.unwrap();
        let store = SqliteStore::new(pool.clone());
        let gus = user_with_role(&pool, "Manager").await;

        assert_eq!(store.get_roles_for_user(&gus).await.unwrap(), vec!["Manager"]);
        assert!(store.find_user_by_id(999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn removing_all_grants_resolves_to_nothing() {
        let pool = testing::pool().await;
        seed::run(&pool, None).await.unwrap();
        let store = SqliteStore::new(pool.clone());
        let gus = user_with_role(&pool, "Guest").await;

        let roles: BTreeSet<String> =
            store.get_roles_for_user(&gus).await.unwrap().into_iter().collect();
        assert!(!resolver::resolve(&store, &roles).await.unwrap().is_empty());

        sqlx::query("DELETE FROM role_permission WHERE role_id = ?1")
            .bind(gus.role_id)
            .execute(&pool)
            .await
            .unwrap();
        assert!(resolver::resolve(&store, &roles).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn closed_pool_is_an_error() {
        let pool = testing::pool().await;
        let store = SqliteStore::new(pool.clone());
        pool.close().await;

        assert!(matches!(
            store.find_user_by_id(1).await,
            Err(RepoError::Database(_))
        ));
    }
}
