//! Storage seams used by the authorization gate
//!
//! The gate and resolver only see these traits. [`crate::db::SqliteStore`]
//! implements both over the pool; tests substitute counting fakes.

use std::collections::BTreeSet;

use async_trait::async_trait;
use shared::models::User;

use crate::db::repository::RepoError;

/// Looks up users and their current role names
#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, RepoError>;

    /// Current role names of the user (empty when no active role is assigned)
    async fn get_roles_for_user(&self, user: &User) -> Result<Vec<String>, RepoError>;
}

/// Maps role names to the permission names granted to them
#[async_trait]
pub trait PermissionCatalog: Send + Sync {
    async fn get_permissions_for_roles(
        &self,
        roles: &BTreeSet<String>,
    ) -> Result<BTreeSet<String>, RepoError>;
}
