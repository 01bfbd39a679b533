//! Permission resolver
//!
//! Role names in, union of granted permission names out. Names are matched
//! exactly (case-sensitive); there are no wildcards and no implied
//! permissions. Nothing is cached: every call reads the catalog.

use std::collections::BTreeSet;

use super::PermissionCatalog;
use crate::db::repository::RepoError;

/// Resolve the effective permission set for a set of role names
///
/// An empty role set resolves to the empty set without touching the catalog.
/// Unknown roles contribute nothing. Storage errors are returned, never
/// turned into an empty set.
pub async fn resolve(
    catalog: &dyn PermissionCatalog,
    roles: &BTreeSet<String>,
) -> Result<BTreeSet<String>, RepoError> {
    if roles.is_empty() {
        return Ok(BTreeSet::new());
    }
    catalog.get_permissions_for_roles(roles).await
}
