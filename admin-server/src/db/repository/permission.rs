//! Permission Repository

use std::collections::BTreeSet;

use super::RepoResult;
use shared::models::Permission;
use sqlx::{QueryBuilder, Sqlite, SqliteExecutor, SqlitePool};

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Permission>> {
    let permissions = sqlx::query_as::<_, Permission>(
        "SELECT id, name, description FROM permission ORDER BY id",
    )
    .fetch_all(pool)
    .await?;
    Ok(permissions)
}

pub async fn find_by_name(pool: &SqlitePool, name: &str) -> RepoResult<Option<Permission>> {
    let permission = sqlx::query_as::<_, Permission>(
        "SELECT id, name, description FROM permission WHERE name = ?1",
    )
    .bind(name)
    .fetch_optional(pool)
    .await?;
    Ok(permission)
}

/// Permissions granted to one role
pub async fn find_by_role(pool: &SqlitePool, role_id: i64) -> RepoResult<Vec<Permission>> {
    let permissions = sqlx::query_as::<_, Permission>(
        "SELECT p.id, p.name, p.description FROM permission p \
         JOIN role_permission rp ON rp.permission_id = p.id \
         WHERE rp.role_id = ?1 ORDER BY p.id",
    )
    .bind(role_id)
    .fetch_all(pool)
    .await?;
    Ok(permissions)
}

/// How many of `ids` exist in the catalog (`ids` must be deduplicated)
pub async fn count_existing<'e, E>(executor: E, ids: &[i64]) -> RepoResult<i64>
where
    E: SqliteExecutor<'e>,
{
    if ids.is_empty() {
        return Ok(0);
    }
    let mut qb: QueryBuilder<Sqlite> =
        QueryBuilder::new("SELECT COUNT(*) FROM permission WHERE id IN (");
    let mut separated = qb.separated(", ");
    for id in ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(")");

    let count: i64 = qb.build_query_scalar().fetch_one(executor).await?;
    Ok(count)
}

/// Union of permission names granted to the named roles
///
/// Role names are compared byte-for-byte even though the `role.name`
/// column is case-insensitive for uniqueness.
pub async fn names_for_roles(
    pool: &SqlitePool,
    roles: &BTreeSet<String>,
) -> RepoResult<BTreeSet<String>> {
    if roles.is_empty() {
        return Ok(BTreeSet::new());
    }
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
        "SELECT DISTINCT p.name FROM permission p \
         JOIN role_permission rp ON rp.permission_id = p.id \
         JOIN role r ON r.id = rp.role_id \
         WHERE r.name COLLATE BINARY IN (",
    );
    let mut separated = qb.separated(", ");
    for role in roles {
        separated.push_bind(role.as_str());
    }
    separated.push_unseparated(")");

    let names: Vec<String> = qb.build_query_scalar().fetch_all(pool).await?;
    Ok(names.into_iter().collect())
}
