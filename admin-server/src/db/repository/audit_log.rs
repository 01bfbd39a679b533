//! Audit Log Repository
//!
//! Append-only: there is no update or delete.

use super::{RepoResult, like_escape};
use crate::utils::query::ListQuery;
use shared::models::{AuditLog, AuditLogFilter, AuditType, Paged};
use shared::util::snowflake_id;
use sqlx::SqlitePool;

const AUDIT_FILTER: &str = "(?1 IS NULL OR user_name LIKE '%' || ?1 || '%' ESCAPE '\\') \
     AND (?2 IS NULL OR type = ?2) \
     AND (?3 IS NULL OR activity LIKE '%' || ?3 || '%' ESCAPE '\\') \
     AND (?4 IS NULL OR timestamp >= ?4) \
     AND (?5 IS NULL OR timestamp <= ?5)";

pub async fn insert(
    pool: &SqlitePool,
    user_name: &str,
    kind: AuditType,
    activity: &str,
    timestamp: i64,
) -> RepoResult<i64> {
    let id = snowflake_id();
    sqlx::query(
        "INSERT INTO audit_log (id, user_name, type, activity, timestamp) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
    )
    .bind(id)
    .bind(user_name)
    .bind(kind.as_str())
    .bind(activity)
    .bind(timestamp)
    .execute(pool)
    .await?;
    Ok(id)
}

/// `filter.kind` must already be a canonical [`AuditType`] name
pub async fn find_page(
    pool: &SqlitePool,
    filter: &AuditLogFilter,
    query: &ListQuery,
) -> RepoResult<Paged<AuditLog>> {
    let user_name = like_escape(filter.user_name.as_deref());
    let activity = like_escape(filter.activity.as_deref());

    let count_sql = format!("SELECT COUNT(*) FROM audit_log WHERE {AUDIT_FILTER}");
    let total: i64 = sqlx::query_scalar(&count_sql)
        .bind(&user_name)
        .bind(&filter.kind)
        .bind(&activity)
        .bind(filter.from)
        .bind(filter.to)
        .fetch_one(pool)
        .await?;

    let sql = format!(
        "SELECT id, user_name, type, activity, timestamp FROM audit_log \
         WHERE {AUDIT_FILTER} ORDER BY {}, id LIMIT ?6 OFFSET ?7",
        query.order_clause()
    );
    let items = sqlx::query_as::<_, AuditLog>(&sql)
        .bind(&user_name)
        .bind(&filter.kind)
        .bind(&activity)
        .bind(filter.from)
        .bind(filter.to)
        .bind(query.limit())
        .bind(query.offset())
        .fetch_all(pool)
        .await?;

    Ok(Paged::new(items, total, query.page, query.page_size))
}
