//! CMS Page Repository

use super::{RepoError, RepoResult, like_escape};
use crate::utils::query::ListQuery;
use shared::error::ErrorCode;
use shared::models::{CmsCreate, CmsFilter, CmsListItem, CmsPage, CmsUpdate, Paged};
use shared::util::{now_millis, snowflake_id};
use sqlx::SqlitePool;

const CMS_COLUMNS: &str = "id, key, title, meta_keyword, meta_title, meta_description, content, \
     is_active, created_by, created_at, updated_by, updated_at";

const CMS_FILTER: &str = "(?1 IS NULL OR title LIKE '%' || ?1 || '%' ESCAPE '\\') \
     AND (?2 IS NULL OR key LIKE '%' || ?2 || '%' ESCAPE '\\') \
     AND (?3 IS NULL OR meta_keyword LIKE '%' || ?3 || '%' ESCAPE '\\') \
     AND (?4 IS NULL OR is_active = ?4)";

pub async fn find_page(
    pool: &SqlitePool,
    filter: &CmsFilter,
    query: &ListQuery,
) -> RepoResult<Paged<CmsListItem>> {
    let title = like_escape(filter.title.as_deref());
    let key = like_escape(filter.key.as_deref());
    let meta_keyword = like_escape(filter.meta_keyword.as_deref());

    let count_sql = format!("SELECT COUNT(*) FROM cms_page WHERE {CMS_FILTER}");
    let total: i64 = sqlx::query_scalar(&count_sql)
        .bind(&title)
        .bind(&key)
        .bind(&meta_keyword)
        .bind(filter.is_active)
        .fetch_one(pool)
        .await?;

    let sql = format!(
        "SELECT id, key, title, meta_keyword, is_active, created_at FROM cms_page \
         WHERE {CMS_FILTER} ORDER BY {}, id LIMIT ?5 OFFSET ?6",
        query.order_clause()
    );
    let items = sqlx::query_as::<_, CmsListItem>(&sql)
        .bind(&title)
        .bind(&key)
        .bind(&meta_keyword)
        .bind(filter.is_active)
        .bind(query.limit())
        .bind(query.offset())
        .fetch_all(pool)
        .await?;

    Ok(Paged::new(items, total, query.page, query.page_size))
}

pub async fn count(pool: &SqlitePool) -> RepoResult<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cms_page")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<CmsPage>> {
    let sql = format!("SELECT {CMS_COLUMNS} FROM cms_page WHERE id = ?1");
    let page = sqlx::query_as::<_, CmsPage>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(page)
}

pub async fn find_by_key(pool: &SqlitePool, key: &str) -> RepoResult<Option<CmsPage>> {
    let page = sqlx::query_as::<_, CmsPage>(&format!(
        "SELECT {CMS_COLUMNS} FROM cms_page WHERE key = ?1 LIMIT 1"
    ))
    .bind(key)
    .fetch_optional(pool)
    .await?;
    Ok(page)
}

pub async fn create(pool: &SqlitePool, data: &CmsCreate, actor: i64) -> RepoResult<CmsPage> {
    if find_by_key(pool, &data.key).await?.is_some() {
        return Err(RepoError::business(ErrorCode::CmsKeyExists));
    }

    let id = snowflake_id();
    sqlx::query(
        "INSERT INTO cms_page (id, key, title, meta_keyword, meta_title, meta_description, \
         content, is_active, created_by, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
    )
    .bind(id)
    .bind(&data.key)
    .bind(&data.title)
    .bind(&data.meta_keyword)
    .bind(&data.meta_title)
    .bind(&data.meta_description)
    .bind(&data.content)
    .bind(data.is_active)
    .bind(actor)
    .bind(now_millis())
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create CMS page".into()))
}

/// Update everything but the key
pub async fn update(
    pool: &SqlitePool,
    id: i64,
    data: &CmsUpdate,
    actor: i64,
) -> RepoResult<CmsPage> {
    let rows = sqlx::query(
        "UPDATE cms_page SET title = ?1, meta_keyword = ?2, meta_title = ?3, \
         meta_description = ?4, content = ?5, is_active = ?6, updated_by = ?7, \
         updated_at = ?8 WHERE id = ?9",
    )
    .bind(&data.title)
    .bind(&data.meta_keyword)
    .bind(&data.meta_title)
    .bind(&data.meta_description)
    .bind(&data.content)
    .bind(data.is_active)
    .bind(actor)
    .bind(now_millis())
    .bind(id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(not_found(id));
    }
    find_by_id(pool, id).await?.ok_or_else(|| not_found(id))
}

pub async fn toggle_status(pool: &SqlitePool, id: i64, actor: i64) -> RepoResult<CmsPage> {
    let rows = sqlx::query(
        "UPDATE cms_page SET is_active = 1 - is_active, updated_by = ?1, updated_at = ?2 \
         WHERE id = ?3",
    )
    .bind(actor)
    .bind(now_millis())
    .bind(id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(not_found(id));
    }
    find_by_id(pool, id).await?.ok_or_else(|| not_found(id))
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<CmsPage> {
    let existing = find_by_id(pool, id).await?.ok_or_else(|| not_found(id))?;
    sqlx::query("DELETE FROM cms_page WHERE id = ?1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(existing)
}

fn not_found(id: i64) -> RepoError {
    RepoError::Business(ErrorCode::CmsNotFound, format!("CMS page {id} not found"))
}
