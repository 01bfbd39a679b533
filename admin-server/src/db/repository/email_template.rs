//! Email Template Repository

use super::{RepoError, RepoResult, like_escape};
use crate::utils::query::ListQuery;
use shared::error::ErrorCode;
use shared::models::{
    EmailTemplate, EmailTemplateFilter, EmailTemplateListItem, EmailTemplatePayload, Paged,
};
use shared::util::{now_millis, snowflake_id};
use sqlx::SqlitePool;

const TEMPLATE_COLUMNS: &str = "id, key, title, subject, from_email, from_name, is_active, \
     is_manual_mail, body, created_by, created_at, updated_by, updated_at";

const TEMPLATE_FILTER: &str = "(?1 IS NULL OR key LIKE '%' || ?1 || '%' ESCAPE '\\') \
     AND (?2 IS NULL OR title LIKE '%' || ?2 || '%' ESCAPE '\\') \
     AND (?3 IS NULL OR subject LIKE '%' || ?3 || '%' ESCAPE '\\') \
     AND (?4 IS NULL OR is_active = ?4)";

pub async fn find_page(
    pool: &SqlitePool,
    filter: &EmailTemplateFilter,
    query: &ListQuery,
) -> RepoResult<Paged<EmailTemplateListItem>> {
    let key = like_escape(filter.key.as_deref());
    let title = like_escape(filter.title.as_deref());
    let subject = like_escape(filter.subject.as_deref());

    let total: i64 = sqlx::query_scalar(&format!(
        "SELECT COUNT(*) FROM email_template WHERE {TEMPLATE_FILTER}"
    ))
    .bind(&key)
    .bind(&title)
    .bind(&subject)
    .bind(filter.is_active)
    .fetch_one(pool)
    .await?;

    let sql = format!(
        "SELECT id, key, title, subject, is_active, is_manual_mail, created_at FROM email_template \
         WHERE {TEMPLATE_FILTER} ORDER BY {}, id LIMIT ?5 OFFSET ?6",
        query.order_clause()
    );
    let items = sqlx::query_as::<_, EmailTemplateListItem>(&sql)
        .bind(&key)
        .bind(&title)
        .bind(&subject)
        .bind(filter.is_active)
        .bind(query.limit())
        .bind(query.offset())
        .fetch_all(pool)
        .await?;

    Ok(Paged::new(items, total, query.page, query.page_size))
}

pub async fn count(pool: &SqlitePool) -> RepoResult<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM email_template")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<EmailTemplate>> {
    let template = sqlx::query_as::<_, EmailTemplate>(&format!(
        "SELECT {TEMPLATE_COLUMNS} FROM email_template WHERE id = ?1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(template)
}

pub async fn find_by_key(pool: &SqlitePool, key: &str) -> RepoResult<Option<EmailTemplate>> {
    let template = sqlx::query_as::<_, EmailTemplate>(&format!(
        "SELECT {TEMPLATE_COLUMNS} FROM email_template WHERE key = ?1 LIMIT 1"
    ))
    .bind(key)
    .fetch_optional(pool)
    .await?;
    Ok(template)
}

pub async fn create(
    pool: &SqlitePool,
    data: &EmailTemplatePayload,
    actor: i64,
) -> RepoResult<EmailTemplate> {
    if find_by_key(pool, &data.key).await?.is_some() {
        return Err(RepoError::business(ErrorCode::EmailTemplateKeyExists));
    }

    let id = snowflake_id();
    sqlx::query(
        "INSERT INTO email_template (id, key, title, subject, from_email, from_name, is_active, \
         is_manual_mail, body, created_by, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
    )
    .bind(id)
    .bind(&data.key)
    .bind(&data.title)
    .bind(&data.subject)
    .bind(&data.from_email)
    .bind(&data.from_name)
    .bind(data.is_active)
    .bind(data.is_manual_mail)
    .bind(&data.body)
    .bind(actor)
    .bind(now_millis())
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create email template".into()))
}

/// Full update; the key may change but must stay unique
pub async fn update(
    pool: &SqlitePool,
    id: i64,
    data: &EmailTemplatePayload,
    actor: i64,
) -> RepoResult<EmailTemplate> {
    if find_by_id(pool, id).await?.is_none() {
        return Err(not_found(id));
    }
    if let Some(other) = find_by_key(pool, &data.key).await?
        && other.id != id
    {
        return Err(RepoError::business(ErrorCode::EmailTemplateKeyExists));
    }

    sqlx::query(
        "UPDATE email_template SET key = ?1, title = ?2, subject = ?3, from_email = ?4, \
         from_name = ?5, is_active = ?6, is_manual_mail = ?7, body = ?8, updated_by = ?9, \
         updated_at = ?10 WHERE id = ?11",
    )
    .bind(&data.key)
    .bind(&data.title)
    .bind(&data.subject)
    .bind(&data.from_email)
    .bind(&data.from_name)
    .bind(data.is_active)
    .bind(data.is_manual_mail)
    .bind(&data.body)
    .bind(actor)
    .bind(now_millis())
    .bind(id)
    .execute(pool)
    .await?;

    find_by_id(pool, id).await?.ok_or_else(|| not_found(id))
}

pub async fn toggle_status(pool: &SqlitePool, id: i64, actor: i64) -> RepoResult<EmailTemplate> {
    let rows = sqlx::query(
        "UPDATE email_template SET is_active = 1 - is_active, updated_by = ?1, updated_at = ?2 \
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

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<EmailTemplate> {
    let existing = find_by_id(pool, id).await?.ok_or_else(|| not_found(id))?;
    sqlx::query("DELETE FROM email_template WHERE id = ?1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(existing)
}

fn not_found(id: i64) -> RepoError {
    RepoError::Business(
        ErrorCode::EmailTemplateNotFound,
        format!("Email template {id} not found"),
    )
}
