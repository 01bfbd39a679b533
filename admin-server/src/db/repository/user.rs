//! User Repository

use super::{RepoError, RepoResult, like_escape};
use crate::utils::query::ListQuery;
use shared::error::ErrorCode;
use shared::models::{Paged, User, UserCreate, UserFilter, UserListItem, UserUpdate};
use shared::util::{now_millis, snowflake_id};
use sqlx::SqlitePool;

const USER_COLUMNS: &str = "id, first_name, last_name, email, phone, password_hash, role_id, \
     is_active, is_email_confirmed, last_login, created_by, created_at, updated_by, updated_at";

const LIST_COLUMNS: &str = "u.id, u.first_name, u.last_name, u.email, u.phone, u.role_id, \
     r.name AS role_name, u.is_active, u.last_login, u.created_at";

const USER_FILTER: &str = "(?1 IS NULL \
     OR (u.first_name || ' ' || COALESCE(u.last_name, '')) LIKE '%' || ?1 || '%' ESCAPE '\\') \
     AND (?2 IS NULL OR u.email LIKE '%' || ?2 || '%' ESCAPE '\\') \
     AND (?3 IS NULL OR u.phone LIKE '%' || ?3 || '%' ESCAPE '\\') \
     AND (?4 IS NULL OR u.role_id = ?4) \
     AND (?5 IS NULL OR u.is_active = ?5)";

pub async fn find_page(
    pool: &SqlitePool,
    filter: &UserFilter,
    query: &ListQuery,
) -> RepoResult<Paged<UserListItem>> {
    let name = like_escape(filter.name.as_deref());
    let email = like_escape(filter.email.as_deref());
    let phone = like_escape(filter.phone.as_deref());

    let total: i64 = sqlx::query_scalar(&format!(
        "SELECT COUNT(*) FROM user u WHERE {USER_FILTER}"
    ))
    .bind(&name)
    .bind(&email)
    .bind(&phone)
    .bind(filter.role_id)
    .bind(filter.is_active)
    .fetch_one(pool)
    .await?;

    let sql = format!(
        "SELECT {LIST_COLUMNS} FROM user u LEFT JOIN role r ON r.id = u.role_id \
         WHERE {USER_FILTER} ORDER BY {}, u.id LIMIT ?6 OFFSET ?7",
        query.order_clause()
    );
    let items = sqlx::query_as::<_, UserListItem>(&sql)
        .bind(&name)
        .bind(&email)
        .bind(&phone)
        .bind(filter.role_id)
        .bind(filter.is_active)
        .bind(query.limit())
        .bind(query.offset())
        .fetch_all(pool)
        .await?;

    Ok(Paged::new(items, total, query.page, query.page_size))
}

pub async fn count(pool: &SqlitePool) -> RepoResult<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM user")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM user WHERE id = ?1"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

/// Case-insensitive lookup (the column is `COLLATE NOCASE`)
pub async fn find_by_email(pool: &SqlitePool, email: &str) -> RepoResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM user WHERE email = ?1 LIMIT 1"
    ))
    .bind(email)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

/// Name of the user's role, only while that role is active
pub async fn find_active_role_name(pool: &SqlitePool, user: &User) -> RepoResult<Option<String>> {
    let Some(role_id) = user.role_id else {
        return Ok(None);
    };
    let name: Option<String> =
        sqlx::query_scalar("SELECT name FROM role WHERE id = ?1 AND is_active = 1")
            .bind(role_id)
            .fetch_optional(pool)
            .await?;
    Ok(name)
}

/// Create a user on behalf of an administrator; the email counts as confirmed
pub async fn create(
    pool: &SqlitePool,
    data: &UserCreate,
    password_hash: &str,
    actor: i64,
) -> RepoResult<User> {
    insert(pool, data, password_hash, true, Some(actor)).await
}

/// Self-registration: no creator, email awaiting confirmation
pub async fn register(
    pool: &SqlitePool,
    data: &UserCreate,
    password_hash: &str,
) -> RepoResult<User> {
    insert(pool, data, password_hash, false, None).await
}

async fn insert(
    pool: &SqlitePool,
    data: &UserCreate,
    password_hash: &str,
    email_confirmed: bool,
    actor: Option<i64>,
) -> RepoResult<User> {
    if find_by_email(pool, &data.email).await?.is_some() {
        return Err(RepoError::business(ErrorCode::UserEmailExists));
    }
    ensure_role_exists(pool, data.role_id).await?;

    let id = snowflake_id();
    sqlx::query(
        "INSERT INTO user (id, first_name, last_name, email, phone, password_hash, role_id, \
         is_active, is_email_confirmed, created_by, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
    )
    .bind(id)
    .bind(&data.first_name)
    .bind(&data.last_name)
    .bind(&data.email)
    .bind(&data.phone)
    .bind(password_hash)
    .bind(data.role_id)
    .bind(data.is_active)
    .bind(email_confirmed)
    .bind(actor)
    .bind(now_millis())
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create user".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: &UserUpdate, actor: i64) -> RepoResult<User> {
    if find_by_id(pool, id).await?.is_none() {
        return Err(not_found(id));
    }
    if let Some(other) = find_by_email(pool, &data.email).await?
        && other.id != id
    {
        return Err(RepoError::business(ErrorCode::UserEmailExists));
    }
    ensure_role_exists(pool, data.role_id).await?;

    sqlx::query(
        "UPDATE user SET first_name = ?1, last_name = ?2, email = ?3, phone = ?4, role_id = ?5, \
         is_active = ?6, updated_by = ?7, updated_at = ?8 WHERE id = ?9",
    )
    .bind(&data.first_name)
    .bind(&data.last_name)
    .bind(&data.email)
    .bind(&data.phone)
    .bind(data.role_id)
    .bind(data.is_active)
    .bind(actor)
    .bind(now_millis())
    .bind(id)
    .execute(pool)
    .await?;

    find_by_id(pool, id).await?.ok_or_else(|| not_found(id))
}

pub async fn set_active(
    pool: &SqlitePool,
    id: i64,
    is_active: bool,
    actor: i64,
) -> RepoResult<User> {
    let rows = sqlx::query(
        "UPDATE user SET is_active = ?1, updated_by = ?2, updated_at = ?3 WHERE id = ?4",
    )
    .bind(is_active)
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

pub async fn update_password(
    pool: &SqlitePool,
    id: i64,
    password_hash: &str,
    actor: i64,
) -> RepoResult<()> {
    let rows = sqlx::query(
        "UPDATE user SET password_hash = ?1, updated_by = ?2, updated_at = ?3 WHERE id = ?4",
    )
    .bind(password_hash)
    .bind(actor)
    .bind(now_millis())
    .bind(id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(not_found(id));
    }
    Ok(())
}

pub async fn confirm_email(pool: &SqlitePool, id: i64) -> RepoResult<()> {
    let rows = sqlx::query("UPDATE user SET is_email_confirmed = 1, updated_at = ?1 WHERE id = ?2")
        .bind(now_millis())
        .bind(id)
        .execute(pool)
        .await?;

    if rows.rows_affected() == 0 {
        return Err(not_found(id));
    }
    Ok(())
}

pub async fn touch_last_login(pool: &SqlitePool, id: i64) -> RepoResult<()> {
    sqlx::query("UPDATE user SET last_login = ?1 WHERE id = ?2")
        .bind(now_millis())
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<User> {
    let existing = find_by_id(pool, id).await?.ok_or_else(|| not_found(id))?;

    sqlx::query("DELETE FROM user WHERE id = ?1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(existing)
}

async fn ensure_role_exists(pool: &SqlitePool, role_id: i64) -> RepoResult<()> {
    let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM role WHERE id = ?1")
        .bind(role_id)
        .fetch_optional(pool)
        .await?;
    match exists {
        Some(_) => Ok(()),
        None => Err(RepoError::Business(
            ErrorCode::RoleNotFound,
            format!("Role {role_id} not found"),
        )),
    }
}

fn not_found(id: i64) -> RepoError {
    RepoError::Business(ErrorCode::UserNotFound, format!("User {id} not found"))
}
