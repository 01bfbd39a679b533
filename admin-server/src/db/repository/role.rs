//! Role Repository

use super::{RepoError, RepoResult, like_escape, permission};
use crate::utils::query::ListQuery;
use shared::error::ErrorCode;
use shared::models::{Paged, Role, RoleDetail, RoleFilter, RoleOption, RolePayload};
use shared::util::{now_millis, snowflake_id};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};

const ROLE_COLUMNS: &str = "r.id, r.name, r.description, r.is_active, r.is_protected, \
     r.created_by, r.created_at, r.updated_by, r.updated_at";

const ROLE_FILTER: &str = "(?1 IS NULL OR r.name LIKE '%' || ?1 || '%' ESCAPE '\\') \
     AND (?2 IS NULL OR r.description LIKE '%' || ?2 || '%' ESCAPE '\\') \
     AND (?3 IS NULL OR r.is_active = ?3)";

pub async fn find_page(
    pool: &SqlitePool,
    filter: &RoleFilter,
    query: &ListQuery,
) -> RepoResult<Paged<Role>> {
    let name = like_escape(filter.name.as_deref());
    let description = like_escape(filter.description.as_deref());

    let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM role r WHERE {ROLE_FILTER}"))
        .bind(&name)
        .bind(&description)
        .bind(filter.is_active)
        .fetch_one(pool)
        .await?;

    let sql = format!(
        "SELECT {ROLE_COLUMNS} FROM role r WHERE {ROLE_FILTER} \
         ORDER BY {}, r.id LIMIT ?4 OFFSET ?5",
        query.order_clause()
    );
    let items = sqlx::query_as::<_, Role>(&sql)
        .bind(&name)
        .bind(&description)
        .bind(filter.is_active)
        .bind(query.limit())
        .bind(query.offset())
        .fetch_all(pool)
        .await?;

    Ok(Paged::new(items, total, query.page, query.page_size))
}

pub async fn count(pool: &SqlitePool) -> RepoResult<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM role")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Active roles for the user editor dropdown
pub async fn find_options(pool: &SqlitePool) -> RepoResult<Vec<RoleOption>> {
    let options = sqlx::query_as::<_, RoleOption>(
        "SELECT id, name FROM role WHERE is_active = 1 ORDER BY name",
    )
    .fetch_all(pool)
    .await?;
    Ok(options)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Role>> {
    let sql = format!("SELECT {ROLE_COLUMNS} FROM role r WHERE r.id = ?1");
    let role = sqlx::query_as::<_, Role>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(role)
}

/// Case-insensitive lookup (the column is `COLLATE NOCASE`)
pub async fn find_by_name(pool: &SqlitePool, name: &str) -> RepoResult<Option<Role>> {
    let role = sqlx::query_as::<_, Role>(&format!(
        "SELECT {ROLE_COLUMNS} FROM role r WHERE r.name = ?1 LIMIT 1"
    ))
    .bind(name)
    .fetch_optional(pool)
    .await?;
    Ok(role)
}

pub async fn find_detail(pool: &SqlitePool, id: i64) -> RepoResult<Option<RoleDetail>> {
    let Some(role) = find_by_id(pool, id).await? else {
        return Ok(None);
    };
    let permissions = permission::find_by_role(pool, id).await?;
    Ok(Some(RoleDetail { role, permissions }))
}

/// Create a role and its grants in one transaction
pub async fn create(pool: &SqlitePool, data: &RolePayload, actor: i64) -> RepoResult<Role> {
    if find_by_name(pool, &data.name).await?.is_some() {
        return Err(RepoError::business(ErrorCode::RoleNameExists));
    }

    let id = snowflake_id();
    let now = now_millis();

    let mut tx = pool.begin().await?;
    check_permissions(&mut tx, &data.permission_ids).await?;

    sqlx::query(
        "INSERT INTO role (id, name, description, is_active, is_protected, created_by, created_at) \
         VALUES (?1, ?2, ?3, ?4, 0, ?5, ?6)",
    )
    .bind(id)
    .bind(&data.name)
    .bind(&data.description)
    .bind(data.is_active)
    .bind(actor)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    insert_grants(&mut tx, id, &data.permission_ids, actor, now).await?;
    tx.commit().await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create role".into()))
}

/// Update a role and replace its grants in one transaction
pub async fn update(
    pool: &SqlitePool,
    id: i64,
    data: &RolePayload,
    actor: i64,
) -> RepoResult<Role> {
    let existing = find_by_id(pool, id).await?.ok_or_else(|| not_found(id))?;

    if existing.is_protected {
        return Err(RepoError::business(ErrorCode::RoleIsProtected));
    }
    if let Some(other) = find_by_name(pool, &data.name).await?
        && other.id != id
    {
        return Err(RepoError::business(ErrorCode::RoleNameExists));
    }

    let now = now_millis();
    let mut tx = pool.begin().await?;
    check_permissions(&mut tx, &data.permission_ids).await?;

    sqlx::query(
        "UPDATE role SET name = ?1, description = ?2, is_active = ?3, updated_by = ?4, \
         updated_at = ?5 WHERE id = ?6",
    )
    .bind(&data.name)
    .bind(&data.description)
    .bind(data.is_active)
    .bind(actor)
    .bind(now)
    .bind(id)
    .execute(&mut *tx)
    .await?;

    sqlx::query("DELETE FROM role_permission WHERE role_id = ?1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    insert_grants(&mut tx, id, &data.permission_ids, actor, now).await?;
    tx.commit().await?;

    find_by_id(pool, id).await?.ok_or_else(|| not_found(id))
}

/// Flip `is_active`
pub async fn toggle_status(pool: &SqlitePool, id: i64, actor: i64) -> RepoResult<Role> {
    let existing = find_by_id(pool, id).await?.ok_or_else(|| not_found(id))?;

    if existing.is_protected {
        return Err(RepoError::business(ErrorCode::RoleIsProtected));
    }

    sqlx::query("UPDATE role SET is_active = ?1, updated_by = ?2, updated_at = ?3 WHERE id = ?4")
        .bind(!existing.is_active)
        .bind(actor)
        .bind(now_millis())
        .bind(id)
        .execute(pool)
        .await?;

    find_by_id(pool, id).await?.ok_or_else(|| not_found(id))
}

/// Delete an unprotected role that no user holds; grants cascade
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<Role> {
    let existing = find_by_id(pool, id).await?.ok_or_else(|| not_found(id))?;

    if existing.is_protected {
        return Err(RepoError::business(ErrorCode::RoleIsProtected));
    }

    let holders: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM user WHERE role_id = ?1")
        .bind(id)
        .fetch_one(pool)
        .await?;
    if holders > 0 {
        return Err(RepoError::business(ErrorCode::RoleInUse));
    }

    sqlx::query("DELETE FROM role WHERE id = ?1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(existing)
}

/// Every role must keep at least one grant, and every grant must exist
async fn check_permissions(conn: &mut SqliteConnection, ids: &[i64]) -> RepoResult<()> {
    if ids.is_empty() {
        return Err(RepoError::business(ErrorCode::RolePermissionsRequired));
    }
    let known = permission::count_existing(&mut *conn, ids).await?;
    if known != ids.len() as i64 {
        return Err(RepoError::business(ErrorCode::UnknownPermission));
    }
    Ok(())
}

async fn insert_grants(
    conn: &mut SqliteConnection,
    role_id: i64,
    permission_ids: &[i64],
    actor: i64,
    now: i64,
) -> RepoResult<()> {
    if permission_ids.is_empty() {
        return Ok(());
    }
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
        "INSERT INTO role_permission (role_id, permission_id, created_by, created_at) ",
    );
    qb.push_values(permission_ids, |mut row, permission_id| {
        row.push_bind(role_id)
            .push_bind(*permission_id)
            .push_bind(actor)
            .push_bind(now);
    });
    qb.build().execute(conn).await?;
    Ok(())
}

fn not_found(id: i64) -> RepoError {
    RepoError::Business(ErrorCode::RoleNotFound, format!("Role {id} not found"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::testing;
    use crate::db::seed;
    use crate::utils::query::ROLE_SORT;
    use shared::models::PageQuery;

    async fn seeded() -> SqlitePool {
        let pool = testing::pool().await;
        seed::run(&pool, None).await.unwrap();
        pool
    }

    async fn permission_ids(pool: &SqlitePool, names: &[&str]) -> Vec<i64> {
        let mut ids = Vec::new();
        for name in names {
            ids.push(permission::find_by_name(pool, name).await.unwrap().unwrap().id);
        }
        ids.sort_unstable();
        ids
    }

    fn payload(name: &str, permission_ids: Vec<i64>) -> RolePayload {
        RolePayload {
            name: name.into(),
            description: "Edits content".into(),
            is_active: true,
            permission_ids,
        }
    }

    #[tokio::test]
    async fn create_with_grants() {
        let pool = seeded().await;
        let ids = permission_ids(&pool, &["CMS.List", "CMS.Edit"]).await;

        let role = create(&pool, &payload("Editor", ids.clone()), 1).await.unwrap();
        assert!(!role.is_protected);
        assert_eq!(role.created_by, Some(1));

        let detail = find_detail(&pool, role.id).await.unwrap().unwrap();
        let mut granted: Vec<i64> = detail.permissions.iter().map(|p| p.id).collect();
        granted.sort_unstable();
        assert_eq!(granted, ids);
    }

    #[tokio::test]
    async fn create_rejects_duplicate_name_case_insensitively() {
        let pool = seeded().await;
        let ids = permission_ids(&pool, &["CMS.List"]).await;

        let err = create(&pool, &payload("guest", ids), 1).await.unwrap_err();
        assert!(matches!(err, RepoError::Business(ErrorCode::RoleNameExists, _)));
    }

    #[tokio::test]
    async fn create_requires_known_permissions() {
        let pool = seeded().await;

        let err = create(&pool, &payload("Editor", vec![]), 1).await.unwrap_err();
        assert!(matches!(err, RepoError::Business(ErrorCode::RolePermissionsRequired, _)));

        let err = create(&pool, &payload("Editor", vec![-5]), 1).await.unwrap_err();
        assert!(matches!(err, RepoError::Business(ErrorCode::UnknownPermission, _)));
        assert!(find_by_name(&pool, "Editor").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_replaces_grants() {
        let pool = seeded().await;
        let initial = permission_ids(&pool, &["CMS.List", "CMS.Edit"]).await;
        let role = create(&pool, &payload("Editor", initial), 1).await.unwrap();

        let replacement = permission_ids(&pool, &["FAQ.List"]).await;
        let updated = update(&pool, role.id, &payload("Writer", replacement), 2)
            .await
            .unwrap();
        assert_eq!(updated.name, "Writer");
        assert_eq!(updated.updated_by, Some(2));

        let granted = permission::find_by_role(&pool, role.id).await.unwrap();
        let names: Vec<&str> = granted.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["FAQ.List"]);
    }

    #[tokio::test]
    async fn update_cannot_strip_every_grant() {
        let pool = seeded().await;
        let initial = permission_ids(&pool, &["CMS.List", "CMS.Edit"]).await;
        let role = create(&pool, &payload("Editor", initial), 1).await.unwrap();

        let err = update(&pool, role.id, &payload("Editor", vec![]), 2)
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Business(ErrorCode::RolePermissionsRequired, _)));

        let granted = permission::find_by_role(&pool, role.id).await.unwrap();
        let mut names: Vec<&str> = granted.iter().map(|p| p.name.as_str()).collect();
        names.sort_unstable();
        assert_eq!(names, vec!["CMS.Edit", "CMS.List"]);
        let unchanged = find_by_id(&pool, role.id).await.unwrap().unwrap();
        assert_eq!(unchanged.updated_by, None);
    }

    #[tokio::test]
    async fn protected_roles_are_immutable() {
        let pool = seeded().await;
        let admin = find_by_name(&pool, "Admin").await.unwrap().unwrap();
        let ids = permission_ids(&pool, &["CMS.List"]).await;

        for err in [
            update(&pool, admin.id, &payload("Admin", ids), 1).await.unwrap_err(),
            toggle_status(&pool, admin.id, 1).await.unwrap_err(),
            delete(&pool, admin.id).await.unwrap_err(),
        ] {
            assert!(matches!(err, RepoError::Business(ErrorCode::RoleIsProtected, _)));
        }
    }

    #[tokio::test]
    async fn toggle_flips_status() {
        let pool = seeded().await;
        let guest = find_by_name(&pool, "Guest").await.unwrap().unwrap();
        assert!(guest.is_active);

        let toggled = toggle_status(&pool, guest.id, 1).await.unwrap();
        assert!(!toggled.is_active);
        let options = find_options(&pool).await.unwrap();
        assert!(options.iter().all(|o| o.name != "Guest"));
    }

    #[tokio::test]
    async fn delete_refuses_roles_in_use() {
        let pool = seeded().await;
        let guest = find_by_name(&pool, "Guest").await.unwrap().unwrap();
        sqlx::query(
            "INSERT INTO user (id, first_name, email, password_hash, role_id, created_at) \
             VALUES (1, 'Gus', 'gus@example.com', 'x', ?1, 0)",
        )
        .bind(guest.id)
        .execute(&pool)
        .await
        .unwrap();

        let err = delete(&pool, guest.id).await.unwrap_err();
        assert!(matches!(err, RepoError::Business(ErrorCode::RoleInUse, _)));

        let ids = permission_ids(&pool, &["CMS.List"]).await;
        let spare = create(&pool, &payload("Spare", ids), 1).await.unwrap();
        delete(&pool, spare.id).await.unwrap();
        assert!(find_by_id(&pool, spare.id).await.unwrap().is_none());
        assert!(permission::find_by_role(&pool, spare.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn page_filters_and_sorts() {
        let pool = seeded().await;
        let query = ListQuery::parse(&PageQuery::default(), &ROLE_SORT).unwrap();

        let all = find_page(&pool, &RoleFilter::default(), &query).await.unwrap();
        assert_eq!(all.total, 5);
        let names: Vec<&str> = all.items.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Admin", "Guest", "Manager", "SuperAdmin", "User"]);

        let filter = RoleFilter {
            name: Some("admin".into()),
            ..Default::default()
        };
        let admins = find_page(&pool, &filter, &query).await.unwrap();
        assert_eq!(admins.total, 2);

        let paged = ListQuery::parse(
            &PageQuery {
                page: Some(2),
                page_size: Some(2),
                ..Default::default()
            },
            &ROLE_SORT,
        )
        .unwrap();
        let second = find_page(&pool, &RoleFilter::default(), &paged).await.unwrap();
        assert_eq!(second.total, 5);
        assert_eq!(second.items.len(), 2);
        assert_eq!(second.items[0].name, "Manager");
    }
}
