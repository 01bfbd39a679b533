//! 审计日志服务
//!
//! `AuditService` 写入和查询 `audit_log` 表。

use shared::models::{AuditLog, AuditLogFilter, AuditType, Paged};
use shared::util::now_millis;
use sqlx::SqlitePool;

use crate::db::repository::audit_log;
use crate::utils::AppError;
use crate::utils::query::ListQuery;

/// 审计日志服务
#[derive(Debug, Clone)]
pub struct AuditService {
    pool: SqlitePool,
}

impl AuditService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// 记录一条审计日志
    ///
    /// `actor` 是操作者显示名称；时间戳取当前时间。
    pub async fn log(
        &self,
        actor: &str,
        kind: AuditType,
        activity: impl AsRef<str>,
    ) -> Result<(), AppError> {
        let activity = activity.as_ref();
        audit_log::insert(&self.pool, actor, kind, activity, now_millis()).await?;
        tracing::debug!(target: "audit", actor, kind = %kind, activity, "Audit entry recorded");
        Ok(())
    }

    /// 分页查询
    ///
    /// `filter.kind` 按名称匹配 (大小写不敏感)，未知类型返回校验错误。
    pub async fn query(
        &self,
        mut filter: AuditLogFilter,
        query: &ListQuery,
    ) -> Result<Paged<AuditLog>, AppError> {
        if let Some(kind) = filter.kind.take() {
            let parsed: AuditType = kind.parse().map_err(|_| {
                AppError::validation("Invalid audit type.").with_detail("type", kind.as_str())
            })?;
            filter.kind = Some(parsed.as_str().to_string());
        }
        if let (Some(from), Some(to)) = (filter.from, filter.to)
            && from > to
        {
            return Err(AppError::validation("'from' must not be after 'to'."));
        }
        Ok(audit_log::find_page(&self.pool, &filter, query).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::testing;
    use crate::utils::query::AUDIT_LOG_SORT;
    use shared::ErrorCode;
    use shared::models::PageQuery;

    fn default_query() -> ListQuery {
        ListQuery::parse(&PageQuery::default(), &AUDIT_LOG_SORT).unwrap()
    }

    #[tokio::test]
    async fn logged_entries_are_queryable() {
        let service = AuditService::new(testing::pool().await);
        service.log("Jane Doe", AuditType::Create, "Created role Editor").await.unwrap();
        service.log("Jane Doe", AuditType::Export, "Exported users").await.unwrap();

        let filter = AuditLogFilter {
            kind: Some("export".into()),
            ..Default::default()
        };
        let page = service.query(filter, &default_query()).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].kind, "Export");
        assert_eq!(page.items[0].user_name, "Jane Doe");
    }

    #[tokio::test]
    async fn rejects_unknown_type_and_inverted_range() {
        let service = AuditService::new(testing::pool().await);

        let unknown = AuditLogFilter {
            kind: Some("Purge".into()),
            ..Default::default()
        };
        let err = service.query(unknown, &default_query()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);

        let inverted = AuditLogFilter {
            from: Some(2_000),
            to: Some(1_000),
            ..Default::default()
        };
        assert!(service.query(inverted, &default_query()).await.is_err());
    }

    #[tokio::test]
    async fn write_failure_is_an_error() {
        let pool = testing::pool().await;
        let service = AuditService::new(pool.clone());
        pool.close().await;

        let err = service.log("Jane", AuditType::View, "Viewed roles").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::DatabaseError);
    }
}
