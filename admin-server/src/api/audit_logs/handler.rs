//! Audit Log API Handlers
//!
//! 审计日志不走列表缓存：每次查看本身就会写入新记录。

use axum::extract::State;
use shared::models::{AuditLog, AuditLogFilter, AuditType, PageQuery, Paged};

use crate::api::{ApiResponse, AppResult};
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::query::{AUDIT_LOG_SORT, ListQuery};
use crate::utils::validation::Filter;

/// GET /api/audit-logs - newest first unless `sort_by` says otherwise
pub async fn list(
    State(state): State<ServerState>,
    current: CurrentUser,
    Filter(page): Filter<PageQuery>,
    Filter(filter): Filter<AuditLogFilter>,
) -> AppResult<ApiResponse<Paged<AuditLog>>> {
    let query = ListQuery::parse(&page, &AUDIT_LOG_SORT)?;
    let logs = state.audit.query(filter, &query).await?;

    state
        .audit
        .log(&current.display_name, AuditType::View, "Viewed audit logs")
        .await?;
    Ok(ApiResponse::success(logs))
}

pub async fn export(
    State(state): State<ServerState>,
    current: CurrentUser,
) -> AppResult<ApiResponse<()>> {
    state
        .audit
        .log(&current.display_name, AuditType::Export, "Exported audit logs")
        .await?;
    Ok(ApiResponse::message("Audit log export recorded"))
}
