//! Audit Log API Module
//!
//! | 路径 | 方法 | 权限 |
//! |------|------|------|
//! | /api/audit-logs | GET | AuditLogs.List |
//! | /api/audit-logs/export | GET | AuditLogs.List |

mod handler;

use axum::routing::get;
use axum::{Router, middleware};

use crate::auth::permissions::AUDIT_LOGS_LIST;
use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router(state: &ServerState) -> Router<ServerState> {
    Router::new()
        .route("/api/audit-logs", get(handler::list))
        .route("/api/audit-logs/export", get(handler::export))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_permission(&[AUDIT_LOGS_LIST]),
        ))
}
