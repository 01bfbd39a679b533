//! Email Template API Module
//!
//! | 路径 | 方法 | 权限 |
//! |------|------|------|
//! | /api/email-templates | GET | EmailTemplates.List |
//! | /api/email-templates/count | GET | EmailTemplates.List |
//! | /api/email-templates/export | GET | EmailTemplates.List |
//! | /api/email-templates/{id} | GET | EmailTemplates.List |
//! | /api/email-templates | POST | EmailTemplates.Add |
//! | /api/email-templates/{id} | PUT | EmailTemplates.Edit |
//! | /api/email-templates/{id}/toggle-status | PATCH | EmailTemplates.Edit |
//! | /api/email-templates/{id} | DELETE | EmailTemplates.Delete |

mod handler;

use axum::routing::{delete, get, patch, post, put};
use axum::{Router, middleware};

use crate::auth::permissions::{
    EMAIL_TEMPLATES_ADD, EMAIL_TEMPLATES_DELETE, EMAIL_TEMPLATES_EDIT, EMAIL_TEMPLATES_LIST,
};
use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router(state: &ServerState) -> Router<ServerState> {
    let read_routes = Router::new()
        .route("/api/email-templates", get(handler::list))
        .route("/api/email-templates/count", get(handler::count))
        .route("/api/email-templates/export", get(handler::export))
        .route("/api/email-templates/{id}", get(handler::get_by_id))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_permission(&[EMAIL_TEMPLATES_LIST]),
        ));

    let add_routes = Router::new()
        .route("/api/email-templates", post(handler::create))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_permission(&[EMAIL_TEMPLATES_ADD]),
        ));

    let edit_routes = Router::new()
        .route("/api/email-templates/{id}", put(handler::update))
        .route(
            "/api/email-templates/{id}/toggle-status",
            patch(handler::toggle_status),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_permission(&[EMAIL_TEMPLATES_EDIT]),
        ));

    let delete_routes = Router::new()
        .route("/api/email-templates/{id}", delete(handler::delete))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_permission(&[EMAIL_TEMPLATES_DELETE]),
        ));

    read_routes
        .merge(add_routes)
        .merge(edit_routes)
        .merge(delete_routes)
}
