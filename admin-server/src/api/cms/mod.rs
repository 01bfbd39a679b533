//! CMS Page API Module
//!
//! | 路径 | 方法 | 权限 |
//! |------|------|------|
//! | /api/cms | GET | CMS.List |
//! | /api/cms/count | GET | CMS.List |
//! | /api/cms/export | GET | CMS.List |
//! | /api/cms/{id} | GET | CMS.List |
//! | /api/cms | POST | CMS.Add |
//! | /api/cms/{id} | PUT | CMS.Edit |
//! | /api/cms/{id}/toggle-status | PATCH | CMS.Edit |
//! | /api/cms/{id} | DELETE | CMS.Delete |

mod handler;

use axum::routing::{delete, get, patch, post, put};
use axum::{Router, middleware};

use crate::auth::permissions::{CMS_ADD, CMS_DELETE, CMS_EDIT, CMS_LIST};
use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router(state: &ServerState) -> Router<ServerState> {
    let read_routes = Router::new()
        .route("/api/cms", get(handler::list))
        .route("/api/cms/count", get(handler::count))
        .route("/api/cms/export", get(handler::export))
        .route("/api/cms/{id}", get(handler::get_by_id))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_permission(&[CMS_LIST]),
        ));

    let add_routes = Router::new()
        .route("/api/cms", post(handler::create))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_permission(&[CMS_ADD]),
        ));

    let edit_routes = Router::new()
        .route("/api/cms/{id}", put(handler::update))
        .route("/api/cms/{id}/toggle-status", patch(handler::toggle_status))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_permission(&[CMS_EDIT]),
        ));

    let delete_routes = Router::new()
        .route("/api/cms/{id}", delete(handler::delete))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_permission(&[CMS_DELETE]),
        ));

    read_routes
        .merge(add_routes)
        .merge(edit_routes)
        .merge(delete_routes)
}
