//! Role API Module
//!
//! | 路径 | 方法 | 权限 |
//! |------|------|------|
//! | /api/roles | GET | Roles.List |
//! | /api/roles/count | GET | Roles.List |
//! | /api/roles/export | GET | Roles.List |
//! | /api/roles/{id} | GET | Roles.List |
//! | /api/roles/simple | GET | Users.List |
//! | /api/roles | POST | Roles.Add |
//! | /api/roles/{id} | PUT | Roles.Edit |
//! | /api/roles/{id}/toggle-status | PATCH | Roles.Edit |
//! | /api/roles/{id} | DELETE | Roles.Delete |

mod handler;

use axum::routing::{delete, get, patch, post, put};
use axum::{Router, middleware};

use crate::auth::permissions::{ROLES_ADD, ROLES_DELETE, ROLES_EDIT, ROLES_LIST, USERS_LIST};
use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router(state: &ServerState) -> Router<ServerState> {
    let read_routes = Router::new()
        .route("/api/roles", get(handler::list))
        .route("/api/roles/count", get(handler::count))
        .route("/api/roles/export", get(handler::export))
        .route("/api/roles/{id}", get(handler::get_by_id))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_permission(&[ROLES_LIST]),
        ));

    // User forms need the role dropdown without role management rights
    let options_routes = Router::new()
        .route("/api/roles/simple", get(handler::options))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_permission(&[USERS_LIST]),
        ));

    let add_routes = Router::new()
        .route("/api/roles", post(handler::create))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_permission(&[ROLES_ADD]),
        ));

    let edit_routes = Router::new()
        .route("/api/roles/{id}", put(handler::update))
        .route("/api/roles/{id}/toggle-status", patch(handler::toggle_status))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_permission(&[ROLES_EDIT]),
        ));

    let delete_routes = Router::new()
        .route("/api/roles/{id}", delete(handler::delete))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_permission(&[ROLES_DELETE]),
        ));

    read_routes
        .merge(options_routes)
        .merge(add_routes)
        .merge(edit_routes)
        .merge(delete_routes)
}
