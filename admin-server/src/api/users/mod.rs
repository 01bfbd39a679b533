//! User API Module
//!
//! | 路径 | 方法 | 权限 |
//! |------|------|------|
//! | /api/users | GET | Users.List |
//! | /api/users/count | GET | Users.List |
//! | /api/users/export | GET | Users.List |
//! | /api/users/is-email-available | GET | Users.List |
//! | /api/users/{id} | GET | Users.List |
//! | /api/users | POST | Users.Add |
//! | /api/users/{id} | PUT | Users.Edit |
//! | /api/users/{id}/toggle | PATCH | Users.Edit |
//! | /api/users/{id}/change-password | POST | Users.Edit |
//! | /api/users/{id} | DELETE | Users.Delete |

mod handler;

use axum::routing::{delete, get, patch, post, put};
use axum::{Router, middleware};

use crate::auth::permissions::{USERS_ADD, USERS_DELETE, USERS_EDIT, USERS_LIST};
use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router(state: &ServerState) -> Router<ServerState> {
    let read_routes = Router::new()
        .route("/api/users", get(handler::list))
        .route("/api/users/count", get(handler::count))
        .route("/api/users/export", get(handler::export))
        .route("/api/users/is-email-available", get(handler::is_email_available))
        .route("/api/users/{id}", get(handler::get_by_id))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_permission(&[USERS_LIST]),
        ));

    let add_routes = Router::new()
        .route("/api/users", post(handler::create))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_permission(&[USERS_ADD]),
        ));

    let edit_routes = Router::new()
        .route("/api/users/{id}", put(handler::update))
        .route("/api/users/{id}/toggle", patch(handler::toggle_status))
        .route("/api/users/{id}/change-password", post(handler::change_password))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_permission(&[USERS_EDIT]),
        ));

    let delete_routes = Router::new()
        .route("/api/users/{id}", delete(handler::delete))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_permission(&[USERS_DELETE]),
        ));

    read_routes
        .merge(add_routes)
        .merge(edit_routes)
        .merge(delete_routes)
}
