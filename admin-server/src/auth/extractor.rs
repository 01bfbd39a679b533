//! Request extractors
//!
//! [`CurrentUser`] is placed in the request extensions by
//! [`crate::auth::require_auth`], [`AccessContext`] by the permission gate.
//! Handlers take them as plain arguments.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::AppError;
use crate::auth::{AccessContext, CurrentUser};

impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(AppError::unauthorized)
    }
}

/// Only available behind `require_permission`; elsewhere the handler was
/// mounted without a gate, which is a routing bug and answers 403.
impl<S: Send + Sync> FromRequestParts<S> for AccessContext {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<AccessContext>() {
            Some(access) => Ok(access.clone()),
            None => {
                tracing::error!(uri = %parts.uri, "Handler reached without permission gate");
                Err(AppError::forbidden())
            }
        }
    }
}
