//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            // Success
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::NotFound
            | Self::RoleNotFound
            | Self::UserNotFound
            | Self::CmsNotFound
            | Self::EmailTemplateNotFound => StatusCode::NOT_FOUND,

            // 409 Conflict
            Self::AlreadyExists
            | Self::RoleNameExists
            | Self::RoleInUse
            | Self::UserEmailExists
            | Self::CmsKeyExists
            | Self::EmailTemplateKeyExists => StatusCode::CONFLICT,

            // 401 Unauthorized
            Self::NotAuthenticated
            | Self::InvalidCredentials
            | Self::TokenExpired
            | Self::TokenInvalid
            | Self::AccountDisabled => StatusCode::UNAUTHORIZED,

            // 403 Forbidden
            Self::PermissionDenied
            | Self::SuperAdminRequired
            | Self::RoleIsProtected
            | Self::UserCannotModifySelf
            | Self::UserPasswordIncorrect => StatusCode::FORBIDDEN,

            // 500 Internal Server Error
            Self::Unknown
            | Self::InternalError
            | Self::DatabaseError
            | Self::ConfigError => StatusCode::INTERNAL_SERVER_ERROR,

            // 400 Bad Request (default for validation/business errors)
            Self::ValidationFailed
            | Self::InvalidRequest
            | Self::AccountLinkInvalid
            | Self::RolePermissionsRequired
            | Self::UnknownPermission => StatusCode::BAD_REQUEST,
        }
    }
}
