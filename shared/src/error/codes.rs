//! Unified error codes for the admin backend
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Role errors
//! - 4xxx: User errors
//! - 5xxx: Content errors (CMS pages, email templates)
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values so the admin frontend can
/// switch on them without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (email/password)
    InvalidCredentials = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,
    /// Account is disabled
    AccountDisabled = 1007,
    /// Email confirmation or password reset link is invalid or expired
    AccountLinkInvalid = 1008,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Only a SuperAdmin may assign the SuperAdmin role
    SuperAdminRequired = 2003,

    // ==================== 3xxx: Role ====================
    /// Role not found
    RoleNotFound = 3001,
    /// Role name already exists
    RoleNameExists = 3002,
    /// Role is still assigned to users
    RoleInUse = 3003,
    /// Role is protected and cannot be modified
    RoleIsProtected = 3004,
    /// Role must carry at least one permission
    RolePermissionsRequired = 3005,
    /// Permission name is not in the catalog
    UnknownPermission = 3006,

    // ==================== 4xxx: User ====================
    /// User not found
    UserNotFound = 4001,
    /// Email already registered
    UserEmailExists = 4002,
    /// Users cannot delete or deactivate themselves
    UserCannotModifySelf = 4003,
    /// Current password does not match
    UserPasswordIncorrect = 4004,

    // ==================== 5xxx: Content ====================
    /// CMS page not found
    CmsNotFound = 5001,
    /// CMS key already exists
    CmsKeyExists = 5002,
    /// Email template not found
    EmailTemplateNotFound = 5101,
    /// Email template key already exists
    EmailTemplateKeyExists = 5102,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Configuration error
    ConfigError = 9005,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::InvalidCredentials => "Invalid username or password",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",
            ErrorCode::AccountDisabled => "Account is disabled",
            ErrorCode::AccountLinkInvalid => "Invalid or expired link",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::SuperAdminRequired => "Only a SuperAdmin can assign the SuperAdmin role",

            // Role
            ErrorCode::RoleNotFound => "Role not found",
            ErrorCode::RoleNameExists => "Role name already exists",
            ErrorCode::RoleInUse => "Role is assigned to users",
            ErrorCode::RoleIsProtected => "Protected roles cannot be modified",
            ErrorCode::RolePermissionsRequired => "At least one permission is required",
            ErrorCode::UnknownPermission => "Unknown permission",

            // User
            ErrorCode::UserNotFound => "User not found",
            ErrorCode::UserEmailExists => "A user with this email already exists",
            ErrorCode::UserCannotModifySelf => "You cannot delete or deactivate your own account",
            ErrorCode::UserPasswordIncorrect => "Current password is incorrect",

            // Content
            ErrorCode::CmsNotFound => "CMS page not found",
            ErrorCode::CmsKeyExists => "A CMS page with this key already exists",
            ErrorCode::EmailTemplateNotFound => "Email template not found",
            ErrorCode::EmailTemplateKeyExists => "An email template with this key already exists",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::ConfigError => "Configuration error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),
            1007 => Ok(ErrorCode::AccountDisabled),
            1008 => Ok(ErrorCode::AccountLinkInvalid),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2003 => Ok(ErrorCode::SuperAdminRequired),

            // Role
            3001 => Ok(ErrorCode::RoleNotFound),
            3002 => Ok(ErrorCode::RoleNameExists),
            3003 => Ok(ErrorCode::RoleInUse),
            3004 => Ok(ErrorCode::RoleIsProtected),
            3005 => Ok(ErrorCode::RolePermissionsRequired),
            3006 => Ok(ErrorCode::UnknownPermission),

            // User
            4001 => Ok(ErrorCode::UserNotFound),
            4002 => Ok(ErrorCode::UserEmailExists),
            4003 => Ok(ErrorCode::UserCannotModifySelf),
            4004 => Ok(ErrorCode::UserPasswordIncorrect),

            // Content
            5001 => Ok(ErrorCode::CmsNotFound),
            5002 => Ok(ErrorCode::CmsKeyExists),
            5101 => Ok(ErrorCode::EmailTemplateNotFound),
            5102 => Ok(ErrorCode::EmailTemplateKeyExists),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9005 => Ok(ErrorCode::ConfigError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
