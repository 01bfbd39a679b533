//! Authorization gate
//!
//! One decision per guarded request, always derived from storage:
//!
//! 1. the token subject must be an existing, active user
//! 2. the user's current role names are read from the identity store
//! 3. the resolver computes the permission union for those roles
//! 4. access is granted when any declared permission is in the union
//!
//! Token claims never take part in the decision.

use std::collections::BTreeSet;

use shared::error::{AppError, ErrorCode};

use super::{IdentityStore, PermissionCatalog, resolver};
use crate::db::repository::RepoError;

/// Live roles and permissions of the caller, attached to the request on allow
#[derive(Debug, Clone)]
pub struct AccessContext {
    pub user_id: i64,
    pub roles: BTreeSet<String>,
    pub permissions: BTreeSet<String>,
}

impl AccessContext {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }
}

/// Why a request was denied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// Subject does not exist (deleted after the token was issued)
    UnknownSubject,
    /// Subject exists but is deactivated
    InactiveSubject,
    /// Subject has no role
    NoRole,
    /// None of the declared permissions is granted
    MissingPermission,
}

impl DenyReason {
    pub const fn as_str(&self) -> &'static str {
        match self {
            DenyReason::UnknownSubject => "unknown_subject",
            DenyReason::InactiveSubject => "inactive_subject",
            DenyReason::NoRole => "no_role",
            DenyReason::MissingPermission => "missing_permission",
        }
    }

    /// Client-facing error: 401 for identity problems, generic 403 otherwise
    pub fn to_error(self) -> AppError {
        match self {
            DenyReason::UnknownSubject => AppError::unauthorized(),
            DenyReason::InactiveSubject => AppError::new(ErrorCode::AccountDisabled),
            DenyReason::NoRole | DenyReason::MissingPermission => AppError::forbidden(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Decision {
    Allow(AccessContext),
    Deny(DenyReason),
}

/// Decide whether `user_id` holds at least one of `required`
///
/// An empty `required` list can never be satisfied. Storage errors are
/// returned as errors so the caller answers 500 instead of allowing or
/// silently denying.
pub async fn authorize(
    identity: &dyn IdentityStore,
    catalog: &dyn PermissionCatalog,
    user_id: i64,
    required: &[&str],
) -> Result<Decision, RepoError> {
    let Some(user) = identity.find_user_by_id(user_id).await? else {
        return Ok(Decision::Deny(DenyReason::UnknownSubject));
    };
    if !user.is_active {
        return Ok(Decision::Deny(DenyReason::InactiveSubject));
    }

    let roles: BTreeSet<String> = identity
        .get_roles_for_user(&user)
        .await?
        .into_iter()
        .collect();
    if roles.is_empty() {
        return Ok(Decision::Deny(DenyReason::NoRole));
    }

    let permissions = resolver::resolve(catalog, &roles).await?;
    if !required.iter().any(|p| permissions.contains(*p)) {
        return Ok(Decision::Deny(DenyReason::MissingPermission));
    }

    Ok(Decision::Allow(AccessContext {
        user_id,
        roles,
        permissions,
    }))
}
