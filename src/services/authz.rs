//! Capability-based authorization gate.
//!
//! All role policy lives in one lookup table consulted by one gate
//! function, so the policy is testable on its own and routes cannot drift
//! apart in what they check.

use thiserror::Error;

use crate::models::account::{Account, AccountStatus, Role};

/// A named administrative permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    ManageUsers,
    ManageEmailConfig,
    ManageIncidents,
    ViewDashboard,
}

impl Capability {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ManageUsers => "manage_users",
            Self::ManageEmailConfig => "manage_email_config",
            Self::ManageIncidents => "manage_incidents",
            Self::ViewDashboard => "view_dashboard",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthzError {
    /// The account must change its password before anything else.
    #[error("Password change required")]
    PasswordChangeRequired,

    #[error("Missing capability: {}", .0.as_str())]
    MissingCapability(Capability),
}

/// The full capability grant for a role.
#[must_use]
pub const fn capabilities(role: Role) -> &'static [Capability] {
    match role {
        Role::PrimaryAdmin => &[
            Capability::ManageUsers,
            Capability::ManageEmailConfig,
            Capability::ManageIncidents,
            Capability::ViewDashboard,
        ],
        Role::IncidentManager => &[Capability::ManageIncidents, Capability::ViewDashboard],
    }
}

#[must_use]
pub fn role_grants(role: Role, capability: Capability) -> bool {
    capabilities(role).contains(&capability)
}

/// Allow/deny decision for an authenticated account.
///
/// Callers must run this before any side effect of the requested operation.
/// An account that still has to change its password is denied every
/// capability regardless of role; the self-service password change is the
/// only reachable operation in that state.
pub fn require_capability(account: &Account, capability: Capability) -> Result<(), AuthzError> {
    if account.status == AccountStatus::MustChangePassword {
        return Err(AuthzError::PasswordChangeRequired);
    }

    if !role_grants(account.role, capability) {
        return Err(AuthzError::MissingCapability(capability));
    }

    Ok(())
}
