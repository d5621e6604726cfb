use serde::{Deserialize, Serialize};

/// Administrative role attached to an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    PrimaryAdmin,
    IncidentManager,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PrimaryAdmin => "primary_admin",
            Self::IncidentManager => "incident_manager",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "primary_admin" => Some(Self::PrimaryAdmin),
            "incident_manager" => Some(Self::IncidentManager),
            _ => None,
        }
    }
}

/// Account lifecycle state, orthogonal to role.
///
/// An account in `MustChangePassword` is denied every capability until it
/// changes its own password.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    MustChangePassword,
    Normal,
}

impl AccountStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MustChangePassword => "must_change_password",
            Self::Normal => "normal",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "must_change_password" => Some(Self::MustChangePassword),
            "normal" => Some(Self::Normal),
            _ => None,
        }
    }
}

/// Account data returned from the store (never carries the password hash).
#[derive(Debug, Clone, Serialize)]
pub struct Account {
    pub id: i32,
    pub handle: String,
    pub contact: Option<String>,
    pub role: Role,
    pub status: AccountStatus,
    pub active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl Account {
    #[must_use]
    pub const fn must_change_password(&self) -> bool {
        matches!(self.status, AccountStatus::MustChangePassword)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        for role in [Role::PrimaryAdmin, Role::IncidentManager] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("superuser"), None);
        assert_eq!(Role::parse(""), None);
    }

    #[test]
    fn test_status_round_trip() {
        for status in [AccountStatus::MustChangePassword, AccountStatus::Normal] {
            assert_eq!(AccountStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(AccountStatus::parse("locked"), None);
    }
}
