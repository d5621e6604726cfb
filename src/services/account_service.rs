//! Domain service for accounts and credentials.
//!
//! Handles login, the credential lifecycle (temporary passwords, forced
//! password change) and administrative account management.

use serde::Serialize;
use thiserror::Error;

use crate::models::account::{Account, Role};

/// Shortest password the service accepts, everywhere a password is set.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Errors specific to account operations.
#[derive(Debug, Error)]
pub enum AccountError {
    /// Deliberately covers unknown handle, wrong password and deactivated
    /// account alike, so callers cannot probe which accounts exist.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account not found")]
    NotFound,

    #[error("Handle is already registered")]
    DuplicateHandle,

    #[error("Contact address is already registered")]
    DuplicateContact,

    #[error("Unknown role: {0}")]
    InvalidRole(String),

    #[error("Password must be at least {MIN_PASSWORD_LENGTH} characters")]
    WeakPassword,

    #[error("Accounts cannot perform this operation on themselves")]
    SelfModificationForbidden,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AccountError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AccountError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Outcome of a successful login.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResult {
    pub account: Account,

    /// When set, the caller must route to the mandatory password-change
    /// flow; every capability is denied until the change happens.
    pub password_change_required: bool,
}

/// A freshly created account together with its one-time-visible temporary
/// password.
#[derive(Debug, Clone)]
pub struct CreatedAccount {
    pub account: Account,
    pub temporary_password: String,
}

/// Domain service trait for accounts.
#[async_trait::async_trait]
pub trait AccountService: Send + Sync {
    /// Verifies credentials. Succeeds only for active accounts whose
    /// password matches the stored hash.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::InvalidCredentials`] on any failure.
    async fn authenticate(&self, handle: &str, password: &str)
    -> Result<LoginResult, AccountError>;

    /// Creates an account with a generated temporary password and the
    /// forced-password-change status set.
    async fn create_account(
        &self,
        actor: &Account,
        handle: &str,
        contact: Option<&str>,
        role: &str,
    ) -> Result<CreatedAccount, AccountError>;

    /// Same as [`create_account`](Self::create_account) but without an
    /// acting administrator; used by startup seeding and the CLI.
    async fn bootstrap_account(
        &self,
        handle: &str,
        contact: Option<&str>,
        role: Role,
    ) -> Result<CreatedAccount, AccountError>;

    async fn get(&self, handle: &str) -> Result<Account, AccountError>;

    async fn list(&self) -> Result<Vec<Account>, AccountError>;

    /// Self-service password change; the one operation reachable while the
    /// account is in the must-change state. Clears that state on success.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::Validation`] if the current password is
    /// wrong, [`AccountError::WeakPassword`] if the new one is too short.
    async fn change_password(
        &self,
        handle: &str,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AccountError>;

    /// Administrative password reset for another account. Puts the target
    /// back into the must-change state.
    async fn admin_set_password(
        &self,
        actor: &Account,
        target_id: i32,
        new_password: &str,
    ) -> Result<(), AccountError>;

    async fn toggle_active(&self, actor: &Account, target_id: i32)
    -> Result<Account, AccountError>;

    async fn change_role(
        &self,
        actor: &Account,
        target_id: i32,
        role: &str,
    ) -> Result<Account, AccountError>;

    async fn delete(&self, actor: &Account, target_id: i32) -> Result<(), AccountError>;
}
