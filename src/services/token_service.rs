//! Domain service for password-reset tokens.

use thiserror::Error;

/// Errors specific to the token ledger.
///
/// `NoContactAddress` and `AccountNotFound` exist for callers inside the
/// trust boundary (logging, CLI); the public recovery endpoint collapses
/// both into the same non-committal response so account existence never
/// leaks.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Invalid or expired token")]
    InvalidOrExpired,

    #[error("No contact address on file")]
    NoContactAddress,

    #[error("Account not found")]
    AccountNotFound,

    #[error("Password must be at least {} characters", crate::services::MIN_PASSWORD_LENGTH)]
    WeakPassword,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for TokenError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for TokenError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// A freshly issued token, returned for delivery to the account's contact
/// address. The value is never persisted in the clear anywhere else.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: String,
}

/// Domain service trait for credential recovery.
#[async_trait::async_trait]
pub trait TokenService: Send + Sync {
    /// Issues a reset token for the account, invalidating every unused
    /// token previously issued to it.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::NoContactAddress`] when the account has no
    /// contact address on file.
    async fn issue(&self, handle: &str) -> Result<IssuedToken, TokenError>;

    /// Redeems a token: sets the owning account's password and consumes
    /// the token in one atomic unit.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::InvalidOrExpired`] for unknown, used or
    /// expired tokens.
    async fn redeem(&self, token: &str, new_password: &str) -> Result<(), TokenError>;
}
