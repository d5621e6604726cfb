//! `SeaORM` implementation of the `TokenService` trait.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task;
use tracing::info;

use crate::config::Config;
use crate::db::{Store, generate_token_value, hash_password};
use crate::services::MIN_PASSWORD_LENGTH;
use crate::services::notify::Dispatcher;
use crate::services::record_audit;
use crate::services::token_service::{IssuedToken, TokenError, TokenService};

/// Tokens expire one hour after issuance.
const TOKEN_TTL_MINUTES: i64 = 60;

fn timestamp(value: chrono::DateTime<chrono::Utc>) -> String {
    value.format("%Y-%m-%dT%H:%M:%S").to_string()
}

pub struct SeaOrmTokenService {
    store: Store,
    config: Arc<RwLock<Config>>,
    dispatcher: Arc<Dispatcher>,
}

impl SeaOrmTokenService {
    #[must_use]
    pub const fn new(store: Store, config: Arc<RwLock<Config>>, dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            store,
            config,
            dispatcher,
        }
    }
}

#[async_trait]
impl TokenService for SeaOrmTokenService {
    async fn issue(&self, handle: &str) -> Result<IssuedToken, TokenError> {
        let account = self
            .store
            .get_account_by_handle(handle)
            .await?
            .filter(|account| account.active)
            .ok_or(TokenError::AccountNotFound)?;

        let Some(contact) = account.contact.clone() else {
            return Err(TokenError::NoContactAddress);
        };

        let token = generate_token_value();
        let now = chrono::Utc::now();
        let expires_at = timestamp(now + chrono::Duration::minutes(TOKEN_TTL_MINUTES));

        // Invalidation of prior tokens and the insert are one transaction.
        self.store
            .issue_reset_token(account.id, &token, &expires_at, &timestamp(now))
            .await?;

        info!(handle, "Reset token issued");
        record_audit(
            &self.store,
            &account.handle,
            "reset_token_issued",
            &account.handle,
            "ok",
            None,
        )
        .await;

        let notifications = self.config.read().await.notifications.clone();
        self.dispatcher
            .reset_token_issued(&notifications, &contact, &token);

        Ok(IssuedToken { token, expires_at })
    }

    async fn redeem(&self, token: &str, new_password: &str) -> Result<(), TokenError> {
        if new_password.len() < MIN_PASSWORD_LENGTH {
            return Err(TokenError::WeakPassword);
        }

        // Fast-fail before paying for the hash; the store re-checks under
        // the transaction with a compare-and-swap on the used flag.
        let now = chrono::Utc::now();
        let now_str = timestamp(now);

        let row = self
            .store
            .find_reset_token(token)
            .await?
            .ok_or(TokenError::InvalidOrExpired)?;

        if row.used || row.expires_at.as_str() <= now_str.as_str() {
            return Err(TokenError::InvalidOrExpired);
        }

        let security = self.config.read().await.security.clone();
        let password = new_password.to_string();
        let new_hash = task::spawn_blocking(move || hash_password(&password, &security))
            .await
            .map_err(|e| TokenError::Internal(format!("Password hashing task panicked: {e}")))??;

        let redeemed = self
            .store
            .redeem_reset_token(token, &now_str, new_hash)
            .await?;

        if !redeemed {
            return Err(TokenError::InvalidOrExpired);
        }

        let account = self.store.get_account_by_id(row.account_id).await?;
        let handle = account.as_ref().map_or("unknown", |a| a.handle.as_str());
        info!(handle, "Password reset via token");
        record_audit(&self.store, handle, "token_redeemed", handle, "ok", None).await;

        Ok(())
    }
}
