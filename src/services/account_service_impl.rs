//! `SeaORM` implementation of the `AccountService` trait.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::config::Config;
use crate::db::{Store, generate_temp_password};
use crate::models::account::{Account, AccountStatus, Role};
use crate::services::account_service::{
    AccountError, AccountService, CreatedAccount, LoginResult, MIN_PASSWORD_LENGTH,
};
use crate::services::notify::Dispatcher;
use crate::services::record_audit;

pub struct SeaOrmAccountService {
    store: Store,
    config: Arc<RwLock<Config>>,
    dispatcher: Arc<Dispatcher>,
}

impl SeaOrmAccountService {
    #[must_use]
    pub const fn new(store: Store, config: Arc<RwLock<Config>>, dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            store,
            config,
            dispatcher,
        }
    }

    async fn create_internal(
        &self,
        actor: &str,
        handle: &str,
        contact: Option<&str>,
        role: Role,
    ) -> Result<CreatedAccount, AccountError> {
        let handle = handle.trim();
        if handle.is_empty() {
            return Err(AccountError::Validation("Handle is required".to_string()));
        }

        let contact = contact.map(str::trim).filter(|c| !c.is_empty());

        if self.store.get_account_by_handle(handle).await?.is_some() {
            return Err(AccountError::DuplicateHandle);
        }

        if let Some(contact) = contact {
            if self.store.contact_in_use(contact).await? {
                return Err(AccountError::DuplicateContact);
            }
        }

        let temporary_password = generate_temp_password();
        let (security, notifications) = {
            let config = self.config.read().await;
            (config.security.clone(), config.notifications.clone())
        };

        let account = self
            .store
            .insert_account(
                handle,
                contact,
                role,
                &temporary_password,
                AccountStatus::MustChangePassword,
                &security,
            )
            .await?;

        info!(actor, handle, role = role.as_str(), "Account created");
        record_audit(&self.store, actor, "account_created", handle, "ok", None).await;

        if let Some(contact) = &account.contact {
            self.dispatcher
                .account_created(&notifications, contact, handle, &temporary_password);
        }

        Ok(CreatedAccount {
            account,
            temporary_password,
        })
    }

    /// Load a mutation target, rejecting the acting account itself.
    async fn target_account(&self, actor: &Account, target_id: i32) -> Result<Account, AccountError> {
        if actor.id == target_id {
            return Err(AccountError::SelfModificationForbidden);
        }

        self.store
            .get_account_by_id(target_id)
            .await?
            .ok_or(AccountError::NotFound)
    }
}

#[async_trait]
impl AccountService for SeaOrmAccountService {
    async fn authenticate(
        &self,
        handle: &str,
        password: &str,
    ) -> Result<LoginResult, AccountError> {
        let is_valid = self.store.verify_account_password(handle, password).await?;

        if !is_valid {
            warn!(handle, "Failed login attempt");
            return Err(AccountError::InvalidCredentials);
        }

        let account = self
            .store
            .get_account_by_handle(handle)
            .await?
            .ok_or(AccountError::InvalidCredentials)?;

        if !account.active {
            warn!(handle, "Login attempt for deactivated account");
            return Err(AccountError::InvalidCredentials);
        }

        info!(handle, "Login successful");
        let password_change_required = account.must_change_password();

        Ok(LoginResult {
            account,
            password_change_required,
        })
    }

    async fn create_account(
        &self,
        actor: &Account,
        handle: &str,
        contact: Option<&str>,
        role: &str,
    ) -> Result<CreatedAccount, AccountError> {
        let role =
            Role::parse(role).ok_or_else(|| AccountError::InvalidRole(role.to_string()))?;

        self.create_internal(&actor.handle, handle, contact, role)
            .await
    }

    async fn bootstrap_account(
        &self,
        handle: &str,
        contact: Option<&str>,
        role: Role,
    ) -> Result<CreatedAccount, AccountError> {
        self.create_internal("system", handle, contact, role).await
    }

    async fn get(&self, handle: &str) -> Result<Account, AccountError> {
        self.store
            .get_account_by_handle(handle)
            .await?
            .ok_or(AccountError::NotFound)
    }

    async fn list(&self) -> Result<Vec<Account>, AccountError> {
        Ok(self.store.list_accounts().await?)
    }

    async fn change_password(
        &self,
        handle: &str,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AccountError> {
        if new_password.len() < MIN_PASSWORD_LENGTH {
            return Err(AccountError::WeakPassword);
        }

        if current_password == new_password {
            return Err(AccountError::Validation(
                "New password must be different from current password".to_string(),
            ));
        }

        let is_valid = self
            .store
            .verify_account_password(handle, current_password)
            .await?;

        if !is_valid {
            record_audit(&self.store, handle, "password_changed", handle, "denied", None).await;
            return Err(AccountError::Validation(
                "Current password is incorrect".to_string(),
            ));
        }

        let account = self
            .store
            .get_account_by_handle(handle)
            .await?
            .ok_or(AccountError::NotFound)?;

        let security = self.config.read().await.security.clone();
        self.store
            .update_account_password(account.id, new_password, AccountStatus::Normal, &security)
            .await?;

        info!(handle, "Password changed");
        record_audit(&self.store, handle, "password_changed", handle, "ok", None).await;

        Ok(())
    }

    async fn admin_set_password(
        &self,
        actor: &Account,
        target_id: i32,
        new_password: &str,
    ) -> Result<(), AccountError> {
        let target = self.target_account(actor, target_id).await?;

        if new_password.len() < MIN_PASSWORD_LENGTH {
            return Err(AccountError::WeakPassword);
        }

        let security = self.config.read().await.security.clone();
        // The target must pick its own password on next login.
        self.store
            .update_account_password(
                target.id,
                new_password,
                AccountStatus::MustChangePassword,
                &security,
            )
            .await?;

        info!(actor = %actor.handle, target = %target.handle, "Password reset by administrator");
        record_audit(
            &self.store,
            &actor.handle,
            "password_reset",
            &target.handle,
            "ok",
            None,
        )
        .await;

        Ok(())
    }

    async fn toggle_active(
        &self,
        actor: &Account,
        target_id: i32,
    ) -> Result<Account, AccountError> {
        let target = self.target_account(actor, target_id).await?;

        let updated = self.store.set_account_active(target.id, !target.active).await?;

        let action = if updated.active {
            "account_activated"
        } else {
            "account_deactivated"
        };
        info!(actor = %actor.handle, target = %target.handle, action, "Account toggled");
        record_audit(&self.store, &actor.handle, action, &target.handle, "ok", None).await;

        Ok(updated)
    }

    async fn change_role(
        &self,
        actor: &Account,
        target_id: i32,
        role: &str,
    ) -> Result<Account, AccountError> {
        let role =
            Role::parse(role).ok_or_else(|| AccountError::InvalidRole(role.to_string()))?;
        let target = self.target_account(actor, target_id).await?;

        let updated = self.store.set_account_role(target.id, role).await?;

        info!(actor = %actor.handle, target = %target.handle, role = role.as_str(), "Role changed");
        record_audit(
            &self.store,
            &actor.handle,
            "role_changed",
            &target.handle,
            "ok",
            Some(role.as_str().to_string()),
        )
        .await;

        Ok(updated)
    }

    async fn delete(&self, actor: &Account, target_id: i32) -> Result<(), AccountError> {
        let target = self.target_account(actor, target_id).await?;

        let deleted = self.store.delete_account(target.id).await?;
        if !deleted {
            return Err(AccountError::NotFound);
        }

        info!(actor = %actor.handle, target = %target.handle, "Account deleted");
        record_audit(
            &self.store,
            &actor.handle,
            "account_deleted",
            &target.handle,
            "ok",
            None,
        )
        .await;

        Ok(())
    }
}
