use anyhow::{Context, Result};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use tokio::task;

use crate::config::SecurityConfig;
use crate::entities::accounts;
use crate::models::account::{Account, AccountStatus, Role};

fn map_model(model: accounts::Model) -> Result<Account> {
    let role = Role::parse(&model.role)
        .with_context(|| format!("Unknown role '{}' on account {}", model.role, model.id))?;
    let status = AccountStatus::parse(&model.status)
        .with_context(|| format!("Unknown status '{}' on account {}", model.status, model.id))?;

    Ok(Account {
        id: model.id,
        handle: model.handle,
        contact: model.contact,
        role,
        status,
        active: model.active,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

pub struct AccountRepository {
    conn: DatabaseConnection,
}

impl AccountRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get_by_handle(&self, handle: &str) -> Result<Option<Account>> {
        let account = accounts::Entity::find()
            .filter(accounts::Column::Handle.eq(handle))
            .one(&self.conn)
            .await
            .context("Failed to query account by handle")?;

        account.map(map_model).transpose()
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Option<Account>> {
        let account = accounts::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query account by ID")?;

        account.map(map_model).transpose()
    }

    pub async fn list(&self) -> Result<Vec<Account>> {
        let rows = accounts::Entity::find()
            .order_by_asc(accounts::Column::Handle)
            .all(&self.conn)
            .await
            .context("Failed to list accounts")?;

        rows.into_iter().map(map_model).collect()
    }

    pub async fn count(&self) -> Result<u64> {
        accounts::Entity::find()
            .count(&self.conn)
            .await
            .context("Failed to count accounts")
    }

    pub async fn contact_in_use(&self, contact: &str) -> Result<bool> {
        let existing = accounts::Entity::find()
            .filter(accounts::Column::Contact.eq(contact))
            .one(&self.conn)
            .await
            .context("Failed to query account by contact")?;

        Ok(existing.is_some())
    }

    /// Insert a new account, hashing the supplied password.
    pub async fn insert(
        &self,
        handle: &str,
        contact: Option<&str>,
        role: Role,
        password: &str,
        status: AccountStatus,
        config: &SecurityConfig,
    ) -> Result<Account> {
        let password = password.to_string();
        let config = config.clone();
        let password_hash = task::spawn_blocking(move || hash_password(&password, &config))
            .await
            .context("Password hashing task panicked")??;

        let now = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S").to_string();

        let active_model = accounts::ActiveModel {
            handle: Set(handle.to_string()),
            contact: Set(contact.map(str::to_string)),
            password_hash: Set(password_hash),
            role: Set(role.as_str().to_string()),
            status: Set(status.as_str().to_string()),
            active: Set(true),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active_model
            .insert(&self.conn)
            .await
            .context("Failed to insert account")?;

        map_model(model)
    }

    /// Verify a password against the stored hash.
    ///
    /// Returns `false` for unknown handles so callers cannot distinguish
    /// "no such account" from "wrong password".
    /// Note: uses `spawn_blocking` because Argon2 verification is
    /// CPU-intensive and would block the async runtime if run directly.
    pub async fn verify_password(&self, handle: &str, password: &str) -> Result<bool> {
        let account = accounts::Entity::find()
            .filter(accounts::Column::Handle.eq(handle))
            .one(&self.conn)
            .await
            .context("Failed to query account for password verification")?;

        let Some(account) = account else {
            return Ok(false);
        };

        let password_hash = account.password_hash;
        let password = password.to_string();

        let is_valid = task::spawn_blocking(move || {
            let parsed_hash = PasswordHash::new(&password_hash)
                .map_err(|e| anyhow::anyhow!("Invalid password hash format: {e}"))?;

            let argon2 = Argon2::default();
            Ok::<bool, anyhow::Error>(
                argon2
                    .verify_password(password.as_bytes(), &parsed_hash)
                    .is_ok(),
            )
        })
        .await
        .context("Password verification task panicked")??;

        Ok(is_valid)
    }

    /// Update an account's password and lifecycle status in one write.
    pub async fn update_password(
        &self,
        id: i32,
        new_password: &str,
        status: AccountStatus,
        config: &SecurityConfig,
    ) -> Result<()> {
        let account = accounts::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query account for password update")?
            .ok_or_else(|| anyhow::anyhow!("Account not found: {id}"))?;

        let password = new_password.to_string();
        let config = config.clone();
        let new_hash = task::spawn_blocking(move || hash_password(&password, &config))
            .await
            .context("Password hashing task panicked")??;

        let now = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S").to_string();

        let mut active: accounts::ActiveModel = account.into();
        active.password_hash = Set(new_hash);
        active.status = Set(status.as_str().to_string());
        active.updated_at = Set(now);
        active.update(&self.conn).await?;

        Ok(())
    }

    pub async fn set_active(&self, id: i32, active: bool) -> Result<Account> {
        let account = accounts::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query account for activation toggle")?
            .ok_or_else(|| anyhow::anyhow!("Account not found: {id}"))?;

        let now = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S").to_string();

        let mut model: accounts::ActiveModel = account.into();
        model.active = Set(active);
        model.updated_at = Set(now);
        let updated = model.update(&self.conn).await?;

        map_model(updated)
    }

    pub async fn set_role(&self, id: i32, role: Role) -> Result<Account> {
        let account = accounts::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query account for role change")?
            .ok_or_else(|| anyhow::anyhow!("Account not found: {id}"))?;

        let now = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S").to_string();

        let mut model: accounts::ActiveModel = account.into();
        model.role = Set(role.as_str().to_string());
        model.updated_at = Set(now);
        let updated = model.update(&self.conn).await?;

        map_model(updated)
    }

    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = accounts::Entity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete account")?;

        Ok(result.rows_affected > 0)
    }
}

/// Hash a password using Argon2id with params from the security config.
pub fn hash_password(password: &str, config: &SecurityConfig) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let params = Params::new(
        config.argon2_memory_cost_kib,
        config.argon2_time_cost,
        config.argon2_parallelism,
        None,
    )
    .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}

/// Generate a temporary password (16 alphanumeric characters)
#[must_use]
pub fn generate_temp_password() -> String {
    use rand::Rng;
    use rand::distr::Alphanumeric;

    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(16)
        .map(char::from)
        .collect()
}
