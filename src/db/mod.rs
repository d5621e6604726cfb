use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::config::SecurityConfig;
use crate::models::account::{Account, AccountStatus, Role};
use crate::models::incident::{IncidentFilter, IncidentRecord};

pub mod migrator;
pub mod repositories;

pub use crate::entities::audit_log::Model as AuditEntry;
pub use crate::entities::reset_tokens::Model as ResetToken;
pub use repositories::account::{generate_temp_password, hash_password};
pub use repositories::incident::NewIncidentRow;
pub use repositories::token::generate_token_value;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn account_repo(&self) -> repositories::account::AccountRepository {
        repositories::account::AccountRepository::new(self.conn.clone())
    }

    fn token_repo(&self) -> repositories::token::TokenRepository {
        repositories::token::TokenRepository::new(self.conn.clone())
    }

    fn incident_repo(&self) -> repositories::incident::IncidentRepository {
        repositories::incident::IncidentRepository::new(self.conn.clone())
    }

    fn audit_repo(&self) -> repositories::audit::AuditRepository {
        repositories::audit::AuditRepository::new(self.conn.clone())
    }

    // ------------------------------------------------------------------
    // Accounts
    // ------------------------------------------------------------------

    pub async fn get_account_by_handle(&self, handle: &str) -> Result<Option<Account>> {
        self.account_repo().get_by_handle(handle).await
    }

    pub async fn get_account_by_id(&self, id: i32) -> Result<Option<Account>> {
        self.account_repo().get_by_id(id).await
    }

    pub async fn list_accounts(&self) -> Result<Vec<Account>> {
        self.account_repo().list().await
    }

    pub async fn count_accounts(&self) -> Result<u64> {
        self.account_repo().count().await
    }

    pub async fn contact_in_use(&self, contact: &str) -> Result<bool> {
        self.account_repo().contact_in_use(contact).await
    }

    pub async fn insert_account(
        &self,
        handle: &str,
        contact: Option<&str>,
        role: Role,
        password: &str,
        status: AccountStatus,
        config: &SecurityConfig,
    ) -> Result<Account> {
        self.account_repo()
            .insert(handle, contact, role, password, status, config)
            .await
    }

    pub async fn verify_account_password(&self, handle: &str, password: &str) -> Result<bool> {
        self.account_repo().verify_password(handle, password).await
    }

    pub async fn update_account_password(
        &self,
        id: i32,
        new_password: &str,
        status: AccountStatus,
        config: &SecurityConfig,
    ) -> Result<()> {
        self.account_repo()
            .update_password(id, new_password, status, config)
            .await
    }

    pub async fn set_account_active(&self, id: i32, active: bool) -> Result<Account> {
        self.account_repo().set_active(id, active).await
    }

    pub async fn set_account_role(&self, id: i32, role: Role) -> Result<Account> {
        self.account_repo().set_role(id, role).await
    }

    pub async fn delete_account(&self, id: i32) -> Result<bool> {
        self.account_repo().delete(id).await
    }

    // ------------------------------------------------------------------
    // Reset tokens
    // ------------------------------------------------------------------

    pub async fn issue_reset_token(
        &self,
        account_id: i32,
        token: &str,
        expires_at: &str,
        now: &str,
    ) -> Result<()> {
        self.token_repo()
            .issue(account_id, token, expires_at, now)
            .await
    }

    pub async fn find_reset_token(&self, token: &str) -> Result<Option<ResetToken>> {
        self.token_repo().find_by_value(token).await
    }

    pub async fn redeem_reset_token(
        &self,
        token: &str,
        now: &str,
        new_password_hash: String,
    ) -> Result<bool> {
        self.token_repo()
            .redeem_and_set_password(token, now, new_password_hash)
            .await
    }

    // ------------------------------------------------------------------
    // Incidents
    // ------------------------------------------------------------------

    pub async fn add_incident(&self, row: NewIncidentRow) -> Result<IncidentRecord> {
        self.incident_repo().insert(row).await
    }

    pub async fn get_incident(&self, id: i32) -> Result<Option<IncidentRecord>> {
        self.incident_repo().get(id).await
    }

    pub async fn query_incidents(&self, filter: &IncidentFilter) -> Result<Vec<IncidentRecord>> {
        self.incident_repo().query(filter).await
    }

    pub async fn update_corrective_actions(
        &self,
        id: i32,
        text: Option<String>,
    ) -> Result<Option<IncidentRecord>> {
        self.incident_repo()
            .update_corrective_actions(id, text)
            .await
    }

    // ------------------------------------------------------------------
    // Audit
    // ------------------------------------------------------------------

    pub async fn add_audit(
        &self,
        actor: &str,
        action: &str,
        target: &str,
        outcome: &str,
        detail: Option<String>,
    ) -> Result<()> {
        self.audit_repo()
            .add(actor, action, target, outcome, detail)
            .await
    }

    pub async fn recent_audit(&self, limit: u64) -> Result<Vec<AuditEntry>> {
        self.audit_repo().recent(limit).await
    }
}
