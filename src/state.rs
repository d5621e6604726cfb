use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::Config;
use crate::db::Store;
use crate::models::account::Role;
use crate::services::{
    AccountService, CreatedAccount, Dispatcher, IncidentService, LogNotifier, Notifier,
    SeaOrmAccountService, SeaOrmIncidentService, SeaOrmTokenService, TokenService,
};

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<RwLock<Config>>,

    pub store: Store,

    pub accounts: Arc<dyn AccountService>,

    pub tokens: Arc<dyn TokenService>,

    pub incidents: Arc<dyn IncidentService>,

    pub dispatcher: Arc<Dispatcher>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        Self::with_notifier(config, Arc::new(LogNotifier)).await
    }

    /// Build the state with a custom delivery seam (used by deployments
    /// that wire a real transport, and by tests).
    pub async fn with_notifier(
        config: Config,
        notifier: Arc<dyn Notifier>,
    ) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let config = Arc::new(RwLock::new(config));
        let dispatcher = Arc::new(Dispatcher::new(notifier));

        let accounts: Arc<dyn AccountService> = Arc::new(SeaOrmAccountService::new(
            store.clone(),
            config.clone(),
            dispatcher.clone(),
        ));
        let tokens: Arc<dyn TokenService> = Arc::new(SeaOrmTokenService::new(
            store.clone(),
            config.clone(),
            dispatcher.clone(),
        ));
        let incidents: Arc<dyn IncidentService> = Arc::new(SeaOrmIncidentService::new(
            store.clone(),
            config.clone(),
            dispatcher.clone(),
        ));

        Ok(Self {
            config,
            store,
            accounts,
            tokens,
            incidents,
            dispatcher,
        })
    }

    /// Seed the first `PrimaryAdmin` account when the store is empty.
    ///
    /// Returns the created account (with its one-time temporary password)
    /// so the caller can surface it; `None` when accounts already exist.
    pub async fn ensure_bootstrap_admin(&self) -> anyhow::Result<Option<CreatedAccount>> {
        if self.store.count_accounts().await? > 0 {
            return Ok(None);
        }

        let created = self
            .accounts
            .bootstrap_account("admin", None, Role::PrimaryAdmin)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to seed admin account: {e}"))?;

        Ok(Some(created))
    }
}
