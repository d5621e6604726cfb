//! Create-admin command handler

use crate::config::Config;
use crate::models::account::Role;
use crate::services::AccountService;
use crate::state::SharedState;

pub async fn cmd_create_admin(
    config: &Config,
    handle: &str,
    contact: Option<&str>,
    role: &str,
) -> anyhow::Result<()> {
    let Some(role) = Role::parse(role) else {
        println!("Unknown role: {role}");
        println!("Valid roles: primary_admin, incident_manager");
        return Ok(());
    };

    let state = SharedState::new(config.clone()).await?;

    let created = state
        .accounts
        .bootstrap_account(handle, contact, role)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create account: {e}"))?;

    println!("Account '{}' created ({})", created.account.handle, role.as_str());
    println!("Temporary password: {}", created.temporary_password);
    println!();
    println!("A new password must be chosen on first login.");

    Ok(())
}
