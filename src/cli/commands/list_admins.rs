//! List-admins command handler

use crate::config::Config;
use crate::db::Store;

pub async fn cmd_list_admins(config: &Config) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;
    let accounts = store.list_accounts().await?;

    if accounts.is_empty() {
        println!("No accounts yet.");
        println!();
        println!("Create one with: vigil create-admin <handle>");
        return Ok(());
    }

    println!("Administrator accounts ({} total)", accounts.len());
    println!("{:-<60}", "");

    for account in accounts {
        let state = if !account.active {
            "deactivated"
        } else if account.must_change_password() {
            "password change pending"
        } else {
            "active"
        };

        println!(
            "{} [{}] - {}",
            account.handle,
            account.role.as_str(),
            state
        );
        if let Some(contact) = &account.contact {
            println!("  Contact: {contact}");
        }
    }

    Ok(())
}
