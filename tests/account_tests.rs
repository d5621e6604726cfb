use vigil::config::Config;
use vigil::models::account::{Account, Role};
use vigil::services::{AccountError, AccountService};
use vigil::state::SharedState;

async fn test_state() -> SharedState {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    config.general.max_db_connections = 1;
    config.general.min_db_connections = 1;

    SharedState::new(config).await.expect("Failed to build state")
}

/// Seed a PrimaryAdmin with a known password, past the forced-change state.
async fn seed_admin(state: &SharedState) -> Account {
    let created = state
        .accounts
        .bootstrap_account("admin", Some("admin@example.com"), Role::PrimaryAdmin)
        .await
        .expect("Failed to seed admin");

    state
        .accounts
        .change_password("admin", &created.temporary_password, "hunter42")
        .await
        .expect("Failed to set admin password");

    state.accounts.get("admin").await.expect("Admin missing")
}

#[tokio::test]
async fn test_authenticate_success_and_failure() {
    let state = test_state().await;
    seed_admin(&state).await;

    let result = state.accounts.authenticate("admin", "hunter42").await.unwrap();
    assert_eq!(result.account.handle, "admin");
    assert!(!result.password_change_required);

    assert!(matches!(
        state.accounts.authenticate("admin", "wrong-password").await,
        Err(AccountError::InvalidCredentials)
    ));

    // Unknown handle yields the exact same error as a wrong password
    assert!(matches!(
        state.accounts.authenticate("nobody", "hunter42").await,
        Err(AccountError::InvalidCredentials)
    ));
}

#[tokio::test]
async fn test_deactivated_account_never_authenticates() {
    let state = test_state().await;
    let admin = seed_admin(&state).await;

    let created = state
        .accounts
        .create_account(&admin, "jsmith", Some("jsmith@example.com"), "incident_manager")
        .await
        .unwrap();

    state
        .accounts
        .toggle_active(&admin, created.account.id)
        .await
        .unwrap();

    // Correct temporary password, deactivated account
    assert!(matches!(
        state
            .accounts
            .authenticate("jsmith", &created.temporary_password)
            .await,
        Err(AccountError::InvalidCredentials)
    ));

    // Reactivation restores access
    state
        .accounts
        .toggle_active(&admin, created.account.id)
        .await
        .unwrap();
    assert!(
        state
            .accounts
            .authenticate("jsmith", &created.temporary_password)
            .await
            .is_ok()
    );
}

#[tokio::test]
async fn test_temporary_password_forces_change() {
    let state = test_state().await;
    let admin = seed_admin(&state).await;

    let created = state
        .accounts
        .create_account(&admin, "jsmith", Some("jsmith@example.com"), "incident_manager")
        .await
        .unwrap();

    let login = state
        .accounts
        .authenticate("jsmith", &created.temporary_password)
        .await
        .unwrap();
    assert!(login.password_change_required);

    state
        .accounts
        .change_password("jsmith", &created.temporary_password, "brand-new-pw")
        .await
        .unwrap();

    let login = state
        .accounts
        .authenticate("jsmith", "brand-new-pw")
        .await
        .unwrap();
    assert!(!login.password_change_required);
}

#[tokio::test]
async fn test_duplicate_handle_and_contact_rejected() {
    let state = test_state().await;
    let admin = seed_admin(&state).await;

    state
        .accounts
        .create_account(&admin, "jsmith", Some("jsmith@example.com"), "incident_manager")
        .await
        .unwrap();

    assert!(matches!(
        state
            .accounts
            .create_account(&admin, "jsmith", Some("other@example.com"), "incident_manager")
            .await,
        Err(AccountError::DuplicateHandle)
    ));

    assert!(matches!(
        state
            .accounts
            .create_account(&admin, "jsmith2", Some("jsmith@example.com"), "incident_manager")
            .await,
        Err(AccountError::DuplicateContact)
    ));
}

#[tokio::test]
async fn test_unknown_role_rejected() {
    let state = test_state().await;
    let admin = seed_admin(&state).await;

    assert!(matches!(
        state
            .accounts
            .create_account(&admin, "jsmith", None, "superuser")
            .await,
        Err(AccountError::InvalidRole(_))
    ));
}

#[tokio::test]
async fn test_short_passwords_rejected_everywhere() {
    let state = test_state().await;
    let admin = seed_admin(&state).await;

    let created = state
        .accounts
        .create_account(&admin, "jsmith", None, "incident_manager")
        .await
        .unwrap();

    assert!(matches!(
        state
            .accounts
            .change_password("jsmith", &created.temporary_password, "abc")
            .await,
        Err(AccountError::WeakPassword)
    ));

    assert!(matches!(
        state
            .accounts
            .admin_set_password(&admin, created.account.id, "abc")
            .await,
        Err(AccountError::WeakPassword)
    ));
}

#[tokio::test]
async fn test_self_modification_forbidden() {
    let state = test_state().await;
    let admin = seed_admin(&state).await;

    assert!(matches!(
        state.accounts.toggle_active(&admin, admin.id).await,
        Err(AccountError::SelfModificationForbidden)
    ));

    assert!(matches!(
        state
            .accounts
            .change_role(&admin, admin.id, "incident_manager")
            .await,
        Err(AccountError::SelfModificationForbidden)
    ));

    assert!(matches!(
        state.accounts.delete(&admin, admin.id).await,
        Err(AccountError::SelfModificationForbidden)
    ));

    assert!(matches!(
        state
            .accounts
            .admin_set_password(&admin, admin.id, "next-password")
            .await,
        Err(AccountError::SelfModificationForbidden)
    ));

    // The account is untouched after all four attempts
    let account = state.accounts.get("admin").await.unwrap();
    assert!(account.active);
    assert_eq!(account.role, Role::PrimaryAdmin);
}

#[tokio::test]
async fn test_admin_password_reset_forces_change_on_target() {
    let state = test_state().await;
    let admin = seed_admin(&state).await;

    let created = state
        .accounts
        .create_account(&admin, "jsmith", None, "incident_manager")
        .await
        .unwrap();
    state
        .accounts
        .change_password("jsmith", &created.temporary_password, "settled-pw")
        .await
        .unwrap();

    state
        .accounts
        .admin_set_password(&admin, created.account.id, "issued-by-admin")
        .await
        .unwrap();

    let login = state
        .accounts
        .authenticate("jsmith", "issued-by-admin")
        .await
        .unwrap();
    assert!(login.password_change_required);
}

#[tokio::test]
async fn test_role_change_applies() {
    let state = test_state().await;
    let admin = seed_admin(&state).await;

    let created = state
        .accounts
        .create_account(&admin, "jsmith", None, "incident_manager")
        .await
        .unwrap();

    let updated = state
        .accounts
        .change_role(&admin, created.account.id, "primary_admin")
        .await
        .unwrap();
    assert_eq!(updated.role, Role::PrimaryAdmin);
}
