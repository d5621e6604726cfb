use vigil::config::{Config, SecurityConfig};
use vigil::db::{generate_token_value, hash_password};
use vigil::models::account::{Account, Role};
use vigil::services::{AccountService, TokenError, TokenService};
use vigil::state::SharedState;

async fn test_state() -> SharedState {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    config.general.max_db_connections = 1;
    config.general.min_db_connections = 1;

    SharedState::new(config).await.expect("Failed to build state")
}

async fn seed_account(state: &SharedState, handle: &str, contact: Option<&str>) -> Account {
    let created = state
        .accounts
        .bootstrap_account(handle, contact, Role::IncidentManager)
        .await
        .expect("Failed to seed account");

    state
        .accounts
        .change_password(handle, &created.temporary_password, "settled-pw")
        .await
        .expect("Failed to settle password");

    created.account
}

#[tokio::test]
async fn test_redeem_is_single_use() {
    let state = test_state().await;
    seed_account(&state, "jsmith", Some("jsmith@example.com")).await;

    let issued = state.tokens.issue("jsmith").await.unwrap();

    state.tokens.redeem(&issued.token, "first-new-pw").await.unwrap();

    // The very same token value a second time
    assert!(matches!(
        state.tokens.redeem(&issued.token, "second-new-pw").await,
        Err(TokenError::InvalidOrExpired)
    ));

    // Only the first redemption took effect
    assert!(state.accounts.authenticate("jsmith", "first-new-pw").await.is_ok());
    assert!(state.accounts.authenticate("jsmith", "second-new-pw").await.is_err());
}

#[tokio::test]
async fn test_reissue_invalidates_prior_tokens() {
    let state = test_state().await;
    seed_account(&state, "jsmith", Some("jsmith@example.com")).await;

    let first = state.tokens.issue("jsmith").await.unwrap();
    let second = state.tokens.issue("jsmith").await.unwrap();
    assert_ne!(first.token, second.token);

    assert!(matches!(
        state.tokens.redeem(&first.token, "via-old-token").await,
        Err(TokenError::InvalidOrExpired)
    ));

    state.tokens.redeem(&second.token, "via-new-token").await.unwrap();
    assert!(state.accounts.authenticate("jsmith", "via-new-token").await.is_ok());
}

#[tokio::test]
async fn test_redeem_clears_forced_change_and_replaces_password() {
    let state = test_state().await;
    let account = seed_account(&state, "jsmith", Some("jsmith@example.com")).await;

    // Put the account back into the must-change state first
    let admin = state
        .accounts
        .bootstrap_account("admin", None, Role::PrimaryAdmin)
        .await
        .unwrap();
    state
        .accounts
        .change_password("admin", &admin.temporary_password, "admin-pw")
        .await
        .unwrap();
    let admin = state.accounts.get("admin").await.unwrap();
    state
        .accounts
        .admin_set_password(&admin, account.id, "interim-pw")
        .await
        .unwrap();

    let issued = state.tokens.issue("jsmith").await.unwrap();
    state.tokens.redeem(&issued.token, "recovered-pw").await.unwrap();

    let login = state.accounts.authenticate("jsmith", "recovered-pw").await.unwrap();
    assert!(!login.password_change_required);

    assert!(state.accounts.authenticate("jsmith", "interim-pw").await.is_err());
}

#[tokio::test]
async fn test_token_expiry_boundary() {
    let state = test_state().await;
    let account = seed_account(&state, "jsmith", Some("jsmith@example.com")).await;

    let token = generate_token_value();
    let expires_at = "2024-01-05T12:00:00";
    state
        .store
        .issue_reset_token(account.id, &token, expires_at, "2024-01-05T11:00:00")
        .await
        .unwrap();

    let hash = hash_password("recovered-pw", &SecurityConfig::default()).unwrap();

    // Exactly at expiry: rejected
    let redeemed = state
        .store
        .redeem_reset_token(&token, "2024-01-05T12:00:00", hash.clone())
        .await
        .unwrap();
    assert!(!redeemed);

    // After expiry: rejected
    let redeemed = state
        .store
        .redeem_reset_token(&token, "2024-01-05T12:00:01", hash.clone())
        .await
        .unwrap();
    assert!(!redeemed);

    // One second before expiry: accepted
    let redeemed = state
        .store
        .redeem_reset_token(&token, "2024-01-05T11:59:59", hash)
        .await
        .unwrap();
    assert!(redeemed);
}

#[tokio::test]
async fn test_issue_requires_contact_address() {
    let state = test_state().await;
    seed_account(&state, "no-contact", None).await;

    assert!(matches!(
        state.tokens.issue("no-contact").await,
        Err(TokenError::NoContactAddress)
    ));

    assert!(matches!(
        state.tokens.issue("nobody").await,
        Err(TokenError::AccountNotFound)
    ));
}

#[tokio::test]
async fn test_redeem_rejects_short_password_without_consuming_token() {
    let state = test_state().await;
    seed_account(&state, "jsmith", Some("jsmith@example.com")).await;

    let issued = state.tokens.issue("jsmith").await.unwrap();

    assert!(matches!(
        state.tokens.redeem(&issued.token, "abc").await,
        Err(TokenError::WeakPassword)
    ));

    // The failed attempt left the token usable
    state.tokens.redeem(&issued.token, "long-enough").await.unwrap();
}

#[tokio::test]
async fn test_redeem_unknown_token() {
    let state = test_state().await;
    seed_account(&state, "jsmith", Some("jsmith@example.com")).await;

    assert!(matches!(
        state.tokens.redeem("not-a-token", "whatever-pw").await,
        Err(TokenError::InvalidOrExpired)
    ));
}
