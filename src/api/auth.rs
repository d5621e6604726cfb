use axum::{
    Json,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_sessions::Session;

use super::{ApiError, ApiResponse, AppState};
use crate::models::account::{Account, Role};
use crate::services::{
    AccountService, Capability, TokenError, TokenService, require_capability,
};

const SESSION_ACCOUNT_KEY: &str = "account";

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Deserialize)]
pub struct LoginRequest {
    pub handle: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub handle: String,
    pub role: Role,
    /// The client must route to the password-change flow before anything
    /// else when set; every other endpoint answers 403 until then.
    pub password_change_required: bool,
}

#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Deserialize)]
pub struct ForgotPasswordRequest {
    pub handle: String,
}

#[derive(Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub new_password: String,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

// ============================================================================
// Middleware & helpers
// ============================================================================

/// Session gate for the protected router. Capability checks happen per
/// handler; this only rejects requests with no authenticated session.
pub async fn auth_middleware(
    session: Session,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if let Ok(Some(handle)) = session.get::<String>(SESSION_ACCOUNT_KEY).await {
        tracing::Span::current().record("user_id", &handle);
        return Ok(next.run(request).await);
    }

    Ok((StatusCode::UNAUTHORIZED, "Unauthorized").into_response())
}

/// Load the session's account, re-checking that it still exists and is
/// active; a session does not outlive deactivation or deletion.
pub async fn current_account(
    state: &Arc<AppState>,
    session: &Session,
) -> Result<Account, ApiError> {
    let handle = session
        .get::<String>(SESSION_ACCOUNT_KEY)
        .await
        .map_err(|e| ApiError::internal(format!("Session error: {e}")))?
        .ok_or_else(|| ApiError::Unauthorized("Not logged in".to_string()))?;

    let account = state
        .accounts()
        .get(&handle)
        .await
        .map_err(|_| ApiError::Unauthorized("Account no longer available".to_string()))?;

    if !account.active {
        return Err(ApiError::Unauthorized("Account is deactivated".to_string()));
    }

    Ok(account)
}

/// Capability gate: resolves the acting account and denies before the
/// handler performs any side effect.
pub async fn require(
    state: &Arc<AppState>,
    session: &Session,
    capability: Capability,
) -> Result<Account, ApiError> {
    let account = current_account(state, session).await?;
    require_capability(&account, capability)?;
    Ok(account)
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    if payload.handle.is_empty() {
        return Err(ApiError::validation("Handle is required"));
    }
    if payload.password.is_empty() {
        return Err(ApiError::validation("Password is required"));
    }

    let result = state
        .accounts()
        .authenticate(&payload.handle, &payload.password)
        .await?;

    if let Err(e) = session.insert(SESSION_ACCOUNT_KEY, &result.account.handle).await {
        return Err(ApiError::internal(format!("Failed to create session: {e}")));
    }

    Ok(Json(ApiResponse::success(LoginResponse {
        handle: result.account.handle,
        role: result.account.role,
        password_change_required: result.password_change_required,
    })))
}

/// POST /auth/logout
pub async fn logout(session: Session) -> impl IntoResponse {
    let _ = session.flush().await;
    (StatusCode::OK, "Logged out")
}

/// GET /auth/me
pub async fn get_current_account(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<ApiResponse<Account>>, ApiError> {
    let account = current_account(&state, &session).await?;
    Ok(Json(ApiResponse::success(account)))
}

/// PUT /auth/password
///
/// Self-service change. Deliberately not behind the capability gate: this
/// is the one operation an account in the must-change state may perform.
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let account = current_account(&state, &session).await?;

    state
        .accounts()
        .change_password(
            &account.handle,
            &payload.current_password,
            &payload.new_password,
        )
        .await?;

    Ok(Json(ApiResponse::success(MessageResponse {
        message: "Password updated successfully".to_string(),
    })))
}

/// POST /auth/forgot
///
/// Always answers the same way, whether or not the handle maps to an
/// account with a contact address on file.
pub async fn forgot_password(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    match state.tokens().issue(payload.handle.trim()).await {
        Ok(_) => {}
        Err(TokenError::AccountNotFound | TokenError::NoContactAddress) => {
            tracing::debug!(handle = %payload.handle, "Recovery requested for unusable account");
        }
        Err(e) => return Err(e.into()),
    }

    Ok(Json(ApiResponse::success(MessageResponse {
        message: "If the account exists and has a contact address, a reset message has been sent"
            .to_string(),
    })))
}

/// POST /auth/reset
pub async fn reset_password(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state
        .tokens()
        .redeem(payload.token.trim(), &payload.new_password)
        .await?;

    Ok(Json(ApiResponse::success(MessageResponse {
        message: "Password has been reset".to_string(),
    })))
}
