use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_sessions::Session;

use super::auth::require;
use super::{ApiError, ApiResponse, AppState};
use crate::models::account::Account;
use crate::services::{AccountService, Capability};

#[derive(Deserialize)]
pub struct CreateAccountRequest {
    pub handle: String,
    pub contact: Option<String>,
    pub role: String,
}

/// The temporary password is visible exactly once, in this response.
#[derive(Serialize)]
pub struct CreatedAccountResponse {
    pub account: Account,
    pub temporary_password: String,
}

#[derive(Deserialize)]
pub struct ChangeRoleRequest {
    pub role: String,
}

#[derive(Deserialize)]
pub struct SetPasswordRequest {
    pub new_password: String,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// GET /users
pub async fn list_accounts(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<ApiResponse<Vec<Account>>>, ApiError> {
    require(&state, &session, Capability::ManageUsers).await?;

    let accounts = state.accounts().list().await?;

    Ok(Json(ApiResponse::success(accounts)))
}

/// POST /users
pub async fn create_account(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<CreateAccountRequest>,
) -> Result<Json<ApiResponse<CreatedAccountResponse>>, ApiError> {
    let actor = require(&state, &session, Capability::ManageUsers).await?;

    let created = state
        .accounts()
        .create_account(
            &actor,
            &payload.handle,
            payload.contact.as_deref(),
            &payload.role,
        )
        .await?;

    Ok(Json(ApiResponse::success(CreatedAccountResponse {
        account: created.account,
        temporary_password: created.temporary_password,
    })))
}

/// POST /users/{id}/toggle
pub async fn toggle_account(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Account>>, ApiError> {
    let actor = require(&state, &session, Capability::ManageUsers).await?;

    let account = state.accounts().toggle_active(&actor, id).await?;

    Ok(Json(ApiResponse::success(account)))
}

/// PUT /users/{id}/role
pub async fn change_role(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<i32>,
    Json(payload): Json<ChangeRoleRequest>,
) -> Result<Json<ApiResponse<Account>>, ApiError> {
    let actor = require(&state, &session, Capability::ManageUsers).await?;

    let account = state.accounts().change_role(&actor, id, &payload.role).await?;

    Ok(Json(ApiResponse::success(account)))
}

/// PUT /users/{id}/password
///
/// Administrative reset for another account; an administrator changes
/// their own password through the self-service endpoint instead.
pub async fn set_password(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<i32>,
    Json(payload): Json<SetPasswordRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let actor = require(&state, &session, Capability::ManageUsers).await?;

    state
        .accounts()
        .admin_set_password(&actor, id, &payload.new_password)
        .await?;

    Ok(Json(ApiResponse::success(MessageResponse {
        message: "Password changed successfully".to_string(),
    })))
}

/// DELETE /users/{id}
pub async fn delete_account(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let actor = require(&state, &session, Capability::ManageUsers).await?;

    state.accounts().delete(&actor, id).await?;

    Ok(Json(ApiResponse::success(MessageResponse {
        message: "Account deleted successfully".to_string(),
    })))
}
