use axum::{Json, extract::State};
use serde::Serialize;
use std::sync::Arc;
use tower_sessions::Session;

use super::auth::require;
use super::{ApiError, ApiResponse, AppState};
use crate::config::NotificationConfig;
use crate::services::Capability;

#[derive(Serialize)]
pub struct StatusResponse {
    pub version: String,
    pub uptime_seconds: u64,
    pub database: String,
}

/// GET /system/status
pub async fn get_status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<StatusResponse>>, ApiError> {
    let database = match state.store().ping().await {
        Ok(()) => "ok".to_string(),
        Err(e) => {
            tracing::error!("Database ping failed: {e}");
            "error".to_string()
        }
    };

    Ok(Json(ApiResponse::success(StatusResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        database,
    })))
}

/// GET /system/notifications
pub async fn get_notifications(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<ApiResponse<NotificationConfig>>, ApiError> {
    require(&state, &session, Capability::ManageEmailConfig).await?;

    let notifications = state.config().read().await.notifications.clone();

    Ok(Json(ApiResponse::success(notifications)))
}

/// PUT /system/notifications
///
/// The updated value is handed to the dispatcher on the next send; nothing
/// reads it ambiently mid-delivery.
pub async fn update_notifications(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<NotificationConfig>,
) -> Result<Json<ApiResponse<NotificationConfig>>, ApiError> {
    let actor = require(&state, &session, Capability::ManageEmailConfig).await?;

    let updated = {
        let mut config = state.config().write().await;

        let mut candidate = config.clone();
        candidate.notifications = payload;
        candidate
            .validate()
            .map_err(|e| ApiError::validation(e.to_string()))?;

        *config = candidate;
        if let Err(e) = config.save() {
            tracing::warn!("Failed to persist config: {e}");
        }

        config.notifications.clone()
    };

    tracing::info!(actor = %actor.handle, "Notification settings updated");
    if let Err(e) = state
        .store()
        .add_audit(&actor.handle, "notifications_updated", "config", "ok", None)
        .await
    {
        tracing::warn!(error = %e, "Failed to write audit entry");
    }

    Ok(Json(ApiResponse::success(updated)))
}
