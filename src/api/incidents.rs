use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_sessions::Session;

use super::auth::require;
use super::{ApiError, ApiResponse, AppState};
use crate::models::incident::{IncidentQuery, IncidentRecord, NewIncident};
use crate::services::{Capability, IncidentService};

#[derive(Serialize)]
pub struct SubmitResponse {
    pub id: i32,
    pub message: String,
}

#[derive(Serialize)]
pub struct IncidentListResponse {
    pub incidents: Vec<IncidentRecord>,
}

#[derive(Deserialize)]
pub struct CorrectiveActionsRequest {
    pub corrective_actions: String,
}

/// POST /incidents
///
/// The one unauthenticated endpoint: anyone can file a report.
pub async fn submit_incident(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NewIncident>,
) -> Result<Json<ApiResponse<SubmitResponse>>, ApiError> {
    let record = state.incidents().submit(payload).await?;

    Ok(Json(ApiResponse::success(SubmitResponse {
        id: record.id,
        message: "Incident report submitted successfully".to_string(),
    })))
}

/// GET /incidents
pub async fn list_incidents(
    State(state): State<Arc<AppState>>,
    session: Session,
    Query(query): Query<IncidentQuery>,
) -> Result<Json<ApiResponse<IncidentListResponse>>, ApiError> {
    require(&state, &session, Capability::ViewDashboard).await?;

    let incidents = state.incidents().query(query).await?;

    Ok(Json(ApiResponse::success(IncidentListResponse {
        incidents,
    })))
}

/// GET /incidents/{id}
pub async fn get_incident(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<IncidentRecord>>, ApiError> {
    require(&state, &session, Capability::ViewDashboard).await?;

    let record = state.incidents().get(id).await?;

    Ok(Json(ApiResponse::success(record)))
}

/// PUT /incidents/{id}/corrective-actions
pub async fn update_corrective_actions(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<i32>,
    Json(payload): Json<CorrectiveActionsRequest>,
) -> Result<Json<ApiResponse<IncidentRecord>>, ApiError> {
    let actor = require(&state, &session, Capability::ManageIncidents).await?;

    let record = state
        .incidents()
        .update_corrective_actions(&actor, id, &payload.corrective_actions)
        .await?;

    Ok(Json(ApiResponse::success(record)))
}
