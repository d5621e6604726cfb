//! Domain service for incident reports.
//!
//! Validates submissions, runs the filtered/sorted dashboard query and
//! owns the single mutable field of a stored report.

use thiserror::Error;

use crate::models::account::Account;
use crate::models::incident::{IncidentQuery, IncidentRecord, NewIncident};

/// Errors specific to incident operations.
#[derive(Debug, Error)]
pub enum IncidentError {
    /// Names every missing or invalid field.
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Incident not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for IncidentError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for IncidentError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Domain service trait for incident reports.
#[async_trait::async_trait]
pub trait IncidentService: Send + Sync {
    /// Validates and persists a submission, assigning the server-side
    /// submission timestamp. Everything but corrective actions is
    /// immutable from here on.
    ///
    /// # Errors
    ///
    /// Returns [`IncidentError::Validation`] naming the offending fields.
    async fn submit(&self, submission: NewIncident) -> Result<IncidentRecord, IncidentError>;

    async fn get(&self, id: i32) -> Result<IncidentRecord, IncidentError>;

    /// Runs the dashboard query. An empty search string means "no filter";
    /// an unknown sort field or direction is rejected, never passed
    /// through to the query builder.
    async fn query(&self, query: IncidentQuery) -> Result<Vec<IncidentRecord>, IncidentError>;

    /// Overwrites the corrective-actions text and returns the updated
    /// record. No other attribute changes.
    async fn update_corrective_actions(
        &self,
        actor: &Account,
        id: i32,
        text: &str,
    ) -> Result<IncidentRecord, IncidentError>;
}
