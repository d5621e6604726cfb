use anyhow::{Context, Result};
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::entities::{incidents, prelude::*};
use crate::models::incident::{IncidentFilter, IncidentRecord, SortDirection, SortField};

/// Every free-text column the dashboard search runs over.
const SEARCH_COLUMNS: [incidents::Column; 13] = [
    incidents::Column::ReporterName,
    incidents::Column::ReporterJobTitle,
    incidents::Column::Location,
    incidents::Column::IncidentDescription,
    incidents::Column::PersonsInvolved,
    incidents::Column::ThreatsWeapons,
    incidents::Column::MedicalTreatment,
    incidents::Column::LawEnforcement,
    incidents::Column::LawEnforcementReportId,
    incidents::Column::SecurityIntervention,
    incidents::Column::IncidentResponse,
    incidents::Column::ContributingFactors,
    incidents::Column::CorrectiveActions,
];

const fn sort_column(field: SortField) -> incidents::Column {
    match field {
        SortField::Id => incidents::Column::Id,
        SortField::ReporterName => incidents::Column::ReporterName,
        SortField::IncidentType => incidents::Column::IncidentType,
        SortField::IncidentDatetime => incidents::Column::IncidentDatetime,
        SortField::Location => incidents::Column::Location,
        SortField::SubmittedAt => incidents::Column::SubmittedAt,
    }
}

fn map_model(model: incidents::Model) -> IncidentRecord {
    IncidentRecord {
        id: model.id,
        reporter_name: model.reporter_name,
        reporter_job_title: model.reporter_job_title,
        reporter_email: model.reporter_email,
        reporter_phone: model.reporter_phone,
        incident_type: model.incident_type,
        incident_datetime: model.incident_datetime,
        location: model.location,
        incident_description: model.incident_description,
        persons_involved: model.persons_involved,
        threats_weapons: model.threats_weapons,
        medical_treatment: model.medical_treatment,
        law_enforcement: model.law_enforcement,
        law_enforcement_report_id: model.law_enforcement_report_id,
        security_intervention: model.security_intervention,
        incident_response: model.incident_response,
        contributing_factors: model.contributing_factors,
        corrective_actions: model.corrective_actions,
        submitted_at: model.submitted_at,
    }
}

/// Validated incident fields ready for persistence.
#[derive(Debug, Clone)]
pub struct NewIncidentRow {
    pub reporter_name: String,
    pub reporter_job_title: Option<String>,
    pub reporter_email: Option<String>,
    pub reporter_phone: Option<String>,
    pub incident_type: String,
    pub incident_datetime: String,
    pub location: String,
    pub incident_description: String,
    pub persons_involved: String,
    pub threats_weapons: Option<String>,
    pub medical_treatment: Option<String>,
    pub law_enforcement: Option<String>,
    pub law_enforcement_report_id: Option<String>,
    pub security_intervention: Option<String>,
    pub incident_response: Option<String>,
    pub contributing_factors: Option<String>,
    pub submitted_at: String,
}

pub struct IncidentRepository {
    conn: DatabaseConnection,
}

impl IncidentRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn insert(&self, row: NewIncidentRow) -> Result<IncidentRecord> {
        let active_model = incidents::ActiveModel {
            reporter_name: Set(row.reporter_name),
            reporter_job_title: Set(row.reporter_job_title),
            reporter_email: Set(row.reporter_email),
            reporter_phone: Set(row.reporter_phone),
            incident_type: Set(row.incident_type),
            incident_datetime: Set(row.incident_datetime),
            location: Set(row.location),
            incident_description: Set(row.incident_description),
            persons_involved: Set(row.persons_involved),
            threats_weapons: Set(row.threats_weapons),
            medical_treatment: Set(row.medical_treatment),
            law_enforcement: Set(row.law_enforcement),
            law_enforcement_report_id: Set(row.law_enforcement_report_id),
            security_intervention: Set(row.security_intervention),
            incident_response: Set(row.incident_response),
            contributing_factors: Set(row.contributing_factors),
            corrective_actions: Set(None),
            submitted_at: Set(row.submitted_at),
            ..Default::default()
        };

        let model = active_model
            .insert(&self.conn)
            .await
            .context("Failed to insert incident")?;

        Ok(map_model(model))
    }

    pub async fn get(&self, id: i32) -> Result<Option<IncidentRecord>> {
        let model = Incidents::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query incident by ID")?;

        Ok(model.map(map_model))
    }

    /// Run the dashboard query: OR-combined case-insensitive substring match
    /// over every free-text column, inclusive date bounds on the incident
    /// timestamp, ordered by an allow-listed column.
    pub async fn query(&self, filter: &IncidentFilter) -> Result<Vec<IncidentRecord>> {
        let mut query = Incidents::find();

        if let Some(search) = &filter.search {
            let pattern = format!("%{}%", search.to_lowercase());
            let mut condition = Condition::any();
            for column in SEARCH_COLUMNS {
                condition = condition
                    .add(Expr::expr(Func::lower(Expr::col(column))).like(pattern.as_str()));
            }
            query = query.filter(condition);
        }

        if let Some(from) = &filter.from {
            query = query.filter(incidents::Column::IncidentDatetime.gte(from.as_str()));
        }

        if let Some(to) = &filter.to {
            query = query.filter(incidents::Column::IncidentDatetime.lte(to.as_str()));
        }

        let column = sort_column(filter.sort);
        query = match filter.direction {
            SortDirection::Asc => query.order_by_asc(column),
            SortDirection::Desc => query.order_by_desc(column),
        };

        let rows = query
            .all(&self.conn)
            .await
            .context("Failed to query incidents")?;

        Ok(rows.into_iter().map(map_model).collect())
    }

    /// Overwrite the corrective-actions text. Every other column is
    /// immutable after submission.
    pub async fn update_corrective_actions(
        &self,
        id: i32,
        text: Option<String>,
    ) -> Result<Option<IncidentRecord>> {
        let Some(model) = Incidents::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query incident for corrective-actions update")?
        else {
            return Ok(None);
        };

        let mut active: incidents::ActiveModel = model.into();
        active.corrective_actions = Set(text);
        let updated = active.update(&self.conn).await?;

        Ok(Some(map_model(updated)))
    }
}
