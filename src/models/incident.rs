use serde::{Deserialize, Serialize};

/// The four fixed incident categories.
///
/// Labels are stored verbatim (en dash included); older databases carry the
/// same strings, so parsing matches on the full label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncidentType {
    CriminalIntent,
    CustomerClientPatient,
    WorkerOnWorker,
    PersonalRelationship,
}

impl IncidentType {
    pub const ALL: [Self; 4] = [
        Self::CriminalIntent,
        Self::CustomerClientPatient,
        Self::WorkerOnWorker,
        Self::PersonalRelationship,
    ];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::CriminalIntent => "Type 1 – Criminal Intent",
            Self::CustomerClientPatient => "Type 2 – Customer / Client / Patient",
            Self::WorkerOnWorker => "Type 3 – Worker-on-Worker",
            Self::PersonalRelationship => "Type 4 – Personal Relationship",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL.into_iter().find(|t| t.label() == value)
    }
}

/// A persisted incident report.
///
/// Immutable after submission except for `corrective_actions`.
#[derive(Debug, Clone, Serialize)]
pub struct IncidentRecord {
    pub id: i32,
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
    pub corrective_actions: Option<String>,
    pub submitted_at: String,
}

/// Raw submission payload, form-shaped: every field arrives as text and is
/// trimmed/validated by the incident service.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewIncident {
    pub reporter_name: String,
    pub reporter_job_title: String,
    pub reporter_email: String,
    pub reporter_phone: String,
    /// When set, the contact address is used for the confirmation message
    /// but never persisted with the record.
    pub anonymous: bool,
    pub incident_type: String,
    pub incident_datetime: String,
    pub location: String,
    pub incident_description: String,
    pub persons_involved: String,
    pub threats_weapons: String,
    pub medical_treatment: String,
    pub law_enforcement: String,
    pub law_enforcement_report_id: String,
    pub security_intervention: String,
    pub incident_response: String,
    pub contributing_factors: String,
}

/// Sortable columns, the full allow-list. Anything else is rejected before
/// it reaches the query builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    Id,
    ReporterName,
    IncidentType,
    IncidentDatetime,
    Location,
    #[default]
    SubmittedAt,
}

impl SortField {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::ReporterName => "reporter_name",
            Self::IncidentType => "incident_type",
            Self::IncidentDatetime => "incident_datetime",
            Self::Location => "location",
            Self::SubmittedAt => "submitted_at",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "id" => Some(Self::Id),
            "reporter_name" => Some(Self::ReporterName),
            "incident_type" => Some(Self::IncidentType),
            "incident_datetime" => Some(Self::IncidentDatetime),
            "location" => Some(Self::Location),
            "submitted_at" => Some(Self::SubmittedAt),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }
}

/// Raw query parameters as received from the caller.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct IncidentQuery {
    pub search: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

/// Validated filter handed to the repository.
#[derive(Debug, Clone, Default)]
pub struct IncidentFilter {
    pub search: Option<String>,
    /// Inclusive lower bound on `incident_datetime` (start of day).
    pub from: Option<String>,
    /// Inclusive upper bound on `incident_datetime` (23:59:59 of that day).
    pub to: Option<String>,
    pub sort: SortField,
    pub direction: SortDirection,
}
