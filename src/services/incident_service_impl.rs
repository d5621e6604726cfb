//! `SeaORM` implementation of the `IncidentService` trait.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use crate::config::Config;
use crate::db::{NewIncidentRow, Store};
use crate::models::account::Account;
use crate::models::incident::{
    IncidentFilter, IncidentQuery, IncidentRecord, IncidentType, NewIncident, SortDirection,
    SortField,
};
use crate::services::incident_service::{IncidentError, IncidentService};
use crate::services::notify::Dispatcher;
use crate::services::record_audit;

const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Accepts the HTML `datetime-local` shape with or without seconds, and
/// the space-separated equivalent; normalizes to `DATETIME_FORMAT`.
fn parse_incident_datetime(value: &str) -> Option<String> {
    const ACCEPTED: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ];

    ACCEPTED
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|parsed| parsed.format(DATETIME_FORMAT).to_string())
}

fn opt(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub struct SeaOrmIncidentService {
    store: Store,
    config: Arc<RwLock<Config>>,
    dispatcher: Arc<Dispatcher>,
}

impl SeaOrmIncidentService {
    #[must_use]
    pub const fn new(store: Store, config: Arc<RwLock<Config>>, dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            store,
            config,
            dispatcher,
        }
    }

    fn validate(submission: &NewIncident) -> Result<(String, String), IncidentError> {
        let mut problems: Vec<String> = Vec::new();

        for (field, value) in [
            ("incident_datetime", &submission.incident_datetime),
            ("location", &submission.location),
            ("incident_description", &submission.incident_description),
            ("persons_involved", &submission.persons_involved),
        ] {
            if value.trim().is_empty() {
                problems.push(format!("{field} is required"));
            }
        }

        let incident_type = IncidentType::parse(&submission.incident_type);
        if incident_type.is_none() {
            problems.push(format!(
                "incident_type must be one of: {}",
                IncidentType::ALL
                    .map(IncidentType::label)
                    .join(", ")
            ));
        }

        let mut incident_datetime = String::new();
        if !submission.incident_datetime.trim().is_empty() {
            match parse_incident_datetime(submission.incident_datetime.trim()) {
                Some(normalized) => incident_datetime = normalized,
                None => problems.push("incident_datetime has an invalid date/time format".to_string()),
            }
        }

        if !problems.is_empty() {
            return Err(IncidentError::Validation(problems.join("; ")));
        }

        // parse() succeeded above; re-derive the canonical label
        let incident_type = incident_type
            .map(IncidentType::label)
            .unwrap_or_default()
            .to_string();

        Ok((incident_type, incident_datetime))
    }
}

#[async_trait]
impl IncidentService for SeaOrmIncidentService {
    async fn submit(&self, submission: NewIncident) -> Result<IncidentRecord, IncidentError> {
        let (incident_type, incident_datetime) = Self::validate(&submission)?;

        let reporter_name = {
            let trimmed = submission.reporter_name.trim();
            if trimmed.is_empty() {
                "Anonymous".to_string()
            } else {
                trimmed.to_string()
            }
        };

        // A contact address is only persisted when the submitter did not
        // ask for anonymity; it may still carry the confirmation message.
        let contact = opt(submission.reporter_email.clone());
        let stored_email = if submission.anonymous {
            None
        } else {
            contact.clone()
        };

        let submitted_at = chrono::Utc::now().format(DATETIME_FORMAT).to_string();

        let record = self
            .store
            .add_incident(NewIncidentRow {
                reporter_name,
                reporter_job_title: opt(submission.reporter_job_title),
                reporter_email: stored_email,
                reporter_phone: opt(submission.reporter_phone),
                incident_type,
                incident_datetime,
                location: submission.location.trim().to_string(),
                incident_description: submission.incident_description.trim().to_string(),
                persons_involved: submission.persons_involved.trim().to_string(),
                threats_weapons: opt(submission.threats_weapons),
                medical_treatment: opt(submission.medical_treatment),
                law_enforcement: opt(submission.law_enforcement),
                law_enforcement_report_id: opt(submission.law_enforcement_report_id),
                security_intervention: opt(submission.security_intervention),
                incident_response: opt(submission.incident_response),
                contributing_factors: opt(submission.contributing_factors),
                submitted_at,
            })
            .await?;

        info!(
            id = record.id,
            location = %record.location,
            reporter = %record.reporter_name,
            "New incident reported"
        );

        let notifications = self.config.read().await.notifications.clone();
        self.dispatcher
            .incident_submitted(&notifications, &record, contact.as_deref());

        Ok(record)
    }

    async fn get(&self, id: i32) -> Result<IncidentRecord, IncidentError> {
        self.store
            .get_incident(id)
            .await?
            .ok_or(IncidentError::NotFound)
    }

    async fn query(&self, query: IncidentQuery) -> Result<Vec<IncidentRecord>, IncidentError> {
        let search = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        let from = match query.start_date.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => {
                let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
                    IncidentError::Validation(format!("start_date '{raw}' is not a valid date"))
                })?;
                Some(format!("{date}T00:00:00"))
            }
            None => None,
        };

        let to = match query.end_date.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => {
                let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
                    IncidentError::Validation(format!("end_date '{raw}' is not a valid date"))
                })?;
                // Inclusive of the entire end day
                Some(format!("{date}T23:59:59"))
            }
            None => None,
        };

        let sort = match query.sort_by.as_deref() {
            None | Some("") => SortField::default(),
            Some(raw) => SortField::parse(raw).ok_or_else(|| {
                IncidentError::Validation(format!("'{raw}' is not a sortable field"))
            })?,
        };

        let direction = match query.sort_order.as_deref() {
            None | Some("") => SortDirection::default(),
            Some(raw) => SortDirection::parse(raw).ok_or_else(|| {
                IncidentError::Validation(format!("sort_order must be 'asc' or 'desc', got '{raw}'"))
            })?,
        };

        let records = self
            .store
            .query_incidents(&IncidentFilter {
                search,
                from,
                to,
                sort,
                direction,
            })
            .await?;

        Ok(records)
    }

    async fn update_corrective_actions(
        &self,
        actor: &Account,
        id: i32,
        text: &str,
    ) -> Result<IncidentRecord, IncidentError> {
        let text = opt(text.to_string());

        let record = self
            .store
            .update_corrective_actions(id, text)
            .await?
            .ok_or(IncidentError::NotFound)?;

        info!(actor = %actor.handle, id, "Corrective actions updated");
        record_audit(
            &self.store,
            &actor.handle,
            "corrective_actions_updated",
            &format!("incident:{id}"),
            "ok",
            None,
        )
        .await;

        let notifications = self.config.read().await.notifications.clone();
        self.dispatcher
            .corrective_actions_updated(&notifications, &record);

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_incident_datetime_accepts_html_form_shape() {
        assert_eq!(
            parse_incident_datetime("2024-01-05T14:30").as_deref(),
            Some("2024-01-05T14:30:00")
        );
        assert_eq!(
            parse_incident_datetime("2024-01-05 14:30:15").as_deref(),
            Some("2024-01-05T14:30:15")
        );
    }

    #[test]
    fn test_parse_incident_datetime_rejects_garbage() {
        assert_eq!(parse_incident_datetime("yesterday"), None);
        assert_eq!(parse_incident_datetime("2024-13-40T99:99"), None);
        assert_eq!(parse_incident_datetime(""), None);
    }

    #[test]
    fn test_validate_names_every_missing_field() {
        let err = SeaOrmIncidentService::validate(&NewIncident::default()).unwrap_err();
        let IncidentError::Validation(message) = err else {
            panic!("expected validation error");
        };

        for field in [
            "incident_datetime",
            "location",
            "incident_description",
            "persons_involved",
            "incident_type",
        ] {
            assert!(message.contains(field), "missing '{field}' in: {message}");
        }
    }

    #[test]
    fn test_validate_accepts_complete_submission() {
        let submission = NewIncident {
            incident_type: "Type 2 – Customer / Client / Patient".to_string(),
            incident_datetime: "2024-01-05T14:30".to_string(),
            location: "Warehouse B".to_string(),
            incident_description: "slip and fall".to_string(),
            persons_involved: "J. Doe".to_string(),
            ..Default::default()
        };

        let (incident_type, incident_datetime) =
            SeaOrmIncidentService::validate(&submission).unwrap();
        assert_eq!(incident_type, "Type 2 – Customer / Client / Patient");
        assert_eq!(incident_datetime, "2024-01-05T14:30:00");
    }
}
