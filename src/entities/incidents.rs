use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "incidents")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub reporter_name: String,

    #[sea_orm(nullable)]
    pub reporter_job_title: Option<String>,

    /// Only stored when the submitter did not request anonymity.
    #[sea_orm(nullable)]
    pub reporter_email: Option<String>,

    #[sea_orm(nullable)]
    pub reporter_phone: Option<String>,

    /// One of the four fixed incident-type labels.
    pub incident_type: String,

    /// ISO-8601 (`YYYY-MM-DDTHH:MM:SS`), lexicographically orderable.
    pub incident_datetime: String,

    pub location: String,

    #[sea_orm(column_type = "Text")]
    pub incident_description: String,

    #[sea_orm(column_type = "Text")]
    pub persons_involved: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub threats_weapons: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub medical_treatment: Option<String>,

    /// Legacy combined free text; newer records use the structured pair below.
    #[sea_orm(column_type = "Text", nullable)]
    pub law_enforcement: Option<String>,

    #[sea_orm(nullable)]
    pub law_enforcement_report_id: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub security_intervention: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub incident_response: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub contributing_factors: Option<String>,

    /// The only field mutable after submission.
    #[sea_orm(column_type = "Text", nullable)]
    pub corrective_actions: Option<String>,

    /// Server-assigned, immutable.
    pub submitted_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
