use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Login handle. Unique and immutable after creation.
    #[sea_orm(unique)]
    pub handle: String,

    /// Optional contact address used for credential recovery.
    #[sea_orm(unique, nullable)]
    pub contact: Option<String>,

    /// Argon2id password hash (PHC string)
    pub password_hash: String,

    /// `primary_admin` or `incident_manager`
    pub role: String,

    /// `must_change_password` or `normal`
    pub status: String,

    /// Deactivated accounts cannot authenticate.
    pub active: bool,

    pub created_at: String,

    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
