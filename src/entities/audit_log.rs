use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "audit_log")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Handle of the acting account, or `system` for bootstrap actions.
    pub actor: String,

    pub action: String,

    pub target: String,

    /// `ok`, `denied` or `error`
    pub outcome: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub detail: Option<String>,

    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
