use crate::entities::prelude::*;
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Schema;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let schema = Schema::new(backend);

        manager
            .create_table(
                schema
                    .create_table_from_entity(Incidents)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // The dashboard filters and sorts on these two columns
        manager
            .create_index(
                Index::create()
                    .name("idx_incidents_incident_datetime")
                    .table(Incidents)
                    .col(crate::entities::incidents::Column::IncidentDatetime)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_incidents_submitted_at")
                    .table(Incidents)
                    .col(crate::entities::incidents::Column::SubmittedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Incidents).to_owned())
            .await
    }
}
