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
                    .create_table_from_entity(ResetTokens)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // Issuing a token invalidates all prior unused tokens for the
        // account, so lookups by account_id happen on every issue.
        manager
            .create_index(
                Index::create()
                    .name("idx_reset_tokens_account_id")
                    .table(ResetTokens)
                    .col(crate::entities::reset_tokens::Column::AccountId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ResetTokens).to_owned())
            .await
    }
}
