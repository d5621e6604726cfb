use sea_orm_migration::prelude::*;

mod m20250301_initial;
mod m20250308_add_accounts;
mod m20250315_add_reset_tokens;
mod m20250322_add_audit_log;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_initial::Migration),
            Box::new(m20250308_add_accounts::Migration),
            Box::new(m20250315_add_reset_tokens::Migration),
            Box::new(m20250322_add_audit_log::Migration),
        ]
    }
}
