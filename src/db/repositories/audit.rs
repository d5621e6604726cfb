use crate::entities::{audit_log, prelude::*};
use anyhow::Result;
use sea_orm::{DatabaseConnection, EntityTrait, QueryOrder, QuerySelect, Set};

pub struct AuditRepository {
    conn: DatabaseConnection,
}

impl AuditRepository {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn add(
        &self,
        actor: &str,
        action: &str,
        target: &str,
        outcome: &str,
        detail: Option<String>,
    ) -> Result<()> {
        let now = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S").to_string();

        let active_model = audit_log::ActiveModel {
            actor: Set(actor.to_string()),
            action: Set(action.to_string()),
            target: Set(target.to_string()),
            outcome: Set(outcome.to_string()),
            detail: Set(detail),
            created_at: Set(now),
            ..Default::default()
        };

        AuditLog::insert(active_model).exec(&self.conn).await?;
        Ok(())
    }

    pub async fn recent(&self, limit: u64) -> Result<Vec<audit_log::Model>> {
        let rows = AuditLog::find()
            .order_by_desc(audit_log::Column::Id)
            .limit(limit)
            .all(&self.conn)
            .await?;

        Ok(rows)
    }
}
