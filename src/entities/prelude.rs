pub use super::accounts::Entity as Accounts;
pub use super::audit_log::Entity as AuditLog;
pub use super::incidents::Entity as Incidents;
pub use super::reset_tokens::Entity as ResetTokens;
