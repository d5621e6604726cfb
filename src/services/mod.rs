pub mod authz;
pub use authz::{AuthzError, Capability, require_capability};

pub mod notify;
pub use notify::{Dispatcher, LogNotifier, Message, Notifier};

pub mod account_service;
pub mod account_service_impl;
pub use account_service::{
    AccountError, AccountService, CreatedAccount, LoginResult, MIN_PASSWORD_LENGTH,
};
pub use account_service_impl::SeaOrmAccountService;

pub mod token_service;
pub mod token_service_impl;
pub use token_service::{IssuedToken, TokenError, TokenService};
pub use token_service_impl::SeaOrmTokenService;

pub mod incident_service;
pub mod incident_service_impl;
pub use incident_service::{IncidentError, IncidentService};
pub use incident_service_impl::SeaOrmIncidentService;

use crate::db::Store;
use tracing::warn;

/// Append an audit row. A failed write is logged and never fails the
/// calling operation.
pub(crate) async fn record_audit(
    store: &Store,
    actor: &str,
    action: &str,
    target: &str,
    outcome: &str,
    detail: Option<String>,
) {
    if let Err(e) = store.add_audit(actor, action, target, outcome, detail).await {
        warn!(error = %e, action, "Failed to write audit entry");
    }
}
