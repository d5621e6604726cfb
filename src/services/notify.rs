//! Outbound notification dispatch.
//!
//! The dispatcher decides *whether* to notify and *with what content*;
//! delivery is behind the [`Notifier`] seam and belongs to the surrounding
//! deployment. Dispatch is fire-and-forget: a failed send is logged and
//! never rolls back the data mutation that triggered it.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::NotificationConfig;
use crate::models::incident::IncidentRecord;

/// A rendered message ready for delivery.
#[derive(Debug, Clone)]
pub struct Message {
    pub recipients: Vec<String>,
    pub subject: String,
    pub body: String,
}

/// Delivery seam. Takes (recipients, subject, body); no return contract
/// beyond success/failure.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, from: &str, message: &Message) -> anyhow::Result<()>;
}

/// Default notifier: records the send in the log and delivers nothing.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, from: &str, message: &Message) -> anyhow::Result<()> {
        info!(
            from,
            recipients = ?message.recipients,
            subject = %message.subject,
            "Notification dispatched"
        );
        Ok(())
    }
}

pub struct Dispatcher {
    notifier: Arc<dyn Notifier>,
}

impl Dispatcher {
    #[must_use]
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier }
    }

    /// Spawn the send so the calling request never waits on delivery.
    fn dispatch(&self, config: &NotificationConfig, message: Message) {
        if !config.enabled || message.recipients.is_empty() {
            return;
        }

        let notifier = self.notifier.clone();
        let from = config.from_address.clone();
        tokio::spawn(async move {
            if let Err(e) = notifier.send(&from, &message).await {
                warn!(error = %e, subject = %message.subject, "Notification delivery failed");
            }
        });
    }

    pub fn incident_submitted(
        &self,
        config: &NotificationConfig,
        incident: &IncidentRecord,
        confirmation_address: Option<&str>,
    ) {
        self.dispatch(
            config,
            incident_message(&config.incident_recipients, incident),
        );

        if let Some(address) = confirmation_address {
            self.dispatch(config, confirmation_message(address, incident));
        }
    }

    pub fn corrective_actions_updated(&self, config: &NotificationConfig, incident: &IncidentRecord) {
        self.dispatch(
            config,
            corrective_actions_message(&config.incident_recipients, incident),
        );
    }

    pub fn reset_token_issued(&self, config: &NotificationConfig, contact: &str, token: &str) {
        self.dispatch(config, reset_message(&config.public_url, contact, token));
    }

    pub fn account_created(
        &self,
        config: &NotificationConfig,
        contact: &str,
        handle: &str,
        temporary_password: &str,
    ) {
        self.dispatch(
            config,
            account_created_message(contact, handle, temporary_password),
        );
    }
}

fn incident_message(recipients: &[String], incident: &IncidentRecord) -> Message {
    Message {
        recipients: recipients.to_vec(),
        subject: format!("New incident report #{}", incident.id),
        body: format!(
            "A new incident report has been submitted.\n\n\
             Type: {}\nDate/time: {}\nLocation: {}\nReported by: {}\n\n{}",
            incident.incident_type,
            incident.incident_datetime,
            incident.location,
            incident.reporter_name,
            incident.incident_description,
        ),
    }
}

fn confirmation_message(address: &str, incident: &IncidentRecord) -> Message {
    Message {
        recipients: vec![address.to_string()],
        subject: format!("Incident report #{} received", incident.id),
        body: format!(
            "Your incident report has been received and assigned reference #{}.\n\
             Location: {}\nDate/time: {}",
            incident.id, incident.location, incident.incident_datetime,
        ),
    }
}

fn corrective_actions_message(recipients: &[String], incident: &IncidentRecord) -> Message {
    Message {
        recipients: recipients.to_vec(),
        subject: format!("Corrective actions updated for incident #{}", incident.id),
        body: format!(
            "Corrective actions for incident #{} ({}) were updated:\n\n{}",
            incident.id,
            incident.location,
            incident.corrective_actions.as_deref().unwrap_or("(cleared)"),
        ),
    }
}

fn reset_message(public_url: &str, contact: &str, token: &str) -> Message {
    Message {
        recipients: vec![contact.to_string()],
        subject: "Password reset requested".to_string(),
        body: format!(
            "A password reset was requested for your account.\n\n\
             Reset link: {public_url}/reset?token={token}\n\n\
             The link is valid for one hour and can be used once. If you did\n\
             not request this, you can ignore this message.",
        ),
    }
}

fn account_created_message(contact: &str, handle: &str, temporary_password: &str) -> Message {
    Message {
        recipients: vec![contact.to_string()],
        subject: "Your administrator account".to_string(),
        body: format!(
            "An administrator account has been created for you.\n\n\
             Handle: {handle}\nTemporary password: {temporary_password}\n\n\
             You will be asked to choose a new password on first login.",
        ),
    }
}
