//! Email over SMTP

use super::{prefixed_title, ChannelSettings};
use crate::alerts::batch::AlertBatch;
use crate::alerts::notifier::Notifier;
use crate::error::ChannelError;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// `[email]` table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    /// SMTP relay host
    pub smtp: String,
    /// SMTP port
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    /// Sender address, also the SMTP user name
    pub from: String,
    /// SMTP password
    pub password: String,
    /// Recipients
    pub to: Vec<String>,
    /// Subject prefix
    pub subject: String,
}

impl ChannelSettings for EmailConfig {
    const NAME: &'static str = "email";

    fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.smtp.is_empty() {
            missing.push("smtp");
        }
        if self.to.is_empty() {
            missing.push("to");
        }
        if self.from.is_empty() {
            missing.push("from");
        }
        if self.password.is_empty() {
            missing.push("password");
        }
        if self.port.is_none() {
            missing.push("port");
        }
        if self.subject.is_empty() {
            missing.push("subject");
        }
        missing
    }
}

/// Mails the batch to every recipient
pub struct EmailNotifier {
    config: EmailConfig,
    transport: SmtpTransport,
}

impl EmailNotifier {
    /// Create a notifier with an SMTP session timeout
    pub fn new(config: EmailConfig, timeout: Duration) -> Result<Self, ChannelError> {
        let mut builder = SmtpTransport::starttls_relay(&config.smtp)
            .map_err(|e| ChannelError::Smtp(e.to_string()))?
            .credentials(Credentials::new(
                config.from.clone(),
                config.password.clone(),
            ))
            .timeout(Some(timeout));
        if let Some(port) = config.port {
            builder = builder.port(port);
        }

        Ok(Self {
            transport: builder.build(),
            config,
        })
    }

    /// Subject line for a batch
    pub fn subject(&self, batch: &AlertBatch) -> String {
        prefixed_title(&self.config.subject, &batch.titles())
    }

    /// Build the message for a batch
    pub fn build_message(&self, batch: &AlertBatch) -> Result<Message, ChannelError> {
        let from: Mailbox = parse_mailbox(&self.config.from)?;
        let mut builder = Message::builder().from(from).subject(self.subject(batch));
        for to in &self.config.to {
            builder = builder.to(parse_mailbox(to)?);
        }

        builder
            .body(batch.dump_email())
            .map_err(|e| ChannelError::Address(e.to_string()))
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, ChannelError> {
    address
        .parse()
        .map_err(|e| ChannelError::Address(format!("{}: {}", address, e)))
}

impl Notifier for EmailNotifier {
    fn notify(&self, batch: &AlertBatch) -> Result<(), ChannelError> {
        let message = self.build_message(batch)?;
        self.transport
            .send(&message)
            .map_err(|e| ChannelError::Smtp(e.to_string()))?;
        log::info!("alert email sent");
        Ok(())
    }

    fn name(&self) -> &str {
        EmailConfig::NAME
    }
}
