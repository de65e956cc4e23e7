//! Slack incoming webhook

use super::{check_status, http_client, ChannelSettings};
use crate::alerts::batch::AlertBatch;
use crate::alerts::notifier::Notifier;
use crate::error::ChannelError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// `[slack]` table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlackConfig {
    /// Incoming webhook URL
    pub webhook_url: String,
}

impl ChannelSettings for SlackConfig {
    const NAME: &'static str = "slack";

    fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.webhook_url.is_empty() {
            missing.push("webhook_url");
        }
        missing
    }
}

/// Posts the batch as a single message
pub struct SlackNotifier {
    config: SlackConfig,
    client: reqwest::blocking::Client,
}

impl SlackNotifier {
    /// Create a notifier with a request timeout
    pub fn new(config: SlackConfig, timeout: Duration) -> Result<Self, ChannelError> {
        Ok(Self {
            config,
            client: http_client(timeout)?,
        })
    }

    /// JSON body for a batch
    pub fn payload(batch: &AlertBatch) -> serde_json::Value {
        serde_json::json!({ "text": batch.dump() })
    }
}

impl Notifier for SlackNotifier {
    fn notify(&self, batch: &AlertBatch) -> Result<(), ChannelError> {
        let response = self
            .client
            .post(&self.config.webhook_url)
            .json(&Self::payload(batch))
            .send()?;
        check_status(SlackConfig::NAME, response)
    }

    fn name(&self) -> &str {
        SlackConfig::NAME
    }
}
