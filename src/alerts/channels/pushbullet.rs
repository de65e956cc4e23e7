//! Pushbullet pushes API

use super::{check_status, http_client, prefixed_title, ChannelSettings};
use crate::alerts::batch::AlertBatch;
use crate::alerts::notifier::Notifier;
use crate::error::ChannelError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Public pushes endpoint
pub const PUSHBULLET_API_URL: &str = "https://api.pushbullet.com/v2/pushes";

/// `[pushbullet]` table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PushbulletConfig {
    /// Account access token
    pub access_token: String,
    /// Prefix for the push title
    pub title: String,
    /// Endpoint override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
}

impl PushbulletConfig {
    /// Endpoint to post to
    pub fn api_url(&self) -> &str {
        self.api_url.as_deref().unwrap_or(PUSHBULLET_API_URL)
    }
}

impl ChannelSettings for PushbulletConfig {
    const NAME: &'static str = "pushbullet";

    fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.access_token.is_empty() {
            missing.push("access_token");
        }
        if self.title.is_empty() {
            missing.push("title");
        }
        missing
    }
}

/// Sends the batch as a note push
pub struct PushbulletNotifier {
    config: PushbulletConfig,
    client: reqwest::blocking::Client,
}

impl PushbulletNotifier {
    /// Create a notifier with a request timeout
    pub fn new(config: PushbulletConfig, timeout: Duration) -> Result<Self, ChannelError> {
        Ok(Self {
            config,
            client: http_client(timeout)?,
        })
    }

    /// JSON body for a batch
    pub fn payload(&self, batch: &AlertBatch) -> serde_json::Value {
        serde_json::json!({
            "body": batch.messages(),
            "title": prefixed_title(&self.config.title, &batch.titles()),
            "type": "note",
        })
    }
}

impl Notifier for PushbulletNotifier {
    fn notify(&self, batch: &AlertBatch) -> Result<(), ChannelError> {
        let response = self
            .client
            .post(self.config.api_url())
            .header("Access-Token", &self.config.access_token)
            .json(&self.payload(batch))
            .send()?;
        check_status(PushbulletConfig::NAME, response)
    }

    fn name(&self) -> &str {
        PushbulletConfig::NAME
    }
}
