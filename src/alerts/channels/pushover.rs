//! Pushover message API

use super::{check_status, http_client, ChannelSettings};
use crate::alerts::batch::AlertBatch;
use crate::alerts::notifier::Notifier;
use crate::error::ChannelError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// `[pushover]` table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PushoverConfig {
    /// Application token
    pub api_token: String,
    /// Recipient user key
    pub user_key: String,
    /// Messages endpoint, e.g. `https://api.pushover.net/1/messages.json`
    pub api_url: String,
}

impl ChannelSettings for PushoverConfig {
    const NAME: &'static str = "pushover";

    fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.api_token.is_empty() {
            missing.push("api_token");
        }
        if self.user_key.is_empty() {
            missing.push("user_key");
        }
        if self.api_url.is_empty() {
            missing.push("api_url");
        }
        missing
    }
}

/// Sends the batch as one push message
pub struct PushoverNotifier {
    config: PushoverConfig,
    client: reqwest::blocking::Client,
}

impl PushoverNotifier {
    /// Create a notifier with a request timeout
    pub fn new(config: PushoverConfig, timeout: Duration) -> Result<Self, ChannelError> {
        Ok(Self {
            config,
            client: http_client(timeout)?,
        })
    }

    /// Form fields for a batch
    pub fn form(&self, batch: &AlertBatch) -> [(&'static str, String); 3] {
        [
            ("token", self.config.api_token.clone()),
            ("user", self.config.user_key.clone()),
            ("message", batch.dump()),
        ]
    }
}

impl Notifier for PushoverNotifier {
    fn notify(&self, batch: &AlertBatch) -> Result<(), ChannelError> {
        let response = self
            .client
            .post(&self.config.api_url)
            .form(&self.form(batch))
            .send()?;
        check_status(PushoverConfig::NAME, response)
    }

    fn name(&self) -> &str {
        PushoverConfig::NAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::types::{AlertEvent, EventKind};
    use crate::error::ConfigError;

    #[test]
    fn test_validation_lists_every_missing_field() {
        let config = PushoverConfig {
            api_token: "abc".to_string(),
            ..Default::default()
        };
        match config.validate() {
            Err(ConfigError::IncompleteChannel { channel, missing }) => {
                assert_eq!(channel, "pushover");
                assert_eq!(missing, vec!["user_key", "api_url"]);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_form_fields() {
        let config = PushoverConfig {
            api_token: "abc".to_string(),
            user_key: "u1".to_string(),
            api_url: "https://api.pushover.net/1/messages.json".to_string(),
        };
        let notifier = PushoverNotifier::new(config, Duration::from_secs(1)).unwrap();
        let batch = AlertBatch::from(vec![AlertEvent::new(EventKind::Starting, "", "up")]);

        let form = notifier.form(&batch);
        assert_eq!(form[0], ("token", "abc".to_string()));
        assert_eq!(form[1], ("user", "u1".to_string()));
        assert_eq!(form[2], ("message", "up\n\n".to_string()));
    }
}
