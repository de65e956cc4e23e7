//! Notification channels
//!
//! Each channel has a settings table in the config file and a notifier that
//! delivers a batch. A table left entirely empty means the channel is not
//! used; a partially filled one is a configuration error.

pub mod email;
pub mod pushbullet;
pub mod pushover;
pub mod slack;

pub use email::{EmailConfig, EmailNotifier};
pub use pushbullet::{PushbulletConfig, PushbulletNotifier};
pub use pushover::{PushoverConfig, PushoverNotifier};
pub use slack::{SlackConfig, SlackNotifier};

use super::notifier::Notifier;
use crate::config::Config;
use crate::error::{ChannelError, ConfigError, Result};
use std::sync::Arc;
use std::time::Duration;

/// Settings table of one channel
pub trait ChannelSettings: Default + PartialEq {
    /// Channel name used in logs and errors
    const NAME: &'static str;

    /// Names of the required fields left empty
    fn missing_fields(&self) -> Vec<&'static str>;

    /// Whether the table was left out entirely
    fn is_omitted(&self) -> bool {
        *self == Self::default()
    }

    /// Check that a configured channel is complete
    fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.is_omitted() {
            return Ok(());
        }

        let missing = self.missing_fields();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::IncompleteChannel {
                channel: Self::NAME.to_string(),
                missing: missing.into_iter().map(String::from).collect(),
            })
        }
    }
}

/// Validate every channel table, collecting all problems
pub fn validate(config: &Config) -> Vec<ConfigError> {
    [
        config.email.validate(),
        config.slack.validate(),
        config.pushover.validate(),
        config.pushbullet.validate(),
    ]
    .into_iter()
    .filter_map(|r| r.err())
    .collect()
}

/// Names of the channels that are configured
pub fn active_names(config: &Config) -> Vec<&'static str> {
    let mut names = Vec::new();
    if !config.email.is_omitted() {
        names.push(EmailConfig::NAME);
    }
    if !config.slack.is_omitted() {
        names.push(SlackConfig::NAME);
    }
    if !config.pushover.is_omitted() {
        names.push(PushoverConfig::NAME);
    }
    if !config.pushbullet.is_omitted() {
        names.push(PushbulletConfig::NAME);
    }
    names
}

/// Build a notifier for every configured channel
///
/// `timeout` bounds each HTTP request and SMTP session.
pub fn build_notifiers(config: &Config, timeout: Duration) -> Result<Vec<Arc<dyn Notifier>>> {
    let mut notifiers: Vec<Arc<dyn Notifier>> = Vec::new();

    if !config.email.is_omitted() {
        notifiers.push(Arc::new(EmailNotifier::new(config.email.clone(), timeout)?));
    }
    if !config.slack.is_omitted() {
        notifiers.push(Arc::new(SlackNotifier::new(config.slack.clone(), timeout)?));
    }
    if !config.pushover.is_omitted() {
        notifiers.push(Arc::new(PushoverNotifier::new(
            config.pushover.clone(),
            timeout,
        )?));
    }
    if !config.pushbullet.is_omitted() {
        notifiers.push(Arc::new(PushbulletNotifier::new(
            config.pushbullet.clone(),
            timeout,
        )?));
    }

    Ok(notifiers)
}

/// Blocking HTTP client shared by the webhook channels
fn http_client(timeout: Duration) -> std::result::Result<reqwest::blocking::Client, ChannelError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("alertd/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}

/// Turn a non-2xx response into an error
fn check_status(
    channel: &str,
    response: reqwest::blocking::Response,
) -> std::result::Result<(), ChannelError> {
    let status = response.status();
    if status.is_success() {
        log::info!("sent alert to {}", channel);
        Ok(())
    } else {
        Err(ChannelError::Status {
            channel: channel.to_string(),
            status: status.as_u16(),
        })
    }
}

/// Join a configured prefix and the batch titles
fn prefixed_title(prefix: &str, titles: &str) -> String {
    format!("{} {}", prefix, titles).trim().to_string()
}
