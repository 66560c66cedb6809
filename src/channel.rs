//! Pushes the selected proxy to API channels
//!
//! Each channel is updated with `PUT {base_url}/api/channel/` carrying the
//! channel id and a `setting` field that is itself a JSON document. The
//! first rejected update stops the loop.

use reqwest::{Client, header};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::ChannelConfig;
use crate::constants::channel::{ADMIN_USER_HEADER, API_PATH};

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("channel settings incomplete, missing: {}", .missing.join(", "))]
    Incomplete { missing: Vec<&'static str> },

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("failed to build channel request body: {0}")]
    Body(#[from] serde_json::Error),

    #[error("request for channel {channel} failed: {source}")]
    Request {
        channel: i64,
        #[source]
        source: reqwest::Error,
    },

    #[error("channel {channel} update rejected with HTTP {status}: {body}")]
    Status { channel: i64, status: u16, body: String },
}

#[derive(Debug, Serialize)]
struct UpdateBody<'a> {
    id: i64,
    setting: &'a str,
}

#[derive(Debug, Serialize)]
struct ChannelSetting<'a> {
    proxy: &'a str,
}

/// Client for the channel update API
pub struct ChannelUpdater {
    client: Client,
    api_url: String,
    admin_id: String,
    admin_token: String,
    channel_ids: Vec<i64>,
}

impl ChannelUpdater {
    /// Build an updater; fails if any connection setting is missing
    pub fn from_config(config: &ChannelConfig) -> Result<Self, ChannelError> {
        let (Some(base_url), Some(admin_id), Some(admin_token)) = (
            config.base_url.as_deref(),
            config.admin_id.as_deref(),
            config.admin_token.as_deref(),
        ) else {
            return Err(ChannelError::Incomplete {
                missing: config.missing_fields(),
            });
        };
        let missing = config.missing_fields();
        if !missing.is_empty() {
            return Err(ChannelError::Incomplete { missing });
        }

        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(ChannelError::Client)?;

        Ok(Self {
            client,
            api_url: format!("{}{}", base_url.trim_end_matches('/'), API_PATH),
            admin_id: admin_id.to_string(),
            admin_token: admin_token.to_string(),
            channel_ids: config.channel_ids.clone(),
        })
    }

    #[must_use]
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    #[must_use]
    pub fn channel_ids(&self) -> &[i64] {
        &self.channel_ids
    }

    /// Set `proxy_url` on every configured channel, in order
    ///
    /// Returns the number of channels updated.
    pub async fn apply(&self, proxy_url: &str) -> Result<usize, ChannelError> {
        let setting = serde_json::to_string(&ChannelSetting { proxy: proxy_url })?;
        info!(
            "Updating proxy on {} channels via {}",
            self.channel_ids.len(),
            self.api_url
        );
        debug!(
            "Channel auth: {}={} token={}...",
            ADMIN_USER_HEADER,
            self.admin_id,
            token_prefix(&self.admin_token)
        );

        for &channel in &self.channel_ids {
            self.update(channel, &setting).await?;
            info!("Channel {} updated", channel);
        }
        Ok(self.channel_ids.len())
    }

    async fn update(&self, channel: i64, setting: &str) -> Result<(), ChannelError> {
        let response = self
            .client
            .put(&self.api_url)
            .header(ADMIN_USER_HEADER, &self.admin_id)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.admin_token))
            .json(&UpdateBody { id: channel, setting })
            .send()
            .await
            .map_err(|source| ChannelError::Request { channel, source })?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(ChannelError::Status {
            channel,
            status: status.as_u16(),
            body,
        })
    }
}

fn token_prefix(token: &str) -> String {
    token.chars().take(10).collect()
}
