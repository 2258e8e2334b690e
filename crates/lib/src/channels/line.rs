//! LINE channel: reply API client.

use crate::config::{self, Config};
use crate::error::{Error, Result};
use crate::reply::ReplyItem;
use async_trait::async_trait;
use serde::Serialize;

const REPLY_PATH: &str = "/v2/bot/message/reply";

/// Sends replies to the platform. Implementations must be safe to share across requests.
#[async_trait]
pub trait ReplyClient: Send + Sync {
    /// Reply to `reply_token` with `messages` in order.
    async fn reply_message(&self, reply_token: &str, messages: &[ReplyItem]) -> Result<()>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReplyRequest<'a> {
    reply_token: &'a str,
    messages: &'a [ReplyItem],
}

/// Messaging API client holding the channel access token. Configured once at startup.
pub struct LineClient {
    access_token: String,
    api_base: String,
    client: reqwest::Client,
}

impl LineClient {
    pub fn new(access_token: impl Into<String>, api_base: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Build from config; None when no channel access token is configured.
    pub fn from_config(config: &Config) -> Option<Self> {
        let token = config::resolve_access_token(config)?;
        Some(Self::new(token, config::resolve_api_base(config)))
    }

    fn reply_url(&self) -> String {
        format!("{}{}", self.api_base, REPLY_PATH)
    }
}

#[async_trait]
impl ReplyClient for LineClient {
    async fn reply_message(&self, reply_token: &str, messages: &[ReplyItem]) -> Result<()> {
        let body = ReplyRequest {
            reply_token,
            messages,
        };
        let res = self
            .client
            .post(self.reply_url())
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await?;
        if !res.status().is_success() {
            let status = res.status().as_u16();
            let body = res.text().await.unwrap_or_default();
            return Err(Error::Api { status, body });
        }
        log::debug!("reply sent: token={} messages={}", reply_token, messages.len());
        Ok(())
    }
}
