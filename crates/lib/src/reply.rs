//! Reply payloads and dispatch through a [`ReplyClient`].

use crate::channels::ReplyClient;
use crate::error::{Error, Result};
use crate::flex::FlexContainer;
use serde::Serialize;

/// Messaging API limit on message objects per reply call.
pub const MAX_REPLY_MESSAGES: usize = 5;

/// One message object in a reply, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ReplyItem {
    Text {
        text: String,
    },
    Flex {
        #[serde(rename = "altText")]
        alt_text: String,
        contents: FlexContainer,
    },
}

impl ReplyItem {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Text content when this is a text item.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
            Self::Flex { .. } => None,
        }
    }
}

/// Ordered reply items. Single items and bare strings normalize to a one-element sequence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplyItems(pub Vec<ReplyItem>);

impl From<ReplyItem> for ReplyItems {
    fn from(item: ReplyItem) -> Self {
        Self(vec![item])
    }
}

impl From<Vec<ReplyItem>> for ReplyItems {
    fn from(items: Vec<ReplyItem>) -> Self {
        Self(items)
    }
}

impl From<&str> for ReplyItems {
    fn from(text: &str) -> Self {
        Self(vec![ReplyItem::text(text)])
    }
}

impl From<String> for ReplyItems {
    fn from(text: String) -> Self {
        Self(vec![ReplyItem::text(text)])
    }
}

impl From<Vec<String>> for ReplyItems {
    fn from(texts: Vec<String>) -> Self {
        Self(texts.into_iter().map(ReplyItem::text).collect())
    }
}

impl From<Vec<&str>> for ReplyItems {
    fn from(texts: Vec<&str>) -> Self {
        Self(texts.into_iter().map(ReplyItem::text).collect())
    }
}

/// A pending reply: the single-use token and the messages to send with it.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub reply_token: String,
    pub messages: Vec<ReplyItem>,
}

impl Reply {
    pub fn new(reply_token: impl Into<String>, items: impl Into<ReplyItems>) -> Self {
        Self {
            reply_token: reply_token.into(),
            messages: items.into().0,
        }
    }

    /// Reject replies the platform would refuse anyway (no messages, too many, blank token).
    pub fn validate(&self) -> Result<()> {
        if self.reply_token.trim().is_empty() {
            return Err(Error::InvalidReply("empty reply token".to_string()));
        }
        if self.messages.is_empty() {
            return Err(Error::InvalidReply("no messages".to_string()));
        }
        if self.messages.len() > MAX_REPLY_MESSAGES {
            return Err(Error::InvalidReply(format!(
                "{} messages exceeds the limit of {}",
                self.messages.len(),
                MAX_REPLY_MESSAGES
            )));
        }
        Ok(())
    }
}

/// Send a reply in one call. No retry: the token is single-use, so a failed call is surfaced as-is.
pub async fn dispatch(client: &dyn ReplyClient, reply: &Reply) -> Result<()> {
    reply.validate()?;
    client
        .reply_message(&reply.reply_token, &reply.messages)
        .await
}
