//! Event routing: decide the reply for one event, then send it.
//!
//! `plan_reply` is pure so every branch can be checked without a client; `handle_event`
//! adds the single reply call.

use crate::channels::ReplyClient;
use crate::error::{Error, Result};
use crate::event::{is_verification_token, EventType, InboundEvent, MessageType};
use crate::flex;
use crate::reply::{self, Reply};

/// Reply to a follow (friend added).
pub const WELCOME_TEXT: &str = "お友だち追加ありがとうございます！";

/// Reply to message types other than text.
pub const FALLBACK_TEXT: &str = "よく分かりませんでした";

/// What happened to one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    Replied,
    /// Nothing to send (verification ping, unfollow, leave).
    Skipped,
}

/// Decide the reply for an event. `Ok(None)` means the event is handled without replying.
pub fn plan_reply(event: &InboundEvent) -> Result<Option<Reply>> {
    if let Some(token) = event.reply_token.as_deref() {
        if is_verification_token(token) {
            log::info!(
                "verification webhook received: message={}",
                event.raw.get("message").unwrap_or(&serde_json::Value::Null)
            );
            return Ok(None);
        }
    }

    match &event.kind {
        EventType::Message => {
            let message = event.message.as_ref().ok_or_else(|| {
                Error::MalformedEvent("message event without message".to_string())
            })?;
            let token = reply_token(event)?;
            match message.kind {
                MessageType::Text => Ok(Some(handle_text(token))),
                _ => Ok(Some(Reply::new(token, FALLBACK_TEXT))),
            }
        }
        EventType::Follow => Ok(Some(Reply::new(reply_token(event)?, WELCOME_TEXT))),
        EventType::Unfollow => {
            log::info!("unfollowed: event={}", event.raw);
            Ok(None)
        }
        EventType::Join => {
            let source_type = event
                .source
                .as_ref()
                .map(|s| s.kind.as_str())
                .unwrap_or("unknown");
            Ok(Some(Reply::new(
                reply_token(event)?,
                format!("Joined {}", source_type),
            )))
        }
        EventType::Leave => {
            log::info!("left: event={}", event.raw);
            Ok(None)
        }
        EventType::Other(kind) => Err(Error::UnknownEvent(kind.clone())),
    }
}

/// Text messages always get the carousel; the text itself is not inspected.
fn handle_text(reply_token: &str) -> Reply {
    log::debug!("text message: replying with carousel");
    Reply::new(reply_token, flex::carousel_message())
}

fn reply_token(event: &InboundEvent) -> Result<&str> {
    event
        .reply_token
        .as_deref()
        .filter(|t| !t.is_empty())
        .ok_or_else(|| Error::MissingReplyToken(event.kind.as_str().to_string()))
}

/// Route one event and send its reply, if any.
pub async fn handle_event(client: &dyn ReplyClient, event: &InboundEvent) -> Result<EventOutcome> {
    match plan_reply(event)? {
        Some(reply) => {
            reply::dispatch(client, &reply).await?;
            Ok(EventOutcome::Replied)
        }
        None => Ok(EventOutcome::Skipped),
    }
}
