//! Webhook delivery and event payloads (Messaging API webhook JSON).
//!
//! Type fields are closed enums with an explicit `Other` variant so unrecognized
//! values still deserialize and the router decides what to do with them.

use crate::error::{Error, Result};
use serde::Deserialize;

/// One webhook delivery: a batch of events for a bot.
#[derive(Debug)]
pub struct WebhookBody {
    /// Bot user id the events are addressed to.
    pub destination: Option<String>,
    /// Raw events; parsed one by one so a single bad event does not reject the batch.
    pub events: Vec<serde_json::Value>,
}

impl WebhookBody {
    /// Parse a raw request body. Fails when it is not JSON or `events` is missing or not an array.
    pub fn parse(body: &[u8]) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_slice(body)
            .map_err(|e| Error::MalformedBody(format!("invalid json: {}", e)))?;
        let obj = value
            .as_object()
            .ok_or_else(|| Error::MalformedBody("body is not an object".to_string()))?;
        let events = match obj.get("events") {
            Some(serde_json::Value::Array(events)) => events.clone(),
            Some(_) => return Err(Error::MalformedBody("events is not an array".to_string())),
            None => return Err(Error::MalformedBody("missing events".to_string())),
        };
        let destination = obj
            .get("destination")
            .and_then(|v| v.as_str())
            .map(str::to_string);
        Ok(Self {
            destination,
            events,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum EventType {
    Message,
    Follow,
    Unfollow,
    Join,
    Leave,
    Other(String),
}

impl From<String> for EventType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "message" => Self::Message,
            "follow" => Self::Follow,
            "unfollow" => Self::Unfollow,
            "join" => Self::Join,
            "leave" => Self::Leave,
            _ => Self::Other(s),
        }
    }
}

impl EventType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Message => "message",
            Self::Follow => "follow",
            Self::Unfollow => "unfollow",
            Self::Join => "join",
            Self::Leave => "leave",
            Self::Other(s) => s,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum SourceType {
    User,
    Group,
    Room,
    Other(String),
}

impl From<String> for SourceType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "user" => Self::User,
            "group" => Self::Group,
            "room" => Self::Room,
            _ => Self::Other(s),
        }
    }
}

impl SourceType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::User => "user",
            Self::Group => "group",
            Self::Room => "room",
            Self::Other(s) => s,
        }
    }
}

/// Where the event came from: a 1:1 chat, a group, or a multi-person room.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    #[serde(rename = "type")]
    pub kind: SourceType,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub group_id: Option<String>,
    #[serde(default)]
    pub room_id: Option<String>,
}

impl Source {
    /// Id matching the source kind (group id for groups, room id for rooms, user id otherwise).
    pub fn id(&self) -> Option<&str> {
        match self.kind {
            SourceType::Group => self.group_id.as_deref(),
            SourceType::Room => self.room_id.as_deref(),
            _ => self.user_id.as_deref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum MessageType {
    Text,
    Image,
    Video,
    Audio,
    File,
    Location,
    Sticker,
    Other(String),
}

impl From<String> for MessageType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "text" => Self::Text,
            "image" => Self::Image,
            "video" => Self::Video,
            "audio" => Self::Audio,
            "file" => Self::File,
            "location" => Self::Location,
            "sticker" => Self::Sticker,
            _ => Self::Other(s),
        }
    }
}

/// Message content of a `message` event. Only the fields the router reads are kept.
#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub kind: MessageType,
    #[serde(default)]
    pub text: Option<String>,
}

/// One event from a webhook delivery.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundEvent {
    #[serde(rename = "type")]
    pub kind: EventType,
    #[serde(default)]
    pub reply_token: Option<String>,
    #[serde(default)]
    pub source: Option<Source>,
    /// Present only on `message` events.
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub timestamp: Option<i64>,
    /// "active" or "standby" channel mode.
    #[serde(default)]
    pub mode: Option<String>,
    /// The event exactly as delivered, including fields not modelled above.
    #[serde(skip)]
    pub raw: serde_json::Value,
}

impl InboundEvent {
    pub fn from_value(value: &serde_json::Value) -> Result<Self> {
        let mut event: Self = serde_json::from_value(value.clone())
            .map_err(|e| Error::MalformedEvent(e.to_string()))?;
        event.raw = value.clone();
        Ok(event)
    }
}

/// True for the dummy tokens the console sends when verifying the webhook URL
/// (a single character repeated, e.g. "00000000000000000000000000000000").
pub fn is_verification_token(token: &str) -> bool {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) => chars.all(|c| c == first),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_body_with_destination() {
        let body = br#"{"destination":"U123","events":[{"type":"follow"}]}"#;
        let parsed = WebhookBody::parse(body).unwrap();
        assert_eq!(parsed.destination.as_deref(), Some("U123"));
        assert_eq!(parsed.events.len(), 1);
    }

    #[test]
    fn parse_body_empty_events_is_ok() {
        let parsed = WebhookBody::parse(br#"{"events":[]}"#).unwrap();
        assert!(parsed.destination.is_none());
        assert!(parsed.events.is_empty());
    }

    #[test]
    fn parse_body_rejects_missing_or_non_array_events() {
        assert!(matches!(WebhookBody::parse(b"{}"), Err(Error::MalformedBody(_))));
        assert!(matches!(
            WebhookBody::parse(br#"{"events":{"type":"follow"}}"#),
            Err(Error::MalformedBody(_))
        ));
        assert!(matches!(WebhookBody::parse(b"[]"), Err(Error::MalformedBody(_))));
        assert!(matches!(WebhookBody::parse(b"not json"), Err(Error::MalformedBody(_))));
    }

    #[test]
    fn text_message_event() {
        let event = InboundEvent::from_value(&json!({
            "type": "message",
            "replyToken": "nHuyWiB7yP5Zw52FIkcQobQuGDXCTA",
            "source": { "type": "user", "userId": "U4af4980629" },
            "timestamp": 1462629479859i64,
            "mode": "active",
            "message": { "id": "325708", "type": "text", "text": "Hello, world" }
        }))
        .unwrap();
        assert_eq!(event.kind, EventType::Message);
        assert_eq!(event.reply_token.as_deref(), Some("nHuyWiB7yP5Zw52FIkcQobQuGDXCTA"));
        let message = event.message.unwrap();
        assert_eq!(message.kind, MessageType::Text);
        assert_eq!(message.text.as_deref(), Some("Hello, world"));
        let source = event.source.unwrap();
        assert_eq!(source.kind, SourceType::User);
        assert_eq!(source.id(), Some("U4af4980629"));
    }

    #[test]
    fn unknown_types_land_in_other() {
        let event = InboundEvent::from_value(&json!({
            "type": "banana",
            "source": { "type": "planet", "userId": "U1" }
        }))
        .unwrap();
        assert_eq!(event.kind, EventType::Other("banana".into()));
        assert_eq!(event.kind.as_str(), "banana");
        assert_eq!(event.source.unwrap().kind.as_str(), "planet");
    }

    #[test]
    fn raw_keeps_unmodelled_fields() {
        let value = json!({
            "type": "unfollow",
            "source": { "type": "user", "userId": "U1" },
            "webhookEventId": "01FZ74A0TDDPYRVKNK77XKC3ZR",
            "deliveryContext": { "isRedelivery": false }
        });
        let event = InboundEvent::from_value(&value).unwrap();
        assert_eq!(event.raw, value);
        assert_eq!(event.raw["webhookEventId"], "01FZ74A0TDDPYRVKNK77XKC3ZR");
    }

    #[test]
    fn group_source_id() {
        let event = InboundEvent::from_value(&json!({
            "type": "join",
            "replyToken": "abc",
            "source": { "type": "group", "groupId": "C1", "userId": "U1" }
        }))
        .unwrap();
        assert_eq!(event.source.unwrap().id(), Some("C1"));
    }

    #[test]
    fn event_without_type_is_malformed() {
        let err = InboundEvent::from_value(&json!({ "replyToken": "abc" })).unwrap_err();
        assert!(matches!(err, Error::MalformedEvent(_)));
        let err = InboundEvent::from_value(&json!("follow")).unwrap_err();
        assert!(matches!(err, Error::MalformedEvent(_)));
    }

    #[test]
    fn verification_tokens() {
        assert!(is_verification_token("00000000000000000000000000000000"));
        assert!(is_verification_token("ffffffffffffffffffffffffffffffff"));
        assert!(is_verification_token("x"));
        assert!(!is_verification_token(""));
        assert!(!is_verification_token("0000000000000001"));
        assert!(!is_verification_token("nHuyWiB7yP5Zw52FIkcQobQuGDXCTA"));
    }
}
