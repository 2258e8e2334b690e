//! Error type shared by the router, reply dispatch, and the platform client.

use thiserror::Error;

/// Errors raised while handling a webhook delivery.
#[derive(Debug, Error)]
pub enum Error {
    /// Webhook body is not JSON or has no `events` array.
    #[error("malformed webhook body: {0}")]
    MalformedBody(String),

    /// A single event could not be interpreted (bad shape, missing `message` on a message event).
    #[error("malformed event: {0}")]
    MalformedEvent(String),

    /// Event `type` is not one the router knows how to handle.
    #[error("unknown event type: {0}")]
    UnknownEvent(String),

    /// A reply-capable event arrived without a reply token.
    #[error("missing reply token for {0} event")]
    MissingReplyToken(String),

    /// Reply rejected before sending (empty or over the per-reply message limit).
    #[error("invalid reply: {0}")]
    InvalidReply(String),

    /// Messaging API responded with a non-success status.
    #[error("messaging api error: {status} {body}")]
    Api { status: u16, body: String },

    /// Transport failure talking to the Messaging API.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_event_names_the_type() {
        let err = Error::UnknownEvent("banana".into());
        assert_eq!(err.to_string(), "unknown event type: banana");
    }

    #[test]
    fn api_error_includes_status_and_body() {
        let err = Error::Api {
            status: 400,
            body: "Invalid reply token".into(),
        };
        assert_eq!(err.to_string(), "messaging api error: 400 Invalid reply token");
    }

    #[test]
    fn malformed_event_names_the_cause() {
        let err = Error::MalformedEvent("missing field `type`".into());
        assert_eq!(err.to_string(), "malformed event: missing field `type`");
    }
}
