//! In-memory `ReplyClient` for unit tests.

use super::ReplyClient;
use crate::error::{Error, Result};
use crate::reply::{Reply, ReplyItem};
use async_trait::async_trait;
use std::sync::Mutex;

/// Records every reply call; optionally fails them all with a 400 API error.
#[derive(Default)]
pub struct RecordingClient {
    calls: Mutex<Vec<Reply>>,
    fail: bool,
}

impl RecordingClient {
    pub fn failing() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn calls(&self) -> Vec<Reply> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReplyClient for RecordingClient {
    async fn reply_message(&self, reply_token: &str, messages: &[ReplyItem]) -> Result<()> {
        self.calls.lock().unwrap().push(Reply {
            reply_token: reply_token.to_string(),
            messages: messages.to_vec(),
        });
        if self.fail {
            return Err(Error::Api {
                status: 400,
                body: "Invalid reply token".to_string(),
            });
        }
        Ok(())
    }
}
