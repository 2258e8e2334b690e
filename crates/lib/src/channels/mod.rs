//! Messaging platform channel (LINE Messaging API).
//!
//! `ReplyClient` is the seam between the router and the platform: the gateway holds
//! one shared client, tests substitute a recording fake.

mod line;
#[cfg(test)]
pub(crate) mod testing;

pub use line::{LineClient, ReplyClient};
