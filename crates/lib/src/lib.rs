//! LINE bot webhook receiver: event model, routing, flex replies, reply dispatch,
//! and the HTTP gateway used by the CLI.

pub mod channels;
pub mod config;
pub mod error;
pub mod event;
pub mod flex;
pub mod gateway;
pub mod init;
pub mod reply;
pub mod router;

pub use error::{Error, Result};
