//! Gateway: HTTP server for the webhook endpoint and static assets.
//!
//! Single port serves `POST {webhook.path}` (signed deliveries from the platform),
//! `GET {server.staticPrefix}/*` and a `GET /` health check.

mod server;
mod signature;

pub use server::{batch_status, build_router, process_delivery, run_gateway, GatewayState};
pub use signature::{sign_body, verify_signature, SIGNATURE_HEADER};
