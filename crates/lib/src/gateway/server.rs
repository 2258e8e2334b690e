//! Gateway HTTP server (single port).

use crate::channels::{LineClient, ReplyClient};
use crate::config::{self, Config, FailurePolicy};
use crate::error::Result as EventResult;
use crate::event::{InboundEvent, WebhookBody};
use crate::gateway::signature::{verify_signature, SIGNATURE_HEADER};
use crate::router::{self, EventOutcome};
use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use futures_util::future::join_all;
use serde_json::json;
use std::sync::Arc;
use tower_http::services::ServeDir;

/// Shared, read-only state for the gateway: config, channel secret, and the reply client.
#[derive(Clone)]
pub struct GatewayState {
    pub config: Arc<Config>,
    channel_secret: Arc<str>,
    pub client: Arc<dyn ReplyClient>,
}

impl GatewayState {
    /// Fails when no channel secret is configured (deliveries could not be verified)
    /// or when the configured routes cannot be mounted.
    pub fn new(config: Config, client: Arc<dyn ReplyClient>) -> Result<Self> {
        config::validate_routes(&config).context("invalid route configuration")?;
        let secret = config::resolve_channel_secret(&config)
            .context("channel secret not configured (set channel.secret or CHANNEL_SECRET)")?;
        Ok(Self {
            config: Arc::new(config),
            channel_secret: Arc::from(secret),
            client,
        })
    }
}

/// Build the HTTP router: webhook, static assets, health.
pub fn build_router(state: GatewayState) -> Router {
    let webhook_path = state.config.webhook.path.clone();
    let static_prefix = state.config.server.static_prefix.clone();
    let static_dir = state.config.server.static_dir.clone();
    Router::new()
        .route("/", get(health_http))
        .route(&webhook_path, post(line_webhook))
        .nest_service(&static_prefix, ServeDir::new(static_dir))
        .with_state(state)
}

/// Run the gateway server; binds to server.bind:server.port.
/// Requires a channel access token and secret. Blocks until shutdown (e.g. Ctrl+C).
pub async fn run_gateway(mut config: Config) -> Result<()> {
    config::validate_routes(&config).context("invalid route configuration")?;
    config.server.static_dir = config::resolve_static_dir(&config);
    let client = LineClient::from_config(&config).context(
        "channel access token not configured (set channel.accessToken or CHANNEL_ACCESS_TOKEN)",
    )?;
    let bind_addr = format!("{}:{}", config.server.bind.trim(), config.server.port);
    if let Some(base) = config.channel.base_url.as_deref() {
        log::info!(
            "webhook url: {}{}",
            base.trim_end_matches('/'),
            config.webhook.path
        );
    }
    log::info!("serving static files from {}", config.server.static_dir.display());
    let state = GatewayState::new(config, Arc::new(client))?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding to {}", bind_addr))?;
    log::info!("gateway listening on {}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("gateway server exited")?;
    log::info!("gateway stopped");
    Ok(())
}

/// Future that completes when the process should shut down (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::warn!("failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                log::warn!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    log::info!("shutdown signal received, draining connections");
}

/// Route every event of a delivery concurrently and wait for all of them.
/// Each failure is logged with its raw event; no event is cancelled because another failed.
pub async fn process_delivery(
    client: &dyn ReplyClient,
    body: &WebhookBody,
) -> Vec<EventResult<EventOutcome>> {
    let tasks = body.events.iter().map(|raw| async move {
        let result = match InboundEvent::from_value(raw) {
            Ok(event) => router::handle_event(client, &event).await,
            Err(e) => Err(e),
        };
        if let Err(ref e) = result {
            log::error!("event failed: error={} event={}", e, raw);
        }
        result
    });
    join_all(tasks).await
}

/// Response status for a delivery's per-event outcomes under `policy`.
pub fn batch_status(policy: FailurePolicy, outcomes: &[EventResult<EventOutcome>]) -> StatusCode {
    let failed = outcomes.iter().filter(|r| r.is_err()).count();
    match policy {
        FailurePolicy::AllOrNothing if failed > 0 => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::OK,
    }
}

/// POST {webhook.path}: verify signature, parse the delivery, route events, answer with an empty body.
async fn line_webhook(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let provided = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    if !verify_signature(&state.channel_secret, &body, provided) {
        log::warn!("webhook rejected: invalid or missing {}", SIGNATURE_HEADER);
        return StatusCode::INTERNAL_SERVER_ERROR;
    }

    let delivery = match WebhookBody::parse(&body) {
        Ok(d) => d,
        Err(e) => {
            log::error!("webhook rejected: {}", e);
            return StatusCode::INTERNAL_SERVER_ERROR;
        }
    };
    if let Some(ref destination) = delivery.destination {
        log::info!("webhook: destination={}", destination);
    }

    let outcomes = process_delivery(state.client.as_ref(), &delivery).await;
    let replied = outcomes
        .iter()
        .filter(|r| matches!(r, Ok(EventOutcome::Replied)))
        .count();
    let failed = outcomes.iter().filter(|r| r.is_err()).count();
    log::debug!(
        "webhook: events={} replied={} failed={}",
        outcomes.len(),
        replied,
        failed
    );
    batch_status(state.config.webhook.failure_policy, &outcomes)
}

/// GET / returns a simple health JSON for uptime checks.
async fn health_http(State(state): State<GatewayState>) -> Json<serde_json::Value> {
    Json(json!({
        "runtime": "running",
        "port": state.config.server.port,
    }))
}
