//! Configuration types and loading.
//!
//! Config is loaded once at startup from a JSON file (e.g. `~/.linebot/config.json`)
//! and then overridden from the environment (`CHANNEL_ACCESS_TOKEN`, `CHANNEL_SECRET`,
//! `BASE_URL`, `PORT`, `LINE_API_BASE`). A `.env` file in the working directory is
//! read first so local development can keep credentials out of the config file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default Messaging API endpoint.
pub const DEFAULT_API_BASE: &str = "https://api.line.me";

/// Top-level application config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// HTTP listener and static asset settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Channel credentials and Messaging API endpoint.
    #[serde(default)]
    pub channel: ChannelConfig,

    /// Webhook route and batch failure policy.
    #[serde(default)]
    pub webhook: WebhookConfig,
}

/// Listener bind/port and static file serving.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    /// Bind address (default "0.0.0.0"; the platform must be able to reach the webhook).
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Listen port (default 3000). Overridden by PORT env.
    #[serde(default = "default_port")]
    pub port: u16,

    /// URL prefix for static assets (default "/static").
    #[serde(default = "default_static_prefix")]
    pub static_prefix: String,

    /// Directory served under `static_prefix` (default "static"). Relative paths are resolved against the working directory.
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
}

fn default_bind() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_static_prefix() -> String {
    "/static".to_string()
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("static")
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
            static_prefix: default_static_prefix(),
            static_dir: default_static_dir(),
        }
    }
}

/// Channel credentials from the LINE Developers console.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelConfig {
    /// Long-lived channel access token. Overridden by CHANNEL_ACCESS_TOKEN env.
    pub access_token: Option<String>,
    /// Channel secret used to verify X-Line-Signature. Overridden by CHANNEL_SECRET env.
    pub secret: Option<String>,
    /// Public base URL of this server; the webhook URL to register is logged from it at startup. Overridden by BASE_URL env.
    pub base_url: Option<String>,
    /// Messaging API base URL (default https://api.line.me). Overridden by LINE_API_BASE env.
    pub api_base: Option<String>,
}

/// How the webhook response status is derived from per-event outcomes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FailurePolicy {
    /// Any failed event fails the whole delivery with 500.
    #[default]
    AllOrNothing,
    /// Failed events are logged; the delivery is acknowledged with 200.
    Lenient,
}

/// Webhook route settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookConfig {
    /// Route the platform POSTs to (default "/linebot").
    #[serde(default = "default_webhook_path")]
    pub path: String,

    #[serde(default)]
    pub failure_policy: FailurePolicy,
}

fn default_webhook_path() -> String {
    "/linebot".to_string()
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            path: default_webhook_path(),
            failure_policy: FailurePolicy::default(),
        }
    }
}

impl Config {
    /// Apply environment overrides using `lookup` (blank values are ignored).
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };
        if let Some(v) = get("CHANNEL_ACCESS_TOKEN") {
            self.channel.access_token = Some(v);
        }
        if let Some(v) = get("CHANNEL_SECRET") {
            self.channel.secret = Some(v);
        }
        if let Some(v) = get("BASE_URL") {
            self.channel.base_url = Some(v);
        }
        if let Some(v) = get("LINE_API_BASE") {
            self.channel.api_base = Some(v);
        }
        if let Some(v) = get("PORT") {
            match v.parse::<u16>() {
                Ok(port) => self.server.port = port,
                Err(_) => log::warn!("ignoring invalid PORT value: {}", v),
            }
        }
    }
}

/// Channel access token, trimmed; None when unset or blank.
pub fn resolve_access_token(config: &Config) -> Option<String> {
    non_blank(config.channel.access_token.as_deref())
}

/// Channel secret, trimmed; None when unset or blank.
pub fn resolve_channel_secret(config: &Config) -> Option<String> {
    non_blank(config.channel.secret.as_deref())
}

/// Messaging API base without a trailing slash.
pub fn resolve_api_base(config: &Config) -> String {
    non_blank(config.channel.api_base.as_deref())
        .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
        .trim_end_matches('/')
        .to_string()
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Resolve the static asset directory: absolute paths as-is, relative ones against the working directory.
pub fn resolve_static_dir(config: &Config) -> PathBuf {
    let dir = &config.server.static_dir;
    if dir.is_absolute() {
        return dir.clone();
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(dir),
        Err(e) => {
            log::warn!("cannot resolve working directory, serving {} as-is: {}", dir.display(), e);
            dir.clone()
        }
    }
}

/// Check the configured routes before they are handed to the HTTP router:
/// both must be absolute paths without wildcards, the static prefix cannot be `/`,
/// and neither may shadow the other or the `/` health route.
pub fn validate_routes(config: &Config) -> Result<()> {
    let webhook = config.webhook.path.as_str();
    let prefix = config.server.static_prefix.as_str();
    check_route("webhook.path", webhook)?;
    check_route("server.staticPrefix", prefix)?;
    if webhook == "/" {
        anyhow::bail!("webhook.path must not be \"/\" (reserved for the health check)");
    }
    if prefix == "/" {
        anyhow::bail!("server.staticPrefix must not be \"/\"");
    }
    if prefix.ends_with('/') {
        anyhow::bail!("server.staticPrefix must not end with \"/\": {}", prefix);
    }
    if webhook == prefix || webhook.starts_with(&format!("{}/", prefix)) {
        anyhow::bail!(
            "webhook.path {} collides with server.staticPrefix {}",
            webhook,
            prefix
        );
    }
    Ok(())
}

fn check_route(name: &str, path: &str) -> Result<()> {
    if !path.starts_with('/') {
        anyhow::bail!("{} must start with \"/\": {:?}", name, path);
    }
    if path.contains(['*', ':', '{', '}']) {
        anyhow::bail!("{} must be a literal path: {}", name, path);
    }
    Ok(())
}

/// Resolve config path from env or default.
pub fn default_config_path() -> PathBuf {
    std::env::var("LINEBOT_CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .map(|h| h.join(".linebot").join("config.json"))
                .unwrap_or_else(|| PathBuf::from("config.json"))
        })
}

/// Load `.env`, then the config file (missing file => defaults), then apply environment overrides.
/// Returns the config and the path that was used.
pub fn load_config(path: Option<PathBuf>) -> Result<(Config, PathBuf)> {
    if let Ok(env_path) = dotenvy::dotenv() {
        log::debug!("loaded environment from {}", env_path.display());
    }
    let path = path.unwrap_or_else(default_config_path);
    let mut config = if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        Config::default()
    } else {
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        serde_json::from_str(&s)
            .with_context(|| format!("parsing config from {}", path.display()))?
    };
    config.apply_env_overrides(|key| std::env::var(key).ok());
    Ok((config, path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.bind, "0.0.0.0");
        assert_eq!(config.server.static_prefix, "/static");
        assert_eq!(config.webhook.path, "/linebot");
        assert_eq!(config.webhook.failure_policy, FailurePolicy::AllOrNothing);
        assert_eq!(resolve_api_base(&config), DEFAULT_API_BASE);
    }

    #[test]
    fn parses_camel_case_file() {
        let config: Config = serde_json::from_str(
            r#"{
                "server": { "port": 8080, "staticDir": "public" },
                "channel": { "accessToken": "tok", "secret": "sec", "apiBase": "http://localhost:9000/" },
                "webhook": { "failurePolicy": "lenient" }
            }"#,
        )
        .unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.bind, "0.0.0.0");
        assert_eq!(config.server.static_dir, PathBuf::from("public"));
        assert_eq!(resolve_access_token(&config).as_deref(), Some("tok"));
        assert_eq!(resolve_channel_secret(&config).as_deref(), Some("sec"));
        assert_eq!(resolve_api_base(&config), "http://localhost:9000");
        assert_eq!(config.webhook.failure_policy, FailurePolicy::Lenient);
    }

    #[test]
    fn env_overrides_file_values() {
        let mut config = Config::default();
        config.channel.secret = Some("from-file".into());
        let env: HashMap<&str, &str> = [
            ("CHANNEL_ACCESS_TOKEN", "env-token"),
            ("CHANNEL_SECRET", "env-secret"),
            ("BASE_URL", "https://bot.example.com"),
            ("PORT", "4000"),
        ]
        .into_iter()
        .collect();
        config.apply_env_overrides(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(config.channel.access_token.as_deref(), Some("env-token"));
        assert_eq!(config.channel.secret.as_deref(), Some("env-secret"));
        assert_eq!(config.channel.base_url.as_deref(), Some("https://bot.example.com"));
        assert_eq!(config.server.port, 4000);
    }

    #[test]
    fn blank_env_and_bad_port_are_ignored() {
        let mut config = Config::default();
        config.channel.secret = Some("keep".into());
        config.apply_env_overrides(|k| match k {
            "CHANNEL_SECRET" => Some("   ".to_string()),
            "PORT" => Some("not-a-port".to_string()),
            _ => None,
        });
        assert_eq!(config.channel.secret.as_deref(), Some("keep"));
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn static_dir_defaults_to_working_directory() {
        let mut config = Config::default();
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(resolve_static_dir(&config), cwd.join("static"));
        config.server.static_dir = PathBuf::from("public/assets");
        assert_eq!(resolve_static_dir(&config), cwd.join("public/assets"));
        config.server.static_dir = PathBuf::from("/srv/assets");
        assert_eq!(resolve_static_dir(&config), PathBuf::from("/srv/assets"));
    }

    #[test]
    fn default_routes_are_valid() {
        assert!(validate_routes(&Config::default()).is_ok());
        let mut config = Config::default();
        config.webhook.path = "/hooks/line".into();
        config.server.static_prefix = "/assets".into();
        assert!(validate_routes(&config).is_ok());
    }

    #[test]
    fn webhook_path_without_leading_slash_is_rejected() {
        let mut config = Config::default();
        config.webhook.path = "linebot".into();
        let err = validate_routes(&config).unwrap_err();
        assert!(err.to_string().contains("webhook.path"));
    }

    #[test]
    fn bad_static_prefixes_are_rejected() {
        for prefix in ["/", "static", "/static/", "/files/*rest", ""] {
            let mut config = Config::default();
            config.server.static_prefix = prefix.into();
            assert!(validate_routes(&config).is_err(), "prefix {:?}", prefix);
        }
    }

    #[test]
    fn colliding_routes_are_rejected() {
        for path in ["/", "/static", "/static/linebot", "/linebot/:id"] {
            let mut config = Config::default();
            config.webhook.path = path.into();
            assert!(validate_routes(&config).is_err(), "path {:?}", path);
        }
        let mut config = Config::default();
        config.webhook.path = "/staticbot".into();
        assert!(validate_routes(&config).is_ok());
    }

    #[test]
    fn blank_credentials_resolve_to_none() {
        let mut config = Config::default();
        config.channel.access_token = Some("  ".into());
        assert!(resolve_access_token(&config).is_none());
        assert!(resolve_channel_secret(&config).is_none());
    }
}
