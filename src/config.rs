//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::api::ApiConfig;
use crate::client::RemoteConfig;
use crate::identity::IssuerConfig;
use crate::invitation::{InvitationProfile, QrConfig};
use crate::store::{JournalSyncMode, StoreConfig};
use crate::sync::{ReconnectPolicy, SyncConfig, DEFAULT_INITIAL_LIMIT, DEFAULT_LIMIT_STEP};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub store: StoreSection,

    #[serde(default)]
    pub api: ApiSection,

    #[serde(default)]
    pub identity: IdentitySection,

    #[serde(default)]
    pub guestbook: GuestbookSection,

    #[serde(default)]
    pub invitation: InvitationProfile,

    #[serde(default)]
    pub qr: QrConfig,

    #[serde(default)]
    pub client: ClientSection,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Entry store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StoreSection {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Keep entries in memory only
    #[serde(default)]
    pub in_memory: bool,

    #[serde(default)]
    pub journal_sync: JournalSyncMode,

    #[serde(default = "default_compact_after")]
    pub compact_after: u64,
}

fn default_data_dir() -> String {
    dirs::data_local_dir()
        .map(|p| p.join("guestbook").to_string_lossy().to_string())
        .unwrap_or_else(|| "./guestbook_data".to_string())
}

/// Resolve a leading `~` against the home directory
fn expand_home(path: &str) -> PathBuf {
    let rest = match path.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest.trim_start_matches('/'),
        _ => return PathBuf::from(path),
    };
    match dirs::home_dir() {
        Some(home) if rest.is_empty() => home,
        Some(home) => home.join(rest),
        None => PathBuf::from(path),
    }
}

fn default_compact_after() -> u64 {
    1000
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            in_memory: false,
            journal_sync: JournalSyncMode::default(),
            compact_after: default_compact_after(),
        }
    }
}

impl StoreSection {
    pub fn to_store_config(&self) -> StoreConfig {
        StoreConfig {
            data_dir: (!self.in_memory).then(|| expand_home(&self.data_dir)),
            journal_sync: self.journal_sync,
            compact_after: self.compact_after,
        }
    }
}

/// API server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiSection {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub cors_origins: Vec<String>,

    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,

    #[serde(default = "default_max_ws_connections")]
    pub max_ws_connections: usize,

    #[serde(default = "default_sse_keep_alive")]
    pub sse_keep_alive_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8082
}

fn default_max_body_size() -> usize {
    64 * 1024 // 64 KB
}

fn default_max_ws_connections() -> usize {
    1000
}

fn default_sse_keep_alive() -> u64 {
    15
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
            max_body_size: default_max_body_size(),
            max_ws_connections: default_max_ws_connections(),
            sse_keep_alive_secs: default_sse_keep_alive(),
        }
    }
}

impl ApiSection {
    pub fn to_api_config(&self) -> ApiConfig {
        ApiConfig {
            host: self.host.clone(),
            port: self.port,
            cors_origins: self.cors_origins.clone(),
            max_body_size: self.max_body_size,
            max_ws_connections: self.max_ws_connections,
            sse_keep_alive_secs: self.sse_keep_alive_secs,
        }
    }
}

/// Anonymous identity issuer configuration
#[derive(Debug, Clone, Deserialize)]
pub struct IdentitySection {
    /// 0 disables the cap
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
}

fn default_max_sessions() -> usize {
    100_000
}

impl Default for IdentitySection {
    fn default() -> Self {
        Self {
            max_sessions: default_max_sessions(),
        }
    }
}

impl IdentitySection {
    pub fn to_issuer_config(&self) -> IssuerConfig {
        IssuerConfig {
            max_sessions: (self.max_sessions > 0).then_some(self.max_sessions),
        }
    }
}

/// Client-side guestbook view configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GuestbookSection {
    #[serde(default = "default_initial_limit")]
    pub initial_limit: usize,

    #[serde(default = "default_limit_step")]
    pub limit_step: usize,

    /// Live feed re-subscriptions after a failure; 0 leaves the banner up
    #[serde(default)]
    pub max_reconnects: u32,

    #[serde(default = "default_initial_backoff")]
    pub initial_backoff_ms: u64,

    #[serde(default = "default_max_backoff")]
    pub max_backoff_ms: u64,
}

fn default_initial_limit() -> usize {
    DEFAULT_INITIAL_LIMIT
}

fn default_limit_step() -> usize {
    DEFAULT_LIMIT_STEP
}

fn default_initial_backoff() -> u64 {
    500
}

fn default_max_backoff() -> u64 {
    30_000
}

impl Default for GuestbookSection {
    fn default() -> Self {
        Self {
            initial_limit: default_initial_limit(),
            limit_step: default_limit_step(),
            max_reconnects: 0,
            initial_backoff_ms: default_initial_backoff(),
            max_backoff_ms: default_max_backoff(),
        }
    }
}

impl GuestbookSection {
    pub fn to_sync_config(&self) -> SyncConfig {
        SyncConfig {
            initial_limit: self.initial_limit,
            limit_step: self.limit_step,
            reconnect: ReconnectPolicy {
                max_reconnects: self.max_reconnects,
                initial_backoff_ms: self.initial_backoff_ms,
                max_backoff_ms: self.max_backoff_ms,
            },
        }
    }
}

/// Remote server settings for the CLI
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSection {
    #[serde(default = "default_server_url")]
    pub server_url: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_ms: u64,
}

fn default_server_url() -> String {
    "http://localhost:8082".to_string()
}

fn default_request_timeout() -> u64 {
    10_000
}

fn default_connect_timeout() -> u64 {
    5_000
}

impl Default for ClientSection {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            request_timeout_ms: default_request_timeout(),
            connect_timeout_ms: default_connect_timeout(),
        }
    }
}

impl ClientSection {
    pub fn to_remote_config(&self) -> RemoteConfig {
        RemoteConfig {
            base_url: self.server_url.clone(),
            request_timeout_ms: self.request_timeout_ms,
            connect_timeout_ms: self.connect_timeout_ms,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,

    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
        }
    }
}

impl LoggingConfig {
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|e| match e {
            ConfigError::Parse { error, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                error,
            },
            other => other,
        })
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: PathBuf::new(),
            error: e.to_string(),
        })
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("guestbook").join("config.toml")),
            Some(PathBuf::from("/etc/guestbook/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(data_dir) = var("GUESTBOOK_DATA_DIR") {
            self.store.data_dir = data_dir;
        }

        if let Some(host) = var("GUESTBOOK_API_HOST") {
            self.api.host = host;
        }
        if let Some(port) = var("GUESTBOOK_API_PORT") {
            match port.parse() {
                Ok(p) => self.api.port = p,
                Err(_) => tracing::warn!(value = %port, "Ignoring invalid GUESTBOOK_API_PORT"),
            }
        }

        if let Some(url) = var("GUESTBOOK_SERVER_URL") {
            self.client.server_url = url;
        }

        if let Some(level) = var("GUESTBOOK_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("GUESTBOOK_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Guestbook Configuration
#
# Environment variables override these settings:
# - GUESTBOOK_DATA_DIR
# - GUESTBOOK_API_HOST
# - GUESTBOOK_API_PORT
# - GUESTBOOK_SERVER_URL
# - GUESTBOOK_LOG_LEVEL
# - GUESTBOOK_LOG_FORMAT

[store]
# Directory holding the entry journal (default: platform data dir)
# data_dir = "~/.local/share/guestbook"

# Keep entries in memory only (lost on restart)
in_memory = false

# Journal durability: every_write or none
journal_sync = "every_write"

# Rewrite the journal once it holds this many stale records
compact_after = 1000

[api]
# API server host
host = "0.0.0.0"

# API server port
port = 8082

# Allowed CORS origins (empty allows any)
cors_origins = []

# Maximum request body size (bytes)
max_body_size = 65536

# Maximum concurrent WebSocket connections
max_ws_connections = 1000

# SSE keep-alive interval (seconds)
sse_keep_alive_secs = 15

[identity]
# Maximum anonymous sessions issued per process (0 = unlimited)
max_sessions = 100000

[guestbook]
# Entries shown before "show more"
initial_limit = 5

# Entries revealed per "show more"
limit_step = 5

# Live feed re-subscriptions after a failure (0 = none)
max_reconnects = 0
initial_backoff_ms = 500
max_backoff_ms = 30000

[invitation]
bride = "Pacar"
groom = "Yudhistira"

# Countdown target (RFC 3339)
wedding_at = "2026-02-01T17:00:00Z"

rsvp_deadline = "Mohon konfirmasi kehadiran sebelum 25 Januari 2026"

[qr]
# QR image endpoint; {data} is replaced by the encoded ticket payload
template = "https://api.qrserver.com/v1/create-qr-code/?size=200x200&data={data}"

# Image fetch timeout (seconds)
fetch_timeout_secs = 5

[client]
# Guestbook server used by guestbook-cli
server_url = "http://localhost:8082"
request_timeout_ms = 10000
connect_timeout_ms = 5000

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"

# Optional log file path
# file = "/var/log/guestbook/guestbook.log"
"#
    .to_string()
}
