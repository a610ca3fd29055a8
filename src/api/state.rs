//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinHandle;

use crate::api::error::{ApiError, ApiResult};
use crate::identity::IdentityService;
use crate::invitation::{InvitationProfile, QrConfig, QrRenderer};
use crate::store::GuestbookStore;
use crate::websocket::{spawn_snapshot_forwarder, ConnectionHub, HubConfig};

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Guestbook persistence
    pub store: Arc<dyn GuestbookStore>,
    /// Anonymous session issuer
    pub identity: Arc<dyn IdentityService>,
    /// API configuration
    pub config: Arc<ApiConfig>,
    /// Couple, date and gift details
    pub invitation: Arc<InvitationProfile>,
    /// QR image fetcher
    pub qr: Arc<QrRenderer>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
    /// WebSocket connection hub for live snapshots
    pub ws_hub: Arc<ConnectionHub>,
}

impl AppState {
    /// Create state with the default invitation profile and QR endpoint
    pub fn new(
        store: Arc<dyn GuestbookStore>,
        identity: Arc<dyn IdentityService>,
        config: ApiConfig,
    ) -> ApiResult<Self> {
        let qr = QrRenderer::new(&QrConfig::default())
            .map_err(|e| ApiError::Internal(e.to_string()))?;
        let hub_config = HubConfig {
            max_connections: config.max_ws_connections,
        };

        Ok(Self {
            store,
            identity,
            config: Arc::new(config),
            invitation: Arc::new(InvitationProfile::default()),
            qr: Arc::new(qr),
            start_time: Instant::now(),
            ws_hub: Arc::new(ConnectionHub::new(hub_config)),
        })
    }

    /// Replace the invitation profile and QR endpoint
    pub fn with_invitation(
        mut self,
        profile: InvitationProfile,
        qr_config: &QrConfig,
    ) -> ApiResult<Self> {
        let qr = QrRenderer::new(qr_config).map_err(|e| ApiError::Internal(e.to_string()))?;
        self.invitation = Arc::new(profile);
        self.qr = Arc::new(qr);
        Ok(self)
    }

    /// Start pushing store snapshots to WebSocket clients
    pub fn start_live_updates(&self) -> JoinHandle<()> {
        spawn_snapshot_forwarder(Arc::clone(&self.ws_hub), Arc::clone(&self.store))
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Get WebSocket connection count
    pub async fn ws_connection_count(&self) -> usize {
        self.ws_hub.connection_count().await
    }
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Allowed CORS origins; empty allows any
    pub cors_origins: Vec<String>,
    /// Maximum request body size in bytes
    pub max_body_size: usize,
    /// Maximum concurrent WebSocket connections
    pub max_ws_connections: usize,
    /// Interval between SSE keep-alive comments
    pub sse_keep_alive_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8082,
            cors_origins: Vec::new(),
            max_body_size: 64 * 1024,
            max_ws_connections: 1000,
            sse_keep_alive_secs: 15,
        }
    }
}

impl ApiConfig {
    /// Create config with custom host and port
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
