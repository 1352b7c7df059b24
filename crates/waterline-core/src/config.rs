// ── Runtime monitor configuration ──
//
// Describes *where* the feed lives and how often to poll it. Never touches
// disk: the CLI/TUI builds a `MonitorConfig` from the config crate and hands
// it in.

use std::time::Duration;

use url::Url;

/// Default background refresh period.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(60);

/// Default gauge capacity in centimetres.
pub const DEFAULT_MAX_LEVEL_CM: f64 = 30.0;

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (self-hosted feeds with self-signed certs).
    DangerAcceptInvalid,
}

/// Configuration for monitoring a single feed.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Feed URL. A `nocache` parameter is appended per request.
    pub endpoint: Url,
    /// TLS verification strategy.
    pub tls: TlsVerification,
    /// Request timeout.
    pub timeout: Duration,
    /// Background refresh period. Zero disables the refresh task.
    pub refresh_interval: Duration,
    /// Full-scale value for the level gauge.
    pub max_level_cm: f64,
}

impl MonitorConfig {
    /// Config for `endpoint` with every other field at its default.
    pub fn new(endpoint: Url) -> Self {
        Self {
            endpoint,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            max_level_cm: DEFAULT_MAX_LEVEL_CM,
        }
    }
}
