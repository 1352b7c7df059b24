//! Shared configuration for the waterline CLI and TUI.
//!
//! TOML profiles layered with environment overrides, and translation to
//! `waterline_core::MonitorConfig`. Both binaries depend on this crate; the
//! CLI adds `GlobalOpts`-aware wrappers on top.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use waterline_core::{MonitorConfig, TlsVerification};

/// Prefix for environment overrides, e.g. `WATERLINE_DEFAULTS__TIMEOUT=10`.
pub const ENV_PREFIX: &str = "WATERLINE_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found")]
    UnknownProfile { name: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration shared by CLI and TUI.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named feed profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Profile to use when none is given explicitly.
    pub fn active_profile_name(&self) -> &str {
        self.default_profile.as_deref().unwrap_or("default")
    }

    /// Look up `name`, or the default profile when `name` is `None`.
    pub fn profile(&self, name: Option<&str>) -> Result<(&str, &Profile), ConfigError> {
        let name = name.unwrap_or_else(|| self.active_profile_name());
        self.profiles
            .get_key_value(name)
            .map(|(k, p)| (k.as_str(), p))
            .ok_or_else(|| ConfigError::UnknownProfile { name: name.into() })
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default)]
    pub insecure: bool,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Background refresh period in seconds.
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval: u64,

    /// Gauge full-scale level.
    #[serde(default = "default_max_level_cm")]
    pub max_level_cm: f64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            insecure: false,
            timeout: default_timeout(),
            refresh_interval: default_refresh_interval(),
            max_level_cm: default_max_level_cm(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_refresh_interval() -> u64 {
    waterline_core::config::DEFAULT_REFRESH_INTERVAL.as_secs()
}
fn default_max_level_cm() -> f64 {
    waterline_core::config::DEFAULT_MAX_LEVEL_CM
}

/// A named feed profile.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Feed URL (e.g. a spreadsheet web-app `.../exec` endpoint).
    pub endpoint: String,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    pub insecure: Option<bool>,

    /// Override timeout.
    pub timeout: Option<u64>,

    /// Override refresh period.
    pub refresh_interval: Option<u64>,

    /// Override gauge full-scale level.
    pub max_level_cm: Option<f64>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("dev", "waterline", "waterline").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("waterline");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the full Config from `path` + environment. A missing file yields
/// defaults.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if loading fails.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Profile → MonitorConfig ─────────────────────────────────────────

/// Parse and validate a feed URL.
pub fn parse_endpoint(raw: &str) -> Result<url::Url, ConfigError> {
    let url: url::Url = raw.trim().parse().map_err(|e| ConfigError::Validation {
        field: "endpoint".into(),
        reason: format!("invalid URL '{raw}': {e}"),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::Validation {
            field: "endpoint".into(),
            reason: format!("unsupported scheme '{other}' (expected http or https)"),
        }),
    }
}

/// Build a `MonitorConfig` from a profile and global defaults, with no CLI
/// flag overrides. Suitable for the TUI and other non-CLI consumers.
pub fn profile_to_monitor_config(
    profile: &Profile,
    defaults: &Defaults,
) -> Result<MonitorConfig, ConfigError> {
    let endpoint = parse_endpoint(&profile.endpoint)?;

    let tls = if profile.insecure.unwrap_or(defaults.insecure) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    let max_level_cm = profile.max_level_cm.unwrap_or(defaults.max_level_cm);
    if !(max_level_cm.is_finite() && max_level_cm > 0.0) {
        return Err(ConfigError::Validation {
            field: "max_level_cm".into(),
            reason: format!("must be a positive number, got {max_level_cm}"),
        });
    }

    Ok(MonitorConfig {
        endpoint,
        tls,
        timeout: Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout)),
        refresh_interval: Duration::from_secs(
            profile.refresh_interval.unwrap_or(defaults.refresh_interval),
        ),
        max_level_cm,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn profile(endpoint: &str) -> Profile {
        Profile {
            endpoint: endpoint.into(),
            ..Profile::default()
        }
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.active_profile_name(), "default");
        assert_eq!(cfg.defaults.refresh_interval, 60);
        assert!(cfg.profiles.is_empty());
    }

    #[test]
    fn save_then_load_keeps_profiles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.profiles.insert(
            "tank".into(),
            Profile {
                refresh_interval: Some(15),
                ..profile("https://example.com/exec")
            },
        );
        cfg.default_profile = Some("tank".into());
        save_config_to(&cfg, &path).unwrap();

        let loaded = load_config_from(&path).unwrap();
        let (name, p) = loaded.profile(None).unwrap();
        assert_eq!(name, "tank");
        assert_eq!(p.endpoint, "https://example.com/exec");
        assert_eq!(p.refresh_interval, Some(15));
    }

    #[test]
    fn unknown_profile_is_an_error() {
        let cfg = Config::default();
        assert!(matches!(
            cfg.profile(Some("nope")),
            Err(ConfigError::UnknownProfile { .. })
        ));
    }

    #[test]
    fn profile_overrides_defaults() {
        let defaults = Defaults::default();
        let p = Profile {
            timeout: Some(5),
            max_level_cm: Some(50.0),
            insecure: Some(true),
            ..profile("https://example.com/exec?id=1")
        };
        let mc = profile_to_monitor_config(&p, &defaults).unwrap();
        assert_eq!(mc.timeout, Duration::from_secs(5));
        assert_eq!(mc.refresh_interval, Duration::from_secs(60));
        assert!((mc.max_level_cm - 50.0).abs() < f64::EPSILON);
        assert_eq!(mc.tls, TlsVerification::DangerAcceptInvalid);
        assert_eq!(mc.endpoint.query(), Some("id=1"));
    }

    #[test]
    fn custom_ca_when_secure() {
        let p = Profile {
            ca_cert: Some(PathBuf::from("/etc/ssl/feed.pem")),
            ..profile("https://example.com/exec")
        };
        let mc = profile_to_monitor_config(&p, &Defaults::default()).unwrap();
        assert_eq!(mc.tls, TlsVerification::CustomCa(PathBuf::from("/etc/ssl/feed.pem")));
    }

    #[test]
    fn rejects_bad_endpoints() {
        let defaults = Defaults::default();
        assert!(profile_to_monitor_config(&profile("not a url"), &defaults).is_err());
        assert!(profile_to_monitor_config(&profile("ftp://example.com/x"), &defaults).is_err());
    }

    #[test]
    fn rejects_non_positive_capacity() {
        let p = Profile {
            max_level_cm: Some(0.0),
            ..profile("https://example.com/exec")
        };
        assert!(matches!(
            profile_to_monitor_config(&p, &Defaults::default()),
            Err(ConfigError::Validation { .. })
        ));
    }
}
