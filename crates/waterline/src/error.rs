//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use waterline_config::ConfigError;
use waterline_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const CONFIG: i32 = 3;
    pub const NO_DATA: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Feed ─────────────────────────────────────────────────────────
    #[error("Could not reach the feed at {url}")]
    #[diagnostic(
        code(waterline::connection_failed),
        help(
            "Check the endpoint URL and your network connection.\n\
             Cause: {reason}"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Feed returned HTTP {status}")]
    #[diagnostic(
        code(waterline::http_status),
        help("The feed answered but rejected the request: {message}")
    )]
    Http { status: u16, message: String },

    #[error("Feed returned data that is not JSON")]
    #[diagnostic(
        code(waterline::invalid_payload),
        help(
            "The endpoint may be serving an HTML error page.\n\
             Details: {message}"
        )
    )]
    InvalidPayload { message: String },

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(waterline::timeout),
        help("Increase the timeout with --timeout or check the feed's responsiveness.")
    )]
    Timeout { seconds: u64 },

    #[error("The feed has no readings")]
    #[diagnostic(
        code(waterline::no_data),
        help("The feed responded, but no record carried a usable timestamp.")
    )]
    NoData,

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(waterline::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(waterline::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: waterline config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No feed endpoint configured")]
    #[diagnostic(
        code(waterline::no_config),
        help(
            "Create a profile with: waterline config init\n\
             Or pass --endpoint / set WATERLINE_ENDPOINT.\n\
             Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(waterline::config))]
    Config(Box<ConfigError>),

    // ── Export ───────────────────────────────────────────────────────
    #[error("Refusing to overwrite {path}")]
    #[diagnostic(
        code(waterline::file_exists),
        help("Pass --force to replace it, or choose another --file.")
    )]
    FileExists { path: String },

    #[error("Export failed: {message}")]
    #[diagnostic(code(waterline::export))]
    Export { message: String },

    #[error("Internal error: {0}")]
    #[diagnostic(code(waterline::internal))]
    Internal(String),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render JSON: {0}")]
    #[diagnostic(code(waterline::json))]
    Json(#[from] serde_json::Error),

    #[error("Failed to render YAML: {0}")]
    #[diagnostic(code(waterline::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::Http { .. } | Self::InvalidPayload { .. } => {
                exit_code::CONNECTION
            }
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::NoData => exit_code::NO_DATA,
            Self::Validation { .. } | Self::FileExists { .. } => exit_code::USAGE,
            Self::ProfileNotFound { .. } | Self::NoConfig { .. } | Self::Config(_) => {
                exit_code::CONFIG
            }
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => Self::ConnectionFailed { url, reason },
            CoreError::Timeout { timeout_secs } => Self::Timeout {
                seconds: timeout_secs,
            },
            CoreError::Http { status, message } => Self::Http { status, message },
            CoreError::InvalidPayload { message } => Self::InvalidPayload { message },
            CoreError::Config { message } => Self::Validation {
                field: "config".into(),
                reason: message,
            },
            CoreError::Export { message } => Self::Export { message },
            CoreError::Internal(message) => Self::Internal(message),
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::UnknownProfile { name } => Self::ProfileNotFound {
                name,
                available: String::new(),
            },
            other => Self::Config(Box::new(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_keep_their_exit_codes() {
        let err = CliError::from(CoreError::Timeout { timeout_secs: 5 });
        assert_eq!(err.exit_code(), exit_code::TIMEOUT);

        let err = CliError::from(CoreError::ConnectionFailed {
            url: "https://example.com".into(),
            reason: "refused".into(),
        });
        assert_eq!(err.exit_code(), exit_code::CONNECTION);

        let err = CliError::from(CoreError::Http {
            status: 404,
            message: "missing".into(),
        });
        assert!(matches!(err, CliError::Http { status: 404, .. }));
    }

    #[test]
    fn config_validation_is_a_usage_error() {
        let err = CliError::from(ConfigError::Validation {
            field: "endpoint".into(),
            reason: "bad".into(),
        });
        assert_eq!(err.exit_code(), exit_code::USAGE);
        assert_eq!(CliError::NoData.exit_code(), exit_code::NO_DATA);
    }
}
