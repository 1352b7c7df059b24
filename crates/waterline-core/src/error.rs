// ── Core error types ──
//
// User-facing errors from waterline-core. Consumers never see reqwest or
// serde errors directly; the `From<waterline_api::Error>` impl translates
// transport-layer failures into domain variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Feed errors ──────────────────────────────────────────────────
    #[error("Cannot reach feed at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Feed request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("Feed returned HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Feed returned an unreadable payload: {message}")]
    InvalidPayload { message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Export errors ────────────────────────────────────────────────
    #[error("Export failed: {message}")]
    Export { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Whether the next refresh tick may succeed without user action.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::ConnectionFailed { .. } | Self::Timeout { .. } => true,
            Self::Http { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<waterline_api::Error> for CoreError {
    fn from(err: waterline_api::Error) -> Self {
        match err {
            waterline_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: 0 }
                } else if let Some(status) = e.status() {
                    CoreError::Http {
                        status: status.as_u16(),
                        message: e.to_string(),
                    }
                } else {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                }
            }
            waterline_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            waterline_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            waterline_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            waterline_api::Error::Http { status, body } => CoreError::Http {
                status,
                message: body,
            },
            waterline_api::Error::Deserialization { message, body: _ } => {
                CoreError::InvalidPayload { message }
            }
        }
    }
}

impl From<csv::Error> for CoreError {
    fn from(err: csv::Error) -> Self {
        CoreError::Export {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_http_error_keeps_status() {
        let err: CoreError = waterline_api::Error::Http {
            status: 503,
            body: "maintenance".into(),
        }
        .into();
        assert!(matches!(err, CoreError::Http { status: 503, .. }));
        assert!(err.is_transient());
    }

    #[test]
    fn api_deserialization_becomes_invalid_payload() {
        let err: CoreError = waterline_api::Error::Deserialization {
            message: "expected value at line 1".into(),
            body: "<html>".into(),
        }
        .into();
        assert!(matches!(err, CoreError::InvalidPayload { .. }));
        assert!(!err.is_transient());
    }

    #[test]
    fn api_timeout_is_transient() {
        let err: CoreError = waterline_api::Error::Timeout { timeout_secs: 30 }.into();
        assert_eq!(err.to_string(), "Feed request timed out after 30s");
        assert!(err.is_transient());
    }
}
