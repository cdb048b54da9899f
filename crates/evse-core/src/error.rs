// ── Core error types ──
//
// Errors surfaced by evse-core. Panel loaders and mutation flows turn these
// into degraded views and notices; only direct callers of `Panel::client()`
// or `TelemetryPoller::start()` see them as values. The
// `From<evse_api::Error>` impl translates transport failures into
// domain-appropriate variants.

use thiserror::Error;
use tracing::debug;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to device at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Device did not answer within {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Device errors ────────────────────────────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    #[error("Operation rejected by device: {message}")]
    Rejected { message: String },

    // ── Operation errors ─────────────────────────────────────────────
    /// Client-side input check. The message is shown to the operator as-is.
    #[error("{message}")]
    ValidationFailed { message: String },

    #[error("Telemetry polling is already running")]
    AlreadyPolling,

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<evse_api::Error> for CoreError {
    fn from(err: evse_api::Error) -> Self {
        debug!(
            error = %err,
            status = ?err.status(),
            transient = err.is_transient(),
            "device call failed"
        );
        match err {
            evse_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: 0 }
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            evse_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            evse_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            evse_api::Error::Http { status, body } => CoreError::Api {
                message: if body.is_empty() {
                    format!("HTTP {status}")
                } else {
                    format!("HTTP {status}: {body}")
                },
                status: Some(status),
            },
            evse_api::Error::Rejected { message } => CoreError::Rejected { message },
            evse_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_errors_keep_their_status() {
        let err = CoreError::from(evse_api::Error::Http {
            status: 404,
            body: String::new(),
        });
        assert!(matches!(err, CoreError::Api { status: Some(404), .. }));
        assert_eq!(err.to_string(), "API error: HTTP 404");
    }

    #[test]
    fn timeouts_carry_the_bound() {
        let err = CoreError::from(evse_api::Error::Timeout { timeout_secs: 3 });
        assert!(matches!(err, CoreError::Timeout { timeout_secs: 3 }));
    }

    #[test]
    fn validation_message_is_verbatim() {
        let err = CoreError::ValidationFailed {
            message: "Card ID must be 8 digits".into(),
        };
        assert_eq!(err.to_string(), "Card ID must be 8 digits");
    }
}
