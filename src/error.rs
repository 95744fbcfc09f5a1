//! Error types for the simulator queue client.

use thiserror::Error;

/// Errors that can occur when talking to the queue backend, the push channel,
/// or a simulator PC launcher.
#[derive(Debug, Error)]
pub enum QueueClientError {
    /// Failed to write to the push transport (the close handshake).
    #[error("transport send error: {0}")]
    TransportSend(String),

    /// Failed to receive a message from the push transport.
    #[error("transport receive error: {0}")]
    TransportReceive(String),

    /// The push transport connection was closed.
    #[error("transport connection closed")]
    TransportClosed,

    /// Failed to serialize or deserialize a payload.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The backend answered with a non-success status code.
    #[error("backend returned {status}: {message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Response body or reason phrase.
        message: String,
    },

    /// The request never produced a response (DNS, connect, TLS, body read).
    #[error("request failed: {0}")]
    Request(String),

    /// Input was rejected before any network call was made.
    #[error("invalid input: {0}")]
    Validation(String),

    /// A simulator PC launcher call failed.
    #[error("launcher error: {0}")]
    Launcher(String),

    /// The owning view has been torn down.
    #[error("client closed")]
    Closed,

    /// An operation timed out.
    #[error("operation timed out")]
    Timeout,

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl QueueClientError {
    /// Returns `true` for failures worth retrying on the next refresh tick.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http { status, .. } => *status >= 500 || *status == 408 || *status == 429,
            Self::Request(_)
            | Self::Timeout
            | Self::Io(_)
            | Self::TransportSend(_)
            | Self::TransportReceive(_)
            | Self::TransportClosed
            | Self::Launcher(_) => true,
            Self::Serialization(_) | Self::Validation(_) | Self::Closed => false,
        }
    }
}

/// A specialized [`Result`] type for queue client operations.
pub type Result<T> = std::result::Result<T, QueueClientError>;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_are_transient() {
        let err = QueueClientError::Http {
            status: 503,
            message: "unavailable".into(),
        };
        assert!(err.is_transient());
    }

    #[test]
    fn client_errors_are_not_transient() {
        let err = QueueClientError::Http {
            status: 404,
            message: "Fila não encontrada".into(),
        };
        assert!(!err.is_transient());
        assert!(!QueueClientError::Validation("empty".into()).is_transient());
    }

    #[test]
    fn http_error_display_includes_status() {
        let err = QueueClientError::Http {
            status: 400,
            message: "bad position".into(),
        };
        assert_eq!(err.to_string(), "backend returned 400: bad position");
    }
}
