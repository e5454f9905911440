//! Error types for the feed boundary.

use thiserror::Error;

/// Errors surfaced by the socket client and the HTTP API client.
#[derive(Debug, Error)]
pub enum FeedError {
    /// WebSocket connect/handshake/transport failure.
    #[error("Socket error: {0}")]
    Socket(#[from] tokio_tungstenite::tungstenite::Error),

    /// HTTP transport failure (connect, TLS, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("HTTP status {status} from {endpoint}")]
    Status { endpoint: String, status: u16 },

    /// A frame or response body failed to decode. For socket frames
    /// this is fatal only to the single event.
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// An operation that requires an open socket was attempted without
    /// one.
    #[error("Socket is not connected")]
    NotConnected,
}

impl FeedError {
    /// Creates a status error for an endpoint.
    pub fn status(endpoint: impl Into<String>, status: u16) -> Self {
        Self::Status {
            endpoint: endpoint.into(),
            status,
        }
    }
}
