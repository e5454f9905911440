//! Endpoint and session configuration.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Where the backend lives and who we are to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Backend host.
    pub host: String,

    /// Backend port.
    pub port: u16,

    /// Use wss/https instead of ws/http.
    pub tls: bool,

    /// Client-generated opaque session token; the socket path and every
    /// API request carry it.
    pub session_id: String,
}

impl FeedConfig {
    /// Creates a config with a fresh session token.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            tls: false,
            session_id: Uuid::new_v4().to_string(),
        }
    }

    pub fn with_tls(mut self, tls: bool) -> Self {
        self.tls = tls;
        self
    }

    /// Socket endpoint: `ws(s)://host:port/ws/{session_id}`.
    pub fn ws_url(&self) -> String {
        let scheme = if self.tls { "wss" } else { "ws" };
        format!(
            "{}://{}:{}/ws/{}",
            scheme, self.host, self.port, self.session_id
        )
    }

    /// Base for API requests: `http(s)://host:port`.
    pub fn http_base(&self) -> String {
        let scheme = if self.tls { "https" } else { "http" };
        format!("{}://{}:{}", scheme, self.host, self.port)
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self::new("127.0.0.1", 8000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_builders() {
        let mut config = FeedConfig::new("localhost", 8000);
        config.session_id = "s-1".to_string();

        assert_eq!(config.ws_url(), "ws://localhost:8000/ws/s-1");
        assert_eq!(config.http_base(), "http://localhost:8000");

        let config = config.with_tls(true);
        assert_eq!(config.ws_url(), "wss://localhost:8000/ws/s-1");
        assert_eq!(config.http_base(), "https://localhost:8000");
    }

    #[test]
    fn test_session_tokens_are_unique() {
        let a = FeedConfig::new("h", 1);
        let b = FeedConfig::new("h", 1);
        assert_ne!(a.session_id, b.session_id);
    }
}
