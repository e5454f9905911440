//! Live feed socket client.
//!
//! Owns the WebSocket to the backend and turns its frames into
//! [`SessionEvent`]s on an unbounded channel. The frame loop drains that
//! channel once per frame, so socket delivery and rendering never share
//! mutable state; an event arriving mid-frame is simply observed on the
//! next one.
//!
//! Lifecycle: `Disconnected → Connecting → Connected`, and any open
//! state drops to `Disconnected` on close or error. `Disconnected` is
//! terminal until [`LiveFeed::reconnect`]: there is no automatic retry
//! and no timeout on the connection attempt.

use crate::config::FeedConfig;
use crate::error::FeedError;
use crate::protocol::{self, InboundEvent};
use futures_util::StreamExt;
use parley_core::{ConnectionState, SessionEvent};
use std::time::Instant;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::protocol::Message as WsMessage;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Socket client plus the event channel the frame loop drains.
pub struct LiveFeed {
    url: String,

    /// Session epoch: event timestamps are seconds since this instant,
    /// and a reconnect keeps it so timelines stay comparable.
    epoch: Instant,

    events_tx: mpsc::UnboundedSender<SessionEvent>,
    events_rx: mpsc::UnboundedReceiver<SessionEvent>,
    reader: Option<JoinHandle<()>>,
}

impl LiveFeed {
    /// Dials the backend socket. Emits `Connecting` then either
    /// `Connected` (and starts the read task) or `Disconnected` (and
    /// returns the error).
    pub async fn connect(config: &FeedConfig) -> Result<Self, FeedError> {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let mut feed = Self {
            url: config.ws_url(),
            epoch: Instant::now(),
            events_tx,
            events_rx,
            reader: None,
        };
        feed.dial().await?;
        Ok(feed)
    }

    async fn dial(&mut self) -> Result<(), FeedError> {
        let _ = self
            .events_tx
            .send(SessionEvent::Connection(ConnectionState::Connecting));

        match connect_async(self.url.as_str()).await {
            Ok((stream, _response)) => {
                info!(url = %self.url, "live feed connected");
                let _ = self
                    .events_tx
                    .send(SessionEvent::Connection(ConnectionState::Connected));
                let tx = self.events_tx.clone();
                let epoch = self.epoch;
                self.reader = Some(tokio::spawn(read_loop(stream, tx, epoch)));
                Ok(())
            }
            Err(err) => {
                warn!(url = %self.url, "live feed connect failed: {err}");
                let _ = self
                    .events_tx
                    .send(SessionEvent::Connection(ConnectionState::Disconnected));
                Err(err.into())
            }
        }
    }

    /// Manual reconnect after a drop. Keeps the original session epoch.
    pub async fn reconnect(&mut self) -> Result<(), FeedError> {
        self.stop_reader();
        self.dial().await
    }

    /// Drains every queued event without blocking. Called once per
    /// rendered frame.
    pub fn drain(&mut self) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.events_rx.try_recv() {
            events.push(event);
        }
        events
    }

    /// Waits for the next event. `None` once the feed is closed and the
    /// queue is empty.
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        self.events_rx.recv().await
    }

    /// Seconds since the session epoch.
    pub fn elapsed_secs(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64()
    }

    /// Explicit teardown: aborts the read task, which drops and thereby
    /// closes the socket. Safe to call more than once.
    pub fn close(&mut self) {
        self.stop_reader();
        debug!("live feed closed");
    }

    fn stop_reader(&mut self) {
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
    }
}

impl Drop for LiveFeed {
    fn drop(&mut self) {
        self.stop_reader();
    }
}

/// Reads frames until close or error, forwarding decoded turns. A frame
/// that fails to decode is dropped with a warning; the loop keeps
/// listening.
async fn read_loop(
    mut stream: WsStream,
    tx: mpsc::UnboundedSender<SessionEvent>,
    epoch: Instant,
) {
    while let Some(frame) = stream.next().await {
        match frame {
            Ok(WsMessage::Text(text)) => match protocol::decode_frame(&text) {
                Ok(InboundEvent::Turn(turn)) => {
                    let at = epoch.elapsed().as_secs_f64();
                    if tx.send(SessionEvent::Turn { at, turn }).is_err() {
                        return;
                    }
                }
                Ok(InboundEvent::Ignored) => {
                    debug!("ignoring unrecognized frame");
                }
                Err(err) => {
                    warn!("dropping malformed frame: {err}");
                }
            },
            Ok(WsMessage::Close(_)) => {
                info!("live feed closed by server");
                break;
            }
            // Pings are answered by the protocol layer; binary frames
            // are not part of this feed.
            Ok(_) => {}
            Err(err) => {
                warn!("live feed socket error: {err}");
                break;
            }
        }
    }

    let _ = tx.send(SessionEvent::Connection(ConnectionState::Disconnected));
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::SinkExt;
    use std::time::Duration;
    use tokio::net::TcpListener;

    const TURN_FRAME: &str = r#"{
        "type": "conversation_update",
        "data": {
            "conversation_id": "c1",
            "speaker": "Maya Chen",
            "message": "Hi!",
            "turn_number": 1,
            "is_finished": false
        }
    }"#;

    async fn next_with_timeout(feed: &mut LiveFeed) -> SessionEvent {
        tokio::time::timeout(Duration::from_secs(5), feed.next_event())
            .await
            .expect("timed out waiting for feed event")
            .expect("feed channel closed")
    }

    #[tokio::test]
    async fn test_feed_lifecycle_and_turn_delivery() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();

            ws.send(WsMessage::Text(TURN_FRAME.to_string()))
                .await
                .unwrap();
            // Malformed frame: dropped by the client, never surfaced.
            ws.send(WsMessage::Text("{not json".to_string()))
                .await
                .unwrap();
            // Unknown type: ignored.
            ws.send(WsMessage::Text(r#"{"type": "heartbeat"}"#.to_string()))
                .await
                .unwrap();
            ws.close(None).await.unwrap();
        });

        let config = FeedConfig::new("127.0.0.1", port);
        let mut feed = LiveFeed::connect(&config).await.unwrap();

        assert_eq!(
            next_with_timeout(&mut feed).await,
            SessionEvent::Connection(ConnectionState::Connecting)
        );
        assert_eq!(
            next_with_timeout(&mut feed).await,
            SessionEvent::Connection(ConnectionState::Connected)
        );

        match next_with_timeout(&mut feed).await {
            SessionEvent::Turn { at, turn } => {
                assert!(at >= 0.0);
                assert_eq!(turn.speaker, "Maya Chen");
            }
            other => panic!("expected turn, got {other:?}"),
        }

        // Both bad frames were swallowed; the next event is the drop.
        assert_eq!(
            next_with_timeout(&mut feed).await,
            SessionEvent::Connection(ConnectionState::Disconnected)
        );

        server.await.unwrap();
        feed.close();
    }

    #[tokio::test]
    async fn test_connect_failure_returns_error() {
        // Nothing is listening on the port we just closed.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let config = FeedConfig::new("127.0.0.1", port);
        assert!(LiveFeed::connect(&config).await.is_err());
    }
}
