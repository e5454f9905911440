//! The viewer session: owns every moving part and the frame loop.
//!
//! Construction wires the feed, state, clock, and renderer together;
//! teardown (normal exit, finished conversation, or Ctrl-C) closes the
//! socket and drops the bubble tokens on every path. All mutation
//! happens on the frame callback; the socket task only ever talks to
//! us through the drained event channel.

use crate::render::SceneRenderer;
use anyhow::Result;
use parley_core::bubble::BubbleBoard;
use parley_core::layout::RingLayout;
use parley_core::playback::PlaybackClock;
use parley_core::roster::Agent;
use parley_core::session::{Applied, ConnectionState, SessionEvent, SessionState};
use parley_core::transit::{visible_markers, TransitConfig};
use parley_feed::{ApiClient, FeedConfig, LiveFeed, StartConversationRequest};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Frame cadence of the viewer loop.
const FRAME_INTERVAL: Duration = Duration::from_millis(33);

/// Options the CLI hands to the session.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub target_profile_id: String,
    pub user_profile_id: Option<String>,
    pub max_turns: u32,
    pub enable_research: bool,
    pub message_pause_seconds: f64,
    pub speed: f64,
    pub duration_override: Option<f64>,
}

/// Everything one viewing session owns.
pub struct ViewerSession {
    config: FeedConfig,
    options: SessionOptions,

    state: SessionState,
    clock: PlaybackClock,
    layout: RingLayout,
    bubbles: BubbleBoard,
    transit: TransitConfig,

    feed: LiveFeed,
    api: ApiClient,
    renderer: SceneRenderer,

    /// Set once a start request was accepted, so the loop knows a
    /// finished conversation means "done" rather than "not begun".
    started: bool,
}

impl ViewerSession {
    /// Connects the feed, resolves display names from the persona
    /// directory, and builds the starting roster (local user plus the
    /// chosen persona).
    pub async fn connect(
        config: FeedConfig,
        options: SessionOptions,
        renderer: SceneRenderer,
    ) -> Result<Self> {
        let api = ApiClient::new(&config);
        let feed = LiveFeed::connect(&config).await?;

        // Display names come from the persona directory; a missing or
        // unreachable listing degrades to raw ids instead of failing
        // the session.
        let profiles = match api.profiles().await {
            Ok(profiles) => profiles,
            Err(err) => {
                warn!("profile listing unavailable: {err}");
                Default::default()
            }
        };

        let user_name = options
            .user_profile_id
            .as_ref()
            .and_then(|id| profiles.get(id))
            .map(|p| p.name.clone())
            .unwrap_or_else(|| "You".to_string());
        let target_name = match profiles.get(&options.target_profile_id) {
            Some(profile) => profile.name.clone(),
            None => {
                // Absent profile id: keep the ring usable with the raw id.
                warn!(
                    "target profile '{}' not in directory",
                    options.target_profile_id
                );
                options.target_profile_id.clone()
            }
        };

        let local_user = Agent::new(user_name.as_str(), user_name.as_str()).with_glyph("🧑");
        let target = Agent::new(target_name.as_str(), target_name.as_str()).with_glyph("🤖");
        let state = SessionState::new(local_user, [target]);

        let mut clock = match options.duration_override {
            Some(duration) => PlaybackClock::with_duration_override(duration),
            None => PlaybackClock::new(),
        };
        clock.set_speed(options.speed);
        clock.play();

        Ok(Self {
            config,
            options,
            state,
            clock,
            layout: RingLayout::default(),
            bubbles: BubbleBoard::new(),
            transit: TransitConfig::default(),
            feed,
            api,
            renderer,
            started: false,
        })
    }

    /// Issues the start request. Guarded: a session that is not in an
    /// observed `Connected` state skips the request entirely; it is
    /// never queued for later.
    pub async fn start_conversation(&mut self) {
        self.pump_feed(Instant::now());

        if self.state.connection() != ConnectionState::Connected {
            warn!(
                "not connected ({}); start request skipped",
                self.state.connection()
            );
            return;
        }

        let request = StartConversationRequest {
            session_id: self.config.session_id.clone(),
            target_profile_id: self.options.target_profile_id.clone(),
            user_profile_id: self.options.user_profile_id.clone(),
            max_turns: self.options.max_turns,
            enable_research: self.options.enable_research,
            message_pause_seconds: self.options.message_pause_seconds,
        };

        match self.api.start_conversation(&request).await {
            Ok(started) => {
                info!(
                    "conversation {} started: {} ↔ {}",
                    started.conversation_id,
                    started.user_profile.as_deref().unwrap_or("?"),
                    started.target_profile.as_deref().unwrap_or("?"),
                );
                self.state.apply(SessionEvent::ConversationStarted {
                    conversation_id: started.conversation_id,
                });
                self.started = true;
            }
            Err(err) => {
                // Revert-only failure: no agent added, no message appended.
                warn!("start request failed: {err}");
                self.state.apply(SessionEvent::StartFailed);
            }
        }
    }

    /// Runs the frame loop until the conversation plays out or Ctrl-C.
    pub async fn run(&mut self) -> Result<()> {
        let mut ticker = tokio::time::interval(FRAME_INTERVAL);
        let mut last_frame = Instant::now();

        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    info!("interrupted; tearing down session");
                    break;
                }
                _ = ticker.tick() => {
                    let now = Instant::now();
                    let dt = now.duration_since(last_frame).as_secs_f64();
                    last_frame = now;
                    self.frame(now, dt);

                    if self.finished() {
                        info!("conversation played out");
                        break;
                    }
                }
            }
        }

        self.teardown();
        Ok(())
    }

    /// One cooperative frame: drain the feed, reduce, sweep bubbles,
    /// advance the clock, render.
    fn frame(&mut self, now: Instant, dt: f64) {
        self.pump_feed(now);

        // Real-time bubble clears, independent of playback speed. An
        // expiring bubble also retires the avatar's activity highlight.
        for id in self.bubbles.sweep(now) {
            self.state.roster.set_active(&id, false);
        }

        self.clock.advance(dt);

        let ids = self.state.roster.ids();
        let positions = self.layout.positions(&ids, self.state.roster.version());
        let markers = visible_markers(
            self.state.messages(),
            positions,
            self.clock.current(),
            &self.transit,
        );

        if self.renderer.is_enabled() {
            self.renderer.set_time(self.clock.current());
            self.renderer.log_avatars(self.state.roster.agents(), positions);
            self.renderer
                .log_bubbles(self.state.roster.agents(), &self.bubbles, positions);
            self.renderer.log_markers(&markers);
        } else {
            debug!(
                "t={:.2}s | {} | messages={} | in-flight={}",
                self.clock.current(),
                self.state.connection(),
                self.state.messages().len(),
                markers.len(),
            );
        }
    }

    /// Applies every event the socket queued since the last frame.
    fn pump_feed(&mut self, now: Instant) {
        for event in self.feed.drain() {
            match self.state.apply(event) {
                Applied::Message(index) => {
                    let message = &self.state.messages()[index];
                    info!("{}: {}", message.speaker, message.text);
                    self.clock.cover(message.born_at);
                    self.bubbles
                        .show(message.speaker.clone(), message.text.clone(), now);
                }
                Applied::Control { finished } => {
                    if finished {
                        info!("conversation finished");
                        self.renderer.log_status("conversation finished");
                    }
                }
                Applied::Connection(connection) => {
                    info!("live feed {connection}");
                    self.renderer.log_status(&connection.to_string());
                    if connection == ConnectionState::Disconnected {
                        info!("no automatic retry; rerun with the same session to reconnect");
                    }
                }
                Applied::Running(running) => {
                    debug!("running flag now {running}");
                }
            }
        }
    }

    /// Done when a started conversation has finished and the clock has
    /// played out the trailing margin.
    fn finished(&self) -> bool {
        self.started && !self.state.is_running() && self.clock.at_end()
    }

    /// Releases the socket and every pending bubble token. Safe on any
    /// exit path.
    fn teardown(&mut self) {
        self.feed.close();
        self.bubbles.clear();
    }
}
