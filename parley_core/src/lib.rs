//! Parley Core - playback and scene state for persona-conversation
//! visualization.
//!
//! This crate is the pure half of the visualizer: ring layout and Bezier
//! arcs, the seekable playback clock, the agent roster with speech
//! bubbles, transit orbs evaluated as a function of simulation time, and
//! the session reducer that folds live-feed events into all of the
//! above. No I/O lives here; the socket and HTTP boundary is
//! `parley_feed`, and rendering is the viewer's job.

pub mod bubble;
pub mod geometry;
pub mod layout;
pub mod playback;
pub mod roster;
pub mod session;
pub mod transit;

// Re-export the types the feed and viewer touch constantly.
pub use bubble::{Bubble, BubbleBoard};
pub use layout::RingLayout;
pub use playback::PlaybackClock;
pub use roster::{Agent, AgentId, Roster};
pub use session::{
    Applied, ConnectionState, ConversationTurn, Message, SessionEvent, SessionState,
};
pub use transit::{TransitConfig, TransitMarker};
