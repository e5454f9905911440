//! Session state and the feed-event reducer.
//!
//! All shared mutation funnels through [`SessionState::apply`]: the live
//! feed translates socket traffic into [`SessionEvent`] values and the
//! frame loop reduces them one at a time. The reducer is pure state →
//! state logic with no I/O, so every transition is testable without a
//! socket or a runtime.

use crate::roster::{Agent, AgentId, Roster};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Speaker name the backend uses for control signals rather than chat
/// lines.
pub const SYSTEM_SPEAKER: &str = "system";

/// Socket lifecycle as observed by the rest of the system.
///
/// Only the socket client transitions this; everything else reads it.
/// `Disconnected` is terminal until an explicit reconnect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionState {
    Connecting,
    Connected,
    Disconnected,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connecting => write!(f, "connecting"),
            Self::Connected => write!(f, "connected"),
            Self::Disconnected => write!(f, "disconnected"),
        }
    }
}

/// One decoded conversation-update payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub conversation_id: String,

    /// Speaker display name; `"system"` marks a control signal.
    pub speaker: String,

    pub message: String,

    /// Turn counter from the backend; negative on backend-side errors.
    pub turn_number: i64,

    #[serde(default)]
    pub is_finished: bool,

    /// Optional per-axis compatibility scores attached by the backend.
    #[serde(default)]
    pub compatibility_scores: Option<HashMap<String, f64>>,
}

/// An immutable entry in the session's message log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Derived identifier: conversation id plus turn number.
    pub id: String,

    pub speaker: AgentId,

    /// Where the transit orb lands.
    pub recipient: AgentId,

    pub text: String,

    /// Emission timestamp in simulation seconds (seconds since the
    /// session epoch at the moment the event arrived).
    pub born_at: f64,

    pub turn_number: i64,

    pub compatibility_scores: Option<HashMap<String, f64>>,
}

/// Everything the reducer consumes.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// A conversation update that arrived `at` seconds into the session.
    Turn { at: f64, turn: ConversationTurn },

    /// Socket lifecycle transition.
    Connection(ConnectionState),

    /// A start request was accepted by the backend.
    ConversationStarted { conversation_id: String },

    /// A start request failed; the running flag reverts and nothing
    /// else is touched.
    StartFailed,
}

/// What a single `apply` did, so the caller can react (show a bubble,
/// refresh the layout) without diffing the whole state.
#[derive(Debug, Clone, PartialEq)]
pub enum Applied {
    /// A message was appended at this index in the log.
    Message(usize),

    /// A system control signal; `finished` when the conversation ended.
    Control { finished: bool },

    /// Connection state changed.
    Connection(ConnectionState),

    /// Running flag changed.
    Running(bool),
}

/// The session's visible state: roster, message log, running flag, and
/// connection status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    /// The local participant; always part of the starting roster.
    local_user: AgentId,

    /// Starting roster, kept so a reset restores the original ring.
    initial: Vec<Agent>,

    pub roster: Roster,

    messages: Vec<Message>,

    running: bool,

    connection: ConnectionState,
}

impl SessionState {
    /// Creates a session around the fixed starting roster. The first
    /// agent is the local user.
    pub fn new(local_user: Agent, others: impl IntoIterator<Item = Agent>) -> Self {
        let local_id = local_user.id.clone();
        let mut initial = vec![local_user];
        initial.extend(others);
        let roster = Roster::from_agents(initial.iter().cloned());

        Self {
            local_user: local_id,
            initial,
            roster,
            messages: Vec::new(),
            running: false,
            connection: ConnectionState::Disconnected,
        }
    }

    /// Reduces one event into the state.
    pub fn apply(&mut self, event: SessionEvent) -> Applied {
        match event {
            SessionEvent::Turn { at, turn } => self.apply_turn(at, turn),
            SessionEvent::Connection(next) => {
                self.connection = next;
                Applied::Connection(next)
            }
            SessionEvent::ConversationStarted { .. } => {
                self.running = true;
                Applied::Running(true)
            }
            SessionEvent::StartFailed => {
                self.running = false;
                Applied::Running(false)
            }
        }
    }

    fn apply_turn(&mut self, at: f64, turn: ConversationTurn) -> Applied {
        // Control signals never reach the message log.
        if turn.speaker == SYSTEM_SPEAKER {
            if turn.is_finished {
                self.running = false;
            }
            return Applied::Control {
                finished: turn.is_finished,
            };
        }

        let speaker = AgentId::new(turn.speaker.as_str());

        // A speaker the ring has not seen yet is a dynamically
        // introduced partner; inserting it invalidates the layout.
        if !self.roster.contains(&speaker) {
            self.roster.insert(Agent::from(turn.speaker.as_str()));
        }

        let recipient = self.recipient_for(&speaker);

        let message = Message {
            id: format!("{}-{}", turn.conversation_id, turn.turn_number),
            speaker: speaker.clone(),
            recipient,
            text: turn.message,
            born_at: at,
            turn_number: turn.turn_number,
            compatibility_scores: turn.compatibility_scores,
        };

        self.roster.set_active(&speaker, true);
        let local = self.local_user.clone();
        self.roster.set_active(&local, true);

        self.messages.push(message);
        Applied::Message(self.messages.len() - 1)
    }

    /// The orb's destination: the previous distinct speaker, else the
    /// first other agent on the ring, else (degenerate single-agent
    /// roster) the speaker itself.
    fn recipient_for(&self, speaker: &AgentId) -> AgentId {
        if let Some(prev) = self
            .messages
            .iter()
            .rev()
            .find(|m| &m.speaker != speaker)
        {
            return prev.speaker.clone();
        }
        if &self.local_user != speaker {
            return self.local_user.clone();
        }
        self.roster
            .agents()
            .iter()
            .map(|a| &a.id)
            .find(|id| *id != speaker)
            .unwrap_or(speaker)
            .clone()
    }

    /// Append-only message log in arrival order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Latest emission timestamp, for deriving the playback duration.
    pub fn max_born_at(&self) -> Option<f64> {
        self.messages
            .iter()
            .map(|m| m.born_at)
            .fold(None, |acc, t| Some(acc.map_or(t, |a: f64| a.max(t))))
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn connection(&self) -> ConnectionState {
        self.connection
    }

    pub fn local_user(&self) -> &AgentId {
        &self.local_user
    }

    /// Restores the starting roster and clears the message log. The
    /// connection state is whatever the socket last reported; resetting
    /// the view does not touch the wire.
    pub fn reset(&mut self) {
        self.roster = Roster::from_agents(self.initial.iter().cloned());
        self.messages.clear();
        self.running = false;
    }
}
