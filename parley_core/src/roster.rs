//! Conversation participants.
//!
//! A [`Roster`] is the ordered set of agents visible in the scene: the
//! local user, the persona they chose to converse with, and any partner
//! the backend introduces mid-conversation. Order is insertion order and
//! drives ring placement, so the roster bumps a version counter whenever
//! it changes and layout is recomputed from scratch.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable string identifier for an agent.
///
/// The backend addresses agents by display name in conversation events,
/// so the id is the name as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(String);

impl AgentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AgentId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Per-agent color palette, indexed by roster position.
///
/// Same rotation for every session so a given seat always gets the same
/// color.
const PALETTE: [[u8; 3]; 6] = [
    [255, 100, 100], // Red
    [100, 100, 255], // Blue
    [255, 255, 100], // Yellow
    [100, 255, 255], // Cyan
    [255, 100, 255], // Magenta
    [255, 165, 0],   // Orange
];

const DEFAULT_GLYPH: &str = "💬";

/// A visualized conversation participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    /// Stable identifier (wire speaker name).
    pub id: AgentId,

    /// Display name shown next to the avatar.
    pub name: String,

    /// Avatar body color.
    pub color: [u8; 3],

    /// Emoji/icon glyph rendered on the avatar.
    pub glyph: String,

    /// True while the agent is currently speaking/engaged.
    pub active: bool,
}

impl Agent {
    /// Creates an inactive agent; color is assigned by the roster when
    /// the agent is inserted.
    pub fn new(id: impl Into<AgentId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: PALETTE[0],
            glyph: DEFAULT_GLYPH.to_string(),
            active: false,
        }
    }

    /// Sets an explicit color.
    pub fn with_color(mut self, color: [u8; 3]) -> Self {
        self.color = color;
        self
    }

    /// Sets the avatar glyph.
    pub fn with_glyph(mut self, glyph: impl Into<String>) -> Self {
        self.glyph = glyph.into();
        self
    }
}

impl From<&str> for Agent {
    /// Shorthand for wire-introduced partners: id and name coincide.
    fn from(name: &str) -> Self {
        Self::new(name, name)
    }
}

/// Ordered agent list with a change counter for layout invalidation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Roster {
    agents: Vec<Agent>,

    /// Incremented on every insertion; layout caches compare against it.
    version: u64,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a roster from the session's fixed starting agents.
    pub fn from_agents(agents: impl IntoIterator<Item = Agent>) -> Self {
        let mut roster = Self::new();
        for agent in agents {
            roster.insert(agent);
        }
        roster
    }

    /// Inserts an agent at the end of the ring, assigning a palette
    /// color when the agent still carries the default. Inserting an id
    /// that is already present is a no-op.
    pub fn insert(&mut self, mut agent: Agent) -> bool {
        if self.contains(&agent.id) {
            return false;
        }
        if agent.color == PALETTE[0] && !self.agents.is_empty() {
            agent.color = PALETTE[self.agents.len() % PALETTE.len()];
        }
        self.agents.push(agent);
        self.version += 1;
        true
    }

    pub fn contains(&self, id: &AgentId) -> bool {
        self.agents.iter().any(|a| &a.id == id)
    }

    pub fn get(&self, id: &AgentId) -> Option<&Agent> {
        self.agents.iter().find(|a| &a.id == id)
    }

    pub fn get_mut(&mut self, id: &AgentId) -> Option<&mut Agent> {
        self.agents.iter_mut().find(|a| &a.id == id)
    }

    /// Sets the activity flag, ignoring unknown ids.
    pub fn set_active(&mut self, id: &AgentId, active: bool) {
        if let Some(agent) = self.get_mut(id) {
            agent.active = active;
        }
    }

    /// Agents in ring order.
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    /// Ids in ring order, for layout.
    pub fn ids(&self) -> Vec<AgentId> {
        self.agents.iter().map(|a| a.id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Current change counter. Bumps whenever ring order could differ.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Clears activity flags without touching membership.
    pub fn clear_activity(&mut self) {
        for agent in &mut self.agents {
            agent.active = false;
        }
    }
}
