//! Ring placement for the agent roster.
//!
//! Agents sit evenly spaced on a circle on the ground plane. The mapping
//! is recomputed wholesale whenever the roster changes; nothing is moved
//! incrementally.

use crate::roster::AgentId;
use nalgebra::Vector3;
use std::collections::HashMap;
use std::f64::consts::TAU;

/// Default ring radius in scene units.
pub const DEFAULT_RING_RADIUS: f64 = 6.0;

/// Assigns each id a point on a ring of the given radius.
///
/// Point `i` of `n` sits at angle `2π·i/n` with `y = 0`. A single-agent
/// roster lands at angle 0; the count floors at 1 so an empty list is
/// simply an empty map, never a division by zero.
pub fn ring_layout(ids: &[AgentId], radius: f64) -> HashMap<AgentId, Vector3<f64>> {
    let count = ids.len().max(1) as f64;

    ids.iter()
        .enumerate()
        .map(|(i, id)| {
            let theta = TAU * i as f64 / count;
            let position = Vector3::new(radius * theta.cos(), 0.0, radius * theta.sin());
            (id.clone(), position)
        })
        .collect()
}

/// Cached layout keyed by roster version.
///
/// The scene asks for positions every frame; recomputing trigonometry
/// for an unchanged roster would be wasted work, so the cache holds the
/// last mapping and rebuilds only when the version moves.
#[derive(Debug, Clone)]
pub struct RingLayout {
    radius: f64,
    version: Option<u64>,
    positions: HashMap<AgentId, Vector3<f64>>,
}

impl RingLayout {
    pub fn new(radius: f64) -> Self {
        Self {
            radius,
            version: None,
            positions: HashMap::new(),
        }
    }

    /// Returns positions for the given roster ids, rebuilding if
    /// `roster_version` differs from the cached one.
    pub fn positions(
        &mut self,
        ids: &[AgentId],
        roster_version: u64,
    ) -> &HashMap<AgentId, Vector3<f64>> {
        if self.version != Some(roster_version) {
            self.positions = ring_layout(ids, self.radius);
            self.version = Some(roster_version);
        }
        &self.positions
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }
}

impl Default for RingLayout {
    fn default() -> Self {
        Self::new(DEFAULT_RING_RADIUS)
    }
}
