//! In-flight message orbs.
//!
//! A transit marker is a pure function of simulation time: given a
//! message's emission timestamp and the transit duration, the marker
//! either does not exist (before emission / after arrival) or sits at
//! the Bezier arc position for its normalized progress. There is no
//! imperative animation state, which is what makes backward seeks free:
//! re-evaluating at an earlier clock value simply yields a different
//! visible set.

use crate::geometry::ArcPath;
use crate::roster::AgentId;
use crate::session::Message;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Tunables for the transit animation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TransitConfig {
    /// Seconds of simulation time an orb spends in flight.
    pub transit_secs: f64,

    /// Arc apex height above the ground plane.
    pub arc_height: f64,
}

impl Default for TransitConfig {
    fn default() -> Self {
        Self {
            transit_secs: 4.0,
            arc_height: 2.0,
        }
    }
}

/// A visible orb at one instant of simulation time.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitMarker {
    /// Index of the message in the session log.
    pub message_index: usize,

    /// Normalized flight progress in `[0, 1]`.
    pub progress: f64,

    /// Scene position along the arc.
    pub position: Vector3<f64>,
}

/// Normalized progress for one message, or `None` outside the flight
/// window.
pub fn progress_at(message: &Message, now: f64, transit_secs: f64) -> Option<f64> {
    let t = (now - message.born_at) / transit_secs;
    if !(0.0..=1.0).contains(&t) {
        return None;
    }
    Some(t)
}

/// Evaluates every message against the clock and returns the orbs that
/// are currently in flight, in log order.
///
/// Messages whose speaker or recipient has no ring position (roster and
/// layout briefly out of step within a frame) are skipped rather than
/// guessed at; they show up once the layout catches up.
pub fn visible_markers(
    messages: &[Message],
    positions: &HashMap<AgentId, Vector3<f64>>,
    now: f64,
    config: &TransitConfig,
) -> Vec<TransitMarker> {
    messages
        .iter()
        .enumerate()
        .filter_map(|(index, message)| {
            let progress = progress_at(message, now, config.transit_secs)?;
            let from = positions.get(&message.speaker)?;
            let to = positions.get(&message.recipient)?;
            let arc = ArcPath::between(from, to, config.arc_height);
            Some(TransitMarker {
                message_index: index,
                progress,
                position: arc.position_at(progress),
            })
        })
        .collect()
}
