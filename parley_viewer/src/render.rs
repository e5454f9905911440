//! Rerun scene renderer.
//!
//! Optional and feature-gated: without the `visualization` feature every
//! call is a no-op and the viewer runs headless, logging frame summaries
//! instead.
//!
//! # What Gets Logged
//!
//! - Avatar bodies as colored points on the ring (dimmed when inactive)
//! - Speech bubbles as labeled points above the speaking avatar
//! - Transit orbs at their Bezier arc positions
//! - Simulation time on the `sim_time` timeline

use nalgebra::Vector3;
use parley_core::bubble::BubbleBoard;
use parley_core::roster::{Agent, AgentId};
use parley_core::transit::TransitMarker;
use std::collections::HashMap;

#[cfg(feature = "visualization")]
use rerun::{Color, Points3D, Position3D, Radius, RecordingStream};

/// Vertical offset of a bubble above its avatar.
#[cfg(feature = "visualization")]
const BUBBLE_LIFT: f64 = 2.2;

/// Inactive avatars keep a third of their color.
fn dimmed(color: [u8; 3]) -> [u8; 3] {
    [color[0] / 3, color[1] / 3, color[2] / 3]
}

/// Scene logger backed by the Rerun SDK.
pub struct SceneRenderer {
    #[cfg(feature = "visualization")]
    rec: Option<RecordingStream>,

    /// Whether rendering is enabled.
    enabled: bool,
}

impl SceneRenderer {
    /// Creates a renderer with rendering disabled.
    pub fn disabled() -> Self {
        Self {
            #[cfg(feature = "visualization")]
            rec: None,
            enabled: false,
        }
    }

    /// Creates a renderer streaming to a spawned Rerun viewer.
    #[cfg(feature = "visualization")]
    pub fn new(name: &str) -> Self {
        match rerun::RecordingStreamBuilder::new(name).spawn() {
            Ok(rec) => {
                tracing::info!("Rerun viewer spawned - scene streaming enabled");
                Self {
                    rec: Some(rec),
                    enabled: true,
                }
            }
            Err(e) => {
                tracing::warn!("Failed to initialize Rerun: {:?}", e);
                Self {
                    rec: None,
                    enabled: false,
                }
            }
        }
    }

    /// Creates a renderer - disabled when the feature is not compiled in.
    #[cfg(not(feature = "visualization"))]
    pub fn new(_name: &str) -> Self {
        tracing::info!("Scene rendering not available (compile with --features visualization)");
        Self::disabled()
    }

    /// Returns whether rendering is enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Sets the simulation time for subsequent logs.
    #[cfg(feature = "visualization")]
    pub fn set_time(&self, seconds: f64) {
        if let Some(ref rec) = self.rec {
            rec.set_time_seconds("sim_time", seconds);
        }
    }

    #[cfg(not(feature = "visualization"))]
    pub fn set_time(&self, _seconds: f64) {}

    /// Logs avatar bodies at their ring positions, one entity path per
    /// agent so colors and labels track membership changes.
    #[cfg(feature = "visualization")]
    pub fn log_avatars(&self, agents: &[Agent], positions: &HashMap<AgentId, Vector3<f64>>) {
        if let Some(ref rec) = self.rec {
            for agent in agents {
                let Some(pos) = positions.get(&agent.id) else {
                    continue;
                };
                let color = if agent.active {
                    agent.color
                } else {
                    dimmed(agent.color)
                };

                let _ = rec.log(
                    format!("scene/avatars/{}", agent.id),
                    &Points3D::new([Position3D::new(
                        pos.x as f32,
                        pos.y as f32,
                        pos.z as f32,
                    )])
                    .with_colors([Color::from_rgb(color[0], color[1], color[2])])
                    .with_radii([Radius::new_scene_units(0.8)])
                    .with_labels([format!("{} {}", agent.glyph, agent.name)]),
                );
            }
        }
    }

    #[cfg(not(feature = "visualization"))]
    pub fn log_avatars(&self, _agents: &[Agent], _positions: &HashMap<AgentId, Vector3<f64>>) {}

    /// Logs live speech bubbles above their avatars. Cleared bubbles
    /// are logged as empty point sets so they disappear from the scene.
    #[cfg(feature = "visualization")]
    pub fn log_bubbles(
        &self,
        agents: &[Agent],
        bubbles: &BubbleBoard,
        positions: &HashMap<AgentId, Vector3<f64>>,
    ) {
        if let Some(ref rec) = self.rec {
            for agent in agents {
                let path = format!("scene/bubbles/{}", agent.id);
                let Some(bubble) = bubbles.get(&agent.id) else {
                    let _ = rec.log(path, &Points3D::new(Vec::<Position3D>::new()));
                    continue;
                };
                let Some(pos) = positions.get(&agent.id) else {
                    continue;
                };

                let _ = rec.log(
                    path,
                    &Points3D::new([Position3D::new(
                        pos.x as f32,
                        (pos.y + BUBBLE_LIFT) as f32,
                        pos.z as f32,
                    )])
                    .with_colors([Color::from_rgb(240, 240, 240)])
                    .with_radii([Radius::new_scene_units((bubble.width() / 2.0) as f32)])
                    .with_labels([bubble.display_text().into_owned()]),
                );
            }
        }
    }

    #[cfg(not(feature = "visualization"))]
    pub fn log_bubbles(
        &self,
        _agents: &[Agent],
        _bubbles: &BubbleBoard,
        _positions: &HashMap<AgentId, Vector3<f64>>,
    ) {
    }

    /// Logs in-flight message orbs.
    #[cfg(feature = "visualization")]
    pub fn log_markers(&self, markers: &[TransitMarker]) {
        if let Some(ref rec) = self.rec {
            let points: Vec<Position3D> = markers
                .iter()
                .map(|m| {
                    Position3D::new(
                        m.position.x as f32,
                        m.position.y as f32,
                        m.position.z as f32,
                    )
                })
                .collect();

            let _ = rec.log(
                "scene/orbs",
                &Points3D::new(points)
                    .with_colors([Color::from_rgb(255, 215, 0)]) // Gold
                    .with_radii([Radius::new_scene_units(0.25)]),
            );
        }
    }

    #[cfg(not(feature = "visualization"))]
    pub fn log_markers(&self, _markers: &[TransitMarker]) {}

    /// Logs a status annotation (connection changes, conversation end).
    #[cfg(feature = "visualization")]
    pub fn log_status(&self, message: &str) {
        if let Some(ref rec) = self.rec {
            let _ = rec.log("scene/status", &rerun::TextLog::new(message));
        }
    }

    #[cfg(not(feature = "visualization"))]
    pub fn log_status(&self, _message: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_renderer_is_noop() {
        let renderer = SceneRenderer::disabled();
        assert!(!renderer.is_enabled());

        renderer.set_time(1.0);
        renderer.log_markers(&[]);
        renderer.log_status("idle");
    }

    #[test]
    fn test_dimming_keeps_channel_order() {
        assert_eq!(dimmed([255, 100, 0]), [85, 33, 0]);
    }
}
