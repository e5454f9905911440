//! The playback clock.
//!
//! A monotonic simulation-time driver advanced once per rendered frame.
//! All mutation happens on the frame callback; there are no concurrent
//! writers. Reaching the end of the timeline holds at the ceiling; the
//! clock neither auto-stops nor loops.

use serde::{Deserialize, Serialize};

/// Trailing margin added past the last event timestamp so in-flight
/// arcs and bubbles finish before the clock clamps.
pub const TRAILING_MARGIN_SECS: f64 = 6.0;

/// Speed multipliers offered by the viewer controls.
pub const SPEED_STEPS: [f64; 4] = [0.5, 1.0, 2.0, 4.0];

/// Seekable, speed-scaled simulation clock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackClock {
    /// Current simulation time in seconds. Invariant: `0 ≤ current ≤ duration`.
    current: f64,

    /// Total timeline length in seconds.
    duration: f64,

    /// Explicit duration override; when set, event timestamps no longer
    /// stretch the timeline.
    duration_override: Option<f64>,

    /// Whether `advance` moves the clock.
    playing: bool,

    /// Positive speed multiplier applied to future frame deltas only.
    speed: f64,
}

impl PlaybackClock {
    pub fn new() -> Self {
        Self {
            current: 0.0,
            duration: TRAILING_MARGIN_SECS,
            duration_override: None,
            playing: false,
            speed: 1.0,
        }
    }

    /// Clock with a fixed total duration that event timestamps cannot
    /// extend.
    pub fn with_duration_override(duration: f64) -> Self {
        let mut clock = Self::new();
        clock.duration_override = Some(duration.max(0.0));
        clock.duration = duration.max(0.0);
        clock
    }

    pub fn play(&mut self) {
        self.playing = true;
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Jumps to `t`, clamped to `[0, duration]`. Honored whether playing
    /// or paused.
    pub fn seek(&mut self, t: f64) {
        self.current = t.clamp(0.0, self.duration);
    }

    /// Advances by one frame's worth of real time, scaled by the current
    /// speed and clamped at the duration ceiling. A paused clock ignores
    /// the delta entirely.
    pub fn advance(&mut self, frame_dt_secs: f64) {
        if !self.playing {
            return;
        }
        self.current = (self.current + frame_dt_secs * self.speed).min(self.duration);
    }

    /// Sets the speed multiplier for subsequent frames. Elapsed time is
    /// never rewritten. Non-positive values are ignored.
    pub fn set_speed(&mut self, speed: f64) {
        if speed > 0.0 {
            self.speed = speed;
        }
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn current(&self) -> f64 {
        self.current
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn at_end(&self) -> bool {
        self.current >= self.duration
    }

    /// Stretches the timeline to cover an event observed at `born_at`
    /// seconds, plus the trailing margin. Shrinking never happens, and
    /// an explicit override pins the duration entirely.
    pub fn cover(&mut self, born_at: f64) {
        if self.duration_override.is_some() {
            return;
        }
        let needed = born_at + TRAILING_MARGIN_SECS;
        if needed > self.duration {
            self.duration = needed;
        }
    }

    /// Rewinds to zero and pauses. Duration is left as derived so a
    /// replay covers the same events.
    pub fn rewind(&mut self) {
        self.current = 0.0;
        self.playing = false;
    }
}

impl Default for PlaybackClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_advance_only_while_playing() {
        let mut clock = PlaybackClock::new();
        clock.advance(1.0);
        assert_relative_eq!(clock.current(), 0.0);

        clock.play();
        clock.advance(1.0);
        assert_relative_eq!(clock.current(), 1.0);

        clock.pause();
        clock.advance(1.0);
        assert_relative_eq!(clock.current(), 1.0);
    }

    #[test]
    fn test_advance_clamps_and_holds_at_duration() {
        let mut clock = PlaybackClock::with_duration_override(2.0);
        clock.play();
        clock.advance(5.0);
        assert_relative_eq!(clock.current(), 2.0);
        assert!(clock.at_end());

        // Holding at the ceiling: still playing, still clamped.
        assert!(clock.is_playing());
        clock.advance(1.0);
        assert_relative_eq!(clock.current(), 2.0);
    }

    #[test]
    fn test_seek_clamps_both_ends() {
        let mut clock = PlaybackClock::with_duration_override(10.0);
        clock.seek(-3.0);
        assert_relative_eq!(clock.current(), 0.0);
        clock.seek(99.0);
        assert_relative_eq!(clock.current(), 10.0);
        clock.seek(4.5);
        assert_relative_eq!(clock.current(), 4.5);
    }

    #[test]
    fn test_seek_honored_while_paused() {
        let mut clock = PlaybackClock::with_duration_override(10.0);
        assert!(!clock.is_playing());
        clock.seek(3.0);
        assert_relative_eq!(clock.current(), 3.0);
    }

    #[test]
    fn test_speed_applies_prospectively_only() {
        let mut clock = PlaybackClock::with_duration_override(100.0);
        clock.play();
        clock.advance(2.0);
        assert_relative_eq!(clock.current(), 2.0);

        // Raising speed must not rewrite the elapsed two seconds.
        clock.set_speed(4.0);
        assert_relative_eq!(clock.current(), 2.0);
        clock.advance(2.0);
        assert_relative_eq!(clock.current(), 10.0);
    }

    #[test]
    fn test_non_positive_speed_ignored() {
        let mut clock = PlaybackClock::new();
        clock.set_speed(0.0);
        assert_relative_eq!(clock.speed(), 1.0);
        clock.set_speed(-2.0);
        assert_relative_eq!(clock.speed(), 1.0);
    }

    #[test]
    fn test_cover_extends_with_trailing_margin() {
        let mut clock = PlaybackClock::new();
        clock.cover(10.0);
        assert_relative_eq!(clock.duration(), 10.0 + TRAILING_MARGIN_SECS);

        // Earlier events never shrink the timeline.
        clock.cover(1.0);
        assert_relative_eq!(clock.duration(), 10.0 + TRAILING_MARGIN_SECS);
    }

    #[test]
    fn test_override_pins_duration() {
        let mut clock = PlaybackClock::with_duration_override(20.0);
        clock.cover(100.0);
        assert_relative_eq!(clock.duration(), 20.0);
    }
}
