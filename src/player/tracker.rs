//! Playback position tracking.
//!
//! The tracker owns the authoritative timeline position. While playing it
//! prefers the elapsed time reported by the playback engine and falls back to
//! wall-clock time when the engine can't answer (right after a play command,
//! or when the query fails). Transport transitions are the only points where
//! position is stored; everything else is derived:
//!
//! - Playing: `base + elapsed`
//! - Paused: the position frozen at pause
//! - Stopped: `0`
//!
//! While playing, the reported position never goes backward between
//! transitions, and it is always clamped to `[0, total_duration]`.

use std::sync::Arc;
use std::time::Duration;

use super::clock::Clock;

/// Transport state of the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// Reconciles the engine clock and transport commands into one timeline.
pub struct PositionTracker {
    clock: Arc<dyn Clock>,
    state: TransportState,
    /// Wall-clock time when the current play/resume began
    reference: Duration,
    /// Timeline seconds at `reference`
    base: f64,
    /// Timeline seconds frozen at the last pause
    paused: f64,
    /// Highest position reported since the last transition
    high_water: f64,
    total_duration: f64,
}

impl PositionTracker {
    pub fn new(clock: Arc<dyn Clock>, total_duration: f64) -> Self {
        Self {
            clock,
            state: TransportState::Stopped,
            reference: Duration::ZERO,
            base: 0.0,
            paused: 0.0,
            high_water: 0.0,
            total_duration: sanitize(total_duration),
        }
    }

    pub fn state(&self) -> TransportState {
        self.state
    }

    pub fn total_duration(&self) -> f64 {
        self.total_duration
    }

    /// Replace the total duration (e.g. when a new audio file is loaded).
    pub fn set_total_duration(&mut self, total: f64) {
        self.total_duration = sanitize(total);
    }

    /// Start playing from `from` seconds.
    pub fn on_play(&mut self, from: f64) {
        let from = self.clamp(from);
        self.base = from;
        self.high_water = from;
        self.reference = self.clock.now();
        self.state = TransportState::Playing;
    }

    /// Freeze the position and return it.
    ///
    /// `engine_elapsed` is the engine's answer sampled just before pausing.
    /// Pausing while not playing returns the current position unchanged.
    pub fn on_pause(&mut self, engine_elapsed: Option<Duration>) -> f64 {
        if self.state != TransportState::Playing {
            return self.current_position(engine_elapsed);
        }
        self.paused = self.current_position(engine_elapsed);
        self.state = TransportState::Paused;
        self.paused
    }

    /// Continue playing from the paused position.
    pub fn on_resume(&mut self) {
        if self.state == TransportState::Paused {
            self.on_play(self.paused);
        }
    }

    /// Move to `to` seconds (clamped). Returns the clamped target.
    ///
    /// Playing restarts tracking at the target; paused only moves the frozen
    /// position. Restarting the engine itself is the caller's job.
    pub fn on_seek(&mut self, to: f64) -> f64 {
        let target = self.clamp(to);
        match self.state {
            TransportState::Playing => self.on_play(target),
            TransportState::Paused => {
                self.paused = target;
                self.high_water = target;
            }
            TransportState::Stopped => {}
        }
        target
    }

    /// Reset to the stopped state at position 0.
    pub fn on_stop(&mut self) {
        self.state = TransportState::Stopped;
        self.base = 0.0;
        self.paused = 0.0;
        self.high_water = 0.0;
    }

    /// Current timeline position in seconds.
    ///
    /// `engine_elapsed` is the engine's "elapsed since play" answer, or
    /// `None` when it is unavailable.
    pub fn current_position(&mut self, engine_elapsed: Option<Duration>) -> f64 {
        match self.state {
            TransportState::Stopped => 0.0,
            TransportState::Paused => self.paused,
            TransportState::Playing => {
                let elapsed = match engine_elapsed {
                    Some(elapsed) => elapsed,
                    None => self.clock.now().saturating_sub(self.reference),
                };
                let candidate = self.clamp(self.base + elapsed.as_secs_f64());
                self.high_water = candidate.max(self.high_water);
                self.high_water
            }
        }
    }

    /// `position` limited to `[0, total_duration]`.
    pub fn clamp(&self, position: f64) -> f64 {
        sanitize(position).min(self.total_duration)
    }
}

fn sanitize(value: f64) -> f64 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        0.0
    }
}

impl std::fmt::Debug for PositionTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PositionTracker")
            .field("state", &self.state)
            .field("base", &self.base)
            .field("paused", &self.paused)
            .field("high_water", &self.high_water)
            .field("total_duration", &self.total_duration)
            .finish()
    }
}
