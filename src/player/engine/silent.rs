//! Clock-driven engine without audio output.
//!
//! Media time advances with the clock while playing and the session ends
//! when the duration hint is reached. Clones share state, so a test can keep
//! a handle to script the engine after handing it to a session.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use super::{EngineError, PlaybackEngine};
use crate::player::clock::Clock;

#[derive(Debug, Default)]
struct SilentState {
    path: Option<PathBuf>,
    active: bool,
    paused: bool,
    /// Media position at the most recent play/resume
    start: f64,
    /// Clock time at the most recent play/resume
    started_at: Duration,
    /// Media position frozen at pause
    paused_at: f64,
    length: Option<f64>,
    reporting: bool,
    finished: bool,
    play_calls: Vec<f64>,
}

/// Engine that plays nothing and reports clock time as media time.
#[derive(Clone)]
pub struct SilentEngine {
    clock: Arc<dyn Clock>,
    state: Arc<Mutex<SilentState>>,
}

impl SilentEngine {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            state: Arc::new(Mutex::new(SilentState {
                reporting: true,
                ..SilentState::default()
            })),
        }
    }

    /// Make `elapsed_since_play` report unavailable (or available again).
    pub fn set_reporting(&self, reporting: bool) {
        self.state.lock().reporting = reporting;
    }

    /// End the current playback as if the media ran out.
    pub fn finish(&self) {
        self.state.lock().finished = true;
    }

    /// Start offsets of every `play` call so far.
    pub fn play_calls(&self) -> Vec<f64> {
        self.state.lock().play_calls.clone()
    }

    pub fn is_paused(&self) -> bool {
        self.state.lock().paused
    }

    fn media_position(&self, state: &SilentState) -> f64 {
        if state.paused {
            state.paused_at
        } else {
            state.start + self.clock.now().saturating_sub(state.started_at).as_secs_f64()
        }
    }
}

impl PlaybackEngine for SilentEngine {
    fn load(&mut self, path: &Path) -> Result<(), EngineError> {
        if !path.exists() {
            return Err(EngineError::Open {
                path: path.display().to_string(),
                message: "file not found".to_string(),
            });
        }
        self.state.lock().path = Some(path.to_path_buf());
        Ok(())
    }

    fn play(&mut self, start: f64) -> Result<(), EngineError> {
        let now = self.clock.now();
        let mut state = self.state.lock();
        if state.path.is_none() {
            return Err(EngineError::NotLoaded);
        }
        state.play_calls.push(start);
        state.active = true;
        state.paused = false;
        state.finished = false;
        state.start = start.max(0.0);
        state.started_at = now;
        Ok(())
    }

    fn pause(&mut self) {
        let mut state = self.state.lock();
        if state.active && !state.paused {
            state.paused_at = self.media_position(&state);
            state.paused = true;
        }
    }

    fn resume(&mut self) {
        let now = self.clock.now();
        let mut state = self.state.lock();
        if state.active && state.paused {
            state.start = state.paused_at;
            state.started_at = now;
            state.paused = false;
        }
    }

    fn stop(&mut self) {
        let mut state = self.state.lock();
        state.active = false;
        state.paused = false;
    }

    fn is_active(&self) -> bool {
        let state = self.state.lock();
        if !state.active || state.finished {
            return false;
        }
        match state.length {
            Some(length) => self.media_position(&state) < length,
            None => true,
        }
    }

    fn elapsed_since_play(&self) -> Option<Duration> {
        let state = self.state.lock();
        if !state.active || !state.reporting {
            return None;
        }
        let elapsed = self.media_position(&state) - state.start;
        Some(Duration::from_secs_f64(elapsed.max(0.0)))
    }

    fn set_duration_hint(&mut self, seconds: f64) {
        self.state.lock().length = (seconds > 0.0).then_some(seconds);
    }
}
