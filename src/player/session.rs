//! Playback session controller
//!
//! The [`Session`] is the single owner of transport state. The control thread
//! calls its transport methods (`play`, `pause`, `seek`, `stop`) and drains
//! render events from it once per loop tick; a background [`Poller`] samples
//! the shared core and produces those events.
//!
//! # State machine
//!
//! ```text
//! Idle --load audio + subtitles--> Ready --play--> Playing <--> Paused
//!                                    ^                |           |
//!                                    +------stop------+-----------+
//! ```
//!
//! End of media and poll failures are treated as an implicit stop.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use super::clock::Clock;
use super::engine::{EngineError, MediaInspector, PlaybackEngine};
use super::events::{HistoryEntry, RenderEvent, SessionEvent, SubtitleHistory, SubtitleTransition};
use super::poller::{Poller, Sample, Tagged, DEFAULT_JOIN_TIMEOUT, DEFAULT_POLL_INTERVAL};
use super::resolver::{Resolved, SubtitleResolver, DEFAULT_SYNC_OFFSET};
use super::tracker::{PositionTracker, TransportState};
use crate::subtitle::{self, SubtitleEntry, SubtitleError, DEFAULT_ENCODINGS};

/// Length assumed when the media inspector can't tell.
pub const DEFAULT_DURATION_SECS: f64 = 100.0;

/// Controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Audio or subtitles missing
    #[default]
    Idle,
    /// Both sources loaded, nothing playing
    Ready,
    Playing,
    Paused,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Ready => "ready",
            Self::Playing => "playing",
            Self::Paused => "paused",
        };
        f.write_str(name)
    }
}

/// Errors returned by transport commands and loads.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Load an audio file and a subtitle file first")]
    NotReady,

    #[error("Cannot {command} while {state}")]
    InvalidTransition {
        command: &'static str,
        state: SessionState,
    },

    #[error(transparent)]
    Subtitle(#[from] SubtitleError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Failed to start poller: {0}")]
    Poller(#[from] std::io::Error),
}

/// Tunables for a session.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Seconds subtracted from the position before subtitle lookup
    pub sync_offset: f64,
    pub poll_interval: Duration,
    /// Bound on waiting for a previous poller to exit
    pub join_timeout: Duration,
    /// Track length used when the inspector can't read one
    pub default_duration: f64,
    /// Subtitle encodings to try, in order
    pub encodings: Vec<String>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            sync_offset: DEFAULT_SYNC_OFFSET,
            poll_interval: DEFAULT_POLL_INTERVAL,
            join_timeout: DEFAULT_JOIN_TIMEOUT,
            default_duration: DEFAULT_DURATION_SECS,
            encodings: DEFAULT_ENCODINGS.iter().map(|e| e.to_string()).collect(),
        }
    }
}

/// State shared between the control thread and the poller.
struct SessionCore {
    engine: Box<dyn PlaybackEngine>,
    tracker: PositionTracker,
    resolver: SubtitleResolver,
    entries: Vec<SubtitleEntry>,
    history: SubtitleHistory,
    /// Time label of the last emitted render event
    last_time: Option<String>,
    /// Bumped on every seek, stop and play-from-start
    generation: u64,
}

impl SessionCore {
    fn position(&mut self) -> f64 {
        let elapsed = match self.tracker.state() {
            TransportState::Playing => self.engine.elapsed_since_play(),
            _ => None,
        };
        self.tracker.current_position(elapsed)
    }

    /// Forget everything displayed so far and invalidate queued events.
    fn invalidate(&mut self) {
        self.history.clear();
        self.resolver.reset();
        self.last_time = None;
        self.generation += 1;
    }

    fn sample(&mut self) -> (u64, Sample) {
        let sample = match self.tracker.state() {
            TransportState::Stopped => Sample::Idle,
            TransportState::Playing if !self.engine.is_active() => Sample::Finished,
            TransportState::Playing => {
                let position = self.position();
                let transition = self
                    .resolver
                    .transition(position, &self.entries)
                    .map(|resolved| self.record(resolved));
                self.render_if_changed(position, transition)
            }
            // Only position changes (seek while paused) are shown
            TransportState::Paused => {
                let position = self.position();
                self.render_if_changed(position, None)
            }
        };
        (self.generation, sample)
    }

    fn record(&mut self, resolved: Resolved) -> SubtitleTransition {
        let appended = match resolved.index {
            Some(index) => self
                .entries
                .get(index)
                .and_then(|entry| self.history.record(index, entry)),
            None => None,
        };
        if let Some(logged) = &appended {
            tracing::debug!(id = %logged.subtitle_id, timecode = %logged.timecode, "Subtitle shown");
        }
        SubtitleTransition {
            id: resolved.id,
            text: resolved.text,
            appended,
        }
    }

    fn render_if_changed(&mut self, position: f64, transition: Option<SubtitleTransition>) -> Sample {
        let mut event = RenderEvent::at(position, self.tracker.total_duration());
        let time_changed = self.last_time.as_deref() != Some(event.time.as_str());
        if !time_changed && transition.is_none() {
            return Sample::Idle;
        }
        self.last_time = Some(event.time.clone());
        event.transition = transition;
        Sample::Render(event)
    }
}

/// Coordinates transport commands, position tracking and subtitle lookup.
pub struct Session {
    core: Arc<Mutex<SessionCore>>,
    inspector: Box<dyn MediaInspector>,
    options: SessionOptions,
    state: SessionState,
    audio: Option<PathBuf>,
    subtitles: Option<PathBuf>,
    poller: Option<Poller>,
    events_tx: Sender<Tagged>,
    events_rx: Receiver<Tagged>,
    /// A seek happened while paused; resume must restart the engine there
    needs_restart: bool,
}

impl Session {
    pub fn new(
        engine: Box<dyn PlaybackEngine>,
        inspector: Box<dyn MediaInspector>,
        clock: Arc<dyn Clock>,
        options: SessionOptions,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::channel();
        let core = SessionCore {
            engine,
            tracker: PositionTracker::new(clock, options.default_duration),
            resolver: SubtitleResolver::new(options.sync_offset),
            entries: Vec::new(),
            history: SubtitleHistory::new(),
            last_time: None,
            generation: 0,
        };
        Self {
            core: Arc::new(Mutex::new(core)),
            inspector,
            options,
            state: SessionState::Idle,
            audio: None,
            subtitles: None,
            poller: None,
            events_tx,
            events_rx,
            needs_restart: false,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn audio_path(&self) -> Option<&Path> {
        self.audio.as_deref()
    }

    pub fn subtitle_path(&self) -> Option<&Path> {
        self.subtitles.as_deref()
    }

    pub fn entry_count(&self) -> usize {
        self.core.lock().entries.len()
    }

    pub fn total_duration(&self) -> f64 {
        self.core.lock().tracker.total_duration()
    }

    /// Current timeline position in seconds.
    pub fn position(&self) -> f64 {
        self.core.lock().position()
    }

    /// Time, seek bar and duration label for the current position, without
    /// a subtitle transition.
    pub fn snapshot(&self) -> RenderEvent {
        let mut core = self.core.lock();
        let position = core.position();
        RenderEvent::at(position, core.tracker.total_duration())
    }

    /// Subtitles displayed so far in this playback session.
    pub fn history(&self) -> Vec<HistoryEntry> {
        self.core.lock().history.entries().to_vec()
    }

    pub fn sync_offset(&self) -> f64 {
        self.core.lock().resolver.sync_offset()
    }

    /// Change the synchronization offset. Takes effect on the next sample.
    pub fn set_sync_offset(&mut self, offset: f64) {
        self.options.sync_offset = offset;
        self.core.lock().resolver.set_sync_offset(offset);
        tracing::debug!(offset, "Sync offset changed");
    }

    /// Load an audio file.
    ///
    /// Looks up its length, falling back to the configured default when the
    /// inspector can't read one. An active playback keeps running.
    pub fn load_audio(&mut self, path: &Path) -> Result<f64, SessionError> {
        let total = match self.inspector.duration(path) {
            Some(total) => total,
            None => {
                tracing::warn!(
                    path = %path.display(),
                    default = self.options.default_duration,
                    "Duration unavailable, using default"
                );
                self.options.default_duration
            }
        };

        {
            let mut core = self.core.lock();
            core.engine.load(path)?;
            core.engine.set_duration_hint(total);
            core.tracker.set_total_duration(total);
        }

        tracing::info!(path = %path.display(), duration = total, "Loaded audio");
        self.audio = Some(path.to_path_buf());
        self.refresh_ready();
        Ok(total)
    }

    /// Load a subtitle file, replacing the current entries.
    ///
    /// On failure the previous entries stay in place. Returns the number of
    /// entries parsed.
    pub fn load_subtitles(&mut self, path: &Path) -> Result<usize, SubtitleError> {
        let entries = subtitle::parse_file(path, &self.options.encodings)?;
        let count = entries.len();
        {
            let mut core = self.core.lock();
            core.entries = entries;
            core.resolver.reset();
            core.history.forget_last();
        }
        self.subtitles = Some(path.to_path_buf());
        self.refresh_ready();
        Ok(count)
    }

    fn refresh_ready(&mut self) {
        if self.state == SessionState::Idle && self.audio.is_some() && self.subtitles.is_some() {
            self.state = SessionState::Ready;
        }
    }

    /// Start playback from the beginning, or resume when paused.
    pub fn play(&mut self) -> Result<(), SessionError> {
        match self.state {
            SessionState::Idle => Err(SessionError::NotReady),
            SessionState::Ready => self.start(),
            SessionState::Paused => self.resume(),
            SessionState::Playing => Err(self.invalid("play")),
        }
    }

    /// Toggle between playing and paused; starts playback when ready.
    pub fn toggle_pause(&mut self) -> Result<(), SessionError> {
        match self.state {
            SessionState::Playing => self.pause().map(|_| ()),
            _ => self.play(),
        }
    }

    fn start(&mut self) -> Result<(), SessionError> {
        // Never let two pollers run against the same core
        self.shutdown_poller();
        let generation = {
            let mut core = self.core.lock();
            core.engine.play(0.0)?;
            core.tracker.on_play(0.0);
            core.invalidate();
            core.generation
        };
        self.needs_restart = false;
        self.spawn_poller(generation)?;
        self.state = SessionState::Playing;
        tracing::debug!("Playback started");
        Ok(())
    }

    fn resume(&mut self) -> Result<(), SessionError> {
        let generation = {
            let mut core = self.core.lock();
            if self.needs_restart {
                let position = core.position();
                core.engine.play(position)?;
            } else {
                core.engine.resume();
            }
            core.tracker.on_resume();
            core.generation
        };
        self.needs_restart = false;
        self.ensure_poller(generation)?;
        self.state = SessionState::Playing;
        tracing::debug!("Playback resumed");
        Ok(())
    }

    /// Pause playback. Returns the position frozen at pause.
    pub fn pause(&mut self) -> Result<f64, SessionError> {
        if self.state != SessionState::Playing {
            return Err(self.invalid("pause"));
        }
        let position = {
            let mut core = self.core.lock();
            let elapsed = core.engine.elapsed_since_play();
            let position = core.tracker.on_pause(elapsed);
            core.engine.pause();
            position
        };
        self.state = SessionState::Paused;
        tracing::debug!(position, "Playback paused");
        Ok(position)
    }

    /// Stop playback and return to `Ready`.
    pub fn stop(&mut self) -> Result<(), SessionError> {
        match self.state {
            SessionState::Playing | SessionState::Paused => {
                self.halt();
                tracing::debug!("Playback stopped");
                Ok(())
            }
            _ => Err(self.invalid("stop")),
        }
    }

    /// Move to `to` seconds (clamped to the track). Returns the target.
    ///
    /// Clears the displayed history: the next sample reports whatever is
    /// active at the new position, possibly nothing.
    pub fn seek(&mut self, to: f64) -> Result<f64, SessionError> {
        let playing = match self.state {
            SessionState::Playing => true,
            SessionState::Paused => false,
            _ => return Err(self.invalid("seek")),
        };
        let (target, generation) = {
            let mut core = self.core.lock();
            let target = core.tracker.clamp(to);
            // A failed restart leaves position and history untouched
            if playing {
                core.engine.play(target)?;
            }
            core.tracker.on_seek(target);
            core.invalidate();
            (target, core.generation)
        };
        if playing {
            // An end of media sampled before the seek is now stale, and the
            // poller that reported it has exited
            self.ensure_poller(generation)?;
        } else {
            self.needs_restart = true;
        }
        tracing::debug!(target, "Seek");
        Ok(target)
    }

    /// Seek by percent of the total duration (seek bar).
    pub fn seek_percent(&mut self, percent: f64) -> Result<f64, SessionError> {
        let total = self.total_duration();
        self.seek(percent.clamp(0.0, 100.0) / 100.0 * total)
    }

    /// Seek relative to the current position.
    pub fn seek_by(&mut self, delta: f64) -> Result<f64, SessionError> {
        let position = self.position();
        self.seek(position + delta)
    }

    /// Events produced since the last call, in order.
    ///
    /// Stale events (sampled before a seek or stop) are dropped. End of media
    /// and poll failures stop the session before they are returned.
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        while let Ok(tagged) = self.events_rx.try_recv() {
            if let Some(event) = self.accept(tagged) {
                events.push(event);
            }
        }
        events
    }

    /// Wait up to `timeout` for the next event.
    pub fn next_event(&mut self, timeout: Duration) -> Option<SessionEvent> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.events_rx.recv_timeout(remaining) {
                Ok(tagged) => {
                    if let Some(event) = self.accept(tagged) {
                        return Some(event);
                    }
                }
                // The session holds a sender, so only the timeout ends the wait
                Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => return None,
            }
        }
    }

    fn accept(&mut self, tagged: Tagged) -> Option<SessionEvent> {
        if tagged.generation != self.core.lock().generation {
            return None;
        }
        match &tagged.event {
            SessionEvent::Render(_) => {}
            SessionEvent::EndOfMedia => {
                tracing::info!("End of media");
                self.halt();
            }
            SessionEvent::PollFailed { reason } => {
                tracing::warn!(%reason, "Stopping after poll failure");
                self.halt();
            }
        }
        Some(tagged.event)
    }

    /// Stop without state validation.
    fn halt(&mut self) {
        self.shutdown_poller();
        {
            let mut core = self.core.lock();
            core.engine.stop();
            core.tracker.on_stop();
            core.invalidate();
        }
        self.needs_restart = false;
        if matches!(self.state, SessionState::Playing | SessionState::Paused) {
            self.state = SessionState::Ready;
        }
    }

    fn spawn_poller(&mut self, generation: u64) -> Result<(), SessionError> {
        let core = Arc::clone(&self.core);
        let poller = Poller::spawn(
            self.options.poll_interval,
            self.options.join_timeout,
            generation,
            move || core.lock().sample(),
            self.events_tx.clone(),
        )?;
        self.poller = Some(poller);
        Ok(())
    }

    /// Spawn a poller unless one is still running.
    fn ensure_poller(&mut self, generation: u64) -> Result<(), SessionError> {
        if self.poller.as_ref().is_some_and(|poller| !poller.is_finished()) {
            return Ok(());
        }
        self.shutdown_poller();
        self.spawn_poller(generation)
    }

    fn shutdown_poller(&mut self) {
        if let Some(poller) = self.poller.take() {
            poller.shutdown();
        }
    }

    fn invalid(&self, command: &'static str) -> SessionError {
        SessionError::InvalidTransition {
            command,
            state: self.state,
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.shutdown_poller();
        self.core.lock().engine.stop();
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state)
            .field("audio", &self.audio)
            .field("subtitles", &self.subtitles)
            .field("needs_restart", &self.needs_restart)
            .finish()
    }
}
