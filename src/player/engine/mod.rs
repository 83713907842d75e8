//! Playback engine and media inspection collaborators.
//!
//! The session never touches an audio library directly. It drives a
//! [`PlaybackEngine`] and asks a [`MediaInspector`] for track length, so
//! engines can be swapped without touching position tracking:
//!
//! - `RodioEngine`: real audio output through rodio (`audio` feature)
//! - [`SilentEngine`]: clock-driven, no audio (headless runs and tests)

mod inspect;
#[cfg(feature = "audio")]
mod rodio_engine;
mod silent;

use std::path::Path;
use std::time::Duration;

pub use inspect::{LoftyInspector, MediaInspector};
#[cfg(feature = "audio")]
pub use rodio_engine::RodioEngine;
pub use silent::SilentEngine;

/// Errors raised by a playback engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Audio output unavailable: {0}")]
    Output(String),

    #[error("Failed to open audio file {path}: {message}")]
    Open { path: String, message: String },

    #[error("Failed to decode audio: {0}")]
    Decode(String),

    #[error("No audio file loaded")]
    NotLoaded,
}

/// An audio playback engine.
///
/// `elapsed_since_play` reports how much media time has played since the
/// most recent `play` or `resume`. It may be `None` right after a command or
/// when the engine can't tell; callers fall back to wall-clock time.
pub trait PlaybackEngine: Send {
    /// Select the file to play. Does not start playback.
    fn load(&mut self, path: &Path) -> Result<(), EngineError>;

    /// Start (or restart) playback `start` seconds into the loaded file.
    fn play(&mut self, start: f64) -> Result<(), EngineError>;

    fn pause(&mut self);

    fn resume(&mut self);

    fn stop(&mut self);

    /// Whether a playback session is in progress (playing or paused).
    fn is_active(&self) -> bool;

    fn elapsed_since_play(&self) -> Option<Duration>;

    /// Length of the loaded file, for engines that need it to detect the end.
    fn set_duration_hint(&mut self, _seconds: f64) {}
}
