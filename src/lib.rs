//! srtp - play an audio track with its SRT subtitles, synchronized.
//!
//! - [`subtitle`]: SRT parsing with encoding fallback
//! - [`player`]: position tracking, subtitle resolution and the session
//!   controller that keeps them in step with an audio engine
//! - [`tui`]: terminal presentation layer
//! - [`config`], [`cli`], [`logging`]: ambient plumbing for the binary

pub mod cli;
pub mod config;
pub mod logging;
pub mod player;
pub mod subtitle;
pub mod tui;

pub use config::Config;
pub use subtitle::{parse, parse_file, SubtitleEntry, SubtitleError};
