//! Playback-to-subtitle synchronization
//!
//! Keeps an audio engine and a subtitle list in step:
//!
//! - `clock`: wall-clock abstraction (real and hand-driven)
//! - `tracker`: authoritative timeline position across play/pause/seek/stop
//! - `resolver`: position to active subtitle, with transition detection
//! - `engine`: audio engine and media inspector collaborators
//! - `poller`: background sampling thread
//! - `session`: the controller state machine tying it all together
//! - `events`: what the session hands to the presentation layer
//!
//! # Usage
//!
//! ```no_run
//! # #[cfg(feature = "audio")] {
//! use std::path::Path;
//! use std::sync::Arc;
//! use std::time::Duration;
//! use srtp::player::{LoftyInspector, RodioEngine, Session, SessionOptions, SystemClock};
//!
//! let engine = RodioEngine::open_default().unwrap();
//! let mut session = Session::new(
//!     Box::new(engine),
//!     Box::new(LoftyInspector::new()),
//!     Arc::new(SystemClock::new()),
//!     SessionOptions::default(),
//! );
//! session.load_audio(Path::new("talk.mp3")).unwrap();
//! session.load_subtitles(Path::new("talk.srt")).unwrap();
//! session.play().unwrap();
//! while let Some(event) = session.next_event(Duration::from_secs(1)) {
//!     println!("{:?}", event);
//! }
//! # }
//! ```

pub mod clock;
pub mod engine;
pub mod events;
pub mod poller;
pub mod resolver;
pub mod session;
pub mod tracker;

pub use clock::{Clock, ManualClock, SystemClock};
#[cfg(feature = "audio")]
pub use engine::RodioEngine;
pub use engine::{EngineError, LoftyInspector, MediaInspector, PlaybackEngine, SilentEngine};
pub use events::{HistoryEntry, RenderEvent, SessionEvent, SubtitleHistory, SubtitleTransition};
pub use resolver::{Resolved, SubtitleResolver, DEFAULT_SYNC_OFFSET};
pub use session::{Session, SessionError, SessionOptions, SessionState, DEFAULT_DURATION_SECS};
pub use tracker::{PositionTracker, TransportState};
