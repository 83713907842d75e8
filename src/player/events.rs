//! Events produced by the polling task for the presentation layer.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use crate::subtitle::{format_timecode, SubtitleEntry};

/// One already-displayed subtitle in the session log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub subtitle_id: String,
    /// `[HH:MM:SS,mmm --> HH:MM:SS,mmm]`
    pub timecode: String,
    pub text: String,
}

impl fmt::Display for HistoryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n{}", self.timecode, self.text)
    }
}

/// A change of the active subtitle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubtitleTransition {
    /// Id of the new active entry, `None` when no subtitle is active
    pub id: Option<String>,
    /// Text of the new active entry, empty when none
    pub text: String,
    /// Set when this transition introduced a new log entry
    pub appended: Option<HistoryEntry>,
}

/// What the presentation layer should display next.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderEvent {
    /// Timeline position in seconds
    pub position: f64,
    /// Position as `HH:MM:SS,mmm`
    pub time: String,
    /// Seek bar position, percent of total duration (0..=100)
    pub seek_percent: f64,
    /// `current/total`
    pub duration_label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transition: Option<SubtitleTransition>,
}

impl RenderEvent {
    pub fn at(position: f64, total: f64) -> Self {
        Self {
            position,
            time: format_timecode(position),
            seek_percent: seek_percent(position, total),
            duration_label: duration_label(position, total),
            transition: None,
        }
    }
}

/// Messages delivered from the session to the control thread.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    Render(RenderEvent),
    /// Playback ran to the end; the session has stopped
    EndOfMedia,
    /// The polling task failed; the session has stopped
    PollFailed { reason: String },
}

/// Percent of `total` reached at `position`, clamped to `0..=100`.
pub fn seek_percent(position: f64, total: f64) -> f64 {
    if total > 0.0 {
        (position / total * 100.0).clamp(0.0, 100.0)
    } else {
        0.0
    }
}

/// `HH:MM:SS,mmm/HH:MM:SS,mmm`
pub fn duration_label(position: f64, total: f64) -> String {
    format!("{}/{}", format_timecode(position), format_timecode(total))
}

/// Append-only log of displayed subtitles for one playback session.
///
/// An entry is logged at most once per session, so a position that jitters
/// back into an earlier subtitle never duplicates it.
#[derive(Debug, Default)]
pub struct SubtitleHistory {
    entries: Vec<HistoryEntry>,
    logged: HashSet<usize>,
    last_id: Option<String>,
}

impl SubtitleHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log the entry at `index` if it is new. Returns the log entry when added.
    pub fn record(&mut self, index: usize, entry: &SubtitleEntry) -> Option<HistoryEntry> {
        if entry.text.trim().is_empty() {
            return None;
        }
        if self.last_id.as_deref() == Some(entry.id.as_str()) || self.logged.contains(&index) {
            return None;
        }
        let logged = HistoryEntry {
            subtitle_id: entry.id.clone(),
            timecode: entry.span_label(),
            text: entry.text.clone(),
        };
        self.entries.push(logged.clone());
        self.logged.insert(index);
        self.last_id = Some(entry.id.clone());
        Some(logged)
    }

    /// Forget the last displayed id without dropping the log. Used when the
    /// entry list is replaced, so logged indices are forgotten too.
    pub fn forget_last(&mut self) {
        self.logged.clear();
        self.last_id = None;
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.logged.clear();
        self.last_id = None;
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn last_id(&self) -> Option<&str> {
        self.last_id.as_deref()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
