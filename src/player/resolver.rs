//! Position to subtitle lookup and transition detection.

use crate::subtitle::SubtitleEntry;

/// Default synchronization offset in seconds.
pub const DEFAULT_SYNC_OFFSET: f64 = 0.1;

/// Result of a lookup: the active entry (if any) at a position.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Resolved {
    /// Text of the active entry, empty when none matches
    pub text: String,
    /// Id of the active entry
    pub id: Option<String>,
    /// Index of the active entry in the entry list
    pub index: Option<usize>,
}

impl Resolved {
    pub fn is_empty(&self) -> bool {
        self.index.is_none()
    }
}

/// Maps timeline positions to subtitle entries.
///
/// The sync offset is subtracted from the position before lookup. When
/// several entries overlap the position, the first in start order wins.
#[derive(Debug, Clone)]
pub struct SubtitleResolver {
    sync_offset: f64,
    last_text: Option<String>,
}

impl SubtitleResolver {
    pub fn new(sync_offset: f64) -> Self {
        Self {
            sync_offset,
            last_text: None,
        }
    }

    pub fn sync_offset(&self) -> f64 {
        self.sync_offset
    }

    pub fn set_sync_offset(&mut self, offset: f64) {
        self.sync_offset = offset;
    }

    /// Look up the active entry at `position`. Pure: no transition bookkeeping.
    pub fn resolve(&self, position: f64, entries: &[SubtitleEntry]) -> Resolved {
        let adjusted = position - self.sync_offset;
        for (index, entry) in entries.iter().enumerate() {
            // Entries are sorted by start, nothing later can match
            if entry.start > adjusted {
                break;
            }
            if entry.contains(adjusted) {
                return Resolved {
                    text: entry.text.clone(),
                    id: Some(entry.id.clone()),
                    index: Some(index),
                };
            }
        }
        Resolved::default()
    }

    /// Resolve and report a transition only when the text changed since the
    /// last reported one.
    pub fn transition(&mut self, position: f64, entries: &[SubtitleEntry]) -> Option<Resolved> {
        let resolved = self.resolve(position, entries);
        if self.last_text.as_deref() == Some(resolved.text.as_str()) {
            return None;
        }
        self.last_text = Some(resolved.text.clone());
        Some(resolved)
    }

    /// Forget the last reported text; the next `transition` always reports.
    pub fn reset(&mut self) {
        self.last_text = None;
    }
}

impl Default for SubtitleResolver {
    fn default() -> Self {
        Self::new(DEFAULT_SYNC_OFFSET)
    }
}
