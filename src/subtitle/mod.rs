//! SRT subtitle parsing.
//!
//! An SRT document is a sequence of blocks separated by blank lines:
//!
//! ```text
//! 1
//! 00:00:01,000 --> 00:00:03,000
//! Hello
//!
//! 2
//! 00:00:04,000 --> 00:00:06,500
//! Second line
//! spans two rows
//! ```
//!
//! Blocks that don't carry a valid timing line are skipped, not fatal.
//! The parsed entries are sorted by start time (stable, so ties keep
//! document order).

mod encoding;
mod timecode;

use std::fs;
use std::path::{Path, PathBuf};

pub use encoding::{decode_with_fallback, Decoded, DEFAULT_ENCODINGS};
pub use timecode::{format_span, format_timecode, parse_timecode, parse_timing_line};

/// One timed subtitle entry. Immutable once parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleEntry {
    /// Index line of the block, kept verbatim (not required to be numeric or unique)
    pub id: String,
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds (never before `start`)
    pub end: f64,
    /// Text lines joined with `\n`
    pub text: String,
}

impl SubtitleEntry {
    pub fn new(id: impl Into<String>, start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            start,
            end,
            text: text.into(),
        }
    }

    /// Whether `position` falls inside `[start, end]` (inclusive both ends).
    pub fn contains(&self, position: f64) -> bool {
        self.start <= position && position <= self.end
    }

    /// The `[start --> end]` label used in the history log.
    pub fn span_label(&self) -> String {
        format_span(self.start, self.end)
    }
}

/// Errors that can occur while loading a subtitle file.
#[derive(Debug, thiserror::Error)]
pub enum SubtitleError {
    #[error("Subtitle file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Failed to read subtitle file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not decode subtitle text with any of: {}", tried.join(", "))]
    Encoding { tried: Vec<String> },
}

/// Parse an SRT document into entries sorted by start time.
///
/// Line endings are normalized first, so CRLF files parse the same as LF.
pub fn parse(document: &str) -> Vec<SubtitleEntry> {
    let normalized = document.replace("\r\n", "\n").replace('\r', "\n");

    let mut entries = Vec::new();
    let mut block: Vec<&str> = Vec::new();
    for line in normalized.lines() {
        if line.trim().is_empty() {
            if !block.is_empty() {
                if let Some(entry) = parse_block(&block) {
                    entries.push(entry);
                }
                block.clear();
            }
        } else {
            block.push(line);
        }
    }
    if !block.is_empty() {
        if let Some(entry) = parse_block(&block) {
            entries.push(entry);
        }
    }

    // Vec::sort_by is stable: equal starts keep document order
    entries.sort_by(|a, b| a.start.total_cmp(&b.start));
    entries
}

/// Decode raw bytes with the given encodings, then parse.
pub fn parse_bytes<S: AsRef<str>>(
    bytes: &[u8],
    encodings: &[S],
) -> Result<Vec<SubtitleEntry>, SubtitleError> {
    let decoded = decode_with_fallback(bytes, encodings).ok_or_else(|| SubtitleError::Encoding {
        tried: encodings.iter().map(|e| e.as_ref().to_string()).collect(),
    })?;
    if decoded.encoding != "UTF-8" {
        tracing::info!(encoding = decoded.encoding, "Subtitle text decoded with fallback encoding");
    }
    Ok(parse(&decoded.text))
}

/// Read and parse a subtitle file.
pub fn parse_file<S: AsRef<str>>(
    path: &Path,
    encodings: &[S],
) -> Result<Vec<SubtitleEntry>, SubtitleError> {
    if !path.exists() {
        return Err(SubtitleError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let bytes = fs::read(path)?;
    let entries = parse_bytes(&bytes, encodings)?;
    tracing::info!(path = %path.display(), count = entries.len(), "Parsed subtitle file");
    Ok(entries)
}

/// Parse one block: index line, timing line, one or more text lines.
fn parse_block(lines: &[&str]) -> Option<SubtitleEntry> {
    if lines.len() < 3 {
        return None;
    }
    let Some((start, end)) = parse_timing_line(lines[1].trim()) else {
        tracing::debug!(index = lines[0], "Skipping block without a valid timing line");
        return None;
    };
    if end < start {
        tracing::debug!(index = lines[0], "Skipping block that ends before it starts");
        return None;
    }
    Some(SubtitleEntry {
        id: lines[0].trim().to_string(),
        start,
        end,
        text: lines[2..].join("\n"),
    })
}
