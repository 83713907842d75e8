//! Timecode formatting and parsing.
//!
//! Subtitle timing lines and every time display in the player use the
//! `HH:MM:SS,mmm` form. Values are carried as seconds (`f64`) everywhere else.

use std::sync::OnceLock;

use regex::Regex;

/// Timing line pattern: `HH:MM:SS,mmm --> HH:MM:SS,mmm`, anchored at the start.
const TIMING_PATTERN: &str =
    r"^(\d{2}):(\d{2}):(\d{2}),(\d{3}) --> (\d{2}):(\d{2}):(\d{2}),(\d{3})";

fn timing_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(TIMING_PATTERN).expect("timing pattern is a valid regex"))
}

/// Format seconds as `HH:MM:SS,mmm`.
///
/// Negative and non-finite inputs format as zero. The value is rounded to
/// the nearest millisecond, so parsing the output recovers the input to
/// millisecond precision.
///
/// # Examples
/// ```
/// use srtp::subtitle::format_timecode;
/// assert_eq!(format_timecode(3723.5), "01:02:03,500");
/// ```
pub fn format_timecode(seconds: f64) -> String {
    let seconds = if seconds.is_finite() { seconds.max(0.0) } else { 0.0 };
    let total_ms = (seconds * 1000.0).round() as u64;
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms % 3_600_000) / 60_000;
    let secs = (total_ms % 60_000) / 1000;
    let millis = total_ms % 1000;
    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, secs, millis)
}

/// Format a start/end pair the way the history log shows it:
/// `[HH:MM:SS,mmm --> HH:MM:SS,mmm]`.
pub fn format_span(start: f64, end: f64) -> String {
    format!("[{} --> {}]", format_timecode(start), format_timecode(end))
}

/// Parse a single `HH:MM:SS,mmm` timecode into seconds.
pub fn parse_timecode(s: &str) -> Option<f64> {
    let s = s.trim();
    let (hms, millis) = s.split_once(',')?;
    if millis.len() != 3 {
        return None;
    }
    let mut parts = hms.split(':');
    let hours = parts.next()?;
    let minutes = parts.next()?;
    let secs = parts.next()?;
    if parts.next().is_some() {
        return None;
    }
    to_seconds(hours, minutes, secs, millis)
}

/// Parse a timing line into `(start, end)` seconds.
///
/// Returns `None` when the line does not start with the timing pattern.
/// Trailing content after the end timecode (e.g. position hints) is ignored.
pub fn parse_timing_line(line: &str) -> Option<(f64, f64)> {
    let caps = timing_regex().captures(line)?;
    let start = to_seconds(&caps[1], &caps[2], &caps[3], &caps[4])?;
    let end = to_seconds(&caps[5], &caps[6], &caps[7], &caps[8])?;
    Some((start, end))
}

fn to_seconds(hours: &str, minutes: &str, secs: &str, millis: &str) -> Option<f64> {
    let h: u64 = hours.parse().ok()?;
    let m: u64 = minutes.parse().ok()?;
    let s: u64 = secs.parse().ok()?;
    let ms: u64 = millis.parse().ok()?;
    Some((h * 3600 + m * 60 + s) as f64 + ms as f64 / 1000.0)
}
