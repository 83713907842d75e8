//! Seek bar rendering
//!
//! The bar starts one column into its area and leaves room on the right for
//! the `current/total` label. Clicks are mapped back through the same
//! geometry, so drawing and seeking always agree.

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use super::theme::current_theme;

/// Column offset of the bar inside its area.
const BAR_START: u16 = 1;

/// Width of the bar in an area of `width` columns with a `label_len` label.
pub fn bar_width(width: u16, label_len: usize) -> usize {
    (width as usize).saturating_sub(BAR_START as usize + label_len + 2)
}

/// Build the bar characters: filled part, playhead, rest.
///
/// Returns the characters and the number of filled positions.
pub fn build_progress_bar_chars(bar_width: usize, percent: f64) -> (Vec<char>, usize) {
    let ratio = (percent / 100.0).clamp(0.0, 1.0);
    let filled = (bar_width as f64 * ratio) as usize;

    let mut bar: Vec<char> = vec!['─'; bar_width];
    if filled < bar_width {
        bar[filled] = '⏺';
    }
    (bar, filled)
}

/// Percent of the track under a click at `column`, if it hit the bar.
pub fn click_to_percent(area: Rect, label_len: usize, column: u16, row: u16) -> Option<f64> {
    if row != area.y {
        return None;
    }
    let width = bar_width(area.width, label_len);
    let start = area.x + BAR_START;
    if width == 0 || column < start || column >= start + width as u16 {
        return None;
    }
    let click_pos = (column - start) as f64;
    Some((click_pos / width as f64 * 100.0).clamp(0.0, 100.0))
}

/// Render the bar and the duration label.
pub fn render_progress(frame: &mut Frame, area: Rect, percent: f64, label: &str) {
    let theme = current_theme();
    let width = bar_width(area.width, label.len());
    let (bar, filled) = build_progress_bar_chars(width, percent);

    let done: String = bar[..filled].iter().collect();
    let rest: String = bar[filled..].iter().collect();
    let line = Line::from(vec![
        Span::raw(" ".repeat(BAR_START as usize)),
        Span::styled(done, theme.accent_style()),
        Span::styled(rest, theme.text_secondary_style()),
        Span::raw(" "),
        Span::styled(label.to_string(), theme.text_style()),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}
