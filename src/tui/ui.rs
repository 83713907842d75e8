//! Layout helpers for the TUI

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Areas of the player screen, top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerLayout {
    /// File names and sync offset
    pub header: Rect,
    /// Active subtitle
    pub current: Rect,
    /// Displayed-subtitle log
    pub history: Rect,
    /// Seek bar and duration label
    pub progress: Rect,
    pub status: Rect,
    pub footer: Rect,
}

/// Height of the active subtitle panel (border included).
pub const CURRENT_HEIGHT: u16 = 5;

/// Split the frame into the player areas.
pub fn player_layout(area: Rect) -> PlayerLayout {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(CURRENT_HEIGHT),
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

    PlayerLayout {
        header: chunks[0],
        current: chunks[1],
        history: chunks[2],
        progress: chunks[3],
        status: chunks[4],
        footer: chunks[5],
    }
}

/// Create a centered layout with the given constraints.
///
/// Returns the center area that can be used for content.
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical_layout[1])[1]
}
