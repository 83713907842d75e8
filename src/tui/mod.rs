//! TUI (Text User Interface) module
//!
//! Terminal presentation layer for the player, using ratatui/crossterm.
//! It only issues transport commands to the session and renders what the
//! session emits.

pub mod app;
pub mod footer;
pub mod player_app;
pub mod progress;
pub mod theme;
pub mod ui;

pub use app::App;
pub use player_app::{InputResult, PlayerApp, PlayerScreen, ScreenOptions};
pub use theme::{current_theme, Theme};
