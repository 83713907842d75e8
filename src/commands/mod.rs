//! Command handlers for the binary

pub mod completions;
pub mod config;
pub mod play;
