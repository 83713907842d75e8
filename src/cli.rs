//! Command line definitions
//!
//! Kept in the library so `xtask` can render the man page from the same
//! definitions the binary parses.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// Version string: crate version, git commit and build date.
pub const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("VERGEN_GIT_SHA"),
    " ",
    env!("SRTP_BUILD_DATE"),
    ")"
);

/// Play an audio track with its SRT subtitles, synchronized in the terminal.
#[derive(Debug, Parser)]
#[command(name = "srtp", version = VERSION, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub play: PlayArgs,

    /// Log debug output (to the log file)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Options for the player (the default command).
#[derive(Debug, Clone, Default, Args)]
pub struct PlayArgs {
    /// Audio file to pre-load
    #[arg(short, long, value_name = "PATH")]
    pub audio: Option<PathBuf>,

    /// SRT subtitle file to pre-load
    #[arg(short, long, value_name = "PATH")]
    pub srt: Option<PathBuf>,

    /// Synchronization offset in seconds (subtracted before subtitle lookup)
    #[arg(long, value_name = "SECS", allow_negative_numbers = true)]
    pub offset: Option<f64>,

    /// Poll interval in milliseconds
    #[arg(long, value_name = "MS")]
    pub poll_interval: Option<u64>,

    /// Run without the terminal UI: play once and print subtitles as they appear
    #[arg(long)]
    pub headless: bool,

    /// Print events as JSON lines (implies --headless)
    #[arg(long)]
    pub json: bool,

    /// Play without audio output (clock only)
    #[arg(long)]
    pub silent: bool,
}

impl PlayArgs {
    /// Whether to play without the TUI: requested with `--headless` or
    /// `--json`, or forced when stdout is not a terminal.
    pub fn runs_headless(&self, stdout_is_tty: bool) -> bool {
        self.headless || self.json || !stdout_is_tty
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Generate shell completions
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Inspect or create the configuration file
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration as TOML
    Show,
    /// Print the configuration file location
    Path,
    /// Write a default configuration file if none exists
    Init,
}
