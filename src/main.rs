use anyhow::Result;
use clap::Parser;

use srtp::cli::{Cli, Commands, ConfigCommands};

mod commands;

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => commands::completions::handle(shell),
        Some(Commands::Config(command)) => match command {
            ConfigCommands::Show => commands::config::handle_show(),
            ConfigCommands::Path => commands::config::handle_path(),
            ConfigCommands::Init => commands::config::handle_init(),
        },
        None => commands::play::handle(&cli.play, cli.verbose),
    }
}
