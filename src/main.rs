//! Breathwork CLI
//!
//! Command-line interface for the breathing session engine.

use clap::Parser;
use env_logger::Env;
use log::debug;

use breathwork::cli::commands::{self, SimulateOptions};
use breathwork::cli::{Cli, Commands};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    debug!("Breathwork v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Some(cmd) => handle_command(cmd),
        None => {
            println!("Breathwork v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for available commands");
            Ok(())
        }
    }
}

fn handle_command(cmd: Commands) -> anyhow::Result<()> {
    match cmd {
        Commands::Presets { path } => commands::list_presets(&path),
        Commands::Inspect { path, name, config } => {
            commands::inspect(&path, name.as_deref(), config.as_deref())
        }
        Commands::Simulate {
            path,
            name,
            config,
            master,
            duration,
            pace,
            report_every,
        } => commands::simulate(
            &path,
            name.as_deref(),
            config.as_deref(),
            SimulateOptions {
                master,
                duration,
                pace,
                report_every,
            },
        ),
        #[cfg(feature = "realtime")]
        Commands::Play {
            path,
            name,
            config,
            master,
            report_every,
        } => commands::play(
            &path,
            name.as_deref(),
            config.as_deref(),
            master,
            report_every,
        ),
    }
}
