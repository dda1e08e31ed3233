//! CLI Module
//!
//! Command-line interface for inspecting presets and running sessions.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use commands::PaceStep;

/// Breathwork - breathing session orchestration engine
#[derive(Parser, Debug)]
#[command(name = "breathwork")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the presets in a preset file
    #[command(name = "presets")]
    Presets {
        /// Preset file (single preset or array)
        path: PathBuf,
    },

    /// Show the voices a preset resolves to and their gains
    #[command(name = "inspect")]
    Inspect {
        /// Preset file (single preset or array)
        path: PathBuf,

        /// Preset name or id within the file
        #[arg(short, long)]
        name: Option<String>,

        /// Engine configuration file (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Run a whole session in virtual time
    #[command(name = "simulate")]
    Simulate {
        /// Preset file (single preset or array)
        path: PathBuf,

        /// Preset name or id within the file
        #[arg(short, long)]
        name: Option<String>,

        /// Engine configuration file (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Master volume in [0, 1]
        #[arg(short, long)]
        master: Option<f32>,

        /// Override the preset duration in seconds
        #[arg(short, long)]
        duration: Option<f64>,

        /// Pace change as SECONDS:DIRECTION or SECONDS:VOICE:DIRECTION (repeatable)
        #[arg(short, long = "pace")]
        pace: Vec<PaceStep>,

        /// Seconds between progress lines
        #[arg(short, long, default_value_t = 60.0)]
        report_every: f64,
    },

    /// Run a session against the wall clock (Ctrl-C stops it gracefully)
    #[cfg(feature = "realtime")]
    #[command(name = "play")]
    Play {
        /// Preset file (single preset or array)
        path: PathBuf,

        /// Preset name or id within the file
        #[arg(short, long)]
        name: Option<String>,

        /// Engine configuration file (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Master volume in [0, 1]
        #[arg(short, long)]
        master: Option<f32>,

        /// Seconds between progress lines
        #[arg(short, long, default_value_t = 10.0)]
        report_every: f64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::PaceDirection;

    #[test]
    fn test_parse_simulate() {
        let cli = Cli::parse_from([
            "breathwork",
            "simulate",
            "presets/library.json",
            "--name",
            "Quick Calm",
            "--pace",
            "30:faster",
            "--pace",
            "45:1:slower",
            "-m",
            "0.5",
        ]);

        match cli.command {
            Some(Commands::Simulate {
                name, pace, master, ..
            }) => {
                assert_eq!(name.as_deref(), Some("Quick Calm"));
                assert_eq!(master, Some(0.5));
                assert_eq!(pace.len(), 2);
                assert_eq!(pace[0].direction, PaceDirection::Increase);
                assert_eq!(pace[1].voice, Some(1));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_verbose_is_global() {
        let cli = Cli::parse_from(["breathwork", "presets", "library.json", "-v"]);
        assert!(cli.verbose);
    }
}
