use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "vidbatch")]
#[command(author, version, about = "Batch video conversion tool")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert every matching video in a directory
    Run {
        /// Directory, or any file inside it (prompts when omitted)
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// Show what would be converted without running ffmpeg
        #[arg(long)]
        dry_run: bool,

        /// Print the batch report as JSON
        #[arg(long)]
        json: bool,

        /// Process files in name order instead of directory order
        #[arg(long)]
        sorted: bool,
    },

    /// Check that ffmpeg and ffprobe are available
    CheckTools,

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Print the effective configuration as TOML
    ShowConfig,
}
