use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ytstats", about = "YouTube video and channel statistics exporter", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// YouTube Data API key (overrides YOUTUBE_API_KEY and the config file)
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// Show config location and per-item detail
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Fetch stats for a CSV of video URLs (requires a 'url' column)
    Videos {
        /// Input CSV file
        input: PathBuf,
    },

    /// Scan channel uploads for keywords (requires a 'channel_url' column)
    Channels {
        /// Input CSV file
        input: PathBuf,

        /// Newline-separated keyword list (reads from stdin if omitted)
        #[arg(short, long)]
        keywords: Option<PathBuf>,
    },
}
