use std::io::Read;
use std::path::PathBuf;

use eyre::{Result, bail};
use log::info;

mod cli;

use cli::{Cli, Command};
use ytstats::pipeline::{self, Progress};
use ytstats::youtube::YouTubeApi;

fn setup_logging() -> Result<()> {
    let log_dir = log_dir();
    std::fs::create_dir_all(&log_dir)?;
    let log_file = log_dir.join("ytstats.log");

    let target = Box::new(std::fs::OpenOptions::new().create(true).append(true).open(&log_file)?);

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized: {}", log_file.display());
    Ok(())
}

fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ytstats")
        .join("logs")
}

fn build_after_help() -> String {
    let config_path = ytstats::config::config_path();
    let log_path = log_dir().join("ytstats.log");

    format!(
        "API KEY:\n  Looked up in order: --api-key, YOUTUBE_API_KEY, then `api_key` in\n  {}\n\nLogs are written to: {}",
        config_path.display(),
        log_path.display()
    )
}

fn resolve_api_key(cli_key: Option<String>, config: &ytstats::config::Config) -> Result<String> {
    if let Some(key) = cli_key {
        return Ok(key);
    }
    if let Ok(key) = std::env::var("YOUTUBE_API_KEY") {
        if !key.trim().is_empty() {
            return Ok(key);
        }
    }
    if let Some(ref key) = config.api_key {
        return Ok(key.clone());
    }
    bail!(
        "no YouTube API key configured\n\nProvide one via --api-key, the YOUTUBE_API_KEY environment variable,\nor `api_key` in {}",
        ytstats::config::config_path().display()
    );
}

fn render_progress(event: Progress) {
    match event {
        Progress::Item { current, total, label } => {
            eprintln!("[{current}/{total}] {label}");
        }
        Progress::Skipped { label, reason } => {
            eprintln!("  skipped {label}: {reason}");
        }
        Progress::Done { output, rows } => {
            eprintln!("Done: {rows} rows written to {}", output.display());
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging()?;

    let after_help = build_after_help();
    let cmd = <Cli as clap::CommandFactory>::command().after_help(after_help);
    let matches = cmd.get_matches();
    let cli = <Cli as clap::FromArgMatches>::from_arg_matches(&matches)?;

    // Load config file (non-fatal if missing/invalid)
    let config = ytstats::config::Config::load().unwrap_or_default();

    if cli.verbose {
        let config_path = ytstats::config::config_path();
        if config_path.exists() {
            eprintln!("Config: {}", config_path.display());
        }
    }

    let api_key = resolve_api_key(cli.api_key.clone(), &config)?;
    let api = YouTubeApi::new(reqwest::Client::new(), api_key);

    let mut progress = render_progress;

    let output = match cli.command {
        Command::Videos { input } => pipeline::process_csv_video(&api, &input, &mut progress).await?,
        Command::Channels { input, keywords } => {
            // Keyword list: from file, the configured default, or stdin.
            let keywords_path = keywords.or_else(|| config.default_keywords_file.clone().map(PathBuf::from));
            let keywords_text = match keywords_path {
                Some(path) => std::fs::read_to_string(&path)?,
                None => {
                    let mut text = String::new();
                    std::io::stdin().read_to_string(&mut text)?;
                    text
                }
            };
            if pipeline::parse_keywords(&keywords_text).is_empty() {
                bail!("no keywords provided\n\nUsage: ytstats channels <INPUT> --keywords <FILE>\n       ytstats channels <INPUT> < keywords.txt");
            }
            pipeline::analyze_channels(&api, &input, &keywords_text, &mut progress).await?
        }
    };

    println!("{}", output.display());
    Ok(())
}
