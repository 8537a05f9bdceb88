// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! SentiSense: Feedback Sentiment Dashboard
//!
//! Collects free-text feedback with a rating, labels it with a keyword
//! sentiment classifier, and serves an aggregate dashboard over the CSV
//! feedback ledger.

use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};
use tracing::{error, info};

use sentisense::classifier::classify;
use sentisense::config::AppConfig;
use sentisense::dataset::ReferenceDataset;
use sentisense::ledger::{summarize, FeedbackRecord, Ledger};
use sentisense::{Result, SentiError};

/// SentiSense CLI - Feedback Sentiment Dashboard
#[derive(Parser, Debug)]
#[command(name = "sentisense")]
#[command(author = "Jonathan D. A. Jewell <hyperpolymath>")]
#[command(version = "1.0.0")]
#[command(about = "Keyword-driven feedback sentiment dashboard", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (JSON format)
    #[arg(short, long, default_value = "config.json", global = true)]
    config: PathBuf,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable trace logging (most verbose)
    #[arg(long, global = true)]
    trace: bool,

    /// Output format for results
    #[arg(long, global = true, default_value = "text", value_parser = ["text", "json"])]
    format: String,

    /// Suppress non-essential output (quiet mode)
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the web dashboard
    Serve {
        /// Host to bind to (overrides config)
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,

        /// Open browser automatically
        #[arg(long)]
        open: bool,
    },

    /// Classify a feedback text and save it to the store
    Submit {
        /// Feedback text
        text: String,

        /// Rating from 1 to 5
        #[arg(short, long)]
        rating: i64,
    },

    /// List stored feedback, newest first
    List {
        /// Number of entries to show
        #[arg(short = 'n', long, default_value = "10")]
        count: usize,
    },

    /// Show the aggregate feedback summary
    Summary,

    /// Delete the record at the given physical index
    Delete {
        /// Physical index as shown by `list`
        index: usize,
    },

    /// Initialize a new SentiSense project
    Init {
        /// Directory to initialize (default: current)
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// Force overwrite existing configuration
        #[arg(long)]
        force: bool,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Generate default configuration file
    Generate {
        /// Output file path
        #[arg(short, long, default_value = "config.json")]
        output: PathBuf,
    },

    /// Validate configuration file
    Validate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.trace {
        "trace"
    } else if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    if !cli.quiet {
        info!("SentiSense v1.0.0 - Feedback Sentiment Dashboard");
    }

    // Load configuration
    let config = AppConfig::load(&cli.config)?;

    match cli.command {
        Some(Commands::Serve { host, port, open }) => run_serve(config, host, port, open).await,
        Some(Commands::Submit { text, rating }) => run_submit(config, text, rating, &cli.format),
        Some(Commands::List { count }) => run_list(config, count, &cli.format),
        Some(Commands::Summary) => run_summary(config, &cli.format),
        Some(Commands::Delete { index }) => run_delete(config, index),
        Some(Commands::Init { dir, force }) => run_init(dir, force),
        Some(Commands::Config { action }) => run_config_command(config, action, &cli.config),
        None => {
            // Default: serve the dashboard
            run_serve(config, None, None, false).await
        }
    }
}

/// Run the web dashboard
async fn run_serve(
    mut config: AppConfig,
    host: Option<String>,
    port: Option<u16>,
    open: bool,
) -> Result<()> {
    // Apply CLI overrides
    if let Some(host) = host {
        config.web.host = host;
    }
    if let Some(port) = port {
        config.web.port = port;
    }

    let ledger = Ledger::new(PathBuf::from(&config.store.path));
    ledger.ensure_store()?;
    info!("Feedback store: {}", config.store.path);

    let dataset = ReferenceDataset::load(Path::new(&config.dataset.path));
    if dataset.is_empty() {
        info!("No reference dataset loaded");
    } else {
        info!("Reference dataset: {} rows", dataset.rows);
    }

    if open {
        let url = format!("http://{}:{}", config.web.host, config.web.port);
        if let Err(e) = open_browser(&url) {
            error!("Failed to open browser: {}", e);
        }
    }

    sentisense::web::start_server(config, ledger, dataset).await
}

/// Classify and store one feedback text from the command line
fn run_submit(config: AppConfig, text: String, rating: i64, format: &str) -> Result<()> {
    if text.trim().is_empty() {
        return Err(SentiError::EmptyFeedback);
    }
    if !(1..=5).contains(&rating) {
        return Err(SentiError::InvalidRating(rating));
    }

    let ledger = Ledger::new(PathBuf::from(&config.store.path));
    let mut rng = StdRng::from_entropy();
    let verdict = classify(&text, &mut rng);
    let record = FeedbackRecord::new(text, &verdict, rating);
    ledger.append(&record)?;

    match format {
        "json" => {
            let line = serde_json::json!({
                "timestamp": record.timestamp,
                "sentiment": record.sentiment,
                "positive_pct": record.positive_pct,
                "negative_pct": record.negative_pct,
                "neutral_pct": record.neutral_pct,
                "rating": record.rating,
            });
            println!("{}", serde_json::to_string_pretty(&line)?);
        }
        _ => {
            println!("Result: {} {}", record.sentiment, verdict.emoji());
            println!("  Positive: {:.1}%", record.positive_pct);
            println!("  Negative: {:.1}%", record.negative_pct);
            println!("  Neutral: {:.1}%", record.neutral_pct);
            println!("Saved to {}", config.store.path);
        }
    }

    Ok(())
}

/// List stored feedback, newest first
fn run_list(config: AppConfig, count: usize, format: &str) -> Result<()> {
    let ledger = Ledger::new(PathBuf::from(&config.store.path));
    let mut rows = ledger.list_newest_first()?;
    rows.truncate(count);

    match format {
        "json" => {
            let output: Vec<serde_json::Value> = rows
                .iter()
                .map(|(index, record)| {
                    serde_json::json!({
                        "index": index,
                        "timestamp": record.timestamp,
                        "feedback": record.feedback,
                        "sentiment": record.sentiment,
                        "positive_pct": record.positive_pct,
                        "negative_pct": record.negative_pct,
                        "neutral_pct": record.neutral_pct,
                        "rating": record.rating,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        _ => {
            if rows.is_empty() {
                println!("No feedback saved yet.");
                return Ok(());
            }
            println!("Feedback history ({} entries, latest first):", rows.len());
            for (index, record) in rows {
                println!(
                    "  [{}] {} {} ({}/5) {}",
                    index,
                    record.timestamp,
                    record.sentiment,
                    record.rating,
                    preview(&record.feedback)
                );
            }
        }
    }

    Ok(())
}

/// Show the aggregate summary
fn run_summary(config: AppConfig, format: &str) -> Result<()> {
    let ledger = Ledger::new(PathBuf::from(&config.store.path));
    let records = ledger.read_all()?;
    let summary = summarize(&records);

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&summary)?),
        _ => {
            println!("Feedback Summary:");
            println!("  Total: {}", summary.total);
            println!("  Positive: {}", summary.positive);
            println!("  Negative: {}", summary.negative);
            println!("  Neutral: {}", summary.neutral);
            match summary.average_rating {
                Some(avg) => println!("  Average rating: {:.2} / 5", avg),
                None => println!("  Average rating: no feedback"),
            }
        }
    }

    Ok(())
}

/// Delete one record by physical index
fn run_delete(config: AppConfig, index: usize) -> Result<()> {
    let ledger = Ledger::new(PathBuf::from(&config.store.path));
    let removed = ledger.delete_at(index)?;
    println!(
        "Deleted [{}] {} {}",
        index,
        removed.timestamp,
        preview(&removed.feedback)
    );
    Ok(())
}

/// Initialize a new SentiSense project
fn run_init(dir: Option<PathBuf>, force: bool) -> Result<()> {
    let target = dir.unwrap_or_else(|| PathBuf::from("."));
    let config_path = target.join("config.json");

    if config_path.exists() && !force {
        return Err(SentiError::Config(
            "config.json already exists. Use --force to overwrite".to_string(),
        ));
    }

    std::fs::create_dir_all(&target)?;

    let config = AppConfig::default();
    config.save(&config_path)?;

    let ledger = Ledger::new(target.join(&config.store.path));
    ledger.ensure_store()?;

    println!("SentiSense initialized in {:?}", target);
    println!("\nCreated:");
    println!("  - config.json");
    println!("  - {}", config.store.path);
    println!("\nNext steps:");
    println!("  1. Start the dashboard: sentisense serve");
    println!("  2. Open http://127.0.0.1:8080");

    Ok(())
}

/// Run config commands
fn run_config_command(config: AppConfig, action: ConfigCommands, config_path: &Path) -> Result<()> {
    match action {
        ConfigCommands::Show => {
            let json = serde_json::to_string_pretty(&config)?;
            println!("{}", json);
        }
        ConfigCommands::Generate { output } => {
            AppConfig::default().save(&output)?;
            println!("Generated config at {:?}", output);
        }
        ConfigCommands::Validate => {
            println!("Configuration at {:?} is valid", config_path);
            println!("  Feedback store: {}", config.store.path);
            println!("  Reference dataset: {}", config.dataset.path);
            println!("  Web: {}:{}", config.web.host, config.web.port);
        }
    }

    Ok(())
}

/// One-line preview of a feedback text for terminal output
fn preview(text: &str) -> String {
    const MAX_CHARS: usize = 60;
    let flat = text.replace(['\n', '\r'], " ");
    if flat.chars().count() > MAX_CHARS {
        let truncated: String = flat.chars().take(MAX_CHARS).collect();
        format!("{}...", truncated.trim_end())
    } else {
        flat
    }
}

fn open_browser(url: &str) -> std::io::Result<()> {
    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).spawn()?;
    }
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?;
    }
    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/c", "start", url])
            .spawn()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::try_parse_from(["sentisense"]).unwrap();
        assert!(!cli.verbose);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_cli_serve_command() {
        let cli = Cli::try_parse_from(["sentisense", "serve", "--port", "9000", "--open"]).unwrap();

        match cli.command {
            Some(Commands::Serve { port, open, .. }) => {
                assert_eq!(port, Some(9000));
                assert!(open);
            }
            _ => panic!("Expected Serve command"),
        }
    }

    #[test]
    fn test_cli_submit_command() {
        let cli = Cli::try_parse_from(["sentisense", "submit", "love it", "--rating", "5"]).unwrap();

        match cli.command {
            Some(Commands::Submit { text, rating }) => {
                assert_eq!(text, "love it");
                assert_eq!(rating, 5);
            }
            _ => panic!("Expected Submit command"),
        }
    }

    #[test]
    fn test_cli_delete_command() {
        let cli = Cli::try_parse_from(["sentisense", "delete", "3"]).unwrap();

        match cli.command {
            Some(Commands::Delete { index }) => assert_eq!(index, 3),
            _ => panic!("Expected Delete command"),
        }
    }

    #[test]
    fn preview_flattens_and_truncates() {
        assert_eq!(preview("short\ntext"), "short text");

        let long = "x".repeat(80);
        let shown = preview(&long);
        assert!(shown.ends_with("..."));
        assert_eq!(shown.chars().count(), 63);
    }
}
