//! Bazaar query bridge CLI
//!
//! Watches the front-end's request file and keeps the result files current.

use std::path::PathBuf;
use std::sync::Arc;

use bazaar_query::{
    config::RequestFile,
    error::{AppError, Result},
    models::{Settings, parse_terms},
    pipeline::{self, Bridge, BridgePaths},
    services::{BazaarClient, BazaarSource},
};
use clap::{Parser, Subcommand};

/// Bazaar Query Server - bridges in-game searches to the web Bazaar
#[derive(Parser, Debug)]
#[command(
    name = "bazaar-query",
    version,
    about = "Bridges in-game Bazaar searches to the web Bazaar"
)]
struct Cli {
    /// Directory holding the request file and the result files
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Request file (read)
    #[arg(long, default_value = "BazMonitor.ini", global = true)]
    monitor: String,

    /// Search results CSV file (write)
    #[arg(long, default_value = "BazMon_SearchResults.csv", global = true)]
    search_results: String,

    /// Monitor results CSV file (write)
    #[arg(long, default_value = "BazMon_MonitorResults.csv", global = true)]
    monitor_results: String,

    /// Optional TOML file with HTTP, page and pacing settings
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Log level
    #[arg(
        long,
        default_value = "info",
        global = true,
        value_parser = ["off", "error", "warn", "info", "debug", "trace"]
    )]
    log_level: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Watch the request file and serve results (default)
    Serve,

    /// Validate settings and the request file, print the parsed requests
    Validate,

    /// Run a single query and print the rows
    Query {
        /// Term string, e.g. "Name|Velium Shard/PriceMax|1000"
        terms: String,

        /// Query ID written in the first column
        #[arg(long, default_value = "cli")]
        id: String,

        /// Print rows as JSON instead of CSV-like lines
        #[arg(long)]
        json: bool,
    },

    /// Print the Bazaar URL for a term string without fetching it
    Url { terms: String },
}

/// Initialize logging from the requested level; `RUST_LOG` wins if set.
fn init_logging(level: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn load_settings(path: Option<&PathBuf>) -> Result<Settings> {
    let settings = match path {
        Some(path) => Settings::load_or_default(path),
        None => Settings::default(),
    };
    settings.validate()?;
    Ok(settings)
}

fn bridge_paths(cli: &Cli) -> Result<BridgePaths> {
    let dir = cli
        .config
        .as_ref()
        .ok_or_else(|| AppError::config("No path to the config directory provided (--config)"))?;
    Ok(BridgePaths::in_dir(
        dir,
        &cli.monitor,
        &cli.search_results,
        &cli.monitor_results,
    ))
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let mut cli = Cli::parse();
    init_logging(&cli.log_level);

    let settings = load_settings(cli.settings.as_ref())?;
    log::debug!("Using log level: {}", cli.log_level);

    match cli.command.take().unwrap_or(Command::Serve) {
        Command::Serve => {
            log::info!("Starting Bazaar Query Server");
            let paths = bridge_paths(&cli)?;
            let client = BazaarClient::new(&settings.http, &settings.bazaar)?;
            let bridge = Arc::new(Bridge::new(paths, &settings, Arc::new(client)));

            pipeline::run_bridge(bridge).await?;
            log::info!("Stopping Bazaar Query Server");
        }

        Command::Validate => {
            log::info!("Settings OK");

            let paths = bridge_paths(&cli)?;
            let file = RequestFile::load(&paths.request_file)?;
            let client = BazaarClient::new(&settings.http, &settings.bazaar)?;

            match file.poll_secs {
                Some(secs) => log::info!("Monitor poll delay: {} seconds", secs),
                None => log::info!(
                    "Monitor poll delay: {} seconds (default)",
                    settings.schedule.default_poll()
                ),
            }
            let monitors = file.monitor_requests();
            let searches = file.search_requests();
            for request in monitors.iter().chain(&searches) {
                log::info!(
                    "{:?} {} -> {}",
                    request.kind,
                    request.id,
                    client.query_url(&request.terms)
                );
            }
            log::info!(
                "Request file OK ({} monitor items, {} search queries)",
                file.monitor.len(),
                file.queries.len()
            );
        }

        Command::Query { terms, id, json } => {
            let client = BazaarClient::new(&settings.http, &settings.bazaar)?;
            let rows = client.query(&id, &parse_terms(&terms)).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                for row in &rows {
                    println!("{},{},{},{}", row.query_id, row.item, row.price, row.seller);
                }
            }
            log::info!("{} rows", rows.len());
        }

        Command::Url { terms } => {
            let client = BazaarClient::new(&settings.http, &settings.bazaar)?;
            println!("{}", client.query_url(&parse_terms(&terms)));
        }
    }

    Ok(())
}
