mod config;
mod content;
mod play;
mod service;
mod session;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use content::{BuiltinPool, FileCatalog, LocationPool, SelectionPolicy, SyncReport};
use geoguess::{haversine_km, score, Location};
use service::{GameService, GameSettings};
use session::SessionStore;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "geoguess", version, about = "Guess where a panorama was taken")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Play one game in the terminal
    Play {
        /// Rounds per game [env: GEOGUESS_ROUND_COUNT, default 5]
        #[arg(long)]
        rounds: Option<usize>,
        /// Location catalog directory [env: GEOGUESS_DATA_DIR]
        #[arg(long)]
        data_dir: Option<PathBuf>,
        /// `random` or `sequential` [env: GEOGUESS_SELECTION]
        #[arg(long)]
        selection: Option<SelectionPolicy>,
    },
    /// Maintain a location catalog directory
    Catalog {
        #[command(subcommand)]
        command: CatalogCommand,
    },
    /// Score a guess against a known location
    Score {
        #[arg(allow_negative_numbers = true)]
        actual_lat: f64,
        #[arg(allow_negative_numbers = true)]
        actual_lon: f64,
        #[arg(allow_negative_numbers = true)]
        guess_lat: f64,
        #[arg(allow_negative_numbers = true)]
        guess_lon: f64,
    },
}

#[derive(Subcommand)]
enum CatalogCommand {
    /// List every deliverable in job_listings.json that is not listed yet
    Sync {
        /// Catalog directory [env: GEOGUESS_DATA_DIR]
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _guard = init_tracing(config::get_log_dir());
    let cli = Cli::parse();

    match cli.command {
        Command::Score {
            actual_lat,
            actual_lon,
            guess_lat,
            guess_lon,
        } => {
            let actual = Location::new(actual_lat, actual_lon)?;
            let guess = Location::new(guess_lat, guess_lon)?;
            println!("Distance: {:.1} km", haversine_km(&actual, &guess));
            println!("Score: {}", score(&actual, &guess));
        }
        Command::Catalog {
            command: CatalogCommand::Sync { data_dir },
        } => {
            let Some(dir) = data_dir.or_else(config::get_data_dir) else {
                anyhow::bail!("no catalog directory: pass --data-dir or set GEOGUESS_DATA_DIR");
            };
            let SyncReport {
                added,
                already_listed,
            } = content::sync_listings(&dir)?;
            for project_id in &added {
                println!("Added: {}", project_id);
            }
            println!(
                "{} new project(s), {} already listed",
                added.len(),
                already_listed
            );
        }
        Command::Play {
            rounds,
            data_dir,
            selection,
        } => {
            let settings = GameSettings {
                round_count: rounds.unwrap_or_else(config::get_round_count),
                selection: selection.unwrap_or_else(config::get_selection_policy),
            };
            let pool = open_pool(data_dir.or_else(config::get_data_dir))?;

            let store = Arc::new(SessionStore::new());
            let service = GameService::new(store.clone(), pool, settings);

            tracing::info!(
                rounds = settings.round_count,
                selection = %settings.selection,
                "Starting game"
            );
            let mut stdout = std::io::stdout();
            let result = play::run_play(&service, tokio::io::stdin(), &mut stdout).await;

            tracing::debug!(games = store.len().await, "Game finished");
            store.shutdown().await;
            result?;
        }
    }

    Ok(())
}

fn open_pool(data_dir: Option<PathBuf>) -> anyhow::Result<Arc<dyn LocationPool>> {
    match data_dir {
        Some(dir) => {
            let catalog = FileCatalog::open(dir)?;
            tracing::info!(
                projects = catalog.projects().len(),
                "Using location catalog: {}",
                catalog.dir().display()
            );
            let pool: Arc<dyn LocationPool> = Arc::new(catalog);
            Ok(pool)
        }
        None => {
            tracing::info!("Using built-in sample locations");
            let pool: Arc<dyn LocationPool> = Arc::new(BuiltinPool::new()?);
            Ok(pool)
        }
    }
}

/// Log to stderr, or to a daily rolling file when a log directory is set.
/// The returned guard must stay alive for file logs to be flushed.
fn init_tracing(log_dir: Option<PathBuf>) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match log_dir {
        Some(dir) => {
            let file_appender = tracing_appender::rolling::daily(dir, "geoguess");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .with_writer(non_blocking)
                        .with_ansi(false)
                        .with_target(true)
                        .with_line_number(true),
                )
                .with(filter)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(std::io::stderr))
                .with(filter)
                .init();
            None
        }
    }
}
