//! Reelgraph Import - loads the IMDb dumps into SQLite

use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use reelgraph_common::logging::{init_logging, LogConfig, LogLevel};
use reelgraph_ingest::config::{ImportConfig, DEFAULT_MOVIES_FILE};
use reelgraph_ingest::job::{check_sources, standard_jobs, JobRunner};
use reelgraph_ingest::schema::Schema;
use reelgraph_ingest::sink::SqliteSink;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "reelgraph-import")]
#[command(author, version, about = "Import IMDb dataset dumps into a SQLite database")]
struct Cli {
    /// Directory containing the .tsv dumps
    data_dir: PathBuf,

    /// SQLite database to create or extend
    db_path: PathBuf,

    /// Also merge the movie dataset (file name inside DATA_DIR)
    #[arg(long, value_name = "FILE", num_args = 0..=1, default_missing_value = DEFAULT_MOVIES_FILE)]
    movies: Option<String>,

    /// Hide progress spinners
    #[arg(long)]
    no_progress: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    // Usage errors share the exit status of failed imports
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            process::exit(if e.use_stderr() { 1 } else { 0 });
        }
    };
    dotenvy::dotenv().ok();

    let log_level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };
    let log_config = LogConfig::builder()
        .level(log_level)
        .log_file_prefix("reelgraph-import")
        .build();

    // Environment variables take precedence over flags
    let log_config = match log_config.clone().merge_env() {
        Ok(merged) => merged,
        Err(e) => {
            eprintln!("Warning: ignoring REELGRAPH_LOG_* settings: {e:#}");
            log_config
        }
    };
    let _guard = match init_logging(&log_config) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: logging disabled: {e:#}");
            None
        }
    };

    if let Err(e) = run(&cli) {
        error!(error = %format!("{e:#}"), "Import failed");
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let mut config = ImportConfig::from_env(&cli.data_dir, &cli.db_path)?;
    if let Some(ref movies) = cli.movies {
        config.set_movies_file(movies.clone());
    }
    if cli.no_progress {
        config.set_show_progress(false);
    }
    config.validate()?;

    let jobs = standard_jobs(
        config.data_dir(),
        Arc::new(Schema::imdb()),
        config.movies_file.as_deref(),
    );
    check_sources(&jobs)?;

    let mut sink = SqliteSink::open(config.db_path())
        .with_context(|| format!("Failed to open database {}", config.db_path().display()))?;

    info!(
        data_dir = %config.data_dir().display(),
        db = %config.db_path().display(),
        jobs = jobs.len(),
        "Starting import"
    );
    let summary = JobRunner::new()
        .show_progress(config.show_progress)
        .run(&jobs, &mut sink)?;

    info!(
        records = summary.records(),
        rows = summary.rows(),
        "Import complete"
    );
    Ok(())
}
