use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::utils::constants::DEFAULT_SHOW_LIMIT;

#[derive(Parser)]
#[command(name = "weather-etl")]
#[command(about = "Collect current weather and air quality per city into a deduplicated store")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(short, long, global = true, help = "Hide progress output")]
    pub quiet: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,

    #[arg(short, long, global = true, help = "TOML configuration file")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, help = "SQLite database path [default: data/weather.db]")]
    pub database: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Collect, normalize, snapshot and merge one batch
    Run {
        #[arg(long, help = "CSV snapshot path [default: output/weather_data.csv]")]
        csv_output: Option<PathBuf>,

        #[arg(long, help = "Per-request timeout in seconds")]
        timeout_secs: Option<u64>,

        #[arg(long, help = "Stop before touching the database")]
        dry_run: bool,

        #[arg(long, help = "Skip writing the CSV snapshot")]
        no_snapshot: bool,

        #[arg(long, help = "Request one location at a time")]
        sequential: bool,

        #[arg(long, default_value_t = DEFAULT_SHOW_LIMIT, help = "Recent rows to print after the merge (0 = none)")]
        show: usize,
    },

    /// Collect and normalize into the CSV snapshot without loading
    Collect {
        #[arg(long, help = "CSV snapshot path [default: output/weather_data.csv]")]
        csv_output: Option<PathBuf>,

        #[arg(long, help = "Per-request timeout in seconds")]
        timeout_secs: Option<u64>,

        #[arg(long, help = "Request one location at a time")]
        sequential: bool,
    },

    /// Merge a previously written CSV snapshot into the database
    Load {
        #[arg(short, long, help = "CSV snapshot to load [default: configured csv_output]")]
        input: Option<PathBuf>,

        #[arg(long, default_value_t = DEFAULT_SHOW_LIMIT)]
        show: usize,
    },

    /// Print the row count and most recent stored observations
    Show {
        #[arg(short, long, default_value_t = DEFAULT_SHOW_LIMIT)]
        limit: usize,
    },

    /// List the weather code table
    Codes,
}
