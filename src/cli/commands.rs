use std::fmt::Display;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::cli::args::{Cli, Commands};
use crate::collectors::OpenMeteoClient;
use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result, Stage, StageExt};
use crate::models::weather_code::WEATHER_CODES;
use crate::pipeline::{load_snapshot, Pipeline};
use crate::store::{SqliteStore, StoredObservation};
use crate::utils::progress::ProgressReporter;
use crate::writers::CsvSnapshot;

pub async fn run(cli: Cli) -> Result<()> {
    init_tracing(cli.verbose, cli.log_file.as_deref())?;

    let mut config = PipelineConfig::load(cli.config.as_deref())?;
    if let Some(path) = cli.database {
        config = config.with_database_path(path);
    }

    match cli.command {
        Commands::Run {
            csv_output,
            timeout_secs,
            dry_run,
            no_snapshot,
            sequential,
            show,
        } => {
            let config = apply_overrides(config, csv_output, timeout_secs, sequential);
            config.check()?;

            println!(
                "Collecting {} locations (dry run: {})",
                config.locations.len(),
                dry_run
            );
            let progress = ProgressReporter::new(
                config.locations.len() as u64,
                "Collecting observations...",
                cli.quiet,
            );

            let client = OpenMeteoClient::new(&config).stage(Stage::Collect)?;
            let mut pipeline = Pipeline::new(&config, client).with_snapshot(!no_snapshot);
            if !dry_run {
                let store = SqliteStore::open(&config.database_path).stage(Stage::Load)?;
                pipeline = pipeline.with_sink(store);
            }

            let summary = pipeline.run(Some(&progress)).await?;
            progress.finish_with_message(&format!(
                "Normalized {} rows",
                summary.report.normalized_rows
            ));

            println!("\n{}", summary.report.summary());
            if let Some(path) = &summary.snapshot {
                println!("Snapshot written to {}", path.display());
            }

            match (&summary.merge, pipeline.sink()) {
                (Some(outcome), Some(store)) => {
                    println!("\n{}", outcome.summary());
                    println!("Rows in store: {}", store.count().stage(Stage::Load)?);
                    print_recent(store, show).stage(Stage::Load)?;
                }
                _ => println!("Dry run - database not touched"),
            }
        }

        Commands::Collect {
            csv_output,
            timeout_secs,
            sequential,
        } => {
            let config = apply_overrides(config, csv_output, timeout_secs, sequential);
            config.check()?;

            let progress = ProgressReporter::new(
                config.locations.len() as u64,
                "Collecting observations...",
                cli.quiet,
            );
            let client = OpenMeteoClient::new(&config).stage(Stage::Collect)?;
            let pipeline: Pipeline<'_, _, SqliteStore> = Pipeline::new(&config, client);

            let batch = pipeline.extract(Some(&progress)).await?;
            progress.finish_with_message(&format!("Normalized {} rows", batch.rows.len()));

            // Unlike `run`, the snapshot is the only output here.
            CsvSnapshot::new()
                .write_rows(&batch.rows, &config.csv_output)
                .stage(Stage::Snapshot)?;

            println!("\n{}", batch.report.summary());
            println!("Snapshot written to {}", config.csv_output.display());
        }

        Commands::Load { input, show } => {
            let input = input.unwrap_or_else(|| config.csv_output.clone());
            if !input.exists() {
                return Err(PipelineError::MissingData(format!(
                    "snapshot not found: {}",
                    input.display()
                )));
            }

            let progress = ProgressReporter::new_spinner(
                &format!("Loading {}...", input.display()),
                cli.quiet,
            );
            let mut store = SqliteStore::open(&config.database_path).stage(Stage::Load)?;
            let (report, outcome) = load_snapshot(&input, &mut store)?;
            progress.finish_with_message(&format!("Merged {} rows", outcome.inserted));

            println!("\n{}", report.summary());
            println!("\n{}", outcome.summary());
            println!("Rows in store: {}", store.count().stage(Stage::Load)?);
            print_recent(&store, show).stage(Stage::Load)?;
        }

        Commands::Show { limit } => {
            let store = SqliteStore::open(&config.database_path).stage(Stage::Load)?;
            println!(
                "{}: {} rows",
                config.database_path.display(),
                store.count().stage(Stage::Load)?
            );
            print_recent(&store, limit).stage(Stage::Load)?;
        }

        Commands::Codes => {
            println!("Weather codes:");
            for (code, description) in WEATHER_CODES {
                println!("  {:>3}  {}", code, description);
            }
        }
    }

    Ok(())
}

fn apply_overrides(
    mut config: PipelineConfig,
    csv_output: Option<PathBuf>,
    timeout_secs: Option<u64>,
    sequential: bool,
) -> PipelineConfig {
    if let Some(path) = csv_output {
        config = config.with_csv_output(path);
    }
    if let Some(secs) = timeout_secs {
        config = config.with_timeout_secs(secs);
    }
    if sequential {
        config = config.with_concurrent(false);
    }
    config
}

/// Log to stderr, or to `log_file` when given. `RUST_LOG` wins over `verbose`.
fn init_tracing(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let default_level = if verbose { "weather_etl=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let installed = match log_file {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            let file = File::create(path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => builder.with_writer(std::io::stderr).try_init(),
    };

    match installed {
        Ok(()) => info!(verbose, "logging initialized"),
        // An already installed subscriber keeps receiving events.
        Err(e) => debug!(error = %e, "tracing subscriber not replaced"),
    }
    Ok(())
}

fn print_recent(store: &SqliteStore, limit: usize) -> Result<()> {
    if limit == 0 {
        return Ok(());
    }

    let recent = store.recent(limit)?;
    if recent.is_empty() {
        println!("No stored observations");
        return Ok(());
    }

    println!("\nMost recent observations:");
    for (i, stored) in recent.iter().enumerate() {
        println!("  {}. {}", i + 1, format_stored(stored));
    }
    Ok(())
}

fn format_stored(stored: &StoredObservation) -> String {
    let row = &stored.row;
    let time = row
        .time
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string());

    format!(
        "{} @ {}: {}°C, {}% RH, {} m/s, {} | AQI {} (PM2.5 {}, NO2 {}, O3 {})",
        row.city,
        time,
        or_dash(row.temp_c),
        or_dash(row.humidity_pct),
        or_dash(row.wind_speed_ms),
        row.weather_description,
        or_dash(row.aqi_eu),
        or_dash(row.pm25),
        or_dash(row.no2),
        or_dash(row.o3),
    )
}

fn or_dash<T: Display>(value: Option<T>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ObservationRow;
    use chrono::NaiveDate;
    use clap::Parser;

    #[test]
    fn test_format_stored_row() {
        let time = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        let row = ObservationRow::builder()
            .city("Lisbon")
            .time(time)
            .weather(12.35, 80, 3.2, 0)
            .build()
            .unwrap();

        let line = format_stored(&StoredObservation { id: 1, row });
        assert_eq!(
            line,
            "Lisbon @ 2024-01-01 10:00: 12.35°C, 80% RH, 3.2 m/s, Clear sky | AQI - (PM2.5 -, NO2 -, O3 -)"
        );
    }

    #[tokio::test]
    async fn test_unopenable_database_fails_in_load_stage() {
        let cli = Cli::try_parse_from([
            "weather-etl",
            "-q",
            "--database",
            "/dev/null/sub/w.db",
            "run",
            "--no-snapshot",
        ])
        .unwrap();

        let err = run(cli).await.unwrap_err();
        assert_eq!(err.stage(), Some(Stage::Load));
        assert!(err.to_string().starts_with("load stage failed"));
    }

    #[tokio::test]
    async fn test_show_on_unopenable_database_names_load_stage() {
        let cli =
            Cli::try_parse_from(["weather-etl", "--database", "/dev/null/sub/w.db", "show"]).unwrap();

        let err = run(cli).await.unwrap_err();
        assert_eq!(err.stage(), Some(Stage::Load));
    }

    #[test]
    fn test_overrides_only_touch_given_values() {
        let config = apply_overrides(PipelineConfig::default(), None, Some(5), true);
        assert_eq!(config.timeout_secs, 5);
        assert!(!config.concurrent);
        assert_eq!(config.csv_output, PipelineConfig::default().csv_output);
    }
}
