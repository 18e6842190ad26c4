use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::{Datelike, Utc};
use clap::{Parser, Subcommand};
use tracing::{error, info};

use tempwatch::analyzer::CityAnalyzer;
use tempwatch::batch;
use tempwatch::config::Config;
use tempwatch::dataset::Dataset;
use tempwatch::report::{self, CityReport};
use tempwatch::table;
use tempwatch::types::Season;
use tempwatch::weather::OpenWeatherClient;

#[derive(Parser, Debug)]
#[command(name = "tempwatch", about = "Rolling averages and seasonal anomaly flags for city temperature series")]
struct Cli {
    /// Path to configuration file (default: ./tempwatch.toml if present)
    #[arg(short, long)]
    config: Option<String>,

    /// Validate config and exit
    #[arg(long)]
    check: bool,

    /// Print version and exit
    #[arg(short, long)]
    version: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze every city in parallel and print the combined table
    Batch {
        /// Input CSV (overrides data.input_path)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Also write every annotated row to this CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Report on one city and optionally compare its live temperature
    Report {
        /// City to analyze, exactly as written in the data
        #[arg(long)]
        city: String,

        /// Input CSV (overrides data.input_path)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// OpenWeatherMap API key (overrides weather.api_key)
        #[arg(long, env = "OPENWEATHER_API_KEY", hide_env_values = true)]
        api_key: Option<String>,

        /// Season for the live check (default: season of the current month)
        #[arg(long)]
        season: Option<Season>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.version {
        println!("tempwatch {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    // Load configuration
    let config = Config::load_or_default(cli.config.as_deref())?;

    if cli.check {
        println!("Configuration is valid.");
        return Ok(());
    }

    // Initialize logging
    init_logging(&config)?;

    info!(version = env!("CARGO_PKG_VERSION"), "Starting tempwatch");

    let command = cli.command.unwrap_or(Command::Batch { input: None, output: None });
    if let Err(e) = run(command, config).await {
        error!(error = %e, "tempwatch terminated with error");
        return Err(e);
    }

    Ok(())
}

fn init_logging(config: &Config) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| {
            tracing_subscriber::EnvFilter::new(&config.general.log_level)
        });

    // stdout is reserved for results
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .init();

    Ok(())
}

async fn run(command: Command, config: Config) -> Result<()> {
    match command {
        Command::Batch { input, output } => {
            let path = input.unwrap_or_else(|| PathBuf::from(&config.data.input_path));
            run_batch(path, output, config).await
        }
        Command::Report { city, input, api_key, season } => {
            let path = input.unwrap_or_else(|| PathBuf::from(&config.data.input_path));
            run_report(path, &city, api_key, season, &config).await
        }
    }
}

async fn run_batch(path: PathBuf, output: Option<PathBuf>, config: Config) -> Result<()> {
    let preview = config.batch.preview_rows;

    let (rows, elapsed) = tokio::task::spawn_blocking(move || -> Result<_> {
        let dataset = Dataset::load(&path)?;
        let start = Instant::now();
        let rows = batch::analyze_dataset(&dataset, &config)?;
        Ok((rows, start.elapsed()))
    })
    .await
    .context("Batch worker panicked")??;

    println!("Execution time: {} ms", elapsed.as_secs_f64() * 1000.0);
    println!("{}", table::render_records(&rows, preview));

    if let Some(out) = output {
        table::write_csv(&rows, &out)?;
    }
    Ok(())
}

async fn run_report(
    path: PathBuf,
    city: &str,
    api_key: Option<String>,
    season: Option<Season>,
    config: &Config,
) -> Result<()> {
    let dataset = Dataset::load(&path)?;
    let analyzer = CityAnalyzer::new(&config.analysis);
    let mut city_report = CityReport::build(&dataset, city, &analyzer)?;

    let api_key = api_key
        .or_else(|| config.weather.api_key.clone())
        .filter(|k| !k.trim().is_empty());

    if let Some(key) = api_key {
        let client = OpenWeatherClient::new(&config.weather, key)?;
        let season = season.unwrap_or_else(|| Season::for_month(Utc::now().month()));
        let live =
            report::check_live_temperature(&client, &city_report.analysis, season, analyzer.sigma()).await?;
        city_report = city_report.with_live(live);
    } else {
        info!("No API key configured, skipping live temperature");
    }

    print!("{}", city_report.render());
    Ok(())
}
