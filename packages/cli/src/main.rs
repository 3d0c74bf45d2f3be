#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line tools for the air-quality map.
//!
//! ```text
//! air_quality_cli report [--municipality Natal] [--category Boa] [--output relatorio.pdf]
//! air_quality_cli municipalities
//! air_quality_cli aggregate [--municipality Natal] [--category Boa]
//! air_quality_cli serve
//! ```
//!
//! Every command reads the observation source from the configuration
//! (`AIR_QUALITY_CONFIG`, `AIR_QUALITY_SOURCE_URL`); `--source` overrides
//! it with a URL or local CSV path.

use std::path::PathBuf;

use air_quality_aggregate::{aggregate, municipalities};
use air_quality_observation_models::ObservationFilter;
use air_quality_report::{NoAssets, ReportError, ReportOptions, report_filename};
use air_quality_source::{SourceConfig, fetch_assets, fetch_observations};
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "air_quality_cli",
    about = "Render air-quality reports and inspect sensor data"
)]
struct Cli {
    /// Observation spreadsheet URL or local CSV path
    #[arg(long, global = true)]
    source: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Filters {
    /// Only this municipality (case-insensitive)
    #[arg(long)]
    municipality: Option<String>,
    /// Only this category label, e.g. "Muito Ruim" (case-insensitive)
    #[arg(long)]
    category: Option<String>,
}

impl Filters {
    fn to_filter(&self) -> ObservationFilter {
        ObservationFilter::new(self.municipality.as_deref(), self.category.as_deref())
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Render the PDF report
    Report {
        #[command(flatten)]
        filters: Filters,
        /// Output file (defaults to the download name for the filters)
        #[arg(long, short)]
        output: Option<PathBuf>,
        /// Skip downloading the decorative images
        #[arg(long)]
        no_images: bool,
    },
    /// List municipalities with sensors
    Municipalities,
    /// Print per-municipality means
    Aggregate {
        #[command(flatten)]
        filters: Filters,
    },
    /// Start the HTTP server
    Serve,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");
    let cli = Cli::parse();

    let mut config = SourceConfig::load()?;
    if let Some(source) = &cli.source {
        config = config.with_url(source);
    }

    match cli.command {
        Commands::Report {
            filters,
            output,
            no_images,
        } => {
            let client = air_quality_source::client(&config)?;
            let observations = fetch_observations(&client, &config).await?;
            log::debug!("Loaded {} observations from {}", observations.len(), config.url);
            let filter = filters.to_filter();
            let options = ReportOptions {
                asset_urls: config.assets.clone(),
                ..ReportOptions::default()
            };

            let result = if no_images {
                air_quality_report::build(&observations, &filter, &NoAssets, &options)
            } else {
                let assets = fetch_assets(&client, &config.assets).await;
                air_quality_report::build(&observations, &filter, &assets, &options)
            };

            let bytes = match result {
                Ok(bytes) => bytes,
                Err(ReportError::NoMatchingData { .. }) => {
                    eprintln!("No sensors match the selected filters.");
                    std::process::exit(2);
                }
                Err(e) => return Err(e.into()),
            };

            let output = output.unwrap_or_else(|| PathBuf::from(report_filename(&filter)));
            tokio::fs::write(&output, &bytes).await?;
            println!("Wrote {} ({} bytes)", output.display(), bytes.len());
        }
        Commands::Municipalities => {
            let client = air_quality_source::client(&config)?;
            let observations = fetch_observations(&client, &config).await?;
            for name in municipalities(&observations) {
                println!("{name}");
            }
        }
        Commands::Aggregate { filters } => {
            let client = air_quality_source::client(&config)?;
            let observations = fetch_observations(&client, &config).await?;
            let records = aggregate(&observations, &filters.to_filter());

            if records.is_empty() {
                println!("No aggregates found.");
                return Ok(());
            }

            println!("{:<30} {:>10} {:>8}  CATEGORY", "MUNICIPALITY", "MEAN", "SENSORS");
            println!("{}", "-".repeat(64));
            for record in &records {
                println!(
                    "{:<30} {:>10.1} {:>8}  {}",
                    record.locality, record.mean_value, record.sensor_count, record.category
                );
            }
        }
        Commands::Serve => {
            // The server uses actix-web's runtime, so run it in a blocking
            // task to avoid nesting tokio runtimes.
            tokio::task::spawn_blocking(move || {
                actix_web::rt::System::new().block_on(air_quality_server::serve(config))
            })
            .await??;
        }
    }

    Ok(())
}
