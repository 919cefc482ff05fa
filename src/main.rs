use clap::{Parser, Subcommand};
use forecast_scraper::charts::ChartKind;
use forecast_scraper::config::Config;
use forecast_scraper::logging;
use forecast_scraper::pipeline::{format_table, Pipeline};
use forecast_scraper::storage;
use std::path::PathBuf;
use tracing::{error, info};

const HEAD_ROWS: usize = 5;

#[derive(Parser)]
#[command(name = "forecast_scraper")]
#[command(about = "Ten-day weather forecast scraper")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to a TOML config file (defaults to $FORECAST_CONFIG or config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape the forecast page into the raw data file
    Fetch,
    /// Clean the raw data file into the normalized file
    Normalize,
    /// Re-normalize the raw data file (rewriting the normalized file) and render charts
    Plot {
        #[arg(long, value_enum, default_value_t = ChartKind::All)]
        kind: ChartKind,
    },
    /// Normalize, chart temperatures and print the first rows
    Visualize,
    /// Print the normalized table
    Show {
        /// Print as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Fetch, normalize and render every chart (default)
    Run,
}

fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let _guard = logging::init_logging();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;
    let pipeline = Pipeline::from_config(config)?;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Fetch => {
            if pipeline.fetch()?.is_none() {
                println!("⚠️  Nothing was written");
            }
        }
        Commands::Normalize => {
            let records = pipeline.normalize()?;
            println!(
                "✅ Normalized {} days into {}",
                records.len(),
                pipeline.config().output.normalized_file.display()
            );
        }
        Commands::Plot { kind } => {
            let records = pipeline.normalize()?;
            pipeline.plot(&records, kind)?;
        }
        Commands::Visualize => {
            let records = pipeline.visualize()?;
            let head = &records[..records.len().min(HEAD_ROWS)];
            print!("{}", format_table(head));
        }
        Commands::Show { json } => {
            let normalized_file = &pipeline.config().output.normalized_file;
            let records = if normalized_file.exists() {
                storage::read_normalized_records(normalized_file)?
            } else {
                pipeline.normalize()?
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else {
                print!("{}", format_table(&records));
            }
        }
        Commands::Run => {
            println!("🚀 Running full pipeline (fetch + normalize + plot)...");
            match pipeline.run() {
                Ok(Some(result)) => {
                    info!("Pipeline finished");
                    println!("\n📊 Pipeline Results for {}:", result.source);
                    println!("   Fetched days: {}", result.fetched_days);
                    println!("   Normalized days: {}", result.normalized_days);
                    println!("   Data file: {}", result.data_file.display());
                    println!("   Normalized file: {}", result.normalized_file.display());
                    println!("   Charts: {}", result.charts.len());
                }
                Ok(None) => {
                    println!("⚠️  Fetch abandoned, nothing to normalize");
                }
                Err(e) => {
                    error!("Pipeline failed: {}", e);
                    println!("❌ Pipeline failed: {}", e);
                    return Err(e.into());
                }
            }
        }
    }

    Ok(())
}
