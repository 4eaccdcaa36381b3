//! `freight-mode`: recommends air or ocean freight per shipment.
//!
//! Usage:
//! ```bash
//! freight-mode run --shipments shipments.csv --output decisions.csv
//! freight-mode demo --count 80 --seed 11 --output shipments.csv
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing::{error, info};

use freight_mode_advisor::{
    app::{self, PipelineOverrides, RunOptions, DEFAULT_DEMO_COUNT, DEFAULT_DEMO_SEED, DEFAULT_OUTPUT},
    infra::{bts::FetchMode, report::{render_summary, OutputFormat}},
    util::{logging, version::{version_label, APP_NAME}},
};

#[derive(Parser)]
#[command(name = "freight-mode")]
#[command(version, about = "Air vs ocean freight mode recommendations", long_about = None)]
struct Cli {
    /// Log level: trace, debug, info, warn, error (RUST_LOG takes precedence)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Price a shipment batch and recommend a mode per shipment
    Run(RunArgs),
    /// Write a reproducible demo shipment batch
    Demo(DemoArgs),
}

#[derive(Args)]
struct RunArgs {
    /// Shipment CSV; demo shipments are used when omitted
    #[arg(short, long)]
    shipments: Option<PathBuf>,

    /// Result file path
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Result file format
    #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
    format: OutputFormat,

    /// Rate workbook URL (defaults to the configured BTS workbook)
    #[arg(long, env = "FREIGHT_RATES_URL", conflicts_with = "rates_file")]
    rates_url: Option<String>,

    /// Local copy of the rate workbook
    #[arg(long)]
    rates_file: Option<PathBuf>,

    /// Ignore a fresh rate cache and fetch again
    #[arg(long, conflicts_with = "offline")]
    refresh: bool,

    /// Only use cached rates
    #[arg(long)]
    offline: bool,

    /// JSON config file
    #[arg(long, env = "FREIGHT_MODE_CONFIG")]
    config: Option<PathBuf>,

    /// Directory for the rate cache
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Air rate, USD per chargeable kg
    #[arg(long)]
    air_rate: Option<f64>,

    /// Air minimum charge, USD
    #[arg(long)]
    air_min_charge: Option<f64>,

    /// Air transit days
    #[arg(long)]
    air_days: Option<u32>,

    /// Ocean transit days
    #[arg(long)]
    ocean_days: Option<u32>,

    /// Demo shipments to generate when no shipment file is given
    #[arg(long, default_value_t = DEFAULT_DEMO_COUNT)]
    demo_count: usize,

    /// Seed for demo shipments
    #[arg(long, default_value_t = DEFAULT_DEMO_SEED)]
    demo_seed: u64,
}

impl RunArgs {
    fn into_options(self) -> RunOptions {
        let fetch_mode = if self.offline {
            FetchMode::Offline
        } else if self.refresh {
            FetchMode::Refresh
        } else {
            FetchMode::PreferCache
        };
        RunOptions {
            shipments: self.shipments,
            output: self.output,
            format: self.format,
            rates_url: self.rates_url,
            rates_file: self.rates_file,
            fetch_mode,
            config_path: self.config,
            cache_dir: self.cache_dir,
            overrides: PipelineOverrides {
                air_usd_per_chg_kg: self.air_rate,
                air_min_charge_usd: self.air_min_charge,
                air_transit_days: self.air_days,
                ocean_transit_days: self.ocean_days,
            },
            demo_count: self.demo_count,
            demo_seed: self.demo_seed,
        }
    }
}

#[derive(Args)]
struct DemoArgs {
    #[arg(long, default_value_t = DEFAULT_DEMO_COUNT)]
    count: usize,

    #[arg(long, default_value_t = DEFAULT_DEMO_SEED)]
    seed: u64,

    #[arg(short, long, default_value = "demo_shipments.csv")]
    output: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(&cli.log_level);
    info!("{APP_NAME} {}", version_label());

    match cli.command {
        Command::Run(args) => match app::run(args.into_options()).await {
            Ok(outcome) => {
                info!(rates = ?outcome.rates_status, "run complete");
                println!("\nWrote: {}", outcome.output.display());
                println!("\nMode summary:");
                print!(
                    "{}",
                    render_summary(&outcome.summaries, &outcome.report.failures)
                );
                ExitCode::SUCCESS
            }
            Err(err) => {
                error!("{err}");
                ExitCode::FAILURE
            }
        },
        Command::Demo(args) => match app::write_demo(&args.output, args.count, args.seed) {
            Ok(shipments) => {
                println!("Wrote {} shipments to {}", shipments.len(), args.output.display());
                ExitCode::SUCCESS
            }
            Err(err) => {
                error!("{err}");
                ExitCode::FAILURE
            }
        },
    }
}
