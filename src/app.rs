//! Run driver: config -> shipments -> rates -> pipeline -> report.

use std::{
    fs::File,
    path::{Path, PathBuf},
};

use thiserror::Error;
use time::OffsetDateTime;
use tracing::info;

use crate::{
    domain::{run_pipeline, summarize_by_mode, ModeSummary, PipelineConfig, PipelineReport, Shipment},
    infra::{
        bts::{CacheStatus, DataAcquisitionError, FetchMode, RateSource, RateSourceClient},
        cache::RateCacheStore,
        demo,
        report::{write_results, OutputFormat, ReportError},
        shipments::{load_shipments, write_shipments, SchemaError},
    },
    util::config::{default_cache_dir, load_config, ConfigError},
};

/// Shipments and seed used when no batch file is given.
pub const DEFAULT_DEMO_COUNT: usize = 80;
pub const DEFAULT_DEMO_SEED: u64 = 11;
pub const DEFAULT_OUTPUT: &str = "mode_decisions_output.csv";

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    DataAcquisition(#[from] DataAcquisitionError),
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Report(#[from] ReportError),
    #[error("failed to write demo shipments to {path}: {source}")]
    DemoOutput {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Command-line overrides for individual pipeline settings.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PipelineOverrides {
    pub air_usd_per_chg_kg: Option<f64>,
    pub air_min_charge_usd: Option<f64>,
    pub air_transit_days: Option<u32>,
    pub ocean_transit_days: Option<u32>,
}

impl PipelineOverrides {
    pub fn apply(&self, config: &mut PipelineConfig) {
        if let Some(value) = self.air_usd_per_chg_kg {
            config.air_usd_per_chg_kg = value;
        }
        if let Some(value) = self.air_min_charge_usd {
            config.air_min_charge_usd = value;
        }
        if let Some(value) = self.air_transit_days {
            config.air_transit_days = value;
        }
        if let Some(value) = self.ocean_transit_days {
            config.ocean_transit_days = value;
        }
    }
}

#[derive(Clone, Debug)]
pub struct RunOptions {
    pub shipments: Option<PathBuf>,
    pub output: PathBuf,
    pub format: OutputFormat,
    pub rates_url: Option<String>,
    pub rates_file: Option<PathBuf>,
    pub fetch_mode: FetchMode,
    pub config_path: Option<PathBuf>,
    /// Overrides the platform cache directory.
    pub cache_dir: Option<PathBuf>,
    pub overrides: PipelineOverrides,
    pub demo_count: usize,
    pub demo_seed: u64,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            shipments: None,
            output: PathBuf::from(DEFAULT_OUTPUT),
            format: OutputFormat::default(),
            rates_url: None,
            rates_file: None,
            fetch_mode: FetchMode::default(),
            config_path: None,
            cache_dir: None,
            overrides: PipelineOverrides::default(),
            demo_count: DEFAULT_DEMO_COUNT,
            demo_seed: DEFAULT_DEMO_SEED,
        }
    }
}

#[derive(Clone, Debug)]
pub struct RunOutcome {
    /// Pipeline results plus every shipment that was skipped, at load or during costing.
    pub report: PipelineReport,
    pub summaries: Vec<ModeSummary>,
    pub rates_status: CacheStatus,
    pub output: PathBuf,
}

pub async fn run(options: RunOptions) -> Result<RunOutcome, RunError> {
    let mut config = load_config(options.config_path.as_deref())?;
    options.overrides.apply(&mut config.pipeline);

    // Schema problems surface before any network work.
    let (shipments, mut rejected) = match &options.shipments {
        Some(path) => {
            let batch = load_shipments(path)?;
            (batch.shipments, batch.rejected)
        }
        None => {
            info!(
                count = options.demo_count,
                seed = options.demo_seed,
                "no shipment file given, using demo shipments"
            );
            (demo::generate(options.demo_count, options.demo_seed), Vec::new())
        }
    };

    let source = match &options.rates_file {
        Some(path) => RateSource::LocalFile(path.clone()),
        None => RateSource::remote(
            options
                .rates_url
                .as_deref()
                .unwrap_or(&config.rates.workbook_url),
        )?,
    };
    let cache_dir = options.cache_dir.clone().or_else(default_cache_dir);
    let client = RateSourceClient::with_timeout(config.rates.timeout())?
        .with_ttl(config.rates.cache_ttl())
        .with_cache(cache_dir.map(RateCacheStore::in_dir));
    let payload = client.load_rates(&source, options.fetch_mode).await?;
    info!(
        status = ?payload.status,
        fetched_at = %OffsetDateTime::from(payload.fetched_at),
        "ocean rates ready"
    );

    let mut report = run_pipeline(&shipments, &payload.rates, &config.pipeline);
    report.failures.append(&mut rejected);
    report
        .failures
        .sort_by(|a, b| a.shipment_id.cmp(&b.shipment_id));

    write_results(&options.output, options.format, &report.results)?;
    let summaries = summarize_by_mode(&report.results);

    Ok(RunOutcome {
        report,
        summaries,
        rates_status: payload.status,
        output: options.output,
    })
}

/// Writes a demo batch as a shipment CSV that `run --shipments` accepts.
pub fn write_demo(path: &Path, count: usize, seed: u64) -> Result<Vec<Shipment>, RunError> {
    let shipments = demo::generate(count, seed);
    let demo_error = |source: csv::Error| RunError::DemoOutput {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(|e| demo_error(e.into()))?;
    write_shipments(file, &shipments).map_err(demo_error)?;
    info!(path = %path.display(), count = shipments.len(), "wrote demo shipments");
    Ok(shipments)
}
