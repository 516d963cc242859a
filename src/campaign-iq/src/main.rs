//! Campaign IQ — simulate, ingest and analyze multi-platform ad campaign data.
//!
//! Each subcommand persists its output as pretty JSON so later stages (or
//! downstream report tooling) can pick it up.

use anyhow::Context;
use campaign_analytics::{AnalysisResult, PerformanceAnalyzer};
use campaign_core::{AppConfig, ProcessedRecord};
use campaign_ingestion::{DataIngestion, DataSource};
use campaign_simulator::{CampaignSimulator, DataQualityInjector, SeededStream};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const DEFAULT_FILTER: &str =
    "campaign_iq=info,campaign_simulator=info,campaign_ingestion=info,campaign_analytics=info,campaign_core=info";

#[derive(Parser, Debug)]
#[command(name = "campaign-iq")]
#[command(about = "Multi-platform ad campaign simulation and performance analysis")]
#[command(version)]
struct Cli {
    /// Campaign configuration file (TOML, YAML or JSON). Built-in demo campaign if omitted.
    #[arg(long, global = true, env = "CAMPAIGN_IQ_CONFIG")]
    config: Option<PathBuf>,

    /// Random seed (overrides config)
    #[arg(long, global = true, env = "CAMPAIGN_IQ_SEED")]
    seed: Option<u64>,

    /// Emit logs as JSON lines
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Simulate the campaign and inject data-quality issues
    Generate {
        #[command(flatten)]
        raw: RawPath,
    },

    /// Validate and normalize a raw dataset
    Ingest {
        #[command(flatten)]
        raw: RawPath,
        #[command(flatten)]
        processed: ProcessedPath,
        #[command(flatten)]
        quality: QualityPath,
    },

    /// Analyze a processed dataset
    Analyze {
        #[command(flatten)]
        processed: ProcessedPath,
        #[command(flatten)]
        analysis: AnalysisPath,
    },

    /// Generate, ingest and analyze in one pass
    Run {
        #[command(flatten)]
        raw: RawPath,
        #[command(flatten)]
        processed: ProcessedPath,
        #[command(flatten)]
        quality: QualityPath,
        #[command(flatten)]
        analysis: AnalysisPath,
    },
}

#[derive(Args, Debug)]
struct RawPath {
    /// Raw (corrupted) campaign records
    #[arg(long, env = "CAMPAIGN_IQ_RAW_PATH", default_value = "data/raw/campaign_data.json")]
    raw_path: PathBuf,
}

#[derive(Args, Debug)]
struct ProcessedPath {
    /// Processed records with calendar features
    #[arg(
        long,
        env = "CAMPAIGN_IQ_PROCESSED_PATH",
        default_value = "data/processed/processed_data.json"
    )]
    processed_path: PathBuf,
}

#[derive(Args, Debug)]
struct QualityPath {
    /// Data quality report
    #[arg(
        long,
        env = "CAMPAIGN_IQ_QUALITY_PATH",
        default_value = "data/processed/quality_report.json"
    )]
    quality_path: PathBuf,
}

#[derive(Args, Debug)]
struct AnalysisPath {
    /// Performance analysis output
    #[arg(
        long,
        env = "CAMPAIGN_IQ_ANALYSIS_PATH",
        default_value = "data/processed/performance_analysis.json"
    )]
    analysis_path: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json);

    info!("Campaign IQ starting up");

    match &cli.command {
        Commands::Generate { raw } => {
            let config = load_config(&cli)?;
            generate(config, &raw.raw_path)?;
        }
        Commands::Ingest {
            raw,
            processed,
            quality,
        } => {
            ingest(&raw.raw_path, &processed.processed_path, &quality.quality_path)?;
        }
        Commands::Analyze {
            processed,
            analysis,
        } => {
            let records = read_processed(&processed.processed_path)?;
            analyze(&records, &analysis.analysis_path)?;
        }
        Commands::Run {
            raw,
            processed,
            quality,
            analysis,
        } => {
            let config = load_config(&cli)?;
            generate(config, &raw.raw_path)?;
            let records = ingest(&raw.raw_path, &processed.processed_path, &quality.quality_path)?;
            let result = analyze(&records, &analysis.analysis_path)?;
            info!(
                impressions = result.overall_kpis.total_impressions,
                spend = result.overall_kpis.total_spend,
                ctr = result.overall_kpis.average_ctr,
                "Pipeline complete"
            );
        }
    }

    Ok(())
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_FILTER.into());
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => {
            warn!("No config file given, using the built-in demo campaign");
            AppConfig::default()
        }
    };
    if let Some(seed) = cli.seed {
        config.simulation.seed = seed;
    }

    info!(
        brand = %config.campaign.brand_name,
        campaign = %config.campaign.campaign_name,
        days = config.campaign.duration_days,
        budget = config.campaign.total_budget,
        seed = config.simulation.seed,
        "Configuration loaded"
    );
    Ok(config)
}

fn generate(config: AppConfig, raw_path: &Path) -> anyhow::Result<()> {
    let seed = config.simulation.seed;
    let simulator = CampaignSimulator::new(config).context("invalid campaign configuration")?;

    let mut stream = SeededStream::new(seed);
    let clean = simulator.generate_with(&mut stream);
    let outcome = DataQualityInjector::new().corrupt(clean, &mut stream);

    for (platform, count) in &outcome.dropped {
        info!(platform = %platform, dropped = count, "Reporting gap injected");
    }
    if let Some(outlier) = &outcome.outlier {
        info!(
            date = %outlier.date,
            creative = %outlier.creative_id,
            factor = outlier.factor,
            "Outlier injected"
        );
    }

    write_json(raw_path, &outcome.records)?;
    info!(path = %raw_path.display(), records = outcome.records.len(), "Raw data saved");
    Ok(())
}

fn ingest(
    raw_path: &Path,
    processed_path: &Path,
    quality_path: &Path,
) -> anyhow::Result<Vec<ProcessedRecord>> {
    let mut ingestion = DataIngestion::new(DataSource::JsonFile(raw_path.to_path_buf()));
    let (processed, report) = ingestion
        .run()
        .with_context(|| format!("failed to ingest {}", raw_path.display()))?;

    write_json(processed_path, &processed)?;
    write_json(quality_path, &report)?;
    info!(
        processed = %processed_path.display(),
        quality = %quality_path.display(),
        "Processed data saved"
    );
    Ok(processed)
}

fn analyze(records: &[ProcessedRecord], analysis_path: &Path) -> anyhow::Result<AnalysisResult> {
    let result = PerformanceAnalyzer::new(records).run();
    write_json(analysis_path, &result)?;
    info!(path = %analysis_path.display(), "Performance analysis saved");
    Ok(result)
}

fn read_processed(path: &Path) -> anyhow::Result<Vec<ProcessedRecord>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read processed data from {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("malformed processed data in {}", path.display()))
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
