//! VitalViz - FHIR Vital-Signs Demographics Visualizer
//!
//! A CLI tool that retrieves patients and their vital-sign observations
//! from a FHIR server, averages four metrics per age and gender, and
//! renders comparative line charts to an SVG file.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (connection, config, malformed data, etc.)

mod analysis;
mod chart;
mod cli;
mod config;
mod fhir;
mod models;
mod retriever;

use analysis::VitalsCollector;
use anyhow::{Context, Result};
use cli::Args;
use config::Config;
use fhir::{FhirClient, FhirClientConfig};
use models::Metric;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("VitalViz v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    // Run the pipeline
    if let Err(e) = run(args).await {
        error!("Run failed: {}", e);
        eprintln!("\n❌ Error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .vitalviz.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(".vitalviz.toml");

    if path.exists() {
        eprintln!("⚠️  .vitalviz.toml already exists. Remove it first or edit it manually.");
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).context("Failed to write .vitalviz.toml")?;

    println!("✅ Created .vitalviz.toml with default settings.");
    println!("   Edit it to customize the server URL, sample size, and chart output.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run the complete retrieve-aggregate-render pipeline.
async fn run(args: Args) -> Result<()> {
    let start_time = Instant::now();

    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let sample_size = config.general.sample_size;
    let output = PathBuf::from(&config.chart.output);

    // Step 1: Connect to the FHIR endpoint
    println!("🏥 FHIR server: {}", config.fhir.base_url);
    println!("   Sample size: {}", sample_size);
    println!("   Timeout: {}s", config.fhir.timeout_seconds);

    let client = FhirClient::new(FhirClientConfig {
        base_url: config.fhir.base_url.clone(),
        timeout_seconds: config.fhir.timeout_seconds,
        page_size: config.fhir.page_size,
    });

    // Step 2: Retrieve and aggregate
    println!("\n📥 Retrieving patient observations...\n");

    let mut collector = VitalsCollector::new();
    let show_progress = !args.quiet && !args.no_progress;
    retriever::retrieve_data(&client, &mut collector, sample_size, show_progress).await?;

    if collector.total_samples() == 0 {
        warn!("No vital-sign samples were collected; charts will be empty");
    }

    // Step 3: Render the charts
    println!("\n📊 Rendering charts...");
    chart::render_charts(
        &collector,
        sample_size,
        &output,
        config.chart.width,
        config.chart.height,
    )?;

    // Print summary
    let duration = start_time.elapsed().as_secs_f64();

    println!("\n📊 Sample Summary:");
    for metric in Metric::ALL {
        println!(
            "   {}: {} samples",
            metric,
            collector.samples(metric).len()
        );
    }
    println!("   Duration: {:.1}s", duration);
    println!("\n✅ Charts saved to: {}", output.display());

    Ok(())
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from .vitalviz.toml");
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
