//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// VitalViz - FHIR vital-signs demographics visualizer
///
/// Retrieves patients and their vital-sign observations from a FHIR
/// server, averages weight, BMI, heart rate, and respiratory rate per
/// age and gender, and renders comparative line charts to an SVG file.
///
/// Examples:
///   vitalviz --base-url http://localhost:8080/fhir
///   vitalviz --base-url http://localhost:8080/fhir --sample-size 200
///   vitalviz --output demographics.svg --quiet
///   vitalviz --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// FHIR server base URL
    ///
    /// The server must speak plain FHIR REST search for Patient and
    /// Observation resources. Can also be set via the FHIR_BASE_URL env
    /// var or .vitalviz.toml config.
    #[arg(
        short,
        long,
        default_value = "http://localhost:8080/fhir",
        env = "FHIR_BASE_URL",
        value_name = "URL"
    )]
    pub base_url: String,

    /// Number of patients to process
    ///
    /// Patients beyond this count are dropped in server order.
    #[arg(short, long, default_value = "600", value_name = "COUNT")]
    pub sample_size: usize,

    /// Output file path for the rendered charts
    #[arg(
        short,
        long,
        default_value = "vitalviz_charts.svg",
        value_name = "FILE"
    )]
    pub output: PathBuf,

    /// Total chart image width in pixels
    #[arg(long, default_value = "1600", value_name = "PX")]
    pub width: u32,

    /// Total chart image height in pixels
    #[arg(long, default_value = "900", value_name = "PX")]
    pub height: u32,

    /// Path to configuration file
    ///
    /// If not specified, looks for .vitalviz.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Request timeout in seconds
    ///
    /// How long to wait for each FHIR response. Default: from config or 30s.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable the per-patient progress bar
    #[arg(long)]
    pub no_progress: bool,

    /// Generate a default .vitalviz.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // Validate server URL format
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err("FHIR base URL must start with 'http://' or 'https://'".to_string());
        }

        // Validate sample size
        if self.sample_size == 0 {
            return Err("Sample size must be at least 1".to_string());
        }

        // Validate chart dimensions
        if self.width == 0 || self.height == 0 {
            return Err("Chart width and height must be at least 1 pixel".to_string());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        // Validate timeout if provided
        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
