//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.vitalviz.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// FHIR endpoint settings.
    #[serde(default)]
    pub fhir: FhirConfig,

    /// Chart output settings.
    #[serde(default)]
    pub chart: ChartConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Number of patients to process in one run.
    #[serde(default = "default_sample_size")]
    pub sample_size: usize,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            sample_size: default_sample_size(),
            verbose: false,
        }
    }
}

fn default_sample_size() -> usize {
    600
}

/// FHIR endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FhirConfig {
    /// Base URL of the FHIR server.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Page size requested per search page.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for FhirConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
            page_size: default_page_size(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8080/fhir".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_page_size() -> usize {
    50
}

/// Chart output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartConfig {
    /// Output SVG file path.
    #[serde(default = "default_output")]
    pub output: String,

    /// Total image width in pixels.
    #[serde(default = "default_width")]
    pub width: u32,

    /// Total image height in pixels.
    #[serde(default = "default_height")]
    pub height: u32,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            width: default_width(),
            height: default_height(),
        }
    }
}

fn default_output() -> String {
    "vitalviz_charts.svg".to_string()
}

fn default_width() -> u32 {
    1600
}

fn default_height() -> u32 {
    900
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(".vitalviz.toml");

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        // Endpoint and sampling - always override since they have defaults in CLI
        self.fhir.base_url = args.base_url.clone();
        self.general.sample_size = args.sample_size;

        // Timeout - only override if explicitly provided via CLI
        if let Some(timeout) = args.timeout {
            self.fhir.timeout_seconds = timeout;
        }

        // Chart settings - always override
        self.chart.output = args.output.display().to_string();
        self.chart.width = args.width;
        self.chart.height = args.height;

        // Flags always override
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
