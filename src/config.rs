use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Default configuration path, resolved against the working directory
pub const DEFAULT_CONFIG_PATH: &str = "tempwatch.toml";

/// Top-level configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub batch: BatchConfig,
    #[serde(default)]
    pub weather: WeatherConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GeneralConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self { log_level: default_log_level() }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DataConfig {
    #[serde(default = "default_input_path")]
    pub input_path: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self { input_path: default_input_path() }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AnalysisConfig {
    /// Number of records in the trailing moving-average window
    #[serde(default = "default_window")]
    pub window: usize,
    /// Width of the anomaly band in standard deviations
    #[serde(default = "default_sigma")]
    pub sigma: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self { window: default_window(), sigma: default_sigma() }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct BatchConfig {
    /// Worker threads; defaults to the number of CPUs
    #[serde(default)]
    pub workers: Option<usize>,
    /// Rows shown from each end of the printed table
    #[serde(default = "default_preview_rows")]
    pub preview_rows: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self { workers: None, preview_rows: default_preview_rows() }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct WeatherConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_geo_url")]
    pub geo_url: String,
    #[serde(default = "default_weather_url")]
    pub weather_url: String,
    #[serde(default = "default_units")]
    pub units: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            geo_url: default_geo_url(),
            weather_url: default_weather_url(),
            units: default_units(),
            timeout_secs: default_timeout(),
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        Self::parse(&content)
    }

    /// Load `path` if it exists; a missing default file yields built-in defaults.
    pub fn load_or_default(path: Option<&str>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => Self::load(DEFAULT_CONFIG_PATH),
            None => Ok(Self::default()),
        }
    }

    pub fn parse(content: &str) -> Result<Self> {
        // Expand environment variables
        let expanded = expand_env_vars(content)?;

        let config: Config = toml::from_str(&expanded)
            .with_context(|| "Failed to parse configuration")?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.analysis.window == 0 {
            bail!("analysis.window must be at least 1");
        }
        if !(self.analysis.sigma > 0.0) {
            bail!("analysis.sigma must be positive, got {}", self.analysis.sigma);
        }
        if self.batch.workers == Some(0) {
            bail!("batch.workers must be at least 1");
        }
        if self.weather.timeout_secs == 0 {
            bail!("weather.timeout_secs must be at least 1");
        }
        Ok(())
    }
}

/// Expand ${ENV_VAR} references in config string
fn expand_env_vars(input: &str) -> Result<String> {
    let re = regex::Regex::new(r"\$\{([^}]+)\}")?;
    Ok(re
        .replace_all(input, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_default()
        })
        .to_string())
}

// Default value functions
fn default_log_level() -> String { "info".to_string() }
fn default_input_path() -> String { "temperature_data.csv".to_string() }
fn default_window() -> usize { 30 }
fn default_sigma() -> f64 { 2.0 }
fn default_preview_rows() -> usize { 10 }
fn default_geo_url() -> String { "http://api.openweathermap.org/geo/1.0/direct".to_string() }
fn default_weather_url() -> String { "https://api.openweathermap.org/data/2.5/weather".to_string() }
fn default_units() -> String { "metric".to_string() }
fn default_timeout() -> u64 { 10 }
