//! Single-city report: descriptive statistics, anomalies, seasonal profiles
//! and an optional comparison of the live temperature with the season's band.

use std::fmt::Write as _;

use anyhow::{bail, Context, Result};

use crate::analyzer::seasonal::mean_std;
use crate::analyzer::{CityAnalysis, CityAnalyzer};
use crate::dataset::Dataset;
use crate::table::{self, format_float};
use crate::types::{Season, TemperatureRecord};
use crate::weather::{WeatherError, WeatherProvider};

const HEAD_ROWS: usize = 5;
pub const CURRENT_TEMP_FAILED: &str = "Failed to fetch current temperature";

/// Count, mean, sample std, min, quartiles and max of a sample
#[derive(Debug, Clone, PartialEq)]
pub struct Describe {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub q50: f64,
    pub q75: f64,
    pub max: f64,
}

impl Describe {
    pub fn of(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        let (mean, std) = mean_std(values);

        Some(Self {
            count: values.len(),
            mean,
            std,
            min: sorted[0],
            q25: quantile(&sorted, 0.25),
            q50: quantile(&sorted, 0.50),
            q75: quantile(&sorted, 0.75),
            max: sorted[sorted.len() - 1],
        })
    }
}

/// Linear interpolation between closest ranks; `sorted` must be non-empty.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// How the live temperature compares with the season's band
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Normal { lower: f64, upper: f64 },
    Anomalous { lower: f64, upper: f64 },
    /// The season has a single record, so no band exists
    InsufficientData,
    /// The city has no records for the season
    NoHistory,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LiveCheck {
    Measured { temperature: f64, season: Season, verdict: Verdict },
    /// User-facing reason the live temperature is missing
    Unavailable(String),
}

/// Compare `temperature` with the band of `season`. Band edges count as normal.
pub fn classify(temperature: f64, analysis: &CityAnalysis, season: Season, sigma: f64) -> Verdict {
    match analysis.season(season) {
        None => Verdict::NoHistory,
        Some(stats) if !stats.has_band() => Verdict::InsufficientData,
        Some(stats) => {
            let (lower, upper) = stats.bounds(sigma);
            if lower <= temperature && temperature <= upper {
                Verdict::Normal { lower, upper }
            } else {
                Verdict::Anomalous { lower, upper }
            }
        }
    }
}

/// Fetch the live temperature for the analyzed city and classify it.
///
/// A bad key or unknown city on geocoding, and any failure of the
/// current-weather call, become `LiveCheck::Unavailable`. Other geocoding
/// failures are returned as errors.
pub async fn check_live_temperature(
    provider: &dyn WeatherProvider,
    analysis: &CityAnalysis,
    season: Season,
    sigma: f64,
) -> Result<LiveCheck> {
    let coords = match provider.geocode(&analysis.city).await {
        Ok(c) => c,
        Err(e @ (WeatherError::InvalidApiKey | WeatherError::CityNotFound(_))) => {
            tracing::warn!(provider = provider.name(), city = %analysis.city, error = %e, "Geocoding rejected");
            return Ok(LiveCheck::Unavailable(e.to_string()));
        }
        Err(e) => {
            return Err(e).with_context(|| format!("Geocoding '{}' failed", analysis.city));
        }
    };

    let temperature = match provider.current_temperature(coords).await {
        Ok(t) => t,
        Err(WeatherError::InvalidApiKey) => {
            return Ok(LiveCheck::Unavailable(WeatherError::InvalidApiKey.to_string()));
        }
        Err(e) => {
            tracing::warn!(provider = provider.name(), error = %e, "Current temperature request failed");
            return Ok(LiveCheck::Unavailable(CURRENT_TEMP_FAILED.to_string()));
        }
    };

    Ok(LiveCheck::Measured {
        temperature,
        season,
        verdict: classify(temperature, analysis, season, sigma),
    })
}

#[derive(Debug, Clone)]
pub struct CityReport {
    pub total_records: usize,
    pub total_cities: usize,
    /// First rows of the whole dataset
    pub head: Vec<TemperatureRecord>,
    pub describe: Option<Describe>,
    pub analysis: CityAnalysis,
    pub live: Option<LiveCheck>,
}

impl CityReport {
    pub fn build(dataset: &Dataset, city: &str, analyzer: &CityAnalyzer) -> Result<Self> {
        if !dataset.contains_city(city) {
            let known: Vec<&str> = dataset.cities().collect();
            bail!("City '{}' not found in data (available: {})", city, known.join(", "));
        }

        let records = dataset.city_records(city);
        let temps: Vec<f64> = records.iter().map(|r| r.temperature).collect();
        let describe = Describe::of(&temps);
        let analysis = analyzer.analyze(city, records);

        Ok(Self {
            total_records: dataset.len(),
            total_cities: dataset.cities().count(),
            head: dataset.records().iter().take(HEAD_ROWS).cloned().collect(),
            describe,
            analysis,
            live: None,
        })
    }

    pub fn with_live(mut self, live: LiveCheck) -> Self {
        self.live = Some(live);
        self
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        let city = &self.analysis.city;

        let _ = writeln!(
            out,
            "Data loaded: {} records, {} cities\n",
            self.total_records, self.total_cities
        );
        let head_rows: Vec<(usize, Vec<String>)> = self
            .head
            .iter()
            .enumerate()
            .map(|(i, r)| {
                (
                    i,
                    vec![
                        r.city.clone(),
                        r.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
                        format_float(r.temperature),
                        r.season.to_string(),
                    ],
                )
            })
            .collect();
        out.push_str(&table::render(&["city", "timestamp", "temperature", "season"], &head_rows, None));

        let _ = writeln!(out, "\n== Descriptive statistics for {} ==", city);
        if let Some(d) = &self.describe {
            let stats = [
                ("count", d.count.to_string()),
                ("mean", format_float(d.mean)),
                ("std", format_float(d.std)),
                ("min", format_float(d.min)),
                ("25%", format_float(d.q25)),
                ("50%", format_float(d.q50)),
                ("75%", format_float(d.q75)),
                ("max", format_float(d.max)),
            ];
            for (name, value) in stats {
                let _ = writeln!(out, "{:<6}{:>16}", name, value);
            }
        }

        let anomalies: Vec<_> = self.analysis.anomalies().cloned().collect();
        let _ = writeln!(
            out,
            "\n== Temperature anomalies: {} of {} records ==",
            anomalies.len(),
            self.analysis.records.len()
        );
        if !anomalies.is_empty() {
            out.push_str(&table::render_records(&anomalies, 0));
        }

        let _ = writeln!(out, "\n== Seasonal profiles ==");
        out.push_str(&table::render_seasons(&self.analysis.seasons));

        if let Some(live) = &self.live {
            let _ = writeln!(out, "\n== Current temperature ==");
            match live {
                LiveCheck::Unavailable(reason) => {
                    let _ = writeln!(out, "Error: {}", reason);
                }
                LiveCheck::Measured { temperature, season, verdict } => {
                    let _ = writeln!(out, "Current temperature: {}°C", temperature);
                    let line = match verdict {
                        Verdict::Normal { lower, upper } => format!(
                            "Current temperature is normal for {} ({:.2}..{:.2})",
                            season, lower, upper
                        ),
                        Verdict::Anomalous { lower, upper } => format!(
                            "Current temperature is anomalous for {} ({:.2}..{:.2})",
                            season, lower, upper
                        ),
                        Verdict::InsufficientData => {
                            format!("Insufficient data for {}: only one historical record", season)
                        }
                        Verdict::NoHistory => format!("No historical records for {}", season),
                    };
                    let _ = writeln!(out, "{}", line);
                }
            }
        }

        out
    }
}
