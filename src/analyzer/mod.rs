pub mod rolling;
pub mod seasonal;
pub mod zscore;


use crate::config::AnalysisConfig;
use crate::dataset::Partition;
use crate::types::{AnnotatedRecord, SeasonalStats, TemperatureRecord};

/// Result of analyzing one city's partition
#[derive(Debug, Clone, PartialEq)]
pub struct CityAnalysis {
    pub city: String,
    /// Time-sorted, annotated rows
    pub records: Vec<AnnotatedRecord>,
    /// One row per season present, calendar order
    pub seasons: Vec<SeasonalStats>,
}

impl CityAnalysis {
    pub fn anomalies(&self) -> impl Iterator<Item = &AnnotatedRecord> {
        self.records.iter().filter(|r| r.anomaly)
    }

    pub fn season(&self, season: crate::types::Season) -> Option<&SeasonalStats> {
        self.seasons.iter().find(|s| s.season == season)
    }
}

/// Runs the moving-average, seasonal-stats and anomaly-flag steps over a
/// single city's records.
#[derive(Debug, Clone, Copy)]
pub struct CityAnalyzer {
    window: usize,
    sigma: f64,
}

impl CityAnalyzer {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            window: config.window,
            sigma: config.sigma,
        }
    }

    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    pub fn analyze(&self, city: &str, mut records: Vec<TemperatureRecord>) -> CityAnalysis {
        rolling::sort_by_timestamp(&mut records);

        let temps: Vec<f64> = records.iter().map(|r| r.temperature).collect();
        let moving = rolling::moving_average(&temps, self.window);
        let seasons = seasonal::seasonal_stats(&records);
        let records = zscore::annotate(records, &moving, &seasons, self.sigma);

        tracing::debug!(
            city,
            rows = records.len(),
            seasons = seasons.len(),
            anomalies = records.iter().filter(|r| r.anomaly).count(),
            "City analyzed"
        );

        CityAnalysis {
            city: city.to_string(),
            records,
            seasons,
        }
    }

    pub fn analyze_partition(&self, partition: Partition) -> CityAnalysis {
        self.analyze(&partition.city, partition.records)
    }
}

impl Default for CityAnalyzer {
    fn default() -> Self {
        Self::new(&AnalysisConfig::default())
    }
}
