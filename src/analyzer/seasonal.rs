use std::collections::BTreeMap;

use crate::types::{Season, SeasonalStats, TemperatureRecord};

/// Per-season mean and sample standard deviation of one city's records.
///
/// Only seasons present in `records` get a row; rows come back in calendar
/// order. A season with a single record has a NaN standard deviation.
pub fn seasonal_stats(records: &[TemperatureRecord]) -> Vec<SeasonalStats> {
    let mut groups: BTreeMap<Season, Vec<f64>> = BTreeMap::new();
    for r in records {
        groups.entry(r.season).or_default().push(r.temperature);
    }

    groups
        .into_iter()
        .map(|(season, temps)| {
            let (mean, std) = mean_std(&temps);
            SeasonalStats {
                season,
                count: temps.len(),
                mean_temperature: mean,
                std_temperature: std,
            }
        })
        .collect()
}

/// Mean and unbiased (N-1) standard deviation.
pub fn mean_std(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (f64::NAN, f64::NAN);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let sq_diff: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    // n == 1 gives 0/0
    let std = (sq_diff / (n - 1.0)).sqrt();
    (mean, std)
}
