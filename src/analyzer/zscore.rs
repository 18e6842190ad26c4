use crate::types::{AnnotatedRecord, SeasonalStats, TemperatureRecord};

/// True when `temperature` lies strictly outside `mean ± sigma * std`.
///
/// With an undefined (NaN) standard deviation both comparisons are false,
/// so single-record seasons are never anomalous.
pub fn is_anomalous(temperature: f64, stats: &SeasonalStats, sigma: f64) -> bool {
    let (lower, upper) = stats.bounds(sigma);
    temperature < lower || temperature > upper
}

/// Left-join records onto their season's stats and flag band violations.
///
/// `moving_average` is positional and must match `records` in length.
pub fn annotate(
    records: Vec<TemperatureRecord>,
    moving_average: &[f64],
    stats: &[SeasonalStats],
    sigma: f64,
) -> Vec<AnnotatedRecord> {
    debug_assert_eq!(records.len(), moving_average.len());

    records
        .into_iter()
        .zip(moving_average.iter().copied())
        .map(|(record, t_moving_average)| {
            let (mean_temperature, std_temperature, anomaly) =
                match stats.iter().find(|s| s.season == record.season) {
                    Some(s) => (
                        s.mean_temperature,
                        s.std_temperature,
                        is_anomalous(record.temperature, s, sigma),
                    ),
                    // Unmatched season: no band to violate
                    None => (f64::NAN, f64::NAN, false),
                };
            AnnotatedRecord {
                record,
                t_moving_average,
                mean_temperature,
                std_temperature,
                anomaly,
            }
        })
        .collect()
}
