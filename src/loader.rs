//! CSV input: `timestamp`, `city`, `temperature`, `season` columns.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Deserialize;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use crate::types::{Season, TemperatureRecord};

/// Error type for data loading operations.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Failed to open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Row {row}: invalid timestamp '{value}'")]
    InvalidTimestamp { row: usize, value: String },

    #[error("Row {row}: {message}")]
    InvalidSeason { row: usize, message: String },

    #[error("Row {row}: temperature must be finite, got {value}")]
    NonFiniteTemperature { row: usize, value: f64 },
}

/// Row shape as it appears in the file; extra columns are ignored.
#[derive(Debug, Deserialize)]
struct CsvRow {
    timestamp: String,
    city: String,
    temperature: f64,
    season: String,
}

const DATETIME_FORMATS: [&str; 3] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Load all records from a CSV file.
pub fn load_csv(path: &Path) -> Result<Vec<TemperatureRecord>, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let records = read_records(BufReader::new(file))?;
    tracing::debug!(path = %path.display(), rows = records.len(), "Loaded CSV");
    Ok(records)
}

/// Parse records from any CSV source with a header row.
pub fn read_records<R: Read>(reader: R) -> Result<Vec<TemperatureRecord>, LoadError> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::Headers).from_reader(reader);
    let mut records = Vec::new();

    for (idx, result) in reader.deserialize::<CsvRow>().enumerate() {
        let raw = result?;
        // Header is line 1
        let row = idx + 2;

        let timestamp = parse_timestamp(&raw.timestamp).ok_or_else(|| LoadError::InvalidTimestamp {
            row,
            value: raw.timestamp.clone(),
        })?;
        let season = raw
            .season
            .parse::<Season>()
            .map_err(|message| LoadError::InvalidSeason { row, message })?;
        if !raw.temperature.is_finite() {
            return Err(LoadError::NonFiniteTemperature { row, value: raw.temperature });
        }

        records.push(TemperatureRecord {
            city: raw.city,
            timestamp,
            temperature: raw.temperature,
            season,
        });
    }

    Ok(records)
}

/// Parse the datetime layouts commonly found in exported series.
/// Offsets are normalised to UTC; bare dates map to midnight.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = "\
city,timestamp,temperature,season
Berlin,2010-01-01,-3.5,winter
Berlin,2010-01-02,-1.0,winter
Cairo,2010-06-01 12:00:00,34.2,summer
";

    #[test]
    fn test_read_records() {
        let records = read_records(SAMPLE.as_bytes()).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].city, "Berlin");
        assert_eq!(records[0].temperature, -3.5);
        assert_eq!(records[2].season, Season::Summer);
        assert_eq!(records[2].timestamp.to_string(), "2010-06-01 12:00:00");
    }

    #[test]
    fn test_extra_columns_ignored() {
        let csv = "timestamp,city,temperature,season,source\n2020-03-01,Oslo,1.5,spring,station-7\n";
        let records = read_records(csv.as_bytes()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].season, Season::Spring);
    }

    #[test]
    fn test_missing_column_is_fatal() {
        let csv = "timestamp,city,temperature\n2020-03-01,Oslo,1.5\n";
        assert!(matches!(read_records(csv.as_bytes()), Err(LoadError::Csv(_))));
    }

    #[test]
    fn test_bad_temperature_is_fatal() {
        let csv = "timestamp,city,temperature,season\n2020-03-01,Oslo,warm,spring\n";
        assert!(matches!(read_records(csv.as_bytes()), Err(LoadError::Csv(_))));

        let csv = "timestamp,city,temperature,season\n2020-03-01,Oslo,NaN,spring\n";
        assert!(matches!(
            read_records(csv.as_bytes()),
            Err(LoadError::NonFiniteTemperature { row: 2, .. })
        ));

        let csv = "timestamp,city,temperature,season\n2020-03-01,Oslo,,spring\n";
        assert!(matches!(read_records(csv.as_bytes()), Err(LoadError::Csv(_))));
    }

    #[test]
    fn test_city_names_kept_verbatim() {
        let csv = "timestamp,city,temperature,season\n2020-01-01,Oslo,1.0,winter\n2020-01-02, Oslo ,2.0, winter \n";
        let records = read_records(csv.as_bytes()).unwrap();
        assert_eq!(records[1].city, " Oslo ");
        assert_eq!(records[1].season, Season::Winter);

        let dataset = crate::dataset::Dataset::from_records(records);
        let cities: Vec<&str> = dataset.cities().collect();
        assert_eq!(cities, vec!["Oslo", " Oslo "]);
    }

    #[test]
    fn test_bad_timestamp_and_season_report_row() {
        let csv = "timestamp,city,temperature,season\n2020-03-01,Oslo,1.0,spring\nyesterday,Oslo,2.0,spring\n";
        match read_records(csv.as_bytes()) {
            Err(LoadError::InvalidTimestamp { row, value }) => {
                assert_eq!(row, 3);
                assert_eq!(value, "yesterday");
            }
            other => panic!("unexpected result: {:?}", other),
        }

        let csv = "timestamp,city,temperature,season\n2020-03-01,Oslo,1.0,monsoon\n";
        assert!(matches!(
            read_records(csv.as_bytes()),
            Err(LoadError::InvalidSeason { row: 2, .. })
        ));
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = NaiveDate::from_ymd_opt(2021, 7, 4)
            .unwrap()
            .and_hms_opt(15, 30, 0)
            .unwrap();
        assert_eq!(parse_timestamp("2021-07-04 15:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2021-07-04T15:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2021-07-04 15:30"), Some(expected));
        assert_eq!(parse_timestamp("2021-07-04T17:30:00+02:00"), Some(expected));
        assert_eq!(
            parse_timestamp("2021-07-04"),
            NaiveDate::from_ymd_opt(2021, 7, 4).unwrap().and_hms_opt(0, 0, 0)
        );
        assert_eq!(parse_timestamp("04/07/2021"), None);
    }

    #[test]
    fn test_load_csv_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let records = load_csv(file.path()).unwrap();
        assert_eq!(records.len(), 3);

        let missing = load_csv(Path::new("/nonexistent/temperature_data.csv"));
        assert!(matches!(missing, Err(LoadError::Open { .. })));
    }
}
