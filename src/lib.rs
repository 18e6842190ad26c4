pub mod analyzer;
pub mod batch;
pub mod config;
pub mod dataset;
pub mod loader;
pub mod report;
pub mod table;
pub mod weather;

/// Common types used across modules
pub mod types {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Serialize};
    use std::str::FromStr;

    /// Season label attached to every record. Variant order is calendar order.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum Season {
        Winter,
        Spring,
        Summer,
        Fall,
    }

    impl Season {
        pub const ALL: [Season; 4] = [Season::Winter, Season::Spring, Season::Summer, Season::Fall];

        /// Meteorological season of a calendar month (1-12), northern hemisphere.
        pub fn for_month(month: u32) -> Season {
            match month {
                12 | 1 | 2 => Season::Winter,
                3..=5 => Season::Spring,
                6..=8 => Season::Summer,
                _ => Season::Fall,
            }
        }

        pub fn as_str(&self) -> &'static str {
            match self {
                Season::Winter => "winter",
                Season::Spring => "spring",
                Season::Summer => "summer",
                Season::Fall => "fall",
            }
        }
    }

    impl std::fmt::Display for Season {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{}", self.as_str())
        }
    }

    impl FromStr for Season {
        type Err = String;

        fn from_str(s: &str) -> Result<Self, Self::Err> {
            match s.trim().to_ascii_lowercase().as_str() {
                "winter" => Ok(Season::Winter),
                "spring" => Ok(Season::Spring),
                "summer" => Ok(Season::Summer),
                "fall" | "autumn" => Ok(Season::Fall),
                other => Err(format!("unknown season '{}'", other)),
            }
        }
    }

    /// A single temperature observation for one city
    #[derive(Debug, Clone, PartialEq, Serialize)]
    pub struct TemperatureRecord {
        pub city: String,
        pub timestamp: NaiveDateTime,
        pub temperature: f64,
        pub season: Season,
    }

    /// Mean and sample standard deviation of one season within one city
    #[derive(Debug, Clone, PartialEq, Serialize)]
    pub struct SeasonalStats {
        pub season: Season,
        pub count: usize,
        pub mean_temperature: f64,
        /// NaN when the season has a single record.
        pub std_temperature: f64,
    }

    impl SeasonalStats {
        /// Lower and upper edge of the `mean ± sigma * std` band.
        pub fn bounds(&self, sigma: f64) -> (f64, f64) {
            let spread = sigma * self.std_temperature;
            (self.mean_temperature - spread, self.mean_temperature + spread)
        }

        /// False when the standard deviation is undefined.
        pub fn has_band(&self) -> bool {
            !self.std_temperature.is_nan()
        }
    }

    /// Output row: the input record plus rolling average, seasonal band and flag
    #[derive(Debug, Clone, PartialEq, Serialize)]
    pub struct AnnotatedRecord {
        #[serde(flatten)]
        pub record: TemperatureRecord,
        pub t_moving_average: f64,
        pub mean_temperature: f64,
        pub std_temperature: f64,
        pub anomaly: bool,
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_season_parse_is_case_insensitive() {
            assert_eq!("Winter".parse::<Season>().unwrap(), Season::Winter);
            assert_eq!(" summer ".parse::<Season>().unwrap(), Season::Summer);
            assert_eq!("autumn".parse::<Season>().unwrap(), Season::Fall);
            assert!("monsoon".parse::<Season>().is_err());
        }

        #[test]
        fn test_season_for_month() {
            assert_eq!(Season::for_month(12), Season::Winter);
            assert_eq!(Season::for_month(2), Season::Winter);
            assert_eq!(Season::for_month(4), Season::Spring);
            assert_eq!(Season::for_month(7), Season::Summer);
            assert_eq!(Season::for_month(10), Season::Fall);
        }

        #[test]
        fn test_bounds_with_undefined_std() {
            let stats = SeasonalStats {
                season: Season::Fall,
                count: 1,
                mean_temperature: 5.0,
                std_temperature: f64::NAN,
            };
            let (lo, hi) = stats.bounds(2.0);
            assert!(lo.is_nan() && hi.is_nan());
            assert!(!stats.has_band());
        }
    }
}
