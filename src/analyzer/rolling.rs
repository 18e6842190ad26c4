use crate::types::TemperatureRecord;

/// Sort ascending by timestamp. Stable, so equal timestamps keep input order.
pub fn sort_by_timestamp(records: &mut [TemperatureRecord]) {
    records.sort_by_key(|r| r.timestamp);
}

/// Trailing mean over up to `window` values ending at each position.
/// The window counts records, not elapsed time; early positions average
/// whatever history exists.
pub fn moving_average(values: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    (0..values.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(window);
            let slice = &values[start..=i];
            slice.iter().sum::<f64>() / slice.len() as f64
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Season;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    #[test]
    fn test_first_value_is_its_own_temperature() {
        let ma = moving_average(&[7.5, 1.0, 2.0], 30);
        assert_eq!(ma[0], 7.5);
        assert_relative_eq!(ma[1], 4.25);
        assert_relative_eq!(ma[2], 3.5);
    }

    #[test]
    fn test_window_slides_after_it_fills() {
        let values: Vec<f64> = (1..=40).map(|v| v as f64).collect();
        let ma = moving_average(&values, 30);
        assert_eq!(ma.len(), 40);

        // Position i (1-indexed) averages positions max(1, i-29)..=i
        for i in 1..=40usize {
            let lo = i.saturating_sub(29).max(1);
            let expected = (lo..=i).map(|v| v as f64).sum::<f64>() / (i - lo + 1) as f64;
            assert_relative_eq!(ma[i - 1], expected, epsilon = 1e-12);
        }
        // 11..=40
        assert_relative_eq!(ma[39], 25.5);
    }

    #[test]
    fn test_small_window_and_empty_input() {
        assert_eq!(moving_average(&[], 30), Vec::<f64>::new());
        assert_eq!(moving_average(&[2.0, 4.0, 8.0], 1), vec![2.0, 4.0, 8.0]);
        assert_eq!(moving_average(&[2.0, 4.0, 8.0], 2), vec![2.0, 3.0, 6.0]);
    }

    #[test]
    fn test_sort_is_stable_for_equal_timestamps() {
        let ts = |d: u32| NaiveDate::from_ymd_opt(2020, 1, d).unwrap().and_hms_opt(0, 0, 0).unwrap();
        let rec = |d: u32, t: f64| TemperatureRecord {
            city: "Oslo".into(),
            timestamp: ts(d),
            temperature: t,
            season: Season::Winter,
        };
        let mut records = vec![rec(3, 1.0), rec(1, 2.0), rec(3, 3.0), rec(2, 4.0)];
        sort_by_timestamp(&mut records);
        let temps: Vec<f64> = records.iter().map(|r| r.temperature).collect();
        assert_eq!(temps, vec![2.0, 4.0, 1.0, 3.0]);
    }
}
