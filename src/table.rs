//! Plain-text tables and CSV export for annotated rows.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};

use crate::types::{AnnotatedRecord, SeasonalStats};

pub const RECORD_COLUMNS: [&str; 8] = [
    "timestamp",
    "city",
    "temperature",
    "season",
    "t_moving_average",
    "mean_temperature",
    "std_temperature",
    "anomaly",
];

pub fn format_float(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else {
        format!("{:.6}", v)
    }
}

fn record_cells(r: &AnnotatedRecord) -> Vec<String> {
    vec![
        r.record.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
        r.record.city.clone(),
        format_float(r.record.temperature),
        r.record.season.to_string(),
        format_float(r.t_moving_average),
        format_float(r.mean_temperature),
        format_float(r.std_temperature),
        r.anomaly.to_string(),
    ]
}

/// Right-aligned grid with a leading row index column.
pub fn render(headers: &[&str], rows: &[(usize, Vec<String>)], ellipsis_after: Option<usize>) -> String {
    let index_width = rows.iter().map(|(i, _)| i.to_string().len()).max().unwrap_or(0);
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for (_, cells) in rows {
        for (w, c) in widths.iter_mut().zip(cells) {
            *w = (*w).max(c.len());
        }
    }

    let mut out = String::new();
    let _ = write!(out, "{:>iw$}", "", iw = index_width);
    for (h, w) in headers.iter().zip(&widths) {
        let _ = write!(out, "  {:>w$}", h, w = *w);
    }
    out.push('\n');

    for (n, (idx, cells)) in rows.iter().enumerate() {
        if ellipsis_after == Some(n) {
            let _ = write!(out, "{:>iw$}", "..", iw = index_width);
            for w in &widths {
                let _ = write!(out, "  {:>w$}", "...", w = *w);
            }
            out.push('\n');
        }
        let _ = write!(out, "{:>iw$}", idx, iw = index_width);
        for (c, w) in cells.iter().zip(&widths) {
            let _ = write!(out, "  {:>w$}", c, w = *w);
        }
        out.push('\n');
    }
    out
}

/// Render annotated rows; more than `2 * preview` rows are elided in the middle.
pub fn render_records(rows: &[AnnotatedRecord], preview: usize) -> String {
    let total = rows.len();
    let truncated = preview > 0 && total > preview * 2;

    let shown: Vec<(usize, Vec<String>)> = if truncated {
        rows.iter()
            .enumerate()
            .filter(|(i, _)| *i < preview || *i >= total - preview)
            .map(|(i, r)| (i, record_cells(r)))
            .collect()
    } else {
        rows.iter().enumerate().map(|(i, r)| (i, record_cells(r))).collect()
    };

    let mut out = render(&RECORD_COLUMNS, &shown, truncated.then_some(preview));
    if truncated {
        let _ = writeln!(out, "\n[{} rows x {} columns]", total, RECORD_COLUMNS.len());
    }
    out
}

pub fn render_seasons(stats: &[SeasonalStats]) -> String {
    let rows: Vec<(usize, Vec<String>)> = stats
        .iter()
        .enumerate()
        .map(|(i, s)| {
            (
                i,
                vec![
                    s.season.to_string(),
                    s.count.to_string(),
                    format_float(s.mean_temperature),
                    format_float(s.std_temperature),
                ],
            )
        })
        .collect();
    render(&["season", "count", "mean_temperature", "std_temperature"], &rows, None)
}

/// Write every annotated row to a CSV file with a header.
pub fn write_csv(rows: &[AnnotatedRecord], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    writer.write_record(RECORD_COLUMNS)?;
    for r in rows {
        writer.write_record(record_cells(r))?;
    }
    writer.flush()?;
    tracing::info!(path = %path.display(), rows = rows.len(), "Wrote CSV");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Season, TemperatureRecord};
    use chrono::{Duration, NaiveDate};

    fn rows(n: usize) -> Vec<AnnotatedRecord> {
        let start = NaiveDate::from_ymd_opt(2022, 3, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        (0..n)
            .map(|i| AnnotatedRecord {
                record: TemperatureRecord {
                    city: "Lima".into(),
                    timestamp: start + Duration::days(i as i64),
                    temperature: i as f64,
                    season: Season::Spring,
                },
                t_moving_average: i as f64 / 2.0,
                mean_temperature: 1.5,
                std_temperature: if i == 0 { f64::NAN } else { 0.25 },
                anomaly: i == 3,
            })
            .collect()
    }

    #[test]
    fn test_render_small_table() {
        let text = render_records(&rows(2), 10);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("t_moving_average"));
        assert!(lines[1].starts_with('0'));
        assert!(lines[1].contains("2022-03-01 00:00:00"));
        assert!(lines[1].contains("NaN"));
        assert!(lines[2].contains("0.250000"));
        assert!(!text.contains("rows x"));
    }

    #[test]
    fn test_render_elides_middle() {
        let text = render_records(&rows(30), 2);
        assert!(text.contains("..."));
        assert!(text.contains("[30 rows x 8 columns]"));
        let data_lines = text.lines().filter(|l| l.contains("Lima")).count();
        assert_eq!(data_lines, 4);
        assert!(text.lines().any(|l| l.trim_start().starts_with("29 ")));
    }

    #[test]
    fn test_render_seasons() {
        let stats = vec![SeasonalStats {
            season: Season::Winter,
            count: 3,
            mean_temperature: 10.0,
            std_temperature: 10.0,
        }];
        let text = render_seasons(&stats);
        assert!(text.contains("winter"));
        assert!(text.contains("10.000000"));
    }

    #[test]
    fn test_write_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        write_csv(&rows(4), &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], RECORD_COLUMNS.join(","));
        assert_eq!(
            lines[4],
            "2022-03-04 00:00:00,Lima,3.000000,spring,1.500000,1.500000,0.250000,true"
        );
    }
}
