//! Static report output: the `data.json` archive and the `index.html` page.
//!
//! `data.json` keeps one entry per year so past years survive even though the
//! `site` command only re-fetches the current one. The current-year entry is
//! replaced wholesale on every run.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};

use crate::stats::YearTotals;
use crate::utils::format_hms;

pub const DATA_FILE: &str = "data.json";
pub const OUTPUT_FILE: &str = "index.html";

/// Load the saved per-year data, or an empty map if none exists yet.
pub fn load_data(path: &Path) -> Result<BTreeMap<i32, YearTotals>> {
    if !path.exists() {
        return Ok(BTreeMap::new());
    }
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("Failed to parse {}", path.display()))
}

pub fn save_data(path: &Path, years: &BTreeMap<i32, YearTotals>) -> Result<()> {
    let contents = serde_json::to_string_pretty(years)?;
    std::fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Render the stats table as a self-contained HTML page.
pub fn render_html(years: &BTreeMap<i32, YearTotals>) -> String {
    let mut rows = String::new();
    for (year, totals) in years {
        rows.push_str(&format!(
            "      <tr>\n        <td>{}</td>\n        <td>{}</td>\n        <td>{}</td>\n        <td>{:.1}</td>\n        <td>{:.0}</td>\n      </tr>\n",
            year,
            totals.count,
            format_hms(totals.time),
            totals.distance,
            totals.elevation,
        ));
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>Yearly Cycling Stats</title>
  <style>
    body {{ font-family: system-ui, sans-serif; max-width: 720px; margin: 2rem auto; padding: 0 1rem; }}
    table {{ border-collapse: collapse; width: 100%; }}
    th, td {{ padding: 0.5rem 1rem; text-align: right; border-bottom: 1px solid #ddd; }}
    th {{ border-bottom: 2px solid #333; }}
    th:first-child, td:first-child {{ text-align: left; }}
  </style>
</head>
<body>
  <h1>Yearly Cycling Stats</h1>
  <table>
    <thead>
      <tr>
        <th>Year</th>
        <th>Rides</th>
        <th>Time</th>
        <th>Distance (km)</th>
        <th>Elevation (m)</th>
      </tr>
    </thead>
    <tbody>
{}    </tbody>
  </table>
</body>
</html>"#,
        rows
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn totals(count: u32, time: i64, distance: f64, elevation: f64) -> YearTotals {
        YearTotals {
            count,
            time,
            distance,
            elevation,
        }
    }

    fn temp_data_path(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("ridestats-report-{}-{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir.join(DATA_FILE)
    }

    #[test]
    fn test_data_round_trips() {
        let path = temp_data_path("roundtrip");
        let mut years = BTreeMap::new();
        years.insert(2023, totals(12, 180_000, 1500.5, 12_000.0));
        years.insert(2024, totals(3, 40_000, 350.25, 2_800.0));

        save_data(&path, &years).unwrap();
        let loaded = load_data(&path).unwrap();
        assert_eq!(loaded, years);
    }

    #[test]
    fn test_missing_data_file_is_empty() {
        let path = temp_data_path("missing").with_file_name("nope.json");
        assert!(load_data(&path).unwrap().is_empty());
    }

    #[test]
    fn test_current_year_entry_is_replaced_not_merged() {
        let path = temp_data_path("replace");
        let mut years = BTreeMap::new();
        years.insert(2024, totals(10, 1000, 100.0, 500.0));
        save_data(&path, &years).unwrap();

        let mut years = load_data(&path).unwrap();
        years.insert(2024, totals(2, 50, 20.0, 10.0));
        save_data(&path, &years).unwrap();

        assert_eq!(load_data(&path).unwrap()[&2024], totals(2, 50, 20.0, 10.0));
    }

    #[test]
    fn test_render_html_one_row_per_year_ascending() {
        let mut years = BTreeMap::new();
        years.insert(2024, totals(5, 7200, 123.456, 999.4));
        years.insert(2022, totals(1, 3661, 10.0, 0.0));

        let html = render_html(&years);
        assert_eq!(html.matches("<tr>").count(), 3); // header + two years
        assert!(html.contains("<td>2022</td>"));
        assert!(html.contains("<td>1:01:01</td>"));
        assert!(html.contains("<td>123.5</td>"));
        assert!(html.contains("<td>999</td>"));

        let pos_2022 = html.find("<td>2022</td>").unwrap();
        let pos_2024 = html.find("<td>2024</td>").unwrap();
        assert!(pos_2022 < pos_2024);
    }
}
