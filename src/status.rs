/// Run status summary and website export.
///
/// After the stores are refreshed, a small status file records what this run
/// produced: row counts, coverage, and the date span of the region-day store.
/// The website polls it to decide whether the data behind the map is current.
///
/// # Clock injection
/// `build_status` takes the run's start and end instants as parameters
/// rather than reading the clock itself, keeping the summary deterministic
/// in tests.

use std::collections::HashSet;
use std::error::Error;
use std::path::Path;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::config::StorageConfig;
use crate::logging::{self, DataSource};
use crate::model::{AlertEvent, RegionDay};

// ---------------------------------------------------------------------------
// Status summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusSummary {
    /// Run start, RFC 3339 UTC.
    pub started_at: String,
    /// Run end, RFC 3339 UTC.
    pub finished_at: String,
    pub retention_days: u32,
    pub n_countries: usize,
    pub n_regions: usize,
    /// Region-day rows currently stored.
    pub n_rows: usize,
    pub n_alerts: usize,
    /// Earliest/latest date present in the region-day store; null when empty.
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
}

/// Summarizes one completed run from the refreshed stores.
pub fn build_status(
    started: DateTime<Utc>,
    finished: DateTime<Utc>,
    retention_days: u32,
    days: &[RegionDay],
    alerts: &[AlertEvent],
) -> StatusSummary {
    let countries: HashSet<&str> = days.iter().map(|d| d.country.as_str()).collect();
    let regions: HashSet<&str> = days.iter().map(|d| d.region_code.as_str()).collect();

    StatusSummary {
        started_at: started.to_rfc3339_opts(SecondsFormat::Secs, true),
        finished_at: finished.to_rfc3339_opts(SecondsFormat::Secs, true),
        retention_days,
        n_countries: countries.len(),
        n_regions: regions.len(),
        n_rows: days.len(),
        n_alerts: alerts.len(),
        first_date: days.iter().map(|d| d.date).min(),
        last_date: days.iter().map(|d| d.date).max(),
    }
}

// ---------------------------------------------------------------------------
// Website export
// ---------------------------------------------------------------------------

/// File names published for the website, relative to both the data dir and
/// the export dir.
const EXPORTED_FILES: &[&str] = &[
    "region_points.json",
    "regions_daily.json",
    "alerts.json",
    "pipeline_status.json",
];

/// Re-publishes the public artifacts into the export directory.
///
/// Each file is parsed and re-serialized rather than byte-copied, so a
/// truncated store fails the export instead of shipping broken JSON to the
/// website.
pub fn export_for_web(storage: &StorageConfig, export_dir: &Path) -> Result<(), Box<dyn Error>> {
    std::fs::create_dir_all(export_dir)?;

    for &name in EXPORTED_FILES {
        let src = storage.data_dir.join(name);
        let text = std::fs::read_to_string(&src)
            .map_err(|e| format!("cannot read {}: {}", src.display(), e))?;
        let value: serde_json::Value = serde_json::from_str(&text)
            .map_err(|e| format!("{} is not valid JSON: {}", src.display(), e))?;
        let dest = export_dir.join(name);
        std::fs::write(&dest, serde_json::to_string_pretty(&value)?)
            .map_err(|e| format!("cannot write {}: {}", dest.display(), e))?;
        logging::debug(DataSource::Store, Some(name), "exported");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day(region_code: &str, date: &str) -> RegionDay {
        let (country, region_id) = region_code.split_once('-').unwrap();
        RegionDay {
            date: date.parse().unwrap(),
            country: country.to_string(),
            region_code: region_code.to_string(),
            region_id: region_id.to_string(),
            tmax_c: 25.0,
            tmin_c: 12.0,
            wind_max_kmh: 20.0,
            rain_mm: 0.0,
            heat_level: 0,
            cold_level: 0,
            wind_level: 0,
            rain_level: 0,
        }
    }

    fn fixed_run() -> (DateTime<Utc>, DateTime<Utc>) {
        (
            Utc.with_ymd_and_hms(2024, 6, 2, 5, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 6, 2, 5, 3, 20).unwrap(),
        )
    }

    #[test]
    fn test_status_counts_distinct_countries_and_regions() {
        let days = vec![
            day("FR-IDF", "2024-06-01"),
            day("FR-PAC", "2024-06-01"),
            day("FR-PAC", "2024-06-02"),
            day("ES-MD", "2024-05-28"),
        ];
        let (started, finished) = fixed_run();
        let status = build_status(started, finished, 90, &days, &[]);

        assert_eq!(status.n_countries, 2);
        assert_eq!(status.n_regions, 3);
        assert_eq!(status.n_rows, 4);
        assert_eq!(status.n_alerts, 0);
        assert_eq!(status.first_date, Some("2024-05-28".parse().unwrap()));
        assert_eq!(status.last_date, Some("2024-06-02".parse().unwrap()));
        assert_eq!(status.started_at, "2024-06-02T05:00:00Z");
        assert_eq!(status.finished_at, "2024-06-02T05:03:20Z");
    }

    #[test]
    fn test_empty_store_yields_null_dates() {
        let (started, finished) = fixed_run();
        let status = build_status(started, finished, 90, &[], &[]);
        assert_eq!(status.n_rows, 0);
        assert_eq!(status.first_date, None);
        assert_eq!(status.last_date, None);

        let json = serde_json::to_value(&status).unwrap();
        assert!(json["first_date"].is_null());
    }

    #[test]
    fn test_export_republishes_the_public_artifacts() {
        let data = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        for name in EXPORTED_FILES {
            std::fs::write(data.path().join(name), "[]").unwrap();
        }

        let storage = StorageConfig {
            data_dir: data.path().to_path_buf(),
            export_dir: Some(out.path().to_path_buf()),
        };
        export_for_web(&storage, out.path()).expect("export should succeed");

        for name in EXPORTED_FILES {
            let text = std::fs::read_to_string(out.path().join(name)).unwrap();
            assert_eq!(text, "[]", "exported {} should hold the store content", name);
        }
    }

    #[test]
    fn test_export_fails_on_a_broken_store() {
        let data = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        std::fs::write(data.path().join("region_points.json"), "[truncated").unwrap();

        let storage = StorageConfig {
            data_dir: data.path().to_path_buf(),
            export_dir: Some(out.path().to_path_buf()),
        };
        assert!(
            export_for_web(&storage, out.path()).is_err(),
            "a corrupt artifact must fail the export, not ship to the website"
        );
    }
}
