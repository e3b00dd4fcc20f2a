/// Flat-file JSON stores for the pipeline stages.
///
/// Every store is an array of objects, pretty-printed, re-read in full at the
/// start of a stage and overwritten in full at its end. There is no locking:
/// concurrent runs must be serialized externally. A run that dies between
/// stages leaves the earlier stages' files behind, and the next run simply
/// picks them up — the system is crash-tolerant because every store can be
/// re-derived from the one before it.
///
/// Loading is deliberately forgiving: a missing or malformed store reads as
/// an empty collection, so a corrupted file costs one fresh start, not a
/// wedged pipeline.

use std::collections::BTreeMap;
use std::error::Error;
use std::path::Path;

use chrono::{Days, NaiveDate};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::logging::{self, DataSource};
use crate::model::RawObservation;

// ---------------------------------------------------------------------------
// Generic load/save
// ---------------------------------------------------------------------------

/// Loads a JSON array store. Missing file or malformed content yields an
/// empty collection (with a warning for the malformed case).
pub fn load_or_empty<T: DeserializeOwned>(path: &Path) -> Vec<T> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(_) => return Vec::new(),
    };
    match serde_json::from_str(&text) {
        Ok(rows) => rows,
        Err(e) => {
            logging::warn(
                DataSource::Store,
                path.to_str(),
                &format!("malformed store, starting fresh: {}", e),
            );
            Vec::new()
        }
    }
}

/// Writes a JSON array store, creating parent directories as needed.
pub fn save<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), Box<dyn Error>> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(rows)?;
    std::fs::write(path, json)
        .map_err(|e| format!("cannot write {}: {}", path.display(), e))?;
    Ok(())
}

/// Writes a single-object JSON file (the status summary), creating parent
/// directories as needed.
pub fn save_object<T: Serialize>(path: &Path, value: &T) -> Result<(), Box<dyn Error>> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json)
        .map_err(|e| format!("cannot write {}: {}", path.display(), e))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Raw store refresh
// ---------------------------------------------------------------------------

/// First day of the retention window: `retention_days` days ending yesterday.
pub fn retention_window_start(today: NaiveDate, retention_days: u32) -> NaiveDate {
    today.checked_sub_days(Days::new(retention_days as u64)).expect("date in range")
}

/// Merges freshly fetched rows into the existing raw store.
///
/// The refresh is incremental per region code: regions fetched this run are
/// replaced wholesale, regions that were skipped (fetch failure) keep their
/// stored rows. Rows are deduplicated by (region, city, date) with fresh rows
/// winning, and the result is windowed to the retention period. Rows dated
/// after the window (today's forecast rows) are kept.
///
/// Output order is (region_code, city, date) ascending, so identical inputs
/// always produce an identical store.
pub fn refresh_raw_store(
    existing: Vec<RawObservation>,
    fresh: Vec<RawObservation>,
    today: NaiveDate,
    retention_days: u32,
) -> Vec<RawObservation> {
    let refreshed: std::collections::HashSet<String> =
        fresh.iter().map(|r| r.region_code.clone()).collect();
    let window_start = retention_window_start(today, retention_days);

    let mut merged: BTreeMap<(String, String, NaiveDate), RawObservation> = BTreeMap::new();
    let kept = existing
        .into_iter()
        .filter(|row| !refreshed.contains(&row.region_code));
    for row in kept.chain(fresh) {
        if row.date < window_start {
            continue;
        }
        merged.insert((row.region_code.clone(), row.city.clone(), row.date), row);
    }
    merged.into_values().collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
