/// Region-day aggregation.
///
/// Several cities represent one region, so the raw store holds several rows
/// per (date, region). This module merges each such group into one regional
/// record: hottest tmax, coldest tmin, strongest wind, and the *sum* of
/// precipitation across the sampled cities (a total regional rain signal,
/// not an average), then classifies the result.
///
/// Null metric entries are skipped per value; a group where any metric has
/// no valid value at all is dropped whole — a partially-aggregated region
/// day would classify some hazards against made-up numbers.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::alert::levels;
use crate::model::{RawObservation, RegionDay};

/// Merges and classifies the full raw store into one record per
/// (date, region_code). Grouping is key-based; input order does not affect
/// the result (max/min/sum are order-independent), and output is keyed
/// (date, region) ascending for stable stores.
pub fn aggregate_region_days(rows: &[RawObservation]) -> Vec<RegionDay> {
    let mut groups: BTreeMap<(NaiveDate, &str), Vec<&RawObservation>> = BTreeMap::new();
    for row in rows {
        groups.entry((row.date, row.region_code.as_str())).or_default().push(row);
    }

    let mut out = Vec::new();
    for ((date, region_code), group) in groups {
        let tmax_vals = valid_values(&group, |r| r.tmax_c);
        let tmin_vals = valid_values(&group, |r| r.tmin_c);
        let wind_vals = valid_values(&group, |r| r.wind_max_kmh);
        let rain_vals = valid_values(&group, |r| r.rain_mm);

        // No usable value for some metric: skip this (date, region) entirely.
        if tmax_vals.is_empty() || tmin_vals.is_empty() || wind_vals.is_empty() || rain_vals.is_empty()
        {
            continue;
        }

        let tmax_c = tmax_vals.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let tmin_c = tmin_vals.iter().copied().fold(f64::INFINITY, f64::min);
        let wind_max_kmh = wind_vals.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let rain_mm = rain_vals.iter().sum();

        // All group members share these fields; take them from the first.
        let base = group[0];
        let levels = levels::classify(tmax_c, tmin_c, wind_max_kmh, rain_mm);

        out.push(RegionDay {
            date,
            country: base.country.clone(),
            region_code: region_code.to_string(),
            region_id: base.region_id.clone(),
            tmax_c,
            tmin_c,
            wind_max_kmh,
            rain_mm,
            heat_level: levels.heat,
            cold_level: levels.cold,
            wind_level: levels.wind,
            rain_level: levels.rain,
        });
    }
    out
}

/// Finite values of one metric across the group, nulls skipped.
fn valid_values(group: &[&RawObservation], metric: fn(&RawObservation) -> Option<f64>) -> Vec<f64> {
    group
        .iter()
        .copied()
        .filter_map(metric)
        .filter(|v| v.is_finite())
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
