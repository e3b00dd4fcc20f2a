/// Multi-day alert event detection.
///
/// For each (region, hazard) pair this module scans the region's daily
/// severity series in date order and extracts maximal runs of consecutive
/// calendar days at or above the hazard's minimum level. A run only becomes
/// an event once it reaches the hazard's minimum duration: a lone hot day is
/// noise, two hot days in a row are a heatwave signal; a single day of storm
/// wind or torrential rain already matters.
///
/// Consecutive means calendar-adjacent. The daily series is sparse — a day
/// with no usable data is simply absent — and a missing day cannot be assumed
/// non-hazardous, so a date gap always breaks the run even when the days on
/// both sides qualify.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::model::{AlertEvent, Hazard, PeakValue, RegionDay};

// ---------------------------------------------------------------------------
// Detection rules
// ---------------------------------------------------------------------------

/// Detection policy for one hazard.
#[derive(Debug, Clone, Copy)]
pub struct HazardRule {
    pub hazard: Hazard,
    /// Minimum severity level for a day to count towards a run.
    pub min_level: u8,
    /// Minimum run length, in days, for a run to become an event.
    pub min_duration: usize,
}

/// Fixed detection rules, in reporting order.
///
/// Temperature hazards require two consecutive days; wind and rain alert on
/// a single qualifying day.
pub const HAZARD_RULES: [HazardRule; 4] = [
    HazardRule { hazard: Hazard::Heat, min_level: 1, min_duration: 2 },
    HazardRule { hazard: Hazard::Cold, min_level: 1, min_duration: 2 },
    HazardRule { hazard: Hazard::Wind, min_level: 1, min_duration: 1 },
    HazardRule { hazard: Hazard::Rain, min_level: 1, min_duration: 1 },
];

/// The detection rule for one hazard.
pub fn rule_for(hazard: Hazard) -> HazardRule {
    HAZARD_RULES
        .into_iter()
        .find(|r| r.hazard == hazard)
        .expect("every hazard has a rule")
}

// ---------------------------------------------------------------------------
// Run extraction
// ---------------------------------------------------------------------------

/// Extracts alert events for one hazard from one region's daily records.
///
/// Single linear scan over the date-sorted records with at most one open run:
/// a qualifying day extends the run only when the previously visited date is
/// exactly one calendar day earlier; any gap or non-qualifying day closes the
/// run (emitting it if long enough). The previous-date cursor advances on
/// every record, so a gap after a non-qualifying day still breaks adjacency
/// for the next qualifying day.
pub fn detect_events<'a, I>(rows: I, rule: &HazardRule) -> Vec<AlertEvent>
where
    I: IntoIterator<Item = &'a RegionDay>,
{
    let mut sorted: Vec<&RegionDay> = rows.into_iter().collect();
    sorted.sort_by_key(|day| day.date);

    let mut events = Vec::new();
    let mut run: Vec<&RegionDay> = Vec::new();
    let mut prev_date: Option<NaiveDate> = None;

    for day in sorted {
        if day.level(rule.hazard) >= rule.min_level {
            let extends = !run.is_empty() && prev_date.and_then(|d| d.succ_opt()) == Some(day.date);
            if !extends {
                close_run(&mut run, rule, &mut events);
            }
            run.push(day);
        } else {
            close_run(&mut run, rule, &mut events);
        }
        prev_date = Some(day.date);
    }
    close_run(&mut run, rule, &mut events);

    events
}

/// Emits the open run as an event if it meets the minimum duration, then
/// clears it.
fn close_run(run: &mut Vec<&RegionDay>, rule: &HazardRule, events: &mut Vec<AlertEvent>) {
    if run.len() >= rule.min_duration {
        events.push(summarise_run(run, rule.hazard));
    }
    run.clear();
}

/// Detects all alert events across every region and hazard.
///
/// Records are grouped per region first; detection never compares across
/// regions or hazards. Output order (region code, then hazard, then date) is
/// deterministic so identical input yields byte-identical stores.
pub fn detect_all(days: &[RegionDay]) -> Vec<AlertEvent> {
    let mut by_region: BTreeMap<&str, Vec<&RegionDay>> = BTreeMap::new();
    for day in days {
        by_region.entry(day.region_code.as_str()).or_default().push(day);
    }

    let mut alerts = Vec::new();
    for rows in by_region.values() {
        for rule in &HAZARD_RULES {
            alerts.extend(detect_events(rows.iter().copied(), rule));
        }
    }
    alerts
}

// ---------------------------------------------------------------------------
// Event summarization
// ---------------------------------------------------------------------------

/// Summarizes a closed run (non-empty, date-contiguous, all qualifying)
/// into its alert event.
fn summarise_run(run: &[&RegionDay], hazard: Hazard) -> AlertEvent {
    let first = run[0];
    let last = run[run.len() - 1];

    let max_level = run.iter().map(|day| day.level(hazard)).max().unwrap_or(0);

    let fold_max = |metric: fn(&RegionDay) -> f64| {
        run.iter().copied().map(metric).fold(f64::NEG_INFINITY, f64::max)
    };
    let peak = match hazard {
        Hazard::Heat => PeakValue::MaxTmaxC(fold_max(|day| day.tmax_c)),
        // The peak of a cold event is its lowest temperature.
        Hazard::Cold => PeakValue::MinTminC(
            run.iter().map(|day| day.tmin_c).fold(f64::INFINITY, f64::min),
        ),
        Hazard::Wind => PeakValue::MaxWindMaxKmh(fold_max(|day| day.wind_max_kmh)),
        // Peak single-day rain, not the total across the run.
        Hazard::Rain => PeakValue::MaxRainMm(fold_max(|day| day.rain_mm)),
    };

    AlertEvent {
        country: first.country.clone(),
        region_code: first.region_code.clone(),
        hazard,
        start_date: first.date,
        end_date: last.date,
        n_days: run.len() as u32,
        max_level,
        peak,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
