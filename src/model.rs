/// Core data types for the regional weather hazard monitoring service.
///
/// This module defines the shared domain model imported by all other modules,
/// together with its serialization contracts. The JSON stores produced and
/// consumed by adjacent pipeline stages are the system's only interchange
/// format, so field names and shapes here must round-trip exactly.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Hazard kinds
// ---------------------------------------------------------------------------

/// The four hazard streams tracked per region.
///
/// Each hazard is classified and detected independently; a single day can
/// carry nonzero levels for several hazards at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Hazard {
    Heat,
    Cold,
    Wind,
    Rain,
}

impl Hazard {
    /// All hazards, in the order they are reported.
    pub const ALL: [Hazard; 4] = [Hazard::Heat, Hazard::Cold, Hazard::Wind, Hazard::Rain];

    pub fn name(self) -> &'static str {
        match self {
            Hazard::Heat => "heat",
            Hazard::Cold => "cold",
            Hazard::Wind => "wind",
            Hazard::Rain => "rain",
        }
    }
}

impl fmt::Display for Hazard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Catalog types
// ---------------------------------------------------------------------------

/// A monitored point: one representative city for a sub-national region.
///
/// Several points may share a `region_code` (the most populous cities of the
/// region); their daily series are merged by the aggregation stage. Points
/// are reference data and are only used to seed fetch requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionPoint {
    pub country: String,
    /// Region identifier within the country (ISO 3166-2 suffix, e.g. "IDF").
    pub region_id: String,
    /// `"{country}-{region_id}"`, e.g. "FR-IDF".
    pub region_code: String,
    pub city: String,
    pub lat: f64,
    pub lon: f64,
    pub population: u64,
}

// ---------------------------------------------------------------------------
// Observation types
// ---------------------------------------------------------------------------

/// One day of raw weather data for a single monitored point.
///
/// Produced by ingestion; multiple raw observations exist per
/// (date, region_code) when several cities represent one region. The core
/// metrics are nullable because the provider reports `null` for days it has
/// no data for; the aggregation stage skips null contributions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawObservation {
    pub date: NaiveDate,
    pub country: String,
    pub region_id: String,
    pub region_code: String,
    pub city: String,
    pub tmax_c: Option<f64>,
    pub tmin_c: Option<f64>,
    pub wind_max_kmh: Option<f64>,
    pub rain_mm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snowfall_mm: Option<f64>,
}

/// One aggregated, classified day for a region.
///
/// Exists only when every core metric had at least one valid contribution
/// from the underlying raw observations, so the metrics are concrete floats.
/// Severity levels are ordinal 0 (none) through 3 (most severe).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionDay {
    pub date: NaiveDate,
    pub country: String,
    pub region_code: String,
    pub region_id: String,
    pub tmax_c: f64,
    pub tmin_c: f64,
    pub wind_max_kmh: f64,
    pub rain_mm: f64,
    pub heat_level: u8,
    pub cold_level: u8,
    pub wind_level: u8,
    pub rain_level: u8,
}

impl RegionDay {
    /// The stored severity level for one hazard.
    pub fn level(&self, hazard: Hazard) -> u8 {
        match hazard {
            Hazard::Heat => self.heat_level,
            Hazard::Cold => self.cold_level,
            Hazard::Wind => self.wind_level,
            Hazard::Rain => self.rain_level,
        }
    }
}

// ---------------------------------------------------------------------------
// Alert types
// ---------------------------------------------------------------------------

/// Hazard-specific peak measurement of an alert event.
///
/// Serializes as a single field whose name depends on the hazard, e.g.
/// `"max_tmax_c": 41.3` for heat. The cold peak is the *minimum* temperature
/// reached: cold severity grows as the temperature drops.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PeakValue {
    #[serde(rename = "max_tmax_c")]
    MaxTmaxC(f64),
    #[serde(rename = "min_tmin_c")]
    MinTminC(f64),
    #[serde(rename = "max_wind_max_kmh")]
    MaxWindMaxKmh(f64),
    #[serde(rename = "max_rain_mm")]
    MaxRainMm(f64),
}

impl PeakValue {
    pub fn value(self) -> f64 {
        match self {
            PeakValue::MaxTmaxC(v)
            | PeakValue::MinTminC(v)
            | PeakValue::MaxWindMaxKmh(v)
            | PeakValue::MaxRainMm(v) => v,
        }
    }
}

/// One maximal run of consecutive hazardous days for a (region, hazard) pair.
///
/// Recomputed in full from the region-day store on every run; never mutated
/// and never persisted incrementally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertEvent {
    pub country: String,
    pub region_code: String,
    pub hazard: Hazard,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub n_days: u32,
    pub max_level: u8,
    #[serde(flatten)]
    pub peak: PeakValue,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can arise when fetching daily data from the weather provider.
#[derive(Debug, PartialEq)]
pub enum FetchError {
    /// Non-2xx HTTP response.
    HttpStatus(u16),
    /// The request itself failed (connect, timeout, TLS).
    Request(String),
    /// The response body could not be deserialized.
    Parse(String),
    /// The response contained no daily rows for the requested point.
    NoData(String),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::HttpStatus(code) => write!(f, "HTTP error: {}", code),
            FetchError::Request(msg) => write!(f, "Request failed: {}", msg),
            FetchError::Parse(msg) => write!(f, "Parse error: {}", msg),
            FetchError::NoData(what) => write!(f, "No data available for point: {}", what),
        }
    }
}

impl std::error::Error for FetchError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_day() -> RegionDay {
        RegionDay {
            date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            country: "FR".to_string(),
            region_code: "FR-IDF".to_string(),
            region_id: "IDF".to_string(),
            tmax_c: 36.2,
            tmin_c: 21.0,
            wind_max_kmh: 24.5,
            rain_mm: 0.0,
            heat_level: 2,
            cold_level: 0,
            wind_level: 0,
            rain_level: 0,
        }
    }

    #[test]
    fn test_dates_serialize_as_plain_calendar_days() {
        // The stores use YYYY-MM-DD strings with no time component; any other
        // shape would break the downstream website readers.
        let json = serde_json::to_value(sample_day()).unwrap();
        assert_eq!(json["date"], "2024-06-01");
    }

    #[test]
    fn test_region_day_round_trips_through_json() {
        let day = sample_day();
        let json = serde_json::to_string(&day).unwrap();
        let back: RegionDay = serde_json::from_str(&json).unwrap();
        assert_eq!(back, day);
    }

    #[test]
    fn test_hazard_serializes_lowercase() {
        assert_eq!(serde_json::to_value(Hazard::Heat).unwrap(), "heat");
        assert_eq!(serde_json::to_value(Hazard::Rain).unwrap(), "rain");
        let back: Hazard = serde_json::from_str("\"cold\"").unwrap();
        assert_eq!(back, Hazard::Cold);
    }

    #[test]
    fn test_alert_event_uses_hazard_specific_peak_field() {
        let event = AlertEvent {
            country: "ES".to_string(),
            region_code: "ES-AN".to_string(),
            hazard: Hazard::Cold,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 8).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            n_days: 3,
            max_level: 3,
            peak: PeakValue::MinTminC(-12.0),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["min_tmin_c"], -12.0);
        assert!(
            json.get("max_tmax_c").is_none(),
            "a cold event must not carry a heat peak field"
        );

        let back: AlertEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn test_raw_observation_omits_snowfall_when_absent() {
        let obs = RawObservation {
            date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            country: "DE".to_string(),
            region_id: "BY".to_string(),
            region_code: "DE-BY".to_string(),
            city: "München".to_string(),
            tmax_c: Some(28.1),
            tmin_c: Some(14.9),
            wind_max_kmh: Some(19.0),
            rain_mm: None,
            snowfall_mm: None,
        };
        let json = serde_json::to_value(&obs).unwrap();
        assert!(json.get("snowfall_mm").is_none());
        // Core metrics stay present as explicit nulls.
        assert!(json["rain_mm"].is_null());

        let back: RawObservation = serde_json::from_value(json).unwrap();
        assert_eq!(back, obs);
    }

    #[test]
    fn test_region_day_level_accessor_matches_fields() {
        let day = sample_day();
        assert_eq!(day.level(Hazard::Heat), 2);
        assert_eq!(day.level(Hazard::Cold), 0);
        assert_eq!(day.level(Hazard::Wind), 0);
        assert_eq!(day.level(Hazard::Rain), 0);
    }

    #[test]
    fn test_fetch_error_messages_name_the_failure() {
        assert_eq!(FetchError::HttpStatus(429).to_string(), "HTTP error: 429");
        assert!(
            FetchError::NoData("FR-IDF / Paris".to_string())
                .to_string()
                .contains("FR-IDF / Paris")
        );
    }
}
