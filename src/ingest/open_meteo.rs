/// Open-Meteo API client.
///
/// Retrieves daily weather aggregates (temperature extremes, wind maximum,
/// precipitation, snowfall) per monitored point. Two endpoints are used:
/// the forecast endpoint serves the recent past plus a short forecast, the
/// archive endpoint serves date-ranged historical backfill beyond the
/// forecast endpoint's `past_days` reach.
///
/// API documentation: https://open-meteo.com/en/docs
/// Archive: https://open-meteo.com/en/docs/historical-weather-api

use chrono::NaiveDate;
use serde::Deserialize;

use crate::config::IngestConfig;
use crate::model::{FetchError, RawObservation};
use crate::regions::MonitoredPoint;

const FORECAST_BASE_URL: &str = "https://api.open-meteo.com/v1/forecast";
const ARCHIVE_BASE_URL: &str = "https://archive-api.open-meteo.com/v1/archive";

/// Daily variables requested from both endpoints, in response order.
pub const DAILY_FIELDS: &str =
    "temperature_2m_max,temperature_2m_min,wind_speed_10m_max,precipitation_sum,snowfall_sum";

/// The forecast endpoint rejects past_days beyond this.
pub const MAX_PAST_DAYS: u32 = 92;

// ============================================================================
// API response structures
// ============================================================================

/// Daily-aggregate response from either endpoint.
#[derive(Debug, Deserialize)]
pub struct DailyResponse {
    pub daily: DailySeries,
}

/// Column-oriented daily series; all columns are index-aligned with `time`.
/// Metric entries are `null` for days the provider has no data for.
#[derive(Debug, Deserialize)]
pub struct DailySeries {
    pub time: Vec<NaiveDate>,
    pub temperature_2m_max: Vec<Option<f64>>,
    pub temperature_2m_min: Vec<Option<f64>>,
    pub wind_speed_10m_max: Vec<Option<f64>>,
    pub precipitation_sum: Vec<Option<f64>>,
    #[serde(default)]
    pub snowfall_sum: Option<Vec<Option<f64>>>,
}

// ============================================================================
// URL construction
// ============================================================================

/// URL for the forecast endpoint: `past_days` of history plus
/// `forecast_days` of forecast, daily aggregates in the given timezone.
pub fn build_forecast_url(point: &MonitoredPoint, ingest: &IngestConfig) -> String {
    format!(
        "{}?latitude={}&longitude={}&daily={}&timezone={}&past_days={}&forecast_days={}",
        FORECAST_BASE_URL,
        point.lat,
        point.lon,
        DAILY_FIELDS,
        ingest.timezone,
        ingest.past_days.min(MAX_PAST_DAYS),
        ingest.forecast_days,
    )
}

/// URL for the archive endpoint over an inclusive date range.
pub fn build_archive_url(
    point: &MonitoredPoint,
    start_date: NaiveDate,
    end_date: NaiveDate,
    timezone: &str,
) -> String {
    format!(
        "{}?latitude={}&longitude={}&daily={}&timezone={}&start_date={}&end_date={}",
        ARCHIVE_BASE_URL,
        point.lat,
        point.lon,
        DAILY_FIELDS,
        timezone,
        start_date.format("%Y-%m-%d"),
        end_date.format("%Y-%m-%d"),
    )
}

// ============================================================================
// Fetching
// ============================================================================

/// "FR-IDF / Paris" — the context tag used in logs and errors.
pub fn point_label(point: &MonitoredPoint) -> String {
    format!("{} / {}", point.region_code(), point.city)
}

fn get_body(client: &reqwest::blocking::Client, url: &str) -> Result<String, FetchError> {
    let response = client
        .get(url)
        .send()
        .map_err(|e| FetchError::Request(e.to_string()))?;
    if !response.status().is_success() {
        return Err(FetchError::HttpStatus(response.status().as_u16()));
    }
    response.text().map_err(|e| FetchError::Request(e.to_string()))
}

/// Fetches the recent daily series (past days + short forecast) for a point.
pub fn fetch_recent_daily(
    client: &reqwest::blocking::Client,
    point: &MonitoredPoint,
    ingest: &IngestConfig,
) -> Result<Vec<RawObservation>, FetchError> {
    let body = get_body(client, &build_forecast_url(point, ingest))?;
    parse_daily_body(point, &body)
}

/// Fetches a historical date range for a point from the archive endpoint.
pub fn fetch_archive_daily(
    client: &reqwest::blocking::Client,
    point: &MonitoredPoint,
    start_date: NaiveDate,
    end_date: NaiveDate,
    timezone: &str,
) -> Result<Vec<RawObservation>, FetchError> {
    let body = get_body(client, &build_archive_url(point, start_date, end_date, timezone))?;
    parse_daily_body(point, &body)
}

/// Like [`fetch_recent_daily`], but retries once after a fixed backoff.
/// Provider hiccups on a free tier are common enough that a single retry
/// recovers most of them; anything beyond that is the caller's problem.
pub fn fetch_recent_with_retry(
    client: &reqwest::blocking::Client,
    point: &MonitoredPoint,
    ingest: &IngestConfig,
) -> Result<Vec<RawObservation>, FetchError> {
    match fetch_recent_daily(client, point, ingest) {
        Ok(rows) => Ok(rows),
        Err(first) => {
            crate::logging::debug(
                crate::logging::DataSource::OpenMeteo,
                Some(&point_label(point)),
                &format!("retrying after {}s backoff: {}", ingest.retry_backoff_secs, first),
            );
            std::thread::sleep(std::time::Duration::from_secs(ingest.retry_backoff_secs));
            fetch_recent_daily(client, point, ingest)
        }
    }
}

// ============================================================================
// Parsing
// ============================================================================

/// Parses a daily-aggregate response body into one `RawObservation` per day,
/// tagged with the point's region fields.
pub fn parse_daily_body(
    point: &MonitoredPoint,
    body: &str,
) -> Result<Vec<RawObservation>, FetchError> {
    let response: DailyResponse =
        serde_json::from_str(body).map_err(|e| FetchError::Parse(e.to_string()))?;
    let daily = response.daily;

    if daily.time.is_empty() {
        return Err(FetchError::NoData(point_label(point)));
    }

    let metric = |values: &[Option<f64>], i: usize| values.get(i).copied().flatten();

    let mut rows = Vec::with_capacity(daily.time.len());
    for (i, date) in daily.time.iter().enumerate() {
        rows.push(RawObservation {
            date: *date,
            country: point.country.to_string(),
            region_id: point.region_id.to_string(),
            region_code: point.region_code(),
            city: point.city.to_string(),
            tmax_c: metric(&daily.temperature_2m_max, i),
            tmin_c: metric(&daily.temperature_2m_min, i),
            wind_max_kmh: metric(&daily.wind_speed_10m_max, i),
            rain_mm: metric(&daily.precipitation_sum, i),
            snowfall_mm: daily.snowfall_sum.as_deref().and_then(|v| metric(v, i)),
        });
    }
    Ok(rows)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regions;

    fn paris() -> &'static MonitoredPoint {
        regions::REGION_REGISTRY
            .iter()
            .find(|p| p.city == "Paris")
            .expect("Paris should be in the registry")
    }

    #[test]
    fn test_forecast_url_carries_point_and_window() {
        let url = build_forecast_url(paris(), &IngestConfig::default());
        assert!(url.starts_with("https://api.open-meteo.com/v1/forecast?"));
        assert!(url.contains("latitude=48.8534"));
        assert!(url.contains("past_days=90"));
        assert!(url.contains("forecast_days=1"));
        assert!(url.contains("daily=temperature_2m_max,"));
        assert!(url.contains("timezone=Europe/Berlin"));
    }

    #[test]
    fn test_forecast_url_clamps_past_days_to_provider_cap() {
        let ingest = IngestConfig { past_days: 365, ..IngestConfig::default() };
        let url = build_forecast_url(paris(), &ingest);
        assert!(
            url.contains(&format!("past_days={}", MAX_PAST_DAYS)),
            "past_days beyond the provider cap must be clamped: {}",
            url
        );
    }

    #[test]
    fn test_archive_url_uses_date_range() {
        let url = build_archive_url(
            paris(),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
            "Europe/Berlin",
        );
        assert!(url.starts_with("https://archive-api.open-meteo.com/v1/archive?"));
        assert!(url.contains("start_date=2024-03-01"));
        assert!(url.contains("end_date=2024-03-31"));
    }

    #[test]
    fn test_parse_daily_body_builds_one_row_per_day() {
        let body = r#"{
            "daily": {
                "time": ["2024-06-01", "2024-06-02"],
                "temperature_2m_max": [31.2, 33.0],
                "temperature_2m_min": [18.4, 19.9],
                "wind_speed_10m_max": [22.0, 35.6],
                "precipitation_sum": [0.0, 4.2],
                "snowfall_sum": [0.0, null]
            }
        }"#;
        let rows = parse_daily_body(paris(), body).expect("valid body should parse");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].region_code, "FR-IDF");
        assert_eq!(rows[0].city, "Paris");
        assert_eq!(rows[0].tmax_c, Some(31.2));
        assert_eq!(rows[1].rain_mm, Some(4.2));
        assert_eq!(rows[0].snowfall_mm, Some(0.0));
        assert_eq!(rows[1].snowfall_mm, None, "null snowfall maps to None");
    }

    #[test]
    fn test_parse_daily_body_keeps_null_metrics_as_none() {
        // The provider returns null for days it has no data for; those
        // must reach the aggregation stage as missing, not as zero.
        let body = r#"{
            "daily": {
                "time": ["2024-06-01"],
                "temperature_2m_max": [null],
                "temperature_2m_min": [17.0],
                "wind_speed_10m_max": [null],
                "precipitation_sum": [1.1]
            }
        }"#;
        let rows = parse_daily_body(paris(), body).unwrap();
        assert_eq!(rows[0].tmax_c, None);
        assert_eq!(rows[0].tmin_c, Some(17.0));
        assert_eq!(rows[0].wind_max_kmh, None);
        assert_eq!(rows[0].snowfall_mm, None, "absent snowfall column maps to None");
    }

    #[test]
    fn test_parse_daily_body_rejects_empty_series() {
        let body = r#"{
            "daily": {
                "time": [],
                "temperature_2m_max": [],
                "temperature_2m_min": [],
                "wind_speed_10m_max": [],
                "precipitation_sum": []
            }
        }"#;
        let err = parse_daily_body(paris(), body).unwrap_err();
        assert!(matches!(err, FetchError::NoData(_)));
    }

    #[test]
    fn test_parse_daily_body_rejects_shape_changes() {
        let err = parse_daily_body(paris(), r#"{"hourly": {}}"#).unwrap_err();
        assert!(matches!(err, FetchError::Parse(_)));
    }
}
