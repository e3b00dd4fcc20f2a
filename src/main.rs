/// Pipeline runner.
///
/// Runs the five stages in order, each one reading its input store from disk
/// and rewriting its output store before the next begins: region catalog,
/// raw fetch, region-day aggregation, alert detection, status/export. A
/// failed point fetch degrades to zero rows for that point; structural
/// errors (unwritable stores, broken config) abort the run. Concurrent runs
/// are not supported — schedule this binary serially.

use std::collections::HashSet;
use std::error::Error;
use std::path::Path;
use std::time::Duration;

use chrono::{Days, SecondsFormat, Utc};

use hazmon_service::alert::detect;
use hazmon_service::analysis::grouping;
use hazmon_service::config::Config;
use hazmon_service::ingest::open_meteo;
use hazmon_service::logging::{self, DataSource};
use hazmon_service::model::{RawObservation, RegionDay};
use hazmon_service::{regions, status, store};

fn main() {
    let config_path = std::env::args().nth(1).unwrap_or_else(|| "hazmon.toml".to_string());
    if let Err(err) = run(Path::new(&config_path)) {
        eprintln!("pipeline failed: {}", err);
        std::process::exit(1);
    }
}

fn run(config_path: &Path) -> Result<(), Box<dyn Error>> {
    let config = Config::load(config_path)?;
    logging::init_logger(
        config.logging.min_level(),
        config.logging.file.as_deref(),
        config.logging.timestamps,
    );

    let started = Utc::now();
    logging::info(
        DataSource::System,
        None,
        &format!(
            "[{}] Starting weather hazard pipeline",
            started.to_rfc3339_opts(SecondsFormat::Secs, true)
        ),
    );

    logging::info(DataSource::System, None, "1) Writing region catalog...");
    store::save(&config.storage.region_points_path(), &regions::all_points())?;

    logging::info(DataSource::System, None, "2) Fetching regional weather from Open-Meteo...");
    let fresh = fetch_all_points(&config)?;
    let existing: Vec<RawObservation> = store::load_or_empty(&config.storage.raw_path());
    let today = Utc::now().date_naive();
    let raw = store::refresh_raw_store(existing, fresh, today, config.ingest.retention_days);
    store::save(&config.storage.raw_path(), &raw)?;
    logging::info(DataSource::Store, None, &format!("raw store: {} rows", raw.len()));

    logging::info(DataSource::System, None, "3) Computing hazard levels per region/day...");
    let raw: Vec<RawObservation> = store::load_or_empty(&config.storage.raw_path());
    let days = grouping::aggregate_region_days(&raw);
    store::save(&config.storage.region_days_path(), &days)?;
    logging::info(DataSource::Store, None, &format!("region days: {} rows", days.len()));

    logging::info(DataSource::System, None, "4) Detecting multi-day alerts per region...");
    let days: Vec<RegionDay> = store::load_or_empty(&config.storage.region_days_path());
    let alerts = detect::detect_all(&days);
    store::save(&config.storage.alerts_path(), &alerts)?;
    logging::info(DataSource::Store, None, &format!("alerts: {} events", alerts.len()));

    logging::info(DataSource::System, None, "5) Writing status and exporting...");
    let finished = Utc::now();
    let summary =
        status::build_status(started, finished, config.ingest.retention_days, &days, &alerts);
    store::save_object(&config.storage.status_path(), &summary)?;
    if let Some(export_dir) = &config.storage.export_dir {
        status::export_for_web(&config.storage, export_dir)?;
    }

    logging::info(
        DataSource::System,
        None,
        &format!(
            "[{}] Pipeline completed",
            finished.to_rfc3339_opts(SecondsFormat::Secs, true)
        ),
    );
    Ok(())
}

/// Fetches the recent daily series for every registry point, degrading to
/// zero rows per failed point. Regions appearing in the store for the first
/// time get an archive backfill when the retention window reaches further
/// back than the forecast endpoint can.
fn fetch_all_points(config: &Config) -> Result<Vec<RawObservation>, Box<dyn Error>> {
    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(config.ingest.request_timeout_secs))
        .build()?;

    let existing: Vec<RawObservation> = store::load_or_empty(&config.storage.raw_path());
    let covered: HashSet<String> = existing.iter().map(|r| r.region_code.clone()).collect();

    let today = Utc::now().date_naive();
    let window_start = store::retention_window_start(today, config.ingest.retention_days);
    let recent_start = today
        .checked_sub_days(Days::new(
            config.ingest.past_days.min(open_meteo::MAX_PAST_DAYS) as u64,
        ))
        .expect("date in range");

    let mut rows = Vec::new();
    let mut successful = 0usize;
    for point in regions::REGION_REGISTRY {
        let label = open_meteo::point_label(point);
        match open_meteo::fetch_recent_with_retry(&client, point, &config.ingest) {
            Ok(fetched) => {
                logging::debug(
                    DataSource::OpenMeteo,
                    Some(&label),
                    &format!("{} days", fetched.len()),
                );

                // Archive backfill is best-effort: on failure the recent
                // rows still count and the head of the window stays sparse.
                if !covered.contains(&point.region_code()) && window_start < recent_start {
                    let archive_end = recent_start.pred_opt().expect("date in range");
                    match open_meteo::fetch_archive_daily(
                        &client,
                        point,
                        window_start,
                        archive_end,
                        &config.ingest.timezone,
                    ) {
                        Ok(archive_rows) => rows.extend(archive_rows),
                        Err(err) => logging::log_fetch_failure(&label, &err),
                    }
                }

                rows.extend(fetched);
                successful += 1;
            }
            Err(err) => logging::log_fetch_failure(&label, &err),
        }
        std::thread::sleep(Duration::from_millis(config.ingest.throttle_ms));
    }

    logging::log_fetch_summary(regions::REGION_REGISTRY.len(), successful, rows.len());
    Ok(rows)
}
