/// Structured logging for the hazard monitoring pipeline.
///
/// Provides context-rich logging with region/point identifiers, timestamps,
/// and severity levels. Supports console output and an optional append-only
/// log file for scheduled (cron) operation.

use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::sync::Mutex;

use chrono::Utc;

// ---------------------------------------------------------------------------
// Log levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl LogLevel {
    /// Parses a configuration-file level name.
    pub fn from_name(name: &str) -> Option<LogLevel> {
        match name {
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warning),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

// ---------------------------------------------------------------------------
// Data source tags
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    /// The Open-Meteo forecast/archive API.
    OpenMeteo,
    /// The on-disk JSON stores.
    Store,
    /// Pipeline orchestration itself.
    System,
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::OpenMeteo => write!(f, "OPEN-METEO"),
            DataSource::Store => write!(f, "STORE"),
            DataSource::System => write!(f, "SYS"),
        }
    }
}

// ---------------------------------------------------------------------------
// Failure classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureType {
    /// Expected degradation - provider throttling or transient outage.
    /// The run continues with zero rows for the affected point.
    Expected,
    /// Unexpected failure - indicates an API change or a bug on our side.
    Unexpected,
    /// Cannot determine from the error text alone.
    Unknown,
}

impl fmt::Display for FailureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureType::Expected => write!(f, "EXPECTED"),
            FailureType::Unexpected => write!(f, "UNEXPECTED"),
            FailureType::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Classifies a point-fetch failure from its error text.
///
/// Rate limiting (429) and timeouts are part of normal operation against a
/// free API tier; parse errors mean the response shape changed under us.
pub fn classify_fetch_failure(error_message: &str) -> FailureType {
    if error_message.contains("429") || error_message.contains("timed out") {
        FailureType::Expected
    } else if error_message.contains("Parse error") {
        FailureType::Unexpected
    } else if error_message.contains("HTTP error") {
        FailureType::Unexpected
    } else {
        FailureType::Unknown
    }
}

// ---------------------------------------------------------------------------
// Logger
// ---------------------------------------------------------------------------

/// Global logger instance
static LOGGER: Mutex<Option<Logger>> = Mutex::new(None);

pub struct Logger {
    /// Minimum log level to display
    min_level: LogLevel,
    /// Optional file path for logging
    log_file: Option<String>,
    /// Whether to include timestamps in console output
    console_timestamps: bool,
}

impl Logger {
    fn log(&self, level: LogLevel, source: DataSource, context: Option<&str>, message: &str) {
        if level < self.min_level {
            return;
        }

        let context_part = context.map(|c| format!(" [{}]", c)).unwrap_or_default();
        let line = format!("{}{}: {}", source, context_part, message);

        if self.console_timestamps {
            let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
            let stamped = format!("{} {} {}", timestamp, level, line);
            match level {
                LogLevel::Error | LogLevel::Warning => eprintln!("{}", stamped),
                _ => println!("{}", stamped),
            }
            self.append_to_file(&stamped);
        } else {
            match level {
                LogLevel::Error => eprintln!("   ✗ {}", line),
                LogLevel::Warning => eprintln!("   ⚠ {}", line),
                LogLevel::Info => println!("   {}", message),
                LogLevel::Debug => println!("   [DEBUG] {}", line),
            }
            self.append_to_file(&format!("{} {}", level, line));
        }
    }

    fn append_to_file(&self, entry: &str) {
        let Some(path) = &self.log_file else { return };
        let result = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .and_then(|mut file| writeln!(file, "{}", entry));
        if let Err(e) = result {
            eprintln!("Failed to write to log file {}: {}", path, e);
        }
    }
}

/// Initialize the global logger. Later calls replace the earlier settings.
pub fn init_logger(min_level: LogLevel, log_file: Option<&str>, console_timestamps: bool) {
    *LOGGER.lock().unwrap() = Some(Logger {
        min_level,
        log_file: log_file.map(String::from),
        console_timestamps,
    });
}

fn with_logger(level: LogLevel, source: DataSource, context: Option<&str>, message: &str) {
    if let Some(logger) = LOGGER.lock().unwrap().as_ref() {
        logger.log(level, source, context, message);
    }
}

pub fn info(source: DataSource, context: Option<&str>, message: &str) {
    with_logger(LogLevel::Info, source, context, message);
}

pub fn warn(source: DataSource, context: Option<&str>, message: &str) {
    with_logger(LogLevel::Warning, source, context, message);
}

pub fn error(source: DataSource, context: Option<&str>, message: &str) {
    with_logger(LogLevel::Error, source, context, message);
}

pub fn debug(source: DataSource, context: Option<&str>, message: &str) {
    with_logger(LogLevel::Debug, source, context, message);
}

// ---------------------------------------------------------------------------
// Structured failure logging
// ---------------------------------------------------------------------------

/// Log a point-fetch failure with automatic classification.
///
/// `context` identifies the point, e.g. "FR-IDF / Paris".
pub fn log_fetch_failure(context: &str, err: &dyn std::error::Error) {
    let error_msg = err.to_string();
    let failure_type = classify_fetch_failure(&error_msg);
    let message = format!("fetch failed [{}]: {}", failure_type, error_msg);

    match failure_type {
        FailureType::Expected => debug(DataSource::OpenMeteo, Some(context), &message),
        FailureType::Unexpected => error(DataSource::OpenMeteo, Some(context), &message),
        FailureType::Unknown => warn(DataSource::OpenMeteo, Some(context), &message),
    }
}

/// Log a summary of one ingestion pass over the point catalog.
pub fn log_fetch_summary(total: usize, successful: usize, rows: usize) {
    let failed = total - successful;
    let message = format!(
        "Fetch complete: {}/{} points, {} rows, {} skipped",
        successful, total, rows, failed
    );

    if failed == 0 {
        info(DataSource::OpenMeteo, None, &message);
    } else if successful == 0 {
        error(DataSource::OpenMeteo, None, &message);
    } else {
        warn(DataSource::OpenMeteo, None, &message);
    }
}
