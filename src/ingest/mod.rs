/// Weather data ingestion.
///
/// Submodules:
/// - `open_meteo` — daily per-point series from the Open-Meteo API.

pub mod open_meteo;
