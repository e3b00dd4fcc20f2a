/// Hazard severity classification and multi-day alert detection.
///
/// Submodules:
/// - `levels` — per-day severity ladders for each hazard.
/// - `detect` — run-length extraction of multi-day alert events.

pub mod detect;
pub mod levels;
