/// Data organization for the hazard monitoring pipeline.
///
/// Submodules:
/// - `grouping` — merges per-city raw observations into one classified
///   record per (date, region).

pub mod grouping;
