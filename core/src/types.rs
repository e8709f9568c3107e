//! Shared primitive types used across the entire assessment.

/// Stable region identifier (`GID_id` in the input data).
pub type RegionId = String;

/// A monetary amount in catalog currency units (USD in the shipped data).
pub type Usd = f64;

/// The canonical run identifier.
pub type RunId = String;
