//! # Constants and type definitions for aisguard
//!
//! This module centralizes the **geodetic constants**, **unit conversion factors**, and
//! **common type definitions** used throughout the crate.
//!
//! ## Overview
//!
//! - Earth model and unit conversions (km/h ↔ knots, seconds ↔ hours)
//! - Core type aliases (degrees, kilometers, knots, seconds)
//! - The vessel identifier type [`Mmsi`]
//! - Container types for per-vessel tracks ([`Track`], [`TrackSet`])
//!
//! These definitions are shared by the normalizer, the scanner, the outlier scorer and the
//! exporters.

use std::collections::HashMap;

use ahash::RandomState;

use crate::position_fix::PositionFix;

// -------------------------------------------------------------------------------------------------
// Geodetic constants and unit conversions
// -------------------------------------------------------------------------------------------------

/// Mean Earth radius in kilometers (IUGG arithmetic mean radius)
pub const EARTH_RADIUS_KM: f64 = 6371.0088;

/// Kilometers per hour → knots
pub const KMH_TO_KNOTS: f64 = 0.539957;

/// Number of seconds in one hour
pub const SECONDS_PER_HOUR: f64 = 3600.0;

// -------------------------------------------------------------------------------------------------
// Detection defaults
// -------------------------------------------------------------------------------------------------

/// Default speed-excess threshold (knots)
pub const DEFAULT_MAX_SPEED_KNOTS: f64 = 45.0;

/// Default teleport threshold (kilometers)
pub const DEFAULT_MAX_JUMP_KM: f64 = 20.0;

/// Default expected fraction of outlier segments
pub const DEFAULT_CONTAMINATION: f64 = 0.02;

/// Admissible range for the contamination parameter
pub const CONTAMINATION_MIN: f64 = 0.001;
pub const CONTAMINATION_MAX: f64 = 0.5;

/// Default seed of the statistical scorer
pub const DEFAULT_SEED: u64 = 42;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Angle in degrees
pub type Degree = f64;
/// Distance in kilometers
pub type Kilometer = f64;
/// Speed in knots
pub type Knot = f64;
/// Duration in seconds
pub type Seconds = f64;

/// Maritime Mobile Service Identity of a vessel.
///
/// Stored as a plain signed integer: the format (9 digits, MID prefix) is **not** validated.
pub type Mmsi = i64;

// -------------------------------------------------------------------------------------------------
// Data containers
// -------------------------------------------------------------------------------------------------

/// Time-ordered position fixes of a single vessel.
pub type Track = Vec<PositionFix>;

/// A full set of tracks for multiple vessels.
///
/// The key is the [`Mmsi`] of the vessel, the value its [`Track`].
/// Uses [`ahash`](https://docs.rs/ahash) for fast hashing; iteration order is therefore
/// unspecified, use [`TrackStats::sorted_vessels`](crate::tracks::track_stats::TrackStats::sorted_vessels)
/// when a deterministic order is required.
pub type TrackSet = HashMap<Mmsi, Track, RandomState>;
