//! # aisguard
//!
//! Anomaly detection over AIS vessel tracks: position fixes are normalized into per-vessel
//! tracks, scanned pairwise for implausible speeds, teleports and out-of-order timestamps,
//! optionally scored by an isolation forest, and aggregated into a single [`Report`].
//!
//! ```no_run
//! use camino::Utf8Path;
//! use aisguard::{DetectionParams, TrackFile, TrackScan, TrackSet};
//!
//! # fn demo() -> Result<(), aisguard::AisGuardError> {
//! let tracks = TrackSet::new_from_csv(Utf8Path::new("tracks.csv"))?;
//! let params = DetectionParams::builder()
//!     .max_speed_knots(40.0)
//!     .use_statistical_scoring(true)
//!     .build()?;
//! let report = tracks.detect_anomalies("tracks.csv", &params);
//! report.write_json(Utf8Path::new("report.json"))?;
//! println!("{report:#}");
//! # Ok(()) }
//! ```
pub mod aisguard_errors;
pub mod constants;
pub mod detection;
pub mod export;
pub mod geodesy;
pub mod position_fix;
pub mod time;
pub mod tracks;

pub use aisguard_errors::AisGuardError;
pub use constants::{Mmsi, Track, TrackSet};
pub use detection::{
    incident::{Incident, IncidentKind},
    pipeline::TrackScan,
    report::Report,
    DetectionParams,
};
pub use position_fix::{AisRecord, PositionFix};
pub use tracks::{track_file::TrackFile, track_stats::TrackStats};
