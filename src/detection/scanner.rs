//! # Rule-based sequential scanner
//!
//! Walks each vessel track pairwise and applies the deterministic rules:
//!
//! | rule           | condition                                   | details                                      |
//! |----------------|---------------------------------------------|----------------------------------------------|
//! | `bad_order`    | `curr.timestamp < prev.timestamp`           | none; the pair is not measured further       |
//! | *(skip)*       | `elapsed_seconds <= 0`                      | no incident, no feature                      |
//! | `teleport`     | `distance_km > max_jump_km`                 | `distance_km`                                |
//! | `speed_excess` | `speed_knots > max_speed_knots`             | `speed_knots`, `distance_km`, `elapsed_seconds` |
//!
//! `teleport` and `speed_excess` are independent and may both fire on the same pair
//! (teleport first). Tracks produced by the normalizer are already sorted: `bad_order` only
//! fires on hand-built tracks that bypass it.
//!
//! Each vessel scan returns an immutable [`VesselScan`]. [`scan_tracks`] runs them in
//! parallel (feature `parallel`) and returns the results ordered by vessel identifier, so the
//! merge is deterministic whatever the scheduling.
use chrono::{DateTime, Utc};
use nalgebra::Vector5;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::trace;

use super::{
    incident::{Incident, IncidentDetails, IncidentKind},
    DetectionParams,
};
use crate::{
    constants::{Kilometer, Knot, Mmsi, Seconds},
    geodesy::{distance_km, speed_knots},
    position_fix::PositionFix,
    time::elapsed_seconds,
    tracks::track_stats::TrackStats,
    TrackSet,
};

/// Feature vector of a measured segment and the key identifying it.
///
/// Layout of `features`: `[distance_km, elapsed_seconds, speed_knots, curr.latitude, curr.longitude]`.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentFeatures {
    pub vessel_id: Mmsi,
    pub ts_prev: DateTime<Utc>,
    pub ts_curr: DateTime<Utc>,
    pub features: Vector5<f64>,
}

impl SegmentFeatures {
    pub fn new(
        vessel_id: Mmsi,
        prev: &PositionFix,
        curr: &PositionFix,
        distance: Kilometer,
        elapsed: Seconds,
        speed: Knot,
    ) -> Self {
        SegmentFeatures {
            vessel_id,
            ts_prev: prev.timestamp,
            ts_curr: curr.timestamp,
            features: Vector5::new(distance, elapsed, speed, curr.latitude, curr.longitude),
        }
    }

    #[inline]
    pub fn distance_km(&self) -> Kilometer {
        self.features[0]
    }

    #[inline]
    pub fn elapsed_seconds(&self) -> Seconds {
        self.features[1]
    }

    #[inline]
    pub fn speed_knots(&self) -> Knot {
        self.features[2]
    }
}

/// Outcome of scanning one vessel track.
///
/// * `incidents` – rule-based incidents, chronological.
/// * `segments` – measured segments, only filled when features are collected.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VesselScan {
    pub vessel_id: Mmsi,
    pub incidents: Vec<Incident>,
    pub segments: Vec<SegmentFeatures>,
}

/// Scan one track.
///
/// Arguments
/// -----------------
/// * `vessel_id`: identifier stamped on incidents and segment keys.
/// * `track`: fixes in the order they must be evaluated.
/// * `params`: rule thresholds.
/// * `collect_features`: keep the feature vector of every measured segment.
///
/// Return
/// ----------
/// * the [`VesselScan`] of this vessel; empty for tracks with fewer than two fixes.
pub fn scan_track(
    vessel_id: Mmsi,
    track: &[PositionFix],
    params: &DetectionParams,
    collect_features: bool,
) -> VesselScan {
    let mut scan = VesselScan {
        vessel_id,
        ..VesselScan::default()
    };

    for pair in track.windows(2) {
        let (prev, curr) = (&pair[0], &pair[1]);

        if curr.timestamp < prev.timestamp {
            scan.incidents.push(Incident::on_segment(
                IncidentKind::BadOrder,
                vessel_id,
                prev.timestamp,
                curr.timestamp,
                IncidentDetails::empty(),
            ));
            continue;
        }

        let dt = elapsed_seconds(&prev.timestamp, &curr.timestamp);
        if dt <= 0.0 {
            trace!(vessel_id, ts = %curr.timestamp, "skipping zero-duration segment");
            continue;
        }

        let dist = distance_km(prev, curr);
        let speed = speed_knots(dist, dt);

        if dist > params.max_jump_km {
            scan.incidents.push(Incident::on_segment(
                IncidentKind::Teleport,
                vessel_id,
                prev.timestamp,
                curr.timestamp,
                IncidentDetails::distance(dist),
            ));
        }
        if speed > params.max_speed_knots {
            scan.incidents.push(Incident::on_segment(
                IncidentKind::SpeedExcess,
                vessel_id,
                prev.timestamp,
                curr.timestamp,
                IncidentDetails::motion(speed, dist, dt),
            ));
        }

        if collect_features {
            scan.segments
                .push(SegmentFeatures::new(vessel_id, prev, curr, dist, dt, speed));
        }
    }

    scan
}

/// Scan every track of a set.
///
/// Return
/// ----------
/// * one [`VesselScan`] per vessel, ordered by ascending vessel identifier.
pub fn scan_tracks(
    tracks: &TrackSet,
    params: &DetectionParams,
    collect_features: bool,
) -> Vec<VesselScan> {
    let vessels = tracks.sorted_vessels();

    #[cfg(feature = "parallel")]
    let iter = vessels.par_iter();
    #[cfg(not(feature = "parallel"))]
    let iter = vessels.iter();

    // order of `vessels` is preserved by both iterators on collect
    iter.map(|vessel| scan_track(*vessel, &tracks[vessel], params, collect_features))
        .collect()
}
