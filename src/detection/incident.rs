//! # Incidents
//!
//! An [`Incident`] is an advisory finding on one segment (or one fix) of a vessel track.
//! Incidents are **data, not errors**: they are created by the scanner or the outlier scorer,
//! never mutated afterwards, and serialized as-is into the report.
//!
//! JSON shape
//! -----------------
//! ```text
//! {"type": "speed_excess", "mmsi": 123456789,
//!  "ts_prev": "2024-01-01T00:00:00+00:00", "ts_curr": "2024-01-01T00:01:00+00:00",
//!  "details": {"speed_knots": 161.99, "distance_km": 5.0, "elapsed_seconds": 60.0}}
//! ```
//!
//! Detail values are rounded to two decimals; absent details are omitted.
use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    constants::{Kilometer, Knot, Mmsi, Seconds},
    time::{iso_utc, serialize_iso, serialize_opt_iso},
};

/// Category of an incident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentKind {
    /// Implied speed over the segment above `max_speed_knots`.
    SpeedExcess,
    /// Great-circle distance over the segment above `max_jump_km`.
    Teleport,
    /// Current fix earlier than the previous one.
    BadOrder,
    /// Segment flagged by the pooled outlier model.
    StatisticalOutlier,
}

impl IncidentKind {
    /// Every kind, in report tally order.
    pub const ALL: [IncidentKind; 4] = [
        IncidentKind::SpeedExcess,
        IncidentKind::Teleport,
        IncidentKind::BadOrder,
        IncidentKind::StatisticalOutlier,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IncidentKind::SpeedExcess => "speed_excess",
            IncidentKind::Teleport => "teleport",
            IncidentKind::BadOrder => "bad_order",
            IncidentKind::StatisticalOutlier => "statistical_outlier",
        }
    }
}

impl fmt::Display for IncidentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind-specific measurements attached to an incident.
///
/// * `bad_order` – empty
/// * `teleport` – `distance_km`
/// * `speed_excess` / `statistical_outlier` – `speed_knots`, `distance_km`, `elapsed_seconds`
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct IncidentDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed_knots: Option<Knot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<Kilometer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elapsed_seconds: Option<Seconds>,
}

impl IncidentDetails {
    /// No payload (`bad_order`).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Distance only (`teleport`).
    pub fn distance(distance_km: Kilometer) -> Self {
        IncidentDetails {
            distance_km: Some(round2(distance_km)),
            ..Self::default()
        }
    }

    /// Full segment motion (`speed_excess`, `statistical_outlier`).
    pub fn motion(speed_knots: Knot, distance_km: Kilometer, elapsed_seconds: Seconds) -> Self {
        IncidentDetails {
            speed_knots: Some(round2(speed_knots)),
            distance_km: Some(round2(distance_km)),
            elapsed_seconds: Some(round2(elapsed_seconds)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.speed_knots.is_none() && self.distance_km.is_none() && self.elapsed_seconds.is_none()
    }
}

impl fmt::Display for IncidentDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::with_capacity(3);
        if let Some(v) = self.speed_knots {
            parts.push(format!("speed_knots={v}"));
        }
        if let Some(v) = self.distance_km {
            parts.push(format!("distance_km={v}"));
        }
        if let Some(v) = self.elapsed_seconds {
            parts.push(format!("elapsed_seconds={v}"));
        }
        if parts.is_empty() {
            f.write_str("-")
        } else {
            f.write_str(&parts.join(", "))
        }
    }
}

/// A single finding on a vessel track.
///
/// # Fields
///
/// * `kind` - category of the finding (serialized as `type`)
/// * `vessel_id` - MMSI of the vessel (serialized as `mmsi`)
/// * `ts_prev` - timestamp of the previous fix, when the finding has a predecessor context
/// * `ts_curr` - timestamp of the current fix
/// * `details` - kind-specific measurements
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Incident {
    #[serde(rename = "type")]
    pub kind: IncidentKind,
    #[serde(rename = "mmsi")]
    pub vessel_id: Mmsi,
    #[serde(serialize_with = "serialize_opt_iso")]
    pub ts_prev: Option<DateTime<Utc>>,
    #[serde(serialize_with = "serialize_iso")]
    pub ts_curr: DateTime<Utc>,
    pub details: IncidentDetails,
}

impl Incident {
    /// Create an incident on the segment `(ts_prev, ts_curr)` of a vessel.
    pub fn on_segment(
        kind: IncidentKind,
        vessel_id: Mmsi,
        ts_prev: DateTime<Utc>,
        ts_curr: DateTime<Utc>,
        details: IncidentDetails,
    ) -> Self {
        Incident {
            kind,
            vessel_id,
            ts_prev: Some(ts_prev),
            ts_curr,
            details,
        }
    }
}

impl fmt::Display for Incident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prev = self.ts_prev.as_ref().map(iso_utc).unwrap_or_else(|| "-".into());
        write!(
            f,
            "[{}] {} {} -> {} ({})",
            self.kind,
            self.vessel_id,
            prev,
            iso_utc(&self.ts_curr),
            self.details
        )
    }
}

/// Round to two decimals, half away from zero.
#[inline]
pub(crate) fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
