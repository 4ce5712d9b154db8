//! # Position fixes and raw AIS records
//!
//! [`AisRecord`] is one row of the tabular input, exactly as read (all text, enrichment
//! fields optional). [`PositionFix`] is the typed, immutable form consumed by the detectors.
//! The conversion between the two lives in [`AisRecord::to_fix`] and applies the
//! normalization policy:
//!
//! * vessel identifier → integer, coordinates → `f64` (failure is an error),
//! * **no range validation** on latitude/longitude: out-of-range values are kept,
//! * timestamp → UTC instant; an unparseable timestamp drops the row (`Ok(None)`),
//! * `sog` / `cog` parsed leniently, anything unparseable becomes `None`.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    aisguard_errors::AisGuardError,
    constants::{Degree, Knot, Mmsi},
    time::{iso_utc, parse_timestamp},
};

/// A single position report of a vessel.
///
/// # Fields
///
/// * `vessel_id` - MMSI of the vessel
/// * `latitude` - latitude in degrees (signed, not range checked)
/// * `longitude` - longitude in degrees (signed, not range checked)
/// * `timestamp` - instant of the fix, UTC
/// * `sog` - optional speed over ground reported by the transponder (knots)
/// * `cog` - optional course over ground reported by the transponder (degrees)
#[derive(Debug, Clone, PartialEq)]
pub struct PositionFix {
    pub vessel_id: Mmsi,
    pub latitude: Degree,
    pub longitude: Degree,
    pub timestamp: DateTime<Utc>,
    pub sog: Option<Knot>,
    pub cog: Option<Degree>,
}

impl PositionFix {
    /// Create a new fix without speed/course enrichment.
    pub fn new(
        vessel_id: Mmsi,
        latitude: Degree,
        longitude: Degree,
        timestamp: DateTime<Utc>,
    ) -> Self {
        PositionFix {
            vessel_id,
            latitude,
            longitude,
            timestamp,
            sog: None,
            cog: None,
        }
    }

    /// Attach reported speed and course over ground.
    pub fn with_motion(mut self, sog: Option<Knot>, cog: Option<Degree>) -> Self {
        self.sog = sog;
        self.cog = cog;
        self
    }
}

impl std::fmt::Display for PositionFix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} @ {} ({:.5}, {:.5})",
            self.vessel_id,
            iso_utc(&self.timestamp),
            self.latitude,
            self.longitude
        )
    }
}

/// One row of the tabular AIS input.
///
/// Column names follow the input table (`vessel_id`, `latitude`, `longitude`, `timestamp`);
/// the short names `mmsi`, `lat`, `lon` and `ts` are accepted as aliases. Enrichment columns
/// are optional and only `sog` / `cog` reach the [`PositionFix`]; the rest is carried for
/// collaborators and ignored by the detectors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AisRecord {
    #[serde(alias = "mmsi")]
    pub vessel_id: String,
    #[serde(alias = "lat")]
    pub latitude: String,
    #[serde(alias = "lon")]
    pub longitude: String,
    #[serde(alias = "ts")]
    pub timestamp: String,

    #[serde(default)]
    pub sog: Option<String>,
    #[serde(default)]
    pub cog: Option<String>,
    #[serde(default)]
    pub heading: Option<String>,
    #[serde(default)]
    pub nav_status: Option<String>,
    #[serde(default)]
    pub rot: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub callsign: Option<String>,
    #[serde(default)]
    pub ship_type: Option<String>,
    #[serde(default)]
    pub dim_a: Option<String>,
    #[serde(default)]
    pub dim_b: Option<String>,
    #[serde(default)]
    pub dim_c: Option<String>,
    #[serde(default)]
    pub dim_d: Option<String>,
}

impl AisRecord {
    /// Build a record from the four required fields.
    pub fn new(
        vessel_id: impl Into<String>,
        latitude: impl Into<String>,
        longitude: impl Into<String>,
        timestamp: impl Into<String>,
    ) -> Self {
        AisRecord {
            vessel_id: vessel_id.into(),
            latitude: latitude.into(),
            longitude: longitude.into(),
            timestamp: timestamp.into(),
            ..Default::default()
        }
    }

    /// Coerce the record into a [`PositionFix`].
    ///
    /// Arguments
    /// -----------------
    /// * `record`: position of the record in its source (used in error messages only).
    ///
    /// Return
    /// ----------
    /// * `Ok(Some(fix))` – a valid fix.
    /// * `Ok(None)` – the timestamp could not be parsed, the row is dropped.
    /// * `Err(AisGuardError::InvalidField)` – identifier or coordinates are not numeric.
    pub fn to_fix(&self, record: usize) -> Result<Option<PositionFix>, AisGuardError> {
        let vessel_id = parse_vessel_id(&self.vessel_id).ok_or_else(|| {
            AisGuardError::InvalidField {
                record,
                field: "vessel_id",
                value: self.vessel_id.clone(),
            }
        })?;
        let latitude = parse_f64(&self.latitude).ok_or_else(|| AisGuardError::InvalidField {
            record,
            field: "latitude",
            value: self.latitude.clone(),
        })?;
        let longitude = parse_f64(&self.longitude).ok_or_else(|| AisGuardError::InvalidField {
            record,
            field: "longitude",
            value: self.longitude.clone(),
        })?;

        let Some(timestamp) = parse_timestamp(&self.timestamp) else {
            return Ok(None);
        };

        let sog = self.sog.as_deref().and_then(parse_f64);
        let cog = self.cog.as_deref().and_then(parse_f64);

        Ok(Some(
            PositionFix::new(vessel_id, latitude, longitude, timestamp).with_motion(sog, cog),
        ))
    }
}

fn parse_f64(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok()
}

/// Integer identifier; integral floats such as `"123456789.0"` are accepted.
fn parse_vessel_id(raw: &str) -> Option<Mmsi> {
    let s = raw.trim();
    if let Ok(id) = s.parse::<Mmsi>() {
        return Some(id);
    }
    let f = s.parse::<f64>().ok()?;
    // outside the i64 range `as` saturates; `Mmsi::MAX as f64` is 2^63, hence the open bound
    let in_range = (Mmsi::MIN as f64..Mmsi::MAX as f64).contains(&f);
    (in_range && f.fract() == 0.0).then_some(f as Mmsi)
}
