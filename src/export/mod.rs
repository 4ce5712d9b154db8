//! # Map exporters
//!
//! Render a [`TrackSet`] and its incidents for GIS tools:
//!
//! * [`geojson`] – one `FeatureCollection` with a `LineString` per vessel and a `Point` per
//!   incident.
//! * [`kml`] – a KML 2.2 document with the same content, styled for Google Earth.
//!
//! Both exporters skip tracks with fewer than two fixes and incidents that cannot be placed:
//! an incident is located at the first fix of its vessel whose timestamp equals the incident's
//! `ts_curr`. Vessels are written in ascending identifier order.
use std::fs;

use camino::Utf8Path;

use crate::{
    aisguard_errors::AisGuardError, detection::incident::Incident, position_fix::PositionFix,
    TrackSet,
};

pub mod geojson;
pub mod kml;

/// Fix an incident refers to, if any.
pub(crate) fn locate_incident<'a>(
    tracks: &'a TrackSet,
    incident: &Incident,
) -> Option<&'a PositionFix> {
    tracks
        .get(&incident.vessel_id)?
        .iter()
        .find(|fix| fix.timestamp == incident.ts_curr)
}

/// Create the parent directory of `path` when missing.
pub(crate) fn ensure_parent_dir(path: &Utf8Path) -> Result<(), AisGuardError> {
    match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => Ok(fs::create_dir_all(parent)?),
        _ => Ok(()),
    }
}
