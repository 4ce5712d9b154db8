//! GeoJSON `FeatureCollection` export.
//!
//! ```text
//! {"type": "FeatureCollection", "features": [
//!   {"type": "Feature", "geometry": {"type": "LineString", "coordinates": [[lon, lat], ...]},
//!    "properties": {"mmsi": 123456789}},
//!   {"type": "Feature", "geometry": {"type": "Point", "coordinates": [lon, lat]},
//!    "properties": {"type": "teleport", "mmsi": 123456789, "ts": "...", "distance_km": 25.0}}
//! ]}
//! ```
use std::{fs::File, io::BufWriter, io::Write};

use camino::Utf8Path;
use serde_json::{json, Map, Value};
use tracing::debug;

use super::{ensure_parent_dir, locate_incident};
use crate::{
    aisguard_errors::AisGuardError, detection::incident::Incident, time::iso_utc,
    tracks::track_stats::TrackStats, TrackSet,
};

/// Build the feature collection of `tracks` and `incidents`.
pub fn to_feature_collection(tracks: &TrackSet, incidents: &[Incident]) -> Value {
    let lines = tracks
        .sorted_vessels()
        .into_iter()
        .filter_map(|vessel| {
            let track = &tracks[&vessel];
            (track.len() >= 2).then(|| {
                let coords: Vec<[f64; 2]> =
                    track.iter().map(|f| [f.longitude, f.latitude]).collect();
                json!({
                    "type": "Feature",
                    "geometry": {"type": "LineString", "coordinates": coords},
                    "properties": {"mmsi": vessel},
                })
            })
        });

    let points = incidents.iter().filter_map(|incident| {
        let fix = locate_incident(tracks, incident)?;
        Some(json!({
            "type": "Feature",
            "geometry": {"type": "Point", "coordinates": [fix.longitude, fix.latitude]},
            "properties": incident_properties(incident),
        }))
    });

    let features: Vec<Value> = lines.chain(points).collect();
    json!({"type": "FeatureCollection", "features": features})
}

fn incident_properties(incident: &Incident) -> Value {
    let mut props = Map::new();
    props.insert("type".into(), json!(incident.kind.as_str()));
    props.insert("mmsi".into(), json!(incident.vessel_id));
    props.insert("ts".into(), json!(iso_utc(&incident.ts_curr)));
    if let Ok(Value::Object(details)) = serde_json::to_value(incident.details) {
        props.extend(details);
    }
    Value::Object(props)
}

/// Write the feature collection as indented JSON, creating the parent directory if needed.
pub fn write_geojson(
    path: &Utf8Path,
    tracks: &TrackSet,
    incidents: &[Incident],
) -> Result<(), AisGuardError> {
    ensure_parent_dir(path)?;
    let collection = to_feature_collection(tracks, incidents);
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, &collection)?;
    writer.flush()?;
    debug!(%path, "geojson written");
    Ok(())
}
