//! KML 2.2 export.
//!
//! The document carries two line styles (colors are `aabbggrr`):
//!
//! | id         | color      | width |
//! |------------|------------|-------|
//! | `track`    | `ff00ffff` | 2     |
//! | `incident` | `ff0000ff` | 3     |
//!
//! followed by one `Placemark` per vessel track (`LineString`, `lon,lat,0` tuples) and one
//! `Placemark` per locatable incident (`Point`, named `"{kind} ({mmsi})"`, details as
//! description). The XML is produced by the `quick-xml` serde serializer.
use std::fs;

use camino::Utf8Path;
use itertools::Itertools;
use quick_xml::se::Serializer;
use serde::Serialize;
use tracing::debug;

use super::{ensure_parent_dir, locate_incident};
use crate::{
    aisguard_errors::AisGuardError, detection::incident::Incident, position_fix::PositionFix,
    tracks::track_stats::TrackStats, TrackSet,
};

const KML_NAMESPACE: &str = "http://www.opengis.net/kml/2.2";
const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

#[derive(Debug, Serialize)]
#[serde(rename = "kml")]
struct Kml {
    #[serde(rename = "@xmlns")]
    xmlns: &'static str,
    #[serde(rename = "Document")]
    document: Document,
}

#[derive(Debug, Serialize)]
struct Document {
    #[serde(rename = "Style")]
    styles: Vec<Style>,
    #[serde(rename = "Placemark")]
    placemarks: Vec<Placemark>,
}

#[derive(Debug, Serialize)]
struct Style {
    #[serde(rename = "@id")]
    id: &'static str,
    #[serde(rename = "LineStyle")]
    line_style: LineStyle,
}

#[derive(Debug, Serialize)]
struct LineStyle {
    color: &'static str,
    width: u32,
}

#[derive(Debug, Serialize)]
struct Placemark {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(rename = "styleUrl", skip_serializing_if = "Option::is_none")]
    style_url: Option<&'static str>,
    #[serde(rename = "LineString", skip_serializing_if = "Option::is_none")]
    line_string: Option<Geometry>,
    #[serde(rename = "Point", skip_serializing_if = "Option::is_none")]
    point: Option<Geometry>,
}

#[derive(Debug, Serialize)]
struct Geometry {
    coordinates: String,
}

fn coordinate(fix: &PositionFix) -> String {
    format!("{},{},0", fix.longitude, fix.latitude)
}

fn track_placemarks(tracks: &TrackSet) -> impl Iterator<Item = Placemark> + '_ {
    tracks.sorted_vessels().into_iter().filter_map(move |vessel| {
        let track = &tracks[&vessel];
        (track.len() >= 2).then(|| Placemark {
            name: vessel.to_string(),
            description: None,
            style_url: Some("#track"),
            line_string: Some(Geometry {
                coordinates: track.iter().map(coordinate).join(" "),
            }),
            point: None,
        })
    })
}

fn incident_placemarks<'a>(
    tracks: &'a TrackSet,
    incidents: &'a [Incident],
) -> impl Iterator<Item = Placemark> + 'a {
    incidents.iter().filter_map(move |incident| {
        let fix = locate_incident(tracks, incident)?;
        Some(Placemark {
            name: format!("{} ({})", incident.kind, incident.vessel_id),
            description: Some(incident.details.to_string()),
            style_url: None,
            line_string: None,
            point: Some(Geometry {
                coordinates: coordinate(fix),
            }),
        })
    })
}

/// Render the KML document, XML declaration included.
pub fn to_kml_string(tracks: &TrackSet, incidents: &[Incident]) -> Result<String, AisGuardError> {
    let kml = Kml {
        xmlns: KML_NAMESPACE,
        document: Document {
            styles: vec![
                Style {
                    id: "track",
                    line_style: LineStyle {
                        color: "ff00ffff",
                        width: 2,
                    },
                },
                Style {
                    id: "incident",
                    line_style: LineStyle {
                        color: "ff0000ff",
                        width: 3,
                    },
                },
            ],
            placemarks: track_placemarks(tracks)
                .chain(incident_placemarks(tracks, incidents))
                .collect(),
        },
    };

    let mut body = String::new();
    let mut serializer = Serializer::new(&mut body);
    serializer.indent(' ', 2);
    kml.serialize(serializer)
        .map_err(|e| AisGuardError::Xml(e.to_string()))?;

    Ok(format!("{XML_DECLARATION}\n{body}\n"))
}

/// Write the KML document, creating the parent directory if needed.
pub fn write_kml(
    path: &Utf8Path,
    tracks: &TrackSet,
    incidents: &[Incident],
) -> Result<(), AisGuardError> {
    ensure_parent_dir(path)?;
    fs::write(path, to_kml_string(tracks, incidents)?)?;
    debug!(%path, "kml written");
    Ok(())
}
