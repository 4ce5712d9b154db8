//! Human-readable rendering of a [`Report`].
//!
//! * `format!("{report}")` – one line:
//!   `tracks.csv: 2 fixes, 1 vessels, 1 incidents (speed_excess=1, teleport=0, bad_order=0, statistical_outlier=0)`
//! * `format!("{report:#}")` – the same header line, the per-kind tally and one table row per
//!   incident, rendered with [`comfy-table`](https://docs.rs/comfy-table/latest/comfy_table/).
use std::fmt;

use comfy_table::{presets::UTF8_FULL, Cell, CellAlignment, ContentArrangement, Row, Table};
use itertools::Itertools;

use super::{incident::IncidentKind, report::Report};
use crate::time::iso_utc;

impl Report {
    fn tally_line(&self) -> String {
        IncidentKind::ALL
            .iter()
            .map(|kind| format!("{kind}={}", self.count(*kind)))
            .join(", ")
    }

    fn render_incident_table(&self) -> String {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);

        table.set_header(vec![
            Cell::new("#"),
            Cell::new("Type"),
            Cell::new("MMSI"),
            Cell::new("Previous fix (UTC)"),
            Cell::new("Current fix (UTC)"),
            Cell::new("Speed [kn]"),
            Cell::new("Distance [km]"),
            Cell::new("Elapsed [s]"),
        ]);

        let opt = |v: Option<f64>| v.map(|x| format!("{x:.2}")).unwrap_or_default();

        for (i, inc) in self.incidents.iter().enumerate() {
            table.add_row(Row::from(vec![
                Cell::new(i).set_alignment(CellAlignment::Right),
                Cell::new(inc.kind),
                Cell::new(inc.vessel_id).set_alignment(CellAlignment::Right),
                Cell::new(inc.ts_prev.as_ref().map(iso_utc).unwrap_or_default()),
                Cell::new(iso_utc(&inc.ts_curr)),
                Cell::new(opt(inc.details.speed_knots)).set_alignment(CellAlignment::Right),
                Cell::new(opt(inc.details.distance_km)).set_alignment(CellAlignment::Right),
                Cell::new(opt(inc.details.elapsed_seconds)).set_alignment(CellAlignment::Right),
            ]));
        }

        table.to_string()
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = &self.summary;
        write!(
            f,
            "{}: {} fixes, {} vessels, {} incidents ({})",
            self.input,
            s.total_points,
            s.vessel_count,
            self.incidents.len(),
            self.tally_line()
        )?;

        if f.alternate() {
            writeln!(f)?;
            if self.incidents.is_empty() {
                write!(f, "no incident")?;
            } else {
                write!(f, "{}", self.render_incident_table())?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod display_test {
    use super::*;
    use crate::{
        detection::incident::{Incident, IncidentDetails},
        position_fix::PositionFix,
        tracks::track_file::TrackFile,
        TrackSet,
    };
    use chrono::{TimeZone, Utc};

    fn report() -> Report {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let t1 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 1, 0).unwrap();
        let tracks = TrackSet::new_from_fixes(vec![
            PositionFix::new(123456789, 0.0, 0.0, t0),
            PositionFix::new(123456789, 0.045, 0.0, t1),
        ]);
        let inc = Incident::on_segment(
            IncidentKind::SpeedExcess,
            123456789,
            t0,
            t1,
            IncidentDetails::motion(161.99, 5.0, 60.0),
        );
        Report::aggregate("tracks.csv", &tracks, vec![inc], vec![])
    }

    #[test]
    fn test_compact() {
        assert_eq!(
            report().to_string(),
            "tracks.csv: 2 fixes, 1 vessels, 1 incidents \
             (speed_excess=1, teleport=0, bad_order=0, statistical_outlier=0)"
        );
    }

    #[test]
    fn test_table() {
        let out = format!("{:#}", report());
        assert!(out.starts_with("tracks.csv: 2 fixes"));
        assert!(out.contains("speed_excess"));
        assert!(out.contains("161.99"));
        assert!(out.contains("2024-01-01T00:01:00+00:00"));
    }

    #[test]
    fn test_table_without_incident() {
        let empty = Report::aggregate("none", &TrackSet::default(), vec![], vec![]);
        assert!(format!("{empty:#}").ends_with("no incident"));
    }
}
