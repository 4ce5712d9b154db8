//! # Incident report
//!
//! Final product of a detection run: the source reference, a [`Summary`] tally and the
//! ordered incident list. Rule-based incidents come first in scan order (vessel ascending,
//! chronological within a vessel), followed by the statistical ones in pool order.
//!
//! The summary is always recomputed from the final incident list, so `summary.flags` and
//! `incidents` cannot disagree.
use std::{fs::File, io::BufWriter, io::Write};

use camino::Utf8Path;
use serde::Serialize;

use super::incident::{Incident, IncidentKind};
use crate::{
    aisguard_errors::AisGuardError, constants::Mmsi, tracks::track_stats::TrackStats, TrackSet,
};

/// Number of incidents of each kind; zero-valued kinds are kept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IncidentTally {
    pub speed_excess: usize,
    pub teleport: usize,
    pub bad_order: usize,
    pub statistical_outlier: usize,
}

impl IncidentTally {
    pub fn from_incidents<'a, I>(incidents: I) -> Self
    where
        I: IntoIterator<Item = &'a Incident>,
    {
        let mut tally = IncidentTally::default();
        for incident in incidents {
            *tally.slot_mut(incident.kind) += 1;
        }
        tally
    }

    pub fn get(&self, kind: IncidentKind) -> usize {
        match kind {
            IncidentKind::SpeedExcess => self.speed_excess,
            IncidentKind::Teleport => self.teleport,
            IncidentKind::BadOrder => self.bad_order,
            IncidentKind::StatisticalOutlier => self.statistical_outlier,
        }
    }

    pub fn total(&self) -> usize {
        IncidentKind::ALL.iter().map(|k| self.get(*k)).sum()
    }

    fn slot_mut(&mut self, kind: IncidentKind) -> &mut usize {
        match kind {
            IncidentKind::SpeedExcess => &mut self.speed_excess,
            IncidentKind::Teleport => &mut self.teleport,
            IncidentKind::BadOrder => &mut self.bad_order,
            IncidentKind::StatisticalOutlier => &mut self.statistical_outlier,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Fixes kept after normalization.
    pub total_points: usize,
    pub vessel_count: usize,
    pub flags: IncidentTally,
}

/// Immutable result of a detection run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub input: String,
    pub summary: Summary,
    pub incidents: Vec<Incident>,
}

impl Report {
    /// Merge both incident streams and tally them.
    ///
    /// Arguments
    /// -----------------
    /// * `input`: reference of the analyzed source, echoed as-is.
    /// * `tracks`: the normalized set the incidents were computed on.
    /// * `rule_incidents`: scanner output, already ordered.
    /// * `statistical_incidents`: scorer output, in pool order.
    pub fn aggregate(
        input: impl Into<String>,
        tracks: &TrackSet,
        rule_incidents: Vec<Incident>,
        statistical_incidents: Vec<Incident>,
    ) -> Self {
        let mut incidents = rule_incidents;
        incidents.extend(statistical_incidents);

        let summary = Summary {
            total_points: tracks.total_fixes(),
            vessel_count: tracks.number_of_tracks(),
            flags: IncidentTally::from_incidents(&incidents),
        };

        Report {
            input: input.into(),
            summary,
            incidents,
        }
    }

    /// Number of incidents of `kind`.
    pub fn count(&self, kind: IncidentKind) -> usize {
        self.summary.flags.get(kind)
    }

    /// Incidents of a single vessel, in report order.
    pub fn incidents_of(&self, vessel_id: Mmsi) -> impl Iterator<Item = &Incident> {
        self.incidents
            .iter()
            .filter(move |inc| inc.vessel_id == vessel_id)
    }

    pub fn to_json_pretty(&self) -> Result<String, AisGuardError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the report as indented JSON, replacing any existing file.
    pub fn write_json(&self, path: &Utf8Path) -> Result<(), AisGuardError> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod report_test {
    use super::*;
    use crate::{
        detection::incident::IncidentDetails, position_fix::PositionFix,
        tracks::track_file::TrackFile,
    };
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn t(s: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::seconds(s)
    }

    fn sample() -> Report {
        let tracks = TrackSet::new_from_fixes(vec![
            PositionFix::new(123456789, 0.0, 0.0, t(0)),
            PositionFix::new(123456789, 0.045, 0.0, t(60)),
            PositionFix::new(7, 1.0, 1.0, t(0)),
        ]);
        let rules = vec![Incident::on_segment(
            IncidentKind::SpeedExcess,
            123456789,
            t(0),
            t(60),
            IncidentDetails::motion(161.99, 5.0, 60.0),
        )];
        let stats = vec![Incident::on_segment(
            IncidentKind::StatisticalOutlier,
            123456789,
            t(0),
            t(60),
            IncidentDetails::motion(161.99, 5.0, 60.0),
        )];
        Report::aggregate("tracks.csv", &tracks, rules, stats)
    }

    #[test]
    fn test_aggregate_order_and_summary() {
        let report = sample();
        assert_eq!(report.summary.total_points, 3);
        assert_eq!(report.summary.vessel_count, 2);
        assert_eq!(report.incidents[0].kind, IncidentKind::SpeedExcess);
        assert_eq!(report.incidents[1].kind, IncidentKind::StatisticalOutlier);
        for kind in IncidentKind::ALL {
            let n = report.incidents.iter().filter(|i| i.kind == kind).count();
            assert_eq!(report.count(kind), n);
        }
        assert_eq!(report.summary.flags.total(), 2);
        assert_eq!(report.incidents_of(7).count(), 0);
    }

    #[test]
    fn test_json_shape() {
        let json: serde_json::Value =
            serde_json::from_str(&sample().to_json_pretty().unwrap()).unwrap();
        assert_eq!(json["input"], "tracks.csv");
        assert_eq!(
            json["summary"],
            serde_json::json!({
                "total_points": 3,
                "vessel_count": 2,
                "flags": {"speed_excess": 1, "teleport": 0, "bad_order": 0, "statistical_outlier": 1}
            })
        );
        assert_eq!(json["incidents"][0]["details"]["speed_knots"], 161.99);
    }

    #[test]
    fn test_write_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = camino::Utf8PathBuf::from_path_buf(dir.path().join("report.json")).unwrap();
        let report = sample();
        report.write_json(&path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let back: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(back["incidents"].as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn test_empty_report() {
        let report = Report::aggregate("empty", &TrackSet::default(), vec![], vec![]);
        assert_eq!(report.summary, Summary::default());
        assert!(report.incidents.is_empty());
    }
}
