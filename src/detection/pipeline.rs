//! # Detection pipeline
//!
//! Entry point of the engine: [`TrackScan::detect_anomalies`] runs the full flow on a
//! normalized [`TrackSet`].
//!
//! 1. Rule-based scan of every vessel (parallel fork, deterministic join ordered by vessel).
//! 2. When `use_statistical_scoring` is set, the segment features of all vessels are pooled
//!    and handed to the [`StatisticalScorer`]. This stage waits for every scan to finish.
//! 3. Both incident streams are merged into a [`Report`].
//!
//! The run is read-only over the tracks: calling it twice with the same parameters gives two
//! identical reports.
use tracing::info;

use super::{
    outlier::StatisticalScorer,
    report::Report,
    scanner::{scan_tracks, VesselScan},
    DetectionParams,
};
use crate::TrackSet;

pub trait TrackScan {
    /// Run the detection pipeline with the built-in scorer.
    ///
    /// Arguments
    /// -----------------
    /// * `input`: source reference echoed in the report (file name, feed id, ...).
    /// * `params`: thresholds and scoring options.
    ///
    /// Return
    /// ----------
    /// * the immutable [`Report`] of the run.
    fn detect_anomalies(&self, input: &str, params: &DetectionParams) -> Report;

    /// Same as [`TrackScan::detect_anomalies`] with an explicit statistical stage.
    fn detect_anomalies_with(
        &self,
        input: &str,
        params: &DetectionParams,
        scorer: &StatisticalScorer,
    ) -> Report;
}

impl TrackScan for TrackSet {
    fn detect_anomalies(&self, input: &str, params: &DetectionParams) -> Report {
        let scorer = if params.use_statistical_scoring {
            StatisticalScorer::probe(params)
        } else {
            StatisticalScorer::unavailable()
        };
        self.detect_anomalies_with(input, params, &scorer)
    }

    fn detect_anomalies_with(
        &self,
        input: &str,
        params: &DetectionParams,
        scorer: &StatisticalScorer,
    ) -> Report {
        let collect = params.use_statistical_scoring;
        let scans = scan_tracks(self, params, collect);

        let (rule_incidents, segments) = scans.into_iter().fold(
            (Vec::new(), Vec::new()),
            |(mut incidents, mut segments), VesselScan { incidents: i, segments: s, .. }| {
                incidents.extend(i);
                segments.extend(s);
                (incidents, segments)
            },
        );

        let statistical_incidents = if collect {
            scorer.score_segments(&segments, params)
        } else {
            Vec::new()
        };

        let report = Report::aggregate(input, self, rule_incidents, statistical_incidents);
        info!(
            input,
            fixes = report.summary.total_points,
            vessels = report.summary.vessel_count,
            incidents = report.incidents.len(),
            "anomaly detection done"
        );
        report
    }
}

#[cfg(test)]
mod pipeline_test {
    use super::*;
    use crate::{
        detection::incident::IncidentKind, position_fix::PositionFix,
        tracks::track_file::TrackFile,
    };
    use chrono::{Duration, TimeZone, Utc};

    fn tracks() -> TrackSet {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let fixes = (0..4)
            .map(|i| PositionFix::new(2, 0.1 * i as f64, 0.0, t0 + Duration::seconds(60 * i)))
            .chain(std::iter::once(PositionFix::new(1, 0.0, 0.0, t0)))
            .collect();
        TrackSet::new_from_fixes(fixes)
    }

    #[test]
    fn test_rules_only() {
        let set = tracks();
        let report = set.detect_anomalies("mem", &DetectionParams::default());
        // ~11.1 km per minute: speed_excess on each of the three segments
        assert_eq!(report.count(IncidentKind::SpeedExcess), 3);
        assert_eq!(report.count(IncidentKind::StatisticalOutlier), 0);
        assert_eq!(report.summary.total_points, 5);
        assert_eq!(report.summary.vessel_count, 2);
        assert!(report.incidents.windows(2).all(|w| w[0].ts_curr < w[1].ts_curr));
    }

    #[test]
    fn test_sample_feed() {
        use crate::unit_test_global::SAMPLE_TRACKS;

        let report =
            SAMPLE_TRACKS.detect_anomalies("sample_tracks.csv", &DetectionParams::default());
        assert_eq!(report.summary.total_points, 10);
        assert_eq!(report.summary.vessel_count, 3);

        let kinds: Vec<(i64, IncidentKind)> =
            report.incidents.iter().map(|i| (i.vessel_id, i.kind)).collect();
        assert_eq!(
            kinds,
            vec![
                (222222222, IncidentKind::Teleport),
                (222222222, IncidentKind::SpeedExcess),
            ]
        );
        assert_eq!(report.incidents[0].details.distance_km, Some(55.1));
        assert_eq!(report.incidents[1].details.speed_knots, Some(1785.01));
        assert_eq!(report.incidents[1].details.elapsed_seconds, Some(60.0));
    }

    #[test]
    fn test_idempotent() {
        let set = tracks();
        let params = DetectionParams::builder()
            .use_statistical_scoring(true)
            .build()
            .unwrap();
        assert_eq!(
            set.detect_anomalies("mem", &params),
            set.detect_anomalies("mem", &params)
        );
    }

    #[test]
    fn test_unavailable_scorer_keeps_rule_incidents() {
        let set = tracks();
        let params = DetectionParams::builder()
            .use_statistical_scoring(true)
            .build()
            .unwrap();
        let with_none =
            set.detect_anomalies_with("mem", &params, &StatisticalScorer::unavailable());
        let rules_only = set.detect_anomalies("mem", &DetectionParams::default());
        assert_eq!(with_none.incidents, rules_only.incidents);
    }
}
