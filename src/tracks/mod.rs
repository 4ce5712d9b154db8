//! # Tracks: ingestion and normalization
//!
//! Facilities to **ingest** AIS position reports and **normalize** them into per-vessel,
//! time-ordered tracks. The central type is [`TrackSet`], a fast hash map that buckets
//! [`PositionFix`]es per [`Mmsi`].
//!
//! Modules
//! -----------------
//! * [`csv_reader`](crate::tracks::csv_reader) – Schema-checked CSV ingestion into [`AisRecord`]s.
//! * [`track_file`](crate::tracks::track_file) – **Public** trait exposing `new_from_*` and `add_from_*`
//!   helpers to construct/extend a [`TrackSet`] from CSV files, raw records or typed fixes.
//! * [`track_stats`](crate::tracks::track_stats) – Set-level metrics (fix counts, percentiles,
//!   deterministic vessel order).
//!
//! Normalization policy
//! -----------------
//! * Required fields: `vessel_id`, `latitude`, `longitude`, `timestamp`. A CSV header
//!   without one of them fails with [`AisGuardError::Schema`].
//! * Coordinates are **not** range checked: malformed geodesy is itself a finding.
//! * Rows with an unparseable timestamp are **silently dropped**: not counted, not reported.
//! * Each touched track is sorted by timestamp with a **stable** sort, so fixes sharing a
//!   timestamp keep their input order.
//! * No deduplication and no smoothing is performed.
use std::collections::HashSet;

use ahash::RandomState;
use tracing::debug;

use crate::{
    aisguard_errors::AisGuardError,
    constants::{Mmsi, TrackSet},
    position_fix::{AisRecord, PositionFix},
};

pub mod csv_reader;
pub mod track_file;
pub mod track_stats;

/// Append typed fixes to a set and restore the per-track time ordering.
///
/// Only the tracks that received new fixes are re-sorted.
pub(crate) fn insert_fixes<I>(tracks: &mut TrackSet, fixes: I)
where
    I: IntoIterator<Item = PositionFix>,
{
    let mut touched: HashSet<Mmsi, RandomState> = HashSet::default();
    for fix in fixes {
        touched.insert(fix.vessel_id);
        tracks.entry(fix.vessel_id).or_default().push(fix);
    }

    for vessel in touched {
        if let Some(track) = tracks.get_mut(&vessel) {
            // `sort_by_key` is stable: equal timestamps keep insertion order.
            track.sort_by_key(|fix| fix.timestamp);
        }
    }
}

/// Coerce raw records into fixes and append them to a set.
///
/// Return
/// ----------
/// * the number of fixes kept, or the first [`AisGuardError::InvalidField`] encountered
///   (nothing is inserted in that case).
pub(crate) fn insert_records<'a, I>(
    tracks: &mut TrackSet,
    records: I,
) -> Result<usize, AisGuardError>
where
    I: IntoIterator<Item = &'a AisRecord>,
{
    let mut fixes = Vec::new();
    let mut dropped = 0usize;
    for (idx, record) in records.into_iter().enumerate() {
        match record.to_fix(idx)? {
            Some(fix) => fixes.push(fix),
            None => {
                dropped += 1;
                debug!(
                    record = idx,
                    timestamp = %record.timestamp,
                    "dropping row with unparseable timestamp"
                );
            }
        }
    }

    let kept = fixes.len();
    insert_fixes(tracks, fixes);
    debug!(kept, dropped, "records normalized");
    Ok(kept)
}

#[cfg(test)]
mod tracks_test {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    #[test]
    fn test_insert_fixes_groups_and_sorts() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let fixes = vec![
            PositionFix::new(2, 0.0, 0.0, t0 + Duration::seconds(30)),
            PositionFix::new(1, 1.0, 1.0, t0 + Duration::seconds(20)),
            PositionFix::new(2, 0.1, 0.1, t0),
            PositionFix::new(1, 1.1, 1.1, t0 + Duration::seconds(10)),
        ];

        let mut set = TrackSet::default();
        insert_fixes(&mut set, fixes);

        assert_eq!(set.len(), 2);
        let t1 = &set[&1];
        assert_eq!(t1[0].latitude, 1.1);
        assert_eq!(t1[1].latitude, 1.0);
        let t2 = &set[&2];
        assert_eq!(t2[0].timestamp, t0);
        assert_eq!(t2[1].timestamp, t0 + Duration::seconds(30));
    }

    #[test]
    fn test_stable_sort_keeps_ties_in_input_order() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let fixes = vec![
            PositionFix::new(7, 1.0, 0.0, t0 + Duration::seconds(5)),
            PositionFix::new(7, 2.0, 0.0, t0),
            PositionFix::new(7, 3.0, 0.0, t0),
            PositionFix::new(7, 4.0, 0.0, t0),
        ];
        let mut set = TrackSet::default();
        insert_fixes(&mut set, fixes);

        let lats: Vec<f64> = set[&7].iter().map(|f| f.latitude).collect();
        assert_eq!(lats, vec![2.0, 3.0, 4.0, 1.0]);
    }

    #[test]
    fn test_insert_records_drops_bad_timestamps() {
        let records = vec![
            AisRecord::new("5", "0.0", "0.0", "2024-01-01T00:00:00Z"),
            AisRecord::new("5", "0.0", "0.0", "garbage"),
            AisRecord::new("6", "0.0", "0.0", ""),
        ];
        let mut set = TrackSet::default();
        let kept = insert_records(&mut set, &records).unwrap();
        assert_eq!(kept, 1);
        assert_eq!(set.len(), 1);
        assert!(!set.contains_key(&6));
    }

    #[test]
    fn test_insert_records_is_all_or_nothing() {
        let records = vec![
            AisRecord::new("5", "0.0", "0.0", "2024-01-01T00:00:00Z"),
            AisRecord::new("5", "x", "0.0", "2024-01-01T00:00:01Z"),
        ];
        let mut set = TrackSet::default();
        assert!(insert_records(&mut set, &records).is_err());
        assert!(set.is_empty());
    }
}
