//! # Track ingestion
//!
//! High-level utilities to **build and extend** a [`TrackSet`] from CSV files, in-memory
//! readers, raw [`AisRecord`]s (as handed over by a decoding collaborator) or already typed
//! [`PositionFix`]es.
//!
//! ## Overview
//! -----------------
//! This module exposes the [`TrackFile`] trait implemented for [`TrackSet`]:
//! - Constructors that **create** a new set from a given source (`new_from_*`),
//! - Appenders that **extend** an existing set (`add_from_*`).
//!
//! Every path ends in the same normalization step: records are coerced, rows with an
//! unparseable timestamp are dropped, fixes are grouped per vessel and each touched track
//! is stably re-sorted by timestamp.
//!
//! ## Error semantics
//! -----------------
//! - [`AisGuardError::Schema`] – CSV header without a required column.
//! - [`AisGuardError::InvalidField`] – identifier or coordinate that is not numeric.
//!   Loading is all-or-nothing: on error, the set is left untouched.
//! - [`AisGuardError::Csv`] / [`AisGuardError::Io`] – reader failures.
//!
//! ## Duplicates
//! -----------------
//! **No deduplication** is performed by any `add_*` method. Re-ingesting the same file twice
//! doubles its fixes.
//!
//! ## Example
//! -----------------
//! ```no_run
//! use camino::Utf8Path;
//! use aisguard::TrackSet;
//! use aisguard::tracks::track_file::TrackFile;
//!
//! # fn demo() -> Result<(), aisguard::aisguard_errors::AisGuardError> {
//! let mut tracks = TrackSet::new_from_csv(Utf8Path::new("tracks_day1.csv"))?;
//! tracks.add_from_csv(Utf8Path::new("tracks_day2.csv"))?;
//! # Ok(()) }
//! ```
use std::io;

use camino::Utf8Path;
use tracing::info;

use super::{
    csv_reader::{read_csv_file, read_records},
    insert_fixes, insert_records,
};
use crate::{
    aisguard_errors::AisGuardError,
    position_fix::{AisRecord, PositionFix},
    TrackSet,
};

/// Construction and extension of a [`TrackSet`] from the supported sources.
///
/// Note
/// ----
/// * No check is done for duplicated fixes in any add method.
pub trait TrackFile: Sized {
    /// Create a set from a CSV file.
    ///
    /// Arguments
    /// ---------
    /// * `path`: CSV file with at least the `vessel_id`, `latitude`, `longitude` and
    ///   `timestamp` columns (or their `mmsi`, `lat`, `lon`, `ts` aliases).
    ///
    /// Return
    /// ------
    /// * the normalized set, or the first ingestion error.
    fn new_from_csv(path: &Utf8Path) -> Result<Self, AisGuardError>;

    /// Append the fixes of a CSV file to an existing set.
    fn add_from_csv(&mut self, path: &Utf8Path) -> Result<(), AisGuardError>;

    /// Create a set from any CSV byte stream.
    fn new_from_reader<R: io::Read>(reader: R) -> Result<Self, AisGuardError>;

    /// Create a set from raw records.
    fn new_from_records(records: &[AisRecord]) -> Result<Self, AisGuardError>;

    /// Append raw records to an existing set.
    fn add_from_records(&mut self, records: &[AisRecord]) -> Result<(), AisGuardError>;

    /// Create a set from typed fixes. Infallible: fixes are already valid.
    fn new_from_fixes(fixes: Vec<PositionFix>) -> Self;

    /// Append typed fixes to an existing set.
    fn add_from_fixes(&mut self, fixes: Vec<PositionFix>);
}

impl TrackFile for TrackSet {
    fn new_from_csv(path: &Utf8Path) -> Result<Self, AisGuardError> {
        let mut tracks = TrackSet::default();
        tracks.add_from_csv(path)?;
        Ok(tracks)
    }

    fn add_from_csv(&mut self, path: &Utf8Path) -> Result<(), AisGuardError> {
        let records = read_csv_file(path)?;
        let kept = insert_records(self, &records)?;
        info!(%path, rows = records.len(), fixes = kept, vessels = self.len(), "tracks loaded");
        Ok(())
    }

    fn new_from_reader<R: io::Read>(reader: R) -> Result<Self, AisGuardError> {
        let records = read_records(reader)?;
        Self::new_from_records(&records)
    }

    fn new_from_records(records: &[AisRecord]) -> Result<Self, AisGuardError> {
        let mut tracks = TrackSet::default();
        tracks.add_from_records(records)?;
        Ok(tracks)
    }

    fn add_from_records(&mut self, records: &[AisRecord]) -> Result<(), AisGuardError> {
        insert_records(self, records)?;
        Ok(())
    }

    fn new_from_fixes(fixes: Vec<PositionFix>) -> Self {
        let mut tracks = TrackSet::default();
        tracks.add_from_fixes(fixes);
        tracks
    }

    fn add_from_fixes(&mut self, fixes: Vec<PositionFix>) {
        insert_fixes(self, fixes);
    }
}
