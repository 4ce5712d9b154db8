//! # CSV reader for AIS position tables
//!
//! Reads the tabular AIS input (one position report per row) into [`AisRecord`]s.
//!
//! ## Expected schema
//! -----------------
//! Required columns (short alias in parentheses):
//! - `vessel_id` (`mmsi`): integer MMSI,
//! - `latitude` (`lat`): degrees,
//! - `longitude` (`lon`): degrees,
//! - `timestamp` (`ts`): ISO-8601 text, UTC-coercible.
//!
//! Optional enrichment columns: `sog`, `cog`, `heading`, `nav_status`, `rot`, `name`,
//! `callsign`, `ship_type`, `dim_a`, `dim_b`, `dim_c`, `dim_d`. Unknown columns are ignored.
//!
//! The header is checked **before** any row is read: a missing required column is reported
//! once, as [`AisGuardError::Schema`] listing every missing name, and no record is produced.
//! Leading/trailing whitespace is trimmed from headers and fields.
use std::io;

use camino::Utf8Path;
use csv::{ReaderBuilder, StringRecord, Trim};

use crate::{aisguard_errors::AisGuardError, position_fix::AisRecord};

/// Required columns with their accepted alias.
pub const REQUIRED_COLUMNS: [(&str, &str); 4] = [
    ("vessel_id", "mmsi"),
    ("latitude", "lat"),
    ("longitude", "lon"),
    ("timestamp", "ts"),
];

/// Names of the required columns absent from a header, sorted.
pub(crate) fn missing_columns(headers: &StringRecord) -> Vec<String> {
    let mut missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|(name, alias)| !headers.iter().any(|h| h == *name || h == *alias))
        .map(|(name, _)| name.to_string())
        .collect();
    missing.sort();
    missing
}

/// Read every record of a CSV stream.
///
/// Arguments
/// -----------------
/// * `reader`: any byte source holding a CSV table with a header row.
///
/// Return
/// ----------
/// * `Ok(Vec<AisRecord>)` in file order.
/// * `Err(AisGuardError::Schema)` when required columns are missing.
/// * `Err(AisGuardError::Csv)` on malformed CSV (ragged rows, invalid UTF-8, ...).
pub fn read_records<R: io::Read>(reader: R) -> Result<Vec<AisRecord>, AisGuardError> {
    let mut rdr = ReaderBuilder::new().trim(Trim::All).from_reader(reader);

    let missing = missing_columns(rdr.headers()?);
    if !missing.is_empty() {
        return Err(AisGuardError::Schema { missing });
    }

    rdr.deserialize::<AisRecord>()
        .map(|rec| rec.map_err(AisGuardError::from))
        .collect()
}

/// Read every record of a CSV file.
///
/// See [`read_records`] for the schema and error policy.
pub fn read_csv_file(path: &Utf8Path) -> Result<Vec<AisRecord>, AisGuardError> {
    let file = std::fs::File::open(path)?;
    read_records(io::BufReader::new(file))
}
