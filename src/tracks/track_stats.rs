//! Set-level metrics over a [`TrackSet`].
use std::fmt;

use crate::{constants::Mmsi, TrackSet};

/// Summary statistics for per-track fix counts.
///
/// Fields
/// -----------------
/// * `min` – smallest number of fixes in any track.
/// * `p25` – 25th percentile of fix counts.
/// * `median` – 50th percentile.
/// * `p95` – 95th percentile.
/// * `max` – largest number of fixes in any track.
///
/// Percentiles use the *nearest-rank* method: the index is `round(q × (N-1))` for quantile
/// `q ∈ [0,1]`, clamped to the valid range.
///
/// Display
/// -----------------
/// * `format!("{}", stats)` – compact single line, e.g. `min=1, p25=4, median=8, p95=15, max=20`.
/// * `format!("{:#}", stats)` – multi-line block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixCountStats {
    pub min: usize,
    pub p25: usize,
    pub median: usize,
    pub p95: usize,
    pub max: usize,
}

impl fmt::Display for FixCountStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            writeln!(f, "Fix count per track - summary")?;
            writeln!(f, "-----------------------------")?;
            writeln!(f, "min    : {}", self.min)?;
            writeln!(f, "p25    : {}", self.p25)?;
            writeln!(f, "median : {}", self.median)?;
            writeln!(f, "p95    : {}", self.p95)?;
            write!(f, "max    : {}", self.max)
        } else {
            write!(
                f,
                "min={}, p25={}, median={}, p95={}, max={}",
                self.min, self.p25, self.median, self.p95, self.max
            )
        }
    }
}

pub trait TrackStats {
    /// Total number of fixes across all tracks (the report's `total_points`).
    fn total_fixes(&self) -> usize;

    /// Number of distinct vessels (the report's `vessel_count`).
    fn number_of_tracks(&self) -> usize;

    /// Distribution of fix counts per track, `None` for an empty set.
    fn fix_count_stats(&self) -> Option<FixCountStats>;

    /// Vessel identifiers in ascending order.
    ///
    /// The underlying map iterates in hash order; everything observable (report ordering,
    /// exporters) walks vessels through this method instead.
    fn sorted_vessels(&self) -> Vec<Mmsi>;

    /// `true` when every track is non-decreasing in time.
    fn is_time_ordered(&self) -> bool;
}

impl TrackStats for TrackSet {
    #[inline]
    fn total_fixes(&self) -> usize {
        self.values().map(|track| track.len()).sum()
    }

    #[inline]
    fn number_of_tracks(&self) -> usize {
        self.len()
    }

    fn fix_count_stats(&self) -> Option<FixCountStats> {
        let mut counts: Vec<usize> = self.values().map(|track| track.len()).collect();
        if counts.is_empty() {
            return None;
        }
        counts.sort_unstable();

        #[inline]
        fn q_index(n: usize, q: f64) -> usize {
            let pos = q * (n as f64 - 1.0);
            let idx = pos.round() as isize;
            idx.clamp(0, (n as isize) - 1) as usize
        }

        let n = counts.len();
        Some(FixCountStats {
            min: counts[0],
            p25: counts[q_index(n, 0.25)],
            median: counts[q_index(n, 0.50)],
            p95: counts[q_index(n, 0.95)],
            max: counts[n - 1],
        })
    }

    fn sorted_vessels(&self) -> Vec<Mmsi> {
        let mut vessels: Vec<Mmsi> = self.keys().copied().collect();
        vessels.sort_unstable();
        vessels
    }

    fn is_time_ordered(&self) -> bool {
        self.values()
            .all(|track| track.windows(2).all(|w| w[0].timestamp <= w[1].timestamp))
    }
}
