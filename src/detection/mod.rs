//! # Anomaly detection
//!
//! This module hosts the detection engine and its configuration, [`DetectionParams`].
//!
//! ## Pipeline overview
//!
//! 1. **Rule-based scan** ([`scanner`]) – every track is walked pairwise. Each adjacent pair
//!    `(prev, curr)` is checked for temporal inversion (`bad_order`), excessive distance
//!    (`teleport`, threshold `max_jump_km`) and excessive implied speed (`speed_excess`,
//!    threshold `max_speed_knots`). Tracks are independent and are scanned in parallel
//!    when the `parallel` feature is enabled.
//!
//! 2. **Join** – per-vessel results are ordered by vessel identifier, whatever the order in
//!    which workers finished.
//!
//! 3. **Statistical scoring** ([`outlier`], optional) – the segment features of **all**
//!    vessels are pooled and scored by one isolation forest, with the expected outlier
//!    fraction `contamination` and a fixed `seed`.
//!
//! 4. **Aggregation** ([`report`]) – rule-based then statistical incidents are assembled into
//!    an immutable [`Report`](crate::detection::report::Report) whose summary is recomputed
//!    from the incident list.
//!
//! ## Example
//!
//! ```rust,no_run
//! use aisguard::detection::DetectionParams;
//!
//! let params = DetectionParams::builder()
//!     .max_speed_knots(40.0)
//!     .max_jump_km(15.0)
//!     .use_statistical_scoring(true)
//!     .contamination(0.01)
//!     .build()
//!     .unwrap();
//! ```
//!
//! ## See also
//!
//! * [`pipeline::TrackScan::detect_anomalies`] – end-to-end entry point.
//! * [`incident::Incident`] – the unit of output.
use std::cmp::Ordering::{Equal, Greater};
use std::fmt;

use serde::Deserialize;
use tracing::warn;

use crate::aisguard_errors::AisGuardError;
use crate::constants::{
    Kilometer, Knot, CONTAMINATION_MAX, CONTAMINATION_MIN, DEFAULT_CONTAMINATION,
    DEFAULT_MAX_JUMP_KM, DEFAULT_MAX_SPEED_KNOTS, DEFAULT_SEED,
};

pub mod display;
pub mod incident;
pub mod outlier;
pub mod pipeline;
pub mod report;
pub mod scanner;

/// Configuration of the detection engine.
///
/// Fields
/// -----------------
/// **Rule thresholds**
/// * `max_speed_knots` – implied speed above which a segment is a `speed_excess`.
/// * `max_jump_km` – great-circle distance above which a segment is a `teleport`.
///
/// **Statistical scoring**
/// * `use_statistical_scoring` – enable the pooled isolation-forest stage.
/// * `contamination` – expected fraction of outlier segments, clamped to `[0.001, 0.5]`.
/// * `seed` – seed of the forest's random generator; fixed seed → identical reports.
/// * `n_trees` – number of isolation trees.
/// * `max_samples` – sub-sample size per tree (capped by the number of segments).
///
/// Defaults
/// -----------------
/// * `max_speed_knots`: 45.0
/// * `max_jump_km`: 20.0
/// * `use_statistical_scoring`: false
/// * `contamination`: 0.02
/// * `seed`: 42
/// * `n_trees`: 100
/// * `max_samples`: 256
///
/// Loading from JSON
/// -----------------
/// Missing keys take their default, then the same validation as [`DetectionParamsBuilder::build`]
/// applies:
///
/// ```rust
/// use aisguard::detection::DetectionParams;
/// let p = DetectionParams::from_json_str(r#"{"max_speed_knots": 30.0}"#).unwrap();
/// assert_eq!(p.max_jump_km, 20.0);
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DetectionParams {
    pub max_speed_knots: Knot,
    pub max_jump_km: Kilometer,
    pub use_statistical_scoring: bool,
    pub contamination: f64,
    pub seed: u64,
    pub n_trees: usize,
    pub max_samples: usize,
}

impl DetectionParams {
    /// Construct a new [`DetectionParams`] with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new [`DetectionParamsBuilder`] initialized with the defaults.
    pub fn builder() -> DetectionParamsBuilder {
        DetectionParamsBuilder::new()
    }

    /// Parse a JSON configuration and validate it.
    ///
    /// Return
    /// ----------
    /// * `Err(AisGuardError::Json)` on malformed JSON or wrongly typed keys.
    /// * `Err(AisGuardError::InvalidDetectionParameter)` when validation fails.
    pub fn from_json_str(json: &str) -> Result<Self, AisGuardError> {
        let params: DetectionParams = serde_json::from_str(json)?;
        DetectionParamsBuilder { params }.build()
    }
}

impl Default for DetectionParams {
    fn default() -> Self {
        DetectionParams {
            max_speed_knots: DEFAULT_MAX_SPEED_KNOTS,
            max_jump_km: DEFAULT_MAX_JUMP_KM,
            use_statistical_scoring: false,
            contamination: DEFAULT_CONTAMINATION,
            seed: DEFAULT_SEED,
            n_trees: 100,
            max_samples: 256,
        }
    }
}

/// Builder for [`DetectionParams`], with validation.
#[derive(Debug, Clone)]
pub struct DetectionParamsBuilder {
    params: DetectionParams,
}

impl Default for DetectionParamsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DetectionParamsBuilder {
    /// Create a new builder initialized with default values.
    pub fn new() -> Self {
        Self {
            params: DetectionParams::default(),
        }
    }

    pub fn max_speed_knots(mut self, v: Knot) -> Self {
        self.params.max_speed_knots = v;
        self
    }
    pub fn max_jump_km(mut self, v: Kilometer) -> Self {
        self.params.max_jump_km = v;
        self
    }
    pub fn use_statistical_scoring(mut self, v: bool) -> Self {
        self.params.use_statistical_scoring = v;
        self
    }
    pub fn contamination(mut self, v: f64) -> Self {
        self.params.contamination = v;
        self
    }
    pub fn seed(mut self, v: u64) -> Self {
        self.params.seed = v;
        self
    }
    pub fn n_trees(mut self, v: usize) -> Self {
        self.params.n_trees = v;
        self
    }
    pub fn max_samples(mut self, v: usize) -> Self {
        self.params.max_samples = v;
        self
    }

    /// Return true iff x >= 0.0, finite and comparable (i.e., not NaN).
    #[inline]
    fn finite_ge0(x: f64) -> bool {
        x.is_finite() && matches!(x.partial_cmp(&0.0), Some(Greater) | Some(Equal))
    }

    /// Finalize the builder.
    ///
    /// Validation rules
    /// -----------------
    /// * `max_speed_knots`, `max_jump_km` finite and `>= 0`.
    /// * `contamination` not NaN; it is then **clamped** to `[0.001, 0.5]` (a warning is
    ///   traced when clamping changes the value).
    /// * `n_trees >= 1`, `max_samples >= 2`.
    ///
    /// Returns
    /// -----------------
    /// * `Ok(DetectionParams)` if all values are valid.
    /// * `Err(AisGuardError::InvalidDetectionParameter)` otherwise.
    pub fn build(mut self) -> Result<DetectionParams, AisGuardError> {
        let p = &mut self.params;

        if !Self::finite_ge0(p.max_speed_knots) {
            return Err(AisGuardError::InvalidDetectionParameter(
                "max_speed_knots must be finite and >= 0".into(),
            ));
        }
        if !Self::finite_ge0(p.max_jump_km) {
            return Err(AisGuardError::InvalidDetectionParameter(
                "max_jump_km must be finite and >= 0".into(),
            ));
        }
        if p.contamination.is_nan() {
            return Err(AisGuardError::InvalidDetectionParameter(
                "contamination must be a number".into(),
            ));
        }
        if p.n_trees == 0 {
            return Err(AisGuardError::InvalidDetectionParameter(
                "n_trees must be >= 1".into(),
            ));
        }
        if p.max_samples < 2 {
            return Err(AisGuardError::InvalidDetectionParameter(
                "max_samples must be >= 2".into(),
            ));
        }

        let clamped = p.contamination.clamp(CONTAMINATION_MIN, CONTAMINATION_MAX);
        if clamped != p.contamination {
            warn!(
                requested = p.contamination,
                used = clamped,
                "contamination clamped to [{CONTAMINATION_MIN}, {CONTAMINATION_MAX}]"
            );
            p.contamination = clamped;
        }

        Ok(self.params)
    }
}

impl fmt::Display for DetectionParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            const PARAM_COL: usize = 36;
            writeln!(f, "Detection Parameters")?;
            writeln!(f, "--------------------")?;

            macro_rules! line {
                ($fmt:expr, $val:expr, $comment:expr) => {{
                    let s = format!($fmt, $val);
                    let pad = if s.len() < PARAM_COL {
                        " ".repeat(PARAM_COL - s.len())
                    } else {
                        " ".to_string()
                    };
                    writeln!(f, "  {}{}# {}", s, pad, $comment)
                }};
            }

            writeln!(f, "[Rules]")?;
            line!(
                "max_speed_knots  = {:.2} kn",
                self.max_speed_knots,
                "Speed excess threshold"
            )?;
            line!(
                "max_jump_km      = {:.2} km",
                self.max_jump_km,
                "Teleport threshold"
            )?;

            writeln!(f, "\n[Statistical scoring]")?;
            line!(
                "enabled          = {}",
                self.use_statistical_scoring,
                "Pooled isolation forest"
            )?;
            line!(
                "contamination    = {:.3}",
                self.contamination,
                "Expected outlier fraction"
            )?;
            line!("seed             = {}", self.seed, "Forest RNG seed")?;
            line!("n_trees          = {}", self.n_trees, "Isolation trees")?;
            line!(
                "max_samples      = {}",
                self.max_samples,
                "Sub-sample size per tree"
            )?;
            Ok(())
        } else {
            write!(
                f,
                "DetectionParams(max_speed={:.1}kn, max_jump={:.1}km, statistical={}, contamination={:.3}, seed={})",
                self.max_speed_knots,
                self.max_jump_km,
                self.use_statistical_scoring,
                self.contamination,
                self.seed,
            )
        }
    }
}
