//! # Statistical outlier scoring
//!
//! Optional second detection layer. The feature vectors of every measured segment, across all
//! vessels, are pooled into one unlabeled sample; an unsupervised model is fitted on that pool
//! and scores each segment. Segments scored as outliers become
//! [`IncidentKind::StatisticalOutlier`] incidents echoing their own features.
//!
//! The model is reached through the [`OutlierScorer`] capability trait. [`StatisticalScorer`]
//! wraps an optional implementation: [`StatisticalScorer::probe`] resolves once whether the
//! built-in [`IsolationForest`] is compiled in (feature `isolation-forest`). When no scorer is
//! available, or the pool is empty, the stage yields nothing and only leaves a `debug` trace.
//!
//! Isolation forest
//! -----------------
//! * `n_trees` random trees, each grown on a sub-sample of `psi = min(max_samples, n)` rows
//!   drawn without replacement, with a height limit of `ceil(log2(psi))`.
//! * A node splits on a feature chosen uniformly among the non-constant ones, at a threshold
//!   drawn uniformly in `[min, max)` of that feature.
//! * Anomaly score `s(x) = 2^(-E[h(x)] / c(psi))`, where `h` is the path length (plus the
//!   `c(size)` correction at leaves) and `c(n) = 2 H(n-1) - 2 (n-1) / n`.
//! * The decision threshold is the `(1 - contamination)` quantile of the pooled scores
//!   (linear interpolation); segments scoring strictly above it are outliers.
//!
//! Every random draw comes from a [`StdRng`] seeded with the caller's seed, so a fixed seed
//! gives identical flags on identical input, with or without the `parallel` feature.
use nalgebra::Vector5;
use rand::{rngs::StdRng, seq::index, Rng, SeedableRng};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{debug, warn};

use super::{
    incident::{Incident, IncidentDetails, IncidentKind},
    scanner::SegmentFeatures,
    DetectionParams,
};
use crate::constants::{CONTAMINATION_MAX, CONTAMINATION_MIN};

/// Euler–Mascheroni constant, used to approximate harmonic numbers.
const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

/// Unsupervised outlier model over pooled segment features.
///
/// Implementations must be deterministic for a fixed `seed`.
pub trait OutlierScorer: Send + Sync {
    /// Fit the model on `features` and flag the outliers.
    ///
    /// Arguments
    /// -----------------
    /// * `features`: the pooled feature vectors.
    /// * `contamination`: expected proportion of outliers, in `[0.001, 0.5]`.
    /// * `seed`: seed of every random draw.
    ///
    /// Return
    /// ----------
    /// * one flag per input row, `true` for outliers.
    fn fit_and_score(&self, features: &[Vector5<f64>], contamination: f64, seed: u64)
        -> Vec<bool>;
}

/// Isolation forest with fixed ensemble size and sub-sample size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IsolationForest {
    pub n_trees: usize,
    pub max_samples: usize,
}

impl Default for IsolationForest {
    fn default() -> Self {
        IsolationForest {
            n_trees: 100,
            max_samples: 256,
        }
    }
}

impl IsolationForest {
    pub fn new(n_trees: usize, max_samples: usize) -> Self {
        IsolationForest {
            n_trees,
            max_samples,
        }
    }

    /// Anomaly score of every row, in `(0, 1]`; higher is more isolated.
    ///
    /// Return
    /// ----------
    /// * `None` when fewer than two rows are given: no tree can be grown.
    pub fn scores(&self, features: &[Vector5<f64>], seed: u64) -> Option<Vec<f64>> {
        let n = features.len();
        let psi = self.max_samples.min(n);
        if psi < 2 || self.n_trees == 0 {
            return None;
        }
        let height_limit = (psi as f64).log2().ceil() as usize;

        let mut master = StdRng::seed_from_u64(seed);
        let tree_seeds: Vec<u64> = (0..self.n_trees).map(|_| master.random()).collect();

        let grow = |tree_seed: &u64| {
            let mut rng = StdRng::seed_from_u64(*tree_seed);
            let sample = index::sample(&mut rng, n, psi).into_vec();
            IsolationTree::grow(features, sample, height_limit, &mut rng)
        };

        #[cfg(feature = "parallel")]
        let trees: Vec<IsolationTree> = tree_seeds.par_iter().map(grow).collect();
        #[cfg(not(feature = "parallel"))]
        let trees: Vec<IsolationTree> = tree_seeds.iter().map(grow).collect();

        let norm = average_path_length(psi);
        let n_trees = trees.len() as f64;
        let scores = features
            .iter()
            .map(|x| {
                let mean_depth = trees.iter().map(|t| t.path_length(x)).sum::<f64>() / n_trees;
                2f64.powf(-mean_depth / norm)
            })
            .collect();
        Some(scores)
    }
}

impl OutlierScorer for IsolationForest {
    fn fit_and_score(
        &self,
        features: &[Vector5<f64>],
        contamination: f64,
        seed: u64,
    ) -> Vec<bool> {
        let Some(scores) = self.scores(features, seed) else {
            return vec![false; features.len()];
        };
        let contamination = contamination.clamp(CONTAMINATION_MIN, CONTAMINATION_MAX);
        let threshold = quantile(&scores, 1.0 - contamination);
        scores.iter().map(|s| *s > threshold).collect()
    }
}

#[derive(Debug, Clone, Copy)]
enum Node {
    Leaf {
        size: usize,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// One isolation tree, stored as an arena; the root is `nodes[0]`.
#[derive(Debug, Clone)]
struct IsolationTree {
    nodes: Vec<Node>,
}

impl IsolationTree {
    fn grow(
        data: &[Vector5<f64>],
        sample: Vec<usize>,
        height_limit: usize,
        rng: &mut StdRng,
    ) -> Self {
        let mut tree = IsolationTree {
            nodes: Vec::with_capacity(2 * sample.len()),
        };
        tree.grow_node(data, sample, 0, height_limit, rng);
        tree
    }

    fn grow_node(
        &mut self,
        data: &[Vector5<f64>],
        rows: Vec<usize>,
        depth: usize,
        height_limit: usize,
        rng: &mut StdRng,
    ) -> usize {
        let slot = self.nodes.len();
        self.nodes.push(Node::Leaf { size: rows.len() });
        if depth >= height_limit || rows.len() <= 1 {
            return slot;
        }

        let candidates: Vec<(usize, f64, f64)> = (0..5)
            .filter_map(|feature| {
                let (lo, hi) = rows.iter().map(|&r| data[r][feature]).fold(
                    (f64::INFINITY, f64::NEG_INFINITY),
                    |(lo, hi), v| (lo.min(v), hi.max(v)),
                );
                // a non-finite span cannot hold a drawn threshold
                (hi > lo && (hi - lo).is_finite()).then_some((feature, lo, hi))
            })
            .collect();
        if candidates.is_empty() {
            return slot;
        }

        let (feature, lo, hi) = candidates[rng.random_range(0..candidates.len())];
        let threshold = rng.random_range(lo..hi);
        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows
            .into_iter()
            .partition(|&r| data[r][feature] < threshold);

        let left = self.grow_node(data, left_rows, depth + 1, height_limit, rng);
        let right = self.grow_node(data, right_rows, depth + 1, height_limit, rng);
        self.nodes[slot] = Node::Split {
            feature,
            threshold,
            left,
            right,
        };
        slot
    }

    fn path_length(&self, x: &Vector5<f64>) -> f64 {
        let mut node = 0;
        let mut depth = 0.0;
        loop {
            match self.nodes[node] {
                Node::Leaf { size } => return depth + average_path_length(size),
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if x[feature] < threshold { left } else { right };
                    depth += 1.0;
                }
            }
        }
    }
}

/// Average path length of an unsuccessful search in a binary search tree of `n` nodes.
fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

/// Quantile `q ∈ [0, 1]` of `values`, linear interpolation between closest ranks.
fn quantile(values: &[f64], q: f64) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// Statistical stage of the detection pipeline.
pub struct StatisticalScorer {
    scorer: Option<Box<dyn OutlierScorer>>,
}

impl StatisticalScorer {
    /// Resolve the built-in scorer for these parameters.
    ///
    /// Available when the crate is built with the `isolation-forest` feature.
    pub fn probe(params: &DetectionParams) -> Self {
        #[cfg(feature = "isolation-forest")]
        let scorer: Option<Box<dyn OutlierScorer>> = Some(Box::new(IsolationForest::new(
            params.n_trees,
            params.max_samples,
        )));
        #[cfg(not(feature = "isolation-forest"))]
        let scorer: Option<Box<dyn OutlierScorer>> = {
            let _ = params;
            None
        };
        StatisticalScorer { scorer }
    }

    /// Use a caller-provided model.
    pub fn with_scorer(scorer: Box<dyn OutlierScorer>) -> Self {
        StatisticalScorer {
            scorer: Some(scorer),
        }
    }

    /// A stage that never flags anything.
    pub fn unavailable() -> Self {
        StatisticalScorer { scorer: None }
    }

    pub fn is_available(&self) -> bool {
        self.scorer.is_some()
    }

    /// Score the pooled segments and turn the flagged ones into incidents.
    ///
    /// Arguments
    /// -----------------
    /// * `segments`: pooled segments, in vessel order then chronological order.
    /// * `params`: provides `contamination` and `seed`.
    ///
    /// Return
    /// ----------
    /// * one `statistical_outlier` incident per flagged segment, in pool order.
    pub fn score_segments(
        &self,
        segments: &[SegmentFeatures],
        params: &DetectionParams,
    ) -> Vec<Incident> {
        let Some(scorer) = self.scorer.as_ref() else {
            debug!("no outlier scorer available, statistical scoring skipped");
            return Vec::new();
        };
        if segments.is_empty() {
            debug!("empty feature pool, statistical scoring skipped");
            return Vec::new();
        }

        let features: Vec<Vector5<f64>> = segments.iter().map(|s| s.features).collect();
        let flags = scorer.fit_and_score(&features, params.contamination, params.seed);
        if flags.len() != segments.len() {
            warn!(
                pool = segments.len(),
                flags = flags.len(),
                "outlier scorer returned a flag count different from the pool size"
            );
        }

        let incidents: Vec<Incident> = segments
            .iter()
            .zip(flags)
            .filter(|(_, flagged)| *flagged)
            .map(|(segment, _)| {
                Incident::on_segment(
                    IncidentKind::StatisticalOutlier,
                    segment.vessel_id,
                    segment.ts_prev,
                    segment.ts_curr,
                    IncidentDetails::motion(
                        segment.speed_knots(),
                        segment.distance_km(),
                        segment.elapsed_seconds(),
                    ),
                )
            })
            .collect();
        debug!(
            pool = segments.len(),
            flagged = incidents.len(),
            "statistical scoring done"
        );
        incidents
    }
}
