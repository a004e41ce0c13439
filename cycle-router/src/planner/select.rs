//! Multi-objective route selection.
//!
//! Ranks a batch of evaluated candidates by a weighted blend of distance,
//! safety and comfort. Each metric is min/max normalized across the batch,
//! so scores are only comparable within one call.

use serde::Serialize;

use crate::domain::{CandidatePath, DomainError, ObjectiveWeights};

use super::metrics::RouteMetrics;

/// Normalized score on an axis where every candidate has the same value.
pub const DEGENERATE_AXIS_SCORE: f64 = 1.0;

/// Per-axis scores in `[0, 1]`, higher is better.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NormalizedScores {
    pub distance: f64,
    pub safety: f64,
    pub comfort: f64,
}

/// A candidate with its metrics and batch-relative score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedRoute {
    pub path: CandidatePath,
    pub metrics: RouteMetrics,
    pub scores: NormalizedScores,
    pub combined_score: f64,
}

/// Min and max of one metric over the batch.
#[derive(Debug, Clone, Copy)]
struct AxisRange {
    min: f64,
    max: f64,
}

impl AxisRange {
    fn of(values: impl Iterator<Item = f64>) -> Self {
        values.fold(
            AxisRange {
                min: f64::INFINITY,
                max: f64::NEG_INFINITY,
            },
            |r, v| AxisRange {
                min: r.min.min(v),
                max: r.max.max(v),
            },
        )
    }

    /// Position of `v` in the range, 0 at the min and 1 at the max.
    fn scale(&self, v: f64) -> f64 {
        if self.max == self.min {
            return DEGENERATE_AXIS_SCORE;
        }
        (v - self.min) / (self.max - self.min)
    }

    /// Like [`scale`](Self::scale) but 1 at the min, for lower-is-better.
    fn scale_inverted(&self, v: f64) -> f64 {
        if self.max == self.min {
            return DEGENERATE_AXIS_SCORE;
        }
        1.0 - (v - self.min) / (self.max - self.min)
    }
}

/// Rank candidates best-first.
///
/// Shorter routes score higher on distance; safer and more comfortable
/// routes score higher on those axes. Ties on the combined score go to the
/// shorter route, then to the earlier candidate. Every candidate is
/// returned.
///
/// # Errors
///
/// Returns `InvalidWeights` if any weight is negative or not finite, or if
/// all three are zero.
pub fn select_best(
    candidates: &[(CandidatePath, RouteMetrics)],
    weights: ObjectiveWeights,
) -> Result<Vec<RankedRoute>, DomainError> {
    weights.validate()?;
    if weights.is_zero() {
        return Err(DomainError::InvalidWeights(
            "at least one weight must be positive".to_string(),
        ));
    }

    let length = AxisRange::of(candidates.iter().map(|(_, m)| m.total_length));
    let safety = AxisRange::of(candidates.iter().map(|(_, m)| m.safety_factor));
    let comfort = AxisRange::of(candidates.iter().map(|(_, m)| m.comfort_factor));

    let mut ranked: Vec<(usize, RankedRoute)> = candidates
        .iter()
        .enumerate()
        .map(|(i, (path, metrics))| {
            let scores = NormalizedScores {
                distance: length.scale_inverted(metrics.total_length),
                safety: safety.scale(metrics.safety_factor),
                comfort: comfort.scale(metrics.comfort_factor),
            };
            let combined_score = weights.distance * scores.distance
                + weights.safety * scores.safety
                + weights.comfort * scores.comfort;
            (
                i,
                RankedRoute {
                    path: path.clone(),
                    metrics: *metrics,
                    scores,
                    combined_score,
                },
            )
        })
        .collect();

    ranked.sort_by(|(ia, a), (ib, b)| {
        b.combined_score
            .total_cmp(&a.combined_score)
            .then_with(|| a.metrics.total_length.total_cmp(&b.metrics.total_length))
            .then_with(|| ia.cmp(ib))
    });

    Ok(ranked.into_iter().map(|(_, r)| r).collect())
}
