//! Score trend analysis
//!
//! Fits an ordinary least-squares line of composite score against sample
//! index and buckets the slope:
//!
//! ```text
//! slope = (n·Σxy − Σx·Σy) / (n·Σx² − (Σx)²)
//! ```
//!
//! `slope > 0.01` is improving, `slope < −0.01` is declining.

use crate::scorer::score;
use crate::{Observation, QualityScore, QualityTier};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Slope magnitude (composite per sample) treated as a real trend
pub const TREND_SLOPE_THRESHOLD: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trend {
    Improving,
    Stable,
    Declining,
}

impl Trend {
    pub fn from_slope(slope: f64) -> Self {
        if slope > TREND_SLOPE_THRESHOLD {
            Self::Improving
        } else if slope < -TREND_SLOPE_THRESHOLD {
            Self::Declining
        } else {
            Self::Stable
        }
    }
}

/// Trend summary over an ordered window of scores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendAnalysis {
    pub sample_count: usize,
    pub mean_score: f64,
    pub min_score: f64,
    pub max_score: f64,
    /// Regression slope (composite per sample)
    pub slope: f64,
    pub trend: Trend,
    pub tier_distribution: BTreeMap<QualityTier, usize>,
    /// Indices `i ≥ 1` where `tier[i] != tier[i - 1]`
    pub change_points: Vec<usize>,
}

impl TrendAnalysis {
    fn empty() -> Self {
        Self {
            sample_count: 0,
            mean_score: 0.0,
            min_score: 0.0,
            max_score: 0.0,
            slope: 0.0,
            trend: Trend::Stable,
            tier_distribution: BTreeMap::new(),
            change_points: Vec::new(),
        }
    }
}

/// Score each observation in order and analyze the resulting sequence
pub fn analyze_trend(observations: &[Observation]) -> TrendAnalysis {
    let scores: Vec<QualityScore> = observations.iter().map(score).collect();
    analyze_scores(&scores)
}

/// Analyze an ordered score sequence
pub fn analyze_scores(scores: &[QualityScore]) -> TrendAnalysis {
    if scores.is_empty() {
        return TrendAnalysis::empty();
    }

    let composites: Vec<f64> = scores.iter().map(|s| s.composite).collect();
    let n = composites.len();

    let mean_score = composites.iter().sum::<f64>() / n as f64;
    let min_score = composites.iter().cloned().fold(f64::MAX, f64::min);
    let max_score = composites.iter().cloned().fold(f64::MIN, f64::max);

    let slope = regression_slope(&composites);

    let mut tier_distribution = BTreeMap::new();
    for s in scores {
        *tier_distribution.entry(s.tier).or_insert(0) += 1;
    }

    let change_points = scores
        .windows(2)
        .enumerate()
        .filter(|(_, pair)| pair[0].tier != pair[1].tier)
        .map(|(i, _)| i + 1)
        .collect();

    TrendAnalysis {
        sample_count: n,
        mean_score,
        min_score,
        max_score,
        slope,
        trend: Trend::from_slope(slope),
        tier_distribution,
        change_points,
    }
}

/// Least-squares slope of `values` against their 0-based index.
/// Zero for fewer than two samples.
fn regression_slope(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }

    let n = values.len() as f64;
    let mut sum_x = 0.0;
    let mut sum_y = 0.0;
    let mut sum_xy = 0.0;
    let mut sum_x2 = 0.0;

    for (i, &y) in values.iter().enumerate() {
        let x = i as f64;
        sum_x += x;
        sum_y += y;
        sum_xy += x * y;
        sum_x2 += x * x;
    }

    let denom = n * sum_x2 - sum_x * sum_x;
    if denom.abs() < 1e-12 {
        return 0.0;
    }

    (n * sum_xy - sum_x * sum_y) / denom
}
