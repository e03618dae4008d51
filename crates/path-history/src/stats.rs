//! Aggregate statistics over a window of change records
//!
//! Stability heuristic:
//!
//! ```text
//! frequency_score  = max(0, 1 − changes_per_sec / 10)
//! transition_score = max(0, 1 − (connected + disconnected) / count)
//! stability        = (frequency_score + transition_score) / 2
//! ```

use crate::ChangeRecord;
use chrono::{DateTime, Utc};
use path_quality::{ChangeCategory, ConnectionKind, QualityTier};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Change frequency (changes per second) at which the frequency score hits zero
pub const INSTABILITY_FREQUENCY: f64 = 10.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub total_changes: usize,
    /// Last record timestamp minus first
    pub time_span: Duration,
    /// Changes per second over `time_span` (0 for a zero span)
    pub change_frequency: f64,
    /// Mean of the recorded inter-change durations
    pub mean_inter_change: Duration,
    pub category_counts: BTreeMap<ChangeCategory, usize>,
    pub kind_counts: BTreeMap<ConnectionKind, usize>,
    pub tier_counts: BTreeMap<QualityTier, usize>,
    /// 0-1, higher = more stable
    pub stability_score: f64,
    pub computed_at: DateTime<Utc>,
}

impl Statistics {
    /// No data is treated as maximally stable
    pub fn empty() -> Self {
        Self {
            total_changes: 0,
            time_span: Duration::ZERO,
            change_frequency: 0.0,
            mean_inter_change: Duration::ZERO,
            category_counts: BTreeMap::new(),
            kind_counts: BTreeMap::new(),
            tier_counts: BTreeMap::new(),
            stability_score: 1.0,
            computed_at: Utc::now(),
        }
    }

    pub fn category_count(&self, category: ChangeCategory) -> usize {
        self.category_counts.get(&category).copied().unwrap_or(0)
    }

    pub fn kind_count(&self, kind: ConnectionKind) -> usize {
        self.kind_counts.get(&kind).copied().unwrap_or(0)
    }

    pub fn tier_count(&self, tier: QualityTier) -> usize {
        self.tier_counts.get(&tier).copied().unwrap_or(0)
    }
}

/// Aggregate records given in chronological order
pub fn aggregate<'a, I>(records: I) -> Statistics
where
    I: IntoIterator<Item = &'a ChangeRecord>,
{
    let mut total_changes = 0usize;
    let mut first: Option<DateTime<Utc>> = None;
    let mut last: Option<DateTime<Utc>> = None;
    let mut elapsed_total = Duration::ZERO;
    let mut elapsed_count = 0u32;
    let mut category_counts = BTreeMap::new();
    let mut kind_counts = BTreeMap::new();
    let mut tier_counts = BTreeMap::new();

    for record in records {
        total_changes += 1;
        first.get_or_insert(record.timestamp);
        last = Some(record.timestamp);

        if let Some(elapsed) = record.elapsed_since_previous {
            elapsed_total += elapsed;
            elapsed_count += 1;
        }

        *category_counts.entry(record.category).or_insert(0) += 1;
        *kind_counts.entry(record.current.connection_kind).or_insert(0) += 1;
        *tier_counts.entry(record.score.tier).or_insert(0) += 1;
    }

    let (Some(first), Some(last)) = (first, last) else {
        return Statistics::empty();
    };

    let time_span = (last - first).to_std().unwrap_or(Duration::ZERO);
    let span_secs = time_span.as_secs_f64();
    let change_frequency = if span_secs > 0.0 {
        total_changes as f64 / span_secs
    } else {
        0.0
    };

    let mean_inter_change = if elapsed_count > 0 {
        elapsed_total / elapsed_count
    } else {
        Duration::ZERO
    };

    let transitions = category_counts.get(&ChangeCategory::Connected).copied().unwrap_or(0)
        + category_counts.get(&ChangeCategory::Disconnected).copied().unwrap_or(0);
    let frequency_score = (1.0 - change_frequency / INSTABILITY_FREQUENCY).max(0.0);
    let transition_score = (1.0 - transitions as f64 / total_changes as f64).max(0.0);

    Statistics {
        total_changes,
        time_span,
        change_frequency,
        mean_inter_change,
        category_counts,
        kind_counts,
        tier_counts,
        stability_score: (frequency_score + transition_score) / 2.0,
        computed_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;
    use path_quality::Observation;

    /// Chain of records built the way the store builds them
    fn chain(observations: Vec<Observation>) -> Vec<ChangeRecord> {
        let mut previous: Option<Observation> = None;
        let mut records = Vec::new();
        for o in observations {
            records.push(ChangeRecord::from_transition(o.clone(), previous.take(), false));
            previous = Some(o);
        }
        records
    }

    #[test]
    fn test_empty_is_maximally_stable() {
        let records: Vec<ChangeRecord> = Vec::new();
        let stats = aggregate(&records);
        assert_eq!(stats.total_changes, 0);
        assert_eq!(stats.stability_score, 1.0);
        assert_eq!(stats.change_frequency, 0.0);
        assert_eq!(stats.time_span, Duration::ZERO);
        assert!(stats.category_counts.is_empty());
        assert!(stats.kind_counts.is_empty());
        assert!(stats.tier_counts.is_empty());
    }

    #[test]
    fn test_single_record() {
        let records = chain(vec![Observation::new(ConnectionKind::Wifi, Utc::now())]);
        let stats = aggregate(&records);

        assert_eq!(stats.total_changes, 1);
        assert_eq!(stats.change_frequency, 0.0);
        assert_eq!(stats.mean_inter_change, Duration::ZERO);
        assert_eq!(stats.category_count(ChangeCategory::Initial), 1);
        // frequency 1.0, transitions 1.0
        assert_eq!(stats.stability_score, 1.0);
    }

    #[test]
    fn test_alternating_connectivity() {
        let t0 = Utc::now();
        let observations = (0..6)
            .map(|i| {
                let ts = t0 + ChronoDuration::seconds(5 * i);
                if i % 2 == 0 {
                    Observation::new(ConnectionKind::Wifi, ts)
                } else {
                    Observation::unavailable(ts)
                }
            })
            .collect();
        let stats = aggregate(&chain(observations));

        assert_eq!(stats.total_changes, 6);
        assert_eq!(stats.time_span, Duration::from_secs(25));
        assert!((stats.change_frequency - 6.0 / 25.0).abs() < 1e-9);
        assert_eq!(stats.mean_inter_change, Duration::from_secs(5));
        assert_eq!(stats.category_count(ChangeCategory::Initial), 1);
        assert_eq!(stats.category_count(ChangeCategory::Disconnected), 3);
        assert_eq!(stats.category_count(ChangeCategory::Connected), 2);
        assert_eq!(stats.kind_count(ConnectionKind::Wifi), 3);
        assert_eq!(stats.kind_count(ConnectionKind::Unavailable), 3);
        assert_eq!(stats.tier_count(QualityTier::Excellent), 3);
        assert_eq!(stats.tier_count(QualityTier::Fair), 3);

        let frequency_score = 1.0 - (6.0 / 25.0) / 10.0;
        let transition_score = 1.0 - 5.0 / 6.0;
        let expected = (frequency_score + transition_score) / 2.0;
        assert!(
            (stats.stability_score - expected).abs() < 1e-9,
            "stability: {} expected {}",
            stats.stability_score,
            expected
        );
    }

    #[test]
    fn test_burst_floors_frequency_score() {
        // 11 changes within one second: frequency > 10/s
        let t0 = Utc::now();
        let observations = (0..11)
            .map(|i| {
                Observation::new(ConnectionKind::Wifi, t0 + ChronoDuration::milliseconds(100 * i))
                    .with_expensive(i % 2 == 1)
            })
            .collect();
        let stats = aggregate(&chain(observations));

        assert!(stats.change_frequency > INSTABILITY_FREQUENCY);
        // frequency score clamps at 0, no availability transitions
        assert!((stats.stability_score - 0.5).abs() < 1e-9);
    }
}
