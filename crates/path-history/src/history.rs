//! Bounded change history store
//!
//! Single owner of the record list and the cached statistics. All mutation
//! goes through `ingest` and `clear`.

use crate::record::elapsed_between;
use crate::stats::{aggregate, Statistics};
use crate::subscription::{SubscriptionId, Subscribers};
use crate::{ChangeRecord, HistoryConfig, Result};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use path_quality::{
    analyze_scores, is_significant, ChangeCategory, Observation, QualityScore, TrendAnalysis,
};
use std::collections::VecDeque;
use tracing::{debug, info, warn};

/// Most recent records inspected for frequent disconnections
pub const DISCONNECT_WINDOW: usize = 20;
/// Disconnections within the window that count as frequent
pub const DISCONNECT_THRESHOLD: usize = 5;
/// Most recent records inspected for quality degradation
pub const DEGRADATION_WINDOW: usize = 10;
/// Share of quality transitions that must be degradations
pub const DEGRADATION_RATIO: f64 = 0.7;

#[derive(Debug)]
pub struct ChangeHistory {
    config: HistoryConfig,
    records: VecDeque<ChangeRecord>,
    /// `None` when stale
    stats_cache: Mutex<Option<Statistics>>,
    subscribers: Subscribers,
}

impl Default for ChangeHistory {
    fn default() -> Self {
        Self::build(HistoryConfig::default())
    }
}

impl ChangeHistory {
    /// Create a store, rejecting invalid configuration
    pub fn new(config: HistoryConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    pub fn with_defaults() -> Self {
        Self::default()
    }

    fn build(config: HistoryConfig) -> Self {
        Self {
            records: VecDeque::with_capacity(config.capacity.min(4096)),
            config,
            stats_cache: Mutex::new(None),
            subscribers: Subscribers::new(),
        }
    }

    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    /// Offer an observation to the store.
    ///
    /// Returns the new record, or `None` when the observation was filtered
    /// (not significant and within `minimum_significant_gap` of the last
    /// recorded change). Filtered observations leave no trace.
    pub fn ingest(&mut self, observation: Observation) -> Option<ChangeRecord> {
        let previous = self.records.back().map(|r| r.current.clone());

        if let Some(prev) = &previous {
            if observation.timestamp < prev.timestamp {
                warn!(
                    "Observation at {} predates last recorded change at {}",
                    observation.timestamp, prev.timestamp
                );
            }

            if !is_significant(&observation, Some(prev)) {
                let elapsed = elapsed_between(prev, &observation);
                if elapsed < self.config.minimum_significant_gap {
                    debug!(
                        "Filtered {:?} observation ({:.3}s since last change)",
                        observation.connection_kind,
                        elapsed.as_secs_f64()
                    );
                    return None;
                }
            }
        }

        let record =
            ChangeRecord::from_transition(observation, previous, self.config.record_details);

        debug!(
            "Recorded {:?}: {:?} {:?} ({:.3})",
            record.category,
            record.current.connection_kind,
            record.score.tier,
            record.score.composite
        );

        self.records.push_back(record.clone());

        let mut evicted = 0usize;
        while self.records.len() > self.config.capacity {
            self.records.pop_front();
            evicted += 1;
        }
        if evicted > 0 {
            debug!("Evicted {} record(s) at capacity {}", evicted, self.config.capacity);
        }

        self.refresh_statistics();
        self.subscribers.notify(&record);

        Some(record)
    }

    /// Validate the observation before ingesting it.
    ///
    /// For observations assembled field by field or deserialized from an
    /// external source.
    pub fn try_ingest(&mut self, observation: Observation) -> Result<Option<ChangeRecord>> {
        observation.validate()?;
        Ok(self.ingest(observation))
    }

    /// Most recent `limit` records (all when `None`), oldest to newest
    pub fn history(&self, limit: Option<usize>) -> Vec<ChangeRecord> {
        let len = self.records.len();
        let skip = len.saturating_sub(limit.unwrap_or(len));
        self.records.iter().skip(skip).cloned().collect()
    }

    /// Records with `start <= timestamp <= end`; empty when `start > end`
    pub fn history_in_range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<ChangeRecord> {
        if start > end {
            return Vec::new();
        }

        self.records
            .iter()
            .filter(|r| r.timestamp >= start && r.timestamp <= end)
            .cloned()
            .collect()
    }

    /// Drop all records, the last observation and cached statistics
    pub fn clear(&mut self) {
        info!("Clearing {} change record(s)", self.records.len());
        self.records.clear();
        *self.stats_cache.lock() = None;
    }

    /// Cached aggregate over the retained records
    pub fn statistics(&self) -> Statistics {
        let mut cache = self.stats_cache.lock();
        if let Some(stats) = cache.as_ref() {
            return stats.clone();
        }

        let stats = aggregate(&self.records);
        *cache = Some(stats.clone());
        stats
    }

    fn refresh_statistics(&self) {
        let fresh = self
            .config
            .eager_statistics
            .then(|| aggregate(&self.records));
        *self.stats_cache.lock() = fresh;
    }

    /// Score of the last recorded observation
    pub fn current_score(&self) -> Option<QualityScore> {
        self.records.back().map(|r| r.score)
    }

    /// Last recorded observation (filtered observations are never retained)
    pub fn last_observation(&self) -> Option<&Observation> {
        self.records.back().map(|r| &r.current)
    }

    /// At least `DISCONNECT_THRESHOLD` disconnections among the most recent
    /// `DISCONNECT_WINDOW` records
    pub fn detect_frequent_disconnections(&self) -> bool {
        let disconnects = self
            .recent(DISCONNECT_WINDOW)
            .filter(|r| r.category == ChangeCategory::Disconnected)
            .count();
        disconnects >= DISCONNECT_THRESHOLD
    }

    /// More than `DEGRADATION_RATIO` of the quality transitions among the
    /// most recent `DEGRADATION_WINDOW` records are degradations
    pub fn detect_quality_degradation(&self) -> bool {
        let (transitions, degraded) = self
            .recent(DEGRADATION_WINDOW)
            .filter(|r| r.category.is_quality_transition())
            .fold((0usize, 0usize), |(total, degraded), r| {
                let is_degraded = r.category == ChangeCategory::QualityDegraded;
                (total + 1, degraded + usize::from(is_degraded))
            });

        transitions > 0 && degraded as f64 / transitions as f64 > DEGRADATION_RATIO
    }

    /// Trend over the scores of the most recent `limit` records (all when `None`)
    pub fn quality_trend(&self, limit: Option<usize>) -> TrendAnalysis {
        let scores: Vec<QualityScore> = self.history(limit).iter().map(|r| r.score).collect();
        analyze_scores(&scores)
    }

    /// Register a callback for newly recorded changes.
    ///
    /// Callbacks run synchronously inside `ingest` and must not call back
    /// into the store.
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: Fn(&ChangeRecord) + Send + Sync + 'static,
    {
        let id = self.subscribers.subscribe(callback);
        debug!("Added subscriber {:?} ({} total)", id, self.subscribers.len());
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let removed = self.subscribers.unsubscribe(id);
        if removed {
            debug!("Removed subscriber {:?}", id);
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Newest first
    fn recent(&self, window: usize) -> impl Iterator<Item = &ChangeRecord> {
        self.records.iter().rev().take(window)
    }
}
