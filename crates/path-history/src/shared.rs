//! Thread-safe handle over a [`ChangeHistory`]
//!
//! All mutation takes the write lock, so significance checks, record
//! creation, eviction and statistics invalidation happen as one step.
//! Readers take the read lock and receive owned snapshots.

use crate::stats::Statistics;
use crate::subscription::SubscriptionId;
use crate::{ChangeHistory, ChangeRecord, HistoryConfig, Result};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use path_quality::{Observation, QualityScore, TrendAnalysis};
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct SharedHistory {
    inner: Arc<RwLock<ChangeHistory>>,
}

impl Default for SharedHistory {
    fn default() -> Self {
        Self::from_history(ChangeHistory::default())
    }
}

impl SharedHistory {
    pub fn new(config: HistoryConfig) -> Result<Self> {
        Ok(Self::from_history(ChangeHistory::new(config)?))
    }

    pub fn from_history(history: ChangeHistory) -> Self {
        Self {
            inner: Arc::new(RwLock::new(history)),
        }
    }

    pub fn ingest(&self, observation: Observation) -> Option<ChangeRecord> {
        self.inner.write().ingest(observation)
    }

    pub fn try_ingest(&self, observation: Observation) -> Result<Option<ChangeRecord>> {
        self.inner.write().try_ingest(observation)
    }

    pub fn clear(&self) {
        self.inner.write().clear();
    }

    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&ChangeRecord) + Send + Sync + 'static,
    {
        self.inner.write().subscribe(callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.write().unsubscribe(id)
    }

    pub fn history(&self, limit: Option<usize>) -> Vec<ChangeRecord> {
        self.inner.read().history(limit)
    }

    pub fn history_in_range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<ChangeRecord> {
        self.inner.read().history_in_range(start, end)
    }

    pub fn statistics(&self) -> Statistics {
        self.inner.read().statistics()
    }

    pub fn current_score(&self) -> Option<QualityScore> {
        self.inner.read().current_score()
    }

    pub fn last_observation(&self) -> Option<Observation> {
        self.inner.read().last_observation().cloned()
    }

    pub fn detect_frequent_disconnections(&self) -> bool {
        self.inner.read().detect_frequent_disconnections()
    }

    pub fn detect_quality_degradation(&self) -> bool {
        self.inner.read().detect_quality_degradation()
    }

    pub fn quality_trend(&self, limit: Option<usize>) -> TrendAnalysis {
        self.inner.read().quality_trend(limit)
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Run several reads against one consistent state
    pub fn read<R>(&self, f: impl FnOnce(&ChangeHistory) -> R) -> R {
        f(&self.inner.read())
    }
}
