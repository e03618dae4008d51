//! History store configuration

use crate::{HistoryError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default number of retained records
pub const DEFAULT_CAPACITY: usize = 1000;

/// Default minimum spacing for non-significant records
pub const DEFAULT_MINIMUM_GAP: Duration = Duration::from_secs(2);

/// Store configuration, fixed at construction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Maximum retained records; oldest are evicted first
    pub capacity: usize,
    /// Non-significant observations closer than this to the last recorded
    /// change are dropped
    pub minimum_significant_gap: Duration,
    /// Attach a typed before/after diff to each record
    pub record_details: bool,
    /// Recompute statistics on every ingest instead of on first read
    pub eager_statistics: bool,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            minimum_significant_gap: DEFAULT_MINIMUM_GAP,
            record_details: true,
            eager_statistics: true,
        }
    }
}

impl HistoryConfig {
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_minimum_gap(mut self, gap: Duration) -> Self {
        self.minimum_significant_gap = gap;
        self
    }

    pub fn with_record_details(mut self, enabled: bool) -> Self {
        self.record_details = enabled;
        self
    }

    pub fn with_eager_statistics(mut self, enabled: bool) -> Self {
        self.eager_statistics = enabled;
        self
    }

    /// Reject settings that would silently corrupt later statistics
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(HistoryError::InvalidCapacity(self.capacity));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = HistoryConfig::default();
        assert_eq!(config.capacity, 1000);
        assert_eq!(config.minimum_significant_gap, Duration::from_secs_f64(2.0));
        assert!(config.record_details);
        assert!(config.eager_statistics);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let config = HistoryConfig::default().with_capacity(0);
        assert!(matches!(
            config.validate(),
            Err(HistoryError::InvalidCapacity(0))
        ));
    }

    #[test]
    fn test_partial_document_fills_defaults() {
        let config: HistoryConfig =
            serde_json::from_str(r#"{"capacity": 50, "record_details": false}"#).unwrap();

        assert_eq!(config.capacity, 50);
        assert!(!config.record_details);
        assert_eq!(config.minimum_significant_gap, DEFAULT_MINIMUM_GAP);
        assert!(config.eager_statistics);
    }
}
