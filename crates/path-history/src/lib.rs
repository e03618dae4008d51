//! Path Change History
//!
//! Bounded, filtered history of network path transitions with cached
//! statistics, degradation detectors and a change subscription hook.
//!
//! # Ingest Pipeline
//!
//! ```text
//! observation ─▶ significance ─▶ gap filter ─▶ score ─▶ record ─▶ evict ─▶ stats ─▶ notify
//! ```
//!
//! A non-significant observation that arrives within
//! `minimum_significant_gap` of the last recorded change is dropped without
//! touching any state, so bursts of duplicate reports cannot keep resetting
//! the gap timer.
//!
//! # Sharing
//!
//! [`ChangeHistory`] is a plain owned value. Wrap it in [`SharedHistory`] to
//! serialize all mutation behind one write lock while readers receive owned
//! point-in-time snapshots.

use thiserror::Error;

pub mod config;
pub mod history;
pub mod record;
pub mod shared;
pub mod stats;
pub mod subscription;

pub use config::HistoryConfig;
pub use history::{
    ChangeHistory, DEGRADATION_RATIO, DEGRADATION_WINDOW, DISCONNECT_THRESHOLD,
    DISCONNECT_WINDOW,
};
pub use record::{ChangeDetails, ChangeRecord, FieldChange};
pub use shared::SharedHistory;
pub use stats::{aggregate, Statistics};
pub use subscription::{ChangeCallback, SubscriptionId, Subscribers};

pub use path_quality::{
    ChangeCategory, ConnectionKind, Observation, PathStatus, QualityError, QualityScore,
    QualityTier, Trend, TrendAnalysis,
};

#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("Invalid capacity: {0} (must be at least 1)")]
    InvalidCapacity(usize),
    #[error("Invalid observation: {0}")]
    Observation(#[from] QualityError),
}

pub type Result<T> = std::result::Result<T, HistoryError>;
