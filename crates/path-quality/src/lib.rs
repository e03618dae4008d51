//! Network Path Quality
//!
//! Scores point-in-time network path observations, classifies the
//! transition between two observations, and analyzes score trends.
//!
//! # Scoring Model (5-Dimension, unweighted)
//!
//! ```text
//! Q(o) = (A + C + E + K + P) / 5
//! ```
//!
//! | Dimension | Values | Description |
//! |-----------|--------|-------------|
//! | A  | 1.0 / 0.5 / 0.0 | Availability (satisfied / requires connection / unsatisfied) |
//! | C  | 1.0 / 0.6 | Constraint (low-data mode is a preference, not a fault) |
//! | E  | 1.0 / 0.7 | Cost (metered paths are less attractive, not less capable) |
//! | K  | 0.0 - 1.0 | Connection kind (wifi > wired > cellular > loopback > other) |
//! | P  | 0.5 - 1.0 | Protocol support (base 0.5, +0.2 IPv6, +0.2 IPv4, +0.1 DNS) |
//!
//! # Tiers
//!
//! | Composite | Tier |
//! |-----------|------|
//! | ≥ 0.85 | Excellent |
//! | ≥ 0.65 | Good |
//! | ≥ 0.35 | Fair |
//! | < 0.35 | Poor |
//!
//! A cheaper fast-path tier ([`scorer::quick_tier`]) skips the dimensional
//! model entirely and is not guaranteed to agree with it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod classifier;
pub mod scorer;
pub mod trend;

pub use classifier::{classify, is_significant, ChangeCategory};
pub use scorer::{compare, quick_tier, score, Preference, ScoreComparison};
pub use trend::{analyze_scores, analyze_trend, Trend, TrendAnalysis};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum QualityError {
    #[error("Inconsistent observation: kind {kind:?} with available={available}")]
    InconsistentObservation {
        kind: ConnectionKind,
        available: bool,
    },
}

pub type Result<T> = std::result::Result<T, QualityError>;

/// Physical or logical interface carrying the path
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ConnectionKind {
    Wifi,
    Cellular,
    Wired,
    Loopback,
    Other,
    Unavailable,
}

impl ConnectionKind {
    /// Kind dimension score (0-1)
    pub fn quality_weight(&self) -> f64 {
        match self {
            Self::Wifi => 1.0,
            Self::Wired => 0.95,
            Self::Cellular => 0.8,
            Self::Loopback => 0.5,
            Self::Other => 0.4,
            Self::Unavailable => 0.0,
        }
    }
}

/// Three-valued path status reported by sources that distinguish
/// "usable after setup" from plain unavailability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PathStatus {
    /// Data can flow
    Satisfied,
    /// A connection must be established first (e.g. VPN on demand)
    RequiresConnection,
    /// No route
    Unsatisfied,
}

impl PathStatus {
    /// Availability dimension score (0-1)
    pub fn availability_score(&self) -> f64 {
        match self {
            Self::Satisfied => 1.0,
            Self::RequiresConnection => 0.5,
            Self::Unsatisfied => 0.0,
        }
    }
}

/// Immutable snapshot of connectivity state at one instant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub available: bool,
    pub connection_kind: ConnectionKind,
    /// Metered / cost-bearing path
    pub expensive: bool,
    /// User-requested reduced-data mode
    pub constrained: bool,
    pub supports_ipv4: bool,
    pub supports_ipv6: bool,
    pub supports_dns: bool,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<PathStatus>,
}

impl Observation {
    /// Create an observation for the given kind.
    ///
    /// `available` follows from the kind, and a usable path is assumed to
    /// carry IPv4, IPv6 and DNS until told otherwise.
    pub fn new(connection_kind: ConnectionKind, timestamp: DateTime<Utc>) -> Self {
        let available = connection_kind != ConnectionKind::Unavailable;
        Self {
            available,
            connection_kind,
            expensive: false,
            constrained: false,
            supports_ipv4: available,
            supports_ipv6: available,
            supports_dns: available,
            timestamp,
            status: None,
        }
    }

    /// Create an observation with no usable path
    pub fn unavailable(timestamp: DateTime<Utc>) -> Self {
        Self::new(ConnectionKind::Unavailable, timestamp)
    }

    pub fn with_expensive(mut self, expensive: bool) -> Self {
        self.expensive = expensive;
        self
    }

    pub fn with_constrained(mut self, constrained: bool) -> Self {
        self.constrained = constrained;
        self
    }

    pub fn with_protocols(mut self, ipv4: bool, ipv6: bool, dns: bool) -> Self {
        self.supports_ipv4 = ipv4;
        self.supports_ipv6 = ipv6;
        self.supports_dns = dns;
        self
    }

    pub fn with_status(mut self, status: PathStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// `connection_kind == Unavailable` iff `!available`
    pub fn is_consistent(&self) -> bool {
        (self.connection_kind == ConnectionKind::Unavailable) != self.available
    }

    pub fn validate(&self) -> Result<()> {
        if self.is_consistent() {
            Ok(())
        } else {
            Err(QualityError::InconsistentObservation {
                kind: self.connection_kind,
                available: self.available,
            })
        }
    }
}

/// Ordered quality bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum QualityTier {
    Poor,
    Fair,
    Good,
    Excellent,
}

/// Composite threshold for [`QualityTier::Excellent`]
pub const TIER_EXCELLENT: f64 = 0.85;
/// Composite threshold for [`QualityTier::Good`]
pub const TIER_GOOD: f64 = 0.65;
/// Composite threshold for [`QualityTier::Fair`]
pub const TIER_FAIR: f64 = 0.35;

impl QualityTier {
    /// Canonical tier for a composite score
    pub fn from_composite(composite: f64) -> Self {
        if composite >= TIER_EXCELLENT {
            Self::Excellent
        } else if composite >= TIER_GOOD {
            Self::Good
        } else if composite >= TIER_FAIR {
            Self::Fair
        } else {
            Self::Poor
        }
    }
}

/// Per-dimension scores, each in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreDimensions {
    pub availability: f64,
    pub constraint: f64,
    pub cost: f64,
    pub kind: f64,
    pub protocol_support: f64,
}

impl ScoreDimensions {
    pub const COUNT: usize = 5;

    /// Unweighted mean of all dimensions
    pub fn mean(&self) -> f64 {
        (self.availability + self.constraint + self.cost + self.kind + self.protocol_support)
            / Self::COUNT as f64
    }
}

/// Composite quality score of one observation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityScore {
    pub tier: QualityTier,
    /// Unweighted mean of `dimensions` (0-1)
    pub composite: f64,
    pub dimensions: ScoreDimensions,
}

impl QualityScore {
    pub fn from_dimensions(dimensions: ScoreDimensions) -> Self {
        let composite = dimensions.mean().clamp(0.0, 1.0);
        Self {
            tier: QualityTier::from_composite(composite),
            composite,
            dimensions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_thresholds() {
        assert_eq!(QualityTier::from_composite(1.0), QualityTier::Excellent);
        assert_eq!(QualityTier::from_composite(0.85), QualityTier::Excellent);
        assert_eq!(QualityTier::from_composite(0.849), QualityTier::Good);
        assert_eq!(QualityTier::from_composite(0.65), QualityTier::Good);
        assert_eq!(QualityTier::from_composite(0.5), QualityTier::Fair);
        assert_eq!(QualityTier::from_composite(0.35), QualityTier::Fair);
        assert_eq!(QualityTier::from_composite(0.349), QualityTier::Poor);
        assert_eq!(QualityTier::from_composite(0.0), QualityTier::Poor);
    }

    #[test]
    fn test_tier_ordering() {
        assert!(QualityTier::Poor < QualityTier::Fair);
        assert!(QualityTier::Fair < QualityTier::Good);
        assert!(QualityTier::Good < QualityTier::Excellent);
    }

    #[test]
    fn test_constructors_keep_kind_and_availability_consistent() {
        let now = Utc::now();
        let wifi = Observation::new(ConnectionKind::Wifi, now);
        assert!(wifi.available);
        assert!(wifi.supports_ipv4 && wifi.supports_ipv6 && wifi.supports_dns);
        assert!(wifi.validate().is_ok());

        let down = Observation::unavailable(now);
        assert!(!down.available);
        assert!(!down.supports_dns);
        assert!(down.validate().is_ok());
    }

    #[test]
    fn test_inconsistent_observation_rejected() {
        let mut obs = Observation::new(ConnectionKind::Cellular, Utc::now());
        obs.available = false;

        assert_eq!(
            obs.validate(),
            Err(QualityError::InconsistentObservation {
                kind: ConnectionKind::Cellular,
                available: false,
            })
        );
    }

    #[test]
    fn test_observation_serde_preserves_fields() {
        let obs = Observation::new(ConnectionKind::Cellular, Utc::now())
            .with_expensive(true)
            .with_protocols(true, false, true)
            .with_status(PathStatus::Satisfied);

        let json = serde_json::to_string(&obs).unwrap();
        let back: Observation = serde_json::from_str(&json).unwrap();
        assert_eq!(back, obs);
    }
}
