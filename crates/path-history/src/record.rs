//! Change records and typed before/after details

use chrono::{DateTime, Utc};
use path_quality::{
    classify, score, ChangeCategory, ConnectionKind, Observation, QualityScore, QualityTier,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// One recorded transition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeRecord {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub category: ChangeCategory,
    pub current: Observation,
    /// Absent only for the first record after creation or `clear`
    pub previous: Option<Observation>,
    pub elapsed_since_previous: Option<Duration>,
    /// Score of `current`
    pub score: QualityScore,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<ChangeDetails>,
}

impl ChangeRecord {
    /// Build a record for the transition `previous -> current`.
    ///
    /// `with_details` controls whether the before/after diff is attached;
    /// an initial record never carries one.
    pub fn from_transition(
        current: Observation,
        previous: Option<Observation>,
        with_details: bool,
    ) -> Self {
        let category = classify(&current, previous.as_ref());
        let current_score = score(&current);

        let elapsed_since_previous = previous.as_ref().map(|p| elapsed_between(p, &current));

        let details = match (&previous, with_details) {
            (Some(p), true) => Some(ChangeDetails::between(p, &current)),
            _ => None,
        };

        Self {
            id: Uuid::new_v4(),
            timestamp: current.timestamp,
            category,
            current,
            previous,
            elapsed_since_previous,
            score: current_score,
            details,
        }
    }
}

/// Time from `earlier` to `later`, saturating at zero when the clock went backwards
pub fn elapsed_between(earlier: &Observation, later: &Observation) -> Duration {
    (later.timestamp - earlier.timestamp)
        .to_std()
        .unwrap_or(Duration::ZERO)
}

/// Before/after pair for one attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldChange<T> {
    pub before: T,
    pub after: T,
}

impl<T: PartialEq + Copy> FieldChange<T> {
    /// `Some` only when the value actually changed
    pub fn diff(before: T, after: T) -> Option<Self> {
        (before != after).then_some(Self { before, after })
    }
}

/// Typed diff between two observations
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChangeDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available: Option<FieldChange<bool>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_kind: Option<FieldChange<ConnectionKind>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier: Option<FieldChange<QualityTier>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expensive: Option<FieldChange<bool>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constrained: Option<FieldChange<bool>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supports_ipv4: Option<FieldChange<bool>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supports_ipv6: Option<FieldChange<bool>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supports_dns: Option<FieldChange<bool>>,
    /// `composite(after) - composite(before)`
    pub composite_delta: f64,
}

impl ChangeDetails {
    pub fn between(before: &Observation, after: &Observation) -> Self {
        let before_score = score(before);
        let after_score = score(after);

        Self {
            available: FieldChange::diff(before.available, after.available),
            connection_kind: FieldChange::diff(before.connection_kind, after.connection_kind),
            tier: FieldChange::diff(before_score.tier, after_score.tier),
            expensive: FieldChange::diff(before.expensive, after.expensive),
            constrained: FieldChange::diff(before.constrained, after.constrained),
            supports_ipv4: FieldChange::diff(before.supports_ipv4, after.supports_ipv4),
            supports_ipv6: FieldChange::diff(before.supports_ipv6, after.supports_ipv6),
            supports_dns: FieldChange::diff(before.supports_dns, after.supports_dns),
            composite_delta: after_score.composite - before_score.composite,
        }
    }

    /// Number of attributes that changed
    pub fn changed_fields(&self) -> usize {
        [
            self.available.is_some(),
            self.connection_kind.is_some(),
            self.tier.is_some(),
            self.expensive.is_some(),
            self.constrained.is_some(),
            self.supports_ipv4.is_some(),
            self.supports_ipv6.is_some(),
            self.supports_dns.is_some(),
        ]
        .iter()
        .filter(|changed| **changed)
        .count()
    }
}
