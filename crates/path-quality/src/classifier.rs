//! Change significance and categorization
//!
//! Priority order (first match wins):
//! 1. No previous observation → Initial
//! 2. Availability flip → Connected / Disconnected
//! 3. Connection kind differs → ConnectionKindChanged
//! 4. Canonical tier differs → QualityImproved / QualityDegraded
//! 5. Cost or constraint differs → PropertiesChanged
//! 6. Otherwise → StatusUpdate

use crate::scorer::score;
use crate::Observation;
use serde::{Deserialize, Serialize};

/// Category of a recorded transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ChangeCategory {
    Initial,
    Connected,
    Disconnected,
    ConnectionKindChanged,
    QualityImproved,
    QualityDegraded,
    PropertiesChanged,
    StatusUpdate,
}

impl ChangeCategory {
    pub fn is_availability_transition(&self) -> bool {
        matches!(self, Self::Connected | Self::Disconnected)
    }

    pub fn is_quality_transition(&self) -> bool {
        matches!(self, Self::QualityImproved | Self::QualityDegraded)
    }
}

/// Whether `current` differs from `previous` in a way worth recording
pub fn is_significant(current: &Observation, previous: Option<&Observation>) -> bool {
    let Some(previous) = previous else {
        return true;
    };

    current.available != previous.available
        || current.connection_kind != previous.connection_kind
        || current.expensive != previous.expensive
        || current.constrained != previous.constrained
        || score(current).tier != score(previous).tier
}

/// Categorize the transition from `previous` to `current`
pub fn classify(current: &Observation, previous: Option<&Observation>) -> ChangeCategory {
    let Some(previous) = previous else {
        return ChangeCategory::Initial;
    };

    if current.available != previous.available {
        return if current.available {
            ChangeCategory::Connected
        } else {
            ChangeCategory::Disconnected
        };
    }

    if current.connection_kind != previous.connection_kind {
        return ChangeCategory::ConnectionKindChanged;
    }

    let new_tier = score(current).tier;
    let old_tier = score(previous).tier;
    if new_tier != old_tier {
        return if new_tier > old_tier {
            ChangeCategory::QualityImproved
        } else {
            ChangeCategory::QualityDegraded
        };
    }

    if current.expensive != previous.expensive || current.constrained != previous.constrained {
        return ChangeCategory::PropertiesChanged;
    }

    ChangeCategory::StatusUpdate
}
