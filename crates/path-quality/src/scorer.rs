//! Observation scoring
//!
//! Implements the 5-dimension model:
//! Q(o) = (A + C + E + K + P) / 5
//!
//! plus the fast-path tier used where only a cheap approximation is needed.

use crate::{ConnectionKind, Observation, QualityScore, QualityTier, ScoreDimensions};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Constraint dimension when low-data mode is on
pub const CONSTRAINED_SCORE: f64 = 0.6;
/// Cost dimension on a metered path
pub const EXPENSIVE_SCORE: f64 = 0.7;

/// Protocol support starts here before per-protocol bonuses
pub const PROTOCOL_BASE: f64 = 0.5;
pub const IPV6_BONUS: f64 = 0.2;
pub const IPV4_BONUS: f64 = 0.2;
pub const DNS_BONUS: f64 = 0.1;

/// Composite difference below which two scores compare equal
pub const SCORE_EQUALITY_TOLERANCE: f64 = 0.01;

/// Score a single observation
pub fn score(observation: &Observation) -> QualityScore {
    // A: Availability
    // The 3-valued status wins when the source reports one
    let availability = match observation.status {
        Some(status) => status.availability_score(),
        None if observation.available => 1.0,
        None => 0.0,
    };

    // C: Constraint
    let constraint = if observation.constrained {
        CONSTRAINED_SCORE
    } else {
        1.0
    };

    // E: Cost
    let cost = if observation.expensive {
        EXPENSIVE_SCORE
    } else {
        1.0
    };

    // K: Connection kind
    let kind = observation.connection_kind.quality_weight();

    // P: Protocol support
    let mut protocol_support = PROTOCOL_BASE;
    if observation.supports_ipv6 {
        protocol_support += IPV6_BONUS;
    }
    if observation.supports_ipv4 {
        protocol_support += IPV4_BONUS;
    }
    if observation.supports_dns {
        protocol_support += DNS_BONUS;
    }
    // Bonuses sit on a 0.1 grid; snap so a full stack is exactly 1.0
    let protocol_support = (protocol_support * 10.0).round() / 10.0;

    let dimensions = ScoreDimensions {
        availability: availability.clamp(0.0, 1.0),
        constraint: constraint.clamp(0.0, 1.0),
        cost: cost.clamp(0.0, 1.0),
        kind: kind.clamp(0.0, 1.0),
        protocol_support: protocol_support.clamp(0.0, 1.0),
    };
    let score = QualityScore::from_dimensions(dimensions);

    trace!(
        "Scored {:?}: {:.3} {:?} (avail={:.2}, constraint={:.2}, cost={:.2}, kind={:.2}, \
         proto={:.2})",
        observation.connection_kind,
        score.composite,
        score.tier,
        dimensions.availability,
        dimensions.constraint,
        dimensions.cost,
        dimensions.kind,
        dimensions.protocol_support
    );

    score
}

/// Fast-path tier approximation.
///
/// Independent of the dimensional thresholds; the first matching flag
/// decides, so a constrained wifi path is `Fair` here even though its
/// canonical score is `Excellent`.
pub fn quick_tier(observation: &Observation) -> QualityTier {
    if !observation.available {
        return QualityTier::Poor;
    }
    if observation.constrained {
        return QualityTier::Fair;
    }
    if observation.expensive {
        return QualityTier::Good;
    }

    match observation.connection_kind {
        ConnectionKind::Wifi | ConnectionKind::Wired => QualityTier::Excellent,
        ConnectionKind::Cellular => QualityTier::Good,
        ConnectionKind::Loopback | ConnectionKind::Other => QualityTier::Fair,
        ConnectionKind::Unavailable => QualityTier::Poor,
    }
}

/// Which side of a comparison scored higher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Preference {
    First,
    Second,
    Equal,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreComparison {
    pub better: Preference,
    /// `composite(first) - composite(second)`
    pub delta: f64,
}

/// Compare two observations by composite score
pub fn compare(first: &Observation, second: &Observation) -> ScoreComparison {
    let delta = score(first).composite - score(second).composite;

    let better = if delta.abs() < SCORE_EQUALITY_TOLERANCE {
        Preference::Equal
    } else if delta > 0.0 {
        Preference::First
    } else {
        Preference::Second
    };

    ScoreComparison { better, delta }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;

    fn kind_strategy() -> impl Strategy<Value = ConnectionKind> {
        prop_oneof![
            Just(ConnectionKind::Wifi),
            Just(ConnectionKind::Cellular),
            Just(ConnectionKind::Wired),
            Just(ConnectionKind::Loopback),
            Just(ConnectionKind::Other),
            Just(ConnectionKind::Unavailable),
        ]
    }

    fn observation_strategy() -> impl Strategy<Value = Observation> {
        (
            kind_strategy(),
            any::<bool>(),
            any::<bool>(),
            any::<bool>(),
            any::<bool>(),
            any::<bool>(),
            0i64..1_000_000,
        )
            .prop_map(|(kind, expensive, constrained, v4, v6, dns, secs)| {
                Observation::new(kind, Utc.timestamp_opt(secs, 0).unwrap())
                    .with_expensive(expensive)
                    .with_constrained(constrained)
                    .with_protocols(v4, v6, dns)
            })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(2000))]

        // Composite always in [0, 1] and equal to the dimension mean
        #[test]
        fn fuzz_composite_bounds(o in observation_strategy()) {
            let s = score(&o);
            prop_assert!(s.composite >= 0.0, "Composite below 0: {}", s.composite);
            prop_assert!(s.composite <= 1.0, "Composite above 1: {}", s.composite);
            prop_assert!((s.composite - s.dimensions.mean()).abs() < 1e-12);
            prop_assert_eq!(s.tier, QualityTier::from_composite(s.composite));
        }

        // Tier never decreases as composite grows
        #[test]
        fn fuzz_tier_monotonic(a in 0.0f64..=1.0, b in 0.0f64..=1.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(QualityTier::from_composite(lo) <= QualityTier::from_composite(hi));
        }

        // Comparison is antisymmetric
        #[test]
        fn fuzz_compare_antisymmetric(a in observation_strategy(), b in observation_strategy()) {
            let ab = compare(&a, &b);
            let ba = compare(&b, &a);
            prop_assert!((ab.delta + ba.delta).abs() < 1e-12);
            match ab.better {
                Preference::First => prop_assert_eq!(ba.better, Preference::Second),
                Preference::Second => prop_assert_eq!(ba.better, Preference::First),
                Preference::Equal => prop_assert_eq!(ba.better, Preference::Equal),
            }
        }
    }
}
