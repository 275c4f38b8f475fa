//! Decision Policy: probability -> band
//!
//! A pure step function over two business-configured thresholds. The
//! thresholds are policy constants, not model outputs; moving them is a
//! business decision and never requires retraining.
//!
//! The Fairness Monitor keeps its own independent 0.65 approval cutoff
//! (see [`crate::fairness`]); the two are intentionally not unified.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Default threshold below which an application is approved
pub const DEFAULT_REVIEW_THRESHOLD: f64 = 0.40;
/// Default threshold at or above which an application is rejected
pub const DEFAULT_REJECT_THRESHOLD: f64 = 0.70;

/// The three decision bands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecisionBand {
    /// Low risk, loan approved
    Approved,
    /// Medium risk, routed to a human reviewer
    ManualReview,
    /// High risk, loan rejected
    Rejected,
}

impl DecisionBand {
    /// Whether the outcome is adverse (explained with reason codes)
    pub fn is_unfavorable(&self) -> bool {
        !matches!(self, DecisionBand::Approved)
    }

    /// Human-readable band name
    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionBand::Approved => "Approved",
            DecisionBand::ManualReview => "Manual Review",
            DecisionBand::Rejected => "Rejected",
        }
    }
}

impl std::fmt::Display for DecisionBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A scored decision: probability plus the band it fell into
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoredDecision {
    /// Probability of default in [0, 1]
    pub probability: f64,
    /// Decision band
    pub band: DecisionBand,
}

/// Three-band step policy over default probability
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecisionPolicy {
    review_threshold: f64,
    reject_threshold: f64,
}

impl DecisionPolicy {
    /// Create a policy, requiring `0 < review < reject < 1`
    pub fn new(review_threshold: f64, reject_threshold: f64) -> Result<Self> {
        if !(review_threshold > 0.0
            && review_threshold < reject_threshold
            && reject_threshold < 1.0)
        {
            return Err(Error::InvalidParameter(format!(
                "thresholds must satisfy 0 < review ({review_threshold}) < reject ({reject_threshold}) < 1"
            )));
        }
        Ok(Self {
            review_threshold,
            reject_threshold,
        })
    }

    /// Map a probability to its band
    pub fn classify(&self, probability: f64) -> DecisionBand {
        if probability < self.review_threshold {
            DecisionBand::Approved
        } else if probability < self.reject_threshold {
            DecisionBand::ManualReview
        } else {
            DecisionBand::Rejected
        }
    }

    /// Classify and pair the probability with its band
    pub fn decide(&self, probability: f64) -> ScoredDecision {
        ScoredDecision {
            probability,
            band: self.classify(probability),
        }
    }

    /// Approval cutoff
    pub fn review_threshold(&self) -> f64 {
        self.review_threshold
    }

    /// Rejection cutoff
    pub fn reject_threshold(&self) -> f64 {
        self.reject_threshold
    }
}

impl Default for DecisionPolicy {
    fn default() -> Self {
        Self {
            review_threshold: DEFAULT_REVIEW_THRESHOLD,
            reject_threshold: DEFAULT_REJECT_THRESHOLD,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_band_boundaries() {
        let policy = DecisionPolicy::default();
        assert_eq!(policy.classify(0.0), DecisionBand::Approved);
        assert_eq!(policy.classify(0.3999), DecisionBand::Approved);
        assert_eq!(policy.classify(0.40), DecisionBand::ManualReview);
        assert_eq!(policy.classify(0.6999), DecisionBand::ManualReview);
        assert_eq!(policy.classify(0.70), DecisionBand::Rejected);
        assert_eq!(policy.classify(1.0), DecisionBand::Rejected);
    }

    #[test]
    fn test_invalid_thresholds_rejected() {
        assert!(DecisionPolicy::new(0.7, 0.4).is_err());
        assert!(DecisionPolicy::new(0.4, 0.4).is_err());
        assert!(DecisionPolicy::new(0.0, 0.7).is_err());
        assert!(DecisionPolicy::new(0.4, 1.0).is_err());
        assert!(DecisionPolicy::new(0.4, 0.7).is_ok());
    }

    #[test]
    fn test_unfavorable_bands() {
        assert!(!DecisionBand::Approved.is_unfavorable());
        assert!(DecisionBand::ManualReview.is_unfavorable());
        assert!(DecisionBand::Rejected.is_unfavorable());
    }

    #[test]
    fn test_decide_pairs_probability_and_band() {
        let policy = DecisionPolicy::default();
        let decision = policy.decide(0.55);
        assert_eq!(decision.probability, 0.55);
        assert_eq!(decision.band, DecisionBand::ManualReview);
    }

    proptest! {
        #[test]
        fn prop_classify_is_a_step_function(p in 0.0f64..=1.0) {
            let policy = DecisionPolicy::default();
            let band = policy.classify(p);
            let expected = if p < 0.40 {
                DecisionBand::Approved
            } else if p < 0.70 {
                DecisionBand::ManualReview
            } else {
                DecisionBand::Rejected
            };
            prop_assert_eq!(band, expected);
        }

        #[test]
        fn prop_classify_is_monotone(a in 0.0f64..=1.0, b in 0.0f64..=1.0) {
            // A higher probability never lands in a more favorable band.
            let policy = DecisionPolicy::default();
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let rank = |band: DecisionBand| match band {
                DecisionBand::Approved => 0,
                DecisionBand::ManualReview => 1,
                DecisionBand::Rejected => 2,
            };
            prop_assert!(rank(policy.classify(lo)) <= rank(policy.classify(hi)));
        }
    }
}
