//! Reason codes for adverse decisions
//!
//! Reason codes are derived only for ManualReview and Rejected bands:
//! favorable outcomes are never explained. Each known risk feature with a
//! positive top-ranked attribution maps to one fixed label; when none
//! match, a single fallback label is emitted so an adverse decision is
//! never returned without a stated reason.

use serde::{Deserialize, Serialize};

use crate::explain::Attribution;
use crate::policy::DecisionBand;
use crate::schema::names;

/// Fixed adverse-action labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReasonCode {
    /// The delay indicator contributed toward default
    #[serde(rename = "Recent payment delays")]
    RecentPaymentDelays,
    /// The most-recent-delay code contributed toward default
    #[serde(rename = "Latest payment delinquency")]
    LatestPaymentDelinquency,
    /// The payment-to-bill ratio contributed toward default
    #[serde(rename = "Weak repayment behaviour")]
    WeakRepaymentBehaviour,
    /// The utilization flag contributed toward default
    #[serde(rename = "High credit utilization")]
    HighCreditUtilization,
    /// Fallback when no known risk feature matched
    #[serde(rename = "Overall elevated credit risk")]
    ElevatedOverallRisk,
}

impl ReasonCode {
    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            ReasonCode::RecentPaymentDelays => "Recent payment delays",
            ReasonCode::LatestPaymentDelinquency => "Latest payment delinquency",
            ReasonCode::WeakRepaymentBehaviour => "Weak repayment behaviour",
            ReasonCode::HighCreditUtilization => "High credit utilization",
            ReasonCode::ElevatedOverallRisk => "Overall elevated credit risk",
        }
    }

    /// The code for a known risk feature, if this is one
    fn for_feature(feature: &str) -> Option<Self> {
        match feature {
            names::HAS_DELAY => Some(ReasonCode::RecentPaymentDelays),
            names::PAY_0 => Some(ReasonCode::LatestPaymentDelinquency),
            names::PAYMENT_TO_BILL_RATIO => Some(ReasonCode::WeakRepaymentBehaviour),
            names::HIGH_UTILIZATION => Some(ReasonCode::HighCreditUtilization),
            _ => None,
        }
    }
}

impl std::fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Derive deduplicated reason codes from ranked attributions
///
/// Returns an empty list for Approved decisions. For adverse decisions,
/// scans the (already ranked, already filtered) attributions for known
/// risk features with positive contribution.
pub fn derive_reason_codes(band: DecisionBand, ranked: &[Attribution]) -> Vec<ReasonCode> {
    if !band.is_unfavorable() {
        return Vec::new();
    }

    let mut codes = Vec::new();
    for attribution in ranked {
        if attribution.value <= 0.0 {
            continue;
        }
        if let Some(code) = ReasonCode::for_feature(&attribution.feature) {
            if !codes.contains(&code) {
                codes.push(code);
            }
        }
    }

    if codes.is_empty() {
        codes.push(ReasonCode::ElevatedOverallRisk);
    }
    codes
}
