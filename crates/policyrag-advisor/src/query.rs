//! Fixed retrieval queries per risk tier.

use policyrag_core::types::RiskTier;

const HIGH_QUERY: &str = "High risk customers churn probability >= 0.70 retention actions: RET10 discount, plan upgrade offer, premium support add-on, contract lock-in, escalation within 12 hours";
const MEDIUM_QUERY: &str = "Medium risk customers churn probability 0.50 to 0.69 retention actions: RET5 discount, service quality check, customer education, diagnostics";
const LOW_QUERY: &str = "Low risk customers churn probability < 0.50 recommended actions: engagement newsletters loyalty benefits plan suggestions";

/// Natural-language query used to pull the policy section for `tier`.
///
/// Each query names the tier, its probability band and the actions the
/// policy is expected to mention.
pub fn synthesize_query(tier: RiskTier) -> &'static str {
    match tier {
        RiskTier::High => HIGH_QUERY,
        RiskTier::Medium => MEDIUM_QUERY,
        RiskTier::Low => LOW_QUERY,
    }
}
