//! Builds the final `Recommendation` from a selected chunk.

use std::collections::HashSet;

use policyrag_core::config::PolicySettings;
use policyrag_core::types::{Citation, Recommendation, RiskTier, SearchResult};

use crate::parser::parse_actions;
use crate::text::{after_recommended_marker, normalize_whitespace, numbered_marker_at, BULLET_GLYPHS};

pub const NO_EVIDENCE_TEXT: &str = "No retention policy evidence found in indexed documents.";

pub fn tier_message(risk: RiskTier) -> &'static str {
    match risk {
        RiskTier::High => {
            "High churn risk. Apply immediate retention actions (RET10, upgrade offers, premium support, escalation)."
        }
        RiskTier::Medium => "Medium churn risk. Recommend light retention actions like RET5 discount + service quality check.",
        RiskTier::Low => "Low churn risk. No discount offer required. Maintain engagement and loyalty benefits.",
    }
}

/// Human-readable rendering of policy text: list items 1-6 start on a new
/// line, bullets become indented dashes, output is capped at `limit` chars.
pub fn format_recommended_text(raw: &str, limit: usize) -> String {
    let normalized = normalize_whitespace(raw);
    let text = after_recommended_marker(&normalized);
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len() + 16);
    let mut i = 0;
    'scan: while i < text.len() {
        for glyph in BULLET_GLYPHS {
            if text[i..].starts_with(glyph) {
                out.push_str("\n  -");
                i += glyph.len();
                continue 'scan;
            }
        }
        if numbered_marker_at(bytes, i, &(1..=6), true).is_some() {
            out.push('\n');
        }
        let Some(ch) = text[i..].chars().next() else { break };
        out.push(ch);
        i += ch.len_utf8();
    }
    out.chars().take(limit).collect()
}

/// Citations for the first `cap` results, de-duplicated in order.
pub fn dedup_citations<'r, I>(results: I, cap: usize) -> Vec<Citation>
where
    I: IntoIterator<Item = &'r SearchResult>,
{
    let mut seen = HashSet::new();
    results
        .into_iter()
        .take(cap)
        .map(SearchResult::citation)
        .filter(|c| seen.insert(c.clone()))
        .collect()
}

/// Recommendation from `chosen`, citing the trusted results it was picked from.
/// Low-risk customers never get actions, whatever the text says.
pub fn assemble(risk: RiskTier, chosen: &SearchResult, trusted: &[&SearchResult], policy: &PolicySettings) -> Recommendation {
    let actions = match risk {
        RiskTier::Low => Vec::new(),
        RiskTier::High | RiskTier::Medium => parse_actions(&chosen.text),
    };
    Recommendation {
        risk,
        message: tier_message(risk).to_string(),
        recommended_text: format_recommended_text(&chosen.text, policy.text_limit),
        sources: dedup_citations(trusted.iter().copied(), policy.citation_limit),
        actions,
        evidence_found: true,
    }
}

pub fn no_evidence(risk: RiskTier) -> Recommendation {
    Recommendation {
        risk,
        message: tier_message(risk).to_string(),
        recommended_text: NO_EVIDENCE_TEXT.to_string(),
        sources: Vec::new(),
        actions: Vec::new(),
        evidence_found: false,
    }
}
