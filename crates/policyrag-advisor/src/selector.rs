//! Picks the single chunk a recommendation is built from.

use policyrag_core::config::PolicySettings;
use policyrag_core::types::SearchResult;

/// Restricts ranked results to the trusted policy document and prefers the
/// first one that reads like an action list.
#[derive(Debug, Clone)]
pub struct ChunkSelector {
    trusted_source: String,
    keywords: Vec<String>,
}

impl ChunkSelector {
    pub fn new(trusted_source: impl Into<String>, keywords: &[String]) -> Self {
        Self {
            trusted_source: trusted_source.into(),
            keywords: keywords.iter().map(|k| k.to_lowercase()).filter(|k| !k.is_empty()).collect(),
        }
    }

    pub fn from_settings(policy: &PolicySettings) -> Self {
        Self::new(policy.trusted_source.clone(), &policy.action_keywords)
    }

    pub fn trusted_source(&self) -> &str { &self.trusted_source }

    /// Number of distinct action keywords present in `text`, case-insensitive.
    pub fn action_score(&self, text: &str) -> usize {
        let lower = text.to_lowercase();
        self.keywords.iter().filter(|k| lower.contains(k.as_str())).count()
    }

    pub fn is_action_bearing(&self, text: &str) -> bool {
        self.action_score(text) > 0
    }

    /// Results from the trusted source, retrieval order preserved.
    pub fn trusted<'r>(&self, results: &'r [SearchResult]) -> Vec<&'r SearchResult> {
        results.iter().filter(|r| r.source == self.trusted_source).collect()
    }

    /// First trusted action-bearing result, else the first trusted result.
    pub fn select<'r>(&self, results: &'r [SearchResult]) -> Option<&'r SearchResult> {
        let trusted = self.trusted(results);
        trusted
            .iter()
            .copied()
            .find(|r| self.is_action_bearing(&r.text))
            .or_else(|| trusted.first().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(text: &str, source: &str, page: u32) -> SearchResult {
        SearchResult { text: text.into(), source: source.into(), page, distance: 0.0 }
    }

    fn selector() -> ChunkSelector {
        ChunkSelector::new("RetentionPolicy.pdf", &["RET10".to_string(), "Escalation".to_string()])
    }

    #[test]
    fn prefers_action_bearing_trusted_chunk() {
        let results = vec![
            hit("Offer RET10 now", "Other.pdf", 1),
            hit("Background on churn", "RetentionPolicy.pdf", 1),
            hit("apply ret10 discount", "RetentionPolicy.pdf", 2),
        ];
        let chosen = selector().select(&results).unwrap();
        assert_eq!(chosen.page, 2);
    }

    #[test]
    fn falls_back_to_first_trusted() {
        let results = vec![hit("intro", "RetentionPolicy.pdf", 3), hit("more", "RetentionPolicy.pdf", 4)];
        assert_eq!(selector().select(&results).unwrap().page, 3);
    }

    #[test]
    fn nothing_trusted_selects_nothing() {
        let results = vec![hit("RET10 escalation", "Other.pdf", 1)];
        assert!(selector().select(&results).is_none());
        assert!(selector().select(&[]).is_none());
    }

    #[test]
    fn score_counts_distinct_keywords() {
        let s = selector();
        assert_eq!(s.action_score("RET10 and escalation, RET10 again"), 2);
        assert_eq!(s.action_score("nothing here"), 0);
    }
}
