//! Query-time entry point: free-form questions, tier recommendations and
//! customer-level advice over one loaded index.

use serde::Serialize;
use std::sync::Arc;

use policyrag_core::config::{PolicySettings, RetrievalSettings, Settings};
use policyrag_core::traits::ChurnClassifier;
use policyrag_core::types::{CustomerRecord, Prediction, Recommendation, RiskTier, SearchResult};
use policyrag_core::{Error, Result};
use policyrag_index::Retriever;

use crate::assembler::{assemble, no_evidence};
use crate::query::synthesize_query;
use crate::selector::ChunkSelector;

const LOGGED_CITATIONS: usize = 3;

/// Prediction plus the recommendation for the predicted tier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerAdvice {
    pub prediction: Prediction,
    pub recommendation: Recommendation,
}

/// Immutable after construction; share it across threads behind an `Arc`.
#[derive(Clone)]
pub struct Advisor {
    retriever: Retriever,
    selector: ChunkSelector,
    policy: PolicySettings,
    retrieval: RetrievalSettings,
    classifier: Option<Arc<dyn ChurnClassifier>>,
}

impl Advisor {
    pub fn new(retriever: Retriever, settings: &Settings) -> Self {
        Self {
            retriever,
            selector: ChunkSelector::from_settings(&settings.policy),
            policy: settings.policy.clone(),
            retrieval: settings.retrieval.clone(),
            classifier: None,
        }
    }

    pub fn with_classifier(mut self, classifier: Arc<dyn ChurnClassifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    pub fn default_top_k(&self) -> usize { self.retrieval.default_top_k }

    /// Top-`top_k` chunks for a free-form question, closest first.
    pub fn ask(&self, question: &str, top_k: usize) -> Result<Vec<SearchResult>> {
        let results = self.retriever.retrieve(question, top_k)?;
        tracing::info!(
            question,
            top_k,
            hits = results.len(),
            sources = %first_citations(&results),
            "ask"
        );
        Ok(results)
    }

    /// Extractive recommendation for a tier name such as `"High"`.
    pub fn recommend_tier(&self, risk_tier: &str) -> Result<Recommendation> {
        self.recommend(risk_tier.parse()?)
    }

    pub fn recommend(&self, risk: RiskTier) -> Result<Recommendation> {
        let query = synthesize_query(risk);
        let results = self.retriever.retrieve(query, self.retrieval.recommend_top_k)?;
        tracing::info!(%risk, hits = results.len(), sources = %first_citations(&results), "recommend");

        let trusted = self.selector.trusted(&results);
        let Some(chosen) = self.selector.select(&results) else {
            tracing::warn!(%risk, trusted_source = self.selector.trusted_source(), "no policy evidence retrieved");
            return Ok(no_evidence(risk));
        };
        let recommendation = assemble(risk, chosen, &trusted, &self.policy);
        tracing::debug!(
            %risk,
            page = chosen.page,
            actions = recommendation.actions.len(),
            "selected policy chunk"
        );
        Ok(recommendation)
    }

    pub fn predict(&self, customer: &CustomerRecord) -> Result<Prediction> {
        let classifier = self
            .classifier
            .as_ref()
            .ok_or_else(|| Error::unavailable("no churn classifier configured"))?;
        let p = classifier.predict_proba(customer)?;
        if !(0.0..=1.0).contains(&p) {
            return Err(Error::rejected(format!("classifier returned probability {p} outside [0, 1]")));
        }
        let prediction = Prediction::from_probability(p);
        tracing::info!(probability = prediction.churn_probability, risk = %prediction.risk, "predict");
        Ok(prediction)
    }

    pub fn recommend_for_customer(&self, customer: &CustomerRecord) -> Result<CustomerAdvice> {
        let prediction = self.predict(customer)?;
        let recommendation = self.recommend(prediction.risk)?;
        Ok(CustomerAdvice { prediction, recommendation })
    }
}

fn first_citations(results: &[SearchResult]) -> String {
    results
        .iter()
        .take(LOGGED_CITATIONS)
        .map(|r| r.citation().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
