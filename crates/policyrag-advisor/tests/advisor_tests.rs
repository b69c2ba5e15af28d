use serde_json::json;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

use policyrag_advisor::{Advisor, LogisticClassifier, LogisticModel, NO_EVIDENCE_TEXT};
use policyrag_core::chunker::Chunker;
use policyrag_core::config::Settings;
use policyrag_core::traits::{ChurnClassifier, PageExtractor};
use policyrag_core::types::{CustomerRecord, Page, RiskTier};
use policyrag_core::{CollaboratorKind, Error};
use policyrag_embed::FakeEmbedder;
use policyrag_index::{IndexBuilder, Retriever};

const POLICY_PAGE: &str = "Intro text. Recommended actions: 1. Offer RET10 discount - Eligibility: tenure > 6 months 2. Escalate within 12 hours";

/// Serves canned page text for empty `.pdf` files by file name.
struct CannedPdf(HashMap<String, Vec<String>>);

impl PageExtractor for CannedPdf {
    fn supports(&self, path: &Path) -> bool {
        path.extension().and_then(|e| e.to_str()) == Some("pdf")
    }

    fn extract_pages(&self, path: &Path) -> policyrag_core::Result<Vec<Page>> {
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        let pages = self.0.get(name).cloned().unwrap_or_default();
        Ok(pages
            .into_iter()
            .enumerate()
            .map(|(i, text)| Page { number: i as u32 + 1, text })
            .collect())
    }
}

fn advisor_over(corpus: Vec<(&str, Vec<&str>)>) -> (TempDir, Advisor) {
    let docs = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let mut canned = HashMap::new();
    for (name, pages) in corpus {
        fs::write(docs.path().join(name), b"").unwrap();
        canned.insert(name.to_string(), pages.into_iter().map(String::from).collect());
    }
    let extractor = CannedPdf(canned);
    let embedder = FakeEmbedder::new(64);
    IndexBuilder::new(Chunker::default(), &embedder, &extractor)
        .build_and_persist(docs.path(), out.path())
        .unwrap();
    let retriever = Retriever::open(out.path(), Arc::new(FakeEmbedder::new(64))).unwrap();
    (out, Advisor::new(retriever, &Settings::default()))
}

#[test]
fn high_risk_recommendation_is_extracted_and_cited() {
    let (_dir, advisor) = advisor_over(vec![("RetentionPolicy.pdf", vec![POLICY_PAGE])]);
    let rec = advisor.recommend_tier("High").unwrap();
    assert!(rec.evidence_found);
    assert_eq!(rec.risk, RiskTier::High);
    assert_eq!(rec.actions.len(), 2);
    assert_eq!(rec.actions[0].eligibility, "tenure > 6 months");
    assert!(rec.recommended_text.starts_with("\n1. Offer RET10 discount"));
    assert!(rec.recommended_text.contains("\n2. Escalate within 12 hours"));

    let value = serde_json::to_value(&rec).unwrap();
    assert_eq!(value["sources"], json!(["RetentionPolicy.pdf (page 1)"]));
    assert_eq!(value["risk"], json!("high"));
}

#[test]
fn low_risk_never_gets_actions() {
    let (_dir, advisor) = advisor_over(vec![("RetentionPolicy.pdf", vec![POLICY_PAGE])]);
    let rec = advisor.recommend(RiskTier::Low).unwrap();
    assert!(rec.evidence_found);
    assert!(rec.actions.is_empty());
    assert_eq!(rec.message, "Low churn risk. No discount offer required. Maintain engagement and loyalty benefits.");
}

#[test]
fn untrusted_sources_yield_no_evidence() {
    let (_dir, advisor) = advisor_over(vec![("Brochure.pdf", vec!["1. Offer RET10 discount to everyone"])]);
    let rec = advisor.recommend(RiskTier::Medium).unwrap();
    assert!(!rec.evidence_found);
    assert_eq!(rec.recommended_text, NO_EVIDENCE_TEXT);
    assert!(rec.sources.is_empty());
    assert!(rec.actions.is_empty());
    assert!(rec.message.starts_with("Medium churn risk."));
}

#[test]
fn citations_come_from_trusted_pages_only() {
    let (_dir, advisor) = advisor_over(vec![
        ("Brochure.pdf", vec!["Escalate within 12 hours for VIPs"]),
        ("RetentionPolicy.pdf", vec!["Background on churn drivers", POLICY_PAGE]),
    ]);
    let rec = advisor.recommend(RiskTier::High).unwrap();
    assert!(rec.evidence_found);
    assert!(rec.sources.iter().all(|c| c.source == "RetentionPolicy.pdf"));
    assert_eq!(rec.sources.len(), 2);
    assert_eq!(rec.actions.len(), 2);
}

#[test]
fn ask_validates_and_orders() {
    let (_dir, advisor) = advisor_over(vec![("RetentionPolicy.pdf", vec![POLICY_PAGE, "Glossary of terms"])]);
    let hits = advisor.ask("RET10 discount", advisor.default_top_k()).unwrap();
    assert_eq!(hits.len(), 2);
    assert!(hits[0].distance <= hits[1].distance);
    assert!(matches!(advisor.ask("", 5), Err(Error::InvalidArgument(_))));
    assert!(matches!(advisor.ask("x", 0), Err(Error::InvalidArgument(_))));
    assert!(matches!(advisor.recommend_tier("urgent"), Err(Error::InvalidArgument(_))));
}

#[test]
fn concurrent_requests_see_the_same_index() {
    let (_dir, advisor) = advisor_over(vec![("RetentionPolicy.pdf", vec![POLICY_PAGE])]);
    let expected: Vec<_> = RiskTier::ALL.iter().map(|t| advisor.recommend(*t).unwrap()).collect();
    std::thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let advisor = &advisor;
                s.spawn(move || advisor.recommend(RiskTier::ALL[i % 3]).unwrap())
            })
            .collect();
        for (i, h) in handles.into_iter().enumerate() {
            assert_eq!(h.join().unwrap(), expected[i % 3]);
        }
    });
}

fn churn_model() -> LogisticModel {
    serde_json::from_value(json!({
        "intercept": -0.5,
        "features": [
            { "kind": "numeric", "name": "tenure", "mean": 24.0, "scale": 12.0, "weight": -1.0 },
            { "kind": "categorical", "name": "contract", "weights": { "Month-to-month": 1.5, "Two year": -1.0 } }
        ]
    }))
    .unwrap()
}

fn customer(tenure: serde_json::Value, contract: &str) -> CustomerRecord {
    let mut record = CustomerRecord::new();
    record.insert("tenure".into(), tenure);
    record.insert("contract".into(), json!(contract));
    record
}

#[test]
fn logistic_classifier_scores_records() {
    let clf = LogisticClassifier::new(churn_model()).unwrap();
    assert_eq!(clf.features().collect::<Vec<_>>(), vec!["tenure", "contract"]);
    // z = -0.5 + (0 - 24) / 12 * -1 + 1.5 = 3.0
    let p = clf.predict_proba(&customer(json!(0), "Month-to-month")).unwrap();
    assert!((p - 1.0 / (1.0 + (-3.0f64).exp())).abs() < 1e-12);
    // unknown category contributes nothing: z = -0.5
    let p = clf.predict_proba(&customer(json!("24"), "One year")).unwrap();
    assert!((p - 1.0 / (1.0 + 0.5f64.exp())).abs() < 1e-12);

    let mut missing = customer(json!(3), "Two year");
    missing.remove("tenure");
    let err = clf.predict_proba(&missing).unwrap_err();
    assert!(matches!(err, Error::Collaborator { kind: CollaboratorKind::Rejected, .. }));
    assert!(clf.predict_proba(&customer(json!([1]), "Two year")).is_err());
}

#[test]
fn classifier_rejects_zero_scale_and_missing_file() {
    let mut model = churn_model();
    if let policyrag_advisor::Feature::Numeric { scale, .. } = &mut model.features[0] {
        *scale = 0.0;
    }
    assert!(matches!(LogisticClassifier::new(model), Err(Error::InvalidConfig(_))));
    let err = LogisticClassifier::load(Path::new("/nonexistent/churn_model.json")).unwrap_err();
    assert!(matches!(err, Error::Collaborator { kind: CollaboratorKind::Unavailable, .. }));
}

#[test]
fn customer_advice_follows_predicted_tier() {
    let (_dir, advisor) = advisor_over(vec![("RetentionPolicy.pdf", vec![POLICY_PAGE])]);
    assert!(advisor.predict(&customer(json!(1), "Two year")).is_err());

    let advisor = advisor.with_classifier(Arc::new(LogisticClassifier::new(churn_model()).unwrap()));
    let advice = advisor.recommend_for_customer(&customer(json!(0), "Month-to-month")).unwrap();
    assert_eq!(advice.prediction.churn_prediction, 1);
    assert_eq!(advice.prediction.risk, RiskTier::High);
    assert_eq!(advice.prediction.churn_probability, 0.9526);
    assert_eq!(advice.recommendation.actions.len(), 2);

    let advice = advisor.recommend_for_customer(&customer(json!(60), "Two year")).unwrap();
    assert_eq!(advice.prediction.risk, RiskTier::Low);
    assert!(advice.recommendation.actions.is_empty());
}
