//! Logistic-regression churn classifier loaded from a JSON export.
//!
//! The export holds an intercept and one entry per input feature. Numeric
//! features are standardised (`(x - mean) / scale`) and weighted; categorical
//! features contribute the weight of their value, or nothing for a value the
//! model never saw.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

use policyrag_core::traits::ChurnClassifier;
use policyrag_core::types::CustomerRecord;
use policyrag_core::{Error, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Feature {
    Numeric { name: String, mean: f64, scale: f64, weight: f64 },
    Categorical { name: String, weights: BTreeMap<String, f64> },
}

impl Feature {
    pub fn name(&self) -> &str {
        match self {
            Self::Numeric { name, .. } | Self::Categorical { name, .. } => name,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogisticModel {
    pub intercept: f64,
    pub features: Vec<Feature>,
}

#[derive(Debug, Clone)]
pub struct LogisticClassifier {
    model: LogisticModel,
}

impl LogisticClassifier {
    pub fn new(model: LogisticModel) -> Result<Self> {
        for feature in &model.features {
            if let Feature::Numeric { name, scale, .. } = feature {
                if *scale == 0.0 || !scale.is_finite() {
                    return Err(Error::InvalidConfig(format!("feature '{name}' has unusable scale {scale}")));
                }
            }
        }
        Ok(Self { model })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::unavailable(format!("churn model {}: {e}", path.display())))?;
        let model: LogisticModel = serde_json::from_str(&raw)
            .map_err(|e| Error::unavailable(format!("churn model {}: {e}", path.display())))?;
        tracing::info!(path = %path.display(), features = model.features.len(), "loaded churn model");
        Self::new(model)
    }

    pub fn features(&self) -> impl Iterator<Item = &str> {
        self.model.features.iter().map(Feature::name)
    }

    fn logit(&self, customer: &CustomerRecord) -> Result<f64> {
        let mut z = self.model.intercept;
        for feature in &self.model.features {
            let value = customer
                .get(feature.name())
                .filter(|v| !v.is_null())
                .ok_or_else(|| Error::rejected(format!("customer record is missing '{}'", feature.name())))?;
            z += match feature {
                Feature::Numeric { name, mean, scale, weight } => {
                    let x = numeric_value(value)
                        .ok_or_else(|| Error::rejected(format!("'{name}' must be numeric, got {value}")))?;
                    (x - mean) / scale * weight
                }
                Feature::Categorical { weights, .. } => {
                    let key = match value {
                        serde_json::Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    weights.get(&key).copied().unwrap_or(0.0)
                }
            };
        }
        Ok(z)
    }
}

impl ChurnClassifier for LogisticClassifier {
    fn predict_proba(&self, customer: &CustomerRecord) -> Result<f64> {
        let z = self.logit(customer)?;
        Ok(1.0 / (1.0 + (-z).exp()))
    }
}

fn numeric_value(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        serde_json::Value::Bool(b) => Some(f64::from(u8::from(*b))),
        _ => None,
    }
}
